use serde::{Deserialize, Serialize};

use crate::{
    arch::{ActFnSpec, LayerInfo, LossSpec, Mask, NetworkDescription},
    PretrainErr, Result,
};

/// The options describing a layer-list network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub num_inputs: usize,
    pub num_outputs: usize,
    /// The size of every hidden layer, from the input-adjacent one onwards.
    #[serde(default)]
    pub hidden_size: Vec<usize>,
    #[serde(default = "default_hidden_type")]
    pub hidden_type: String,
    #[serde(default)]
    pub activation: ActFnSpec,
    /// Overrides the default `hidden_<i>` layer names.
    #[serde(default)]
    pub hidden_names: Option<Vec<String>>,
    /// Per hidden layer dropout rate, zero for every layer if empty.
    #[serde(default)]
    pub dropout: Vec<f32>,
    #[serde(default)]
    pub loss: LossSpec,
    /// The masking policy the epoch networks are built with.
    #[serde(default)]
    pub mask: Mask,
    /// The seed for the parameter initialization.
    #[serde(default)]
    pub seed: Option<u64>,
    /// A network given as a structured topology graph instead of a layer list.
    #[serde(default)]
    pub network_topology_json: Option<serde_json::Value>,
}

fn default_hidden_type() -> String {
    "forward".into()
}

impl NetworkConfig {
    /// Builds the layer-list description of this network.
    ///
    /// # Returns
    /// A validated `NetworkDescription` or an error if the options are inconsistent.
    pub fn description(&self) -> Result<NetworkDescription> {
        let depth = self.hidden_size.len();

        let names: Vec<String> = match &self.hidden_names {
            Some(names) if names.len() != depth => {
                return Err(PretrainErr::InvalidConfig(format!(
                    "got {} hidden_names for {depth} hidden layers",
                    names.len()
                )));
            }
            Some(names) => names.clone(),
            None => (0..depth).map(|i| format!("hidden_{i}")).collect(),
        };

        let dropout = match self.dropout.len() {
            0 => vec![0.0; depth],
            n if n == depth => self.dropout.clone(),
            n => {
                return Err(PretrainErr::InvalidConfig(format!(
                    "got {n} dropout rates for {depth} hidden layers"
                )));
            }
        };

        let hidden_info = names
            .into_iter()
            .zip(&self.hidden_size)
            .zip(dropout)
            .map(|((name, &size), dropout)| LayerInfo {
                layer_type: self.hidden_type.clone(),
                size,
                act_fn: self.activation,
                name,
                dropout,
            })
            .collect();

        NetworkDescription::new(self.num_inputs, self.num_outputs, hidden_info, self.loss)
    }
}
