use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{PretrainErr, Result};

/// The specification for a layer's activation function.
///
/// Deserializes from a bare name, `"sigmoid"`, or from a tagged variant,
/// `{"sigmoid": {"amp": 2.0}}`. A missing `amp` defaults to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "ActFnRepr")]
pub enum ActFnSpec {
    Sigmoid { amp: f32 },
    Tanh,
    Relu,
    Softmax,
    Identity,
}

impl Default for ActFnSpec {
    fn default() -> Self {
        Self::Sigmoid { amp: default_amp() }
    }
}

fn default_amp() -> f32 {
    1.0
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ActFnRepr {
    Bare(BareActFn),
    Tagged(TaggedActFn),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum BareActFn {
    Sigmoid,
    Tanh,
    Relu,
    Softmax,
    Identity,
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum TaggedActFn {
    Sigmoid {
        #[serde(default = "default_amp")]
        amp: f32,
    },
}

impl From<ActFnRepr> for ActFnSpec {
    fn from(value: ActFnRepr) -> Self {
        match value {
            ActFnRepr::Bare(BareActFn::Sigmoid) => ActFnSpec::default(),
            ActFnRepr::Bare(BareActFn::Tanh) => ActFnSpec::Tanh,
            ActFnRepr::Bare(BareActFn::Relu) => ActFnSpec::Relu,
            ActFnRepr::Bare(BareActFn::Softmax) => ActFnSpec::Softmax,
            ActFnRepr::Bare(BareActFn::Identity) => ActFnSpec::Identity,
            ActFnRepr::Tagged(TaggedActFn::Sigmoid { amp }) => ActFnSpec::Sigmoid { amp },
        }
    }
}

/// The loss the output layer is trained against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossSpec {
    #[default]
    Ce,
    Mse,
}

impl LossSpec {
    /// Returns the activation the output layer uses for this loss.
    pub fn output_act_fn(&self) -> ActFnSpec {
        match self {
            LossSpec::Ce => ActFnSpec::Softmax,
            LossSpec::Mse => ActFnSpec::Identity,
        }
    }
}

/// Describes a single hidden layer of a layer-list network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub layer_type: String,
    pub size: usize,
    pub act_fn: ActFnSpec,
    pub name: String,
    pub dropout: f32,
}

impl LayerInfo {
    /// Creates a new forward `LayerInfo` without dropout.
    ///
    /// # Arguments
    /// * `name` - The name of the layer, unique within a network.
    /// * `size` - The amount of units of the layer.
    /// * `act_fn` - The activation function of the layer.
    pub fn forward(name: impl Into<String>, size: usize, act_fn: ActFnSpec) -> Self {
        Self {
            layer_type: "forward".into(),
            size,
            act_fn,
            name: name.into(),
            dropout: 0.0,
        }
    }
}

/// The structural description of a layer-list network.
///
/// `hidden_info` is ordered from the input-adjacent layer to the deepest one, every
/// other field describes the network as a whole. Cloning yields an independent value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDescription {
    pub num_inputs: usize,
    pub num_outputs: usize,
    pub hidden_info: Vec<LayerInfo>,
    pub loss: LossSpec,
}

impl NetworkDescription {
    /// Creates a new `NetworkDescription` after validating it.
    ///
    /// # Arguments
    /// * `num_inputs` - The size of the input.
    /// * `num_outputs` - The size of the output layer.
    /// * `hidden_info` - The hidden layers, from the input-adjacent one onwards.
    /// * `loss` - The loss of the output layer.
    ///
    /// # Returns
    /// A new `NetworkDescription` or an error if the layers are empty, sized zero or
    /// share names.
    pub fn new(
        num_inputs: usize,
        num_outputs: usize,
        hidden_info: Vec<LayerInfo>,
        loss: LossSpec,
    ) -> Result<Self> {
        if hidden_info.is_empty() {
            return Err(PretrainErr::EmptyTopology);
        }

        if num_inputs == 0 || num_outputs == 0 {
            return Err(PretrainErr::InvalidConfig(
                "num_inputs and num_outputs must be greater than 0".into(),
            ));
        }

        let mut names = HashSet::with_capacity(hidden_info.len());

        for (i, info) in hidden_info.iter().enumerate() {
            if info.size == 0 {
                return Err(PretrainErr::InvalidConfig(format!(
                    "hidden layer {i} ({}) has size 0",
                    info.name
                )));
            }

            if !(0.0..1.0).contains(&info.dropout) {
                return Err(PretrainErr::InvalidConfig(format!(
                    "hidden layer {i} ({}) has dropout {} outside [0, 1)",
                    info.name, info.dropout
                )));
            }

            if !names.insert(info.name.as_str()) {
                return Err(PretrainErr::InvalidConfig(format!(
                    "hidden layer name {} is used more than once",
                    info.name
                )));
            }
        }

        Ok(Self {
            num_inputs,
            num_outputs,
            hidden_info,
            loss,
        })
    }

    /// Returns the amount of hidden layers.
    pub fn depth(&self) -> usize {
        self.hidden_info.len()
    }

    /// Returns the hidden layer names in depth order.
    pub fn hidden_layer_names(&self) -> Vec<&str> {
        self.hidden_info.iter().map(|info| info.name.as_str()).collect()
    }

    /// Copies this description keeping only the first `n` hidden layers.
    ///
    /// # Arguments
    /// * `n` - The amount of hidden layers to keep, within `1..=depth`.
    ///
    /// # Returns
    /// The truncated description or an `EpochOutOfRange` error.
    pub fn truncated(&self, n: usize) -> Result<Self> {
        let epochs = self.depth();
        if n == 0 || n > epochs {
            return Err(PretrainErr::EpochOutOfRange { epoch: n, epochs });
        }

        let mut description = self.clone();
        description.hidden_info.truncate(n);
        Ok(description)
    }
}

/// Produces the description used on `epoch`, the first `epoch` hidden layers of `original`.
///
/// Epochs start at 1, the first hidden layer being the input-adjacent one.
pub fn truncate(original: &NetworkDescription, epoch: usize) -> Result<NetworkDescription> {
    original.truncated(epoch)
}
