use log::info;
use serde::{Deserialize, Serialize};

use super::Config;
use crate::{arch::LayerNetworkBuilder, pretrain::Pretrain, PretrainErr, Result};

/// The pretraining options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PretrainConfig {
    /// The pretraining scheme, `"default"` or empty to disable it.
    #[serde(default)]
    pub pretrain: String,
    #[serde(default)]
    pub pretrain_copy_output_layer: Option<bool>,
    #[serde(default)]
    pub pretrain_greedy: Option<bool>,
}

/// Sets up pretraining as configured.
///
/// # Arguments
/// * `config` - The network and pretraining options.
///
/// # Returns
/// The `Pretrain` controller, `None` if pretraining is disabled, or an error if the
/// scheme is unknown or the network can't be grown layer by layer.
pub fn pretrain_from_config(config: &Config) -> Result<Option<Pretrain>> {
    match config.pretrain.pretrain.as_str() {
        "default" => {
            if config.network.network_topology_json.is_some() {
                return Err(PretrainErr::JsonTopology);
            }

            let description = config.network.description()?;
            let builder = LayerNetworkBuilder::new(config.network.seed);
            let pretrain = Pretrain::with_builder(
                description,
                config.pretrain.pretrain_copy_output_layer,
                config.pretrain.pretrain_greedy,
                builder,
            );

            Ok(Some(pretrain))
        }
        "" => {
            info!("pretraining disabled");
            Ok(None)
        }
        other => Err(PretrainErr::UnknownPretrainType(other.to_string())),
    }
}
