mod description;
mod layer_network;
pub mod layers;
mod network;

pub use description::{truncate, ActFnSpec, LayerInfo, LossSpec, NetworkDescription};
pub use layer_network::{LayerNetwork, LayerNetworkBuilder};
pub use network::{Mask, Network, NetworkBuilder, Param, ParamDict, ParamLayer};
