use std::{collections::BTreeMap, fmt};

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use super::NetworkDescription;
use crate::Result;

/// The value of a single named parameter.
pub type Param = ArrayD<f32>;

/// A layer's parameters keyed by name.
pub type ParamDict = BTreeMap<String, Param>;

/// The stochastic masking policy a network is built with. It's handed to the
/// `NetworkBuilder` untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mask {
    /// No masking at all.
    #[default]
    Unity,
    Dropout,
}

impl fmt::Display for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mask::Unity => write!(f, "unity"),
            Mask::Dropout => write!(f, "dropout"),
        }
    }
}

/// A layer whose parameters can be read and replaced by name.
pub trait ParamLayer {
    /// Returns the name of this layer.
    fn name(&self) -> &str;

    /// Returns a copy of every parameter of this layer.
    fn params(&self) -> ParamDict;

    /// Replaces the parameters of this layer.
    ///
    /// The call is atomic: either every parameter in `params` is set or none is.
    ///
    /// # Arguments
    /// * `params` - The new parameters, naming exactly the parameters of this layer.
    ///
    /// # Returns
    /// An error if a name is unknown or missing, or if a shape doesn't match.
    fn set_params(&mut self, params: ParamDict) -> Result<()>;
}

/// A network made of uniquely named hidden layers followed by an output layer.
///
/// The hidden layers include the input-adjacent one.
pub trait Network {
    type Layer: ParamLayer;

    /// Returns the hidden layer names, from the input onwards.
    fn hidden_layer_names(&self) -> Vec<&str>;

    fn hidden(&self, name: &str) -> Option<&Self::Layer>;

    fn hidden_mut(&mut self, name: &str) -> Option<&mut Self::Layer>;

    fn output(&self) -> &Self::Layer;

    fn output_mut(&mut self) -> &mut Self::Layer;
}

/// Materializes fresh networks out of descriptions.
pub trait NetworkBuilder {
    type Network: Network;

    /// Builds a new network.
    ///
    /// # Arguments
    /// * `description` - The topology of the network.
    /// * `mask` - The masking policy of the network.
    ///
    /// # Returns
    /// A freshly initialized network or an error if the description can't be built.
    fn build(&self, description: &NetworkDescription, mask: Mask) -> Result<Self::Network>;
}
