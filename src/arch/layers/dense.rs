use ndarray::{ArrayD, IxDyn};
use rand::Rng;

use crate::{
    arch::{ActFnSpec, ParamDict, ParamLayer},
    PretrainErr, Result,
};

/// A fully connected layer holding its weights and biases by name.
///
/// The weights are named after the layer feeding this one, `W_in_<source>_<name>`, and
/// the biases after the layer itself, `b_<name>`.
#[derive(Debug, Clone)]
pub struct Dense {
    name: String,
    source: String,
    dim: (usize, usize),
    act_fn: ActFnSpec,
    dropout: Option<f32>,
    params: ParamDict,
}

impl Dense {
    /// Creates a new `Dense` layer with uniformly initialized weights and zeroed biases.
    ///
    /// # Arguments
    /// * `name` - The name of this layer.
    /// * `source` - The name of the layer feeding this one.
    /// * `dim` - The input and output sizes.
    /// * `act_fn` - The activation function.
    /// * `rng` - The random number generator used for the weights.
    ///
    /// # Returns
    /// A new `Dense` instance.
    pub fn new<R: Rng>(
        name: &str,
        source: &str,
        dim: (usize, usize),
        act_fn: ActFnSpec,
        rng: &mut R,
    ) -> Self {
        let limit = (6.0 / (dim.0 + dim.1) as f32).sqrt();
        let weights = ArrayD::from_shape_simple_fn(IxDyn(&[dim.0, dim.1]), || {
            rng.random_range(-limit..limit)
        });
        let biases = ArrayD::zeros(IxDyn(&[dim.1]));

        let params = ParamDict::from([
            (weights_name(source, name), weights),
            (bias_name(name), biases),
        ]);

        Self {
            name: name.to_string(),
            source: source.to_string(),
            dim,
            act_fn,
            dropout: None,
            params,
        }
    }

    /// Attaches a dropout rate to this layer.
    pub fn with_dropout(mut self, dropout: f32) -> Self {
        self.dropout = Some(dropout);
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    pub fn act_fn(&self) -> ActFnSpec {
        self.act_fn
    }

    pub fn dropout(&self) -> Option<f32> {
        self.dropout
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        (self.dim.0 + 1) * self.dim.1
    }

    /// Returns the names of this layer's parameters.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }
}

impl ParamLayer for Dense {
    fn name(&self) -> &str {
        &self.name
    }

    fn params(&self) -> ParamDict {
        self.params.clone()
    }

    fn set_params(&mut self, params: ParamDict) -> Result<()> {
        for (param, value) in &params {
            let Some(current) = self.params.get(param) else {
                return Err(PretrainErr::UnknownParam {
                    layer: self.name.clone(),
                    param: param.clone(),
                });
            };

            if current.shape() != value.shape() {
                return Err(PretrainErr::ParamShapeMismatch {
                    layer: self.name.clone(),
                    param: param.clone(),
                    got: value.shape().to_vec(),
                    expected: current.shape().to_vec(),
                });
            }
        }

        if let Some(missing) = self.params.keys().find(|name| !params.contains_key(*name)) {
            return Err(PretrainErr::MissingParam {
                layer: self.name.clone(),
                param: missing.clone(),
            });
        }

        self.params = params;
        Ok(())
    }
}

fn weights_name(source: &str, name: &str) -> String {
    format!("W_in_{source}_{name}")
}

fn bias_name(name: &str) -> String {
    format!("b_{name}")
}
