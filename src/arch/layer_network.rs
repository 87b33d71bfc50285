use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::debug;
use rand::{rngs::StdRng, SeedableRng};

use super::{layers::Dense, Mask, Network, NetworkBuilder, NetworkDescription, ParamLayer};
use crate::{pretrain::TrainDirective, PretrainErr, Result};

/// The name of the layer feeding the first hidden layer.
const INPUT_NAME: &str = "data";
const OUTPUT_NAME: &str = "output";

/// A feed-forward network built out of a layer-list `NetworkDescription`.
#[derive(Debug, Clone)]
pub struct LayerNetwork {
    hidden: BTreeMap<String, Dense>,
    order: Vec<String>,
    output: Dense,
    mask: Mask,
}

impl LayerNetwork {
    /// Returns the masking policy this network was built with.
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Returns the amount of parameters in the network.
    pub fn size(&self) -> usize {
        self.hidden.values().map(Dense::size).sum::<usize>() + self.output.size()
    }

    /// Resolves a directive into the names of the parameters it lets the trainer update.
    ///
    /// # Arguments
    /// * `directive` - The epoch's training directive.
    ///
    /// # Returns
    /// The trainable parameter names, as `<layer>.<param>`.
    pub fn trainable_params(&self, directive: &TrainDirective) -> BTreeSet<String> {
        let hidden = self
            .order
            .iter()
            .filter(|name| directive.trains_hidden(name))
            .filter_map(|name| self.hidden.get(name));

        let output = directive.trains_output().then_some(&self.output);

        hidden
            .chain(output)
            .flat_map(|layer| {
                layer
                    .param_names()
                    .map(move |param| format!("{}.{param}", layer.name()))
            })
            .collect()
    }
}

impl Network for LayerNetwork {
    type Layer = Dense;

    fn hidden_layer_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    fn hidden(&self, name: &str) -> Option<&Dense> {
        self.hidden.get(name)
    }

    fn hidden_mut(&mut self, name: &str) -> Option<&mut Dense> {
        self.hidden.get_mut(name)
    }

    fn output(&self) -> &Dense {
        &self.output
    }

    fn output_mut(&mut self) -> &mut Dense {
        &mut self.output
    }
}

/// Builds `LayerNetwork`s with randomly initialized parameters.
#[derive(Debug, Clone, Default)]
pub struct LayerNetworkBuilder {
    seed: Option<u64>,
}

impl LayerNetworkBuilder {
    /// Creates a new `LayerNetworkBuilder`.
    ///
    /// # Arguments
    /// * `seed` - The seed for the parameter initialization, taken from the OS if `None`.
    pub fn new(seed: Option<u64>) -> Self {
        Self { seed }
    }

    fn generate_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

impl NetworkBuilder for LayerNetworkBuilder {
    type Network = LayerNetwork;

    fn build(&self, description: &NetworkDescription, mask: Mask) -> Result<LayerNetwork> {
        if description.hidden_info.is_empty() {
            return Err(PretrainErr::EmptyTopology);
        }

        let mut seen = HashSet::with_capacity(description.depth());
        if let Some(name) = description
            .hidden_layer_names()
            .into_iter()
            .find(|name| !seen.insert(*name))
        {
            return Err(PretrainErr::InvalidConfig(format!(
                "hidden layer name {name} is used more than once"
            )));
        }

        let mut rng = self.generate_rng();
        let mut hidden = BTreeMap::new();
        let mut order = Vec::with_capacity(description.depth());
        let mut source = INPUT_NAME;
        let mut fan_in = description.num_inputs;

        for info in &description.hidden_info {
            if info.layer_type != "forward" {
                return Err(PretrainErr::InvalidConfig(format!(
                    "unsupported layer type {} for layer {}",
                    info.layer_type, info.name
                )));
            }

            if info.name == INPUT_NAME || info.name == OUTPUT_NAME {
                return Err(PretrainErr::InvalidConfig(format!(
                    "{} is a reserved layer name",
                    info.name
                )));
            }

            let dim = (fan_in, info.size);
            let mut layer = Dense::new(&info.name, source, dim, info.act_fn, &mut rng);
            if mask == Mask::Dropout {
                layer = layer.with_dropout(info.dropout);
            }

            debug!(layer = info.name.as_str(), size = info.size; "built hidden layer");
            order.push(info.name.clone());
            hidden.insert(info.name.clone(), layer);
            source = info.name.as_str();
            fan_in = info.size;
        }

        let output = Dense::new(
            OUTPUT_NAME,
            source,
            (fan_in, description.num_outputs),
            description.loss.output_act_fn(),
            &mut rng,
        );

        Ok(LayerNetwork {
            hidden,
            order,
            output,
            mask,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::{ActFnSpec, LayerInfo, LossSpec};

    fn description() -> NetworkDescription {
        let mut hidden = vec![
            LayerInfo::forward("hidden_0", 4, ActFnSpec::Tanh),
            LayerInfo::forward("hidden_1", 3, ActFnSpec::Tanh),
        ];
        hidden[1].dropout = 0.25;

        NetworkDescription::new(5, 2, hidden, LossSpec::Ce).unwrap()
    }

    #[test]
    fn layers_are_chained_by_name() {
        let network = LayerNetworkBuilder::new(Some(1))
            .build(&description(), Mask::Unity)
            .unwrap();

        assert_eq!(network.hidden_layer_names(), ["hidden_0", "hidden_1"]);
        assert_eq!(network.hidden("hidden_0").unwrap().source(), "data");
        assert_eq!(network.hidden("hidden_0").unwrap().dim(), (5, 4));
        assert_eq!(network.hidden("hidden_1").unwrap().source(), "hidden_0");
        assert_eq!(network.output().source(), "hidden_1");
        assert_eq!(network.output().dim(), (3, 2));
        assert_eq!(network.output().act_fn(), ActFnSpec::Softmax);

        let output_params: Vec<_> = network.output().param_names().collect();
        assert_eq!(output_params, ["W_in_hidden_1_output", "b_output"]);
        assert_eq!(network.size(), 6 * 4 + 5 * 3 + 4 * 2);
    }

    #[test]
    fn the_same_seed_builds_the_same_network() {
        let builder = LayerNetworkBuilder::new(Some(42));
        let a = builder.build(&description(), Mask::Unity).unwrap();
        let b = builder.build(&description(), Mask::Unity).unwrap();

        assert_eq!(a.output().params(), b.output().params());
        assert_eq!(
            a.hidden("hidden_1").unwrap().params(),
            b.hidden("hidden_1").unwrap().params()
        );
    }

    #[test]
    fn the_mask_is_passed_through() {
        let builder = LayerNetworkBuilder::new(Some(3));

        let unity = builder.build(&description(), Mask::Unity).unwrap();
        assert_eq!(unity.mask(), Mask::Unity);
        assert_eq!(unity.hidden("hidden_1").unwrap().dropout(), None);

        let dropout = builder.build(&description(), Mask::Dropout).unwrap();
        assert_eq!(dropout.mask(), Mask::Dropout);
        assert_eq!(dropout.hidden("hidden_1").unwrap().dropout(), Some(0.25));
    }

    #[test]
    fn trainable_params_follow_the_directive() {
        let network = LayerNetworkBuilder::new(Some(5))
            .build(&description(), Mask::Unity)
            .unwrap();

        assert_eq!(network.trainable_params(&TrainDirective::All).len(), 6);

        let directive = TrainDirective::Select {
            hidden_layers: BTreeSet::from(["hidden_1".to_string()]),
            with_output: true,
        };
        let trainable: Vec<_> = network.trainable_params(&directive).into_iter().collect();

        assert_eq!(
            trainable,
            [
                "hidden_1.W_in_hidden_0_hidden_1",
                "hidden_1.b_hidden_1",
                "output.W_in_hidden_1_output",
                "output.b_output",
            ]
        );
    }

    #[test]
    fn repeated_names_are_rejected() {
        let description = NetworkDescription {
            num_inputs: 2,
            num_outputs: 1,
            hidden_info: vec![
                LayerInfo::forward("h", 3, ActFnSpec::Relu),
                LayerInfo::forward("h", 3, ActFnSpec::Relu),
            ],
            loss: LossSpec::Ce,
        };

        assert!(matches!(
            LayerNetworkBuilder::default().build(&description, Mask::Unity),
            Err(PretrainErr::InvalidConfig(_))
        ));
    }

    #[test]
    fn reserved_names_are_rejected() {
        let hidden = vec![LayerInfo::forward("output", 4, ActFnSpec::Relu)];
        let description = NetworkDescription::new(2, 1, hidden, LossSpec::Mse).unwrap();

        assert!(matches!(
            LayerNetworkBuilder::default().build(&description, Mask::Unity),
            Err(PretrainErr::InvalidConfig(_))
        ));
    }
}
