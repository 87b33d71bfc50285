mod directive;
mod transplant;

use std::{collections::BTreeSet, fmt};

use log::{debug, info};

pub use directive::TrainDirective;
pub use transplant::{transplant, OutputCorrespondence, SortedByName};

use crate::{
    arch::{truncate, LayerNetworkBuilder, Mask, Network, NetworkBuilder, NetworkDescription},
    PretrainErr, Result,
};

/// Layer-wise construction and pretraining.
///
/// Epoch `n` trains a network made of the first `n` hidden layers of the original
/// description, starting with the input-adjacent one, so there are as many epochs as
/// hidden layers. Between epochs, the trained parameters are carried into the next,
/// deeper network with `copy_params_from_old_network`.
///
/// The controller never changes after construction, every query is computed from the
/// original description and the epoch given by the caller.
pub struct Pretrain<B: NetworkBuilder = LayerNetworkBuilder> {
    original: NetworkDescription,
    copy_output_layer: bool,
    greedy: bool,
    builder: B,
    correspondence: Box<dyn OutputCorrespondence>,
}

impl Pretrain<LayerNetworkBuilder> {
    /// Creates a new `Pretrain` building `LayerNetwork`s.
    ///
    /// # Arguments
    /// * `original` - The full depth network description.
    /// * `copy_output_layer` - Whether to copy the output layer from the last epoch or reinit it, `true` if `None`.
    /// * `greedy` - Whether to only train the new hidden layer and the output layer, `false` if `None`.
    ///
    /// # Returns
    /// A new `Pretrain` instance.
    pub fn new(
        original: NetworkDescription,
        copy_output_layer: Option<bool>,
        greedy: Option<bool>,
    ) -> Self {
        Self::with_builder(original, copy_output_layer, greedy, LayerNetworkBuilder::default())
    }
}

impl<B: NetworkBuilder> Pretrain<B> {
    /// Creates a new `Pretrain` materializing its networks with `builder`.
    pub fn with_builder(
        original: NetworkDescription,
        copy_output_layer: Option<bool>,
        greedy: Option<bool>,
        builder: B,
    ) -> Self {
        let pretrain = Self {
            original,
            copy_output_layer: copy_output_layer.unwrap_or(true),
            greedy: greedy.unwrap_or(false),
            builder,
            correspondence: Box::new(SortedByName),
        };

        info!(
            epochs = pretrain.epoch_count(),
            copy_output_layer = pretrain.copy_output_layer,
            greedy = pretrain.greedy;
            "layer-wise pretraining enabled"
        );

        pretrain
    }

    /// Replaces the strategy translating output parameter names between epochs.
    pub fn with_correspondence<C>(mut self, correspondence: C) -> Self
    where
        C: OutputCorrespondence + 'static,
    {
        self.correspondence = Box::new(correspondence);
        self
    }

    pub fn original(&self) -> &NetworkDescription {
        &self.original
    }

    pub fn copy_output_layer(&self) -> bool {
        self.copy_output_layer
    }

    pub fn greedy(&self) -> bool {
        self.greedy
    }

    /// Returns the amount of epochs, one per hidden layer.
    pub fn epoch_count(&self) -> usize {
        self.original.depth()
    }

    /// Returns the network description for `epoch`.
    ///
    /// # Arguments
    /// * `epoch` - The epoch, starting at 1.
    ///
    /// # Returns
    /// A copy of the original description keeping only its first `epoch` hidden layers, or
    /// an `EpochOutOfRange` error.
    pub fn topology_for_epoch(&self, epoch: usize) -> Result<NetworkDescription> {
        truncate(&self.original, epoch)
    }

    /// Builds a fresh network for `epoch`.
    ///
    /// # Arguments
    /// * `epoch` - The epoch, starting at 1.
    /// * `mask` - The masking policy, handed to the builder as is.
    ///
    /// # Returns
    /// A newly initialized network or an error.
    pub fn network_for_epoch(&self, epoch: usize, mask: Mask) -> Result<B::Network> {
        let description = self.topology_for_epoch(epoch)?;
        self.builder.build(&description, mask)
    }

    /// Returns which parameters the trainer may update on `epoch`.
    ///
    /// Outside of greedy mode, and on the first epoch, everything is trainable. Otherwise
    /// only the hidden layers added on this epoch and the output layer are.
    ///
    /// # Arguments
    /// * `epoch` - The epoch, starting at 1.
    ///
    /// # Returns
    /// The epoch's `TrainDirective` or an error if the epoch is out of range or the
    /// previous epoch's hidden layers aren't kept on this one.
    pub fn train_directive_for_epoch(&self, epoch: usize) -> Result<TrainDirective> {
        let epochs = self.epoch_count();
        if epoch == 0 || epoch > epochs {
            return Err(PretrainErr::EpochOutOfRange { epoch, epochs });
        }

        if !self.greedy || epoch == 1 {
            return Ok(TrainDirective::All);
        }

        let prev_network = self.network_for_epoch(epoch - 1, Mask::default())?;
        let cur_network = self.network_for_epoch(epoch, Mask::default())?;

        let prev_names: BTreeSet<_> = prev_network.hidden_layer_names().into_iter().collect();
        let cur_names: BTreeSet<_> = cur_network.hidden_layer_names().into_iter().collect();

        let missing: Vec<String> = prev_names
            .difference(&cur_names)
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(PretrainErr::LayersNotPrefix { epoch, missing });
        }

        let hidden_layers: BTreeSet<String> = cur_names
            .difference(&prev_names)
            .map(|name| name.to_string())
            .collect();

        debug!(epoch = epoch; "greedy epoch trains {hidden_layers:?} and the output layer");

        Ok(TrainDirective::Select {
            hidden_layers,
            with_output: true,
        })
    }

    /// Carries the parameters trained on the previous epoch into the next epoch's network.
    ///
    /// Every hidden layer is copied by name and, if `copy_output_layer` is set, the output
    /// layer is copied translating its parameter names through the configured
    /// `OutputCorrespondence`.
    ///
    /// # Arguments
    /// * `new_network` - The freshly built network of the upcoming epoch.
    /// * `old_network` - The network trained on the previous epoch.
    ///
    /// # Returns
    /// The transplanted network. On error the network is dropped, it must not be trained.
    pub fn copy_params_from_old_network(
        &self,
        new_network: B::Network,
        old_network: &B::Network,
    ) -> Result<B::Network> {
        let network = transplant(
            new_network,
            old_network,
            self.copy_output_layer,
            self.correspondence.as_ref(),
        )?;

        info!(
            layers = old_network.hidden_layer_names().len(),
            output = self.copy_output_layer;
            "copied parameters from the previous epoch"
        );

        Ok(network)
    }
}

impl<B: NetworkBuilder> fmt::Display for Pretrain<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Default layerwise construction+pretraining, starting with input+hidden+output. Epochs: {}",
            self.epoch_count()
        )
    }
}
