use std::env;

use anyhow::{anyhow, bail, Context, Result};
use log::info;

use layerwise_pretrain::{
    arch::{LayerNetwork, Network},
    configs::{pretrain_from_config, Config},
    pretrain::TrainDirective,
};

const USAGE: &str = "usage: pretrain-plan <config.json> [--seed <seed>]";

fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let path = args.next().ok_or_else(|| anyhow!(USAGE))?;

    let mut config = Config::from_json_file(&path)
        .with_context(|| format!("failed to load config from {path}"))?;

    match (args.next().as_deref(), args.next()) {
        (None, _) => {}
        (Some("--seed"), Some(seed)) => {
            config.network.seed = Some(seed.parse().context("invalid seed")?);
        }
        _ => bail!(USAGE),
    }

    let Some(pretrain) = pretrain_from_config(&config)? else {
        println!("pretraining disabled");
        return Ok(());
    };

    println!("{pretrain}");

    let mask = config.network.mask;
    info!("building epoch networks with {mask} masking");

    let mut prev: Option<LayerNetwork> = None;
    for epoch in 1..=pretrain.epoch_count() {
        let network = pretrain.network_for_epoch(epoch, mask)?;
        let network = match &prev {
            Some(old) => pretrain.copy_params_from_old_network(network, old)?,
            None => network,
        };

        let directive = pretrain.train_directive_for_epoch(epoch)?;
        let trainable = network.trainable_params(&directive);
        info!(epoch = epoch, params = network.size(); "epoch network ready");

        println!(
            "epoch {epoch}: layers [{}], train {directive} ({} of {} param tensors)",
            network.hidden_layer_names().join(", "),
            trainable.len(),
            network.trainable_params(&TrainDirective::All).len(),
        );

        prev = Some(network);
    }

    Ok(())
}
