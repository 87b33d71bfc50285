use std::{collections::BTreeSet, fs};

use layerwise_pretrain::{
    arch::{LayerNetwork, Mask, Network, ParamDict, ParamLayer},
    configs::{pretrain_from_config, Config},
    pretrain::{Pretrain, TrainDirective},
    PretrainErr,
};

fn config(greedy: bool, copy_output_layer: bool, hidden_size: &[usize]) -> Config {
    let json = format!(
        r#"{{
            "num_inputs": 4,
            "num_outputs": 3,
            "hidden_size": {hidden_size:?},
            "activation": "tanh",
            "dropout": {dropout:?},
            "seed": 7,
            "pretrain": "default",
            "pretrain_greedy": {greedy},
            "pretrain_copy_output_layer": {copy_output_layer}
        }}"#,
        dropout = vec![0.1; hidden_size.len()],
    );

    Config::from_json_str(&json).unwrap()
}

fn pretrain(greedy: bool, copy_output_layer: bool, hidden_size: &[usize]) -> Pretrain {
    pretrain_from_config(&config(greedy, copy_output_layer, hidden_size))
        .unwrap()
        .unwrap()
}

/// Shifts every parameter of the network, standing in for a round of training.
fn train(network: &mut LayerNetwork, delta: f32) {
    let shift = |params: ParamDict| -> ParamDict {
        params
            .into_iter()
            .map(|(name, value)| (name, value.mapv(|x| x + delta)))
            .collect()
    };

    let names: Vec<String> = network
        .hidden_layer_names()
        .into_iter()
        .map(String::from)
        .collect();

    for name in names {
        let layer = network.hidden_mut(&name).unwrap();
        let params = shift(layer.params());
        layer.set_params(params).unwrap();
    }

    let params = shift(network.output().params());
    network.output_mut().set_params(params).unwrap();
}

#[test]
fn a_full_schedule_carries_every_trained_parameter() {
    let pretrain = pretrain(false, true, &[6, 6, 6]);
    assert_eq!(pretrain.epoch_count(), 3);

    let mut old = pretrain.network_for_epoch(1, Mask::Dropout).unwrap();
    train(&mut old, 1.0);

    for epoch in 2..=pretrain.epoch_count() {
        let new = pretrain.network_for_epoch(epoch, Mask::Dropout).unwrap();
        let mut new = pretrain.copy_params_from_old_network(new, &old).unwrap();

        assert_eq!(new.hidden_layer_names().len(), epoch);
        for name in old.hidden_layer_names() {
            assert_eq!(
                new.hidden(name).unwrap().params(),
                old.hidden(name).unwrap().params()
            );
        }

        let prev_last = format!("hidden_{}", epoch - 2);
        let cur_last = format!("hidden_{}", epoch - 1);
        let old_output = old.output().params();
        let new_output = new.output().params();
        assert_eq!(
            new_output[&format!("W_in_{cur_last}_output")],
            old_output[&format!("W_in_{prev_last}_output")]
        );
        assert_eq!(new_output["b_output"], old_output["b_output"]);

        train(&mut new, 1.0);
        old = new;
    }
}

#[test]
fn the_output_layer_is_reinitialized_when_not_copied() {
    let pretrain = pretrain(false, false, &[5, 3]);

    let mut old = pretrain.network_for_epoch(1, Mask::Unity).unwrap();
    train(&mut old, 2.0);

    let new = pretrain.network_for_epoch(2, Mask::Unity).unwrap();
    let fresh_output = new.output().params();
    let new = pretrain.copy_params_from_old_network(new, &old).unwrap();

    assert_eq!(new.output().params(), fresh_output);
    assert_eq!(
        new.hidden("hidden_0").unwrap().params(),
        old.hidden("hidden_0").unwrap().params()
    );
}

#[test]
fn copying_the_output_needs_matching_widths() {
    let pretrain = pretrain(false, true, &[5, 3]);

    let old = pretrain.network_for_epoch(1, Mask::Unity).unwrap();
    let new = pretrain.network_for_epoch(2, Mask::Unity).unwrap();

    assert!(matches!(
        pretrain.copy_params_from_old_network(new, &old),
        Err(PretrainErr::ParamShapeMismatch { .. })
    ));
}

#[test]
fn greedy_epochs_train_the_newest_layer_and_the_output() {
    let pretrain = pretrain(true, true, &[4, 4, 4]);

    assert_eq!(
        pretrain.train_directive_for_epoch(1).unwrap(),
        TrainDirective::All
    );

    let directive = pretrain.train_directive_for_epoch(3).unwrap();
    assert_eq!(
        directive,
        TrainDirective::Select {
            hidden_layers: BTreeSet::from(["hidden_2".to_string()]),
            with_output: true,
        }
    );

    let network = pretrain.network_for_epoch(3, Mask::Unity).unwrap();
    let trainable = network.trainable_params(&directive);
    assert_eq!(
        trainable,
        BTreeSet::from([
            "hidden_2.W_in_hidden_1_hidden_2".to_string(),
            "hidden_2.b_hidden_2".to_string(),
            "output.W_in_hidden_2_output".to_string(),
            "output.b_output".to_string(),
        ])
    );
}

#[test]
fn every_query_rejects_epochs_out_of_range() {
    let pretrain = pretrain(true, true, &[4, 4]);

    for epoch in [0, 3] {
        assert!(matches!(
            pretrain.topology_for_epoch(epoch),
            Err(PretrainErr::EpochOutOfRange { epochs: 2, .. })
        ));
        assert!(pretrain.network_for_epoch(epoch, Mask::Unity).is_err());
        assert!(pretrain.train_directive_for_epoch(epoch).is_err());
    }
}

#[test]
fn configs_are_loaded_from_disk() {
    let path = std::env::temp_dir().join("layerwise_pretrain_schedule_config.json");
    fs::write(
        &path,
        r#"{"num_inputs": 2, "num_outputs": 1, "hidden_size": [3], "loss": "mse"}"#,
    )
    .unwrap();

    let config = Config::from_json_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert!(pretrain_from_config(&config).unwrap().is_none());
    assert_eq!(config.network.hidden_size, [3]);
}

#[test]
fn a_missing_config_file_is_an_io_error() {
    let path = std::env::temp_dir().join("layerwise_pretrain_missing_config.json");
    assert!(matches!(Config::from_json_file(path), Err(PretrainErr::Io(_))));
}
