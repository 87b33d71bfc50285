use std::{collections::BTreeSet, fmt};

use serde::Serialize;

/// Which parameters the trainer may update during an epoch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainDirective {
    /// Every parameter of the network is trainable.
    #[default]
    All,
    /// Only the selected hidden layers, and the output layer if `with_output`, are
    /// trainable. Everything else stays frozen.
    Select {
        hidden_layers: BTreeSet<String>,
        with_output: bool,
    },
}

impl TrainDirective {
    /// Returns whether the hidden layer `name` gets updated.
    pub fn trains_hidden(&self, name: &str) -> bool {
        match self {
            TrainDirective::All => true,
            TrainDirective::Select { hidden_layers, .. } => hidden_layers.contains(name),
        }
    }

    /// Returns whether the output layer gets updated.
    pub fn trains_output(&self) -> bool {
        match self {
            TrainDirective::All => true,
            TrainDirective::Select { with_output, .. } => *with_output,
        }
    }
}

impl fmt::Display for TrainDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainDirective::All => write!(f, "all"),
            TrainDirective::Select {
                hidden_layers,
                with_output,
            } => {
                let layers: Vec<_> = hidden_layers.iter().map(String::as_str).collect();
                write!(f, "[{}]", layers.join(", "))?;
                if *with_output {
                    write!(f, " + output")?;
                }
                Ok(())
            }
        }
    }
}
