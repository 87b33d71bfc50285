use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The result type used in the entire pretraining module.
pub type Result<T> = std::result::Result<T, PretrainErr>;

/// The pretraining module's error type.
#[derive(Debug)]
pub enum PretrainErr {
    /// The `pretrain` option holds a value that isn't a known scheme.
    UnknownPretrainType(String),
    /// Layer-wise pretraining was requested for a network given as a JSON topology.
    JsonTopology,
    /// The configuration is malformed.
    InvalidConfig(String),
    /// The topology has no hidden layers to grow.
    EmptyTopology,
    EpochOutOfRange {
        epoch: usize,
        epochs: usize,
    },
    /// The old and new output layers hold a different amount of parameters.
    OutputParamCountMismatch {
        old: usize,
        new: usize,
    },
    /// A hidden layer of the old network doesn't exist in the new one.
    MissingHiddenLayer(String),
    /// The previous epoch's hidden layers aren't all present in the current epoch.
    LayersNotPrefix {
        epoch: usize,
        missing: Vec<String>,
    },
    UnknownParam {
        layer: String,
        param: String,
    },
    MissingParam {
        layer: String,
        param: String,
    },
    ParamShapeMismatch {
        layer: String,
        param: String,
        got: Vec<usize>,
        expected: Vec<usize>,
    },
    Io(io::Error),
    Json(serde_json::Error),
}

impl Display for PretrainErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PretrainErr::UnknownPretrainType(kind) => write!(f, "unknown pretrain type: {kind}"),
            PretrainErr::JsonTopology => {
                write!(f, "cannot handle JSON network topology in pretrain")
            }
            PretrainErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            PretrainErr::EmptyTopology => write!(f, "the network has no hidden layers"),
            PretrainErr::EpochOutOfRange { epoch, epochs } => {
                write!(f, "epoch {epoch} is out of range, expected 1..={epochs}")
            }
            PretrainErr::OutputParamCountMismatch { old, new } => write!(
                f,
                "output layer parameter count mismatch, old network has {old} and new network has {new}"
            ),
            PretrainErr::MissingHiddenLayer(name) => {
                write!(f, "hidden layer {name} is missing in the new network")
            }
            PretrainErr::LayersNotPrefix { epoch, missing } => write!(
                f,
                "hidden layers {missing:?} of epoch {} are missing in epoch {epoch}",
                epoch.saturating_sub(1)
            ),
            PretrainErr::UnknownParam { layer, param } => {
                write!(f, "layer {layer} has no parameter named {param}")
            }
            PretrainErr::MissingParam { layer, param } => {
                write!(f, "parameter {param} of layer {layer} was not given")
            }
            PretrainErr::ParamShapeMismatch {
                layer,
                param,
                got,
                expected,
            } => write!(
                f,
                "parameter {param} of layer {layer} has shape {expected:?}, got {got:?}"
            ),
            PretrainErr::Io(e) => write!(f, "io error: {e}"),
            PretrainErr::Json(e) => write!(f, "invalid JSON: {e}"),
        }
    }
}

impl Error for PretrainErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PretrainErr::Io(e) => Some(e),
            PretrainErr::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PretrainErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for PretrainErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
