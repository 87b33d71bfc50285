pub mod arch;
pub mod configs;
pub mod error;
pub mod pretrain;

pub use error::{PretrainErr, Result};
