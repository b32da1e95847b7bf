pub mod checkpoint;
pub mod dataset;
pub mod error;
pub mod frame;
pub mod types;

pub use checkpoint::Checkpoint;
pub use dataset::{Dataset, Record, display_value};
pub use error::*;
pub use types::*;
