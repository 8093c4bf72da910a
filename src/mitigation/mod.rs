//! Bias mitigation transforms.

pub mod reweighing;

pub use reweighing::{CellWeights, Reweighing};
