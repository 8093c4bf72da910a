//! Dataset module: CSV parsing and COMPAS screening.

pub mod loader;
pub mod processor;

pub use loader::{load_compas, LoadSummary};
pub use processor::{apply_screening, compas_screening_rules, ScreeningRule};
