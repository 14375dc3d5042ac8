//! Risk model components

pub mod engine;
pub mod forest;
pub mod tree;

pub use engine::{EngineState, RiskEngine, DEFAULT_SCORE};
pub use forest::RandomForest;
