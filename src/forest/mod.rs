//! Random forest classifier.

mod error;
mod random_forest;
mod tree;

pub use error::{ForestError, Result};
pub use random_forest::{ForestParams, RandomForest};
pub use tree::{DecisionTree, Node};
