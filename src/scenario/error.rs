use rand::distributions::WeightedError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("task set '{0}' has no entries")]
    EmptyTaskSet(String),

    #[error("task set '{name}' has unusable weights: {source}")]
    InvalidWeights {
        name: String,
        #[source]
        source: WeightedError,
    },
}
