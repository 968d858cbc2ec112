//! Search result types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A hit's source document annotated with its identifier and relevance score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredDocument {
    /// Identifier of the hit in the index.
    pub id: String,

    /// Relevance score from the search engine.
    /// `None` when the engine did not score the hit (e.g. pure sort queries).
    pub score: Option<f64>,

    /// The indexed document body.
    pub source: Value,
}
