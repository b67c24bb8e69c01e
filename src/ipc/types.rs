use crate::store::Snapshot;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Sole owner of the live snapshot. Mutating handlers replace `snapshot`
/// wholesale with the reducer's output.
pub struct AppState {
    pub snapshot: Snapshot,
    pub top_performers_limit: usize,
}

impl AppState {
    pub fn new(snapshot: Snapshot, top_performers_limit: usize) -> Self {
        Self {
            snapshot,
            top_performers_limit,
        }
    }
}
