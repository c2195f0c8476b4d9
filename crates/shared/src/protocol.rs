use serde::{Deserialize, Serialize};

use crate::domain::{Assumption, OutcomeItem};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub reason: String,
    pub people_served: Vec<String>,
    pub assumptions: Vec<Assumption>,
    pub direct_results: Vec<OutcomeItem>,
    pub indirect_results: Vec<OutcomeItem>,
    pub ultimate_impact: Vec<OutcomeItem>,
}

impl FormSnapshot {
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
