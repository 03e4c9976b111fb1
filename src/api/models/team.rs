use serde::{Deserialize, Serialize};

use crate::api::models::Id;

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamRequest {
    pub name: String,
    pub unit_ids: Vec<Id>,
    pub strategy: Strategy,
}

#[derive(Serialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub formation: String,

    /// Targeting preferences in order of priority, for example `lowest_hp`.
    pub target_priority: Vec<String>,
}

#[derive(Deserialize, Debug, PartialEq, Clone)]
pub struct Team {
    pub id: Id,
    pub name: String,

    /// Team members as the service describes them.
    #[serde(default)]
    pub units: Vec<serde_json::Value>,
}
