use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::api::models::Id;

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueueRequest {
    pub team_id: Id,

    /// Battle mode, for example `casual`.
    pub mode: String,
}

#[derive(Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus {
    pub battle_id: Id,
    pub status: BattleState,
}

#[derive(Deserialize, Debug, PartialEq, Clone)]
pub struct BattleStatus {
    pub status: BattleState,
}

/// Battle state as reported by the service.
///
/// Only the terminal state is known in advance, the rest are passed through verbatim.
#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(transparent)]
pub struct BattleState(pub String);

impl BattleState {
    pub const COMPLETED: &'static str = "Completed";

    #[inline]
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.0 == Self::COMPLETED
    }
}

impl Display for BattleState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BattleResult {
    #[serde(default)]
    pub turns: Option<i32>,

    /// `None` stands for a draw.
    #[serde(default)]
    pub winner_id: Option<Id>,

    #[serde(default)]
    pub rewards: Option<Rewards>,

    #[serde(default)]
    pub battle_log: Option<Vec<serde_json::Value>>,
}

impl BattleResult {
    pub fn battle_log(&self) -> &[serde_json::Value] {
        self.battle_log.as_deref().unwrap_or_default()
    }
}

#[derive(Deserialize, Debug, PartialEq, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct Rewards {
    #[serde(default)]
    pub rating_change: i32,

    /// Gold earned.
    #[serde(default)]
    pub currency: i64,

    #[serde(default)]
    pub experience_earned: i64,
}
