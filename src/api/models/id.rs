use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Opaque identifier of a player, unit, team or battle.
///
/// The service is free to send either a string or a number,
/// the original form is preserved when the identifier is sent back.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Id {
    Integer(i64),
    String(String),
}

impl Display for Id {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(id) => write!(formatter, "{}", id),
            Self::String(id) => formatter.write_str(id),
        }
    }
}

impl From<i64> for Id {
    fn from(id: i64) -> Self {
        Self::Integer(id)
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Self::String(id.to_string())
    }
}

impl From<String> for Id {
    fn from(id: String) -> Self {
        Self::String(id)
    }
}
