use serde::Deserialize;

/// Current player's profile.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub username: String,
    pub level: i32,

    /// Gold.
    pub currency: i64,

    pub rating: f64,
    pub roster_count: i32,
    pub team_count: i32,
}
