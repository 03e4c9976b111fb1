use serde::Deserialize;

use crate::api::models::Id;

#[derive(Deserialize, Debug, PartialEq, Clone, Copy)]
pub struct UnitStats {
    pub health: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
}

/// Unit offered in the shop.
#[derive(Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ShopUnit {
    #[serde(default)]
    pub id: Option<Id>,

    pub name: String,

    #[serde(rename = "class")]
    pub class_: String,

    #[serde(flatten)]
    pub stats: UnitStats,

    pub unlock_cost: i64,

    #[serde(default)]
    pub already_owned: bool,
}

/// Unit owned by the player.
#[derive(Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RosterUnit {
    pub id: Id,
    pub name: String,

    #[serde(rename = "class")]
    pub class_: String,

    #[serde(default)]
    pub level: i32,

    #[serde(flatten)]
    pub stats: UnitStats,

    #[serde(default)]
    pub abilities: Vec<Ability>,
}

#[derive(Deserialize, Debug, PartialEq, Clone)]
pub struct Ability {
    pub name: String,
}
