use crate::audit::Stamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A village for sale
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Village {
    pub id: u64,
    /// Name shown in listings
    pub display_name: String,
    pub owner: Option<Owner>,
    pub status: Status,
    pub tags: Vec<Tag>,
    pub prices: HashMap<String, Price>,
    #[serde(flatten)]
    pub stamp: Stamp,
    #[serde(skip)]
    pub cache_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    pub level: Level,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    ForSale,
    Sold,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Tag {
    pub label: String,
}

pub type Price = f64;

/// Seniority of an owner
#[derive(Debug, Serialize, Deserialize)]
pub struct Level(pub i32);

impl Level {
    pub const NOVICE: Level = Level(1);
    pub const VETERAN: Level = Level(5);
}

#[derive(Debug, Deserialize)]
pub struct VillageForm {
    pub display_name: String,
    pub status: Status,
    #[serde(default)]
    pub tags: Vec<String>,
}
