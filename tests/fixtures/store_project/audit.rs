use serde::{Deserialize, Serialize};

/// Creation metadata shared by stored records
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stamp {
    pub created_at: Timestamp,
    pub created_by: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}
