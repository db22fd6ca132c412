use serde::{Deserialize, Serialize};

use super::query_utils::id_string;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Library {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
}

/// Genre, tag or collection as listed by the metadata endpoints
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NamedEntry {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthToken {
    #[serde(default)]
    pub token: Option<String>,
}
