use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remedy {
    pub id: Uuid,
    pub name: String,
    pub abbreviation: String,
    pub common_name: Option<String>,
    pub kingdom: Option<String>,
    pub description: Option<String>,
    pub is_acute_remedy: bool,
}
