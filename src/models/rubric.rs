use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One repertory rubric.
///
/// `remedy_grades` is whatever the reference loader stored: normally an
/// object of remedy name → grade (0..=3), but rendering has to cope with it
/// being absent, malformed or some other JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    pub id: Uuid,
    pub chapter: String,
    pub section: Option<String>,
    pub subsection: Option<String>,
    pub rubric_text: String,
    pub complete_path: String,
    pub level: i32,
    pub parent_id: Option<Uuid>,
    pub remedy_grades: Option<serde_json::Value>,
}
