use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{CaseStatus, CaseType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalCase {
    pub id: Uuid,
    pub practitioner_id: Uuid,
    pub patient_id: Uuid,
    pub case_number: String,
    pub case_type: CaseType,
    pub case_status: CaseStatus,
    pub chief_complaint: String,
    pub history_of_complaint: Option<String>,
    pub medical_history: Option<String>,
    pub family_history: Option<String>,
    pub physical_examination: Option<String>,
    pub mental_emotional_state: Option<String>,
    pub consultation_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Case picker entry used by the prescription form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseOption {
    pub id: Uuid,
    pub case_number: String,
    pub chief_complaint: String,
    pub consultation_date: NaiveDateTime,
}
