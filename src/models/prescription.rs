use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::PrescriptionStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub practitioner_id: Uuid,
    pub patient_id: Uuid,
    pub case_id: Uuid,
    pub remedy_id: Uuid,
    pub remedy_name: String,
    pub potency: String,
    pub dosage_instructions: String,
    pub frequency: String,
    pub duration: String,
    pub method: Option<String>,
    pub patient_instructions: Option<String>,
    pub follow_up_date: Option<NaiveDate>,
    pub prescription_number: String,
    pub prescription_date: NaiveDateTime,
    pub status: PrescriptionStatus,
}
