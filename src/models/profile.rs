use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The practitioner's own profile; `id` is the identity-service user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PractitionerProfile {
    pub id: Uuid,
    pub full_name: String,
    pub license_number: Option<String>,
    pub specialization: Option<String>,
    pub clinic_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub language_preference: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
