//! Repository layer: table-scoped database operations.
//!
//! Every practitioner-owned table is read through the practitioner's id,
//! so one practitioner never sees another's rows.

mod clinical_case;
mod patient;
mod prescription;
mod profile;
mod remedy;
mod rubric;
mod sequence;

use chrono::{NaiveDateTime, Timelike};
use uuid::Uuid;

use super::DatabaseError;

pub use clinical_case::*;
pub use patient::*;
pub use prescription::*;
pub use profile::*;
pub use remedy::*;
pub use rubric::*;
pub use sequence::*;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(value)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("{field}: {e}")))
}

pub(crate) fn parse_timestamp(field: &str, value: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("{field}: {e}")))
}

pub(crate) fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Current UTC time truncated to whole seconds (the stored precision).
pub fn now_timestamp() -> NaiveDateTime {
    let now = chrono::Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Text arrays are stored as JSON; anything unreadable decodes as empty.
pub(crate) fn decode_list(value: &str) -> Vec<String> {
    serde_json::from_str(value).unwrap_or_default()
}

pub(crate) fn encode_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".into())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;
    use rusqlite::Connection;
    use uuid::Uuid;

    use super::*;
    use crate::models::enums::*;
    use crate::models::*;

    pub fn practitioner(conn: &Connection, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        ensure_profile(conn, &id, name, None).unwrap();
        id
    }

    pub fn patient(conn: &Connection, practitioner_id: Uuid, first: &str, last: &str) -> Patient {
        let now = now_timestamp();
        let patient = Patient {
            id: Uuid::new_v4(),
            practitioner_id,
            patient_number: next_business_number(conn, "PT").unwrap(),
            first_name: first.into(),
            last_name: last.into(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 4, 12).unwrap(),
            gender: None,
            phone: None,
            email: None,
            address: None,
            blood_group: None,
            emergency_contact: None,
            emergency_phone: None,
            allergies: vec![],
            tags: vec![],
            notes: None,
            status: PatientStatus::Active,
            created_at: now,
            updated_at: now,
        };
        insert_patient(conn, &patient).unwrap();
        patient
    }

    pub fn case(
        conn: &Connection,
        patient: &Patient,
        complaint: &str,
        consultation_date: &str,
    ) -> ClinicalCase {
        let now = now_timestamp();
        let case = ClinicalCase {
            id: Uuid::new_v4(),
            practitioner_id: patient.practitioner_id,
            patient_id: patient.id,
            case_number: next_business_number(conn, "CASE").unwrap(),
            case_type: CaseType::Chronic,
            case_status: CaseStatus::Draft,
            chief_complaint: complaint.into(),
            history_of_complaint: None,
            medical_history: None,
            family_history: None,
            physical_examination: None,
            mental_emotional_state: None,
            consultation_date: parse_timestamp("consultation_date", consultation_date).unwrap(),
            created_at: now,
            updated_at: now,
        };
        insert_case(conn, &case).unwrap();
        case
    }

    pub fn remedy(conn: &Connection, name: &str, abbreviation: &str) -> Remedy {
        let remedy = Remedy {
            id: Uuid::new_v4(),
            name: name.into(),
            abbreviation: abbreviation.into(),
            common_name: None,
            kingdom: None,
            description: None,
            is_acute_remedy: false,
        };
        insert_remedy(conn, &remedy).unwrap();
        remedy
    }

    pub fn rubric(
        conn: &Connection,
        path: &str,
        text: &str,
        grades: Option<serde_json::Value>,
    ) -> Rubric {
        let rubric = Rubric {
            id: Uuid::new_v4(),
            chapter: path.split(',').next().unwrap_or(path).trim().to_string(),
            section: None,
            subsection: None,
            rubric_text: text.into(),
            complete_path: path.into(),
            level: 1,
            parent_id: None,
            remedy_grades: grades,
        };
        insert_rubric(conn, &rubric).unwrap();
        rubric
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_round_trip_is_second_precision() {
        let now = now_timestamp();
        let text = format_timestamp(&now);
        assert_eq!(parse_timestamp("t", &text).unwrap(), now);
    }

    #[test]
    fn parse_timestamp_accepts_iso_separator() {
        assert!(parse_timestamp("t", "2024-03-01T09:30:00").is_ok());
        assert!(parse_timestamp("t", "yesterday").is_err());
    }

    #[test]
    fn list_codec_tolerates_garbage() {
        assert_eq!(decode_list("[\"Sulphur\"]"), vec!["Sulphur".to_string()]);
        assert!(decode_list("not json").is_empty());
        assert_eq!(encode_list(&[]), "[]");
    }
}
