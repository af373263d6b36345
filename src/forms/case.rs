//! Case intake form.

use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use super::{checked_uuid, store_failure, SubmitError, SubmitOutcome};
use crate::db::{self, repository::now_timestamp};
use crate::models::enums::{CaseStatus, CaseType};
use crate::models::ClinicalCase;
use crate::notice::Notice;
use crate::validation::{optional_text, FieldSource, FieldSpec, FormSchema, Rule, ValidationErrors};

const SAVE_FAILED: &str = "Failed to save case";

const CASE_TYPES: &[&str] = &["acute", "chronic", "follow-up", "emergency"];

pub const SCHEMA: FormSchema = FormSchema {
    form: "case",
    fields: &[
        FieldSpec {
            name: "patient_id",
            rules: &[Rule::Required("Patient is required"), Rule::Uuid],
        },
        FieldSpec {
            name: "case_type",
            rules: &[Rule::Required("Case type is required"), Rule::OneOf(CASE_TYPES)],
        },
        FieldSpec {
            name: "chief_complaint",
            rules: &[Rule::Required("Chief complaint is required"), Rule::MaxLen(2000)],
        },
        FieldSpec {
            name: "history_of_complaint",
            rules: &[Rule::MaxLen(10_000)],
        },
        FieldSpec {
            name: "medical_history",
            rules: &[Rule::MaxLen(10_000)],
        },
        FieldSpec {
            name: "family_history",
            rules: &[Rule::MaxLen(10_000)],
        },
        FieldSpec {
            name: "physical_examination",
            rules: &[Rule::MaxLen(10_000)],
        },
        FieldSpec {
            name: "mental_emotional_state",
            rules: &[Rule::MaxLen(10_000)],
        },
    ],
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CaseForm {
    pub patient_id: String,
    pub case_type: String,
    pub chief_complaint: String,
    pub history_of_complaint: Option<String>,
    pub medical_history: Option<String>,
    pub family_history: Option<String>,
    pub physical_examination: Option<String>,
    pub mental_emotional_state: Option<String>,
}

impl FieldSource for CaseForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "patient_id" => Some(&self.patient_id),
            "case_type" => Some(&self.case_type),
            "chief_complaint" => Some(&self.chief_complaint),
            "history_of_complaint" => self.history_of_complaint.as_deref(),
            "medical_history" => self.medical_history.as_deref(),
            "family_history" => self.family_history.as_deref(),
            "physical_examination" => self.physical_examination.as_deref(),
            "mental_emotional_state" => self.mental_emotional_state.as_deref(),
            _ => None,
        }
    }
}

/// Validate and store a new case as a draft.
pub fn submit_case(
    conn: &Connection,
    practitioner_id: &Uuid,
    form: &CaseForm,
) -> Result<SubmitOutcome, SubmitError> {
    SCHEMA.validate(form)?;
    let patient_id = checked_uuid("patient_id", &form.patient_id)?;
    let case_type: CaseType = form
        .case_type
        .trim()
        .parse()
        .map_err(|_| ValidationErrors::single("case_type", "Case type is required"))?;

    let fail = store_failure(SAVE_FAILED);
    if db::get_patient(conn, practitioner_id, &patient_id)
        .map_err(&fail)?
        .is_none()
    {
        return Err(ValidationErrors::single("patient_id", "Patient not found").into());
    }

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| fail(e.into()))?;
    let now = now_timestamp();
    let case = ClinicalCase {
        id: Uuid::new_v4(),
        practitioner_id: *practitioner_id,
        patient_id,
        case_number: db::next_business_number(&tx, "CASE").map_err(&fail)?,
        case_type,
        case_status: CaseStatus::Draft,
        chief_complaint: form.chief_complaint.trim().to_string(),
        history_of_complaint: optional_text(&form.history_of_complaint),
        medical_history: optional_text(&form.medical_history),
        family_history: optional_text(&form.family_history),
        physical_examination: optional_text(&form.physical_examination),
        mental_emotional_state: optional_text(&form.mental_emotional_state),
        consultation_date: now,
        created_at: now,
        updated_at: now,
    };
    db::insert_case(&tx, &case).map_err(&fail)?;
    tx.commit().map_err(|e| fail(e.into()))?;

    tracing::info!(case_id = %case.id, number = %case.case_number, "Case saved");
    Ok(SubmitOutcome {
        id: case.id,
        number: Some(case.case_number),
        notice: Notice::success("Case saved successfully"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::sqlite::open_memory_database;

    fn count(conn: &Connection, sql: &str) -> i64 {
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    fn form_for(patient_id: Uuid) -> CaseForm {
        CaseForm {
            patient_id: patient_id.to_string(),
            case_type: "chronic".into(),
            chief_complaint: "Recurring migraine, worse from sun".into(),
            mental_emotional_state: Some("  Irritable before the attack ".into()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_chief_complaint_rejected_before_store() {
        let conn = open_memory_database().unwrap();
        let doc = fixtures::practitioner(&conn, "Dr. Hahnemann");
        let patient = fixtures::patient(&conn, doc, "Ada", "Lovelace");
        let sequences_before = count(&conn, "SELECT COUNT(*) FROM number_sequences");

        let mut form = form_for(patient.id);
        form.chief_complaint = "   ".into();
        let err = submit_case(&conn, &doc, &form).unwrap_err();

        let SubmitError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.message_for("chief_complaint"), Some("Chief complaint is required"));
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM cases"), 0);
        assert_eq!(
            count(&conn, "SELECT COUNT(*) FROM number_sequences"),
            sequences_before
        );
    }

    #[test]
    fn valid_case_is_stored_as_draft() {
        let conn = open_memory_database().unwrap();
        let doc = fixtures::practitioner(&conn, "Dr. Hahnemann");
        let patient = fixtures::patient(&conn, doc, "Ada", "Lovelace");

        let outcome = submit_case(&conn, &doc, &form_for(patient.id)).unwrap();
        assert_eq!(outcome.number.as_deref(), Some("CASE-000001"));
        assert_eq!(outcome.notice.description, "Case saved successfully");

        let stored = db::get_case(&conn, &doc, &outcome.id).unwrap().unwrap();
        assert_eq!(stored.case_status, CaseStatus::Draft);
        assert_eq!(stored.case_type, CaseType::Chronic);
        assert_eq!(stored.mental_emotional_state.as_deref(), Some("Irritable before the attack"));
        assert!(stored.family_history.is_none());
    }

    #[test]
    fn unknown_case_type_is_field_error() {
        let conn = open_memory_database().unwrap();
        let doc = fixtures::practitioner(&conn, "Dr. Hahnemann");
        let patient = fixtures::patient(&conn, doc, "Ada", "Lovelace");

        let mut form = form_for(patient.id);
        form.case_type = "weekly".into();
        let SubmitError::Validation(errors) = submit_case(&conn, &doc, &form).unwrap_err() else {
            panic!("expected validation error");
        };
        assert!(errors.message_for("case_type").is_some());
    }

    #[test]
    fn other_practitioners_patient_is_rejected() {
        let conn = open_memory_database().unwrap();
        let owner = fixtures::practitioner(&conn, "Dr. Owner");
        let intruder = fixtures::practitioner(&conn, "Dr. Intruder");
        let patient = fixtures::patient(&conn, owner, "Ada", "Lovelace");

        let SubmitError::Validation(errors) =
            submit_case(&conn, &intruder, &form_for(patient.id)).unwrap_err()
        else {
            panic!("expected validation error");
        };
        assert_eq!(errors.message_for("patient_id"), Some("Patient not found"));
        assert_eq!(count(&conn, "SELECT COUNT(*) FROM cases"), 0);
    }

    #[test]
    fn consecutive_cases_get_distinct_numbers() {
        let conn = open_memory_database().unwrap();
        let doc = fixtures::practitioner(&conn, "Dr. Hahnemann");
        let patient = fixtures::patient(&conn, doc, "Ada", "Lovelace");

        let a = submit_case(&conn, &doc, &form_for(patient.id)).unwrap();
        let b = submit_case(&conn, &doc, &form_for(patient.id)).unwrap();
        assert_ne!(a.number, b.number);
    }
}
