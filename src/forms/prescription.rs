//! Prescription form.

use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use super::{checked_uuid, store_failure, SubmitError, SubmitOutcome};
use crate::db;
use crate::models::enums::PrescriptionStatus;
use crate::models::Prescription;
use crate::notice::Notice;
use crate::validation::{optional_text, FieldSource, FieldSpec, FormSchema, Rule, ValidationErrors};

const SAVE_FAILED: &str = "Failed to create prescription";

pub const SCHEMA: FormSchema = FormSchema {
    form: "prescription",
    fields: &[
        FieldSpec {
            name: "patient_id",
            rules: &[Rule::Required("Patient is required"), Rule::Uuid],
        },
        FieldSpec {
            name: "case_id",
            rules: &[Rule::Required("Case is required"), Rule::Uuid],
        },
        FieldSpec {
            name: "remedy_name",
            rules: &[Rule::Required("Remedy name is required"), Rule::MaxLen(200)],
        },
        FieldSpec {
            name: "potency",
            rules: &[Rule::Required("Potency is required"), Rule::MaxLen(50)],
        },
        FieldSpec {
            name: "dosage_instructions",
            rules: &[Rule::Required("Dosage instructions are required"), Rule::MaxLen(1000)],
        },
        FieldSpec {
            name: "frequency",
            rules: &[Rule::Required("Frequency is required"), Rule::MaxLen(200)],
        },
        FieldSpec {
            name: "duration",
            rules: &[Rule::Required("Duration is required"), Rule::MaxLen(200)],
        },
        FieldSpec {
            name: "method",
            rules: &[Rule::MaxLen(200)],
        },
        FieldSpec {
            name: "patient_instructions",
            rules: &[Rule::MaxLen(2000)],
        },
        FieldSpec {
            name: "follow_up_date",
            rules: &[Rule::Date],
        },
    ],
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrescriptionForm {
    pub patient_id: String,
    pub case_id: String,
    pub remedy_name: String,
    pub potency: String,
    pub dosage_instructions: String,
    pub frequency: String,
    pub duration: String,
    pub method: Option<String>,
    pub patient_instructions: Option<String>,
    pub follow_up_date: Option<String>,
}

impl FieldSource for PrescriptionForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "patient_id" => Some(&self.patient_id),
            "case_id" => Some(&self.case_id),
            "remedy_name" => Some(&self.remedy_name),
            "potency" => Some(&self.potency),
            "dosage_instructions" => Some(&self.dosage_instructions),
            "frequency" => Some(&self.frequency),
            "duration" => Some(&self.duration),
            "method" => self.method.as_deref(),
            "patient_instructions" => self.patient_instructions.as_deref(),
            "follow_up_date" => self.follow_up_date.as_deref(),
            _ => None,
        }
    }
}

/// Validate and store an active prescription.
///
/// The remedy is looked up by exact name and the case must be one of the
/// selected patient's cases.
pub fn submit_prescription(
    conn: &Connection,
    practitioner_id: &Uuid,
    form: &PrescriptionForm,
) -> Result<SubmitOutcome, SubmitError> {
    SCHEMA.validate(form)?;
    let patient_id = checked_uuid("patient_id", &form.patient_id)?;
    let case_id = checked_uuid("case_id", &form.case_id)?;
    let follow_up_date = optional_text(&form.follow_up_date)
        .map(|d| chrono::NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| ValidationErrors::single("follow_up_date", "Invalid date (expected YYYY-MM-DD)"))?;

    let fail = store_failure(SAVE_FAILED);
    let remedy_name = form.remedy_name.trim();
    let Some(remedy) = db::get_remedy_by_name(conn, remedy_name).map_err(&fail)? else {
        return Err(ValidationErrors::single("remedy_name", "Unknown remedy").into());
    };
    match db::get_case(conn, practitioner_id, &case_id).map_err(&fail)? {
        Some(case) if case.patient_id == patient_id => {}
        _ => return Err(ValidationErrors::single("case_id", "Case not found for this patient").into()),
    }

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| fail(e.into()))?;
    let rx = Prescription {
        id: Uuid::new_v4(),
        practitioner_id: *practitioner_id,
        patient_id,
        case_id,
        remedy_id: remedy.id,
        remedy_name: remedy.name,
        potency: form.potency.trim().to_string(),
        dosage_instructions: form.dosage_instructions.trim().to_string(),
        frequency: form.frequency.trim().to_string(),
        duration: form.duration.trim().to_string(),
        method: optional_text(&form.method),
        patient_instructions: optional_text(&form.patient_instructions),
        follow_up_date,
        prescription_number: db::next_business_number(&tx, "RX").map_err(&fail)?,
        prescription_date: db::now_timestamp(),
        status: PrescriptionStatus::Active,
    };
    db::insert_prescription(&tx, &rx).map_err(&fail)?;
    tx.commit().map_err(|e| fail(e.into()))?;

    tracing::info!(prescription_id = %rx.id, number = %rx.prescription_number, "Prescription created");
    Ok(SubmitOutcome {
        id: rx.id,
        number: Some(rx.prescription_number),
        notice: Notice::success("Prescription created successfully"),
    })
}
