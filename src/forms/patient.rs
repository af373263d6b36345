//! New patient registration.

use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use super::{store_failure, SubmitError, SubmitOutcome};
use crate::db;
use crate::models::enums::PatientStatus;
use crate::models::Patient;
use crate::notice::Notice;
use crate::validation::{optional_text, FieldSource, FieldSpec, FormSchema, Rule, ValidationErrors};

const SAVE_FAILED: &str = "Failed to add patient";

const GENDERS: &[&str] = &["male", "female", "other"];
const BLOOD_GROUPS: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

pub const SCHEMA: FormSchema = FormSchema {
    form: "patient",
    fields: &[
        FieldSpec {
            name: "first_name",
            rules: &[Rule::Required("First name is required"), Rule::MaxLen(100)],
        },
        FieldSpec {
            name: "last_name",
            rules: &[Rule::Required("Last name is required"), Rule::MaxLen(100)],
        },
        FieldSpec {
            name: "date_of_birth",
            rules: &[Rule::Required("Date of birth is required"), Rule::Date],
        },
        FieldSpec {
            name: "gender",
            rules: &[Rule::OneOf(GENDERS)],
        },
        FieldSpec {
            name: "phone",
            rules: &[Rule::MaxLen(30)],
        },
        FieldSpec {
            name: "email",
            rules: &[Rule::Email, Rule::MaxLen(254)],
        },
        FieldSpec {
            name: "address",
            rules: &[Rule::MaxLen(500)],
        },
        FieldSpec {
            name: "blood_group",
            rules: &[Rule::OneOf(BLOOD_GROUPS)],
        },
        FieldSpec {
            name: "emergency_contact",
            rules: &[Rule::MaxLen(100)],
        },
        FieldSpec {
            name: "emergency_phone",
            rules: &[Rule::MaxLen(30)],
        },
        FieldSpec {
            name: "notes",
            rules: &[Rule::MaxLen(5000)],
        },
    ],
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PatientForm {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub notes: Option<String>,
    pub allergies: Vec<String>,
    pub tags: Vec<String>,
}

impl FieldSource for PatientForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "first_name" => Some(&self.first_name),
            "last_name" => Some(&self.last_name),
            "date_of_birth" => Some(&self.date_of_birth),
            "gender" => self.gender.as_deref(),
            "phone" => self.phone.as_deref(),
            "email" => self.email.as_deref(),
            "address" => self.address.as_deref(),
            "blood_group" => self.blood_group.as_deref(),
            "emergency_contact" => self.emergency_contact.as_deref(),
            "emergency_phone" => self.emergency_phone.as_deref(),
            "notes" => self.notes.as_deref(),
            _ => None,
        }
    }
}

/// Blank entries dropped, duplicates removed, order kept.
fn clean_list(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if !out.iter().any(|seen| seen == v) {
            out.push(v.to_string());
        }
    }
    out
}

pub fn submit_patient(
    conn: &Connection,
    practitioner_id: &Uuid,
    form: &PatientForm,
) -> Result<SubmitOutcome, SubmitError> {
    SCHEMA.validate(form)?;
    let date_of_birth = chrono::NaiveDate::parse_from_str(form.date_of_birth.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationErrors::single("date_of_birth", "Invalid date (expected YYYY-MM-DD)"))?;
    if date_of_birth > db::now_timestamp().date() {
        return Err(ValidationErrors::single("date_of_birth", "Date of birth cannot be in the future").into());
    }

    let fail = store_failure(SAVE_FAILED);
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| fail(e.into()))?;
    let now = db::now_timestamp();
    let patient = Patient {
        id: Uuid::new_v4(),
        practitioner_id: *practitioner_id,
        patient_number: db::next_business_number(&tx, "PT").map_err(&fail)?,
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        date_of_birth,
        gender: optional_text(&form.gender),
        phone: optional_text(&form.phone),
        email: optional_text(&form.email),
        address: optional_text(&form.address),
        blood_group: optional_text(&form.blood_group),
        emergency_contact: optional_text(&form.emergency_contact),
        emergency_phone: optional_text(&form.emergency_phone),
        allergies: clean_list(&form.allergies),
        tags: clean_list(&form.tags),
        notes: optional_text(&form.notes),
        status: PatientStatus::Active,
        created_at: now,
        updated_at: now,
    };
    db::insert_patient(&tx, &patient).map_err(&fail)?;
    tx.commit().map_err(|e| fail(e.into()))?;

    tracing::info!(patient_id = %patient.id, number = %patient.patient_number, "Patient added");
    Ok(SubmitOutcome {
        id: patient.id,
        number: Some(patient.patient_number),
        notice: Notice::success("Patient added successfully"),
    })
}
