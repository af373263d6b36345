//! Practitioner profile editing.

use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use super::{store_failure, SubmitError, SubmitOutcome};
use crate::db::{self, DatabaseError};
use crate::models::PractitionerProfile;
use crate::notice::Notice;
use crate::validation::{optional_text, FieldSource, FieldSpec, FormSchema, Rule};

const SAVE_FAILED: &str = "Failed to update profile";

pub const SCHEMA: FormSchema = FormSchema {
    form: "profile",
    fields: &[
        FieldSpec {
            name: "full_name",
            rules: &[Rule::Required("Full name is required"), Rule::MaxLen(200)],
        },
        FieldSpec {
            name: "license_number",
            rules: &[Rule::MaxLen(100)],
        },
        FieldSpec {
            name: "specialization",
            rules: &[Rule::MaxLen(200)],
        },
        FieldSpec {
            name: "clinic_name",
            rules: &[Rule::MaxLen(200)],
        },
        FieldSpec {
            name: "contact_phone",
            rules: &[Rule::MaxLen(30)],
        },
        FieldSpec {
            name: "contact_email",
            rules: &[Rule::Email, Rule::MaxLen(254)],
        },
        FieldSpec {
            name: "language_preference",
            rules: &[Rule::MaxLen(20)],
        },
    ],
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub full_name: String,
    pub license_number: Option<String>,
    pub specialization: Option<String>,
    pub clinic_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub language_preference: Option<String>,
}

impl FieldSource for ProfileForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "full_name" => Some(&self.full_name),
            "license_number" => self.license_number.as_deref(),
            "specialization" => self.specialization.as_deref(),
            "clinic_name" => self.clinic_name.as_deref(),
            "contact_phone" => self.contact_phone.as_deref(),
            "contact_email" => self.contact_email.as_deref(),
            "language_preference" => self.language_preference.as_deref(),
            _ => None,
        }
    }
}

/// Overwrite the signed-in practitioner's own profile.
pub fn submit_profile(
    conn: &Connection,
    practitioner_id: &Uuid,
    form: &ProfileForm,
) -> Result<SubmitOutcome, SubmitError> {
    SCHEMA.validate(form)?;

    let fail = store_failure(SAVE_FAILED);
    let existing = db::get_profile(conn, practitioner_id)
        .map_err(&fail)?
        .ok_or_else(|| {
            fail(DatabaseError::NotFound {
                entity_type: "profile".into(),
                id: practitioner_id.to_string(),
            })
        })?;

    let profile = PractitionerProfile {
        full_name: form.full_name.trim().to_string(),
        license_number: optional_text(&form.license_number),
        specialization: optional_text(&form.specialization),
        clinic_name: optional_text(&form.clinic_name),
        contact_phone: optional_text(&form.contact_phone),
        contact_email: optional_text(&form.contact_email),
        language_preference: optional_text(&form.language_preference)
            .or(existing.language_preference),
        updated_at: db::now_timestamp(),
        ..existing
    };
    db::update_profile(conn, &profile).map_err(&fail)?;

    tracing::info!(practitioner_id = %practitioner_id, "Profile updated");
    Ok(SubmitOutcome {
        id: profile.id,
        number: None,
        notice: Notice::success("Profile updated successfully!"),
    })
}
