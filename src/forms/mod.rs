//! Data-entry forms: case intake, prescriptions, patients, profile.
//!
//! Every submit follows the same path: check the submission against the
//! form's schema (nothing touches the store when that fails), verify the
//! referenced rows belong to the signed-in practitioner, assign a business
//! number, then insert inside one transaction.

pub mod case;
pub mod patient;
pub mod prescription;
pub mod profile;

use serde::Serialize;
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::notice::Notice;
use crate::validation::ValidationErrors;

/// Result of an accepted submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    pub id: Uuid,
    /// Business number assigned to the new record, if the form creates one.
    pub number: Option<String>,
    pub notice: Notice,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("{failure}: {source}")]
    Database {
        failure: &'static str,
        #[source]
        source: DatabaseError,
    },
}

impl SubmitError {
    /// Notification shown to the practitioner for this failure.
    pub fn notice(&self) -> Notice {
        match self {
            SubmitError::Validation(_) => Notice::error("Please correct the highlighted fields"),
            SubmitError::Database { failure, .. } => Notice::error(*failure),
        }
    }
}

/// Wrap a store error with the form's user-facing failure message.
pub(crate) fn store_failure(failure: &'static str) -> impl Fn(DatabaseError) -> SubmitError {
    move |source| {
        tracing::warn!(failure, error = %source, "Form submission failed in store");
        SubmitError::Database { failure, source }
    }
}

/// Parse a field the schema has already checked as a UUID.
pub(crate) fn checked_uuid(field: &str, value: &str) -> Result<Uuid, ValidationErrors> {
    Uuid::parse_str(value.trim()).map_err(|_| ValidationErrors::single(field, "Invalid identifier"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_failure_notice_uses_form_message() {
        let err = SubmitError::Database {
            failure: "Failed to save case",
            source: DatabaseError::ConstraintViolation("boom".into()),
        };
        let notice = err.notice();
        assert_eq!(notice.title, "Error");
        assert_eq!(notice.description, "Failed to save case");
    }

    #[test]
    fn checked_uuid_reports_field() {
        let err = checked_uuid("patient_id", "nope").unwrap_err();
        assert_eq!(err.message_for("patient_id"), Some("Invalid identifier"));
    }
}
