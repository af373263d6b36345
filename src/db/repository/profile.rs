use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_timestamp, now_timestamp, parse_timestamp, parse_uuid};
use crate::db::query::Select;
use crate::db::DatabaseError;
use crate::models::PractitionerProfile;

const PROFILE_COLUMNS: &[&str] = &[
    "id",
    "full_name",
    "license_number",
    "specialization",
    "clinic_name",
    "contact_phone",
    "contact_email",
    "language_preference",
    "created_at",
    "updated_at",
];

struct ProfileRow {
    id: String,
    full_name: String,
    license_number: Option<String>,
    specialization: Option<String>,
    clinic_name: Option<String>,
    contact_phone: Option<String>,
    contact_email: Option<String>,
    language_preference: Option<String>,
    created_at: String,
    updated_at: String,
}

/// Create the practitioner's profile on first sign-in; existing rows are kept.
///
/// Returns `true` when a new row was written.
pub fn ensure_profile(
    conn: &Connection,
    id: &Uuid,
    full_name: &str,
    contact_email: Option<&str>,
) -> Result<bool, DatabaseError> {
    let now = format_timestamp(&now_timestamp());
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO profiles (id, full_name, contact_email, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![id.to_string(), full_name, contact_email, now],
    )?;
    Ok(inserted > 0)
}

pub fn get_profile(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<PractitionerProfile>, DatabaseError> {
    let row = Select::from("profiles", PROFILE_COLUMNS)
        .eq("id", id.to_string())
        .fetch_optional(conn, profile_row_from_rusqlite)?;
    row.map(profile_from_row).transpose()
}

/// Overwrite the editable profile fields. Errors with `NotFound` when the
/// profile does not exist.
pub fn update_profile(conn: &Connection, profile: &PractitionerProfile) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE profiles SET full_name = ?2, license_number = ?3, specialization = ?4,
         clinic_name = ?5, contact_phone = ?6, contact_email = ?7, language_preference = ?8,
         updated_at = ?9
         WHERE id = ?1",
        params![
            profile.id.to_string(),
            profile.full_name,
            profile.license_number,
            profile.specialization,
            profile.clinic_name,
            profile.contact_phone,
            profile.contact_email,
            profile.language_preference,
            format_timestamp(&profile.updated_at),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "profile".into(),
            id: profile.id.to_string(),
        });
    }
    Ok(())
}

pub fn profile_exists(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM profiles WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn profile_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ProfileRow, rusqlite::Error> {
    Ok(ProfileRow {
        id: row.get(0)?,
        full_name: row.get(1)?,
        license_number: row.get(2)?,
        specialization: row.get(3)?,
        clinic_name: row.get(4)?,
        contact_phone: row.get(5)?,
        contact_email: row.get(6)?,
        language_preference: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn profile_from_row(row: ProfileRow) -> Result<PractitionerProfile, DatabaseError> {
    Ok(PractitionerProfile {
        id: parse_uuid("profiles.id", &row.id)?,
        full_name: row.full_name,
        license_number: row.license_number,
        specialization: row.specialization,
        clinic_name: row.clinic_name,
        contact_phone: row.contact_phone,
        contact_email: row.contact_email,
        language_preference: row.language_preference,
        created_at: parse_timestamp("profiles.created_at", &row.created_at)?,
        updated_at: parse_timestamp("profiles.updated_at", &row.updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn ensure_profile_is_idempotent() {
        let conn = open_memory_database().unwrap();
        let id = Uuid::new_v4();
        assert!(ensure_profile(&conn, &id, "Dr. Hahnemann", Some("sam@example.org")).unwrap());
        assert!(!ensure_profile(&conn, &id, "Someone Else", None).unwrap());

        let profile = get_profile(&conn, &id).unwrap().unwrap();
        assert_eq!(profile.full_name, "Dr. Hahnemann");
        assert_eq!(profile.contact_email.as_deref(), Some("sam@example.org"));
        assert!(profile_exists(&conn, &id).unwrap());
    }

    #[test]
    fn update_profile_overwrites_fields() {
        let conn = open_memory_database().unwrap();
        let id = Uuid::new_v4();
        ensure_profile(&conn, &id, "Dr. Kent", None).unwrap();

        let mut profile = get_profile(&conn, &id).unwrap().unwrap();
        profile.clinic_name = Some("Kent Clinic".into());
        profile.specialization = Some("Classical Homeopathy".into());
        update_profile(&conn, &profile).unwrap();

        let reloaded = get_profile(&conn, &id).unwrap().unwrap();
        assert_eq!(reloaded.clinic_name.as_deref(), Some("Kent Clinic"));
        assert_eq!(reloaded.specialization.as_deref(), Some("Classical Homeopathy"));
    }

    #[test]
    fn update_missing_profile_is_not_found() {
        let conn = open_memory_database().unwrap();
        let id = Uuid::new_v4();
        ensure_profile(&conn, &id, "Dr. Boericke", None).unwrap();
        let mut profile = get_profile(&conn, &id).unwrap().unwrap();
        profile.id = Uuid::new_v4();
        assert!(matches!(
            update_profile(&conn, &profile),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn unknown_profile_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_profile(&conn, &Uuid::new_v4()).unwrap().is_none());
    }
}
