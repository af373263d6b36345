use rusqlite::{params, Connection};

use super::parse_uuid;
use crate::db::query::{Direction, Select};
use crate::db::DatabaseError;
use crate::models::Remedy;

const REMEDY_COLUMNS: &[&str] = &[
    "id",
    "name",
    "abbreviation",
    "common_name",
    "kingdom",
    "description",
    "is_acute_remedy",
];

struct RemedyRow {
    id: String,
    name: String,
    abbreviation: String,
    common_name: Option<String>,
    kingdom: Option<String>,
    description: Option<String>,
    is_acute_remedy: i32,
}

pub fn insert_remedy(conn: &Connection, remedy: &Remedy) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO remedies (id, name, abbreviation, common_name, kingdom, description, is_acute_remedy)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            remedy.id.to_string(),
            remedy.name,
            remedy.abbreviation,
            remedy.common_name,
            remedy.kingdom,
            remedy.description,
            remedy.is_acute_remedy as i32,
        ],
    )?;
    Ok(())
}

/// Remedies ordered by name, capped at `limit`.
pub fn list_remedies(conn: &Connection, limit: u32) -> Result<Vec<Remedy>, DatabaseError> {
    let rows = Select::from("remedies", REMEDY_COLUMNS)
        .order_by("name", Direction::Asc)
        .limit(limit)
        .fetch(conn, remedy_row_from_rusqlite)?;
    rows.into_iter().map(remedy_from_row).collect()
}

/// Exact-name lookup; the prescription form stores the remedy by name.
pub fn get_remedy_by_name(conn: &Connection, name: &str) -> Result<Option<Remedy>, DatabaseError> {
    let row = Select::from("remedies", REMEDY_COLUMNS)
        .eq("name", name.to_string())
        .fetch_optional(conn, remedy_row_from_rusqlite)?;
    row.map(remedy_from_row).transpose()
}

fn remedy_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<RemedyRow, rusqlite::Error> {
    Ok(RemedyRow {
        id: row.get(0)?,
        name: row.get(1)?,
        abbreviation: row.get(2)?,
        common_name: row.get(3)?,
        kingdom: row.get(4)?,
        description: row.get(5)?,
        is_acute_remedy: row.get(6)?,
    })
}

fn remedy_from_row(row: RemedyRow) -> Result<Remedy, DatabaseError> {
    Ok(Remedy {
        id: parse_uuid("remedies.id", &row.id)?,
        name: row.name,
        abbreviation: row.abbreviation,
        common_name: row.common_name,
        kingdom: row.kingdom,
        description: row.description,
        is_acute_remedy: row.is_acute_remedy != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn remedies_ordered_by_name_and_capped() {
        let conn = open_memory_database().unwrap();
        for (name, abbr) in [
            ("Sulphur", "Sulph."),
            ("Aconitum napellus", "Acon."),
            ("Nux vomica", "Nux-v."),
            ("Belladonna", "Bell."),
        ] {
            fixtures::remedy(&conn, name, abbr);
        }

        let names: Vec<String> = list_remedies(&conn, 3)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Aconitum napellus", "Belladonna", "Nux vomica"]);
    }

    #[test]
    fn lookup_by_exact_name() {
        let conn = open_memory_database().unwrap();
        let bell = fixtures::remedy(&conn, "Belladonna", "Bell.");
        assert_eq!(get_remedy_by_name(&conn, "Belladonna").unwrap(), Some(bell));
        assert!(get_remedy_by_name(&conn, "belladon").unwrap().is_none());
    }
}
