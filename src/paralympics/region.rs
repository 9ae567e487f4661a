// Region records: one row per National Olympic Committee code.

use super::schema::RegionSchema;
use crate::db::{is_unique_violation, StoreError};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A participating nation or territory, keyed by its NOC code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    #[serde(rename = "NOC")]
    pub noc: String,

    pub region: String,

    #[serde(default)]
    pub notes: Option<String>,
}

impl Region {
    pub fn new(noc: &str, region: &str, notes: Option<&str>) -> Self {
        Region {
            noc: noc.to_string(),
            region: region.to_string(),
            notes: notes.map(str::to_string),
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Region {
            noc: row.get(0)?,
            region: row.get(1)?,
            notes: row.get(2)?,
        })
    }
}

/// Read regions from a CSV. Every row must pass the same rules as `POST /noc`.
pub fn load_regions_csv(csv_path: &Path) -> Result<Vec<Region>> {
    let mut rdr = csv::Reader::from_path(csv_path).context("Failed to open regions CSV file")?;

    let mut regions = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let region: Region = result.context("Failed to deserialize region")?;
        RegionSchema
            .check(&region)
            .with_context(|| format!("Invalid region on data row {}", i + 1))?;
        regions.push(region);
    }

    Ok(regions)
}

/// Insert one region. A taken NOC code yields [`StoreError::Duplicate`].
pub fn insert_region(conn: &Connection, region: &Region) -> Result<()> {
    let result = conn.execute(
        "INSERT INTO region (NOC, region, notes) VALUES (?1, ?2, ?3)",
        params![region.noc, region.region, region.notes],
    );

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(StoreError::Duplicate {
            entity: "Region",
            key: region.noc.clone(),
        }
        .into()),
        Err(e) => Err(e).context("Failed to insert region"),
    }
}

/// Bulk insert used by the importer. Codes already present are skipped, so
/// importing the same file twice is a no-op.
pub fn insert_regions(conn: &Connection, regions: &[Region]) -> Result<usize> {
    let mut inserted = 0;
    let mut duplicates = 0;

    for region in regions {
        let changed = conn.execute(
            "INSERT OR IGNORE INTO region (NOC, region, notes) VALUES (?1, ?2, ?3)",
            params![region.noc, region.region, region.notes],
        )?;

        if changed == 1 {
            inserted += 1;
        } else {
            duplicates += 1;
        }
    }

    tracing::info!(inserted, duplicates, "regions imported");
    Ok(inserted)
}

pub fn get_all_regions(conn: &Connection) -> Result<Vec<Region>> {
    let mut stmt = conn.prepare("SELECT NOC, region, notes FROM region ORDER BY NOC")?;
    let regions = stmt
        .query_map([], Region::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(regions)
}

pub fn get_region(conn: &Connection, noc: &str) -> Result<Option<Region>> {
    let region = conn
        .query_row(
            "SELECT NOC, region, notes FROM region WHERE NOC = ?1",
            params![noc],
            Region::from_row,
        )
        .optional()?;
    Ok(region)
}

/// Overwrite name and notes of an existing region.
pub fn update_region(conn: &Connection, region: &Region) -> Result<()> {
    let changed = conn.execute(
        "UPDATE region SET region = ?2, notes = ?3 WHERE NOC = ?1",
        params![region.noc, region.region, region.notes],
    )?;

    if changed == 0 {
        return Err(StoreError::NotFound {
            entity: "Region",
            key: region.noc.clone(),
        }
        .into());
    }
    Ok(())
}

/// Delete by code. Events that reference the code are left as they are.
pub fn delete_region(conn: &Connection, noc: &str) -> Result<()> {
    let changed = conn.execute("DELETE FROM region WHERE NOC = ?1", params![noc])?;

    if changed == 0 {
        return Err(StoreError::NotFound {
            entity: "Region",
            key: noc.to_string(),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_database;
    use std::io::Write;

    fn new_region() -> Region {
        Region::new("NEW", "New Region", Some("Some notes about the new region"))
    }

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_create_new_region() {
        let region = new_region();

        assert_eq!(region.noc, "NEW");
        assert_eq!(region.region, "New Region");
        assert_eq!(region.notes.as_deref(), Some("Some notes about the new region"));
    }

    #[test]
    fn test_region_json_uses_noc_key() {
        let json = serde_json::to_value(new_region()).unwrap();

        assert_eq!(json["NOC"], "NEW");
        assert_eq!(json["region"], "New Region");
        assert!(json.get("noc").is_none());
    }

    #[test]
    fn test_insert_and_get_region() {
        let conn = test_conn();
        insert_region(&conn, &new_region()).unwrap();

        let stored = get_region(&conn, "NEW").unwrap().unwrap();
        assert_eq!(stored, new_region());
        assert!(get_region(&conn, "XXX").unwrap().is_none());
    }

    #[test]
    fn test_insert_duplicate_region_is_conflict() {
        let conn = test_conn();
        insert_region(&conn, &new_region()).unwrap();

        let err = insert_region(&conn, &new_region()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_get_all_regions_sorted_by_code() {
        let conn = test_conn();
        insert_region(&conn, &Region::new("USA", "USA", None)).unwrap();
        insert_region(&conn, &Region::new("AUS", "Australia", None)).unwrap();

        let codes: Vec<String> = get_all_regions(&conn)
            .unwrap()
            .into_iter()
            .map(|r| r.noc)
            .collect();
        assert_eq!(codes, vec!["AUS", "USA"]);
    }

    #[test]
    fn test_update_and_delete_region() {
        let conn = test_conn();
        insert_region(&conn, &new_region()).unwrap();

        let mut changed = new_region();
        changed.region = "Renamed Region".to_string();
        changed.notes = None;
        update_region(&conn, &changed).unwrap();
        assert_eq!(get_region(&conn, "NEW").unwrap().unwrap(), changed);

        delete_region(&conn, "NEW").unwrap();
        assert!(get_region(&conn, "NEW").unwrap().is_none());

        let err = delete_region(&conn, "NEW").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_update_missing_region_is_not_found() {
        let conn = test_conn();
        let err = update_region(&conn, &new_region()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_import_regions_twice() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "NOC,region,notes").unwrap();
        writeln!(file, "GBR,UK,").unwrap();
        writeln!(file, "HKG,China,Hong Kong").unwrap();

        let regions = load_regions_csv(file.path()).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].notes, None);
        assert_eq!(regions[1].notes.as_deref(), Some("Hong Kong"));

        let conn = test_conn();
        assert_eq!(insert_regions(&conn, &regions).unwrap(), 2);
        assert_eq!(insert_regions(&conn, &regions).unwrap(), 0);
        assert_eq!(get_all_regions(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_import_rejects_rows_the_api_would_reject() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "NOC,region,notes").unwrap();
        writeln!(file, "GBR,UK,").unwrap();
        writeln!(file, "eor,,").unwrap();

        let err = load_regions_csv(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("data row 2"));
    }
}
