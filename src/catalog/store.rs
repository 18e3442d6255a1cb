//! SQLite profile store
//!
//! The store is append-only: records are inserted once and never updated.

use crate::catalog::schema::initialize_schema;
use crate::model::{PhotoRecord, ProfileRecord};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the store inside the catalog root
pub const STORE_FILE_NAME: &str = "profiles.db";

/// SQLite-backed store of profile records
pub struct ProfileStore {
    conn: Connection,
}

impl ProfileStore {
    /// Opens (or creates) the store at `path`
    pub fn open(path: &Path) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA synchronous = FULL;
        ",
        )?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Creates an in-memory store (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Loads every record in insertion order
    pub fn load_records(&self) -> Result<Vec<ProfileRecord>, rusqlite::Error> {
        let mut profile_stmt = self.conn.prepare(
            "SELECT id, first_name, last_name, hometown, current_residence,
             profile_photo_ref, cover_photo_ref
             FROM profiles ORDER BY row_id",
        )?;
        let mut facts_stmt = self
            .conn
            .prepare("SELECT label, value FROM about_facts WHERE profile_id = ?1")?;
        let mut photos_stmt = self.conn.prepare(
            "SELECT page_ref, asset_url, previous_ref, next_ref
             FROM photos WHERE profile_id = ?1 ORDER BY position",
        )?;

        let profiles = profile_stmt
            .query_map([], |row| {
                Ok(ProfileRecord {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    hometown: row.get(3)?,
                    current_residence: row.get(4)?,
                    about: BTreeMap::new(),
                    profile_photo_ref: row.get(5)?,
                    cover_photo_ref: row.get(6)?,
                    photos: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(profiles.len());
        for mut record in profiles {
            record.about = facts_stmt
                .query_map(params![record.id], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<Result<BTreeMap<String, String>, _>>()?;

            record.photos = photos_stmt
                .query_map(params![record.id], |row| {
                    Ok(PhotoRecord {
                        page_ref: row.get(0)?,
                        asset_url: row.get(1)?,
                        previous_ref: row.get(2)?,
                        next_ref: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            records.push(record);
        }

        Ok(records)
    }

    /// Appends records in one transaction
    ///
    /// A record whose id is already stored is left untouched and not counted.
    ///
    /// # Returns
    ///
    /// The number of records inserted
    pub fn append_records(&mut self, records: &[ProfileRecord]) -> Result<usize, rusqlite::Error> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;

        for record in records {
            let changed = tx.execute(
                "INSERT OR IGNORE INTO profiles (id, first_name, last_name, hometown,
                 current_residence, profile_photo_ref, cover_photo_ref, scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.first_name,
                    record.last_name,
                    record.hometown,
                    record.current_residence,
                    record.profile_photo_ref,
                    record.cover_photo_ref,
                    now
                ],
            )?;

            if changed == 0 {
                tracing::warn!("Profile {} is already stored, keeping the stored row", record.id);
                continue;
            }

            for (label, value) in &record.about {
                tx.execute(
                    "INSERT INTO about_facts (profile_id, label, value) VALUES (?1, ?2, ?3)",
                    params![record.id, label, value],
                )?;
            }

            for (position, photo) in record.photos.iter().enumerate() {
                tx.execute(
                    "INSERT INTO photos (profile_id, position, page_ref, asset_url,
                     previous_ref, next_ref) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        record.id,
                        position as i64,
                        photo.page_ref,
                        photo.asset_url,
                        photo.previous_ref,
                        photo.next_ref
                    ],
                )?;
            }

            inserted += 1;
        }

        tx.commit()?;
        Ok(inserted)
    }
}
