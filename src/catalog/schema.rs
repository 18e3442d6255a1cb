//! Profile store schema
//!
//! This module contains the SQL schema of the profile store.

/// SQL schema for the profile store
pub const SCHEMA_SQL: &str = r#"
-- One row per scraped profile, in insertion order
CREATE TABLE IF NOT EXISTS profiles (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    first_name TEXT,
    last_name TEXT,
    hometown TEXT,
    current_residence TEXT,
    profile_photo_ref TEXT,
    cover_photo_ref TEXT,
    scraped_at TEXT NOT NULL
);

-- Recognized about-page facts
CREATE TABLE IF NOT EXISTS about_facts (
    profile_id TEXT NOT NULL REFERENCES profiles(id),
    label TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (profile_id, label)
);

-- Downloaded photos in reel order
CREATE TABLE IF NOT EXISTS photos (
    profile_id TEXT NOT NULL REFERENCES profiles(id),
    position INTEGER NOT NULL,
    page_ref TEXT NOT NULL,
    asset_url TEXT,
    previous_ref TEXT,
    next_ref TEXT,
    PRIMARY KEY (profile_id, position)
);
"#;

/// Initializes the store schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
