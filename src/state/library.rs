use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::draft::{Draft, DraftStore};
use crate::config::EditorConfig;
use crate::error::DraftError;

/// The DraftLibrary keeps the draft slot in a small SQLite database.
/// One row per slot; the editor only ever uses one slot.
pub struct DraftLibrary {
    conn: Connection,
    db_path: PathBuf,
    slot: String,
}

impl DraftLibrary {
    /// Open (or create) the draft database described by `config`.
    ///
    /// Unless overridden, the file lives in the user's data directory:
    /// - Linux: ~/.local/share/shorts-editor/drafts.db
    /// - macOS: ~/Library/Application Support/shorts-editor/drafts.db
    /// - Windows: %APPDATA%\shorts-editor\drafts.db
    pub fn open(config: &EditorConfig) -> Result<Self, DraftError> {
        let db_path = match &config.database_path {
            Some(path) => path.clone(),
            None => Self::default_db_path()?,
        };
        Self::open_at(&db_path, &config.draft_slot)
    }

    /// Open a database at an explicit path
    pub fn open_at(db_path: &Path, slot: &str) -> Result<Self, DraftError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        tracing::debug!(path = %db_path.display(), "draft database opened");

        let library = DraftLibrary {
            conn,
            db_path: db_path.to_path_buf(),
            slot: slot.to_string(),
        };
        library.init_schema()?;

        Ok(library)
    }

    fn default_db_path() -> Result<PathBuf, DraftError> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or(DraftError::NoDataDir)?;

        path.push("shorts-editor");
        path.push("drafts.db");
        Ok(path)
    }

    fn init_schema(&self) -> Result<(), DraftError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS drafts (
                slot            TEXT PRIMARY KEY,
                draft_json      TEXT NOT NULL,
                saved_at        INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// When the current draft was saved, if there is one
    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>, DraftError> {
        let millis: Option<i64> = self
            .conn
            .query_row(
                "SELECT saved_at FROM drafts WHERE slot = ?1",
                [&self.slot],
                |row| row.get(0),
            )
            .optional()?;

        Ok(millis.and_then(|ms| Utc.timestamp_millis_opt(ms).single()))
    }
}

impl DraftStore for DraftLibrary {
    fn load(&self) -> Result<Option<Draft>, DraftError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT draft_json FROM drafts WHERE slot = ?1",
                [&self.slot],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(Draft::from_json(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, draft: &Draft) -> Result<(), DraftError> {
        let json = draft.to_json()?;
        self.conn.execute(
            "INSERT INTO drafts (slot, draft_json, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(slot) DO UPDATE SET draft_json = excluded.draft_json,
                                             saved_at = excluded.saved_at",
            rusqlite::params![&self.slot, &json, Utc::now().timestamp_millis()],
        )?;
        tracing::info!(slot = %self.slot, bytes = json.len(), "draft saved");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DraftError> {
        let removed = self
            .conn
            .execute("DELETE FROM drafts WHERE slot = ?1", [&self.slot])?;
        if removed > 0 {
            tracing::info!(slot = %self.slot, "draft cleared");
        }
        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for DraftLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftLibrary")
            .field("db_path", &self.db_path)
            .field("slot", &self.slot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_overwrites_single_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("drafts.db");
        let mut library = DraftLibrary::open_at(&path, "slot").unwrap();

        assert!(library.load().unwrap().is_none());
        assert!(library.saved_at().unwrap().is_none());

        let mut first = Draft::default();
        first.caption = "first".into();
        library.save(&first).unwrap();

        let mut second = Draft::default();
        second.caption = "second".into();
        library.save(&second).unwrap();

        assert_eq!(library.load().unwrap().unwrap().caption, "second");
        assert!(library.saved_at().unwrap().is_some());
        assert!(path.exists());
    }

    #[test]
    fn test_draft_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drafts.db");

        {
            let mut library = DraftLibrary::open_at(&path, "slot").unwrap();
            let mut draft = Draft::default();
            draft.end_time = Some(4.0);
            library.save(&draft).unwrap();
        }

        let mut library = DraftLibrary::open_at(&path, "slot").unwrap();
        assert_eq!(library.load().unwrap().unwrap().end_time, Some(4.0));

        library.clear().unwrap();
        assert!(!library.exists().unwrap());
    }

    #[test]
    fn test_slots_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drafts.db");

        let mut a = DraftLibrary::open_at(&path, "a").unwrap();
        a.save(&Draft::default()).unwrap();

        let b = DraftLibrary::open_at(&path, "b").unwrap();
        assert!(b.load().unwrap().is_none());
    }

    #[test]
    fn test_open_uses_config_override() {
        let dir = tempfile::tempdir().unwrap();
        let config = EditorConfig {
            database_path: Some(dir.path().join("custom.db")),
            ..EditorConfig::default()
        };

        let library = DraftLibrary::open(&config).unwrap();
        assert_eq!(library.path(), dir.path().join("custom.db"));
        assert_eq!(library.slot(), config.draft_slot);
    }
}
