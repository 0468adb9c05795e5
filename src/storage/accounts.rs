//! SQLite-backed links between chat users and their Last.fm accounts.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Error;

#[derive(Clone, Debug)]
pub struct AccountStore {
    path: PathBuf,
}

impl AccountStore {
    /// Open the store, creating the database and table if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };
        store.connect()?;
        Ok(store)
    }

    fn connect(&self) -> Result<Connection, Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.path)
            .map_err(|e| Error::Persistence(format!("sqlite open: {}", e)))?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                username TEXT PRIMARY KEY,
                lastfm_account TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| Error::Persistence(format!("sqlite init: {}", e)))?;
        Ok(conn)
    }

    /// Insert or replace the account linked to `username`.
    pub fn save(&self, username: &str, account: &str) -> Result<(), Error> {
        let conn = self.connect()?;
        conn.execute(
            "REPLACE INTO accounts (username, lastfm_account) VALUES (?1, ?2)",
            params![username, account],
        )
        .map_err(|e| Error::Persistence(format!("sqlite replace account: {}", e)))?;
        Ok(())
    }

    pub fn get(&self, username: &str) -> Result<Option<String>, Error> {
        let conn = self.connect()?;
        conn.query_row(
            "SELECT lastfm_account FROM accounts WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::Persistence(format!("sqlite get account: {}", e)))
    }

    pub fn load_all(&self) -> Result<HashMap<String, String>, Error> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare("SELECT username, lastfm_account FROM accounts")
            .map_err(|e| Error::Persistence(format!("sqlite prepare accounts: {}", e)))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(|e| Error::Persistence(format!("sqlite query accounts: {}", e)))?;

        let mut accounts = HashMap::new();
        for row in rows {
            let (username, account) =
                row.map_err(|e| Error::Persistence(format!("sqlite read account: {}", e)))?;
            accounts.insert(username, account);
        }
        Ok(accounts)
    }
}
