//! SQLite persistence layer for the larder inventory.
//!
//! Three tables, one per collection:
//!
//! ```sql
//! users       (id, email UNIQUE, name, role, created_at)
//! foods       (id, owner -> users, name, category, quantity, unit,
//!              expiry_date, added_at, notes JSON,
//!              name_folded, category_folded)
//! suggestions (id, owner -> users, food_id -> foods, kind, payload JSON,
//!              used_fallback, created_at)
//! ```
//!
//! Dates are stored as ISO-8601 text (`YYYY-MM-DD`) and timestamps as
//! fixed-width RFC 3339 UTC strings, so lexical order equals chronological
//! order and range queries can run in SQL. Deleting a user cascades to
//! their foods and suggestions.
//!
//! `name_folded` / `category_folded` hold lowercased copies written from
//! Rust. SQLite's `LIKE` folds ASCII only, so search matches against these.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Days, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::PersistenceConfig;
use crate::error::{CoreError, Result};
use crate::types::{
    FoodId, FoodItem, FoodUpdate, Note, Role, StoredSuggestion, SuggestionId, SuggestionKind,
    User, UserId,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id         TEXT PRIMARY KEY,
    email      TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL,
    role       TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS foods (
    id          TEXT PRIMARY KEY,
    owner       TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    category    TEXT NOT NULL,
    quantity    REAL NOT NULL,
    unit        TEXT NOT NULL,
    expiry_date TEXT NOT NULL,
    added_at    TEXT NOT NULL,
    notes       TEXT NOT NULL DEFAULT '[]',
    name_folded     TEXT NOT NULL DEFAULT '',
    category_folded TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS foods_owner_expiry ON foods (owner, expiry_date);
CREATE TABLE IF NOT EXISTS suggestions (
    id            TEXT PRIMARY KEY,
    owner         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    food_id       TEXT REFERENCES foods(id) ON DELETE SET NULL,
    kind          TEXT NOT NULL,
    payload       TEXT NOT NULL,
    used_fallback INTEGER NOT NULL,
    created_at    TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS suggestions_owner_created ON suggestions (owner, created_at);
";

const FOOD_COLUMNS: &str =
    "id, owner, name, category, quantity, unit, expiry_date, added_at, notes";

// ---------------------------------------------------------------------------
// Encoding helpers
// ---------------------------------------------------------------------------

fn ts_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn ts_from_sql(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CoreError::Serialization(format!("bad timestamp '{s}': {e}")))
}

fn date_to_sql(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn date_from_sql(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| CoreError::Serialization(format!("bad date '{s}': {e}")))
}

fn uuid_from_sql(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| CoreError::Serialization(format!("bad id '{s}': {e}")))
}

/// Lowercase for search. Full Unicode, unlike SQLite's `lower()`.
fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Escape `%`, `_` and `\` so user text is matched literally by `LIKE`.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// Rows are read as raw strings inside the rusqlite closure and decoded
// afterwards, so decoding failures surface as `CoreError` rather than
// being squeezed into `rusqlite::Error`.

struct FoodRow {
    id: String,
    owner: String,
    name: String,
    category: String,
    quantity: f64,
    unit: String,
    expiry_date: String,
    added_at: String,
    notes: String,
}

impl FoodRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            name: row.get(2)?,
            category: row.get(3)?,
            quantity: row.get(4)?,
            unit: row.get(5)?,
            expiry_date: row.get(6)?,
            added_at: row.get(7)?,
            notes: row.get(8)?,
        })
    }

    fn decode(self) -> Result<FoodItem> {
        Ok(FoodItem {
            id: FoodId(uuid_from_sql(&self.id)?),
            owner: UserId(uuid_from_sql(&self.owner)?),
            name: self.name,
            category: self.category,
            quantity: self.quantity,
            unit: self.unit,
            expiry_date: date_from_sql(&self.expiry_date)?,
            added_at: ts_from_sql(&self.added_at)?,
            notes: serde_json::from_str(&self.notes)?,
        })
    }
}

struct UserRow {
    id: String,
    email: String,
    name: String,
    role: String,
    created_at: String,
}

impl UserRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            role: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn decode(self) -> Result<User> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| CoreError::Serialization(format!("unknown role '{}'", self.role)))?;
        Ok(User {
            id: UserId(uuid_from_sql(&self.id)?),
            email: self.email,
            name: self.name,
            role,
            created_at: ts_from_sql(&self.created_at)?,
        })
    }
}

struct SuggestionRow {
    id: String,
    owner: String,
    food_id: Option<String>,
    kind: String,
    payload: String,
    used_fallback: bool,
    created_at: String,
}

impl SuggestionRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            owner: row.get(1)?,
            food_id: row.get(2)?,
            kind: row.get(3)?,
            payload: row.get(4)?,
            used_fallback: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn decode(self) -> Result<StoredSuggestion> {
        let kind = SuggestionKind::parse(&self.kind)
            .ok_or_else(|| CoreError::Serialization(format!("unknown kind '{}'", self.kind)))?;
        let food_id = self
            .food_id
            .as_deref()
            .map(uuid_from_sql)
            .transpose()?
            .map(FoodId);
        Ok(StoredSuggestion {
            id: SuggestionId(uuid_from_sql(&self.id)?),
            owner: UserId(uuid_from_sql(&self.owner)?),
            food_id,
            kind,
            payload: serde_json::from_str(&self.payload)?,
            used_fallback: self.used_fallback,
            created_at: ts_from_sql(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Handle to an open SQLite database holding users, foods and suggestions.
///
/// # Usage
///
/// ```no_run
/// # use larder_core::persistence::Store;
/// # use larder_core::config::PersistenceConfig;
/// # use larder_core::types::{Role, User};
/// let store = Store::open("larder.db", &PersistenceConfig::default())?;
/// let user = User::new("ana@example.org", "Ana", Role::User);
/// store.insert_user(&user)?;
/// assert!(store.get_user(user.id)?.is_some());
/// # Ok::<(), larder_core::error::CoreError>(())
/// ```
pub struct Store {
    conn: Connection,
    db_path: PathBuf,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Open (or create) an SQLite database at `path`.
    ///
    /// The schema is created if it does not exist. WAL mode is enabled when
    /// `config.wal_mode` is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))?;
        Self::init(&conn)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "Larder store opened"
        );

        Ok(Self { conn, db_path })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self {
            conn,
            db_path: PathBuf::from(":memory:"),
        })
    }

    fn init(conn: &Connection) -> Result<()> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Self::add_folded_columns(conn)?;
        Ok(())
    }

    /// Databases created before the folded search columns existed get them
    /// added and backfilled.
    fn add_folded_columns(conn: &Connection) -> Result<()> {
        let present: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pragma_table_info('foods') WHERE name = 'name_folded'",
            [],
            |row| row.get(0),
        )?;
        if present > 0 {
            return Ok(());
        }

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(
            "ALTER TABLE foods ADD COLUMN name_folded TEXT NOT NULL DEFAULT '';
             ALTER TABLE foods ADD COLUMN category_folded TEXT NOT NULL DEFAULT '';",
        )?;
        let rows: Vec<(String, String, String)> = tx
            .prepare("SELECT id, name, category FROM foods")?
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<rusqlite::Result<_>>()?;
        for (id, name, category) in &rows {
            tx.execute(
                "UPDATE foods SET name_folded = ?1, category_folded = ?2 WHERE id = ?3",
                params![fold(name), fold(category), id],
            )?;
        }
        tx.commit()?;
        info!(rows = rows.len(), "Added folded search columns to foods");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Conflict`] if the email is already registered.
    pub fn insert_user(&self, user: &User) -> Result<()> {
        if self.find_user_by_email(&user.email)?.is_some() {
            return Err(CoreError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }
        self.conn.execute(
            "INSERT INTO users (id, email, name, role, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.0.to_string(),
                user.email,
                user.name,
                user.role.as_str(),
                ts_to_sql(&user.created_at)
            ],
        )?;
        debug!(user = %user.id, role = %user.role, "Inserted user");
        Ok(())
    }

    /// Load a user by ID.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = self
            .conn
            .prepare_cached("SELECT id, email, name, role, created_at FROM users WHERE id = ?1")?
            .query_row(params![id.0.to_string()], UserRow::read)
            .optional()?;
        row.map(UserRow::decode).transpose()
    }

    /// Load a user by email (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = self
            .conn
            .prepare_cached(
                "SELECT id, email, name, role, created_at FROM users WHERE email = ?1 COLLATE NOCASE",
            )?
            .query_row(params![email.trim()], UserRow::read)
            .optional()?;
        row.map(UserRow::decode).transpose()
    }

    /// All users, oldest registration first.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, email, name, role, created_at FROM users ORDER BY created_at, email",
        )?;
        let rows = stmt.query_map([], UserRow::read)?;
        rows.map(|r| r?.decode()).collect()
    }

    /// Change a user's role and return the updated user.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UserNotFound`] if no such user exists.
    pub fn update_user_role(&self, id: UserId, role: Role) -> Result<User> {
        let changed = self.conn.execute(
            "UPDATE users SET role = ?1 WHERE id = ?2",
            params![role.as_str(), id.0.to_string()],
        )?;
        if changed == 0 {
            return Err(CoreError::UserNotFound(id));
        }
        self.get_user(id)?.ok_or(CoreError::UserNotFound(id))
    }

    /// Delete a user together with their foods and suggestions.
    ///
    /// Returns `true` if a row was actually deleted.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn delete_user(&self, id: UserId) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1", params![id.0.to_string()])?;
        Ok(deleted > 0)
    }

    // ------------------------------------------------------------------
    // Foods
    // ------------------------------------------------------------------

    /// Insert a food item. The owner must exist.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UserNotFound`] for an unknown owner, or
    /// [`CoreError::Database`] on SQLite failures.
    pub fn insert_food(&self, item: &FoodItem) -> Result<()> {
        let start = Instant::now();
        if self.get_user(item.owner)?.is_none() {
            return Err(CoreError::UserNotFound(item.owner));
        }
        let notes = serde_json::to_string(&item.notes)?;
        self.conn.execute(
            &format!(
                "INSERT INTO foods ({FOOD_COLUMNS}, name_folded, category_folded)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
            ),
            params![
                item.id.0.to_string(),
                item.owner.0.to_string(),
                item.name,
                item.category,
                item.quantity,
                item.unit,
                date_to_sql(item.expiry_date),
                ts_to_sql(&item.added_at),
                notes,
                fold(&item.name),
                fold(&item.category)
            ],
        )?;
        debug!(
            food = %item.id,
            owner = %item.owner,
            elapsed_us = start.elapsed().as_micros(),
            "Inserted food item"
        );
        Ok(())
    }

    /// Load a food item by ID.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn get_food(&self, id: FoodId) -> Result<Option<FoodItem>> {
        let row = self
            .conn
            .prepare_cached(&format!("SELECT {FOOD_COLUMNS} FROM foods WHERE id = ?1"))?
            .query_row(params![id.0.to_string()], FoodRow::read)
            .optional()?;
        row.map(FoodRow::decode).transpose()
    }

    /// All items owned by `owner`, soonest expiry first.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn list_foods(&self, owner: UserId) -> Result<Vec<FoodItem>> {
        self.query_foods(
            &format!(
                "SELECT {FOOD_COLUMNS} FROM foods WHERE owner = ?1 ORDER BY expiry_date, name"
            ),
            &[&owner.0.to_string()],
        )
    }

    /// Every item in the database, soonest expiry first.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn list_all_foods(&self) -> Result<Vec<FoodItem>> {
        self.query_foods(
            &format!("SELECT {FOOD_COLUMNS} FROM foods ORDER BY expiry_date, name"),
            &[],
        )
    }

    /// Apply a partial update and return the updated item.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FoodNotFound`] if the item does not exist.
    pub fn update_food(&self, id: FoodId, update: FoodUpdate) -> Result<FoodItem> {
        let mut item = self.get_food(id)?.ok_or(CoreError::FoodNotFound(id))?;
        update.apply(&mut item);
        self.conn.execute(
            "UPDATE foods SET name = ?1, category = ?2, quantity = ?3, unit = ?4, expiry_date = ?5,
                              name_folded = ?6, category_folded = ?7
             WHERE id = ?8",
            params![
                item.name,
                item.category,
                item.quantity,
                item.unit,
                date_to_sql(item.expiry_date),
                fold(&item.name),
                fold(&item.category),
                id.0.to_string()
            ],
        )?;
        debug!(food = %id, "Updated food item");
        Ok(item)
    }

    /// Delete a food item. Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn delete_food(&self, id: FoodId) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM foods WHERE id = ?1", params![id.0.to_string()])?;
        Ok(deleted > 0)
    }

    /// Append a note to an item and return the updated item.
    ///
    /// Read-modify-write runs inside one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FoodNotFound`] if the item does not exist.
    pub fn append_note(&self, id: FoodId, note: Note) -> Result<FoodItem> {
        let tx = self.conn.unchecked_transaction()?;
        let mut item = self.get_food(id)?.ok_or(CoreError::FoodNotFound(id))?;
        item.notes.push(note);
        tx.execute(
            "UPDATE foods SET notes = ?1 WHERE id = ?2",
            params![serde_json::to_string(&item.notes)?, id.0.to_string()],
        )?;
        tx.commit()?;
        debug!(food = %id, notes = item.notes.len(), "Appended note");
        Ok(item)
    }

    /// Case-insensitive substring search over name and category.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn search_foods(&self, owner: UserId, query: &str) -> Result<Vec<FoodItem>> {
        let pattern = like_pattern(&fold(query.trim()));
        self.query_foods(
            &format!(
                "SELECT {FOOD_COLUMNS} FROM foods
                 WHERE owner = ?1
                   AND (name_folded LIKE ?2 ESCAPE '\\' OR category_folded LIKE ?2 ESCAPE '\\')
                 ORDER BY expiry_date, name"
            ),
            &[&owner.0.to_string(), &pattern],
        )
    }

    /// Items expiring within `from..=to`, soonest first.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn foods_expiring_between(
        &self,
        owner: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<FoodItem>> {
        self.query_foods(
            &format!(
                "SELECT {FOOD_COLUMNS} FROM foods
                 WHERE owner = ?1 AND expiry_date >= ?2 AND expiry_date <= ?3
                 ORDER BY expiry_date, name"
            ),
            &[&owner.0.to_string(), &date_to_sql(from), &date_to_sql(to)],
        )
    }

    /// Items expiring today or within the next `window_days` days.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn nearly_expiring(
        &self,
        owner: UserId,
        today: NaiveDate,
        window_days: u32,
    ) -> Result<Vec<FoodItem>> {
        let until = today
            .checked_add_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MAX);
        self.foods_expiring_between(owner, today, until)
    }

    /// Items whose expiry date is strictly before `today`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn wasted(&self, owner: UserId, today: NaiveDate) -> Result<Vec<FoodItem>> {
        self.query_foods(
            &format!(
                "SELECT {FOOD_COLUMNS} FROM foods
                 WHERE owner = ?1 AND expiry_date < ?2
                 ORDER BY expiry_date, name"
            ),
            &[&owner.0.to_string(), &date_to_sql(today)],
        )
    }

    fn query_foods(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<FoodItem>> {
        let start = Instant::now();
        let mut stmt = self.conn.prepare_cached(sql)?;
        let rows = stmt.query_map(args, FoodRow::read)?;
        let items: Vec<FoodItem> = rows.map(|r| r?.decode()).collect::<Result<_>>()?;
        debug!(
            rows = items.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Food query"
        );
        Ok(items)
    }

    // ------------------------------------------------------------------
    // Suggestions
    // ------------------------------------------------------------------

    /// Persist a generated tip or recipe for its owner.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures (including an
    /// unknown owner).
    pub fn insert_suggestion(&self, suggestion: &StoredSuggestion) -> Result<()> {
        self.conn.execute(
            "INSERT INTO suggestions (id, owner, food_id, kind, payload, used_fallback, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                suggestion.id.0.to_string(),
                suggestion.owner.0.to_string(),
                suggestion.food_id.map(|f| f.0.to_string()),
                suggestion.kind.as_str(),
                serde_json::to_string(&suggestion.payload)?,
                suggestion.used_fallback,
                ts_to_sql(&suggestion.created_at)
            ],
        )?;
        debug!(
            suggestion = %suggestion.id,
            owner = %suggestion.owner,
            kind = suggestion.kind.as_str(),
            used_fallback = suggestion.used_fallback,
            "Stored suggestion"
        );
        Ok(())
    }

    /// Suggestions for `owner` created at or after `since`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn recent_suggestions(
        &self,
        owner: UserId,
        since: DateTime<Utc>,
    ) -> Result<Vec<StoredSuggestion>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT id, owner, food_id, kind, payload, used_fallback, created_at
             FROM suggestions
             WHERE owner = ?1 AND created_at >= ?2
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(
            params![owner.0.to_string(), ts_to_sql(&since)],
            SuggestionRow::read,
        )?;
        rows.map(|r| r?.decode()).collect()
    }

    // ------------------------------------------------------------------
    // Utility
    // ------------------------------------------------------------------

    /// Create a copy of the database at `dest_path` using SQLite's
    /// online-backup API.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] on SQLite failures.
    pub fn backup<P: AsRef<Path>>(&self, dest_path: P) -> Result<()> {
        let start = Instant::now();
        let mut dest = Connection::open(dest_path.as_ref())?;
        let backup = rusqlite::backup::Backup::new(&self.conn, &mut dest)?;
        backup.run_to_completion(256, std::time::Duration::from_millis(50), None)?;

        info!(
            dest = %dest_path.as_ref().display(),
            elapsed_ms = start.elapsed().as_millis(),
            "Database backup completed"
        );
        Ok(())
    }

    /// Return the path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Run an integrity check on the database.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Database`] if the check query itself fails.
    pub fn integrity_check(&self) -> Result<bool> {
        let result: String = self
            .conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
