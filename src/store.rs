//! The SQLite-backed entity and relationship store.
//!
//! A [`Store`] owns a single database connection. Every entity kind gets the
//! same five operations through the [`Record`] trait:
//!
//! - [`Store::list()`] returns every entity of a kind.
//! - [`Store::get()`] looks one up by key.
//! - [`Store::create()`] inserts a batch as one multi-row statement.
//! - [`Store::save()`] updates an entity in place, possibly changing its key.
//! - [`Store::delete()`] removes one by key.
//!
//! ```
//! use regulome::entity::CellType;
//! use regulome::store;
//! use regulome::Store;
//!
//! let store = Store::open_in_memory()?;
//! store.create(&[CellType::new("DN"), CellType::new("PGN")])?;
//!
//! assert_eq!(store.get::<CellType>("DN")?.name(), "DN");
//!
//! store.delete::<CellType>("DN")?;
//! assert!(matches!(
//!     store.get::<CellType>("DN"),
//!     Err(store::Error::NotFound { .. })
//! ));
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! A [`Store`] is [`Send`] but not [`Sync`]. Hosts that serve requests on
//! several threads open one store per thread against the same file; SQLite
//! serializes the writers.

pub mod query;
pub mod relationship;
pub mod schema;

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OptionalExtension as _;
use rusqlite::Transaction;
use rusqlite::params_from_iter;
use rusqlite::types::ToSqlOutput;
use tracing::warn;

use crate::entity::Kind;
use crate::entity::Record;
use crate::entity::interaction::Id;
use crate::locus_id;
use crate::store::schema::quote;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The most bound parameters a single statement may carry.
const MAX_VARIABLES: usize = 32_766;

/// The name of the savepoint used by [`Store::atomically()`].
const SAVEPOINT: &str = "atomically";

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to a [`Store`].
#[derive(Debug)]
pub enum Error {
    /// No entity of the given kind has the given key.
    NotFound {
        /// The kind of entity that was looked up.
        kind: Kind,

        /// The key that was looked up.
        key: String,
    },

    /// A key collided, a reference dangled, or a dependent row still exists.
    ConstraintViolation(String),

    /// A value could not be interpreted.
    MalformedInput(String),

    /// Any other database failure.
    Database(rusqlite::Error),
}

impl Error {
    /// Creates a [`Error::NotFound`] for a key of a record type.
    fn not_found<T: Record>(key: &T::Key) -> Self {
        Error::NotFound {
            kind: T::KIND,
            key: T::describe(key),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound { kind, key } => write!(f, "{kind} not found: {key}"),
            Error::ConstraintViolation(reason) => write!(f, "constraint violation: {reason}"),
            Error::MalformedInput(reason) => write!(f, "malformed input: {reason}"),
            Error::Database(err) => write!(f, "database error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Error::ConstraintViolation(message.unwrap_or_else(|| failure.to_string()))
            }
            rusqlite::Error::ToSqlConversionFailure(err) => Error::MalformedInput(err.to_string()),
            err => Error::Database(err),
        }
    }
}

impl From<locus_id::Error> for Error {
    fn from(err: locus_id::Error) -> Self {
        Error::MalformedInput(err.to_string())
    }
}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Store
////////////////////////////////////////////////////////////////////////////////////////

/// A handle to the annotation database.
#[derive(Debug)]
pub struct Store {
    /// The database connection.
    connection: Connection,
}

impl Store {
    /// Opens (or creates) the database at `path`, creating any missing
    /// tables.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Opens a fresh database that lives only in memory.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wraps an existing connection, creating any missing tables.
    pub fn from_connection(connection: Connection) -> Result<Self> {
        connection.busy_timeout(BUSY_TIMEOUT)?;
        schema::initialize(&connection)?;
        Ok(Self { connection })
    }

    /// Gets the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Starts a transaction that is rolled back unless it is committed.
    ///
    /// Store operations issued while the transaction is open become part of
    /// it.
    pub fn transaction(&self) -> Result<Transaction<'_>> {
        Ok(self.connection.unchecked_transaction()?)
    }

    /// Runs `f` so that either everything it writes is kept or nothing is.
    ///
    /// Outside of a transaction, `f` runs within a new one that is committed
    /// only if `f` succeeds. Within a transaction (see
    /// [`Store::transaction()`]), `f` runs within a savepoint instead: a
    /// failure undoes the writes of `f` alone and the enclosing transaction
    /// stays open.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::entity::CellType;
    /// use regulome::store;
    /// use regulome::Store;
    ///
    /// let store = Store::open_in_memory()?;
    /// let transaction = store.transaction()?;
    ///
    /// let result = store.atomically(|| {
    ///     store.create(&[CellType::new("DN")])?;
    ///     store.create(&[CellType::new("DN")])
    /// });
    /// assert!(matches!(result, Err(store::Error::ConstraintViolation(_))));
    ///
    /// store.atomically(|| store.create(&[CellType::new("PGN")]))?;
    /// transaction.commit()?;
    ///
    /// assert_eq!(store.count::<CellType>()?, 1);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn atomically<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        E: From<Error>,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let database = |err: rusqlite::Error| E::from(Error::from(err));

        if self.connection.is_autocommit() {
            let transaction = self.connection.unchecked_transaction().map_err(database)?;
            let value = f()?;
            transaction.commit().map_err(database)?;
            return Ok(value);
        }

        self.connection
            .execute_batch(&format!("SAVEPOINT {SAVEPOINT}"))
            .map_err(database)?;

        match f() {
            Ok(value) => {
                self.connection
                    .execute_batch(&format!("RELEASE {SAVEPOINT}"))
                    .map_err(database)?;
                Ok(value)
            }
            Err(err) => {
                let undo = format!("ROLLBACK TO {SAVEPOINT}; RELEASE {SAVEPOINT}");
                if let Err(rollback) = self.connection.execute_batch(&undo) {
                    warn!("could not roll back to savepoint: {rollback}");
                }

                Err(err)
            }
        }
    }

    /// Lists every entity of a kind.
    pub fn list<T: Record>(&self) -> Result<Vec<T>> {
        let sql = format!("SELECT {} FROM {}", column_list(T::COLUMNS), quote(T::TABLE));
        let mut statement = self.connection.prepare(&sql)?;
        let rows = statement.query_map([], T::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Gets the entity with the given key.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::entity::Gene;
    /// use regulome::Store;
    ///
    /// let store = Store::open_in_memory()?;
    /// store.create(&[Gene::new("G1", "chrX", 100, 200)])?;
    ///
    /// let gene = store.get::<Gene>("G1")?;
    /// assert_eq!(gene.chr(), "chrX");
    /// assert!(store.get::<Gene>("G2").is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn get<T: Record>(&self, key: &T::Key) -> Result<T> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {}",
            column_list(T::COLUMNS),
            quote(T::TABLE),
            key_predicate(T::KEY_COLUMNS, 1)
        );

        let values = T::key_values(key)?;
        self.connection
            .query_row(&sql, params_from_iter(values.iter()), T::from_row)
            .optional()?
            .ok_or_else(|| Error::not_found::<T>(key))
    }

    /// Checks whether an entity with the given key exists.
    pub fn exists<T: Record>(&self, key: &T::Key) -> Result<bool> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE {}",
            quote(T::TABLE),
            key_predicate(T::KEY_COLUMNS, 1)
        );

        let values = T::key_values(key)?;
        let found = self
            .connection
            .query_row(&sql, params_from_iter(values.iter()), |_| Ok(()))
            .optional()?;

        Ok(found.is_some())
    }

    /// Fails with [`Error::NotFound`] unless an entity with the given key
    /// exists.
    pub(crate) fn require<T: Record>(&self, key: &T::Key) -> Result<()> {
        match self.exists::<T>(key)? {
            true => Ok(()),
            false => Err(Error::not_found::<T>(key)),
        }
    }

    /// Fails with [`Error::ConstraintViolation`] unless the entity a link
    /// refers to exists.
    pub(crate) fn referenced<T: Record>(&self, key: &T::Key) -> Result<()> {
        match self.exists::<T>(key)? {
            true => Ok(()),
            false => Err(Error::ConstraintViolation(format!(
                "referenced {} does not exist: {}",
                T::KIND,
                T::describe(key)
            ))),
        }
    }

    /// Inserts a batch of entities.
    ///
    /// The batch is written as a single multi-row `INSERT`. Batches with more
    /// values than one statement may bind are split, and the pieces are
    /// written within one transaction (unless the caller already holds one).
    pub fn create<T: Record>(&self, entities: &[T]) -> Result<()> {
        let rows_per_statement = (MAX_VARIABLES / T::COLUMNS.len()).max(1);

        if entities.len() > rows_per_statement && self.connection.is_autocommit() {
            let transaction = self.connection.unchecked_transaction()?;
            for chunk in entities.chunks(rows_per_statement) {
                self.insert(chunk)?;
            }
            transaction.commit()?;
            return Ok(());
        }

        for chunk in entities.chunks(rows_per_statement) {
            self.insert(chunk)?;
        }

        Ok(())
    }

    /// Inserts a batch of entities with a single statement.
    fn insert<T: Record>(&self, entities: &[T]) -> Result<()> {
        let mut values: Vec<ToSqlOutput<'_>> =
            Vec::with_capacity(entities.len() * T::COLUMNS.len());
        for entity in entities {
            values.extend(entity.values()?);
        }

        let sql = insert_statement(T::TABLE, T::COLUMNS, entities.len());
        self.connection.execute(&sql, params_from_iter(values.iter()))?;
        Ok(())
    }

    /// Replaces the entity stored under `old_key` with `updated`.
    ///
    /// The key of `updated` may differ from `old_key`; references to the old
    /// key are carried over to the new one.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::entity::CellType;
    /// use regulome::Store;
    ///
    /// let store = Store::open_in_memory()?;
    /// store.create(&[CellType::new("DN")])?;
    /// store.save(&CellType::new("DN3"), "DN")?;
    ///
    /// assert!(store.exists::<CellType>("DN3")?);
    /// assert!(!store.exists::<CellType>("DN")?);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn save<T: Record>(&self, updated: &T, old_key: &T::Key) -> Result<()> {
        let assignments = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", quote(column), i + 1))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            quote(T::TABLE),
            assignments,
            key_predicate(T::KEY_COLUMNS, T::COLUMNS.len() + 1)
        );

        let mut values = updated.values()?;
        values.extend(T::key_values(old_key)?);

        match self.connection.execute(&sql, params_from_iter(values.iter()))? {
            0 => Err(Error::not_found::<T>(old_key)),
            _ => Ok(()),
        }
    }

    /// Deletes the entity with the given key.
    ///
    /// Deletion never cascades: if other rows still reference the entity, the
    /// delete fails with [`Error::ConstraintViolation`] and nothing is
    /// removed.
    pub fn delete<T: Record>(&self, key: &T::Key) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE {}",
            quote(T::TABLE),
            key_predicate(T::KEY_COLUMNS, 1)
        );

        let values = T::key_values(key)?;
        match self.connection.execute(&sql, params_from_iter(values.iter()))? {
            0 => Err(Error::not_found::<T>(key)),
            _ => Ok(()),
        }
    }

    /// Creates an interaction within a cell type and returns the identifier
    /// the store assigned to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::entity::CellType;
    /// use regulome::entity::Interaction;
    /// use regulome::Store;
    ///
    /// let store = Store::open_in_memory()?;
    /// store.create(&[CellType::new("DN")])?;
    ///
    /// let first = store.create_interaction("DN")?;
    /// let second = store.create_interaction("DN")?;
    ///
    /// assert_ne!(first, second);
    /// assert_eq!(store.get::<Interaction>(&second)?.cell_type(), "DN");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn create_interaction(&self, cell_type: &str) -> Result<Id> {
        self.connection.execute(
            r#"INSERT INTO "Interactions" ("CellType") VALUES (?1)"#,
            [cell_type],
        )?;

        Ok(self.connection.last_insert_rowid())
    }

    /// Counts the entities of a kind.
    pub fn count<T: Record>(&self) -> Result<usize> {
        self.count_rows(T::TABLE)
    }

    /// Counts the rows in every table of the schema.
    pub fn table_counts(&self) -> Result<Vec<(&'static str, usize)>> {
        schema::TABLES
            .iter()
            .map(|table| Ok((*table, self.count_rows(table)?)))
            .collect()
    }

    /// Counts the rows in a table.
    fn count_rows(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote(table));
        Ok(self.connection.query_row(&sql, [], |row| row.get(0))?)
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Statement construction
////////////////////////////////////////////////////////////////////////////////////////

/// Renders a comma-separated list of quoted column names.
fn column_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|column| quote(column))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders `"a" = ?n AND "b" = ?n+1 ...` for the key columns, numbering the
/// parameters from `first`.
fn key_predicate(columns: &[&str], first: usize) -> String {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{} = ?{}", quote(column), first + i))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Renders a multi-row `INSERT` with one placeholder group per row.
fn insert_statement(table: &str, columns: &[&str], rows: usize) -> String {
    let group = format!("({})", vec!["?"; columns.len()].join(", "));
    let groups = vec![group.as_str(); rows].join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        quote(table),
        column_list(columns),
        groups
    )
}
