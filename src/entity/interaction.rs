//! Chromatin interactions.
//!
//! An interaction groups any number of loci. The grouping itself lives in the
//! participation join table (see
//! [`Store::add_locus_to_interaction()`](crate::Store::add_locus_to_interaction));
//! the interaction row only carries its identifier and cell type.

use rusqlite::Row;
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::Deserialize;
use serde::Serialize;

use crate::entity::Kind;
use crate::entity::Record;

/// The identifier assigned to an interaction by the store.
pub type Id = i64;

/// An n-ary chromatin interaction within a cell type.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Interaction {
    /// The cell type.
    cell_type: String,

    /// The identifier.
    #[serde(rename = "ID")]
    id: Id,
}

impl Interaction {
    /// Creates a new [`Interaction`] with a known identifier.
    ///
    /// Most callers want
    /// [`Store::create_interaction()`](crate::Store::create_interaction)
    /// instead, which lets the store assign the identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::entity::Interaction;
    ///
    /// let interaction = Interaction::new(7, "PGN");
    ///
    /// assert_eq!(interaction.id(), 7);
    /// assert_eq!(interaction.cell_type(), "PGN");
    /// ```
    pub fn new(id: Id, cell_type: impl Into<String>) -> Self {
        Self {
            cell_type: cell_type.into(),
            id,
        }
    }

    /// Gets the identifier.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Gets the cell type.
    pub fn cell_type(&self) -> &str {
        &self.cell_type
    }
}

impl Record for Interaction {
    type Key = Id;

    const KIND: Kind = Kind::Interaction;
    const TABLE: &'static str = "Interactions";
    const COLUMNS: &'static [&'static str] = &["ID", "CellType"];
    const KEY_COLUMNS: &'static [&'static str] = &["ID"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            cell_type: row.get(1)?,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<ToSqlOutput<'_>>> {
        Ok(vec![self.id.to_sql()?, self.cell_type.to_sql()?])
    }

    fn key_values(key: &Id) -> rusqlite::Result<Vec<ToSqlOutput<'_>>> {
        Ok(vec![key.to_sql()?])
    }

    fn describe(key: &Id) -> String {
        key.to_string()
    }
}
