//! Genes.

use rusqlite::Row;
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::Deserialize;
use serde::Serialize;

use crate::entity::Kind;
use crate::entity::Record;
use crate::locus_id::Position;

/// A gene and the genomic interval it spans.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Gene {
    /// The gene name.
    name: String,

    /// The chromosome.
    chr: String,

    /// The start position.
    start: Position,

    /// The end position.
    end: Position,
}

impl Gene {
    /// Creates a new [`Gene`].
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::entity::Gene;
    ///
    /// let gene = Gene::new("Cd4", "chr6", 124_841_410, 124_866_000);
    ///
    /// assert_eq!(gene.name(), "Cd4");
    /// assert_eq!(gene.chr(), "chr6");
    /// assert_eq!(gene.start(), 124_841_410);
    /// assert_eq!(gene.end(), 124_866_000);
    /// ```
    pub fn new(
        name: impl Into<String>,
        chr: impl Into<String>,
        start: Position,
        end: Position,
    ) -> Self {
        Self {
            name: name.into(),
            chr: chr.into(),
            start,
            end,
        }
    }

    /// Gets the gene name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the chromosome.
    pub fn chr(&self) -> &str {
        &self.chr
    }

    /// Gets the start position.
    pub fn start(&self) -> Position {
        self.start
    }

    /// Gets the end position.
    pub fn end(&self) -> Position {
        self.end
    }
}

impl Record for Gene {
    type Key = str;

    const KIND: Kind = Kind::Gene;
    const TABLE: &'static str = "Genes";
    const COLUMNS: &'static [&'static str] = &["Name", "Chr", "Start", "End"];
    const KEY_COLUMNS: &'static [&'static str] = &["Name"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            chr: row.get(1)?,
            start: row.get(2)?,
            end: row.get(3)?,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<ToSqlOutput<'_>>> {
        Ok(vec![
            self.name.to_sql()?,
            self.chr.to_sql()?,
            self.start.to_sql()?,
            self.end.to_sql()?,
        ])
    }

    fn key_values(key: &str) -> rusqlite::Result<Vec<ToSqlOutput<'_>>> {
        Ok(vec![key.to_sql()?])
    }

    fn describe(key: &str) -> String {
        key.to_string()
    }
}
