//! Cell types.

use rusqlite::Row;
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::Deserialize;
use serde::Serialize;

use crate::entity::Kind;
use crate::entity::Record;

/// A cell type, such as `DN` or `PGN`.
///
/// Motif instances, gene expressions, and interactions are all scoped to a
/// cell type.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct CellType {
    /// The name of the cell type.
    #[serde(rename = "Type")]
    name: String,
}

impl CellType {
    /// Creates a new [`CellType`].
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::entity::CellType;
    ///
    /// let cell_type = CellType::new("DN");
    /// assert_eq!(cell_type.name(), "DN");
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Gets the name of the cell type.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Record for CellType {
    type Key = str;

    const KIND: Kind = Kind::CellType;
    const TABLE: &'static str = "CellTypes";
    const COLUMNS: &'static [&'static str] = &["Type"];
    const KEY_COLUMNS: &'static [&'static str] = &["Type"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self { name: row.get(0)? })
    }

    fn values(&self) -> rusqlite::Result<Vec<ToSqlOutput<'_>>> {
        Ok(vec![self.name.to_sql()?])
    }

    fn key_values(key: &str) -> rusqlite::Result<Vec<ToSqlOutput<'_>>> {
        Ok(vec![key.to_sql()?])
    }

    fn describe(key: &str) -> String {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_names() -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(&CellType::new("DN"))?;
        assert_eq!(json, r#"{"Type":"DN"}"#);

        let cell_type: CellType = serde_json::from_str(r#"{"Type":"PGN"}"#)?;
        assert_eq!(cell_type.name(), "PGN");

        Ok(())
    }
}
