//! Gene expression levels.

use rusqlite::Row;
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::Deserialize;
use serde::Serialize;

use crate::entity::Kind;
use crate::entity::Record;

/// The key of a [`GeneExpression`]: its cell type and gene name.
pub type Key = (String, String);

/// The expression level of a gene in a cell type.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeneExpression {
    /// The cell type.
    cell_type: String,

    /// The gene name.
    gene: String,

    /// The expression level.
    expression_level: f64,
}

impl GeneExpression {
    /// Creates a new [`GeneExpression`].
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::entity::GeneExpression;
    ///
    /// let expression = GeneExpression::new("DN", "G1", 5.5);
    ///
    /// assert_eq!(expression.cell_type(), "DN");
    /// assert_eq!(expression.gene(), "G1");
    /// assert_eq!(expression.expression_level(), 5.5);
    /// ```
    pub fn new(
        cell_type: impl Into<String>,
        gene: impl Into<String>,
        expression_level: f64,
    ) -> Self {
        Self {
            cell_type: cell_type.into(),
            gene: gene.into(),
            expression_level,
        }
    }

    /// Gets the cell type.
    pub fn cell_type(&self) -> &str {
        &self.cell_type
    }

    /// Gets the gene name.
    pub fn gene(&self) -> &str {
        &self.gene
    }

    /// Gets the expression level.
    pub fn expression_level(&self) -> f64 {
        self.expression_level
    }

    /// Gets the key of the expression.
    pub fn key(&self) -> Key {
        (self.cell_type.clone(), self.gene.clone())
    }
}

impl Record for GeneExpression {
    type Key = Key;

    const KIND: Kind = Kind::GeneExpression;
    const TABLE: &'static str = "GeneExpression";
    const COLUMNS: &'static [&'static str] = &["CellType", "Gene", "ExpressionLevel"];
    const KEY_COLUMNS: &'static [&'static str] = &["CellType", "Gene"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            cell_type: row.get(0)?,
            gene: row.get(1)?,
            expression_level: row.get(2)?,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<ToSqlOutput<'_>>> {
        Ok(vec![
            self.cell_type.to_sql()?,
            self.gene.to_sql()?,
            self.expression_level.to_sql()?,
        ])
    }

    fn key_values(key: &Key) -> rusqlite::Result<Vec<ToSqlOutput<'_>>> {
        Ok(vec![key.0.to_sql()?, key.1.to_sql()?])
    }

    fn describe(key: &Key) -> String {
        format!("{} in {}", key.1, key.0)
    }
}
