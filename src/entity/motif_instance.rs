//! Motif instances.

use omics::coordinate::Strand;
use rusqlite::Row;
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::Deserialize;
use serde::Serialize;

use crate::entity::Kind;
use crate::entity::Record;
use crate::locus_id::Position;

/// The key of a [`MotifInstance`]: its cell type, chromosome, and start.
pub type Key = (String, String, Position);

/// An occurrence of a [`MotifModel`](crate::entity::MotifModel) in the
/// genome of a particular cell type.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MotifInstance {
    /// The cell type.
    cell_type: String,

    /// The chromosome.
    chr: String,

    /// The start position.
    start: Position,

    /// Whether the instance lies on the forward strand.
    forward: bool,

    /// The score the match exceeded.
    threshold_score: f64,

    /// The locus that contains the instance.
    #[serde(rename = "LocusID")]
    locus_id: String,

    /// The name of the motif model.
    model: String,
}

impl MotifInstance {
    /// Creates a new [`MotifInstance`].
    ///
    /// # Examples
    ///
    /// ```
    /// use omics::coordinate::Strand;
    /// use regulome::entity::MotifInstance;
    ///
    /// let instance = MotifInstance::new("DN", "chr1", 150, false, 7.5, "chr1:100-200", "M1");
    ///
    /// assert_eq!(instance.cell_type(), "DN");
    /// assert_eq!(instance.strand(), Strand::Negative);
    /// assert_eq!(instance.locus_id(), "chr1:100-200");
    /// ```
    pub fn new(
        cell_type: impl Into<String>,
        chr: impl Into<String>,
        start: Position,
        forward: bool,
        threshold_score: f64,
        locus_id: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            cell_type: cell_type.into(),
            chr: chr.into(),
            start,
            forward,
            threshold_score,
            locus_id: locus_id.into(),
            model: model.into(),
        }
    }

    /// Gets the cell type.
    pub fn cell_type(&self) -> &str {
        &self.cell_type
    }

    /// Gets the chromosome.
    pub fn chr(&self) -> &str {
        &self.chr
    }

    /// Gets the start position.
    pub fn start(&self) -> Position {
        self.start
    }

    /// Gets whether the instance lies on the forward strand.
    pub fn forward(&self) -> bool {
        self.forward
    }

    /// Gets the strand the instance lies on.
    pub fn strand(&self) -> Strand {
        if self.forward {
            Strand::Positive
        } else {
            Strand::Negative
        }
    }

    /// Gets the threshold score.
    pub fn threshold_score(&self) -> f64 {
        self.threshold_score
    }

    /// Gets the identifier of the containing locus.
    pub fn locus_id(&self) -> &str {
        &self.locus_id
    }

    /// Gets the name of the motif model.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Gets the key of the instance.
    pub fn key(&self) -> Key {
        (self.cell_type.clone(), self.chr.clone(), self.start)
    }
}

impl Record for MotifInstance {
    type Key = Key;

    const KIND: Kind = Kind::MotifInstance;
    const TABLE: &'static str = "MotifInstances";
    const COLUMNS: &'static [&'static str] = &[
        "CellType",
        "Chr",
        "Start",
        "Forward",
        "ThresholdScore",
        "LocusID",
        "Model",
    ];
    const KEY_COLUMNS: &'static [&'static str] = &["CellType", "Chr", "Start"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            cell_type: row.get(0)?,
            chr: row.get(1)?,
            start: row.get(2)?,
            forward: row.get(3)?,
            threshold_score: row.get(4)?,
            locus_id: row.get(5)?,
            model: row.get(6)?,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<ToSqlOutput<'_>>> {
        Ok(vec![
            self.cell_type.to_sql()?,
            self.chr.to_sql()?,
            self.start.to_sql()?,
            self.forward.to_sql()?,
            self.threshold_score.to_sql()?,
            self.locus_id.to_sql()?,
            self.model.to_sql()?,
        ])
    }

    fn key_values(key: &Key) -> rusqlite::Result<Vec<ToSqlOutput<'_>>> {
        Ok(vec![key.0.to_sql()?, key.1.to_sql()?, key.2.to_sql()?])
    }

    fn describe(key: &Key) -> String {
        format!("{} {}:{}", key.0, key.1, key.2)
    }
}
