//! Loci.
//!
//! A locus is a named genomic interval that other entities reference by its
//! identifier (see [`crate::locus_id`]). The identifier is never stored
//! independently of the coordinates: it is always derived from them when a
//! [`Locus`] is built, so two loci with the same coordinates always share the
//! same identifier.

use std::str::FromStr;

use omics::coordinate::Strand;
use omics::coordinate::interbase::Coordinate;
use omics::coordinate::interval;
use omics::coordinate::interval::interbase::Interval;
use rusqlite::Row;
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::Deserialize;
use serde::Serialize;

use crate::entity::Kind;
use crate::entity::Record;
use crate::locus_id;
use crate::locus_id::Position;

/// A genomic interval keyed by its canonical identifier.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "RawLocus")]
pub struct Locus {
    /// The identifier, always equal to `chr:start-end`.
    #[serde(rename = "ID")]
    id: String,

    /// The chromosome.
    #[serde(rename = "Chr")]
    chr: String,

    /// The start position.
    #[serde(rename = "Start")]
    start: Position,

    /// The end position.
    #[serde(rename = "End")]
    end: Position,
}

impl Locus {
    /// Creates a new [`Locus`], deriving its identifier from the coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::entity::Locus;
    ///
    /// let locus = Locus::new("chr1", 100, 200);
    /// assert_eq!(locus.id(), "chr1:100-200");
    /// ```
    pub fn new(chr: impl Into<String>, start: Position, end: Position) -> Self {
        let chr = chr.into();

        Self {
            id: locus_id::format(&chr, start, end),
            chr,
            start,
            end,
        }
    }

    /// Gets the identifier.
    pub fn id(&self) -> &str {
        &self.id
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

    /// Converts the locus into a positive-stranded, interbase interval.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::entity::Locus;
    ///
    /// let interval = Locus::new("chr1", 100, 200).interval()?;
    /// assert_eq!(interval.contig().as_str(), "chr1");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn interval(&self) -> Result<Interval, interval::Error> {
        let start = Coordinate::new(self.chr.as_str(), Strand::Positive, self.start);
        let end = Coordinate::new(self.chr.as_str(), Strand::Positive, self.end);

        Interval::try_new(start, end)
    }
}

impl std::fmt::Display for Locus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl FromStr for Locus {
    type Err = locus_id::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chr, start, end) = locus_id::parse(s)?;
        Ok(Self::new(chr, start, end))
    }
}

/// A locus as it arrives from outside, before its identifier is checked
/// against its coordinates.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawLocus {
    /// The claimed identifier.
    #[serde(rename = "ID")]
    id: Option<String>,

    /// The chromosome.
    chr: String,

    /// The start position.
    start: Position,

    /// The end position.
    end: Position,
}

/// An identifier that disagrees with the coordinates it travels with.
#[derive(Debug)]
pub struct MismatchedIdError {
    /// The identifier that was supplied.
    supplied: String,

    /// The identifier the coordinates encode.
    expected: String,
}

impl std::fmt::Display for MismatchedIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "locus id `{}` does not match its coordinates (expected `{}`)",
            self.supplied, self.expected
        )
    }
}

impl std::error::Error for MismatchedIdError {}

impl TryFrom<RawLocus> for Locus {
    type Error = MismatchedIdError;

    fn try_from(raw: RawLocus) -> Result<Self, Self::Error> {
        let locus = Locus::new(raw.chr, raw.start, raw.end);

        match raw.id {
            Some(id) if id != locus.id => Err(MismatchedIdError {
                supplied: id,
                expected: locus.id,
            }),
            _ => Ok(locus),
        }
    }
}

impl Record for Locus {
    type Key = str;

    const KIND: Kind = Kind::Locus;
    const TABLE: &'static str = "Loci";
    const COLUMNS: &'static [&'static str] = &["ID", "Chr", "Start", "End"];
    const KEY_COLUMNS: &'static [&'static str] = &["ID"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self::new(row.get::<_, String>(1)?, row.get(2)?, row.get(3)?))
    }

    fn values(&self) -> rusqlite::Result<Vec<ToSqlOutput<'_>>> {
        Ok(vec![
            self.id.to_sql()?,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() -> Result<(), Box<dyn std::error::Error>> {
        let locus = "chr2:1-50".parse::<Locus>()?;
        assert_eq!(locus, Locus::new("chr2", 1, 50));
        assert_eq!(locus.to_string(), "chr2:1-50");

        assert!("chr2:1".parse::<Locus>().is_err());
        Ok(())
    }

    #[test]
    fn test_serialize() -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(&Locus::new("chr1", 100, 200))?;
        assert_eq!(
            json,
            r#"{"ID":"chr1:100-200","Chr":"chr1","Start":100,"End":200}"#
        );
        Ok(())
    }

    #[test]
    fn test_deserialize_derives_missing_id() -> Result<(), Box<dyn std::error::Error>> {
        let locus: Locus = serde_json::from_str(r#"{"Chr":"chr1","Start":1,"End":2}"#)?;
        assert_eq!(locus.id(), "chr1:1-2");
        Ok(())
    }

    #[test]
    fn test_deserialize_rejects_mismatched_id() {
        let err = serde_json::from_str::<Locus>(
            r#"{"ID":"chr1:1-3","Chr":"chr1","Start":1,"End":2}"#,
        )
        .unwrap_err();

        assert!(err
            .to_string()
            .contains("locus id `chr1:1-3` does not match its coordinates (expected `chr1:1-2`)"));
    }
}
