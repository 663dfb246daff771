//! The canonical locus identifier: `<chromosome>:<start>-<end>`.
//!
//! Every [`Locus`](crate::entity::Locus) is keyed by a string of this form,
//! and joins across the store compare those strings byte for byte. The codec
//! here is therefore strict: the chromosome is everything before the *last*
//! colon, the start is the run of ASCII digits between that colon and the
//! next dash, and the end is the run of ASCII digits after that dash.
//!
//! ```text
//! chr1:1000-2000
//! ^^^^ ^^^^ ^^^^
//!  |    |    `-- end
//!  |    `------- start
//!  `------------ chromosome
//! ```
//!
//! Chromosome names may themselves contain colons and dashes (e.g.,
//! `HLA-A:10-20`), and [`parse()`] and [`format()`] are lossless for any
//! non-empty chromosome name.

use std::num::ParseIntError;
use std::sync::LazyLock;

use omics::coordinate::position::Number;
use regex::Regex;

/// The separator between the chromosome and the coordinates.
pub const CHROMOSOME_DELIMITER: char = ':';

/// The separator between the start and the end coordinate.
pub const COORDINATE_DELIMITER: char = '-';

/// A position along a chromosome.
pub type Position = Number;

static LOCUS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?<chr>.+):(?<start>[0-9]+)-(?<end>[0-9]+)$").unwrap());

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to parsing a locus identifier.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The identifier has no `:` separating the chromosome from the
    /// coordinates.
    MissingChromosomeDelimiter(String),

    /// The identifier has no `-` separating the start from the end.
    MissingCoordinateDelimiter(String),

    /// The chromosome name is empty.
    EmptyChromosome(String),

    /// The coordinates contain something other than ASCII digits.
    NonNumericCoordinates(String),

    /// The start does not fit in a [`Position`].
    InvalidStart(ParseIntError),

    /// The end does not fit in a [`Position`].
    InvalidEnd(ParseIntError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingChromosomeDelimiter(id) => write!(
                f,
                "missing `{CHROMOSOME_DELIMITER}` after the chromosome in locus id `{id}`"
            ),
            Error::MissingCoordinateDelimiter(id) => write!(
                f,
                "missing `{COORDINATE_DELIMITER}` between start and end in locus id `{id}`"
            ),
            Error::EmptyChromosome(id) => write!(f, "empty chromosome in locus id `{id}`"),
            Error::NonNumericCoordinates(id) => {
                write!(f, "non-numeric coordinates in locus id `{id}`")
            }
            Error::InvalidStart(err) => write!(f, "invalid start: {err}"),
            Error::InvalidEnd(err) => write!(f, "invalid end: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Codec
////////////////////////////////////////////////////////////////////////////////////////

/// Formats a chromosome and a pair of coordinates as a locus identifier.
///
/// # Examples
///
/// ```
/// use regulome::locus_id;
///
/// assert_eq!(locus_id::format("chr1", 100, 200), "chr1:100-200");
/// ```
pub fn format(chr: &str, start: Position, end: Position) -> String {
    format!("{chr}{CHROMOSOME_DELIMITER}{start}{COORDINATE_DELIMITER}{end}")
}

/// Parses a locus identifier into its chromosome, start, and end.
///
/// # Examples
///
/// ```
/// use regulome::locus_id;
///
/// let (chr, start, end) = locus_id::parse("chrX:1-50")?;
/// assert_eq!(chr, "chrX");
/// assert_eq!(start, 1);
/// assert_eq!(end, 50);
///
/// assert!(locus_id::parse("chrX:1").is_err());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse(id: &str) -> Result<(String, Position, Position)> {
    let captures = match LOCUS_ID.captures(id) {
        Some(captures) => captures,
        None => return Err(diagnose(id)),
    };

    let start = captures["start"].parse().map_err(Error::InvalidStart)?;
    let end = captures["end"].parse().map_err(Error::InvalidEnd)?;

    Ok((captures["chr"].to_string(), start, end))
}

/// Works out why an identifier did not match the canonical form.
fn diagnose(id: &str) -> Error {
    let colon = match id.rfind(CHROMOSOME_DELIMITER) {
        Some(colon) => colon,
        None => return Error::MissingChromosomeDelimiter(id.into()),
    };

    if colon == 0 {
        return Error::EmptyChromosome(id.into());
    }

    if !id[colon + 1..].contains(COORDINATE_DELIMITER) {
        return Error::MissingCoordinateDelimiter(id.into());
    }

    Error::NonNumericCoordinates(id.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let (chr, start, end) = parse("chr1:100-200")?;
        assert_eq!(chr, "chr1");
        assert_eq!(start, 100);
        assert_eq!(end, 200);
        Ok(())
    }

    #[test]
    fn test_parse_keeps_chromosome() -> std::result::Result<(), Box<dyn std::error::Error>> {
        // A separator offset that is off by one would drop the final `1` here.
        let (chr, _, _) = parse("chr11:5-6")?;
        assert_eq!(chr, "chr11");

        let (chr, start, end) = parse("HLA-A:10-20")?;
        assert_eq!(chr, "HLA-A");
        assert_eq!((start, end), (10, 20));

        let (chr, start, end) = parse("scaffold:1:7-9")?;
        assert_eq!(chr, "scaffold:1");
        assert_eq!((start, end), (7, 9));

        Ok(())
    }

    #[test]
    fn test_round_trip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let triples = [
            ("chr1", 0, 0),
            ("chrX", 100, 200),
            ("chrM", 16_569, 1),
            ("HLA-DRB1", 7, 70_000_000),
            ("chrUn:KI270302v1", 0, Position::MAX),
        ];

        for (chr, start, end) in triples {
            let (c, s, e) = parse(&format(chr, start, end))?;
            assert_eq!((c.as_str(), s, e), (chr, start, end));
        }

        Ok(())
    }

    #[test]
    fn test_missing_delimiters() {
        let err = parse("chr1").unwrap_err();
        assert_eq!(err, Error::MissingChromosomeDelimiter(String::from("chr1")));
        assert_eq!(
            err.to_string(),
            "missing `:` after the chromosome in locus id `chr1`"
        );

        let err = parse("chr1:100").unwrap_err();
        assert_eq!(err, Error::MissingCoordinateDelimiter(String::from("chr1:100")));
    }

    #[test]
    fn test_empty_chromosome() {
        let err = parse(":1-2").unwrap_err();
        assert_eq!(err, Error::EmptyChromosome(String::from(":1-2")));
    }

    #[test]
    fn test_non_numeric_coordinates() {
        for id in ["chr1:a-2", "chr1:1-b", "chr1:+1-2", "chr1:1-2-3", "chr1:-2", "chr1:1-"] {
            let err = parse(id).unwrap_err();
            assert_eq!(err, Error::NonNumericCoordinates(id.into()), "{id}");
        }
    }

    #[test]
    fn test_overflowing_coordinates() {
        let err = parse("chr1:99999999999999999999999-1").unwrap_err();
        assert!(matches!(err, Error::InvalidStart(_)));
        assert_eq!(
            err.to_string(),
            "invalid start: number too large to fit in target type"
        );

        let err = parse("chr1:1-99999999999999999999999").unwrap_err();
        assert!(matches!(err, Error::InvalidEnd(_)));
    }
}
