//! A line-oriented reader for delimited import files.

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::{self};
use std::path::Path;

use flate2::read::GzDecoder;

/// The new line character.
const NEW_LINE: char = '\n';

/// The carriage return character.
const CARRIAGE_RETURN: char = '\r';

/// The extension of gzip-compressed inputs.
const GZIP_EXTENSION: &str = "gz";

/// Opens an import file, decompressing it on the fly if its name ends in
/// `.gz`.
pub fn open(path: impl AsRef<Path>) -> io::Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some(GZIP_EXTENSION) => Ok(Box::new(BufReader::new(GzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

/// A reader that yields the non-blank lines of an import file along with
/// their (one-based) line numbers.
#[derive(Debug)]
pub struct Reader<T>
where
    T: BufRead,
{
    /// The inner reader.
    inner: T,

    /// The number of lines read so far.
    line: usize,
}

impl<T> Reader<T>
where
    T: BufRead,
{
    /// Creates a new [`Reader`].
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::import::reader::Reader;
    ///
    /// let data = b"chr1:100-200\tchr1:300-400\n";
    /// let reader = Reader::new(&data[..]);
    ///
    /// assert_eq!(reader.line(), 0);
    /// ```
    pub fn new(inner: T) -> Self {
        Self { inner, line: 0 }
    }

    /// Gets the number of the last line read.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Consumes self and returns the inner reader.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Reads the next non-blank line into `buffer`, returning its line
    /// number or [`None`] at the end of the input.
    ///
    /// The line terminator (`\n` or `\r\n`) is not included in `buffer`.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::import::reader::Reader;
    ///
    /// let data = b"a\tb\r\n\n  \nc\td";
    /// let mut reader = Reader::new(&data[..]);
    /// let mut buffer = String::new();
    ///
    /// assert_eq!(reader.read_record(&mut buffer)?, Some(1));
    /// assert_eq!(buffer, "a\tb");
    ///
    /// assert_eq!(reader.read_record(&mut buffer)?, Some(4));
    /// assert_eq!(buffer, "c\td");
    ///
    /// assert_eq!(reader.read_record(&mut buffer)?, None);
    ///
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn read_record(&mut self, buffer: &mut String) -> io::Result<Option<usize>> {
        loop {
            if read_line(&mut self.inner, buffer)? == 0 {
                return Ok(None);
            }

            self.line += 1;

            if !buffer.trim().is_empty() {
                return Ok(Some(self.line));
            }
        }
    }
}

impl<T> From<T> for Reader<T>
where
    T: BufRead,
{
    fn from(inner: T) -> Self {
        Self::new(inner)
    }
}

/// Reads a line from a buffered reader, stripping the line terminator.
fn read_line<T>(reader: &mut T, buffer: &mut String) -> io::Result<usize>
where
    T: BufRead,
{
    buffer.clear();

    match reader.read_line(buffer) {
        Ok(0) => Ok(0),
        Ok(n) => {
            if buffer.ends_with(NEW_LINE) {
                buffer.pop();

                if buffer.ends_with(CARRIAGE_RETURN) {
                    buffer.pop();
                }
            }

            Ok(n)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_read_line() {
        let data = b"hello\r\nworld!";
        let mut cursor = io::Cursor::new(data);

        let mut buffer = String::new();
        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "hello");
        assert_eq!(len, 7);

        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "world!");
        assert_eq!(len, 6);

        assert_eq!(read_line(&mut cursor, &mut buffer).unwrap(), 0);
    }

    #[test]
    fn test_line_numbers_count_blank_lines() -> Result<(), Box<dyn std::error::Error>> {
        let mut reader = Reader::new(&b"\n\nx\n\ny\n\n"[..]);
        let mut buffer = String::new();

        assert_eq!(reader.read_record(&mut buffer)?, Some(3));
        assert_eq!(reader.read_record(&mut buffer)?, Some(5));
        assert_eq!(reader.read_record(&mut buffer)?, None);
        assert_eq!(reader.line(), 6);

        Ok(())
    }

    #[test]
    fn test_open() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("regulome")?;

        let plain = dir.path().join("motifs.bed");
        std::fs::write(&plain, "a\tb\n")?;

        let compressed = dir.path().join("motifs.bed.gz");
        let mut encoder = GzEncoder::new(File::create(&compressed)?, Compression::default());
        encoder.write_all(b"a\tb\n")?;
        encoder.finish()?;

        for path in [plain, compressed] {
            let mut reader = Reader::new(open(&path)?);
            let mut buffer = String::new();

            assert_eq!(reader.read_record(&mut buffer)?, Some(1));
            assert_eq!(buffer, "a\tb");
        }

        assert!(open(dir.path().join("missing.tsv")).is_err());
        Ok(())
    }
}
