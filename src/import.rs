//! Bulk import of annotation files.
//!
//! An [`Importer`] reads delimited text files (optionally gzip-compressed, see
//! [`reader::open()`]) and writes their contents to a [`Store`]. Each file is
//! imported within a single transaction: the first malformed line or rejected
//! row aborts the import and nothing from that file is kept.
//!
//! Loci and genes that a file references but the store does not yet hold are
//! created on demand. Cell types are not; they must exist before anything is
//! imported for them (see [`Importer::ensure_cell_type()`]).
//!
//! ```
//! use regulome::import::Importer;
//! use regulome::Store;
//!
//! let store = Store::open_in_memory()?;
//! let importer = Importer::new(&store);
//! importer.ensure_cell_type("DN")?;
//!
//! let data = "chr1:100-200\tchr1:300-400\nchr2:1-50\tchr2:1-50\tchr1:100-200\n";
//! assert_eq!(importer.import_interactions(data.as_bytes(), "DN")?, 2);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod gene_expressions;
mod interactions;
mod motif_instances;
mod motif_models;
pub mod reader;
pub mod schema;

use std::io::BufRead;
use std::io::{self};

use csv::ReaderBuilder;
use csv::StringRecord;
use tracing::debug;

use crate::Store;
use crate::entity::CellType;
use crate::entity::Gene;
use crate::entity::Locus;
use crate::entity::Record;
use crate::import::reader::Reader;
use crate::import::schema::GeneExpressionSchema;
use crate::import::schema::InteractionSchema;
use crate::import::schema::MotifInstanceSchema;
use crate::import::schema::MotifModelSchema;
use crate::import::schema::ParseError;
use crate::store;

/// The number of rows written with each insert statement.
const DEFAULT_BATCH_SIZE: usize = 500;

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to an import.
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// A line could not be decoded.
    Parse {
        /// The line number.
        line: usize,

        /// The error.
        error: ParseError,
    },

    /// The store refused the contents of a line.
    Rejected {
        /// The line number.
        line: usize,

        /// The error.
        error: store::Error,
    },

    /// A store error not attributable to a single line.
    Store(store::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Parse { line, error } => write!(f, "parse error on line {line}: {error}"),
            Error::Rejected { line, error } => write!(f, "line {line} was rejected: {error}"),
            Error::Store(err) => write!(f, "store error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<store::Error> for Error {
    fn from(err: store::Error) -> Self {
        Error::Store(err)
    }
}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Importer
////////////////////////////////////////////////////////////////////////////////////////

/// Imports annotation files into a [`Store`].
#[derive(Debug)]
pub struct Importer<'s> {
    /// The destination store.
    store: &'s Store,

    /// The layout of interaction files.
    interactions: InteractionSchema,

    /// The layout of motif instance files.
    motif_instances: MotifInstanceSchema,

    /// The layout of motif model files.
    motif_models: MotifModelSchema,

    /// The layout of gene expression files.
    gene_expressions: GeneExpressionSchema,

    /// The number of rows written with each insert statement.
    batch_size: usize,
}

impl<'s> Importer<'s> {
    /// Creates a new [`Importer`] that reads the default layouts of
    /// [`schema`].
    pub fn new(store: &'s Store) -> Self {
        Self {
            store,
            interactions: schema::INTERACTIONS,
            motif_instances: schema::MOTIF_INSTANCES,
            motif_models: schema::MOTIF_MODELS,
            gene_expressions: schema::GENE_EXPRESSIONS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Sets the layout of interaction files.
    pub fn with_interaction_schema(mut self, schema: InteractionSchema) -> Self {
        self.interactions = schema;
        self
    }

    /// Sets the layout of motif instance files.
    pub fn with_motif_instance_schema(mut self, schema: MotifInstanceSchema) -> Self {
        self.motif_instances = schema;
        self
    }

    /// Sets the layout of motif model files.
    pub fn with_motif_model_schema(mut self, schema: MotifModelSchema) -> Self {
        self.motif_models = schema;
        self
    }

    /// Sets the layout of gene expression files.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::entity::CellType;
    /// use regulome::import::schema::Column;
    /// use regulome::import::schema::GENE_EXPRESSIONS;
    /// use regulome::import::schema::GeneExpressionSchema;
    /// use regulome::import::Importer;
    /// use regulome::Store;
    ///
    /// let store = Store::open_in_memory()?;
    /// store.create(&[CellType::new("NK")])?;
    ///
    /// const LEVELS: &[(&str, Column)] = &[("NK", Column::new("NK", 4))];
    ///
    /// let importer = Importer::new(&store).with_gene_expression_schema(GeneExpressionSchema {
    ///     delimiter: b'\t',
    ///     levels: LEVELS,
    ///     ..GENE_EXPRESSIONS
    /// });
    ///
    /// importer.import_gene_expressions("G1\tchr3\t1\t9\t0.25\n".as_bytes())?;
    /// assert_eq!(store.gene_expression("NK", "G1")?.expression_level(), 0.25);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn with_gene_expression_schema(mut self, schema: GeneExpressionSchema) -> Self {
        self.gene_expressions = schema;
        self
    }

    /// Sets the number of rows written with each insert statement.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Creates a cell type unless it already exists. Returns whether it was
    /// created.
    pub fn ensure_cell_type(&self, name: &str) -> store::Result<bool> {
        if self.store.exists::<CellType>(name)? {
            return Ok(false);
        }

        self.store.create(&[CellType::new(name)])?;
        debug!("created cell type {name}");
        Ok(true)
    }

    /// Creates a locus unless it already exists. Returns whether it was
    /// created.
    fn ensure_locus(&self, locus: &Locus, line: usize) -> Result<bool> {
        self.ensure(locus, locus.id(), line)
    }

    /// Creates a gene unless one with the same name already exists. Returns
    /// whether it was created.
    fn ensure_gene(&self, gene: &Gene, line: usize) -> Result<bool> {
        self.ensure(gene, gene.name(), line)
    }

    /// Creates an entity unless one with the same key exists.
    fn ensure<T: Record>(&self, entity: &T, key: &T::Key, line: usize) -> Result<bool> {
        let rejected = |error| Error::Rejected { line, error };

        if self.store.exists::<T>(key).map_err(rejected)? {
            return Ok(false);
        }

        self.store
            .create(std::slice::from_ref(entity))
            .map_err(rejected)?;

        debug!("created {} {} for line {line}", T::KIND, T::describe(key));
        Ok(true)
    }

    /// Runs `f` so that nothing it writes is kept unless it succeeds (see
    /// [`Store::atomically()`]).
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        self.store.atomically(f)
    }

    /// Runs `f` on the fields of each non-blank line of `source`. Returns the
    /// number of lines handled.
    ///
    /// Fields are separated by `delimiter` and may be quoted. A record never
    /// spans more than one line.
    fn for_each_record<R, F>(&self, source: R, delimiter: u8, mut f: F) -> Result<usize>
    where
        R: BufRead,
        F: FnMut(usize, &[&str]) -> Result<()>,
    {
        let mut decoder = ReaderBuilder::new();
        decoder
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true);

        let mut reader = Reader::new(source);
        let mut buffer = String::new();
        let mut record = StringRecord::new();
        let mut records = 0;

        while let Some(line) = reader.read_record(&mut buffer)? {
            let mut fields = decoder.from_reader(buffer.as_bytes());

            if !fields.read_record(&mut record).map_err(io::Error::from)? {
                continue;
            }

            f(line, &record.iter().collect::<Vec<_>>())?;
            records += 1;
        }

        Ok(records)
    }

    /// Starts a batch of rows to be written together.
    fn batch<T: Record>(&self) -> Batch<'s, T> {
        Batch {
            store: self.store,
            size: self.batch_size,
            lines: Vec::with_capacity(self.batch_size),
            entities: Vec::with_capacity(self.batch_size),
            written: 0,
        }
    }
}

/// Rows waiting to be written, along with the lines they came from.
struct Batch<'s, T> {
    /// The destination store.
    store: &'s Store,

    /// The number of rows at which the batch is written.
    size: usize,

    /// The line of each pending row.
    lines: Vec<usize>,

    /// The pending rows.
    entities: Vec<T>,

    /// The number of rows written so far.
    written: usize,
}

impl<T: Record> Batch<'_, T> {
    /// Adds a row, writing the batch if it is full.
    fn push(&mut self, line: usize, entity: T) -> Result<()> {
        self.lines.push(line);
        self.entities.push(entity);

        if self.entities.len() >= self.size {
            self.flush()?;
        }

        Ok(())
    }

    /// Writes the pending rows.
    ///
    /// If the store refuses the batch, the rows are retried one at a time to
    /// find the line responsible.
    fn flush(&mut self) -> Result<()> {
        if self.entities.is_empty() {
            return Ok(());
        }

        if let Err(err) = self.store.create(&self.entities) {
            for (line, entity) in self.lines.iter().zip(&self.entities) {
                if let Err(error) = self.store.create(std::slice::from_ref(entity)) {
                    return Err(Error::Rejected { line: *line, error });
                }
            }

            return Err(Error::Store(err));
        }

        self.written += self.entities.len();
        self.lines.clear();
        self.entities.clear();

        Ok(())
    }

    /// Writes any pending rows and returns the total number written.
    fn finish(mut self) -> Result<usize> {
        self.flush()?;
        Ok(self.written)
    }
}

/// Attaches a line number to a [`ParseError`].
fn at_line(line: usize) -> impl FnOnce(ParseError) -> Error {
    move |error| Error::Parse { line, error }
}
