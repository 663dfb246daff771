//! The entities held by a [`Store`](crate::Store).
//!
//! Each entity kind maps onto exactly one table. The [`Record`] trait
//! describes that mapping (table name, column order, key columns) so that the
//! store can provide listing, lookup, batch creation, update, and deletion
//! generically rather than once per kind.

pub mod cell_type;
pub mod gene;
pub mod gene_expression;
pub mod interaction;
pub mod locus;
pub mod motif_instance;
pub mod motif_model;

use rusqlite::Row;
use rusqlite::types::ToSqlOutput;

pub use cell_type::CellType;
pub use gene::Gene;
pub use gene_expression::GeneExpression;
pub use interaction::Interaction;
pub use locus::Locus;
pub use motif_instance::MotifInstance;
pub use motif_model::MotifModel;

/// A kind of entity.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// A [`CellType`].
    CellType,

    /// A [`Gene`].
    Gene,

    /// A [`GeneExpression`].
    GeneExpression,

    /// A link between a gene and a locus.
    GeneInLocus,

    /// An [`Interaction`].
    Interaction,

    /// A link between an interaction and a participating locus.
    InteractionParticipation,

    /// A [`Locus`].
    Locus,

    /// A [`MotifInstance`].
    MotifInstance,

    /// A [`MotifModel`].
    MotifModel,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::CellType => write!(f, "cell type"),
            Kind::Gene => write!(f, "gene"),
            Kind::GeneExpression => write!(f, "gene expression"),
            Kind::GeneInLocus => write!(f, "gene-in-locus link"),
            Kind::Interaction => write!(f, "interaction"),
            Kind::InteractionParticipation => write!(f, "interaction participation"),
            Kind::Locus => write!(f, "locus"),
            Kind::MotifInstance => write!(f, "motif instance"),
            Kind::MotifModel => write!(f, "motif model"),
        }
    }
}

/// An entity that is stored as one row of one table.
///
/// [`Record::COLUMNS`] fixes the column order used for both reading
/// ([`Record::from_row()`]) and writing ([`Record::values()`]).
pub trait Record: Sized {
    /// The value that identifies a single entity.
    type Key: ?Sized;

    /// The kind of entity.
    const KIND: Kind;

    /// The table in which the entities are stored.
    const TABLE: &'static str;

    /// Every column of the table, in order.
    const COLUMNS: &'static [&'static str];

    /// The columns that make up the key, in the order of
    /// [`Record::key_values()`].
    const KEY_COLUMNS: &'static [&'static str];

    /// Reads an entity from a row selected with [`Record::COLUMNS`].
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// The values of every column, in the order of [`Record::COLUMNS`].
    fn values(&self) -> rusqlite::Result<Vec<ToSqlOutput<'_>>>;

    /// The values of the key columns for a key.
    fn key_values(key: &Self::Key) -> rusqlite::Result<Vec<ToSqlOutput<'_>>>;

    /// Renders a key for use in messages.
    fn describe(key: &Self::Key) -> String;
}
