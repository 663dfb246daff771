//! `regulome` is a crate for storing and loading cell-type-resolved
//! regulatory genomics annotations.
//!
//! The crate provides three main points of entry:
//!
//! - A relational [`Store`] of the annotation [entities](crate::entity):
//!   cell types, genes, loci, motif models and instances, gene expression
//!   levels, and chromatin interactions.
//! - An [`Importer`](crate::import::Importer) that bulk loads the delimited
//!   files those annotations are distributed as.
//! - [Derived annotations](crate::annotate) computed from what has been
//!   stored.
//!
//! ## Loci
//!
//! Nearly everything in the store is anchored to a [locus](entity::Locus): a
//! named genomic interval whose identifier is its coordinates written as
//! `chr:start-end` (see [`locus_id`]). Because the identifier is derived
//! rather than assigned, any file that mentions a locus identifier also
//! describes the locus completely, and the importer creates loci on demand.
//!
//! ## Store
//!
//! The [`Store`] is a thin, typed layer over a SQLite database. Every entity
//! kind supports the same generic operations (list, get, create, save, and
//! delete) along with the relationship and lookup operations in
//! [`store`]. Foreign keys are enforced, key changes cascade to the rows that
//! reference them, and deletes never cascade.
//!
//! Below is a representative example of loading interactions for a cell type
//! and walking the loci that participate in them.
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
//! importer.import_interactions(data.as_bytes(), "DN")?;
//!
//! for interaction in store.interactions_of("DN")? {
//!     let loci = store.loci_of_interaction(interaction.id())?;
//!     println!("{}: {} loci", interaction.id(), loci.len());
//! }
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod annotate;
pub mod entity;
pub mod import;
pub mod locus_id;
pub mod store;

pub use self::store::Store;
