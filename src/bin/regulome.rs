//! A command line interface for building and inspecting a `regulome`
//! database.
//!
//! ```shell
//! cargo run --release --bin=regulome --features=binaries -- \
//!     --database annotations.db load --data-dir ./data --link-genes
//! ```
//!
//! The `load` command imports the full annotation set from a directory
//! holding the following files (each may also be gzip-compressed with a `.gz`
//! suffix):
//!
//! * `motif_models.tsv`
//! * `dn_interactions.tsv` and `pgn_interactions.tsv`
//! * `dn_motifs.bed` and `pgn_motifs.bed`
//! * `gene_expressions.csv`

use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap_verbosity_flag::Verbosity;
use regulome::Store;
use regulome::annotate;
use regulome::entity::CellType;
use regulome::entity::Gene;
use regulome::entity::GeneExpression;
use regulome::entity::Interaction;
use regulome::entity::Locus;
use regulome::entity::MotifInstance;
use regulome::entity::MotifModel;
use regulome::entity::Record;
use regulome::import::Importer;
use regulome::import::reader;
use regulome::import::schema;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Alignment;
use tabled::settings::Style;
use tabled::settings::object::Columns;
use tracing::info;
use tracing::warn;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

/// The database used when none is configured.
const DEFAULT_DATABASE: &str = "regulome.db";

/// The suffix of compressed input files.
const GZIP_SUFFIX: &str = ".gz";

////////////////////////////////////////////////////////////////////////////////////////
// Load plan
////////////////////////////////////////////////////////////////////////////////////////

/// A single file imported by `load`.
#[derive(Debug)]
enum Step {
    /// Motif models.
    MotifModels(&'static str),

    /// Interactions for a cell type.
    Interactions(&'static str, &'static str),

    /// Motif instances for a cell type.
    MotifInstances(&'static str, &'static str),

    /// Gene expression levels.
    GeneExpressions(&'static str),
}

/// The files imported by `load`, in order.
///
/// Models come before the instances that reference them.
const LOAD_PLAN: &[Step] = &[
    Step::MotifModels("motif_models.tsv"),
    Step::Interactions("DN", "dn_interactions.tsv"),
    Step::Interactions("PGN", "pgn_interactions.tsv"),
    Step::MotifInstances("DN", "dn_motifs.bed"),
    Step::MotifInstances("PGN", "pgn_motifs.bed"),
    Step::GeneExpressions("gene_expressions.csv"),
];

impl Step {
    /// Gets the file name.
    fn file_name(&self) -> &'static str {
        match self {
            Step::MotifModels(file)
            | Step::Interactions(_, file)
            | Step::MotifInstances(_, file)
            | Step::GeneExpressions(file) => *file,
        }
    }

    /// Gets the cell types the step imports annotations for.
    fn cell_types(&self) -> Vec<&'static str> {
        match self {
            Step::MotifModels(_) => Vec::new(),
            Step::Interactions(cell_type, _) | Step::MotifInstances(cell_type, _) => {
                vec![*cell_type]
            }
            Step::GeneExpressions(_) => schema::GENE_EXPRESSIONS
                .levels
                .iter()
                .map(|(cell_type, _)| *cell_type)
                .collect(),
        }
    }

    /// Runs the step against the file at `path`.
    fn run(&self, importer: &Importer<'_>, path: &Path) -> Result<usize> {
        let source = reader::open(path).with_context(|| format!("opening {}", path.display()))?;

        let imported = match self {
            Step::MotifModels(_) => importer.import_motif_models(source),
            Step::Interactions(cell_type, _) => importer.import_interactions(source, cell_type),
            Step::MotifInstances(cell_type, _) => {
                importer.import_motif_instances(source, cell_type)
            }
            Step::GeneExpressions(_) => importer.import_gene_expressions(source),
        };

        imported.with_context(|| format!("importing {}", path.display()))
    }
}

/// Finds the file for a step within `dir`, preferring the uncompressed file.
fn locate(dir: &Path, file_name: &str) -> Result<PathBuf> {
    let plain = dir.join(file_name);
    if plain.exists() {
        return Ok(plain);
    }

    let compressed = dir.join(format!("{file_name}{GZIP_SUFFIX}"));
    if compressed.exists() {
        return Ok(compressed);
    }

    bail!("missing input file: {}", plain.display())
}

////////////////////////////////////////////////////////////////////////////////////////
// Arguments
////////////////////////////////////////////////////////////////////////////////////////

/// Builds and inspects a regulome annotation database.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// The SQLite database (created if it does not exist).
    #[arg(short, long, env = "SQLITE_DB_PATH", global = true)]
    database: Option<PathBuf>,

    /// The command to run.
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbose: Verbosity,
}

/// A command.
#[derive(Debug, Subcommand)]
enum Command {
    /// Imports the full annotation set from a data directory.
    Load {
        /// The directory holding the input files.
        #[arg(short = 'D', long, default_value = ".")]
        data_dir: PathBuf,

        /// Whether to link genes to the loci they overlap once everything is
        /// imported.
        #[arg(long, default_value_t = false)]
        link_genes: bool,
    },

    /// Imports a single file.
    Import {
        /// The kind of file.
        #[command(subcommand)]
        kind: ImportKind,
    },

    /// Links every gene to the loci it overlaps.
    LinkGenes,

    /// Prints the number of rows in each table.
    Summary,

    /// Writes every entity of a kind to stdout as JSON.
    Dump {
        /// The kind of entity.
        kind: DumpKind,
    },
}

/// The kind of file to import.
#[derive(Debug, Subcommand)]
enum ImportKind {
    /// A tab-delimited file of interactions, one per line.
    Interactions {
        /// The file.
        path: PathBuf,

        /// The cell type the interactions were observed in.
        #[arg(short, long)]
        cell_type: String,
    },

    /// A BED-like file of motif instances.
    MotifInstances {
        /// The file.
        path: PathBuf,

        /// The cell type the instances were found in.
        #[arg(short, long)]
        cell_type: String,
    },

    /// A tab-delimited file of motif models.
    MotifModels {
        /// The file.
        path: PathBuf,
    },

    /// A comma-delimited file of gene expression levels.
    GeneExpressions {
        /// The file.
        path: PathBuf,
    },
}

/// The kind of entity to dump.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum DumpKind {
    /// Cell types.
    CellTypes,

    /// Genes.
    Genes,

    /// Loci.
    Loci,

    /// Motif models.
    MotifModels,

    /// Motif instances.
    MotifInstances,

    /// Gene expression levels.
    GeneExpressions,

    /// Interactions.
    Interactions,
}

////////////////////////////////////////////////////////////////////////////////////////
// Commands
////////////////////////////////////////////////////////////////////////////////////////

/// Runs every step of the load plan.
fn load(store: &Store, data_dir: &Path, link_genes: bool) -> Result<()> {
    // Every input must be present before anything is written.
    let paths = LOAD_PLAN
        .iter()
        .map(|step| locate(data_dir, step.file_name()))
        .collect::<Result<Vec<_>>>()?;

    let importer = Importer::new(store);

    for cell_type in LOAD_PLAN.iter().flat_map(Step::cell_types) {
        if importer
            .ensure_cell_type(cell_type)
            .with_context(|| format!("creating cell type {cell_type}"))?
        {
            info!("created cell type {cell_type}");
        }
    }

    for (step, path) in LOAD_PLAN.iter().zip(&paths) {
        let imported = step.run(&importer, path)?;
        info!("{}: {imported} record(s)", path.display());
    }

    if link_genes {
        link(store)?;
    }

    summary(store)
}

/// Imports a single file.
fn import(store: &Store, kind: &ImportKind) -> Result<()> {
    let importer = Importer::new(store);

    let (path, imported) = match kind {
        ImportKind::Interactions { path, cell_type } => {
            (path, importer.import_interactions(reader::open(path)?, cell_type))
        }
        ImportKind::MotifInstances { path, cell_type } => {
            (path, importer.import_motif_instances(reader::open(path)?, cell_type))
        }
        ImportKind::MotifModels { path } => {
            (path, importer.import_motif_models(reader::open(path)?))
        }
        ImportKind::GeneExpressions { path } => {
            (path, importer.import_gene_expressions(reader::open(path)?))
        }
    };

    let imported = imported.with_context(|| format!("importing {}", path.display()))?;
    info!("{}: {imported} record(s)", path.display());

    Ok(())
}

/// Links genes to the loci they overlap.
fn link(store: &Store) -> Result<()> {
    let added = annotate::link_genes_to_loci(store).context("linking genes to loci")?;
    info!("linked genes to loci: {added} new link(s)");
    Ok(())
}

/// Prints the number of rows in each table.
fn summary(store: &Store) -> Result<()> {
    let mut builder = Builder::default();
    builder.push_record(["Table", "Rows"]);

    for (table, rows) in store.table_counts().context("counting rows")? {
        builder.push_record([table.to_string(), rows.to_string()]);
    }

    let table = builder
        .build()
        .with(Style::rounded())
        .modify(Columns::new(1..), Alignment::right())
        .to_string();

    println!("{}", table);
    Ok(())
}

/// Writes every entity of a kind to stdout as JSON.
fn dump_all<T: Record + Serialize>(store: &Store) -> Result<()> {
    let entities = store.list::<T>().context("listing entities")?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &entities).context("writing JSON")?;
    writeln!(stdout)?;

    Ok(())
}

/// Dispatches `dump` to the entity kind.
fn dump(store: &Store, kind: DumpKind) -> Result<()> {
    match kind {
        DumpKind::CellTypes => dump_all::<CellType>(store),
        DumpKind::Genes => dump_all::<Gene>(store),
        DumpKind::Loci => dump_all::<Locus>(store),
        DumpKind::MotifModels => dump_all::<MotifModel>(store),
        DumpKind::MotifInstances => dump_all::<MotifInstance>(store),
        DumpKind::GeneExpressions => dump_all::<GeneExpression>(store),
        DumpKind::Interactions => dump_all::<Interaction>(store),
    }
}

fn throw(args: &Args) -> Result<()> {
    let database = match &args.database {
        Some(path) => path.clone(),
        None => {
            warn!("no database configured; using `{DEFAULT_DATABASE}`");
            PathBuf::from(DEFAULT_DATABASE)
        }
    };

    info!("database: {}", database.display());
    let store = Store::open(&database)
        .with_context(|| format!("opening database {}", database.display()))?;

    match &args.command {
        Command::Load {
            data_dir,
            link_genes,
        } => load(&store, data_dir, *link_genes),
        Command::Import { kind } => import(&store, kind),
        Command::LinkGenes => link(&store),
        Command::Summary => summary(&store),
        Command::Dump { kind } => dump(&store, *kind),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(args.verbose.log_level_filter().as_trace())
            .with_writer(std::io::stderr)
            .init(),
    };

    throw(&args)
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_load_plan_cell_types() {
        let mut cell_types = LOAD_PLAN
            .iter()
            .flat_map(Step::cell_types)
            .collect::<Vec<_>>();
        cell_types.sort();
        cell_types.dedup();

        assert_eq!(cell_types, ["DN", "PGN"]);
    }

    #[test]
    fn test_locate_prefers_plain() -> Result<()> {
        let dir = TempDir::new("regulome")?;
        std::fs::write(dir.path().join("dn_motifs.bed.gz"), b"")?;

        assert_eq!(
            locate(dir.path(), "dn_motifs.bed")?,
            dir.path().join("dn_motifs.bed.gz")
        );

        std::fs::write(dir.path().join("dn_motifs.bed"), b"")?;
        assert_eq!(
            locate(dir.path(), "dn_motifs.bed")?,
            dir.path().join("dn_motifs.bed")
        );

        assert!(locate(dir.path(), "pgn_motifs.bed").is_err());
        Ok(())
    }

    #[test]
    fn test_load() -> Result<()> {
        let dir = TempDir::new("regulome")?;
        let write = |name: &str, contents: &str| std::fs::write(dir.path().join(name), contents);

        write(
            "motif_models.tsv",
            "M1\t-\tGATA3\t9\tA\tC4-GATA\t2625\tGATA3_HUMAN\n",
        )?;
        write("dn_interactions.tsv", "chr1:100-200\tchr1:300-400\n")?;
        write("pgn_interactions.tsv", "chr2:1-50\tchr2:1-50\tchr1:100-200\n")?;
        write(
            "dn_motifs.bed",
            "chr1\t150\t159\tchr1:100-200\tchr1\t150\t.\tM1\t7.5\t+\n",
        )?;
        write("pgn_motifs.bed", "")?;
        write("gene_expressions.csv", "G1,chr1,120,180,5.5,x,7.25\n")?;

        let store = Store::open(dir.path().join("test.db"))?;
        load(&store, dir.path(), true)?;

        assert_eq!(store.count::<CellType>()?, 2);
        assert_eq!(store.count::<Interaction>()?, 2);
        assert_eq!(store.count::<Locus>()?, 3);
        assert_eq!(store.motif_instances_of("DN")?.len(), 1);
        assert_eq!(store.gene_expression("PGN", "G1")?.expression_level(), 7.25);
        assert_eq!(store.loci_of_gene("G1")?, [Locus::new("chr1", 100, 200)]);

        Ok(())
    }
}
