//! Column layouts of the import formats.
//!
//! Each format is described by a schema that names the field offset of every
//! value it reads. The constants in this module describe the files the loader
//! consumes; other layouts can be imported by building a schema with
//! different offsets and handing it to
//! [`Importer`](crate::import::Importer).

use std::str::FromStr;

use nonempty::NonEmpty;

use crate::entity::Gene;
use crate::entity::GeneExpression;
use crate::entity::Locus;
use crate::entity::MotifInstance;
use crate::entity::MotifModel;
use crate::entity::motif_model::Builder;
use crate::locus_id;

/// The value of a strand column that marks the forward strand.
const FORWARD_STRAND: &str = "+";

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error associated with decoding the fields of a record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The record has no field at a column's offset.
    MissingField {
        /// The column name.
        column: &'static str,

        /// The column offset.
        offset: usize,

        /// The number of fields in the record.
        fields: usize,
    },

    /// A field that must not be empty was.
    EmptyField(&'static str),

    /// A field could not be decoded.
    InvalidField {
        /// The column name.
        column: &'static str,

        /// The field value.
        value: String,

        /// Why the value was rejected.
        reason: String,
    },

    /// A field holds a malformed locus identifier.
    InvalidLocusId(locus_id::Error),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingField {
                column,
                offset,
                fields,
            } => write!(
                f,
                "missing `{column}` field: expected a field at offset {offset} but the record \
                 has {fields} field(s)"
            ),
            ParseError::EmptyField(column) => write!(f, "empty `{column}` field"),
            ParseError::InvalidField {
                column,
                value,
                reason,
            } => write!(f, "invalid `{column}` field `{value}`: {reason}"),
            ParseError::InvalidLocusId(err) => write!(f, "invalid locus id: {err}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A [`Result`](std::result::Result) with a [`ParseError`].
pub type Result<T> = std::result::Result<T, ParseError>;

////////////////////////////////////////////////////////////////////////////////////////
// Columns
////////////////////////////////////////////////////////////////////////////////////////

/// A named field offset within a record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Column {
    /// The name used in messages.
    name: &'static str,

    /// The zero-based field offset.
    offset: usize,
}

impl Column {
    /// Creates a new [`Column`].
    pub const fn new(name: &'static str, offset: usize) -> Self {
        Self { name, offset }
    }

    /// Gets the name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Gets the offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Gets the raw field.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::import::schema::Column;
    ///
    /// let column = Column::new("name", 1);
    /// assert_eq!(column.text(&["a", "b"])?, "b");
    /// assert!(column.text(&["a"]).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn text<'a>(&self, fields: &[&'a str]) -> Result<&'a str> {
        fields
            .get(self.offset)
            .copied()
            .ok_or(ParseError::MissingField {
                column: self.name,
                offset: self.offset,
                fields: fields.len(),
            })
    }

    /// Parses the field with [`FromStr`].
    pub fn parse<T>(&self, fields: &[&str]) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self.text(fields)?;

        value.parse().map_err(|err: T::Err| ParseError::InvalidField {
            column: self.name,
            value: value.to_string(),
            reason: err.to_string(),
        })
    }

    /// Gets the first byte of the field.
    pub fn first_byte(&self, fields: &[&str]) -> Result<u8> {
        self.text(fields)?
            .bytes()
            .next()
            .ok_or(ParseError::EmptyField(self.name))
    }

    /// Gets whether the field marks the forward strand (`+`). Any other value
    /// is taken to mean the reverse strand.
    pub fn is_forward(&self, fields: &[&str]) -> Result<bool> {
        Ok(self.text(fields)? == FORWARD_STRAND)
    }

    /// Parses the field as a locus identifier.
    pub fn locus(&self, fields: &[&str]) -> Result<Locus> {
        self.text(fields)?
            .parse()
            .map_err(ParseError::InvalidLocusId)
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Interactions
////////////////////////////////////////////////////////////////////////////////////////

/// The layout of an interaction file: every field is the identifier of one
/// participating locus.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InteractionSchema {
    /// The field delimiter, a single ASCII byte.
    pub delimiter: u8,
}

/// The interaction files consumed by the loader.
pub const INTERACTIONS: InteractionSchema = InteractionSchema { delimiter: b'\t' };

impl InteractionSchema {
    /// Decodes the participating loci of one interaction.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::import::schema::INTERACTIONS;
    ///
    /// let loci = INTERACTIONS.parse(&["chr2:1-50", "chr2:1-50", "chr1:100-200"])?;
    /// assert_eq!(loci.len(), 3);
    /// assert_eq!(loci.last().id(), "chr1:100-200");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse(&self, fields: &[&str]) -> Result<NonEmpty<Locus>> {
        let loci = fields
            .iter()
            .map(|field| field.parse().map_err(ParseError::InvalidLocusId))
            .collect::<Result<Vec<Locus>>>()?;

        NonEmpty::from_vec(loci).ok_or(ParseError::MissingField {
            column: "locus",
            offset: 0,
            fields: 0,
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Motif instances
////////////////////////////////////////////////////////////////////////////////////////

/// The layout of a motif instance file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MotifInstanceSchema {
    /// The field delimiter, a single ASCII byte.
    pub delimiter: u8,

    /// The identifier of the containing locus.
    pub locus_id: Column,

    /// The chromosome.
    pub chr: Column,

    /// The start position.
    pub start: Column,

    /// The motif model name.
    pub model: Column,

    /// The threshold score.
    pub threshold_score: Column,

    /// The strand (`+` or otherwise).
    pub strand: Column,
}

/// The BED-like motif instance files consumed by the loader.
pub const MOTIF_INSTANCES: MotifInstanceSchema = MotifInstanceSchema {
    delimiter: b'\t',
    locus_id: Column::new("locus id", 3),
    chr: Column::new("chromosome", 4),
    start: Column::new("start", 5),
    model: Column::new("model", 7),
    threshold_score: Column::new("threshold score", 8),
    strand: Column::new("strand", 9),
};

impl MotifInstanceSchema {
    /// Decodes a motif instance found in `cell_type`, along with the locus
    /// that contains it.
    pub fn parse(&self, fields: &[&str], cell_type: &str) -> Result<(Locus, MotifInstance)> {
        let locus = self.locus_id.locus(fields)?;

        let instance = MotifInstance::new(
            cell_type,
            self.chr.text(fields)?,
            self.start.parse(fields)?,
            self.strand.is_forward(fields)?,
            self.threshold_score.parse(fields)?,
            locus.id(),
            self.model.text(fields)?,
        );

        Ok((locus, instance))
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Motif models
////////////////////////////////////////////////////////////////////////////////////////

/// The layout of a motif model file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MotifModelSchema {
    /// The field delimiter, a single ASCII byte.
    pub delimiter: u8,

    /// The model name.
    pub name: Column,

    /// The transcription factor.
    pub transcription_factor: Column,

    /// The motif length.
    pub length: Column,

    /// The quality grade (only its first byte is kept).
    pub quality: Column,

    /// The transcription factor family.
    pub tf_family: Column,

    /// The Entrez gene identifier.
    pub entrez_gene: Column,

    /// The UniProt accession.
    pub uniprot_id: Column,
}

/// The motif model file consumed by the loader.
pub const MOTIF_MODELS: MotifModelSchema = MotifModelSchema {
    delimiter: b'\t',
    name: Column::new("name", 0),
    transcription_factor: Column::new("transcription factor", 2),
    length: Column::new("length", 3),
    quality: Column::new("quality", 4),
    tf_family: Column::new("tf family", 5),
    entrez_gene: Column::new("entrez gene", 6),
    uniprot_id: Column::new("uniprot id", 7),
};

impl MotifModelSchema {
    /// Decodes a motif model.
    pub fn parse(&self, fields: &[&str]) -> Result<MotifModel> {
        Ok(Builder::new(self.name.text(fields)?)
            .transcription_factor(self.transcription_factor.text(fields)?)
            .length(self.length.parse(fields)?)
            .quality(self.quality.first_byte(fields)?)
            .tf_family(self.tf_family.text(fields)?)
            .entrez_gene(self.entrez_gene.parse(fields)?)
            .uniprot_id(self.uniprot_id.text(fields)?)
            .build())
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Gene expression
////////////////////////////////////////////////////////////////////////////////////////

/// The layout of a gene expression file: the gene and its coordinates,
/// followed by one expression level per cell type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneExpressionSchema {
    /// The field delimiter, a single ASCII byte.
    pub delimiter: u8,

    /// The gene name.
    pub gene: Column,

    /// The chromosome of the gene.
    pub chr: Column,

    /// The start of the gene.
    pub start: Column,

    /// The end of the gene.
    pub end: Column,

    /// The cell types with an expression level column, and those columns.
    pub levels: &'static [(&'static str, Column)],
}

/// The gene expression file consumed by the loader.
pub const GENE_EXPRESSIONS: GeneExpressionSchema = GeneExpressionSchema {
    delimiter: b',',
    gene: Column::new("gene", 0),
    chr: Column::new("chromosome", 1),
    start: Column::new("start", 2),
    end: Column::new("end", 3),
    levels: &[("DN", Column::new("DN", 4)), ("PGN", Column::new("PGN", 6))],
};

impl GeneExpressionSchema {
    /// Decodes a gene along with its expression level in each configured
    /// cell type.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::import::schema::GENE_EXPRESSIONS;
    ///
    /// let fields = "G1,chrX,100,200,5.5,x,7.25".split(',').collect::<Vec<_>>();
    /// let (gene, expressions) = GENE_EXPRESSIONS.parse(&fields)?;
    ///
    /// assert_eq!(gene.chr(), "chrX");
    /// assert_eq!(expressions[0].cell_type(), "DN");
    /// assert_eq!(expressions[1].expression_level(), 7.25);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse(&self, fields: &[&str]) -> Result<(Gene, Vec<GeneExpression>)> {
        let name = self.gene.text(fields)?;
        if name.is_empty() {
            return Err(ParseError::EmptyField(self.gene.name()));
        }

        let gene = Gene::new(
            name,
            self.chr.text(fields)?,
            self.start.parse(fields)?,
            self.end.parse(fields)?,
        );

        let expressions = self
            .levels
            .iter()
            .map(|(cell_type, column)| -> Result<GeneExpression> {
                Ok(GeneExpression::new(*cell_type, name, column.parse(fields)?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((gene, expressions))
    }
}
