//! Motif models.

use rusqlite::Row;
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::Deserialize;
use serde::Serialize;

use crate::entity::Kind;
use crate::entity::Record;

/// Metadata describing a transcription factor binding motif.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MotifModel {
    /// The model name.
    name: String,

    /// The length of the motif.
    length: u64,

    /// The single-byte quality grade (e.g., `b'A'`).
    quality: u8,

    /// The UniProt accession of the transcription factor.
    #[serde(rename = "UniprotID")]
    uniprot_id: String,

    /// The transcription factor.
    transcription_factor: String,

    /// The transcription factor family.
    #[serde(rename = "TFFamily")]
    tf_family: String,

    /// The Entrez gene identifier of the transcription factor.
    entrez_gene: u64,
}

/// A builder for a [`MotifModel`].
///
/// # Examples
///
/// ```
/// use regulome::entity::motif_model::Builder;
///
/// let model = Builder::new("AHR_HUMAN.H11MO.0.B")
///     .length(9)
///     .quality(b'B')
///     .uniprot_id("AHR_HUMAN")
///     .transcription_factor("AHR")
///     .tf_family("PAS domain factors")
///     .entrez_gene(196)
///     .build();
///
/// assert_eq!(model.name(), "AHR_HUMAN.H11MO.0.B");
/// assert_eq!(model.quality(), b'B');
/// ```
#[derive(Clone, Debug, Default)]
pub struct Builder {
    /// The model name.
    name: String,

    /// The length of the motif.
    length: u64,

    /// The quality grade.
    quality: u8,

    /// The UniProt accession.
    uniprot_id: String,

    /// The transcription factor.
    transcription_factor: String,

    /// The transcription factor family.
    tf_family: String,

    /// The Entrez gene identifier.
    entrez_gene: u64,
}

impl Builder {
    /// Starts building a model with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the length.
    pub fn length(mut self, length: u64) -> Self {
        self.length = length;
        self
    }

    /// Sets the quality grade.
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Sets the UniProt accession.
    pub fn uniprot_id(mut self, uniprot_id: impl Into<String>) -> Self {
        self.uniprot_id = uniprot_id.into();
        self
    }

    /// Sets the transcription factor.
    pub fn transcription_factor(mut self, transcription_factor: impl Into<String>) -> Self {
        self.transcription_factor = transcription_factor.into();
        self
    }

    /// Sets the transcription factor family.
    pub fn tf_family(mut self, tf_family: impl Into<String>) -> Self {
        self.tf_family = tf_family.into();
        self
    }

    /// Sets the Entrez gene identifier.
    pub fn entrez_gene(mut self, entrez_gene: u64) -> Self {
        self.entrez_gene = entrez_gene;
        self
    }

    /// Consumes the builder to produce a [`MotifModel`].
    pub fn build(self) -> MotifModel {
        MotifModel {
            name: self.name,
            length: self.length,
            quality: self.quality,
            uniprot_id: self.uniprot_id,
            transcription_factor: self.transcription_factor,
            tf_family: self.tf_family,
            entrez_gene: self.entrez_gene,
        }
    }
}

impl MotifModel {
    /// Gets the model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the length of the motif.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Gets the single-byte quality grade.
    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Gets the UniProt accession.
    pub fn uniprot_id(&self) -> &str {
        &self.uniprot_id
    }

    /// Gets the transcription factor.
    pub fn transcription_factor(&self) -> &str {
        &self.transcription_factor
    }

    /// Gets the transcription factor family.
    pub fn tf_family(&self) -> &str {
        &self.tf_family
    }

    /// Gets the Entrez gene identifier.
    pub fn entrez_gene(&self) -> u64 {
        self.entrez_gene
    }
}

impl Record for MotifModel {
    type Key = str;

    const KIND: Kind = Kind::MotifModel;
    const TABLE: &'static str = "MotifModels";
    const COLUMNS: &'static [&'static str] = &[
        "Name",
        "Length",
        "Quality",
        "UniprotID",
        "TranscriptionFactor",
        "TFFamily",
        "EntrezGene",
    ];
    const KEY_COLUMNS: &'static [&'static str] = &["Name"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            length: row.get(1)?,
            quality: row.get(2)?,
            uniprot_id: row.get(3)?,
            transcription_factor: row.get(4)?,
            tf_family: row.get(5)?,
            entrez_gene: row.get(6)?,
        })
    }

    fn values(&self) -> rusqlite::Result<Vec<ToSqlOutput<'_>>> {
        Ok(vec![
            self.name.to_sql()?,
            self.length.to_sql()?,
            self.quality.to_sql()?,
            self.uniprot_id.to_sql()?,
            self.transcription_factor.to_sql()?,
            self.tf_family.to_sql()?,
            self.entrez_gene.to_sql()?,
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
    fn test_serialized_field_names() -> Result<(), Box<dyn std::error::Error>> {
        let model = Builder::new("M1")
            .length(12)
            .quality(b'A')
            .uniprot_id("P35869")
            .transcription_factor("AHR")
            .tf_family("PAS")
            .entrez_gene(196)
            .build();

        let value = serde_json::to_value(&model)?;
        assert_eq!(value["Name"], "M1");
        assert_eq!(value["Length"], 12);
        assert_eq!(value["Quality"], 65);
        assert_eq!(value["UniprotID"], "P35869");
        assert_eq!(value["TranscriptionFactor"], "AHR");
        assert_eq!(value["TFFamily"], "PAS");
        assert_eq!(value["EntrezGene"], 196);

        Ok(())
    }
}
