//! Lookups scoped to a cell type, a motif model, or a gene.

use rusqlite::Params;

use crate::entity::CellType;
use crate::entity::Gene;
use crate::entity::GeneExpression;
use crate::entity::Interaction;
use crate::entity::MotifInstance;
use crate::entity::MotifModel;
use crate::entity::Record;
use crate::store::Result;
use crate::store::Store;
use crate::store::schema::quote;

impl Store {
    /// Selects every entity of a kind whose `column` equals the single bound
    /// parameter.
    fn select_where<T: Record, P: Params>(&self, column: &str, params: P) -> Result<Vec<T>> {
        let columns = T::COLUMNS
            .iter()
            .map(|column| quote(column))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!(
            "SELECT {columns} FROM {} WHERE {} = ?1 ORDER BY rowid",
            quote(T::TABLE),
            quote(column)
        );

        let mut statement = self.connection.prepare(&sql)?;
        let entities = statement
            .query_map(params, T::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(entities)
    }

    /// Gets the motif instances found in a cell type.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::entity::motif_model::Builder;
    /// use regulome::entity::CellType;
    /// use regulome::entity::Locus;
    /// use regulome::entity::MotifInstance;
    /// use regulome::Store;
    ///
    /// let store = Store::open_in_memory()?;
    /// store.create(&[CellType::new("DN"), CellType::new("PGN")])?;
    /// store.create(&[Locus::new("chr1", 100, 200)])?;
    /// store.create(&[Builder::new("M1").build()])?;
    /// store.create(&[MotifInstance::new("DN", "chr1", 150, true, 7.5, "chr1:100-200", "M1")])?;
    ///
    /// assert_eq!(store.motif_instances_of("DN")?.len(), 1);
    /// assert!(store.motif_instances_of("PGN")?.is_empty());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn motif_instances_of(&self, cell_type: &str) -> Result<Vec<MotifInstance>> {
        self.require::<CellType>(cell_type)?;
        self.select_where::<MotifInstance, _>("CellType", [cell_type])
    }

    /// Gets the interactions observed in a cell type.
    pub fn interactions_of(&self, cell_type: &str) -> Result<Vec<Interaction>> {
        self.require::<CellType>(cell_type)?;
        self.select_where::<Interaction, _>("CellType", [cell_type])
    }

    /// Gets the gene expression levels measured in a cell type.
    pub fn gene_expressions_of(&self, cell_type: &str) -> Result<Vec<GeneExpression>> {
        self.require::<CellType>(cell_type)?;
        self.select_where::<GeneExpression, _>("CellType", [cell_type])
    }

    /// Gets the expression level of one gene in a cell type.
    pub fn gene_expression(&self, cell_type: &str, gene: &str) -> Result<GeneExpression> {
        self.get::<GeneExpression>(&(cell_type.to_string(), gene.to_string()))
    }

    /// Gets the expression levels of a gene across every cell type.
    pub fn expressions_of_gene(&self, gene: &str) -> Result<Vec<GeneExpression>> {
        self.require::<Gene>(gene)?;
        self.select_where::<GeneExpression, _>("Gene", [gene])
    }

    /// Gets the instances of a motif model across every cell type.
    pub fn instances_of_model(&self, model: &str) -> Result<Vec<MotifInstance>> {
        self.require::<MotifModel>(model)?;
        self.select_where::<MotifInstance, _>("Model", [model])
    }

    /// Gets the model an instance is an occurrence of.
    pub fn model_of(&self, instance: &MotifInstance) -> Result<MotifModel> {
        self.get::<MotifModel>(instance.model())
    }
}

#[cfg(test)]
mod tests {
    use crate::entity::CellType;
    use crate::entity::Gene;
    use crate::entity::GeneExpression;
    use crate::entity::Kind;
    use crate::entity::Locus;
    use crate::entity::MotifInstance;
    use crate::entity::motif_model::Builder;
    use crate::store::Error;
    use crate::store::Store;

    fn store() -> Result<Store, Box<dyn std::error::Error>> {
        let store = Store::open_in_memory()?;
        store.create(&[CellType::new("DN"), CellType::new("PGN")])?;
        store.create(&[Gene::new("G1", "chrX", 100, 200), Gene::new("G2", "chrX", 500, 900)])?;
        store.create(&[Locus::new("chr1", 100, 200)])?;
        store.create(&[
            Builder::new("M1").transcription_factor("GATA3").build(),
            Builder::new("M2").build(),
        ])?;
        store.create(&[
            GeneExpression::new("DN", "G1", 5.5),
            GeneExpression::new("PGN", "G1", 7.25),
            GeneExpression::new("PGN", "G2", 0.5),
        ])?;
        store.create(&[
            MotifInstance::new("DN", "chr1", 110, true, 1.0, "chr1:100-200", "M1"),
            MotifInstance::new("PGN", "chr1", 120, false, 2.0, "chr1:100-200", "M1"),
            MotifInstance::new("PGN", "chr1", 130, true, 3.0, "chr1:100-200", "M2"),
        ])?;
        Ok(store)
    }

    #[test]
    fn test_cell_type_scoped() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;
        store.create_interaction("PGN")?;

        assert_eq!(store.motif_instances_of("PGN")?.len(), 2);
        assert_eq!(store.interactions_of("PGN")?.len(), 1);
        assert!(store.interactions_of("DN")?.is_empty());

        let expressions = store.gene_expressions_of("PGN")?;
        assert_eq!(expressions.len(), 2);
        assert!(expressions.iter().all(|e| e.cell_type() == "PGN"));

        assert_eq!(store.gene_expression("PGN", "G1")?.expression_level(), 7.25);

        assert!(matches!(
            store.motif_instances_of("NK").unwrap_err(),
            Error::NotFound {
                kind: Kind::CellType,
                ..
            }
        ));
        assert!(matches!(
            store.gene_expression("DN", "G2").unwrap_err(),
            Error::NotFound {
                kind: Kind::GeneExpression,
                ..
            }
        ));

        Ok(())
    }

    #[test]
    fn test_model_and_gene_scoped() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;

        let instances = store.instances_of_model("M1")?;
        assert_eq!(instances.len(), 2);
        assert_eq!(
            store.model_of(&instances[0])?.transcription_factor(),
            "GATA3"
        );

        let levels = store
            .expressions_of_gene("G1")?
            .iter()
            .map(|e| e.expression_level())
            .collect::<Vec<_>>();
        assert_eq!(levels, [5.5, 7.25]);

        assert!(store.instances_of_model("M3").is_err());
        assert!(store.expressions_of_gene("G3").is_err());

        Ok(())
    }
}
