//! Links between genes and loci, and between interactions and the loci that
//! participate in them.

use rusqlite::params;

use crate::entity::Gene;
use crate::entity::Interaction;
use crate::entity::Kind;
use crate::entity::Locus;
use crate::entity::Record;
use crate::entity::interaction::Id;
use crate::locus_id;
use crate::store::Error;
use crate::store::Result;
use crate::store::Store;

impl Store {
    /// Records that a gene lies within a locus.
    ///
    /// Fails with [`Error::ConstraintViolation`] if either entity does not
    /// exist or the pair has already been recorded.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::entity::Gene;
    /// use regulome::entity::Locus;
    /// use regulome::Store;
    ///
    /// let store = Store::open_in_memory()?;
    /// store.create(&[Gene::new("G1", "chr1", 120, 180)])?;
    /// store.create(&[Locus::new("chr1", 100, 200)])?;
    ///
    /// store.add_gene_locus("G1", "chr1:100-200")?;
    ///
    /// let loci = store.loci_of_gene("G1")?;
    /// assert_eq!(loci, [Locus::new("chr1", 100, 200)]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn add_gene_locus(&self, gene: &str, locus: &str) -> Result<()> {
        locus_id::parse(locus)?;

        self.connection.execute(
            r#"INSERT INTO "GeneInLocus" ("Locus", "Gene") VALUES (?1, ?2)"#,
            params![locus, gene],
        )?;

        Ok(())
    }

    /// Removes the record that a gene lies within a locus.
    ///
    /// Fails with [`Error::ConstraintViolation`] if either entity does not
    /// exist, and with [`Error::NotFound`] if both do but the pair was never
    /// recorded.
    pub fn remove_gene_locus(&self, gene: &str, locus: &str) -> Result<()> {
        locus_id::parse(locus)?;
        self.referenced::<Gene>(gene)?;
        self.referenced::<Locus>(locus)?;

        let removed = self.connection.execute(
            r#"DELETE FROM "GeneInLocus" WHERE "Locus" = ?1 AND "Gene" = ?2"#,
            params![locus, gene],
        )?;

        match removed {
            0 => Err(Error::NotFound {
                kind: Kind::GeneInLocus,
                key: format!("{gene} in {locus}"),
            }),
            _ => Ok(()),
        }
    }

    /// Gets the loci a gene lies within.
    pub fn loci_of_gene(&self, gene: &str) -> Result<Vec<Locus>> {
        self.require::<Gene>(gene)?;

        let mut statement = self.connection.prepare(
            r#"SELECT l."ID", l."Chr", l."Start", l."End"
               FROM "Loci" l
               JOIN "GeneInLocus" g ON g."Locus" = l."ID"
               WHERE g."Gene" = ?1
               ORDER BY l."Chr", l."Start", l."End""#,
        )?;

        let loci = statement
            .query_map([gene], Locus::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(loci)
    }

    /// Gets the genes that lie within a locus.
    pub fn genes_of_locus(&self, locus: &str) -> Result<Vec<Gene>> {
        locus_id::parse(locus)?;
        self.require::<Locus>(locus)?;

        let mut statement = self.connection.prepare(
            r#"SELECT g."Name", g."Chr", g."Start", g."End"
               FROM "Genes" g
               JOIN "GeneInLocus" l ON l."Gene" = g."Name"
               WHERE l."Locus" = ?1
               ORDER BY g."Name""#,
        )?;

        let genes = statement
            .query_map([locus], Gene::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(genes)
    }

    /// Records that a locus participates in an interaction.
    ///
    /// The same locus may be added to an interaction more than once; each
    /// addition is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use regulome::entity::CellType;
    /// use regulome::entity::Locus;
    /// use regulome::Store;
    ///
    /// let store = Store::open_in_memory()?;
    /// store.create(&[CellType::new("DN")])?;
    /// store.create(&[Locus::new("chr2", 1, 50)])?;
    ///
    /// let id = store.create_interaction("DN")?;
    /// store.add_locus_to_interaction(id, "chr2:1-50")?;
    /// store.add_locus_to_interaction(id, "chr2:1-50")?;
    ///
    /// assert_eq!(store.loci_of_interaction(id)?.len(), 2);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn add_locus_to_interaction(&self, interaction: Id, locus: &str) -> Result<()> {
        locus_id::parse(locus)?;

        self.connection.execute(
            r#"INSERT INTO "InteractionParticipation" ("Locus", "Interaction") VALUES (?1, ?2)"#,
            params![locus, interaction],
        )?;

        Ok(())
    }

    /// Removes a locus from an interaction.
    ///
    /// Every occurrence of the locus within the interaction is removed. Fails
    /// with [`Error::ConstraintViolation`] if the interaction or the locus
    /// does not exist, and with [`Error::NotFound`] if the locus does not
    /// participate in the interaction.
    pub fn remove_locus_from_interaction(&self, interaction: Id, locus: &str) -> Result<()> {
        locus_id::parse(locus)?;
        self.referenced::<Interaction>(&interaction)?;
        self.referenced::<Locus>(locus)?;

        let removed = self.connection.execute(
            r#"DELETE FROM "InteractionParticipation" WHERE "Locus" = ?1 AND "Interaction" = ?2"#,
            params![locus, interaction],
        )?;

        match removed {
            0 => Err(Error::NotFound {
                kind: Kind::InteractionParticipation,
                key: format!("{locus} in interaction {interaction}"),
            }),
            _ => Ok(()),
        }
    }

    /// Gets the loci that participate in an interaction, in the order they
    /// were added.
    pub fn loci_of_interaction(&self, interaction: Id) -> Result<Vec<Locus>> {
        self.require::<Interaction>(&interaction)?;

        let mut statement = self.connection.prepare(
            r#"SELECT l."ID", l."Chr", l."Start", l."End"
               FROM "InteractionParticipation" p
               JOIN "Loci" l ON l."ID" = p."Locus"
               WHERE p."Interaction" = ?1
               ORDER BY p.rowid"#,
        )?;

        let loci = statement
            .query_map([interaction], Locus::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(loci)
    }

    /// Checks whether a gene has been recorded as lying within a locus.
    pub fn has_gene_locus(&self, gene: &str, locus: &str) -> Result<bool> {
        let count: i64 = self.connection.query_row(
            r#"SELECT COUNT(*) FROM "GeneInLocus" WHERE "Locus" = ?1 AND "Gene" = ?2"#,
            params![locus, gene],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::entity::CellType;
    use crate::entity::Gene;
    use crate::entity::Kind;
    use crate::entity::Locus;
    use crate::store::Error;
    use crate::store::Store;

    fn store() -> Result<Store, Box<dyn std::error::Error>> {
        let store = Store::open_in_memory()?;
        store.create(&[CellType::new("DN")])?;
        store.create(&[Gene::new("G1", "chr1", 120, 180)])?;
        store.create(&[Locus::new("chr1", 100, 200), Locus::new("chr1", 300, 400)])?;
        Ok(store)
    }

    fn link_count(store: &Store, table: &str) -> i64 {
        store
            .connection()
            .query_row(&format!(r#"SELECT COUNT(*) FROM "{table}""#), [], |row| {
                row.get(0)
            })
            .unwrap()
    }

    #[test]
    fn test_gene_locus_links() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;
        store.add_gene_locus("G1", "chr1:100-200")?;
        store.add_gene_locus("G1", "chr1:300-400")?;

        let loci = store.loci_of_gene("G1")?;
        assert_eq!(loci.len(), 2);
        assert_eq!(loci[0].id(), "chr1:100-200");

        assert_eq!(store.genes_of_locus("chr1:300-400")?[0].name(), "G1");
        assert!(store.has_gene_locus("G1", "chr1:300-400")?);

        store.remove_gene_locus("G1", "chr1:300-400")?;
        assert!(store.genes_of_locus("chr1:300-400")?.is_empty());

        let err = store.remove_gene_locus("G1", "chr1:300-400").unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound {
                kind: Kind::GeneInLocus,
                ..
            }
        ));

        Ok(())
    }

    #[test]
    fn test_gene_locus_pair_is_unique() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;
        store.add_gene_locus("G1", "chr1:100-200")?;

        let err = store.add_gene_locus("G1", "chr1:100-200").unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));
        assert_eq!(link_count(&store, "GeneInLocus"), 1);

        Ok(())
    }

    #[test]
    fn test_links_to_missing_entities() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;

        let err = store.add_gene_locus("G2", "chr1:100-200").unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        let err = store.add_gene_locus("G1", "chr9:1-2").unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        let id = store.create_interaction("DN")?;
        let err = store.add_locus_to_interaction(id, "chr9:1-2").unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        let err = store
            .add_locus_to_interaction(id + 1, "chr1:100-200")
            .unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        assert_eq!(link_count(&store, "GeneInLocus"), 0);
        assert_eq!(link_count(&store, "InteractionParticipation"), 0);

        Ok(())
    }

    #[test]
    fn test_malformed_locus_id() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;

        let err = store.add_gene_locus("G1", "chr1-100").unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));

        let err = store.genes_of_locus("chr1:a-b").unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));

        Ok(())
    }

    #[test]
    fn test_removing_links_of_missing_entities() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;
        store.add_gene_locus("G1", "chr1:100-200")?;
        let id = store.create_interaction("DN")?;
        store.add_locus_to_interaction(id, "chr1:100-200")?;

        let err = store.remove_gene_locus("G2", "chr1:100-200").unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        let err = store.remove_gene_locus("G1", "chr9:1-2").unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        let err = store.remove_gene_locus("G1", "chr1-100").unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));

        let err = store
            .remove_locus_from_interaction(id + 1, "chr1:100-200")
            .unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        let err = store
            .remove_locus_from_interaction(id, "chr9:1-2")
            .unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        let err = store
            .remove_locus_from_interaction(id, "chr1:a-b")
            .unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));

        // Both entities exist but were never linked.
        let err = store.remove_gene_locus("G1", "chr1:300-400").unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound {
                kind: Kind::GeneInLocus,
                ..
            }
        ));

        assert_eq!(link_count(&store, "GeneInLocus"), 1);
        assert_eq!(link_count(&store, "InteractionParticipation"), 1);

        Ok(())
    }

    #[test]
    fn test_queries_distinguish_missing_from_empty() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;

        // An existing locus without genes.
        assert!(store.genes_of_locus("chr1:100-200")?.is_empty());

        assert!(matches!(
            store.genes_of_locus("chr1:1-2").unwrap_err(),
            Error::NotFound {
                kind: Kind::Locus,
                ..
            }
        ));
        assert!(matches!(
            store.loci_of_gene("G2").unwrap_err(),
            Error::NotFound { kind: Kind::Gene, .. }
        ));
        assert!(matches!(
            store.loci_of_interaction(99).unwrap_err(),
            Error::NotFound {
                kind: Kind::Interaction,
                ..
            }
        ));

        let id = store.create_interaction("DN")?;
        assert!(store.loci_of_interaction(id)?.is_empty());

        Ok(())
    }

    #[test]
    fn test_interaction_participation() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;
        let id = store.create_interaction("DN")?;

        store.add_locus_to_interaction(id, "chr1:300-400")?;
        store.add_locus_to_interaction(id, "chr1:100-200")?;
        store.add_locus_to_interaction(id, "chr1:300-400")?;

        let ids = store
            .loci_of_interaction(id)?
            .iter()
            .map(|locus| locus.id().to_string())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["chr1:300-400", "chr1:100-200", "chr1:300-400"]);

        store.remove_locus_from_interaction(id, "chr1:300-400")?;
        assert_eq!(store.loci_of_interaction(id)?, [Locus::new("chr1", 100, 200)]);

        let err = store
            .remove_locus_from_interaction(id, "chr1:300-400")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound {
                kind: Kind::InteractionParticipation,
                ..
            }
        ));

        Ok(())
    }

    #[test]
    fn test_locus_rename_carries_links() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;
        store.add_gene_locus("G1", "chr1:100-200")?;

        store.save(&Locus::new("chr1", 100, 250), "chr1:100-200")?;

        assert_eq!(store.loci_of_gene("G1")?, [Locus::new("chr1", 100, 250)]);
        Ok(())
    }
}
