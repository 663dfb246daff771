use std::io::BufRead;

use tracing::info;

use crate::import::Error;
use crate::import::Importer;
use crate::import::Result;
use crate::import::at_line;

impl Importer<'_> {
    /// Imports the interactions observed in `cell_type`.
    ///
    /// Each line describes one interaction; every field on it is the
    /// identifier of a participating locus. A line of `k` fields yields an
    /// interaction with `k` participants, even when some of them repeat.
    /// Returns the number of interactions created.
    pub fn import_interactions<R: BufRead>(&self, source: R, cell_type: &str) -> Result<usize> {
        info!("importing interactions for {cell_type}");

        let mut loci_created = 0;
        let mut participants = 0;

        let interactions = self.atomically(|| {
            self.for_each_record(source, self.interactions.delimiter, |line, fields| {
                let loci = self.interactions.parse(fields).map_err(at_line(line))?;

                let id = self
                    .store
                    .create_interaction(cell_type)
                    .map_err(|error| Error::Rejected { line, error })?;

                for locus in loci {
                    if self.ensure_locus(&locus, line)? {
                        loci_created += 1;
                    }

                    self.store
                        .add_locus_to_interaction(id, locus.id())
                        .map_err(|error| Error::Rejected { line, error })?;
                    participants += 1;
                }

                Ok(())
            })
        })?;

        info!(
            "imported {interactions} interaction(s) with {participants} participant(s) for \
             {cell_type} ({loci_created} new loci)"
        );

        Ok(interactions)
    }
}

#[cfg(test)]
mod tests {
    use crate::Store;
    use crate::entity::Interaction;
    use crate::entity::Locus;
    use crate::import::Error;
    use crate::import::Importer;
    use crate::store;

    const SCENARIO: &str = "chr1:100-200\tchr1:300-400\nchr2:1-50\tchr2:1-50\tchr1:100-200\n";

    fn store() -> Result<Store, Box<dyn std::error::Error>> {
        let store = Store::open_in_memory()?;
        Importer::new(&store).ensure_cell_type("DN")?;
        Ok(store)
    }

    #[test]
    fn test_import_interactions() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;
        let imported = Importer::new(&store).import_interactions(SCENARIO.as_bytes(), "DN")?;
        assert_eq!(imported, 2);

        let interactions = store.interactions_of("DN")?;
        assert_eq!(interactions.len(), 2);

        let first = store.loci_of_interaction(interactions[0].id())?;
        assert_eq!(first, [Locus::new("chr1", 100, 200), Locus::new("chr1", 300, 400)]);

        let second = store
            .loci_of_interaction(interactions[1].id())?
            .iter()
            .map(|locus| locus.id().to_string())
            .collect::<Vec<_>>();
        assert_eq!(second, ["chr2:1-50", "chr2:1-50", "chr1:100-200"]);

        assert_eq!(store.count::<Locus>()?, 3);
        Ok(())
    }

    #[test]
    fn test_reimport_does_not_duplicate_loci() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;
        let importer = Importer::new(&store);

        importer.import_interactions(SCENARIO.as_bytes(), "DN")?;
        importer.import_interactions(SCENARIO.as_bytes(), "DN")?;

        assert_eq!(store.count::<Locus>()?, 3);
        assert_eq!(store.count::<Interaction>()?, 4);
        Ok(())
    }

    #[test]
    fn test_wide_interaction() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;
        let line = (0..12)
            .map(|i| format!("chr3:{}-{}", i * 100, i * 100 + 50))
            .collect::<Vec<_>>()
            .join("\t");

        Importer::new(&store).import_interactions(line.as_bytes(), "DN")?;

        let interactions = store.interactions_of("DN")?;
        let loci = store.loci_of_interaction(interactions[0].id())?;
        assert_eq!(loci.len(), 12);
        for locus in &loci {
            assert!(store.exists::<Locus>(locus.id())?);
        }

        Ok(())
    }

    #[test]
    fn test_unknown_cell_type() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;
        let err = Importer::new(&store)
            .import_interactions("\n\nchr1:1-2\n".as_bytes(), "NK")
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Rejected {
                line: 3,
                error: store::Error::ConstraintViolation(_)
            }
        ));
        Ok(())
    }
}
