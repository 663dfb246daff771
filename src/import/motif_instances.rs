use std::io::BufRead;

use tracing::info;

use crate::entity::MotifInstance;
use crate::import::Importer;
use crate::import::Result;
use crate::import::at_line;

impl Importer<'_> {
    /// Imports the motif instances found in `cell_type`.
    ///
    /// The locus named on each line is created if it does not exist yet. The
    /// motif model must already exist. Returns the number of instances
    /// created.
    pub fn import_motif_instances<R: BufRead>(&self, source: R, cell_type: &str) -> Result<usize> {
        info!("importing motif instances for {cell_type}");

        let mut loci_created = 0;

        let instances = self.atomically(|| {
            let mut batch = self.batch::<MotifInstance>();

            self.for_each_record(source, self.motif_instances.delimiter, |line, fields| {
                let (locus, instance) = self
                    .motif_instances
                    .parse(fields, cell_type)
                    .map_err(at_line(line))?;

                if self.ensure_locus(&locus, line)? {
                    loci_created += 1;
                }

                batch.push(line, instance)
            })?;

            batch.finish()
        })?;

        info!("imported {instances} motif instance(s) for {cell_type} ({loci_created} new loci)");
        Ok(instances)
    }
}

#[cfg(test)]
mod tests {
    use crate::Store;
    use crate::entity::Locus;
    use crate::entity::MotifInstance;
    use crate::entity::motif_model::Builder;
    use crate::import::Error;
    use crate::import::Importer;
    use crate::store;

    fn store() -> Result<Store, Box<dyn std::error::Error>> {
        let store = Store::open_in_memory()?;
        Importer::new(&store).ensure_cell_type("PGN")?;
        store.create(&[Builder::new("M1").build(), Builder::new("M2").build()])?;
        Ok(store)
    }

    fn line(locus: &str, start: u64, model: &str, score: f64, strand: &str) -> String {
        let end = start + 10;
        format!("chr1\t{start}\t{end}\t{locus}\tchr1\t{start}\t.\t{model}\t{score}\t{strand}\n")
    }

    #[test]
    fn test_import_motif_instances() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;
        store.create(&[Locus::new("chr1", 100, 200)])?;

        let data = [
            line("chr1:100-200", 110, "M1", 7.5, "+"),
            String::from("\n"),
            line("chr1:100-200", 150, "M2", 3.25, "-"),
            line("chr1:300-400", 310, "M1", 1.0, "."),
        ]
        .concat();

        let imported = Importer::new(&store)
            .with_batch_size(2)
            .import_motif_instances(data.as_bytes(), "PGN")?;
        assert_eq!(imported, 3);

        let instances = store.motif_instances_of("PGN")?;
        assert_eq!(
            instances,
            [
                MotifInstance::new("PGN", "chr1", 110, true, 7.5, "chr1:100-200", "M1"),
                MotifInstance::new("PGN", "chr1", 150, false, 3.25, "chr1:100-200", "M2"),
                MotifInstance::new("PGN", "chr1", 310, false, 1.0, "chr1:300-400", "M1"),
            ]
        );

        // The second locus was created from its identifier.
        assert_eq!(store.get::<Locus>("chr1:300-400")?.end(), 400);
        assert_eq!(store.count::<Locus>()?, 2);

        Ok(())
    }

    #[test]
    fn test_unknown_model_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;
        let data = [
            line("chr1:100-200", 110, "M1", 7.5, "+"),
            line("chr1:100-200", 120, "M9", 7.5, "+"),
        ]
        .concat();

        let err = Importer::new(&store)
            .import_motif_instances(data.as_bytes(), "PGN")
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Rejected {
                line: 2,
                error: store::Error::ConstraintViolation(_)
            }
        ));
        assert_eq!(store.count::<MotifInstance>()?, 0);
        assert_eq!(store.count::<Locus>()?, 0);

        Ok(())
    }

    #[test]
    fn test_malformed_start() -> Result<(), Box<dyn std::error::Error>> {
        let store = store()?;
        let data = "chr1\t1\t2\tchr1:1-20\tchr1\tone\t.\tM1\t1.0\t+\n";

        let err = Importer::new(&store)
            .import_motif_instances(data.as_bytes(), "PGN")
            .unwrap_err();

        assert!(matches!(err, Error::Parse { line: 1, .. }));
        Ok(())
    }
}
