use std::io::BufRead;

use tracing::info;

use crate::entity::MotifModel;
use crate::import::Importer;
use crate::import::Result;
use crate::import::at_line;

impl Importer<'_> {
    /// Imports motif models. A model whose name is already taken is rejected.
    /// Returns the number of models created.
    pub fn import_motif_models<R: BufRead>(&self, source: R) -> Result<usize> {
        info!("importing motif models");

        let models = self.atomically(|| {
            let mut batch = self.batch::<MotifModel>();

            self.for_each_record(source, self.motif_models.delimiter, |line, fields| {
                let model = self.motif_models.parse(fields).map_err(at_line(line))?;
                batch.push(line, model)
            })?;

            batch.finish()
        })?;

        info!("imported {models} motif model(s)");
        Ok(models)
    }
}
