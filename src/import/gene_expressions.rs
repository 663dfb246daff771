use std::io::BufRead;

use tracing::info;

use crate::entity::GeneExpression;
use crate::import::Importer;
use crate::import::Result;
use crate::import::at_line;

impl Importer<'_> {
    /// Imports gene expression levels.
    ///
    /// Each line names a gene, its coordinates, and its expression level in
    /// every cell type the schema lists. The gene is created from those
    /// coordinates unless a gene with the same name already exists. Returns
    /// the number of expression levels created.
    pub fn import_gene_expressions<R: BufRead>(&self, source: R) -> Result<usize> {
        info!("importing gene expressions");

        let mut genes_created = 0;

        let expressions = self.atomically(|| {
            let mut batch = self.batch::<GeneExpression>();

            self.for_each_record(source, self.gene_expressions.delimiter, |line, fields| {
                let (gene, expressions) =
                    self.gene_expressions.parse(fields).map_err(at_line(line))?;

                if self.ensure_gene(&gene, line)? {
                    genes_created += 1;
                }

                for expression in expressions {
                    batch.push(line, expression)?;
                }

                Ok(())
            })?;

            batch.finish()
        })?;

        info!("imported {expressions} gene expression level(s) ({genes_created} new genes)");
        Ok(expressions)
    }
}
