//! Derived annotations.
//!
//! Gene-to-locus links can be recorded by hand through
//! [`Store::add_gene_locus()`], but they also follow from coordinates alone:
//! a gene lies within every locus on its chromosome that it overlaps.
//! [`link_genes_to_loci()`] records every such link.

use std::collections::HashMap;

use rust_lapper as lapper;
use tracing::debug;
use tracing::info;

use crate::Store;
use crate::entity::Gene;
use crate::entity::Locus;
use crate::locus_id::Position;
use crate::store::Result;

/// An interval index of loci for each chromosome.
type Index = HashMap<String, lapper::Lapper<Position, String>>;

/// Builds the interval index of a set of loci.
fn index(loci: Vec<Locus>) -> Index {
    let mut intervals = HashMap::<String, Vec<lapper::Interval<Position, String>>>::new();

    for locus in loci {
        intervals
            .entry(locus.chr().to_string())
            .or_default()
            .push(lapper::Interval {
                start: locus.start(),
                stop: locus.end(),
                val: locus.id().to_string(),
            });
    }

    intervals
        .into_iter()
        .map(|(chr, intervals)| (chr, lapper::Lapper::new(intervals)))
        .collect()
}

/// Gets the identifiers of the loci that a gene overlaps.
fn overlapping<'a>(index: &'a Index, gene: &Gene) -> impl Iterator<Item = &'a str> {
    let (start, end) = (gene.start(), gene.end());

    index
        .get(gene.chr())
        .into_iter()
        .flat_map(move |lapper| lapper.find(start, end))
        .map(|interval| interval.val.as_str())
}

/// Links every gene to each locus it overlaps on the same chromosome.
///
/// Two intervals overlap when they share at least one position; loci that
/// merely abut a gene are not linked. Links that already exist are left
/// alone. Returns the number of links added.
///
/// # Examples
///
/// ```
/// use regulome::annotate::link_genes_to_loci;
/// use regulome::entity::Gene;
/// use regulome::entity::Locus;
/// use regulome::Store;
///
/// let store = Store::open_in_memory()?;
/// store.create(&[Gene::new("G1", "chr1", 150, 250)])?;
/// store.create(&[
///     Locus::new("chr1", 100, 200),
///     Locus::new("chr1", 240, 400),
///     Locus::new("chr2", 100, 200),
/// ])?;
///
/// assert_eq!(link_genes_to_loci(&store)?, 2);
/// assert_eq!(store.loci_of_gene("G1")?.len(), 2);
///
/// // Running again finds nothing new.
/// assert_eq!(link_genes_to_loci(&store)?, 0);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn link_genes_to_loci(store: &Store) -> Result<usize> {
    let index = index(store.list::<Locus>()?);
    let genes = store.list::<Gene>()?;

    info!(
        "linking {} gene(s) to loci on {} chromosome(s)",
        genes.len(),
        index.len()
    );

    let added = store.atomically(|| -> Result<usize> {
        let mut added = 0;

        for gene in &genes {
            for locus in overlapping(&index, gene) {
                if store.has_gene_locus(gene.name(), locus)? {
                    continue;
                }

                store.add_gene_locus(gene.name(), locus)?;
                debug!("linked gene {} to locus {locus}", gene.name());
                added += 1;
            }
        }

        Ok(added)
    })?;

    info!("added {added} gene-in-locus link(s)");
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping() {
        let index = index(vec![
            Locus::new("chr1", 100, 200),
            Locus::new("chr1", 200, 300),
            Locus::new("chr1", 1_000, 2_000),
            Locus::new("chrX", 100, 200),
        ]);

        let mut found = overlapping(&index, &Gene::new("G1", "chr1", 150, 250)).collect::<Vec<_>>();
        found.sort();
        assert_eq!(found, ["chr1:100-200", "chr1:200-300"]);

        // Abutting is not overlapping.
        let found = overlapping(&index, &Gene::new("G2", "chr1", 300, 1_000)).collect::<Vec<_>>();
        assert!(found.is_empty());

        let found = overlapping(&index, &Gene::new("G3", "chr9", 0, 5_000)).collect::<Vec<_>>();
        assert!(found.is_empty());
    }

    #[test]
    fn test_link_keeps_existing() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = Store::open_in_memory()?;
        store.create(&[Gene::new("G1", "chr1", 150, 250), Gene::new("G2", "chr5", 1, 2)])?;
        store.create(&[Locus::new("chr1", 100, 200), Locus::new("chr1", 220, 230)])?;
        store.add_gene_locus("G1", "chr1:100-200")?;

        assert_eq!(link_genes_to_loci(&store)?, 1);
        assert_eq!(store.loci_of_gene("G1")?.len(), 2);
        assert!(store.loci_of_gene("G2")?.is_empty());

        Ok(())
    }

    #[test]
    fn test_link_within_transaction() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let store = Store::open_in_memory()?;
        let transaction = store.transaction()?;

        store.create(&[Gene::new("G1", "chr1", 150, 250)])?;
        store.create(&[Locus::new("chr1", 100, 200)])?;
        assert_eq!(link_genes_to_loci(&store)?, 1);

        transaction.commit()?;
        assert!(store.has_gene_locus("G1", "chr1:100-200")?);

        Ok(())
    }
}
