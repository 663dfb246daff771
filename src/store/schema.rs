//! The relational schema.
//!
//! Foreign keys are enforced. Key renames cascade to referencing rows
//! (`ON UPDATE CASCADE`); deletes never do, so removing an entity that is
//! still referenced fails with a constraint violation.

use rusqlite::Connection;

/// Every table in the schema, in creation order.
pub const TABLES: &[&str] = &[
    "CellTypes",
    "Genes",
    "Loci",
    "MotifModels",
    "MotifInstances",
    "GeneExpression",
    "Interactions",
    "InteractionParticipation",
    "GeneInLocus",
];

/// The statements that create the schema.
const CREATE: &str = r#"
CREATE TABLE IF NOT EXISTS "CellTypes" (
    "Type" TEXT PRIMARY KEY NOT NULL
);

CREATE TABLE IF NOT EXISTS "Genes" (
    "Name" TEXT PRIMARY KEY NOT NULL,
    "Chr" TEXT NOT NULL,
    "Start" INTEGER NOT NULL,
    "End" INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS "Loci" (
    "ID" TEXT PRIMARY KEY NOT NULL,
    "Chr" TEXT NOT NULL,
    "Start" INTEGER NOT NULL,
    "End" INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS "MotifModels" (
    "Name" TEXT PRIMARY KEY NOT NULL,
    "Length" INTEGER NOT NULL,
    "Quality" INTEGER NOT NULL,
    "UniprotID" TEXT NOT NULL,
    "TranscriptionFactor" TEXT NOT NULL,
    "TFFamily" TEXT NOT NULL,
    "EntrezGene" INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS "MotifInstances" (
    "CellType" TEXT NOT NULL REFERENCES "CellTypes" ("Type") ON UPDATE CASCADE,
    "Chr" TEXT NOT NULL,
    "Start" INTEGER NOT NULL,
    "Forward" INTEGER NOT NULL,
    "ThresholdScore" REAL NOT NULL,
    "LocusID" TEXT NOT NULL REFERENCES "Loci" ("ID") ON UPDATE CASCADE,
    "Model" TEXT NOT NULL REFERENCES "MotifModels" ("Name") ON UPDATE CASCADE,
    PRIMARY KEY ("CellType", "Chr", "Start")
);

CREATE INDEX IF NOT EXISTS "MotifInstancesByModel" ON "MotifInstances" ("Model");

CREATE TABLE IF NOT EXISTS "GeneExpression" (
    "CellType" TEXT NOT NULL REFERENCES "CellTypes" ("Type") ON UPDATE CASCADE,
    "Gene" TEXT NOT NULL REFERENCES "Genes" ("Name") ON UPDATE CASCADE,
    "ExpressionLevel" REAL NOT NULL,
    PRIMARY KEY ("CellType", "Gene")
);

CREATE INDEX IF NOT EXISTS "GeneExpressionByGene" ON "GeneExpression" ("Gene");

CREATE TABLE IF NOT EXISTS "Interactions" (
    "ID" INTEGER PRIMARY KEY AUTOINCREMENT,
    "CellType" TEXT NOT NULL REFERENCES "CellTypes" ("Type") ON UPDATE CASCADE
);

CREATE INDEX IF NOT EXISTS "InteractionsByCellType" ON "Interactions" ("CellType");

CREATE TABLE IF NOT EXISTS "InteractionParticipation" (
    "Locus" TEXT NOT NULL REFERENCES "Loci" ("ID") ON UPDATE CASCADE,
    "Interaction" INTEGER NOT NULL REFERENCES "Interactions" ("ID") ON UPDATE CASCADE
);

CREATE INDEX IF NOT EXISTS "ParticipationByInteraction"
    ON "InteractionParticipation" ("Interaction");
CREATE INDEX IF NOT EXISTS "ParticipationByLocus" ON "InteractionParticipation" ("Locus");

CREATE TABLE IF NOT EXISTS "GeneInLocus" (
    "Locus" TEXT NOT NULL REFERENCES "Loci" ("ID") ON UPDATE CASCADE,
    "Gene" TEXT NOT NULL REFERENCES "Genes" ("Name") ON UPDATE CASCADE,
    PRIMARY KEY ("Locus", "Gene")
);

CREATE INDEX IF NOT EXISTS "GeneInLocusByGene" ON "GeneInLocus" ("Gene");
"#;

/// Enables foreign key enforcement and creates any missing tables.
pub fn initialize(connection: &Connection) -> rusqlite::Result<()> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    connection.execute_batch(CREATE)
}

/// Quotes an identifier for use in a statement.
pub fn quote(identifier: &str) -> String {
    format!("\"{identifier}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_repeatable() -> Result<(), Box<dyn std::error::Error>> {
        let connection = Connection::open_in_memory()?;
        initialize(&connection)?;
        initialize(&connection)?;

        for table in TABLES {
            let count: i64 = connection.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )?;
            assert_eq!(count, 1, "{table}");
        }

        let enforced: bool =
            connection.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        assert!(enforced);

        Ok(())
    }
}
