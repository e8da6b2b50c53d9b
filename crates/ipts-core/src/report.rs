use crate::model::Ruleset;
use serde::{Deserialize, Serialize};

/// Outcome of filtering a single table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReport {
    pub name: String,
    pub chains_kept: usize,
    pub chains_dropped: Vec<String>,
    pub rules_kept: usize,
    pub rules_dropped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterReport {
    pub tables: Vec<TableReport>,
    /// Tables left out by the table selector
    pub skipped_tables: Vec<String>,
}

impl TableReport {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

impl FilterReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules_dropped(&self) -> usize {
        self.tables.iter().map(|t| t.rules_dropped).sum()
    }

    /// Emit the report as tracing events
    pub fn log(&self) {
        for table in &self.tables {
            tracing::info!(
                table = %table.name,
                chains_kept = table.chains_kept,
                chains_dropped = table.chains_dropped.len(),
                rules_kept = table.rules_kept,
                rules_dropped = table.rules_dropped,
                "filtered table"
            );
            for chain in &table.chains_dropped {
                tracing::debug!(table = %table.name, chain = %chain, "dropped chain");
            }
        }

        for name in &self.skipped_tables {
            tracing::debug!(table = %name, "table not selected");
        }

        tracing::info!(
            tables = self.tables.len(),
            skipped = self.skipped_tables.len(),
            rules_dropped = self.rules_dropped(),
            "filter finished"
        );
    }
}

/// Chain and rule counts for one parsed table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub name: String,
    pub chains: usize,
    pub builtin_chains: usize,
    pub rules: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetSummary {
    pub tables: Vec<TableSummary>,
}

impl RulesetSummary {
    pub fn from_ruleset(ruleset: &Ruleset) -> Self {
        let tables = ruleset
            .iter()
            .map(|table| TableSummary {
                name: table.name.clone(),
                chains: table.chains.len(),
                builtin_chains: table.chains.iter().filter(|c| c.is_builtin()).count(),
                rules: table.rules.len(),
            })
            .collect();

        Self { tables }
    }

    pub fn display(&self) {
        println!("📊 Ruleset Summary\n");

        println!("🔥 Tables ({}):", self.tables.len());
        if self.tables.is_empty() {
            println!("  (none)");
            return;
        }

        for table in &self.tables {
            println!(
                "  • {} - {} chains ({} built-in), {} rules",
                table.name, table.chains, table.builtin_chains, table.rules
            );
        }
    }
}
