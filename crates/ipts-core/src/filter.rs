use crate::model::{Chain, FORWARD_CHAIN, Rule, Ruleset, Table};
use crate::report::{FilterReport, TableReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which tables, chains and rules survive a cleaning pass.
///
/// An empty selector means "no restriction". Exclusion patterns drop any
/// chain whose name starts with a pattern, and any rule whose owning chain
/// starts with a pattern or whose text contains one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub tables: BTreeSet<String>,
    #[serde(default)]
    pub chains: BTreeSet<String>,
    #[serde(default)]
    pub exclude: BTreeSet<String>,
}

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables.extend(trimmed(tables));
        self
    }

    pub fn with_chains<I, S>(mut self, chains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chains.extend(trimmed(chains));
        self
    }

    /// Patterns are kept byte-for-byte, whitespace included. Empty patterns
    /// are ignored; they would match every chain.
    pub fn with_exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(
            patterns
                .into_iter()
                .map(Into::<String>::into)
                .filter(|p| !p.is_empty()),
        );
        self
    }

    /// Union of both parameter sets
    pub fn merge(mut self, other: &FilterParams) -> Self {
        self.tables.extend(other.tables.iter().cloned());
        self.chains.extend(other.chains.iter().cloned());
        self.exclude.extend(other.exclude.iter().cloned());
        self
    }

    /// Copy with trimmed selectors and without empty entries
    pub fn normalized(self) -> Self {
        FilterParams::new()
            .with_tables(self.tables)
            .with_chains(self.chains)
            .with_exclude(self.exclude)
    }
}

fn trimmed<I, S>(items: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items
        .into_iter()
        .map(Into::<String>::into)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Applies [`FilterParams`] to a parsed ruleset
pub struct RulesetFilter {
    params: FilterParams,
}

impl RulesetFilter {
    pub fn new(params: FilterParams) -> Self {
        Self {
            params: params.normalized(),
        }
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn keeps_table(&self, name: &str) -> bool {
        self.params.tables.is_empty() || self.params.tables.contains(name)
    }

    pub fn keeps_chain(&self, chain: &Chain) -> bool {
        self.chain_selected(&chain.name)
    }

    pub fn keeps_rule(&self, rule: &Rule) -> bool {
        self.chain_selected(&rule.chain)
            && !self.params.exclude.iter().any(|p| rule.raw.contains(p.as_str()))
    }

    fn chain_selected(&self, name: &str) -> bool {
        if name == FORWARD_CHAIN {
            return false;
        }
        if self.params.exclude.iter().any(|p| name.starts_with(p.as_str())) {
            return false;
        }
        self.params.chains.is_empty() || self.params.chains.contains(name)
    }

    pub fn apply(&self, ruleset: &Ruleset) -> Ruleset {
        self.apply_with_report(ruleset).0
    }

    /// Filter the ruleset and record what was kept and dropped per table
    pub fn apply_with_report(&self, ruleset: &Ruleset) -> (Ruleset, FilterReport) {
        let mut filtered = Ruleset::new();
        let mut report = FilterReport::new();

        for table in ruleset {
            if !self.keeps_table(&table.name) {
                report.skipped_tables.push(table.name.clone());
                continue;
            }

            let (kept, table_report) = self.filter_table(table);
            filtered.insert(kept);
            report.tables.push(table_report);
        }

        (filtered, report)
    }

    fn filter_table(&self, table: &Table) -> (Table, TableReport) {
        let mut kept = Table::new(&table.name);
        let mut report = TableReport::new(&table.name);

        for chain in &table.chains {
            if self.keeps_chain(chain) {
                kept.chains.push(chain.clone());
            } else {
                report.chains_dropped.push(chain.name.clone());
            }
        }

        for rule in &table.rules {
            if self.keeps_rule(rule) {
                kept.rules.push(rule.clone());
            } else {
                report.rules_dropped += 1;
            }
        }

        report.chains_kept = kept.chains.len();
        report.rules_kept = kept.rules.len();
        (kept, report)
    }
}

/// Filter a ruleset in one call
pub fn filter(ruleset: &Ruleset, params: &FilterParams) -> Ruleset {
    RulesetFilter::new(params.clone()).apply(ruleset)
}
