// iptables-save structure: tables holding chain declarations and rule lines
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Chain that is never carried over into a cleaned ruleset
pub const FORWARD_CHAIN: &str = "FORWARD";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub chains: Vec<Chain>,
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub name: String,
    /// ACCEPT, DROP, or "-" for user-defined chains
    pub policy: String,
    /// Packet/byte counter token such as `[0:0]`, kept verbatim
    pub counters: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Chain the rule is appended to (second token of the line)
    pub chain: String,
    /// The full rule line, e.g. `-A DOCKER-USER -j RETURN`
    pub raw: String,
}

impl Table {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            chains: vec![],
            rules: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty() && self.rules.is_empty()
    }
}

impl Chain {
    pub fn new(name: &str, policy: &str, counters: &str) -> Self {
        Self {
            name: name.to_string(),
            policy: policy.to_string(),
            counters: counters.to_string(),
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.policy != "-"
    }
}

impl Rule {
    pub fn new(chain: &str, raw: &str) -> Self {
        Self {
            chain: chain.to_string(),
            raw: raw.to_string(),
        }
    }

    /// Build a rule from a trimmed rule line. Returns `None` when the line
    /// has no chain argument after its action flag.
    pub fn from_line(line: &str) -> Option<Self> {
        let chain = line.split_whitespace().nth(1)?;
        Some(Self::new(chain, line))
    }
}

/// Tables keyed by name, iterated in the order they were first inserted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ruleset {
    tables: Vec<Table>,
    index: HashMap<String, usize>,
}

impl Ruleset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table, replacing any table of the same name in place.
    /// Returns the table's position and the table it replaced, if any.
    pub fn insert(&mut self, table: Table) -> (usize, Option<Table>) {
        match self.index.get(&table.name) {
            Some(&idx) => {
                let previous = std::mem::replace(&mut self.tables[idx], table);
                (idx, Some(previous))
            }
            None => {
                let idx = self.tables.len();
                self.index.insert(table.name.clone(), idx);
                self.tables.push(table);
                (idx, None)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.index.get(name).map(|&idx| &self.tables[idx])
    }

    pub fn table_at_mut(&mut self, idx: usize) -> Option<&mut Table> {
        self.tables.get_mut(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Table> {
        self.tables.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn chain_count(&self) -> usize {
        self.tables.iter().map(|t| t.chains.len()).sum()
    }

    pub fn rule_count(&self) -> usize {
        self.tables.iter().map(|t| t.rules.len()).sum()
    }
}

impl FromIterator<Table> for Ruleset {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        let mut ruleset = Ruleset::new();
        for table in iter {
            ruleset.insert(table);
        }
        ruleset
    }
}

impl<'a> IntoIterator for &'a Ruleset {
    type Item = &'a Table;
    type IntoIter = std::slice::Iter<'a, Table>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}
