// iptables-save text -> Ruleset
use crate::error::SaveError;
use ipts_core::{Chain, Rule, Ruleset, Table};
use std::fmt;
use std::io::BufRead;

/// A line that was skipped because it did not fit the save format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based input line number
    pub line: usize,
    pub kind: WarningKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// Chain declaration without name, policy and counters
    MalformedChain(String),
    /// Rule line without a chain argument
    MalformedRule(String),
    /// Chain or rule line outside any `*table` ... `COMMIT` block
    OutsideTable(String),
    EmptyTableName,
    /// A second header for a table already seen; the earlier one is discarded
    DuplicateTable(String),
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::MalformedChain(line) => write!(f, "malformed chain declaration: {}", line),
            WarningKind::MalformedRule(line) => write!(f, "malformed rule: {}", line),
            WarningKind::OutsideTable(line) => write!(f, "line outside of a table: {}", line),
            WarningKind::EmptyTableName => write!(f, "table header without a name"),
            WarningKind::DuplicateTable(name) => {
                write!(f, "table '{}' declared again, earlier contents dropped", name)
            }
        }
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub ruleset: Ruleset,
    pub warnings: Vec<ParseWarning>,
}

enum Line<'a> {
    Table(&'a str),
    Chain,
    Rule,
    Comment,
    Commit,
    Unknown,
}

fn classify(line: &str) -> Line<'_> {
    if let Some(name) = line.strip_prefix('*') {
        Line::Table(name)
    } else if line.starts_with(':') {
        Line::Chain
    } else if line.starts_with('-') {
        Line::Rule
    } else if line.starts_with('#') {
        Line::Comment
    } else if line.starts_with("COMMIT") {
        Line::Commit
    } else {
        Line::Unknown
    }
}

/// `:NAME POLICY COUNTERS`, extra fields are ignored
fn parse_chain(line: &str) -> Option<Chain> {
    let mut fields = line.split_whitespace();
    let name = fields.next()?.strip_prefix(':')?;
    let policy = fields.next()?;
    let counters = fields.next()?;

    if name.is_empty() {
        return None;
    }
    Some(Chain::new(name, policy, counters))
}

/// Line-driven state machine over the save format
struct SaveParser {
    ruleset: Ruleset,
    /// Index of the table opened by the last `*` header, cleared on COMMIT
    current: Option<usize>,
    warnings: Vec<ParseWarning>,
}

impl SaveParser {
    fn new() -> Self {
        Self {
            ruleset: Ruleset::new(),
            current: None,
            warnings: vec![],
        }
    }

    fn warn(&mut self, line: usize, kind: WarningKind) {
        self.warnings.push(ParseWarning { line, kind });
    }

    fn feed(&mut self, line_no: usize, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }

        match classify(line) {
            Line::Table(name) => {
                if name.is_empty() {
                    self.current = None;
                    self.warn(line_no, WarningKind::EmptyTableName);
                    return;
                }

                let (idx, previous) = self.ruleset.insert(Table::new(name));
                if previous.is_some() {
                    self.warn(line_no, WarningKind::DuplicateTable(name.to_string()));
                }
                self.current = Some(idx);
            }
            Line::Chain | Line::Rule if self.current.is_none() => {
                self.warn(line_no, WarningKind::OutsideTable(line.to_string()));
            }
            Line::Chain => match parse_chain(line) {
                Some(chain) => {
                    if let Some(table) = self.current_table() {
                        table.chains.push(chain);
                    }
                }
                None => self.warn(line_no, WarningKind::MalformedChain(line.to_string())),
            },
            Line::Rule => match Rule::from_line(line) {
                Some(rule) => {
                    if let Some(table) = self.current_table() {
                        table.rules.push(rule);
                    }
                }
                None => self.warn(line_no, WarningKind::MalformedRule(line.to_string())),
            },
            Line::Commit => self.current = None,
            Line::Comment | Line::Unknown => {}
        }
    }

    fn current_table(&mut self) -> Option<&mut Table> {
        let idx = self.current?;
        self.ruleset.table_at_mut(idx)
    }

    fn finish(self) -> ParseOutcome {
        ParseOutcome {
            ruleset: self.ruleset,
            warnings: self.warnings,
        }
    }
}

/// Parse save-format text, returning the ruleset and every skipped line.
///
/// Only a failing read is an error. Bytes that are not valid UTF-8 are
/// replaced rather than rejected.
pub fn parse_with_diagnostics<R: BufRead>(mut reader: R) -> Result<ParseOutcome, SaveError> {
    let mut parser = SaveParser::new();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        line_no += 1;

        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| SaveError::Read {
                line: line_no,
                source,
            })?;
        if read == 0 {
            break;
        }

        parser.feed(line_no, &String::from_utf8_lossy(&buf));
    }

    Ok(parser.finish())
}

/// Parse save-format text, logging skipped lines as warnings
pub fn parse<R: BufRead>(reader: R) -> Result<Ruleset, SaveError> {
    let outcome = parse_with_diagnostics(reader)?;

    for warning in &outcome.warnings {
        tracing::warn!(line = warning.line, "skipping line: {}", warning.kind);
    }

    Ok(outcome.ruleset)
}
