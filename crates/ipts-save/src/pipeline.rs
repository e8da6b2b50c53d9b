use crate::diff::RulesetDiff;
use crate::error::SaveError;
use crate::parser::parse;
use crate::serializer::{to_restore_string, write_ruleset};
use ipts_core::{FilterParams, FilterReport, Ruleset, RulesetFilter};
use std::io::{BufRead, Write};

/// A parsed dump together with its cleaned form
#[derive(Debug, Clone)]
pub struct Scrubbed {
    pub parsed: Ruleset,
    pub cleaned: Ruleset,
    pub report: FilterReport,
}

impl Scrubbed {
    /// Write the cleaned ruleset in restore format
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), SaveError> {
        write_ruleset(writer, &self.cleaned)
    }

    /// Line diff between the restore renderings of the parsed and cleaned rulesets
    pub fn diff(&self) -> RulesetDiff {
        RulesetDiff::between(
            &to_restore_string(&self.parsed),
            &to_restore_string(&self.cleaned),
        )
    }
}

/// Parse a save dump and filter it. Nothing is written; callers decide
/// where the cleaned ruleset goes once the whole input has parsed.
pub fn scrub<R: BufRead>(reader: R, params: &FilterParams) -> Result<Scrubbed, SaveError> {
    let parsed = parse(reader)?;
    tracing::debug!(
        tables = ?parsed.names().collect::<Vec<_>>(),
        chains = parsed.chain_count(),
        rules = parsed.rule_count(),
        "parsed ruleset"
    );

    let (cleaned, report) = RulesetFilter::new(params.clone()).apply_with_report(&parsed);

    Ok(Scrubbed {
        parsed,
        cleaned,
        report,
    })
}
