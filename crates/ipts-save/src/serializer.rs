// Ruleset -> iptables-restore text
use crate::error::SaveError;
use ipts_core::{Ruleset, Table};
use std::fmt::Write as _;
use std::io::Write;

/// Append one `*table` ... `COMMIT` block followed by a blank line
fn render_table(table: &Table, out: &mut String) {
    out.push('*');
    out.push_str(&table.name);
    out.push('\n');

    for chain in &table.chains {
        let _ = writeln!(out, ":{} {} {}", chain.name, chain.policy, chain.counters);
    }

    for rule in &table.rules {
        out.push_str(&rule.raw);
        out.push('\n');
    }

    out.push_str("COMMIT\n\n");
}

/// Write the ruleset in restore format, one table at a time
pub fn write_ruleset<W: Write + ?Sized>(writer: &mut W, ruleset: &Ruleset) -> Result<(), SaveError> {
    let mut block = String::new();

    for table in ruleset {
        block.clear();
        render_table(table, &mut block);
        writer.write_all(block.as_bytes()).map_err(SaveError::Write)?;
    }

    Ok(())
}

pub fn to_restore_string(ruleset: &Ruleset) -> String {
    let mut out = String::new();
    for table in ruleset {
        render_table(table, &mut out);
    }
    out
}
