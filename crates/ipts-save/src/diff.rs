use similar::{ChangeTag, TextDiff};

/// Line diff between a parsed dump and its cleaned rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesetDiff {
    pub added: usize,
    pub removed: usize,
    pub diff: Option<String>,
}

impl RulesetDiff {
    pub fn between(before: &str, after: &str) -> Self {
        if before == after {
            return Self {
                added: 0,
                removed: 0,
                diff: None,
            };
        }

        let diff = TextDiff::from_lines(before, after);
        let mut added = 0;
        let mut removed = 0;
        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => added += 1,
                ChangeTag::Delete => removed += 1,
                ChangeTag::Equal => {}
            }
        }

        Self {
            added,
            removed,
            diff: Some(render_diff(before, after)),
        }
    }
}

/// Unified line listing: removed lines prefixed `-`, added lines `+`,
/// and lines common to both texts once with a space
pub fn render_diff(before: &str, after: &str) -> String {
    let diff = TextDiff::from_lines(before, after);
    let mut output = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
            ChangeTag::Equal => ' ',
        };
        output.push(sign);
        output.push_str(change.value());
        if change.missing_newline() {
            output.push('\n');
        }
    }

    output
}
