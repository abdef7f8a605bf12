use mjl_source::Severity;
use rustc_hash::FxHashSet;

use crate::defect::Defect;

/// Which advisory severities survive aggregation.
///
/// Filtering is strictly subtractive and only reaches warnings and hints.
/// Errors are load-bearing and Info entries are companions to an error
/// (like the "opened here" pointer), so neither can be switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityPolicy {
    pub show_warnings: bool,
    pub show_hints: bool,
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self {
            show_warnings: true,
            show_hints: true,
        }
    }
}

/// Merge per-pass defect lists into one presentation-ready list.
///
/// Concatenates in pass order, drops structural duplicates (first
/// occurrence wins), sorts by position, then applies the severity policy.
/// The sort is stable, so same-position defects keep their insertion
/// order and a mismatch error stays ahead of its companion Info.
#[must_use]
pub fn aggregate(lists: Vec<Vec<Defect>>, policy: &SeverityPolicy) -> Vec<Defect> {
    let mut merged: Vec<Defect> = lists.into_iter().flatten().collect();

    let mut seen = FxHashSet::default();
    merged.retain(|defect| {
        seen.insert((
            defect.line,
            defect.column,
            defect.message.clone(),
            defect.severity,
        ))
    });

    merged.sort_by_key(|defect| (defect.line, defect.column));

    merged.retain(|defect| match defect.severity {
        Severity::Error | Severity::Info => true,
        Severity::Warning => policy.show_warnings,
        Severity::Hint => policy.show_hints,
    });

    merged
}
