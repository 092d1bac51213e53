//! Period set helpers shared by the group model and the read model.

use std::collections::BTreeSet;

/// True when the periods form one unbroken run (an empty set is not a run).
pub fn is_contiguous(periods: &BTreeSet<u8>) -> bool {
    match (periods.first(), periods.last()) {
        (Some(&first), Some(&last)) => usize::from(last - first) + 1 == periods.len(),
        _ => false,
    }
}

/// Format periods for list display: a contiguous run collapses to "3-5",
/// anything else is comma-joined ("1,3,5"). A single period is just "7".
pub fn format_periods(periods: &BTreeSet<u8>) -> String {
    match (periods.first(), periods.last()) {
        (Some(first), Some(last)) if first != last && is_contiguous(periods) => {
            format!("{}-{}", first, last)
        }
        _ => periods
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(","),
    }
}

/// Split periods into maximal contiguous runs, each as (first, length).
pub fn contiguous_runs(periods: &BTreeSet<u8>) -> Vec<(u8, u8)> {
    let mut runs: Vec<(u8, u8)> = Vec::new();
    for &period in periods {
        match runs.last_mut() {
            Some((start, len)) if u16::from(*start) + u16::from(*len) == u16::from(period) => {
                *len += 1
            }
            _ => runs.push((period, 1)),
        }
    }
    runs
}
