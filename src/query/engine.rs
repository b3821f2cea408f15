//! Single-pass, multi-filter scan.

use crate::filter::Filter;
use crate::token::TokenRef;
use tracing::{debug, trace};

/// What happened during one [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanSummary {
    /// Tokens pulled from the source.
    pub scanned: usize,
    /// Index of the first filter that stopped the scan, if any did.
    pub halted_by: Option<usize>,
}

impl ScanSummary {
    pub fn halted(&self) -> bool {
        self.halted_by.is_some()
    }
}

/// Run every filter over `tokens` in one pass.
///
/// Filter state is reset first. Each token is offered to the filters in list
/// order; filters already at their limit are skipped. When a filter signals
/// termination, the filters after it still see the current token, and the
/// scan stops before the next one. Matches accumulate in each filter's
/// [`results`](Filter::results).
pub fn run<'a, I>(filters: &mut [Filter], tokens: I) -> ScanSummary
where
    I: IntoIterator<Item = TokenRef<'a>>,
{
    for filter in filters.iter_mut() {
        filter.reset();
    }

    let mut summary = ScanSummary::default();
    for token in tokens {
        summary.scanned += 1;
        for (index, filter) in filters.iter_mut().enumerate() {
            if filter.is_exhausted() {
                continue;
            }
            let eval = filter.eval(&token);
            if eval.terminate && summary.halted_by.is_none() {
                trace!(filter = index, token = %token, id = %token.id(), "limit reached");
                summary.halted_by = Some(index);
            }
        }
        if summary.halted() {
            break;
        }
    }

    debug!(
        filters = filters.len(),
        scanned = summary.scanned,
        halted_by = ?summary.halted_by,
        "query finished"
    );
    summary
}
