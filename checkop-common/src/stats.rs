//! Statistics presentation helpers
//!
//! The backend's stats blob is sparse and sometimes entirely empty. These
//! helpers centralize the "usable at all?" check and the sentinel defaulting
//! so rendering code never touches raw `Option`s.
//!
//! Ported-number attribution: the backend reports a single `portado` count
//! without a line-type split. It is attributed to the mobile share (fixed
//! lines are assumed non-ported). Known precedence choice, kept as-is.

use crate::api::types::Stats;

/// Placeholder shown for any statistic that is absent.
pub const SENTINEL: &str = "-";

impl Stats {
    /// Whether the blob carries at least one populated field.
    ///
    /// Files still processing have a null blob; some older completed jobs
    /// carry an empty object, which counts as absent too.
    pub fn is_usable(&self) -> bool {
        self.ddd.is_some()
            || self.fixo.is_some()
            || self.movel.is_some()
            || self.uf.is_some()
            || self.city.is_some()
            || self.invalid.is_some()
            || self.valid.is_some()
            || self.operadora.is_some()
            || self.portado.is_some()
            || self.total.is_some()
    }

    /// Number of distinct area codes, or the sentinel.
    pub fn ddd_count(&self) -> String {
        match &self.ddd {
            Some(map) => format_count(map.len() as u64),
            None => SENTINEL.to_string(),
        }
    }
}

/// Render an optional count with the sentinel default.
pub fn display_count(value: Option<u64>) -> String {
    value.map(format_count).unwrap_or_else(|| SENTINEL.to_string())
}

/// Format a count with `.` thousands separators (pt-BR convention).
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Fixed/mobile split with ported counts attributed to the mobile share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTypeBreakdown {
    pub fixed: u64,
    pub mobile: u64,
    pub mobile_ported: u64,
    pub mobile_not_ported: u64,
}

/// Compute the line-type breakdown used by the dashboard charts.
///
/// Absent fields count as zero; the ported count is clamped to the mobile
/// total so a stale blob cannot produce a negative remainder.
pub fn line_type_breakdown(stats: &Stats) -> LineTypeBreakdown {
    let fixed = stats.fixo.unwrap_or(0);
    let mobile = stats.movel.unwrap_or(0);
    let ported = stats.portado.unwrap_or(0).min(mobile);
    LineTypeBreakdown {
        fixed,
        mobile,
        mobile_ported: ported,
        mobile_not_ported: mobile - ported,
    }
}
