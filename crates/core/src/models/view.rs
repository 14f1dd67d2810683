use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::series::PricePoint;

/// Truncation for the gainer/loser rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TopN {
    #[default]
    All,
    Top(usize),
}

impl TopN {
    pub fn apply<T>(self, items: &mut Vec<T>) {
        if let TopN::Top(n) = self {
            items.truncate(n);
        }
    }
}

/// User-chosen filter parameters, supplied fresh on every interaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Filters {
    /// Restrict drill-down to these position keys (None = all)
    pub keys: Option<Vec<String>>,

    /// Date window for the growth curve and drill-down series
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,

    pub top_gainers: TopN,
    pub top_losers: TopN,
}

/// Daily change for one unrealized position, computed from its two most
/// recent price points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPnlRow {
    pub key: String,

    /// Day-over-day return in percent, derived from the cumulative
    /// return ratio of the two latest points
    pub daily_return_pct: f64,

    /// Market value delta between the two latest points, in currency
    pub daily_pnl: f64,
}

/// Daily P&L over the unrealized partition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyPnl {
    /// Sum of per-position market value deltas
    pub total_pnl: f64,

    /// (sum of latest MV) / (sum of prior MV) - 1, in percent
    pub total_return_pct: f64,

    /// Per-position rows, sorted by daily P&L descending
    pub rows: Vec<DailyPnlRow>,
}

/// Invested/value/return figures for one partition of the ledger.
/// An empty partition yields all zeros rather than a division error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionMetrics {
    pub total_invested: f64,
    pub current_value: f64,

    /// current_value - total_invested
    pub delta: f64,

    /// (current_value / total_invested - 1) * 100, zero when nothing invested
    pub return_pct: f64,
}

/// Overview across the three standard partitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Overview {
    pub combined: PartitionMetrics,
    pub unrealized: PartitionMetrics,
    pub realized: PartitionMetrics,
}

/// One entry in the gainers or losers ranking, taken from the
/// position's latest price point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPosition {
    pub key: String,
    pub return_pct: f64,
    pub market_value: f64,

    /// market_value - capital invested in this position
    pub gain: f64,
}

/// One point of the aggregate value-growth curve.
/// Market value is summed across positions (pseudo points excluded)
/// and scaled to thousands for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub date: NaiveDate,
    pub market_value_k: f64,
}

/// Latest-point summary for one position in the drill-down view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionPerformance {
    pub key: String,
    pub market_value: f64,
    pub return_pct: f64,
}

/// Per-position series and summaries for the selected keys,
/// restricted to the filter date window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrillDown {
    pub series: HashMap<String, Vec<PricePoint>>,
    pub summaries: Vec<PositionPerformance>,
}

/// Everything the presentation layer needs for one render, computed
/// fresh per interaction from the ledger snapshot and fetched series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedView {
    pub as_of: NaiveDate,
    pub daily_pnl: DailyPnl,
    pub overview: Overview,
    pub gainers: Vec<RankedPosition>,
    pub losers: Vec<RankedPosition>,
    pub growth: Vec<GrowthPoint>,
    pub drill_down: DrillDown,
}
