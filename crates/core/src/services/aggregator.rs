use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::models::position::Position;
use crate::models::series::{Bar, PricePoint};
use crate::models::view::{
    AggregatedView, DailyPnl, DailyPnlRow, DrillDown, Filters, GrowthPoint, Overview,
    PartitionMetrics, PositionPerformance, RankedPosition,
};

/// Turns the position ledger plus fetched price series into the dashboard
/// views: realized/unrealized split, daily P&L, gainer/loser rankings, and
/// the windowed growth curve.
///
/// Pure business logic, no I/O. Fetching happens upstream; `aggregate`
/// recomputes everything from the given snapshot on every call, so there
/// is no hidden state to drift between interactions.
pub struct PortfolioAggregator;

impl PortfolioAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Build a position's price-point sequence from its fetched bars.
    ///
    /// Points carry the cumulative return since purchase and the market
    /// value at each close, sorted ascending by date. A single-bar history
    /// (position bought very recently) gets a synthetic leading point so
    /// that every non-empty sequence has at least two entries and
    /// daily-delta lookbacks never index out of range.
    pub fn build_series(&self, position: &Position, bars: &[Bar], today: NaiveDate) -> Vec<PricePoint> {
        let mut points: Vec<PricePoint> = bars
            .iter()
            .map(|bar| PricePoint::from_bar(bar, position.buy_price, position.shares))
            .collect();

        if points.len() == 1 {
            points.push(PricePoint::pseudo(today, position.buy_price, position.shares));
        }

        points.sort_by_key(|p| p.date);
        points
    }

    /// Compute the full dashboard view from a ledger snapshot and the
    /// per-key price series.
    ///
    /// Positions without a series (no data fetched) contribute nothing to
    /// any value sum; they never abort the computation.
    pub fn aggregate(
        &self,
        ledger: &[Position],
        series: &HashMap<String, Vec<PricePoint>>,
        filters: &Filters,
        today: NaiveDate,
    ) -> AggregatedView {
        let by_key: HashMap<&str, &Position> =
            ledger.iter().map(|p| (p.key.as_str(), p)).collect();

        // Partition series keys by the owning position's closed flag.
        // Total and exclusive: every key with a ledger row lands in
        // exactly one side.
        let mut realized_keys: Vec<&str> = Vec::new();
        let mut unrealized_keys: Vec<&str> = Vec::new();
        for key in series.keys() {
            let Some(position) = by_key.get(key.as_str()) else {
                continue; // series for a row since removed from the ledger
            };
            if position.closed {
                realized_keys.push(key);
            } else {
                unrealized_keys.push(key);
            }
        }
        realized_keys.sort_unstable();
        unrealized_keys.sort_unstable();

        let daily_pnl = self.daily_pnl(&unrealized_keys, series);
        let overview = self.overview(ledger, &realized_keys, &unrealized_keys, series);
        let (gainers, losers) = self.rankings(&by_key, series, filters);
        let growth = self.growth_curve(series, filters);
        let drill_down = self.drill_down(series, filters);

        AggregatedView {
            as_of: today,
            daily_pnl,
            overview,
            gainers,
            losers,
            growth,
            drill_down,
        }
    }

    /// Daily P&L over the unrealized partition: per key, compare the two
    /// most recent points. The pseudo-point rule guarantees two points for
    /// any position with at least one real observation; keys that still
    /// fall short contribute nothing.
    fn daily_pnl(
        &self,
        unrealized_keys: &[&str],
        series: &HashMap<String, Vec<PricePoint>>,
    ) -> DailyPnl {
        let mut rows = Vec::new();
        let mut latest_mv_sum = 0.0;
        let mut prior_mv_sum = 0.0;

        for key in unrealized_keys {
            let Some(points) = series.get(*key) else {
                continue;
            };
            if points.len() < 2 {
                continue;
            }
            let latest = &points[points.len() - 1];
            let prior = &points[points.len() - 2];

            let prior_ratio = 1.0 + prior.return_pct / 100.0;
            let latest_ratio = 1.0 + latest.return_pct / 100.0;
            let daily_return_pct = if prior_ratio.abs() > f64::EPSILON {
                (latest_ratio / prior_ratio - 1.0) * 100.0
            } else {
                0.0
            };

            latest_mv_sum += latest.market_value;
            prior_mv_sum += prior.market_value;

            rows.push(DailyPnlRow {
                key: (*key).to_string(),
                daily_return_pct,
                daily_pnl: latest.market_value - prior.market_value,
            });
        }

        rows.sort_by(|a, b| {
            b.daily_pnl
                .partial_cmp(&a.daily_pnl)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let total_pnl = rows.iter().map(|r| r.daily_pnl).sum();
        let total_return_pct = if prior_mv_sum.abs() > f64::EPSILON {
            (latest_mv_sum / prior_mv_sum - 1.0) * 100.0
        } else {
            0.0
        };

        DailyPnl {
            total_pnl,
            total_return_pct,
            rows,
        }
    }

    /// Invested/value/return metrics for the combined, unrealized, and
    /// realized partitions.
    ///
    /// Combined invested capital sums every ledger row; the per-partition
    /// figures only count positions whose key actually produced a series,
    /// matching what the value sums can see.
    fn overview(
        &self,
        ledger: &[Position],
        realized_keys: &[&str],
        unrealized_keys: &[&str],
        series: &HashMap<String, Vec<PricePoint>>,
    ) -> Overview {
        let by_key: HashMap<&str, &Position> =
            ledger.iter().map(|p| (p.key.as_str(), p)).collect();

        let partition = |keys: &[&str]| -> PartitionMetrics {
            let mut invested = 0.0;
            let mut value = 0.0;
            for key in keys {
                if let Some(position) = by_key.get(*key) {
                    invested += position.invested();
                }
                if let Some(latest) = series.get(*key).and_then(|points| points.last()) {
                    value += latest.market_value;
                }
            }
            Self::metrics(invested, value)
        };

        let combined_invested: f64 = ledger.iter().map(Position::invested).sum();
        let combined_value: f64 = series
            .values()
            .filter_map(|points| points.last())
            .map(|p| p.market_value)
            .sum();

        Overview {
            combined: Self::metrics(combined_invested, combined_value),
            unrealized: partition(unrealized_keys),
            realized: partition(realized_keys),
        }
    }

    fn metrics(invested: f64, value: f64) -> PartitionMetrics {
        let return_pct = if invested > 0.0 {
            (value / invested - 1.0) * 100.0
        } else {
            0.0
        };
        PartitionMetrics {
            total_invested: invested,
            current_value: value,
            delta: value - invested,
            return_pct,
        }
    }

    /// Gainers (positive cumulative return, descending) and losers
    /// (negative, ascending) from each key's latest point. Flat positions
    /// appear in neither list.
    fn rankings(
        &self,
        by_key: &HashMap<&str, &Position>,
        series: &HashMap<String, Vec<PricePoint>>,
        filters: &Filters,
    ) -> (Vec<RankedPosition>, Vec<RankedPosition>) {
        let mut gainers = Vec::new();
        let mut losers = Vec::new();

        for (key, points) in series {
            let Some(position) = by_key.get(key.as_str()) else {
                continue;
            };
            let Some(latest) = points.last() else {
                continue;
            };
            let entry = RankedPosition {
                key: key.clone(),
                return_pct: latest.return_pct,
                market_value: latest.market_value,
                gain: latest.market_value - position.invested(),
            };
            if latest.return_pct > 0.0 {
                gainers.push(entry);
            } else if latest.return_pct < 0.0 {
                losers.push(entry);
            }
        }

        gainers.sort_by(|a, b| {
            b.return_pct
                .partial_cmp(&a.return_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        losers.sort_by(|a, b| {
            a.return_pct
                .partial_cmp(&b.return_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        filters.top_gainers.apply(&mut gainers);
        filters.top_losers.apply(&mut losers);
        (gainers, losers)
    }

    /// Aggregate market value per calendar date, pseudo points excluded
    /// (their capital isn't reflected in real price history yet and would
    /// double count). Restricted to the filter window, scaled to thousands.
    fn growth_curve(
        &self,
        series: &HashMap<String, Vec<PricePoint>>,
        filters: &Filters,
    ) -> Vec<GrowthPoint> {
        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for points in series.values() {
            for point in points {
                if point.pseudo {
                    continue;
                }
                *by_date.entry(point.date).or_insert(0.0) += point.market_value;
            }
        }

        by_date
            .into_iter()
            .filter(|(date, _)| {
                filters.from.is_none_or(|from| *date >= from)
                    && filters.to.is_none_or(|to| *date <= to)
            })
            .map(|(date, mv)| GrowthPoint {
                date,
                market_value_k: mv / 1000.0,
            })
            .collect()
    }

    /// Per-position series and latest-point summaries for the selected
    /// keys, with the series restricted to the filter date window.
    fn drill_down(
        &self,
        series: &HashMap<String, Vec<PricePoint>>,
        filters: &Filters,
    ) -> DrillDown {
        let selected = |key: &str| -> bool {
            filters
                .keys
                .as_ref()
                .is_none_or(|keys| keys.iter().any(|k| k == key))
        };

        let mut windowed: HashMap<String, Vec<PricePoint>> = HashMap::new();
        let mut summaries = Vec::new();

        for (key, points) in series {
            if !selected(key) {
                continue;
            }
            if let Some(latest) = points.last() {
                summaries.push(PositionPerformance {
                    key: key.clone(),
                    market_value: latest.market_value,
                    return_pct: latest.return_pct,
                });
            }
            let filtered: Vec<PricePoint> = points
                .iter()
                .filter(|p| {
                    filters.from.is_none_or(|from| p.date >= from)
                        && filters.to.is_none_or(|to| p.date <= to)
                })
                .cloned()
                .collect();
            windowed.insert(key.clone(), filtered);
        }

        summaries.sort_by(|a, b| a.key.cmp(&b.key));

        DrillDown {
            series: windowed,
            summaries,
        }
    }
}

impl Default for PortfolioAggregator {
    fn default() -> Self {
        Self::new()
    }
}
