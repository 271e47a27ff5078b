// src/stats/mod.rs
// Statistics over finalized hands: opportunity analysis and aggregation

pub mod calculator;
pub mod opportunities;

pub use calculator::{calculate, MetricCounter, MetricId, PositionStats, RangeActionBucket, Stats};
pub use opportunities::{analyze, Opportunities};
