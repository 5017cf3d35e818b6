pub mod breakeven;
pub mod curve;
pub mod decay;
pub mod settlement;

pub use curve::{generate_curve, partition, ChartPoint, PartitionedCurve, PayoffCurve};
pub use settlement::{exercise_return, sell_return};
