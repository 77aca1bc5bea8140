//! Odometer ledger aggregate

pub mod model;
pub mod repository;

pub use model::{
    check_timeline, OdometerOrder, OdometerProjection, OdometerReading, OdometerStats,
    ReadingHistory, ReadingSource,
};
pub use repository::OdometerRepository;
