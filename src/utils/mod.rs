pub mod datetime;
pub mod phrases;
pub mod units;
