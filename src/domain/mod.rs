pub mod aggregation;
pub mod errors;
