pub mod types;
pub mod yahoo;
