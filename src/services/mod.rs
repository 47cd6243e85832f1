pub mod monitor;
pub mod resolution;
