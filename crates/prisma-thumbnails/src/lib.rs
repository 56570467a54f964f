pub mod caption;
pub mod generator;
pub mod sheet;
