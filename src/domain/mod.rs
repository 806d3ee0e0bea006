pub mod errors;
pub mod form;
pub mod order;
pub mod ports;
pub mod pricing;
pub mod tier;
