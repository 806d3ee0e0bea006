#[cfg(test)]
pub mod memory;
pub mod models;
pub mod order_form_repo;
