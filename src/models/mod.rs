pub mod cache;
pub mod plan;
pub mod requests;
pub mod weather;
