pub mod check;
pub mod config;
pub mod results;
pub mod templates;
