pub mod app_state;
pub mod config;
pub mod constants;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod store;

#[cfg(test)]
pub mod test_utils;
