pub mod api;
pub mod config;
pub mod errors;
pub mod upsert;

#[cfg(test)]
mod testutils;
