// Library module to expose code for integration tests

pub mod analytics;
pub mod dataset;
pub mod models;
pub mod parser;
pub mod synth;
pub mod traffic;
pub mod user_agent;
pub mod volume;

#[cfg(test)]
mod integration_tests;
