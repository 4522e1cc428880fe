pub mod app;
pub mod caption;
pub mod chart;
pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod marker;
pub mod parser;
pub mod services;
pub mod week;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
