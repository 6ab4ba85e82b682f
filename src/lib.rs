pub mod app;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod feed;
pub mod fleet;
pub mod http;
pub mod metrics;
pub mod proxy;
pub mod readiness;
pub mod service;
pub mod upstream;
