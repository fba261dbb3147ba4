//! Client for the external inference service that turns a product image into
//! a structured specification.

pub mod client;
pub mod config;
pub mod error;

pub use client::HttpInferenceClient;
pub use config::InferenceConfig;
pub use error::InferenceError;
