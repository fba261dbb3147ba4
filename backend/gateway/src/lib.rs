//! specscan HTTP gateway
//!
//! Accepts product images, relays them to the inference service, records the
//! result and answers the caller.

pub mod config;
pub mod error;
pub mod health;
pub mod intake;
pub mod pipeline;
pub mod server;

#[cfg(test)]
mod test_support;

pub use config::GatewayConfig;
pub use error::ApiError;
pub use pipeline::SpecPipeline;
pub use server::{build_router, start_server, GatewayState};
