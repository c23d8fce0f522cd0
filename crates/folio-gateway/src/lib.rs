//! HTTP request surface: document upload, grounded queries, notes and
//! summaries, health.

mod error;
mod handlers;
mod router;
mod server;

pub use error::GatewayError;
pub use server::GatewayServer;
