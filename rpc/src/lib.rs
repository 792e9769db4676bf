//! HTTP API for the Plenum voting system.
//!
//! A thin axum layer over [`plenum_server::PlenumService`]: JSON DTOs in,
//! JSON DTOs out, with eligibility and lifecycle rejections surfaced as
//! specific, human-readable reasons on the matching HTTP status.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{router, serve};
