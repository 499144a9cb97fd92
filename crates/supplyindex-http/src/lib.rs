//! HTTP query surface for the supply engine.
//!
//! Endpoints:
//! - `GET /supply/total?format=plaintext|json`
//! - `GET /supply/circulating?format=plaintext|json`
//! - `GET /utils/estimatefee?nbBlocks=2,4,6`
//! - `GET /health`
//!
//! Supply reads go straight to the shared
//! [`supplyindex_core::SupplyLedger`]; they never touch the scan pipeline
//! and never fail because a scan pass failed — they simply serve the last
//! committed totals. Fee estimates query the chain source directly.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use handlers::ApiState;
pub use server::{router, serve};
