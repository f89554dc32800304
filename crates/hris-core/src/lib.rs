//! Core types, engines and trait definitions for the HRIS.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! data store and the identity provider are reached only through the
//! [`store::HrStore`] and [`session::AuthProvider`] traits; everything else
//! (the API server, the SQLite backend, the terminal client) depends on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod attendance;
pub mod clock;
pub mod dashboard;
pub mod directory;
pub mod error;
pub mod identity;
pub mod leave;
pub mod role;
pub mod service;
pub mod session;
pub mod store;

mod remote;

pub use error::{Error, ErrorKind, Result};
pub use service::{Hris, HrisConfig};
