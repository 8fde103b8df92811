//! # cantina-remote: Remote Store Client
//!
//! JSON-over-HTTP client for the remote source of truth (the shared server
//! every cafeteria client syncs against). The local store is a cache; this
//! crate is the only path to the authoritative one.
//!
//! ## Responsibilities
//! - Connectivity probe (`GET /ping`)
//! - Catalog and workday pulls
//! - Synchronous workday open/close (the distributed lock handshake)
//! - Verbatim replay of queued payloads (`post_raw`)
//!
//! Policy lives in the callers: this crate classifies failures (transport
//! vs. server vs. conflict vs. not-found) and nothing more.

pub mod client;
pub mod error;

pub use client::{RemoteClient, RemoteProduct, RemoteWorkday};
pub use error::{RemoteError, RemoteResult};
