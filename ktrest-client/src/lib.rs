//! # KtRest Sync Client
//!
//! Purpose: Provide a small, blocking client for the RESTful interface of a
//! Kyoto Tycoon server, mapping set/get/remove onto PUT/GET/DELETE.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `KtClient` hides the HTTP transport and path encoding.
//! 2. **Status as Outcome**: Expected misses come back as `false`/`None`;
//!    only transport failures are errors.
//! 3. **Binary-Safe**: Keys and values are raw bytes; text is sent as UTF-8.
//! 4. **Explicit Lifetime**: The connection is released on `close` or drop.

mod client;
mod expire;
mod path;

pub use client::{ClientConfig, ClientError, ClientResult, KtClient, Record, RecordInfo, SetMode};
