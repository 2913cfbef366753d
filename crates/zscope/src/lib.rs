//! # zscope
//!
//! Scoped sessions for object databases: resolve a storage URI, hold a
//! database for exactly as long as a scope runs, and commit or abort on
//! the way out.
//!
//! The crate is deliberately thin. Storage formats, transaction
//! semantics, caching, and any wire protocol belong to an engine
//! implementing the [`zscope_engine`] capability traits; zscope only
//! sequences acquisition, release, and transaction boundaries - and does
//! that the same way on every exit path.
//!
//! ## URIs
//!
//! ```text
//! file:///var/db/app.fs      file-backed storage
//! zeo://localhost:8100       client storage to a remote server
//! /var/db/app.fs             bare path, treated as file-backed
//! ```
//!
//! ## Scoped usage
//!
//! ```rust
//! use zscope::{with_database, with_connection_options, ConnectionOptions, Root};
//! use zscope_engine::MemoryEngine;
//!
//! let engine = MemoryEngine::new();
//! with_database(&engine, "file:///var/db/app.fs", |db| {
//!     with_connection_options(
//!         db,
//!         ConnectionOptions::new().auto_commit(true),
//!         |_cx, root| {
//!             root.put("motd", b"welcome".to_vec())?;
//!             Ok(())
//!         },
//!     )
//! })
//! .unwrap();
//!
//! // Both scopes have exited: the connection closed before the database,
//! // and the write was committed on the way out.
//! ```
//!
//! Without `auto_commit`, the default policy is auto-abort: the scope
//! never commits, and closing the connection discards pending work.
//!
//! ## Manual lifetimes
//!
//! [`database`] and [`connection`] open handles without scope management
//! for callers that keep them alive themselves - a process-lifetime pooled
//! database in a single-threaded program, or per-thread connections whose
//! transaction boundaries run through a shared
//! [`TransactionManager`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod database;
mod error;
mod typed;
mod uri;

pub use connection::{
    connection, with_connection, with_connection_options, ConnectionOptions, ErrorPolicy,
};
pub use database::{database, with_database, with_database_options};
pub use error::{SessionError, SessionResult};
pub use typed::RootExt;
pub use uri::{resolve, StorageLocation};

// Engine surface, re-exported so most callers need only this crate.
pub use zscope_engine::{
    Connection, Database, Engine, EngineError, EngineResult, Options, Root, TransactionManager,
};
