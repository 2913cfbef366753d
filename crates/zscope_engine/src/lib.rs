//! # zscope engine
//!
//! Capability traits for the object-database engine underneath zscope.
//!
//! zscope itself is lifecycle glue: it resolves storage URIs, scopes
//! database and connection lifetimes, and decides when to commit. All real
//! work - storage I/O, transaction semantics, the wire protocol to a remote
//! storage server - belongs to an engine. This crate defines the minimal
//! surface such an engine must provide:
//!
//! - [`Engine`] - opens storages (file-backed or client/server) and wraps
//!   them in databases
//! - [`Database`] - opens connections, optionally bound to an explicit
//!   transaction manager
//! - [`Connection`] - yields the root container and a transaction manager
//! - [`Root`] - the top-level persistent mapping
//! - [`TransactionManager`] - commit/abort boundaries
//!
//! ## Reference engine
//!
//! [`MemoryEngine`] implements the whole surface in process memory. It
//! emulates persistence with a per-engine registry keyed by storage
//! location, which is enough to exercise every lifecycle path without a
//! real database:
//!
//! ```rust
//! use zscope_engine::{Engine, Database, Connection, Root, TransactionManager};
//! use zscope_engine::{MemoryEngine, Options};
//!
//! let engine = MemoryEngine::new();
//! let storage = engine.open_file_storage("/tmp/app.fs").unwrap();
//! let db = engine.open_database(storage, Options::default()).unwrap();
//!
//! let cx = db.open().unwrap();
//! cx.root().unwrap().put("greeting", b"hello".to_vec()).unwrap();
//! cx.transaction_manager().commit().unwrap();
//! cx.close().unwrap();
//! db.close().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod database;
mod engine;
mod error;
mod memory;
mod options;
mod root;
mod txn;

pub use connection::Connection;
pub use database::Database;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use memory::{
    MemoryConnection, MemoryDatabase, MemoryEngine, MemoryRoot, MemoryStorage,
    MemoryTransactionManager,
};
pub use options::Options;
pub use root::Root;
pub use txn::TransactionManager;
