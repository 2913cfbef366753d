//! Engine trait definition.

use crate::database::Database;
use crate::error::EngineResult;
use crate::options::Options;

/// An object-database engine.
///
/// Engines own everything hard: storage formats, transaction semantics,
/// caching, and any network protocol to a remote storage server. The
/// session layer only sequences acquisition and release through this
/// surface.
///
/// # Invariants
///
/// - A storage handle is consumed by exactly one [`open_database`] call;
///   storages are never shared across databases
/// - Open failures are fail-fast; retries and timeouts are an engine
///   concern, not a caller concern
///
/// # Implementors
///
/// - [`crate::MemoryEngine`] - in-process reference engine for tests and
///   ephemeral data
///
/// [`open_database`]: Engine::open_database
pub trait Engine {
    /// Opaque handle to an open storage backend.
    type Storage;

    /// Database handle type produced by this engine.
    type Database: Database;

    /// Opens a file-backed storage at `path`.
    ///
    /// The path is passed through byte-identical, with no normalization;
    /// interpretation is the engine's.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be opened (missing file,
    /// lock held elsewhere, bad permissions).
    fn open_file_storage(&self, path: &str) -> EngineResult<Self::Storage>;

    /// Opens a client storage connected to a remote server at
    /// `host`:`port`.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable.
    fn open_client_storage(&self, host: &str, port: u16) -> EngineResult<Self::Storage>;

    /// Wraps an open storage in a database handle.
    ///
    /// `options` is caller configuration forwarded verbatim by the session
    /// layer; the engine decides what each field means and may ignore any
    /// of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be constructed over the
    /// storage.
    fn open_database(&self, storage: Self::Storage, options: Options)
        -> EngineResult<Self::Database>;
}
