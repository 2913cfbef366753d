//! Database trait definition.

use crate::connection::Connection;
use crate::error::EngineResult;
use crate::txn::TransactionManager;

/// An open database over exactly one storage.
///
/// A database may serve many connections over its lifetime. Thread-safety
/// of concurrent opens is the engine's documented business; this trait
/// imposes no synchronization of its own.
pub trait Database {
    /// Connection handle type produced by this database.
    type Connection: Connection<TransactionManager = Self::TransactionManager>;

    /// Transaction manager type used by this database's connections.
    type TransactionManager: TransactionManager;

    /// Opens a connection using a default transaction manager.
    ///
    /// When no explicit manager is supplied, the engine creates one owned
    /// by the new connection; it is reachable afterwards through
    /// [`Connection::transaction_manager`]. There is no hidden process-wide
    /// manager.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DatabaseClosed`] if the database has been
    /// closed, or any engine failure opening the session.
    ///
    /// [`Connection::transaction_manager`]: crate::Connection::transaction_manager
    /// [`EngineError::DatabaseClosed`]: crate::EngineError::DatabaseClosed
    fn open(&self) -> EngineResult<Self::Connection>;

    /// Opens a connection bound to an explicit transaction manager.
    ///
    /// The connection joins `manager`; a later commit or abort on that
    /// manager covers this connection's pending work, along with any other
    /// connection that joined it.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`open`](Database::open).
    fn open_with(&self, manager: &Self::TransactionManager) -> EngineResult<Self::Connection>;

    /// Closes the database and the storage it owns.
    ///
    /// Closing an already-closed database is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing the underlying storage fails.
    fn close(&self) -> EngineResult<()>;
}
