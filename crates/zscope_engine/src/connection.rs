//! Connection trait definition.

use crate::error::EngineResult;
use crate::root::Root;
use crate::txn::TransactionManager;

/// A session-scoped connection obtained from a database.
///
/// A connection must not outlive the database that opened it. The session
/// layer enforces this with scopes; manual callers carry the obligation
/// themselves.
pub trait Connection {
    /// Root container type exposed by this connection.
    type Root: Root;

    /// Transaction manager type bound to this connection.
    type TransactionManager: TransactionManager;

    /// Returns the root container, the entry point to all persisted state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ConnectionClosed`] if the connection has been
    /// closed.
    ///
    /// [`EngineError::ConnectionClosed`]: crate::EngineError::ConnectionClosed
    fn root(&self) -> EngineResult<Self::Root>;

    /// Returns a handle to the transaction manager this connection is
    /// bound to - the explicit one it was opened with, or its own default.
    fn transaction_manager(&self) -> Self::TransactionManager;

    /// Closes the connection.
    ///
    /// Pending uncommitted work is discarded (abort-on-close). Closing an
    /// already-closed connection is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if releasing the session fails.
    fn close(&self) -> EngineResult<()>;
}
