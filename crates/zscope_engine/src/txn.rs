//! Transaction manager trait definition.

use crate::error::EngineResult;

/// Commit/abort coordinator for one or more connections.
///
/// Managers are cheap handles: cloning yields another handle to the same
/// underlying manager, so a single manager can be created up front and
/// shared by several connections (the multi-threaded usage pattern).
/// Committing such a manager covers the pending work of every connection
/// joined to it.
///
/// The session layer only ever decides *whether* and *when* to call
/// [`commit`] or [`abort`]; what a commit means is the engine's.
///
/// [`commit`]: TransactionManager::commit
/// [`abort`]: TransactionManager::abort
pub trait TransactionManager: Clone + Send + Sync {
    /// Commits pending work on every joined connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses the commit, e.g. a write
    /// conflict. No retry happens below the caller.
    fn commit(&self) -> EngineResult<()>;

    /// Discards pending work on every joined connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine fails to roll the state back.
    fn abort(&self) -> EngineResult<()>;
}
