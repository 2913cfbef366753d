//! Scoped connection acquisition and exit policy.

use crate::error::{SessionError, SessionResult};
use tracing::{debug, error};
use zscope_engine::{Connection, Database, TransactionManager};

/// What a committing connection scope does when its body fails.
///
/// Only consulted when [`ConnectionOptions::auto_commit`] is on; a scope
/// that never commits leaves pending work to the engine's abort-on-close
/// semantics regardless of how the body exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Abort pending work so the failure propagates over a clean
    /// transaction.
    #[default]
    Abort,

    /// Commit whatever the body managed to do before failing.
    ///
    /// This reproduces the historical commit-on-every-exit behavior of
    /// connection context managers; the partially-applied state it can
    /// persist is the caller's responsibility.
    Commit,
}

/// Options for a connection scope.
///
/// `TM` is the engine's transaction manager type; supply one to bind the
/// connection to an explicit manager shared with other connections.
///
/// # Example
///
/// ```rust
/// use zscope::{ConnectionOptions, ErrorPolicy};
/// use zscope_engine::MemoryTransactionManager;
///
/// let manager = MemoryTransactionManager::new();
/// let options = ConnectionOptions::new()
///     .auto_commit(true)
///     .on_error(ErrorPolicy::Abort)
///     .transaction_manager(manager);
/// # let _ = options;
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionOptions<TM> {
    auto_commit: bool,
    on_error: ErrorPolicy,
    transaction_manager: Option<TM>,
}

impl<TM> Default for ConnectionOptions<TM> {
    fn default() -> Self {
        Self {
            auto_commit: false,
            on_error: ErrorPolicy::Abort,
            transaction_manager: None,
        }
    }
}

impl<TM> ConnectionOptions<TM> {
    /// Creates options with defaults: auto-abort, no explicit manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the scope commits on clean exit.
    #[must_use]
    pub fn auto_commit(mut self, value: bool) -> Self {
        self.auto_commit = value;
        self
    }

    /// Sets the policy applied when the body fails in a committing scope.
    #[must_use]
    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.on_error = policy;
        self
    }

    /// Binds the connection to an explicit transaction manager.
    ///
    /// Without one, the connection uses its own default manager; see
    /// [`Database::open`].
    #[must_use]
    pub fn transaction_manager(mut self, manager: TM) -> Self {
        self.transaction_manager = Some(manager);
        self
    }
}

/// Opens a connection and its root; the caller owns both.
///
/// Convenience for multi-threaded callers that manage connection lifetime
/// and transaction boundaries themselves, typically through an explicit
/// shared manager. The connection uses its own default transaction
/// manager; pending work is discarded if the connection is closed without
/// a commit.
///
/// # Errors
///
/// Returns any engine failure opening the connection or fetching the
/// root.
pub fn connection<D: Database>(
    db: &D,
) -> SessionResult<(D::Connection, <D::Connection as Connection>::Root)> {
    let cx = db.open()?;
    let root = cx.root()?;
    Ok((cx, root))
}

/// Runs `body` with a live connection and root, closing the connection on
/// every exit path. Auto-abort defaults.
///
/// Equivalent to [`with_connection_options`] with default
/// [`ConnectionOptions`]: no commit ever happens, so pending work is
/// discarded when the connection closes.
///
/// # Errors
///
/// See [`with_connection_options`].
pub fn with_connection<D, T, F>(db: &D, body: F) -> SessionResult<T>
where
    D: Database,
    F: FnOnce(&D::Connection, &<D::Connection as Connection>::Root) -> SessionResult<T>,
{
    with_connection_options(db, ConnectionOptions::default(), body)
}

/// Runs `body` with a live connection and root under explicit options,
/// closing the connection on every exit path.
///
/// Scope entry opens the connection - bound to the explicit transaction
/// manager if one was supplied, else to the connection's own default -
/// and fetches the root. Scope exit then runs unconditionally, in order:
///
/// 1. If the body succeeded and `auto_commit` is on, commit. A commit
///    failure becomes [`SessionError::CommitFailed`]; the close below
///    still runs.
/// 2. If the body failed and `auto_commit` is on, apply the
///    [`ErrorPolicy`]: abort (default) or commit. Failures of this step
///    are logged, never allowed to replace the body's failure.
/// 3. Close the connection. A close failure after an earlier failure is
///    logged; on an otherwise clean exit it becomes
///    [`SessionError::CloseFailed`].
///
/// The body's failure, if any, always propagates.
///
/// # Errors
///
/// - whatever `body` returns
/// - [`SessionError::CommitFailed`] when a clean-exit commit is refused
/// - [`SessionError::CloseFailed`] when only the close failed
pub fn with_connection_options<D, T, F>(
    db: &D,
    options: ConnectionOptions<D::TransactionManager>,
    body: F,
) -> SessionResult<T>
where
    D: Database,
    F: FnOnce(&D::Connection, &<D::Connection as Connection>::Root) -> SessionResult<T>,
{
    let cx = match &options.transaction_manager {
        Some(manager) => db.open_with(manager),
        None => db.open(),
    }?;
    debug!(auto_commit = options.auto_commit, "connection opened");

    let root = match cx.root() {
        Ok(root) => root,
        Err(err) => {
            if let Err(close_err) = cx.close() {
                error!(error = %close_err, "connection close failed while unwinding");
            }
            return Err(err.into());
        }
    };

    let result = body(&cx, &root);

    let manager = cx.transaction_manager();
    let exit = match &result {
        Ok(_) if options.auto_commit => manager.commit().map_err(SessionError::CommitFailed),
        Ok(_) => Ok(()),
        Err(_) => {
            if options.auto_commit {
                match options.on_error {
                    ErrorPolicy::Abort => {
                        if let Err(abort_err) = manager.abort() {
                            error!(error = %abort_err, "abort failed while unwinding");
                        }
                    }
                    ErrorPolicy::Commit => {
                        if let Err(commit_err) = manager.commit() {
                            error!(error = %commit_err, "commit failed while unwinding");
                        }
                    }
                }
            }
            Ok(())
        }
    };

    let closed = cx.close();
    debug!("connection closed");

    match (result, exit, closed) {
        (Ok(value), Ok(()), Ok(())) => Ok(value),
        (Ok(_), Err(commit_err), closed) => {
            if let Err(close_err) = closed {
                error!(error = %close_err, "connection close failed while unwinding");
            }
            Err(commit_err)
        }
        (Ok(_), Ok(()), Err(close_err)) => Err(SessionError::CloseFailed(close_err)),
        (Err(err), _, closed) => {
            if let Err(close_err) = closed {
                error!(error = %close_err, "connection close failed while unwinding");
            }
            Err(err)
        }
    }
}
