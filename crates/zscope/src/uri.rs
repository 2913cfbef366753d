//! Storage URI parsing and resolution.

use crate::error::{SessionError, SessionResult};
use std::fmt;
use tracing::debug;
use zscope_engine::Engine;

const FILE_SCHEME: &str = "file://";
const ZEO_SCHEME: &str = "zeo://";

/// A parsed storage location.
///
/// Three URI shapes are recognized:
///
/// ```text
/// file:///var/db/app.fs      file-backed storage at a path
/// zeo://localhost:8100       client storage to a remote server
/// /var/db/app.fs             bare path, treated as file-backed
/// ```
///
/// The bare-path fallback exists for compatibility with paths that happen
/// to omit a scheme, including Windows drive paths like
/// `e:/workspaces/zeo/bots.fs` (which would otherwise be mistaken for a
/// scheme). Paths are carried byte-identical; no normalization happens
/// here or in the engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// File-backed storage at a filesystem path.
    File(String),
    /// Client storage connecting to a remote server.
    Zeo {
        /// Server host name or address.
        host: String,
        /// Server TCP port.
        port: u16,
    },
}

impl StorageLocation {
    /// Parses a connection URI.
    ///
    /// Dispatch order, first match wins: `file://` prefix, `zeo://`
    /// prefix, bare-path fallback.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MalformedUri`] for a `zeo://` URI whose
    /// remainder does not split on the first `:` into a non-empty host and
    /// a numeric port.
    pub fn parse(uri: &str) -> SessionResult<Self> {
        if let Some(path) = uri.strip_prefix(FILE_SCHEME) {
            return Ok(Self::File(path.to_string()));
        }
        if let Some(rest) = uri.strip_prefix(ZEO_SCHEME) {
            let Some((host, port)) = rest.split_once(':') else {
                return Err(SessionError::malformed_uri(
                    uri,
                    "expected `host:port` after `zeo://`",
                ));
            };
            if host.is_empty() {
                return Err(SessionError::malformed_uri(uri, "empty host"));
            }
            if port.is_empty() {
                return Err(SessionError::malformed_uri(uri, "empty port"));
            }
            let port = port.parse::<u16>().map_err(|_| {
                SessionError::malformed_uri(uri, format!("invalid port `{port}`"))
            })?;
            return Ok(Self::Zeo {
                host: host.to_string(),
                port,
            });
        }
        Ok(Self::File(uri.to_string()))
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{FILE_SCHEME}{path}"),
            Self::Zeo { host, port } => write!(f, "{ZEO_SCHEME}{host}:{port}"),
        }
    }
}

/// Resolves a connection URI to an open storage handle.
///
/// Parses `uri` and asks the engine for the matching backend. Open
/// failures are fail-fast: no retries and no timeout handling here.
///
/// # Errors
///
/// Returns [`SessionError::MalformedUri`] for an invalid `zeo://` URI, or
/// [`SessionError::StorageUnavailable`] when the engine cannot open the
/// backend.
pub fn resolve<E: Engine>(engine: &E, uri: &str) -> SessionResult<E::Storage> {
    let location = StorageLocation::parse(uri)?;
    debug!(%location, "resolving storage");
    match &location {
        StorageLocation::File(path) => engine.open_file_storage(path),
        StorageLocation::Zeo { host, port } => engine.open_client_storage(host, *port),
    }
    .map_err(SessionError::StorageUnavailable)
}
