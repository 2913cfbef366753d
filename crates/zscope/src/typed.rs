//! Typed access to root container values.

use crate::error::{SessionError, SessionResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use zscope_engine::Root;

/// Typed CBOR access over any [`Root`].
///
/// The root container stores opaque bytes; this extension encodes and
/// decodes them as CBOR so callers can persist plain serde types:
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use zscope::RootExt;
/// use zscope_engine::{Connection, Database, Engine, MemoryEngine, Options};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Counter {
///     hits: u64,
/// }
///
/// let engine = MemoryEngine::new();
/// let storage = engine.open_file_storage("app.fs").unwrap();
/// let db = engine.open_database(storage, Options::default()).unwrap();
/// let cx = db.open().unwrap();
/// let root = cx.root().unwrap();
///
/// root.put_as("counter", &Counter { hits: 3 }).unwrap();
/// let counter: Option<Counter> = root.get_as("counter").unwrap();
/// assert_eq!(counter, Some(Counter { hits: 3 }));
/// ```
///
/// Blanket-implemented for every `Root`.
pub trait RootExt: Root {
    /// Reads and decodes the value at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Codec`] if stored bytes fail to decode as
    /// `T`, or any engine failure reading the key.
    fn get_as<T: DeserializeOwned>(&self, key: &str) -> SessionResult<Option<T>> {
        match self.get(key)? {
            Some(bytes) => {
                let value = ciborium::from_reader(bytes.as_slice())
                    .map_err(|err| SessionError::codec(err.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Encodes `value` and stores it at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Codec`] if `value` fails to encode, or any
    /// engine failure writing the key.
    fn put_as<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> SessionResult<()> {
        let mut bytes = Vec::new();
        ciborium::into_writer(value, &mut bytes)
            .map_err(|err| SessionError::codec(err.to_string()))?;
        self.put(key, bytes)?;
        Ok(())
    }
}

impl<R: Root + ?Sized> RootExt for R {}
