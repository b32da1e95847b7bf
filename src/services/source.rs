//! Raw-text collaborators: local files and remote fetches.

use crate::core::{ConnectionParams, InputError, TransportError};
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::debug;

/// Read a local file after checking that it exists and is non-empty.
pub fn read_local_text(path: &Path) -> Result<String, InputError> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(InputError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(InputError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if meta.len() == 0 {
        return Err(InputError::EmptyFile(path.to_path_buf()));
    }
    debug!(path = %path.display(), bytes = meta.len(), "reading local file");
    std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Anything that can fetch the text of a remote file.
///
/// Implementations own their connection lifecycle and must release it on
/// every exit path before returning.
pub trait RemoteSource: Send + Sync {
    fn fetch_remote_text(&self, params: &ConnectionParams, path: &str) -> Result<String, TransportError>;
}

/// Run a remote fetch on a worker thread so an interactive caller is not
/// blocked. Join the handle to receive the final text or error.
pub fn fetch_in_background(
    source: Arc<dyn RemoteSource>,
    params: ConnectionParams,
    path: String,
) -> JoinHandle<Result<String, TransportError>> {
    std::thread::spawn(move || source.fetch_remote_text(&params, &path))
}
