//! SFTP-backed [`RemoteSource`] built on libssh2.

use crate::core::{ConnectionParams, TransportError};
use crate::services::source::RemoteSource;
use ssh2::{ErrorCode, Session};
use std::io::Read;
use std::net::TcpStream;
use std::path::Path;
use tracing::{debug, error};

// SSH_FX_NO_SUCH_FILE
const SFTP_NO_SUCH_FILE: i32 = 2;

/// Fetches files over SFTP with password authentication.
#[derive(Debug, Default, Clone, Copy)]
pub struct SftpSource;

impl SftpSource {
    fn connect(&self, params: &ConnectionParams) -> Result<Session, TransportError> {
        let connection_error = |message: String| TransportError::Connection {
            host: params.hostname.clone(),
            port: params.port,
            message,
        };
        let tcp = TcpStream::connect((params.hostname.as_str(), params.port))
            .map_err(|e| connection_error(e.to_string()))?;
        let mut session = Session::new().map_err(|e| connection_error(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session
            .handshake()
            .map_err(|e| connection_error(e.to_string()))?;
        if session
            .userauth_password(&params.username, &params.password)
            .is_err()
            || !session.authenticated()
        {
            let _ = session.disconnect(None, "authentication failed", None);
            return Err(TransportError::Authentication {
                user: params.username.clone(),
                host: params.hostname.clone(),
            });
        }
        Ok(session)
    }

    fn read(session: &Session, path: &str) -> Result<String, TransportError> {
        let sftp = session
            .sftp()
            .map_err(|e| TransportError::Transport(e.to_string()))?;
        let mut file = sftp.open(Path::new(path)).map_err(|e| match e.code() {
            ErrorCode::SFTP(SFTP_NO_SUCH_FILE) => TransportError::RemoteNotFound(path.to_string()),
            _ => TransportError::Transport(e.to_string()),
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| TransportError::Transport(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| TransportError::Transport(e.to_string()))
    }
}

impl RemoteSource for SftpSource {
    fn fetch_remote_text(&self, params: &ConnectionParams, path: &str) -> Result<String, TransportError> {
        debug!(host = %params.hostname, port = params.port, path, "fetching remote file");
        let session = self.connect(params)?;
        let result = Self::read(&session, path);
        if let Err(e) = session.disconnect(None, "done", None) {
            error!("Failed to close SSH session: {e}");
        }
        result
    }
}
