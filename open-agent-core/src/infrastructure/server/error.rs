use std::net::SocketAddr;
use thiserror::Error;

/// Failures of the REST front-end itself; per-request errors become HTTP responses instead.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("REST server on {addr} stopped unexpectedly: {source}")]
    Serve {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

impl ServerError {
    pub fn addr(&self) -> SocketAddr {
        match self {
            ServerError::Bind { addr, .. } | ServerError::Serve { addr, .. } => *addr,
        }
    }
}
