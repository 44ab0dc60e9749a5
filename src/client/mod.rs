//! Editor-side language-client session for the spawned server process.
//!
//! # Modules
//!
//! - [`session`]: process lifecycle and the LSP initialize/shutdown sequence
//! - [`transport`]: Content-Length framed JSON-RPC over the server's stdio

pub mod session;
pub mod transport;

pub use session::{DOCUMENT_LANGUAGE_ID, LanguageClientSession, SessionConfig};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to start language server: {0}")]
    Spawn(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;
