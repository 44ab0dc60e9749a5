//! Lifecycle of the spawned language server process.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use lsp_types::{
    ClientCapabilities, ClientInfo, DocumentFilter, InitializeParams, InitializeResult,
    InitializedParams,
};
use serde_json::{Value, json};
use tokio::io::BufReader;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use super::transport::{read_message, write_message};
use super::{Result, SessionError};

/// Document language identifier this client is scoped to.
pub const DOCUMENT_LANGUAGE_ID: &str = "asn1";

/// How long to wait for the server to acknowledge a shutdown request.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Executable specification plus the document scope for the session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub command: PathBuf,
    pub args: Vec<String>,
    pub language_id: String,
}

impl SessionConfig {
    /// Config for a bare command path with no arguments, scoped to ASN.1
    /// documents.
    pub fn for_command(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            language_id: DOCUMENT_LANGUAGE_ID.to_string(),
        }
    }
}

/// Owns the spawned server process and the protocol channel.
///
/// Created on activation, torn down on deactivation; the bootstrapper is the
/// sole owner. Requests are strictly sequential with a single request in
/// flight, matching the sequential activation model.
pub struct LanguageClientSession {
    config: SessionConfig,
    process: Option<Child>,
    stdin: Option<ChildStdin>,
    reader: Option<BufReader<ChildStdout>>,
    next_request_id: u64,
    initialized: bool,
}

impl LanguageClientSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            process: None,
            stdin: None,
            reader: None,
            next_request_id: 1,
            initialized: false,
        }
    }

    /// Document selector the session is bound to.
    pub fn document_selector(&self) -> Vec<DocumentFilter> {
        vec![DocumentFilter {
            language: Some(self.config.language_id.clone()),
            scheme: None,
            pattern: None,
        }]
    }

    /// Spawn the server process with piped stdio.
    pub async fn start(&mut self) -> Result<()> {
        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                SessionError::Spawn(format!("failed to spawn {:?}: {e}", self.config.command))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SessionError::Spawn("missing stdin pipe".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SessionError::Spawn("missing stdout pipe".to_string()))?;

        self.stdin = Some(stdin);
        self.reader = Some(BufReader::new(stdout));
        self.process = Some(child);

        info!("started language server {:?}", self.config.command);
        Ok(())
    }

    /// Run the LSP initialize handshake.
    pub async fn initialize(&mut self) -> Result<()> {
        let params = InitializeParams {
            process_id: Some(std::process::id()),
            client_info: Some(ClientInfo {
                name: "asn1-lsp-client".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            capabilities: ClientCapabilities::default(),
            ..Default::default()
        };

        let result = self
            .request("initialize", serde_json::to_value(params)?)
            .await?;
        let result: InitializeResult = serde_json::from_value(result)?;
        debug!(
            "server initialized: {:?}",
            result.server_info.map(|info| info.name)
        );

        self.notify("initialized", serde_json::to_value(InitializedParams {})?)
            .await?;
        self.initialized = true;
        Ok(())
    }

    /// Block until the server process exits.
    pub async fn wait(&mut self) -> Result<()> {
        if let Some(child) = self.process.as_mut() {
            let status = child.wait().await?;
            info!("language server exited with {status}");
        }
        Ok(())
    }

    /// Tear the session down: shutdown request, exit notification, then kill.
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.initialized {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.request("shutdown", Value::Null))
                .await
            {
                Ok(Ok(_)) => {
                    let _ = self.notify("exit", Value::Null).await;
                }
                Ok(Err(e)) => warn!("shutdown request failed: {e}"),
                Err(_) => warn!("shutdown request timed out"),
            }
        }

        if let Some(mut child) = self.process.take() {
            let _ = child.kill().await;
        }
        self.stdin = None;
        self.reader = None;
        self.initialized = false;

        info!("language client session closed");
        Ok(())
    }

    /// Send a request and read until its response arrives. Server
    /// notifications received in between are skipped.
    async fn request(&mut self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_request_id;
        self.next_request_id += 1;

        let message = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| SessionError::Protocol("session not started".to_string()))?;
        write_message(stdin, &message).await?;

        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| SessionError::Protocol("session not started".to_string()))?;
        loop {
            match read_message(reader).await? {
                Some(msg) => {
                    if msg.get("id").and_then(Value::as_u64) == Some(id) {
                        if let Some(err) = msg.get("error") {
                            return Err(SessionError::Protocol(format!("{method} failed: {err}")));
                        }
                        return Ok(msg.get("result").cloned().unwrap_or(Value::Null));
                    }
                    debug!("skipping server message while awaiting {method} response");
                }
                None => {
                    return Err(SessionError::Protocol(format!(
                        "server closed the channel before responding to {method}"
                    )));
                }
            }
        }
    }

    async fn notify(&mut self, method: &str, params: Value) -> Result<()> {
        let message = json!({"jsonrpc": "2.0", "method": method, "params": params});
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| SessionError::Protocol("session not started".to_string()))?;
        write_message(stdin, &message).await
    }
}
