//! Host-side bootstrapper for the external `asn1-lsp` language server.
//!
//! The server itself ships as a prebuilt binary attached to GitHub releases.
//! This crate resolves a runnable copy of it (explicit configuration, then
//! the on-disk cache, then a fresh download) and runs an editor-style
//! language-client session against it over stdio.
//!
//! # Modules
//!
//! - [`platform`]: OS/architecture detection and asset naming
//! - [`install`]: release resolution, binary cache, and archive install
//! - [`client`]: the language-client session owning the server process
//! - [`config`]: user configuration and storage paths
//! - [`scripts`]: one-shot release utilities (changelog, asset rendering)

pub mod client;
pub mod config;
pub mod install;
pub mod platform;
pub mod scripts;
