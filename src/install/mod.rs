//! Acquisition of the `asn1-lsp` server binary.
//!
//! Resolution is strictly sequential: explicit configuration wins, then the
//! on-disk cache, then a download from the release channel. The cache is
//! addressed per channel+tag and is only ever written additively.
//!
//! # Modules
//!
//! - [`release`]: release channels and GitHub release metadata
//! - [`cache`]: on-disk cache of extracted binaries
//! - [`installer`]: asset download and zip extraction
//! - [`bootstrap`]: the resolution orchestration and activation entry point
//! - [`error`]: error kinds shared across the above

pub mod bootstrap;
pub mod cache;
pub mod error;
pub mod installer;
pub mod release;
