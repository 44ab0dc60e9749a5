//! Asset download and zip extraction.

use std::io::Cursor;
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

use tracing::info;

use crate::install::error::InstallError;
use crate::install::release::USER_AGENT;

/// Fetches the full byte payload of a release asset.
///
/// One request, no streaming, no resume. Kept behind a trait so the
/// bootstrapper can assert download counts in tests.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait AssetDownloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>, InstallError>;
}

/// HTTP implementation of [`AssetDownloader`].
pub struct HttpAssetDownloader {
    client: reqwest::Client,
}

impl HttpAssetDownloader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
        }
    }
}

impl Default for HttpAssetDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AssetDownloader for HttpAssetDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>, InstallError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/octet-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstallError::Download { status });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Extracts the server binary from a downloaded zip payload into `dest_dir`.
///
/// The entry is matched by base filename only; any directory prefix inside
/// the archive is ignored. Overwrites prior content at the target path. On
/// Unix the extracted file is marked 0755 since zip extraction does not
/// preserve executable bits reliably; Windows runs `.exe` files directly.
pub fn install_binary(
    payload: &[u8],
    binary_name: &str,
    dest_dir: &Path,
) -> Result<PathBuf, InstallError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(payload))?;

    let index = (0..archive.len()).find(|&i| {
        archive
            .by_index(i)
            .map(|entry| entry_matches(entry.name(), binary_name))
            .unwrap_or(false)
    });
    let Some(index) = index else {
        return Err(InstallError::BinaryNotInArchive {
            binary: binary_name.to_string(),
        });
    };

    std::fs::create_dir_all(dest_dir)?;
    let target = dest_dir.join(binary_name);
    let mut entry = archive.by_index(index)?;
    let mut out = std::fs::File::create(&target)?;
    std::io::copy(&mut entry, &mut out)?;
    drop(out);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755))?;
    }

    info!("installed {} to {:?}", binary_name, target);
    Ok(target)
}

fn entry_matches(entry_name: &str, binary_name: &str) -> bool {
    Path::new(entry_name)
        .file_name()
        .map(|name| name.to_string_lossy() == binary_name)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn zip_with_entries(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(&mut cursor);
        for (name, data) in entries {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
        cursor.into_inner()
    }

    #[test]
    fn install_binary_extracts_entry_matched_by_base_filename() {
        let temp_dir = TempDir::new().unwrap();
        let payload = zip_with_entries(&[
            ("asn1-lsp-linux-x86_64/README.md", b"docs"),
            ("asn1-lsp-linux-x86_64/asn1-lsp", b"#!/bin/sh\n"),
        ]);

        let path = install_binary(&payload, "asn1-lsp", temp_dir.path()).unwrap();

        assert_eq!(path, temp_dir.path().join("asn1-lsp"));
        assert_eq!(std::fs::read(&path).unwrap(), b"#!/bin/sh\n");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o755, 0o755, "owner-execute bit should be set");
        }
    }

    #[test]
    fn install_binary_overwrites_prior_content() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("asn1-lsp"), b"partial garbage").unwrap();

        let payload = zip_with_entries(&[("asn1-lsp", b"fresh")]);
        let path = install_binary(&payload, "asn1-lsp", temp_dir.path()).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"fresh");
    }

    #[test]
    fn install_binary_fails_when_binary_missing_from_archive() {
        let temp_dir = TempDir::new().unwrap();
        let payload = zip_with_entries(&[("README.md", b"docs")]);

        let err = install_binary(&payload, "asn1-lsp", temp_dir.path()).unwrap_err();
        match err {
            InstallError::BinaryNotInArchive { binary } => assert_eq!(binary, "asn1-lsp"),
            other => panic!("expected BinaryNotInArchive, got {other:?}"),
        }
        assert!(!temp_dir.path().join("asn1-lsp").exists());
    }

    #[test]
    fn install_binary_rejects_non_zip_payload() {
        let temp_dir = TempDir::new().unwrap();
        let err = install_binary(b"not a zip archive", "asn1-lsp", temp_dir.path()).unwrap_err();
        assert!(matches!(err, InstallError::Archive(_)));
    }

    #[tokio::test]
    async fn download_returns_payload_bytes() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/assets/asn1-lsp-linux-x86_64.zip")
            .with_status(200)
            .with_body(b"zip bytes")
            .create_async()
            .await;

        let downloader = HttpAssetDownloader::new();
        let url = format!("{}/assets/asn1-lsp-linux-x86_64.zip", server.url());
        let payload = downloader.download(&url).await.unwrap();

        mock.assert_async().await;
        assert_eq!(payload, b"zip bytes");
    }

    #[tokio::test]
    async fn download_carries_status_on_failure() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/assets/missing.zip")
            .with_status(404)
            .create_async()
            .await;

        let downloader = HttpAssetDownloader::new();
        let url = format!("{}/assets/missing.zip", server.url());
        let err = downloader.download(&url).await.unwrap_err();

        mock.assert_async().await;
        match err {
            InstallError::Download { status } => assert_eq!(status.as_u16(), 404),
            other => panic!("expected Download, got {other:?}"),
        }
    }
}
