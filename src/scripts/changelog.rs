//! Aggregates published GitHub releases into a Markdown changelog.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::DateTime;
use serde::Deserialize;

use crate::install::release::USER_AGENT;

const PER_PAGE: usize = 100;
const MAX_PAGES: usize = 100;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

pub struct ChangelogOptions {
    pub base_url: String,
    /// `owner/repo`, from `GITHUB_REPOSITORY`.
    pub repository: String,
    /// Bearer token, from `GITHUB_TOKEN`.
    pub token: String,
}

/// Fetch every release and write the aggregated changelog to `output`.
pub async fn generate(options: &ChangelogOptions, output: &Path) -> Result<()> {
    let releases = fetch_all_releases(options).await?;
    if releases.is_empty() {
        eprintln!("generate-changelog: no releases found; writing placeholder changelog.");
    }

    let markdown = render_markdown(&releases);
    std::fs::write(output, markdown)
        .with_context(|| format!("writing {}", output.display()))?;
    println!(
        "generate-changelog: wrote aggregated release notes to {}",
        output.display()
    );
    Ok(())
}

/// Paginate the releases endpoint strictly sequentially, stopping at the
/// first short or empty page.
async fn fetch_all_releases(options: &ChangelogOptions) -> Result<Vec<Release>> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("creating HTTP client")?;

    let mut releases = Vec::new();
    for page in 1..MAX_PAGES {
        let url = format!(
            "{}/repos/{}/releases?per_page={}&page={}",
            options.base_url, options.repository, PER_PAGE, page
        );
        let response = client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&options.token)
            .send()
            .await
            .with_context(|| format!("fetching releases page {page}"))?;

        if !response.status().is_success() {
            bail!("failed to fetch releases (HTTP {})", response.status());
        }

        let page_data: Vec<Release> = response.json().await.context("parsing releases page")?;
        let short_page = page_data.len() < PER_PAGE;
        releases.extend(page_data);
        if short_page {
            break;
        }
    }

    Ok(releases)
}

/// Render the non-draft releases, newest first as the API returns them.
pub fn render_markdown(releases: &[Release]) -> String {
    let mut lines = vec!["# Changelog".to_string(), String::new()];

    for release in releases {
        if release.draft {
            continue;
        }

        let title = release
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .or_else(|| release.tag_name.clone())
            .unwrap_or_else(|| "Untitled release".to_string());
        let published = release
            .published_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Unpublished".to_string());
        let body = release.body.as_deref().unwrap_or("").trim();

        lines.push(format!("## {title} ({published})"));
        lines.push(String::new());
        lines.push(if body.is_empty() {
            "_No release notes provided._".to_string()
        } else {
            body.to_string()
        });
        lines.push(String::new());
    }

    let mut contents = lines.join("\n");
    while contents.ends_with('\n') {
        contents.pop();
    }
    contents.push('\n');
    contents
}
