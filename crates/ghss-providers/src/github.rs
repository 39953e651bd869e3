//! A [`CodeHostClient`] backed by the GitHub REST API (§6, H).
//!
//! A pooled `reqwest::Client` with status-to-error mapping, adapted to
//! GitHub's REST conventions: a fixed `User-Agent`, optional bearer
//! token, `Link`-header pagination, and rate-limit detection via
//! `X-RateLimit-Remaining`/`Retry-After`.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, StatusCode, header::HeaderMap};
use serde::Deserialize;

use ghss_domain::entities::Contributor;
use ghss_domain::error::{Error, Result};
use ghss_domain::ports::{CodeHostClient, CommitActivity, RemoteContent, RemoteRepository};

const GITHUB_API_BASE: &str = "https://api.github.com";
const PER_PAGE: u32 = 100;
const DEFAULT_RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(60);

/// A GitHub REST API client implementing [`CodeHostClient`].
pub struct GitHubClient {
    http: Client,
    token: Option<String>,
    api_base: String,
}

impl GitHubClient {
    /// Build a client, optionally authenticated with a personal access
    /// token (raises the unauthenticated rate limit substantially).
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_api_base(token, GITHUB_API_BASE.to_string())
    }

    /// Build a client against a custom API base URL, for tests.
    pub fn with_api_base(token: Option<String>, api_base: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("gh-star-search/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| Error::network(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            token,
            api_base,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{path}", self.api_base)
        };
        let mut builder = self
            .http
            .request(method, url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(|err| Error::network_with_source("GitHub request failed", err))?;
        let (status, headers) = (response.status(), response.headers().clone());
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_status(status, &headers, &body, path));
        }
        response
            .json()
            .await
            .map_err(|err| Error::network_with_source("failed to parse GitHub response", err))
    }

    /// Fetch every page of a `Link`-paginated list endpoint.
    async fn get_all_pages<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(format!("{path}{}per_page={PER_PAGE}", separator(path)));
        while let Some(url) = next {
            let response = self
                .request(Method::GET, &url)
                .send()
                .await
                .map_err(|err| Error::network_with_source("GitHub request failed", err))?;
            let (status, headers) = (response.status(), response.headers().clone());
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(map_error_status(status, &headers, &body, &url));
            }
            next = next_page_url(&headers);
            let page: Vec<T> = response
                .json()
                .await
                .map_err(|err| Error::network_with_source("failed to parse GitHub response", err))?;
            items.extend(page);
        }
        Ok(items)
    }
}

fn separator(path: &str) -> &'static str {
    if path.contains('?') { "&" } else { "?" }
}

fn next_page_url(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(reqwest::header::LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let url = part.split(';').next()?.trim();
        let is_next = part.split(';').skip(1).any(|seg| seg.trim() == "rel=\"next\"");
        is_next.then(|| url.trim_start_matches('<').trim_end_matches('>').to_string())
    })
}

/// Map a non-success GitHub response to a typed [`Error`], detecting rate
/// limiting via `X-RateLimit-Remaining: 0` (403) or a plain `429`.
fn map_error_status(status: StatusCode, headers: &HeaderMap, body: &str, path: &str) -> Error {
    let remaining_exhausted = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        == Some(0);

    if status == StatusCode::TOO_MANY_REQUESTS || (status == StatusCode::FORBIDDEN && remaining_exhausted) {
        let retry_after = retry_after_duration(headers);
        return Error::RateLimit { retry_after };
    }
    if status == StatusCode::NOT_FOUND {
        return Error::not_found(path.to_string());
    }
    Error::network(format!("GitHub API error {status} for {path}: {body}"))
}

fn retry_after_duration(headers: &HeaderMap) -> Duration {
    if let Some(secs) = headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
    {
        return Duration::from_secs(secs);
    }
    if let Some(reset_epoch) = headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
    {
        let now = Utc::now().timestamp();
        return Duration::from_secs((reset_epoch - now).max(0) as u64);
    }
    DEFAULT_RATE_LIMIT_BACKOFF
}

#[derive(Debug, Deserialize)]
struct GhLicense {
    name: Option<String>,
    spdx_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GhRepo {
    full_name: String,
    description: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
    language: Option<String>,
    stargazers_count: u64,
    forks_count: u64,
    size: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    license: Option<GhLicense>,
}

impl GhRepo {
    fn into_remote_repository(self, languages: BTreeMap<String, u64>, contributors: Vec<Contributor>) -> RemoteRepository {
        RemoteRepository {
            full_name: self.full_name,
            description: self.description,
            homepage: self.homepage.filter(|h| !h.is_empty()),
            language: self.language,
            stars: self.stargazers_count,
            forks: self.forks_count,
            size_kb: self.size,
            created_at: self.created_at,
            updated_at: self.updated_at,
            topics: self.topics,
            languages,
            contributors,
            license_name: self.license.as_ref().and_then(|l| l.name.clone()),
            license_spdx: self.license.and_then(|l| l.spdx_id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GhContributor {
    login: String,
    contributions: u64,
}

#[derive(Debug, Deserialize)]
struct GhContentEntry {
    #[serde(rename = "type")]
    entry_type: String,
    content: Option<String>,
    encoding: Option<String>,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct GhCommitActivityWeek {
    total: u64,
}

#[derive(Debug, Deserialize)]
struct GhSearchResult {
    total_count: u64,
}

#[async_trait]
impl CodeHostClient for GitHubClient {
    async fn get_starred_repos(&self, user: &str) -> Result<Vec<RemoteRepository>> {
        // An empty `user` means "the authenticated token owner": GitHub
        // exposes that as `/user/starred`, distinct from the public
        // `/users/{user}/starred` listing.
        let path = if user.is_empty() {
            "/user/starred".to_string()
        } else {
            format!("/users/{user}/starred")
        };
        let repos: Vec<GhRepo> = self.get_all_pages(&path).await?;
        let mut result = Vec::with_capacity(repos.len());
        for repo in repos {
            let full_name = repo.full_name.clone();
            let languages = self.get_languages(&full_name).await.unwrap_or_default();
            let contributors = self.get_contributors(&full_name).await.unwrap_or_default();
            result.push(repo.into_remote_repository(languages, contributors));
        }
        Ok(result)
    }

    async fn get_repository_content(
        &self,
        full_name: &str,
        priority_paths: &[String],
    ) -> Result<Vec<RemoteContent>> {
        let mut contents = Vec::new();
        for path in priority_paths {
            let api_path = format!("/repos/{full_name}/contents/{path}");
            let raw: serde_json::Value = match self.get_json(&api_path).await {
                Ok(value) => value,
                Err(Error::NotFound { .. }) => continue,
                Err(err) => return Err(err),
            };
            // A directory entry deserializes as a JSON array; only files matter here.
            let Some(entry): Option<GhContentEntry> = serde_json::from_value(raw).ok() else {
                continue;
            };
            if entry.entry_type != "file" {
                continue;
            }
            let Some(content) = entry.content else {
                continue;
            };
            contents.push(RemoteContent {
                path: path.clone(),
                file_type: entry.entry_type,
                content,
                size: entry.size,
                encoding: entry.encoding.unwrap_or_else(|| "base64".to_string()),
            });
        }
        Ok(contents)
    }

    async fn get_repository_metadata(&self, full_name: &str) -> Result<RemoteRepository> {
        let repo: GhRepo = self.get_json(&format!("/repos/{full_name}")).await?;
        let languages = self.get_languages(full_name).await.unwrap_or_default();
        let contributors = self.get_contributors(full_name).await.unwrap_or_default();
        Ok(repo.into_remote_repository(languages, contributors))
    }

    async fn get_topics(&self, full_name: &str) -> Result<Vec<String>> {
        let repo: GhRepo = self.get_json(&format!("/repos/{full_name}")).await?;
        Ok(repo.topics)
    }

    async fn get_languages(&self, full_name: &str) -> Result<BTreeMap<String, u64>> {
        self.get_json(&format!("/repos/{full_name}/languages")).await
    }

    async fn get_contributors(&self, full_name: &str) -> Result<Vec<Contributor>> {
        let contributors: Vec<GhContributor> = self
            .get_json(&format!("/repos/{full_name}/contributors?per_page=10"))
            .await?;
        Ok(contributors
            .into_iter()
            .map(|c| Contributor {
                handle: c.login,
                contributions: c.contributions,
            })
            .collect())
    }

    async fn get_commit_activity(&self, full_name: &str) -> Result<CommitActivity> {
        let response = self
            .request(Method::GET, &format!("/repos/{full_name}/stats/commit_activity"))
            .send()
            .await
            .map_err(|err| Error::network_with_source("GitHub request failed", err))?;
        // GitHub returns 202 while the statistics cache is warming up; treat
        // that as "no data yet" rather than an error.
        if response.status() == StatusCode::ACCEPTED {
            return Ok(CommitActivity::default());
        }
        if !response.status().is_success() {
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_status(status, &headers, &body, full_name));
        }
        let weeks: Vec<GhCommitActivityWeek> = response
            .json()
            .await
            .map_err(|err| Error::network_with_source("failed to parse commit activity", err))?;
        let commits_1y: u64 = weeks.iter().map(|w| w.total).sum();
        let commits_30d: u64 = weeks.iter().rev().take(5).map(|w| w.total).sum();

        let commits_total = self.total_commit_count(full_name).await.unwrap_or(commits_1y);

        Ok(CommitActivity {
            commits_30d,
            commits_1y,
            commits_total,
        })
    }

    async fn get_pull_counts(&self, full_name: &str) -> Result<(u64, u64)> {
        let total: GhSearchResult = self
            .get_json(&format!("/search/issues?q=repo:{full_name}+type:pr&per_page=1"))
            .await?;
        let open: GhSearchResult = self
            .get_json(&format!(
                "/search/issues?q=repo:{full_name}+type:pr+state:open&per_page=1"
            ))
            .await?;
        Ok((open.total_count, total.total_count))
    }

    async fn get_issue_counts(&self, full_name: &str) -> Result<(u64, u64)> {
        let total: GhSearchResult = self
            .get_json(&format!("/search/issues?q=repo:{full_name}+type:issue&per_page=1"))
            .await?;
        let open: GhSearchResult = self
            .get_json(&format!(
                "/search/issues?q=repo:{full_name}+type:issue+state:open&per_page=1"
            ))
            .await?;
        Ok((open.total_count, total.total_count))
    }

    async fn get_homepage_text(&self, homepage: &str) -> Result<Option<String>> {
        let response = match self.http.get(homepage).send().await {
            Ok(response) => response,
            Err(_) => return Ok(None),
        };
        if !response.status().is_success() {
            return Ok(None);
        }
        let Ok(body) = response.text().await else {
            return Ok(None);
        };
        Ok(Some(strip_html(&body)))
    }
}

impl GitHubClient {
    /// `commits_total` via the commit-listing pagination trick: the last
    /// page number of `GET .../commits?per_page=1` equals the commit count.
    async fn total_commit_count(&self, full_name: &str) -> Result<u64> {
        let response = self
            .request(Method::GET, &format!("/repos/{full_name}/commits?per_page=1"))
            .send()
            .await
            .map_err(|err| Error::network_with_source("GitHub request failed", err))?;
        let status = response.status();
        let headers = response.headers().clone();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_status(status, &headers, &body, full_name));
        }
        if let Some(link) = headers.get(reqwest::header::LINK).and_then(|v| v.to_str().ok()) {
            if let Some(last) = last_page_number(link) {
                return Ok(last);
            }
        }
        let commits: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|err| Error::network_with_source("failed to parse commits", err))?;
        Ok(commits.len() as u64)
    }
}

fn last_page_number(link_header: &str) -> Option<u64> {
    link_header.split(',').find_map(|part| {
        let is_last = part.split(';').skip(1).any(|seg| seg.trim() == "rel=\"last\"");
        if !is_last {
            return None;
        }
        let url = part.split(';').next()?.trim();
        let url = url.trim_start_matches('<').trim_end_matches('>');
        let query = url.split_once('?')?.1;
        query
            .split('&')
            .find_map(|kv| kv.strip_prefix("page="))
            .and_then(|page| page.parse().ok())
    })
}

/// Crude tag-stripping text extraction; good enough for "is there any
/// readable text on the homepage" purposes, not a real HTML parser.
fn strip_html(body: &str) -> String {
    let tag_re = regex::Regex::new(r"(?s)<script.*?</script>|<style.*?</style>|<[^>]+>").unwrap();
    let stripped = tag_re.replace_all(body, " ");
    let whitespace_re = regex::Regex::new(r"\s+").unwrap();
    whitespace_re.replace_all(stripped.trim(), " ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_page_url_extracts_next_rel() {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::LINK,
            "<https://api.github.com/resource?page=2>; rel=\"next\", <https://api.github.com/resource?page=5>; rel=\"last\""
                .parse()
                .unwrap(),
        );
        assert_eq!(
            next_page_url(&headers).as_deref(),
            Some("https://api.github.com/resource?page=2")
        );
    }

    #[test]
    fn last_page_number_parses_page_query_param() {
        let link = "<https://api.github.com/resource?page=2>; rel=\"next\", <https://api.github.com/resource?page=42>; rel=\"last\"";
        assert_eq!(last_page_number(link), Some(42));
    }

    #[test]
    fn strip_html_removes_tags_and_scripts() {
        let html = "<html><head><script>evil()</script></head><body><p>Hello <b>world</b></p></body></html>";
        assert_eq!(strip_html(html), "Hello world");
    }

    #[test]
    fn rate_limit_detected_from_forbidden_with_zero_remaining() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
        headers.insert("retry-after", "30".parse().unwrap());
        let err = map_error_status(StatusCode::FORBIDDEN, &headers, "", "/repos/x/y");
        assert!(matches!(err, Error::RateLimit { retry_after } if retry_after == Duration::from_secs(30)));
    }
}
