// API client module: contains a small blocking HTTP client that talks to
// the GitLab v4 REST API. It is intentionally small and synchronous; the
// whole run is a handful of sequential requests.

use anyhow::{bail, Context, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-request timeout. The API is expected to be on the local network, so
/// anything slower than this is treated as a transport failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Everything outside the unreserved set gets escaped, so a repository path
// like `config/envtest/GlobalConfig.properties` can be embedded as a single
// URL segment the way the GitLab file endpoints require.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Escape a slash-separated repository path for use as one URL path segment.
pub fn escape_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_SEGMENT).to_string()
}

/// Classified outcome of a single API call. Callers pattern-match on this
/// instead of branching on raw status codes at every call site; transport
/// failures (DNS, refused connection, timeout) surface separately as
/// `anyhow::Error`.
#[derive(Debug)]
pub enum ApiResponse {
    /// 2xx, carrying the raw response body.
    Success(String),
    /// 404. For file lookups this means "absent", which is not an error.
    NotFound,
    /// Any other non-2xx status, with a best-effort copy of the body.
    HttpError { status: u16, body: String },
}

/// Payload for the create/update file endpoints. The file content is embedded
/// as raw text in the JSON body; GitLab commits it to `branch` with
/// `commit_message`.
#[derive(Serialize, Deserialize, Debug)]
pub struct FilePayload {
    pub branch: String,
    pub content: String,
    pub commit_message: String,
}

/// Subset of the project lookup response we care about. GitLab returns a lot
/// more; serde drops the rest.
#[derive(Serialize, Deserialize, Debug)]
pub struct ProjectInfo {
    pub id: u64,
}

/// Seam between the run loop and the repository backend, so the loop can be
/// driven against an in-memory store in tests.
pub trait FileStore {
    /// Whether the file already exists on the target branch. A non-404 error
    /// (auth failure, server error) is NOT the same thing as "absent" and
    /// must surface as an error, never as `Ok(false)`.
    fn exists(&self, path: &str) -> Result<bool>;

    /// Create the file with the given content, committing with `message`.
    fn create(&self, path: &str, content: &str, message: &str) -> Result<ApiResponse>;

    /// Replace the file's content, committing with `message`.
    fn update(&self, path: &str, content: &str, message: &str) -> Result<ApiResponse>;
}

/// Blocking GitLab client holding the shared reqwest client, the instance
/// base URL and the access token sent with every request.
pub struct GitLabClient {
    client: Client,
    base_url: String,
    token: String,
}

impl GitLabClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(GitLabClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Helper to build the `PRIVATE-TOKEN` header map sent on every request.
    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let name = HeaderName::from_static("private-token");
        headers.insert(name, HeaderValue::from_str(&self.token).unwrap());
        headers
    }

    /// Look up a project by its slash-separated path, e.g. `xz01/springconfig`.
    /// `GET /api/v4/projects/:escaped_path`.
    pub fn get_project(&self, project_path: &str) -> Result<ApiResponse> {
        let url = format!(
            "{}/api/v4/projects/{}",
            self.base_url,
            escape_path(project_path)
        );
        log::debug!("GET {url}");
        let res = self
            .client
            .get(&url)
            .headers(self.auth_headers())
            .send()
            .context("Failed to send project lookup request")?;
        Ok(classify(res.status(), res.text().unwrap_or_else(|_| "".into())))
    }
}

/// Map a raw status/body pair into the typed response variants.
fn classify(status: StatusCode, body: String) -> ApiResponse {
    if status.is_success() {
        ApiResponse::Success(body)
    } else if status == StatusCode::NOT_FOUND {
        ApiResponse::NotFound
    } else {
        ApiResponse::HttpError {
            status: status.as_u16(),
            body,
        }
    }
}

/// File operations scoped to one resolved project and branch. Holding the
/// numeric id here means it is looked up once per run and reused for every
/// file request.
pub struct ProjectFiles<'a> {
    client: &'a GitLabClient,
    project_id: u64,
    branch: String,
}

impl<'a> ProjectFiles<'a> {
    pub fn new(client: &'a GitLabClient, project_id: u64, branch: &str) -> Self {
        ProjectFiles {
            client,
            project_id,
            branch: branch.to_string(),
        }
    }

    /// `{base}/api/v4/projects/:id/repository/files/:escaped_path`
    fn file_url(&self, path: &str) -> String {
        format!(
            "{}/api/v4/projects/{}/repository/files/{}",
            self.client.base_url,
            self.project_id,
            escape_path(path)
        )
    }

    fn send_content(
        &self,
        method: reqwest::Method,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<ApiResponse> {
        let url = self.file_url(path);
        let payload = FilePayload {
            branch: self.branch.clone(),
            content: content.to_string(),
            commit_message: message.to_string(),
        };
        log::debug!("{method} {url}");
        let res = self
            .client
            .client
            .request(method, &url)
            .headers(self.client.auth_headers())
            .json(&payload)
            .send()
            .with_context(|| format!("Failed to send file request for {path}"))?;
        Ok(classify(res.status(), res.text().unwrap_or_else(|_| "".into())))
    }
}

impl FileStore for ProjectFiles<'_> {
    fn exists(&self, path: &str) -> Result<bool> {
        let url = format!("{}?ref={}", self.file_url(path), self.branch);
        log::debug!("GET {url}");
        let res = self
            .client
            .client
            .get(&url)
            .headers(self.client.auth_headers())
            .send()
            .with_context(|| format!("Failed to send existence check for {path}"))?;
        match classify(res.status(), res.text().unwrap_or_else(|_| "".into())) {
            ApiResponse::Success(_) => Ok(true),
            ApiResponse::NotFound => Ok(false),
            ApiResponse::HttpError { status, body } => {
                bail!("existence check for {path} returned {status}: {body}")
            }
        }
    }

    fn create(&self, path: &str, content: &str, message: &str) -> Result<ApiResponse> {
        self.send_content(reqwest::Method::POST, path, content, message)
    }

    fn update(&self, path: &str, content: &str, message: &str) -> Result<ApiResponse> {
        self.send_content(reqwest::Method::PUT, path, content, message)
    }
}
