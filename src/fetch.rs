use crate::error::FetchError;
use crate::proxy::Proxies;
use crate::{BROWSER_REFERER, BROWSER_USER_AGENT};
use log::{debug, info, warn};
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONNECTION, CONTENT_TYPE, DNT, HeaderMap, HeaderName, HeaderValue, REFERER, USER_AGENT,
};
use reqwest::redirect::Policy;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAX_REDIRECTS: usize = 10;

/// Outcome of one download attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub success: bool,
    /// Name of the written file on success, basename otherwise
    pub filename: String,
    pub byte_count: u64,
    pub error: Option<String>,
}

impl DownloadResult {
    fn succeeded(filename: String, byte_count: u64) -> Self {
        DownloadResult {
            success: true,
            filename,
            byte_count,
            error: None,
        }
    }

    fn failed(basename: &str, error: &FetchError) -> Self {
        DownloadResult {
            success: false,
            filename: basename.to_string(),
            byte_count: 0,
            error: Some(error.to_string()),
        }
    }
}

/// Headers a common desktop browser sends when loading an image.
/// `Accept-Encoding` is left to reqwest which decodes what it asked for.
#[must_use]
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("image/avif,image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static(BROWSER_REFERER));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(HeaderName::from_static("sec-fetch-dest"), HeaderValue::from_static("image"));
    headers.insert(HeaderName::from_static("sec-fetch-mode"), HeaderValue::from_static("no-cors"));
    headers.insert(HeaderName::from_static("sec-fetch-site"), HeaderValue::from_static("same-origin"));
    headers
}

/// Picks the file extension from a `Content-Type` header value.
/// Bytes are not sniffed: anything that is neither png nor webp
/// (including a missing header) is saved as `.jpg`.
#[must_use]
pub fn extension_for_content_type(content_type: Option<&str>) -> &'static str {
    let content_type = content_type.unwrap_or_default().to_ascii_lowercase();
    if content_type.contains("png") {
        ".png"
    } else if content_type.contains("webp") {
        ".webp"
    } else {
        ".jpg"
    }
}

/// Fetches images with browser-like headers and saves them to disk
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Builds the HTTP client shared by every request: browser
    /// headers, `timeout` for a whole request, redirects followed.
    ///
    /// # Errors
    ///
    /// Fails when a proxy url is invalid or when the TLS backend
    /// can not be initialized
    pub fn new(timeout: Duration, proxies: &Proxies) -> Result<Self, FetchError> {
        let builder = reqwest::Client::builder()
            .default_headers(browser_headers())
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS));

        let client = proxies.apply(builder).and_then(|b| b.build()).map_err(FetchError::Client)?;
        Ok(Fetcher {
            client,
        })
    }

    /// Downloads `url` into `output_dir/basename.ext`, `ext` being
    /// guessed from the response content type. An existing file with
    /// the same name is overwritten. Nothing is written on failure.
    pub async fn fetch(&self, url: &str, basename: &str, output_dir: &Path) -> DownloadResult {
        match self.try_fetch(url, basename, output_dir).await {
            Ok((path, byte_count)) => {
                let filename = path.file_name().map_or_else(
                    || basename.to_string(),
                    |name| name.to_string_lossy().into_owned(),
                );
                info!("Saved {url} to {} ({byte_count} bytes)", path.display());
                DownloadResult::succeeded(filename, byte_count)
            }
            Err(e) => {
                warn!("Error '{e}' while downloading {url}");
                DownloadResult::failed(basename, &e)
            }
        }
    }

    async fn try_fetch(&self, url: &str, basename: &str, output_dir: &Path) -> Result<(PathBuf, u64), FetchError> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let content_type = response.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok());
        debug!("{url} content type: {content_type:?}");
        let extension = extension_for_content_type(content_type);
        let path = output_dir.join(format!("{basename}{extension}"));

        let body = response.bytes().await?;
        tokio::fs::write(&path, &body).await.map_err(|source| FetchError::Write {
            path: path.clone(),
            source,
        })?;

        Ok((path, body.len() as u64))
    }
}

#[test]
fn test_extension_for_content_type() {
    assert_eq!(extension_for_content_type(Some("image/png")), ".png");
    assert_eq!(extension_for_content_type(Some("image/webp")), ".webp");
    assert_eq!(extension_for_content_type(Some("image/jpeg")), ".jpg");
    assert_eq!(extension_for_content_type(Some("image/gif")), ".jpg");
    assert_eq!(extension_for_content_type(None), ".jpg");
}

#[test]
fn test_extension_for_content_type_with_parameters() {
    assert_eq!(extension_for_content_type(Some("IMAGE/PNG; charset=binary")), ".png");
    assert_eq!(extension_for_content_type(Some("application/octet-stream")), ".jpg");
}

#[test]
fn test_browser_headers() {
    let headers = browser_headers();
    assert_eq!(headers.get(USER_AGENT).unwrap(), BROWSER_USER_AGENT);
    assert_eq!(headers.get(REFERER).unwrap(), BROWSER_REFERER);
    assert_eq!(headers.get("sec-fetch-mode").unwrap(), "no-cors");
    assert_eq!(headers.len(), 9);
}
