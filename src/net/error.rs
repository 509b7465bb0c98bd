use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Host unreachable: {0}")]
    Unreachable(String),

    #[error("Rejected response for {url}: status {status}")]
    BadStatus { url: String, status: u16 },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Maximum length for URLs quoted in error messages
const MAX_ERROR_URL_LENGTH: usize = 200;

impl FetchError {
    /// Truncate a URL to keep log lines readable (font URLs get long)
    fn truncate_url(url: &str) -> String {
        if url.len() <= MAX_ERROR_URL_LENGTH {
            url.to_string()
        } else {
            let mut end = MAX_ERROR_URL_LENGTH;
            while !url.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... ({} total bytes)", &url[..end], url.len())
        }
    }

    pub fn bad_status(url: &str, status: u16) -> Self {
        FetchError::BadStatus {
            url: Self::truncate_url(url),
            status,
        }
    }

    /// Connection and timeout failures name the host that could not be
    /// reached; anything else keeps the underlying `reqwest` error.
    pub fn from_send(url: &reqwest::Url, err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            FetchError::Unreachable(url.host_str().unwrap_or_default().to_string())
        } else {
            FetchError::NetworkError(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_status_short_url_kept() {
        let err = FetchError::bad_status("https://example.com/a.css", 404);
        assert_eq!(
            err.to_string(),
            "Rejected response for https://example.com/a.css: status 404"
        );
    }

    #[test]
    fn test_bad_status_long_url_truncated() {
        let url = format!("https://fonts.googleapis.com/css2?{}", "a".repeat(400));
        let err = FetchError::bad_status(&url, 500);
        let msg = err.to_string();
        assert!(msg.contains("total bytes"));
        assert!(msg.len() < url.len());
    }
}
