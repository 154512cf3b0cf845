use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
}
