use crate::domain::model::SourceError;
use crate::utils::error::Result;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; WOW64; rv:40.0) Gecko/20100101 Firefox/43.0";

pub fn build_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Sends the request and returns the body of a 2xx response.
pub async fn fetch_text(request: RequestBuilder) -> std::result::Result<String, SourceError> {
    let response = request.send().await.map_err(classify)?;
    let status = response.status();
    tracing::debug!("{} -> {}", response.url(), status);

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::Throttled(format!("HTTP {}", status.as_u16())));
    }
    if !status.is_success() {
        return Err(SourceError::Status(status.as_u16()));
    }

    response.text().await.map_err(classify)
}

pub fn classify(err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Timeout
    } else if let Some(status) = err.status() {
        SourceError::Status(status.as_u16())
    } else if err.is_decode() {
        SourceError::Parse(err.to_string())
    } else {
        SourceError::Transport(err.to_string())
    }
}
