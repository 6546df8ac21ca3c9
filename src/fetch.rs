//! Fetching opinion PDFs from the issuing office's archive.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER};
use reqwest::redirect::Policy;

use crate::config::AppConfig;
use crate::error::ServiceError;
use crate::url_validator::{ensure_public_host, validate_redirect, validate_url, UrlValidationError};

/// Build the shared HTTP client with browser-like headers.
pub fn build_client(config: &AppConfig) -> Result<reqwest::Client, ServiceError> {
    let mut headers = HeaderMap::new();
    headers.insert(REFERER, header_value(&config.referer)?);
    headers.insert(
        HeaderName::from_static("sec-ch-ua"),
        header_value(&config.sec_ch_ua)?,
    );

    Ok(reqwest::Client::builder()
        .timeout(config.fetch_timeout)
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .redirect(redirect_policy(config.allowed_domains.clone()))
        .build()?)
}

fn header_value(value: &str) -> Result<HeaderValue, ServiceError> {
    HeaderValue::from_str(value)
        .map_err(|e| ServiceError::Config(format!("bad header value {:?}: {}", value, e)))
}

/// Follow a redirect only if its target passes the same URL checks as the
/// original request.
fn redirect_policy(allowed_domains: Vec<String>) -> Policy {
    Policy::custom(move |attempt| {
        match validate_redirect(attempt.url(), attempt.previous().len(), &allowed_domains) {
            Ok(()) => attempt.follow(),
            Err(e) => {
                tracing::warn!(url = %attempt.url(), error = %e, "refusing redirect");
                attempt.error(e)
            }
        }
    })
}

/// Surface a refused redirect as its validation error.
fn send_error(err: reqwest::Error) -> ServiceError {
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        if let Some(rejected) = cause.downcast_ref::<UrlValidationError>() {
            return ServiceError::RedirectRejected(rejected.clone());
        }
        source = cause.source();
    }
    ServiceError::Fetch(err)
}

fn ensure_within_limit(size: u64, limit: u64) -> Result<(), ServiceError> {
    if size > limit {
        return Err(ServiceError::DocumentTooLarge { size, limit });
    }
    Ok(())
}

/// Read the body, giving up as soon as it passes `limit` bytes. A declared
/// Content-Length over the limit is refused before any of the body is read.
async fn read_body(mut response: reqwest::Response, limit: u64) -> Result<Vec<u8>, ServiceError> {
    if let Some(declared) = response.content_length() {
        ensure_within_limit(declared, limit)?;
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
        ensure_within_limit(body.len() as u64, limit)?;
    }
    Ok(body)
}

/// Download the document at `url` after validating it against the allowlist.
pub async fn fetch_document(
    client: &reqwest::Client,
    config: &AppConfig,
    url: &str,
) -> Result<Vec<u8>, ServiceError> {
    let url = validate_url(url, &config.allowed_domains)?;
    ensure_public_host(&url).await?;

    tracing::info!(%url, "fetching document");
    let response = client.get(url.clone()).send().await.map_err(send_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ServiceError::UpstreamStatus(status.as_u16()));
    }

    let bytes = read_body(response, config.max_document_bytes).await?;
    tracing::debug!(%url, size = bytes.len(), "fetched document");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{response::Redirect, routing::get, Router};

    /// Serve `app` on an ephemeral local port; returns its base URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    fn archive() -> Router {
        Router::new()
            .route(
                "/metadata",
                get(|| async { Redirect::temporary("http://169.254.169.254/latest/meta-data") }),
            )
            .route(
                "/elsewhere",
                get(|| async { Redirect::temporary("https://example.com/a.pdf") }),
            )
            .route("/opinion.pdf", get(|| async { vec![b'x'; 64] }))
    }

    #[test]
    fn test_build_client_with_defaults() {
        assert!(build_client(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_build_client_rejects_bad_header() {
        let config = AppConfig {
            referer: "line\nbreak".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(build_client(&config), Err(ServiceError::Config(_))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_disallowed_url_before_network() {
        let config = AppConfig::default();
        let client = build_client(&config).unwrap();
        let err = fetch_document(&client, &config, "https://example.com/a.pdf")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidUrl(UrlValidationError::DomainNotAllowed(_))
        ));
    }

    #[tokio::test]
    async fn test_client_refuses_redirect_to_internal_host() {
        let base = serve(archive()).await;
        let client = build_client(&AppConfig::default()).unwrap();

        let err = client
            .get(format!("{}/metadata", base))
            .send()
            .await
            .unwrap_err();
        assert!(matches!(
            send_error(err),
            ServiceError::RedirectRejected(UrlValidationError::NotHttps)
        ));
    }

    #[tokio::test]
    async fn test_client_refuses_redirect_off_allowlist() {
        let base = serve(archive()).await;
        let client = build_client(&AppConfig::default()).unwrap();

        let err = client
            .get(format!("{}/elsewhere", base))
            .send()
            .await
            .unwrap_err();
        match send_error(err) {
            ServiceError::RedirectRejected(UrlValidationError::DomainNotAllowed(host)) => {
                assert_eq!(host, "example.com")
            }
            other => panic!("expected refused redirect, got {:?}", other),
        }
    }

    #[test]
    fn test_size_limit_boundary() {
        assert!(ensure_within_limit(16, 16).is_ok());
        assert!(matches!(
            ensure_within_limit(17, 16),
            Err(ServiceError::DocumentTooLarge { size: 17, limit: 16 })
        ));
    }

    #[tokio::test]
    async fn test_read_body_enforces_limit() {
        let base = serve(archive()).await;
        let client = build_client(&AppConfig::default()).unwrap();
        let url = format!("{}/opinion.pdf", base);

        let response = client.get(&url).send().await.unwrap();
        assert_eq!(read_body(response, 64).await.unwrap(), vec![b'x'; 64]);

        let response = client.get(&url).send().await.unwrap();
        assert!(matches!(
            read_body(response, 16).await,
            Err(ServiceError::DocumentTooLarge { size: 64, limit: 16 })
        ));
    }
}
