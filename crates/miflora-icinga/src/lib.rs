//! Icinga submission client.
//!
//! [`IcingaClient`] POSTs a JSON-encoded [`ReportPayload`] to a
//! process-check-result endpoint with HTTP basic auth, verifying the server
//! against a caller-supplied CA certificate. Timeouts are retried a fixed
//! number of times; every other failure (auth, validation, transport) is
//! surfaced immediately.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Total submission attempts; only timeouts consume the extra ones.
const SUBMIT_ATTEMPTS: u32 = 3;

/// HTTP request timeout for a single submission attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error type for report submission failures.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The CA certificate could not be read from disk.
    #[error("failed to read CA certificate {path}: {source}")]
    CertificateRead {
        path: String,
        source: std::io::Error,
    },

    /// The remote server returned a non-2xx status code (bad credentials,
    /// rejected payload). Never retried.
    #[error("API returned HTTP {0}")]
    HttpStatus(u16),

    /// A submission attempt exceeded the request timeout. Retryable.
    #[error("request timed out")]
    Timeout,

    /// Any other HTTP failure (TLS, DNS, connection). Never retried.
    #[error("HTTP request failed: {0}")]
    Request(reqwest::Error),
}

impl From<reqwest::Error> for ReportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ReportError::Timeout
        } else {
            ReportError::Request(e)
        }
    }
}

impl ReportError {
    /// Whether this failure is a timeout and therefore worth retrying.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ReportError::Timeout)
    }
}

/// Passive check result as expected by the Icinga API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    /// Plugin exit status: 0 OK, 1 WARNING, 2 CRITICAL, 3 UNKNOWN.
    pub exit_status: u8,
    /// Human-readable summary line.
    pub plugin_output: String,
    /// Performance-data strings, or `null` when no reading was obtained.
    pub performance_data: Option<Vec<String>>,
}

/// Client for submitting check results to an Icinga API endpoint.
#[derive(Debug)]
pub struct IcingaClient {
    client: reqwest::Client,
    url: String,
    username: String,
    password: String,
}

impl IcingaClient {
    /// Builds a client that trusts the given CA certificate (PEM).
    pub fn new(
        url: &str,
        username: &str,
        password: &str,
        ca_cert: &Path,
    ) -> Result<Self, ReportError> {
        let pem = std::fs::read(ca_cert).map_err(|source| ReportError::CertificateRead {
            path: ca_cert.display().to_string(),
            source,
        })?;
        let certificate = reqwest::Certificate::from_pem(&pem)?;
        let client = reqwest::Client::builder()
            .add_root_certificate(certificate)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Submits a check result, retrying timeouts up to the attempt bound.
    pub async fn submit(&self, payload: &ReportPayload) -> Result<(), ReportError> {
        submit_with_retry(|| self.try_send(payload)).await
    }

    /// Executes a single POST and checks the response status.
    async fn try_send(&self, payload: &ReportPayload) -> Result<(), ReportError> {
        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }
}

/// Runs the submission retry policy over one attempt function: only
/// timeouts consume the extra attempts, every other failure is surfaced
/// immediately.
async fn submit_with_retry<F, Fut>(mut attempt: F) -> Result<(), ReportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), ReportError>>,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        match attempt().await {
            Ok(()) => {
                debug!(attempt = attempts, "Check result accepted");
                return Ok(());
            }
            Err(e) if e.is_timeout() && attempts < SUBMIT_ATTEMPTS => {
                warn!(attempt = attempts, "Submission timed out, trying again");
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn test_payload_json_shape() {
        let payload = ReportPayload {
            exit_status: 1,
            plugin_output: "Plant is WARNING".to_string(),
            performance_data: Some(vec!["temperature=22;18:25;15:30;;".to_string()]),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "exit_status": 1,
                "plugin_output": "Plant is WARNING",
                "performance_data": ["temperature=22;18:25;15:30;;"],
            })
        );
    }

    #[test]
    fn test_payload_null_performance_data() {
        let payload = ReportPayload {
            exit_status: 3,
            plugin_output: "Plant is UNKNOWN".to_string(),
            performance_data: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["exit_status"], 3);
        assert!(json["performance_data"].is_null());
    }

    #[test]
    fn test_missing_certificate_is_fatal() {
        let err = IcingaClient::new(
            "https://icinga.example:5665",
            "api",
            "secret",
            Path::new("/nonexistent/ca.crt"),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::CertificateRead { .. }));
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_http_status_error_display() {
        let err = ReportError::HttpStatus(401);
        assert_eq!(err.to_string(), "API returned HTTP 401");
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_timeout_retried_up_to_attempt_bound() {
        let attempts = Cell::new(0u32);
        let result = submit_with_retry(|| {
            attempts.set(attempts.get() + 1);
            async { Err(ReportError::Timeout) }
        })
        .await;
        assert!(matches!(result, Err(ReportError::Timeout)));
        assert_eq!(attempts.get(), SUBMIT_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_timeout_then_success() {
        let attempts = Cell::new(0u32);
        let result = submit_with_retry(|| {
            attempts.set(attempts.get() + 1);
            let outcome = if attempts.get() == 1 {
                Err(ReportError::Timeout)
            } else {
                Ok(())
            };
            async move { outcome }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(attempts.get(), 2);
    }

    #[tokio::test]
    async fn test_http_error_not_retried() {
        let attempts = Cell::new(0u32);
        let result = submit_with_retry(|| {
            attempts.set(attempts.get() + 1);
            async { Err(ReportError::HttpStatus(401)) }
        })
        .await;
        assert!(matches!(result, Err(ReportError::HttpStatus(401))));
        assert_eq!(attempts.get(), 1);
    }
}
