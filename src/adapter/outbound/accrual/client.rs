//! Accrual service HTTP client.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client as HttpClient, StatusCode};
use rust_decimal::Decimal;
use tracing::{debug, warn};
use url::Url;

use super::dto::{OrderAccrualResponse, RemoteStatus};
use crate::domain::{AccrualOutcome, OrderNumber, Resolution};
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::accrual::AccrualConfig;
use crate::port::outbound::AccrualService;

/// HTTP client for the accrual service.
///
/// Never returns an error from [`AccrualService::query`]; every failure
/// becomes [`AccrualOutcome::ServiceError`] for the reconciler to back off on.
#[derive(Debug, Clone)]
pub struct AccrualClient {
    http: HttpClient,
    base_url: Url,
}

impl AccrualClient {
    /// Create a client with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path or the HTTP
    /// client cannot be built.
    pub fn new(base_url: Url, timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                field: "accrual.base_url",
                reason: "must be an http(s) base URL".to_string(),
            }
            .into());
        }
        let http = HttpClient::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self { http, base_url })
    }

    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL is missing or malformed.
    pub fn from_config(config: &AccrualConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "accrual.base_url",
            reason: e.to_string(),
        })?;
        Self::new(base_url, config.timeout(), config.connect_timeout())
    }

    /// `{base}/api/orders/{number}`, keeping any path prefix on the base.
    #[must_use]
    pub fn order_url(&self, number: &OrderNumber) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "orders", number.as_str()]);
        }
        url
    }
}

impl AccrualService for AccrualClient {
    async fn query(&self, number: &OrderNumber) -> AccrualOutcome {
        let url = self.order_url(number);
        debug!(order = %number, url = %url, "Querying accrual service");

        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(order = %number, error = %err, "Accrual request failed");
                return AccrualOutcome::ServiceError {
                    reason: transport_reason(&err),
                };
            }
        };

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = if status == StatusCode::OK {
            match response.bytes().await {
                Ok(bytes) => bytes.to_vec(),
                Err(err) => {
                    warn!(order = %number, error = %err, "Failed to read accrual response");
                    return AccrualOutcome::ServiceError {
                        reason: transport_reason(&err),
                    };
                }
            }
        } else {
            Vec::new()
        };

        let outcome = classify(status, retry_after.as_deref(), &body);
        debug!(order = %number, status = %status, outcome = outcome.label(), "Accrual answer");
        outcome
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

fn transport_reason(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}

/// Map one HTTP answer onto an outcome.
pub(super) fn classify(
    status: StatusCode,
    retry_after: Option<&str>,
    body: &[u8],
) -> AccrualOutcome {
    match status {
        StatusCode::NO_CONTENT => AccrualOutcome::Unregistered,
        StatusCode::TOO_MANY_REQUESTS => AccrualOutcome::RateLimited {
            retry_after: retry_after.and_then(parse_retry_after),
        },
        StatusCode::OK => match serde_json::from_slice::<OrderAccrualResponse>(body) {
            Ok(response) => from_response(response),
            Err(err) => AccrualOutcome::ServiceError {
                reason: format!("undecodable body: {err}"),
            },
        },
        other => AccrualOutcome::ServiceError {
            reason: format!("unexpected status {other}"),
        },
    }
}

fn from_response(response: OrderAccrualResponse) -> AccrualOutcome {
    match response.status {
        RemoteStatus::Registered | RemoteStatus::Processing => AccrualOutcome::Pending,
        RemoteStatus::Invalid => AccrualOutcome::Resolved(Resolution::Invalid),
        RemoteStatus::Processed => {
            let accrual = response.accrual.unwrap_or(Decimal::ZERO);
            if accrual.is_sign_negative() {
                return AccrualOutcome::ServiceError {
                    reason: format!("negative accrual {accrual} for order {}", response.order),
                };
            }
            AccrualOutcome::Resolved(Resolution::Processed { accrual })
        }
    }
}

/// Delay-seconds form only; HTTP-date values count as absent.
fn parse_retry_after(raw: &str) -> Option<Duration> {
    raw.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn client(base: &str) -> AccrualClient {
        AccrualClient::new(
            Url::parse(base).unwrap(),
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn no_content_is_unregistered() {
        assert_eq!(
            classify(StatusCode::NO_CONTENT, None, b""),
            AccrualOutcome::Unregistered
        );
    }

    #[test]
    fn registered_and_processing_are_pending() {
        for status in ["REGISTERED", "PROCESSING"] {
            let body = format!(r#"{{"order":"79927398713","status":"{status}"}}"#);
            assert_eq!(
                classify(StatusCode::OK, None, body.as_bytes()),
                AccrualOutcome::Pending
            );
        }
    }

    #[test]
    fn processed_carries_accrual() {
        let body = br#"{"order":"79927398713","status":"PROCESSED","accrual":729.98}"#;
        assert_eq!(
            classify(StatusCode::OK, None, body),
            AccrualOutcome::Resolved(Resolution::Processed {
                accrual: dec!(729.98)
            })
        );
    }

    #[test]
    fn processed_without_accrual_earns_zero() {
        let body = br#"{"order":"79927398713","status":"PROCESSED"}"#;
        assert_eq!(
            classify(StatusCode::OK, None, body),
            AccrualOutcome::Resolved(Resolution::Processed { accrual: dec!(0) })
        );
    }

    #[test]
    fn invalid_resolves_without_points() {
        let body = br#"{"order":"79927398713","status":"INVALID"}"#;
        assert_eq!(
            classify(StatusCode::OK, None, body),
            AccrualOutcome::Resolved(Resolution::Invalid)
        );
    }

    #[test]
    fn rate_limit_reads_retry_after_seconds() {
        assert_eq!(
            classify(StatusCode::TOO_MANY_REQUESTS, Some("2"), b""),
            AccrualOutcome::RateLimited {
                retry_after: Some(Duration::from_secs(2))
            }
        );
        assert_eq!(
            classify(
                StatusCode::TOO_MANY_REQUESTS,
                Some("Wed, 21 Oct 2015 07:28:00 GMT"),
                b""
            ),
            AccrualOutcome::RateLimited { retry_after: None }
        );
        assert_eq!(
            classify(StatusCode::TOO_MANY_REQUESTS, None, b""),
            AccrualOutcome::RateLimited { retry_after: None }
        );
    }

    #[test]
    fn everything_else_is_a_service_error() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::NOT_FOUND,
            StatusCode::BAD_GATEWAY,
        ] {
            assert!(matches!(
                classify(status, None, b""),
                AccrualOutcome::ServiceError { .. }
            ));
        }
        assert!(matches!(
            classify(StatusCode::OK, None, b"not json"),
            AccrualOutcome::ServiceError { .. }
        ));
        assert!(matches!(
            classify(
                StatusCode::OK,
                None,
                br#"{"order":"1","status":"PROCESSED","accrual":-5}"#
            ),
            AccrualOutcome::ServiceError { .. }
        ));
    }

    #[test]
    fn order_url_appends_path() {
        let number = OrderNumber::parse("79927398713").unwrap();
        assert_eq!(
            client("http://localhost:8081").order_url(&number).as_str(),
            "http://localhost:8081/api/orders/79927398713"
        );
        assert_eq!(
            client("http://host/accrual/").order_url(&number).as_str(),
            "http://host/accrual/api/orders/79927398713"
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_a_service_error() {
        let client = client("http://127.0.0.1:1");
        let number = OrderNumber::parse("79927398713").unwrap();
        assert!(matches!(
            client.query(&number).await,
            AccrualOutcome::ServiceError { .. }
        ));
    }
}
