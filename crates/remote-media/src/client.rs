// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::time::Duration;

use bytes::Bytes;
use mime::Mime;
use rand::Rng as _;
use reqwest::{
    Response, StatusCode,
    multipart::{Form, Part},
};
use serde::Deserialize;
use url::Url;

use lumina_core::{
    asset::{DeliveryUrls, RemoteMediaId},
    util::random::adhoc_rng,
};

use crate::{Config, DeleteOutcome, Error, RemoteDescriptor, Result, RetryConfig};

/// Client for the remote media store.
///
/// Owns a single pooled, keep-alive HTTP client. Bulk operations
/// issue dozens of remote calls in quick succession; reusing
/// connections instead of opening one per call is what makes them
/// bearable.
#[derive(Debug)]
pub struct RemoteMediaClient {
    http: reqwest::Client,
    config: Config,
}

/// How a failed attempt affects the retry loop.
#[derive(Debug)]
enum AttemptFailure {
    /// Worth retrying, optionally after a server-supplied delay.
    Transient {
        retry_after: Option<Duration>,
        message: String,
    },
    /// Retrying would not change the outcome.
    Fatal(Error),
}

/// Classify an HTTP response status.
///
/// `None` = success, `Some(true)` = transient, `Some(false)` = fatal.
pub(crate) fn transient_status(status: StatusCode) -> Option<bool> {
    if status.is_success() {
        return None;
    }
    let transient = matches!(
        status,
        StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::TOO_MANY_REQUESTS
    );
    Some(transient)
}

fn retry_after_hint(response: &Response) -> Option<Duration> {
    let value = response.headers().get(reqwest::header::RETRY_AFTER)?;
    let seconds = value.to_str().ok()?.trim().parse().ok()?;
    Some(Duration::from_secs(seconds))
}

/// Exponential backoff with jitter.
///
/// `attempt` counts the failed attempts so far, starting at 1. The
/// jitter spreads concurrent retries over the second half of the
/// deterministic delay.
pub(crate) fn backoff_delay(retry: &RetryConfig, attempt: u32) -> Duration {
    debug_assert!(attempt >= 1);
    let doubled = retry
        .base_delay
        .saturating_mul(1u32 << (attempt - 1).min(16));
    let capped = doubled.min(retry.max_delay);
    let half = capped / 2;
    half + adhoc_rng().random_range(Duration::ZERO..=half)
}

/// Whether a URL may be fetched on behalf of a client.
///
/// Only the configured remote store's host (or a subdomain of it) is
/// allowed; everything resolving to loopback, private, or link-local
/// address space is refused outright. Prevents this component from
/// being used as an open proxy.
pub(crate) fn is_allowed_proxy_url(url: &Url, endpoint_url: &Url) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    const BLOCKED_HOSTS: &[&str] = &[
        "localhost",
        "127.0.0.1",
        "0.0.0.0",
        "::1",
        "[::1]",
        "metadata.google.internal",
    ];
    if BLOCKED_HOSTS.contains(&host.as_str()) {
        return false;
    }
    if host.starts_with("10.") || host.starts_with("192.168.") || host.starts_with("169.254.") {
        return false;
    }
    let Some(allowed) = endpoint_url.host_str() else {
        return false;
    };
    let allowed = allowed.to_ascii_lowercase();
    host == allowed || host.ends_with(&format!(".{allowed}"))
}

/// Wire format of a media descriptor response, reduced to the fields
/// the contract requires.
#[derive(Debug, Deserialize)]
pub(crate) struct DescriptorResponseBody {
    id: i64,
    source_url: Url,
    #[serde(default)]
    media_details: MediaDetailsBody,
}

#[derive(Debug, Default, Deserialize)]
struct MediaDetailsBody {
    #[serde(default)]
    sizes: SizesBody,
}

#[derive(Debug, Default, Deserialize)]
struct SizesBody {
    thumbnail: Option<SizeVariantBody>,
    medium: Option<SizeVariantBody>,
}

#[derive(Debug, Deserialize)]
struct SizeVariantBody {
    source_url: Url,
}

impl From<DescriptorResponseBody> for RemoteDescriptor {
    fn from(from: DescriptorResponseBody) -> Self {
        let DescriptorResponseBody {
            id,
            source_url,
            media_details,
        } = from;
        // Sizes below the original resolution are not generated for
        // small uploads. Fall back to the full-resolution URL then.
        let thumbnail = media_details
            .sizes
            .thumbnail
            .map_or_else(|| source_url.clone(), |variant| variant.source_url);
        let medium = media_details
            .sizes
            .medium
            .map_or_else(|| source_url.clone(), |variant| variant.source_url);
        Self {
            remote_id: RemoteMediaId::new(id),
            delivery: DeliveryUrls {
                thumbnail,
                medium,
                full: source_url,
            },
        }
    }
}

async fn response_failure(response: Response, transient: bool) -> AttemptFailure {
    let status = response.status();
    let retry_after = retry_after_hint(&response);
    let body_excerpt: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(200)
        .collect();
    let message = format!("{status}: {body_excerpt}");
    if transient {
        AttemptFailure::Transient {
            retry_after,
            message,
        }
    } else {
        AttemptFailure::Fatal(Error::Rejected {
            status: Some(status),
            message,
        })
    }
}

fn transport_failure(err: &reqwest::Error) -> AttemptFailure {
    // Everything below the HTTP layer (connect failures, resets,
    // timeouts) is worth retrying; the request never reached the
    // store or the response never came back.
    AttemptFailure::Transient {
        retry_after: None,
        message: err.to_string(),
    }
}

impl RemoteMediaClient {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|err| Error::Other(err.into()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    async fn run_with_retry<MakeRequest>(
        &self,
        operation: &str,
        make_request: MakeRequest,
    ) -> Result<Response>
    where
        MakeRequest: Fn() -> Result<reqwest::RequestBuilder>,
    {
        let max_attempts = self.config.retry.max_attempts.get();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = make_request()?
                .basic_auth(&self.config.username, Some(&self.config.password))
                .send()
                .await;
            let failure = match result {
                Ok(response) => match transient_status(response.status()) {
                    None => return Ok(response),
                    Some(transient) => response_failure(response, transient).await,
                },
                Err(err) => transport_failure(&err),
            };
            let (retry_after, message) = match failure {
                AttemptFailure::Fatal(err) => return Err(err),
                AttemptFailure::Transient {
                    retry_after,
                    message,
                } => (retry_after, message),
            };
            if attempt >= max_attempts {
                return Err(Error::Unavailable {
                    attempts: attempt,
                    message,
                });
            }
            let delay = retry_after.unwrap_or_else(|| backoff_delay(&self.config.retry, attempt));
            log::warn!(
                "Attempt {attempt}/{max_attempts} of {operation} failed ({message}), \
                 retrying in {delay:?}"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Upload a prepared binary.
    ///
    /// Returns the descriptor assigned by the remote store, including
    /// the delivery URLs for all generated resolutions.
    pub async fn upload(
        &self,
        data: Bytes,
        file_name: &str,
        media_type: &Mime,
    ) -> Result<RemoteDescriptor> {
        let endpoint_url = self.config.endpoint_url.clone();
        let file_name = file_name.to_owned();
        let media_type = media_type.to_string();
        let response = self
            .run_with_retry("upload", || {
                // The form cannot be reused across attempts and is
                // rebuilt from the shared payload bytes instead.
                let part = Part::stream(reqwest::Body::from(data.clone()))
                    .file_name(file_name.clone())
                    .mime_str(&media_type)
                    .map_err(|err| Error::Rejected {
                        status: None,
                        message: format!("invalid media type \"{media_type}\": {err}"),
                    })?;
                Ok(self
                    .http
                    .post(endpoint_url.clone())
                    .multipart(Form::new().part("file", part)))
            })
            .await?;
        let status = response.status();
        let body: DescriptorResponseBody =
            response.json().await.map_err(|err| Error::Rejected {
                status: Some(status),
                message: format!("malformed upload response: {err}"),
            })?;
        Ok(body.into())
    }

    /// Remove an object from the remote store.
    pub async fn delete(&self, remote_id: RemoteMediaId) -> Result<DeleteOutcome> {
        let mut url = self.config.endpoint_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| anyhow::anyhow!("endpoint URL cannot be a base"))?;
            segments.push(&remote_id.to_string());
        }
        url.set_query(Some("force=true"));
        let result = self
            .run_with_retry("delete", || Ok(self.http.delete(url.clone())))
            .await;
        match result {
            Ok(_) => Ok(DeleteOutcome::Deleted),
            Err(Error::Rejected {
                status: Some(status),
                ..
            }) if status == StatusCode::NOT_FOUND || status == StatusCode::GONE => {
                log::debug!("Remote object {remote_id} was already gone");
                Ok(DeleteOutcome::AlreadyGone)
            }
            Err(err) => Err(err),
        }
    }

    /// Re-fetch the descriptor of an existing object.
    ///
    /// Used by the URL repair path when the cached delivery URLs have
    /// become stale. The remote id is the join key between the local
    /// cache and the remote store's namespace.
    pub async fn fetch_descriptor(&self, remote_id: RemoteMediaId) -> Result<RemoteDescriptor> {
        let mut url = self.config.endpoint_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| anyhow::anyhow!("endpoint URL cannot be a base"))?;
            segments.push(&remote_id.to_string());
        }
        let response = self
            .run_with_retry("fetch descriptor", || Ok(self.http.get(url.clone())))
            .await?;
        let status = response.status();
        let body: DescriptorResponseBody =
            response.json().await.map_err(|err| Error::Rejected {
                status: Some(status),
                message: format!("malformed descriptor response: {err}"),
            })?;
        Ok(body.into())
    }

    /// Pass a download through on behalf of a client.
    ///
    /// Restricted to the configured remote store's host. The response
    /// body is returned as a stream and never buffered here.
    pub async fn fetch_for_proxy(&self, url: &Url) -> Result<Response> {
        if !is_allowed_proxy_url(url, &self.config.endpoint_url) {
            return Err(Error::ForeignHost { url: url.clone() });
        }
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|err| Error::Unavailable {
                attempts: 1,
                message: err.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Rejected {
                status: Some(status),
                message: "proxy download failed".to_owned(),
            });
        }
        Ok(response)
    }
}

