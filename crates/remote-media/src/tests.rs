// SPDX-FileCopyrightText: Copyright (C) 2018-2026 Uwe Klotz <uwedotklotzatgmaildotcom> et al.
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

use crate::{
    RemoteDescriptor, RetryConfig,
    client::{DescriptorResponseBody, backoff_delay, is_allowed_proxy_url, transient_status},
};

#[test]
fn classify_transient_statuses() {
    assert_eq!(
        Some(true),
        transient_status(StatusCode::INTERNAL_SERVER_ERROR)
    );
    assert_eq!(Some(true), transient_status(StatusCode::BAD_GATEWAY));
    assert_eq!(
        Some(true),
        transient_status(StatusCode::SERVICE_UNAVAILABLE)
    );
    assert_eq!(Some(true), transient_status(StatusCode::TOO_MANY_REQUESTS));
}

#[test]
fn classify_fatal_statuses() {
    assert_eq!(Some(false), transient_status(StatusCode::UNAUTHORIZED));
    assert_eq!(Some(false), transient_status(StatusCode::FORBIDDEN));
    assert_eq!(Some(false), transient_status(StatusCode::BAD_REQUEST));
    assert_eq!(
        Some(false),
        transient_status(StatusCode::UNSUPPORTED_MEDIA_TYPE)
    );
    assert_eq!(Some(false), transient_status(StatusCode::NOT_FOUND));
}

#[test]
fn classify_success_statuses() {
    assert_eq!(None, transient_status(StatusCode::OK));
    assert_eq!(None, transient_status(StatusCode::CREATED));
    assert_eq!(None, transient_status(StatusCode::NO_CONTENT));
}

#[test]
fn backoff_doubles_and_caps() {
    let retry = RetryConfig {
        base_delay: Duration::from_secs(1),
        max_delay: Duration::from_secs(8),
        ..Default::default()
    };
    // The jitter stays within [delay/2, delay] of the deterministic,
    // capped delay.
    for (attempt, expected_max) in [(1u32, 1u64), (2, 2), (3, 4), (4, 8), (5, 8), (20, 8)] {
        let expected_max = Duration::from_secs(expected_max);
        for _ in 0..10 {
            let delay = backoff_delay(&retry, attempt);
            assert!(delay >= expected_max / 2, "attempt {attempt}: {delay:?}");
            assert!(delay <= expected_max, "attempt {attempt}: {delay:?}");
        }
    }
}

fn endpoint_url() -> Url {
    "https://media.example.org/wp-json/wp/v2/media"
        .parse()
        .unwrap()
}

fn allowed(url: &str) -> bool {
    is_allowed_proxy_url(&url.parse().unwrap(), &endpoint_url())
}

#[test]
fn proxy_allows_store_host_and_subdomains() {
    assert!(allowed("https://media.example.org/uploads/2026/08/x.jpg"));
    assert!(allowed("http://media.example.org/x.jpg"));
    assert!(allowed("https://cdn.media.example.org/x.jpg"));
}

#[test]
fn proxy_refuses_foreign_hosts() {
    assert!(!allowed("https://other.example.com/x.jpg"));
    // Suffix of the label, not a subdomain
    assert!(!allowed("https://evilmedia.example.org.attacker.net/x.jpg"));
    assert!(!allowed("ftp://media.example.org/x.jpg"));
}

#[test]
fn proxy_refuses_private_address_space() {
    assert!(!allowed("http://localhost/x.jpg"));
    assert!(!allowed("http://127.0.0.1/x.jpg"));
    assert!(!allowed("http://10.0.0.7/x.jpg"));
    assert!(!allowed("http://192.168.1.1/x.jpg"));
    assert!(!allowed("http://169.254.169.254/latest/meta-data"));
    assert!(!allowed("http://metadata.google.internal/computeMetadata"));
}

#[test]
fn descriptor_from_complete_response() {
    let body: DescriptorResponseBody = serde_json::from_value(serde_json::json!({
        "id": 4711,
        "source_url": "https://media.example.org/uploads/full.jpg",
        "media_details": {
            "sizes": {
                "thumbnail": { "source_url": "https://media.example.org/uploads/thumb.jpg" },
                "medium": { "source_url": "https://media.example.org/uploads/medium.jpg" },
            },
        },
    }))
    .unwrap();
    let descriptor = RemoteDescriptor::from(body);
    assert_eq!(descriptor.remote_id.to_inner(), 4711);
    assert_eq!(
        descriptor.delivery.thumbnail.as_str(),
        "https://media.example.org/uploads/thumb.jpg"
    );
    assert_eq!(
        descriptor.delivery.medium.as_str(),
        "https://media.example.org/uploads/medium.jpg"
    );
    assert_eq!(
        descriptor.delivery.full.as_str(),
        "https://media.example.org/uploads/full.jpg"
    );
}

#[test]
fn descriptor_falls_back_to_full_resolution() {
    // Small uploads don't get downscaled size variants
    let body: DescriptorResponseBody = serde_json::from_value(serde_json::json!({
        "id": 4712,
        "source_url": "https://media.example.org/uploads/tiny.jpg",
    }))
    .unwrap();
    let descriptor = RemoteDescriptor::from(body);
    assert_eq!(
        descriptor.delivery.thumbnail.as_str(),
        "https://media.example.org/uploads/tiny.jpg"
    );
    assert_eq!(
        descriptor.delivery.medium.as_str(),
        "https://media.example.org/uploads/tiny.jpg"
    );
}

#[test]
fn reject_malformed_descriptor() {
    let result: Result<DescriptorResponseBody, _> = serde_json::from_value(serde_json::json!({
        "source_url": "https://media.example.org/uploads/x.jpg",
    }));
    assert!(result.is_err());
}
