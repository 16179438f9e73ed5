//! ASN file upload with transfer progress reporting.

use futures::Stream;
use reqwest::{Body, StatusCode, multipart};
use serde::Deserialize;

use super::{client::ApiClient, error::ApiError};
use crate::models::{Order, UploadResult, ValidationDetail, ValidationError};

/// Upload body chunk size. Small enough that progress moves visibly,
/// large enough to keep per-chunk overhead negligible.
const CHUNK_SIZE: usize = 64 * 1024;

/// Endpoint for ASN uploads. The `?files` query is part of the API
/// contract, not a parameter.
const UPLOAD_PATH: &str = "/inventory/ocs/asn/upload?files";

/// Integer transfer percentage in [0,100].
fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        100
    } else {
        ((sent * 100) / total).min(100) as u8
    }
}

/// MIME type for the accepted spreadsheet extensions.
fn mime_for(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".csv") {
        "text/csv"
    } else if lower.ends_with(".xls") {
        "application/vnd.ms-excel"
    } else if lower.ends_with(".xlsx") {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    } else {
        "application/octet-stream"
    }
}

/// Turn the file bytes into a chunked stream that reports cumulative
/// progress as each chunk is pulled by the transport. Reports are
/// monotone for a single upload because chunks are consumed in order.
fn progress_stream(
    bytes: Vec<u8>,
    on_progress: impl Fn(u8) + Send + Sync + 'static,
) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + 'static {
    let total = bytes.len() as u64;
    let chunks: Vec<Vec<u8>> = bytes.chunks(CHUNK_SIZE).map(|c| c.to_vec()).collect();
    let mut sent = 0u64;
    futures::stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len() as u64;
        on_progress(percent(sent, total));
        Ok(chunk)
    }))
}

/// Rejection body shape: `message` and/or `details`, both optional.
#[derive(Debug, Deserialize)]
struct RejectBody {
    message: Option<String>,
    #[serde(default)]
    details: Vec<ValidationDetail>,
}

/// Classify a non-2xx upload response. A body carrying a validation
/// payload becomes `ApiError::Validation`; anything else stays a plain
/// status error.
fn parse_rejection(status: StatusCode, body: &str) -> ApiError {
    if let Ok(reject) = serde_json::from_str::<RejectBody>(body)
        && (reject.message.is_some() || !reject.details.is_empty())
    {
        return ApiError::Validation(ValidationError {
            message: reject.message.unwrap_or_else(|| "Validation Error".into()),
            details: reject.details,
        });
    }
    ApiError::Status {
        status,
        body: body.to_string(),
    }
}

/// Upload one ASN file to the given store.
///
/// `on_progress` fires zero or more times with an increasing percentage
/// while the body streams out; the caller decides what to do with the
/// reports (the worker forwards them to the UI loop).
pub async fn upload_file(
    client: &ApiClient,
    file_name: &str,
    bytes: Vec<u8>,
    store_id: &str,
    on_progress: impl Fn(u8) + Send + Sync + 'static,
) -> Result<Order, ApiError> {
    let total = bytes.len() as u64;
    tracing::info!("upload start: {file_name} ({total} bytes, store {store_id})");

    let body = Body::wrap_stream(progress_stream(bytes, on_progress));
    let part = multipart::Part::stream_with_length(body, total)
        .file_name(file_name.to_string())
        .mime_str(mime_for(file_name))?;
    let form = multipart::Form::new()
        .part("file", part)
        .text("store", store_id.to_string());

    let resp = client.post(UPLOAD_PATH).multipart(form).send().await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!("upload rejected: {file_name}: {status}");
        return Err(parse_rejection(status, &body));
    }

    let result = resp.json::<UploadResult>().await?;
    tracing::info!("upload done: {file_name} -> asn {}", result.order.asn_id);
    Ok(result.order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::sync::{Arc, Mutex};

    #[test]
    fn percent_is_clamped_and_handles_empty() {
        assert_eq!(percent(0, 100), 0);
        assert_eq!(percent(50, 100), 50);
        assert_eq!(percent(100, 100), 100);
        assert_eq!(percent(0, 0), 100);
    }

    #[test]
    fn mime_matches_accepted_extensions() {
        assert_eq!(mime_for("plan.csv"), "text/csv");
        assert_eq!(mime_for("PLAN.XLS"), "application/vnd.ms-excel");
        assert_eq!(
            mime_for("plan.xlsx"),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }

    #[tokio::test]
    async fn stream_reports_monotone_progress_and_preserves_bytes() {
        // Three full chunks plus a tail.
        let data: Vec<u8> = (0..(CHUNK_SIZE * 3 + 123)).map(|i| (i % 251) as u8).collect();
        let reports = Arc::new(Mutex::new(Vec::<u8>::new()));
        let sink = reports.clone();

        let chunks: Vec<_> = progress_stream(data.clone(), move |pct| {
            sink.lock().unwrap().push(pct);
        })
        .collect()
        .await;

        let mut collected = Vec::new();
        for c in chunks {
            collected.extend(c.unwrap());
        }
        assert_eq!(collected, data);

        let reports = reports.lock().unwrap();
        assert!(!reports.is_empty());
        assert!(reports.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*reports.last().unwrap(), 100);
        assert!(reports.iter().all(|&p| p <= 100));
    }

    #[test]
    fn rejection_with_payload_becomes_validation_error() {
        let err = parse_rejection(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"invalid file","details":[{"field":"sku","description":"row 2"}]}"#,
        );
        match err {
            ApiError::Validation(v) => {
                assert_eq!(v.message, "invalid file");
                assert_eq!(v.details.len(), 1);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejection_with_details_only_gets_default_message() {
        let err = parse_rejection(
            StatusCode::BAD_REQUEST,
            r#"{"details":[{"field":"file","description":"empty"}]}"#,
        );
        match err {
            ApiError::Validation(v) => assert_eq!(v.message, "Validation Error"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn unstructured_rejection_stays_a_status_error() {
        let err = parse_rejection(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, ApiError::Status { .. }));
    }
}
