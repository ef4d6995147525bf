//! Parse API responses: metadata JSON, error bodies, media headers.

use serde::Deserialize;

use super::{ApiError, ObjectMetadata};

/// Headers of a media response that matter for chunk accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MediaHeaders {
    pub content_range: Option<ContentRange>,
    pub content_length: Option<u64>,
}

/// `Content-Range: bytes <first>-<last>/<total>` or `bytes */<total>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ContentRange {
    pub range: Option<(u64, u64)>,
    pub total: Option<u64>,
}

/// Parse collected header lines. Only the last response's headers count
/// (curl reports every hop when following redirects).
pub(crate) fn parse_media_headers(lines: &[String]) -> MediaHeaders {
    let mut headers = MediaHeaders::default();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            headers = MediaHeaders::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-range") {
                headers.content_range = parse_content_range(value);
            }
            if name.eq_ignore_ascii_case("content-length") {
                headers.content_length = value.parse::<u64>().ok();
            }
        }
    }
    headers
}

pub(crate) fn parse_content_range(value: &str) -> Option<ContentRange> {
    let rest = value.trim().strip_prefix("bytes")?.trim_start();
    let (range, total) = rest.split_once('/')?;
    let total = match total.trim() {
        "*" => None,
        t => Some(t.parse::<u64>().ok()?),
    };
    let range = match range.trim() {
        "*" => None,
        r => {
            let (first, last) = r.split_once('-')?;
            Some((first.trim().parse().ok()?, last.trim().parse().ok()?))
        }
    };
    Some(ContentRange { range, total })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeField {
    Text(String),
    Number(u64),
}

#[derive(Deserialize)]
struct FileResource {
    name: Option<String>,
    size: Option<SizeField>,
}

/// Parse a `files.get` response (`{"name": "...", "size": "123"}`).
pub(crate) fn parse_metadata(body: &[u8]) -> Result<ObjectMetadata, ApiError> {
    let resource: FileResource =
        serde_json::from_slice(body).map_err(|e| ApiError::Metadata(e.to_string()))?;
    let size = match resource.size {
        Some(SizeField::Number(n)) => n,
        Some(SizeField::Text(s)) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| ApiError::Metadata(format!("invalid size {:?}", s)))?,
        None => {
            return Err(ApiError::Metadata(
                "no size (folders and native documents cannot be downloaded)".to_string(),
            ))
        }
    };
    Ok(ObjectMetadata {
        name: resource.name.unwrap_or_default(),
        size,
    })
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Extract `error.message` from an API error body, if it has one.
pub(crate) fn parse_error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| b.error.message)
}
