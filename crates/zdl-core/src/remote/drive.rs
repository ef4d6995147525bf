//! Files API client over libcurl (the `curl` crate).
//!
//! Metadata: `GET {base}/drive/v3/files/{id}?fields=name,size`.
//! Media: `GET {base}/drive/v3/files/{id}?alt=media` with `Range: bytes=a-b`.
//! Runs in the current thread; call from `spawn_blocking` if used from async code.

use std::io::Write;
use std::str;
use std::time::Duration;
use url::Url;

use super::parse::{parse_error_message, parse_media_headers, parse_metadata};
use super::{ApiError, ObjectMetadata, ObjectSource, RangeResponse};
use crate::config::ApiConfig;

/// Raw response of one request.
struct Response {
    code: u32,
    headers: Vec<String>,
    body: Vec<u8>,
}

impl Response {
    fn into_http_error(self) -> ApiError {
        ApiError::Http {
            code: self.code,
            message: parse_error_message(&self.body),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DriveClient {
    base_url: Url,
    access_token: Option<String>,
    api_key: Option<String>,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl DriveClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        let defaults = ApiConfig::default();
        Ok(Self {
            base_url,
            access_token: None,
            api_key: None,
            connect_timeout: Duration::from_secs(defaults.connect_timeout_secs),
            request_timeout: Duration::from_secs(defaults.request_timeout_secs),
        })
    }

    pub fn from_config(cfg: &ApiConfig) -> Result<Self, ApiError> {
        let mut client = Self::new(&cfg.base_url)?;
        client.access_token = cfg.access_token.clone().filter(|t| !t.is_empty());
        client.api_key = cfg.api_key.clone().filter(|k| !k.is_empty());
        client.connect_timeout = Duration::from_secs(cfg.connect_timeout_secs);
        client.request_timeout = Duration::from_secs(cfg.request_timeout_secs);
        Ok(client)
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// `{base}/drive/v3/files/{id}?...` with the given query pairs.
    fn file_url(&self, object_id: &str, query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["drive", "v3", "files", object_id]);
        }
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("supportsAllDrives", "true");
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }
        url
    }

    fn get(&self, url: &Url, range: Option<(u64, u64)>) -> Result<Response, ApiError> {
        let mut headers: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.request_timeout)?;

        // Range: curl expects "start-end" (inclusive), not "bytes=start-end"
        if let Some((start, end)) = range {
            easy.range(&format!("{}-{}", start, end))?;
        }
        if let Some(token) = &self.access_token {
            let mut list = curl::easy::List::new();
            list.append(&format!("Authorization: Bearer {}", token))?;
            easy.http_headers(list)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        tracing::debug!(code, bytes = body.len(), ?range, "GET {}", url.path());
        Ok(Response {
            code,
            headers,
            body,
        })
    }
}

impl ObjectSource for DriveClient {
    fn metadata(&self, object_id: &str) -> Result<ObjectMetadata, ApiError> {
        let url = self.file_url(object_id, &[("fields", "name,size")]);
        let resp = self.get(&url, None)?;
        if !(200..300).contains(&resp.code) {
            return Err(resp.into_http_error());
        }
        parse_metadata(&resp.body)
    }

    fn fetch_range(
        &self,
        object_id: &str,
        start: u64,
        end: u64,
        sink: &mut dyn Write,
    ) -> Result<RangeResponse, ApiError> {
        let url = self.file_url(object_id, &[("alt", "media")]);
        let resp = self.get(&url, Some((start, end)))?;
        let headers = parse_media_headers(&resp.headers);

        let total = match resp.code {
            206 => {
                let cr = headers
                    .content_range
                    .ok_or_else(|| ApiError::Range("206 without Content-Range".to_string()))?;
                if let Some((first, _)) = cr.range {
                    if first != start {
                        return Err(ApiError::Range(format!(
                            "asked for offset {}, got {}",
                            start, first
                        )));
                    }
                }
                cr.total
                    .ok_or_else(|| ApiError::Range("unknown total size".to_string()))?
            }
            200 => {
                if start != 0 {
                    return Err(ApiError::Range(format!(
                        "server ignored range request at offset {}",
                        start
                    )));
                }
                resp.body.len() as u64
            }
            // Offset at or past the end: nothing to write, the body is an error document.
            416 => {
                let total = headers
                    .content_range
                    .and_then(|cr| cr.total)
                    .unwrap_or(start);
                return Ok(RangeResponse { received: 0, total });
            }
            _ => return Err(resp.into_http_error()),
        };
        if let Some(len) = headers.content_length {
            if len != resp.body.len() as u64 {
                return Err(ApiError::Range(format!(
                    "short body: {} of {} bytes",
                    resp.body.len(),
                    len
                )));
            }
        }

        sink.write_all(&resp.body).map_err(ApiError::Sink)?;
        Ok(RangeResponse {
            received: resp.body.len() as u64,
            total,
        })
    }
}
