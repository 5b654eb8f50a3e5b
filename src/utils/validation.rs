//! Form input parsing
//!
//! Entries are not checked beyond trimming: anything yt-dlp rejects fails like
//! any other download error.

use crate::core::models::{DownloadRequest, MediaFormat};

/// Split comma-separated form input into trimmed, non-empty URLs
pub fn parse_url_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turn form input into download requests for one format
pub fn build_requests(input: &str, format: MediaFormat) -> Vec<DownloadRequest> {
    parse_url_list(input)
        .into_iter()
        .map(|url| DownloadRequest::new(url, format))
        .collect()
}
