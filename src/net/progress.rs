//! Upload progress reporting.
//!
//! The transport reports raw `(loaded, total)` byte counts; callers of
//! `ApiClient::upload` receive whole percentages.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::{Stream, StreamExt};

/// Chunk size used when streaming multipart parts.
pub const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub loaded: u64,
    pub total: u64,
}

impl ProgressEvent {
    #[must_use]
    pub fn percent(self) -> u8 {
        percent(self.loaded, self.total)
    }
}

/// Raw byte-count listener handed to a transport.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Percentage listener handed to `ApiClient::upload`. Called from whichever
/// task polls the request body, so it must be `Send + Sync`.
pub type ProgressCallback = Arc<dyn Fn(u8) + Send + Sync>;

/// `round(loaded * 100 / total)`, clamped to 100. A zero total is complete.
#[must_use]
pub fn percent(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let (loaded, total) = (u128::from(loaded), u128::from(total));
    let rounded = (loaded * 200 + total) / (total * 2);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

/// Adapt a percentage callback into a raw event sink.
#[must_use]
pub fn percent_sink(callback: ProgressCallback) -> ProgressSink {
    Arc::new(move |event: ProgressEvent| callback(event.percent()))
}

/// Split `bytes` into chunks, bumping the shared `loaded` counter and firing
/// `sink` as each chunk is handed to the transport.
pub fn counted_chunks(
    bytes: Vec<u8>,
    loaded: Arc<AtomicU64>,
    total: u64,
    sink: Option<ProgressSink>,
) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send + Sync + 'static {
    let chunks: Vec<Vec<u8>> = bytes.chunks(UPLOAD_CHUNK_BYTES).map(<[u8]>::to_vec).collect();
    futures_util::stream::iter(chunks).map(move |chunk| {
        let len = chunk.len() as u64;
        let now = loaded.fetch_add(len, Ordering::SeqCst) + len;
        if let Some(sink) = &sink {
            sink(ProgressEvent { loaded: now, total });
        }
        Ok::<_, std::io::Error>(chunk)
    })
}

#[cfg(test)]
#[path = "progress_test.rs"]
mod tests;
