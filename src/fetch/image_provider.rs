//! Worker pool that fetches and decodes local image files.
//!
//! - Bounded worker pool (1-4 threads) fed through a flume queue
//! - Small LRU memory cache of decoded images keyed by identifier hash
//! - Cancellation token checked before and after each decode
//!
//! The request queue is unbounded. Live fetches are capped by the window
//! cache at `2 * radius + 1`; cancelled requests are dropped on dequeue.

use std::io::Cursor;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use flume::{Receiver, Sender};
use image::ImageReader;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};
use xxhash_rust::xxh3::xxh3_64;

use super::{CancellationHandle, Completion, FetchProvider};
use crate::config::{DEFAULT_MEMORY_ENTRIES, DEFAULT_WORKERS, MAX_WORKERS};
use crate::error::FetchError;
use crate::models::MediaType;

/// How long an idle worker waits before re-checking the shutdown flag.
const WORKER_POLL_MS: u64 = 100;

/// Decoded RGBA8 pixels.
pub struct DecodedImage {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub media_type: Option<MediaType>,
}

impl DecodedImage {
    pub fn mem_size(&self) -> usize {
        self.rgba.len()
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("media_type", &self.media_type)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

pub type ImagePayload = Arc<DecodedImage>;

type MemoryCache = Arc<Mutex<LruCache<u64, ImagePayload>>>;

struct DecodeRequest {
    identifier: String,
    cancel: CancellationHandle,
    completion: Completion<ImagePayload>,
}

/// Decodes `file://` URLs and plain paths on background threads.
pub struct ImageFileProvider {
    request_tx: Sender<DecodeRequest>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    memory_cache: MemoryCache,
}

impl ImageFileProvider {
    fn start(workers: usize, memory_entries: usize) -> Result<Self> {
        let num_workers = workers.clamp(1, MAX_WORKERS);
        let capacity = NonZeroUsize::new(memory_entries.max(1))
            .context("memory cache capacity must be non-zero")?;

        let (request_tx, request_rx) = flume::unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let memory_cache: MemoryCache = Arc::new(Mutex::new(LruCache::new(capacity)));

        let mut handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let rx = request_rx.clone();
            let shutdown = Arc::clone(&shutdown);
            let cache = Arc::clone(&memory_cache);

            let handle = thread::Builder::new()
                .name(format!("decode-worker-{}", worker_id))
                .spawn(move || worker_loop(worker_id, rx, shutdown, cache))
                .context("Failed to spawn decode worker")?;
            handles.push(handle);
        }

        debug!(num_workers, memory_entries, "Started image decode workers");

        Ok(Self {
            request_tx,
            workers: handles,
            shutdown,
            memory_cache,
        })
    }

    /// Number of decoded images currently held in the memory cache.
    pub fn memory_entry_count(&self) -> usize {
        self.memory_cache.lock().len()
    }

    pub fn shutdown(&mut self) {
        debug!("Shutting down image decode workers");
        self.shutdown.store(true, Ordering::SeqCst);
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        debug!("Image decode workers stopped");
    }
}

impl FetchProvider for ImageFileProvider {
    type Payload = ImagePayload;

    fn fetch(&self, identifier: &str, on_complete: Completion<ImagePayload>) -> CancellationHandle {
        let cancel = CancellationHandle::new();

        let cached = self.memory_cache.lock().get(&xxh3_64(identifier.as_bytes())).cloned();
        if let Some(image) = cached {
            trace!(identifier, "Memory cache hit");
            on_complete(Ok(image));
            return cancel;
        }

        let req = DecodeRequest {
            identifier: identifier.to_string(),
            cancel: cancel.clone(),
            completion: on_complete,
        };

        if let Err(flume::SendError(req)) = self.request_tx.send(req) {
            error!("Decode queue disconnected");
            (req.completion)(Err(FetchError::new(identifier, "decode workers stopped")));
        }
        cancel
    }
}

impl Drop for ImageFileProvider {
    fn drop(&mut self) {
        if !self.shutdown.load(Ordering::Relaxed) {
            self.shutdown();
        }
    }
}

fn worker_loop(
    worker_id: usize,
    rx: Receiver<DecodeRequest>,
    shutdown: Arc<AtomicBool>,
    cache: MemoryCache,
) {
    debug!(worker_id, "Decode worker started");

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match rx.recv_timeout(Duration::from_millis(WORKER_POLL_MS)) {
            Ok(req) => {
                if req.cancel.is_cancelled() {
                    trace!(worker_id, identifier = %req.identifier, "Skipping cancelled fetch");
                    continue;
                }
                process_request(req, &cache);
            }
            Err(flume::RecvTimeoutError::Timeout) => continue,
            Err(flume::RecvTimeoutError::Disconnected) => break,
        }
    }

    debug!(worker_id, "Decode worker stopped");
}

fn process_request(req: DecodeRequest, cache: &MemoryCache) {
    trace!(identifier = %req.identifier, "Decoding image");

    let outcome = path_from_identifier(&req.identifier)
        .and_then(|path| decode_file(&path))
        .map(|decoded| {
            let image = Arc::new(decoded);
            cache
                .lock()
                .put(xxh3_64(req.identifier.as_bytes()), Arc::clone(&image));
            image
        });

    // Cached even when cancelled; a later fetch of the same file is a hit.
    if req.cancel.is_cancelled() {
        trace!(identifier = %req.identifier, "Dropping result of cancelled fetch");
        return;
    }

    match outcome {
        Ok(image) => (req.completion)(Ok(image)),
        Err(e) => {
            warn!(identifier = %req.identifier, error = ?e, "Failed to decode image");
            (req.completion)(Err(FetchError::new(req.identifier.as_str(), format!("{e:#}"))));
        }
    }
}

/// Accepts plain paths and `file://` URLs.
pub fn path_from_identifier(identifier: &str) -> Result<PathBuf> {
    if let Some(rest) = identifier.strip_prefix("file://") {
        return Ok(PathBuf::from(rest));
    }
    if let Some((scheme, _)) = identifier.split_once("://") {
        bail!("unsupported scheme: {scheme}");
    }
    Ok(PathBuf::from(identifier))
}

/// Decode a file to RGBA8. Animated GIFs yield their first frame.
///
/// The format is sniffed from the content; the extension is only used when
/// the bytes are not recognised.
fn decode_file(path: &Path) -> Result<DecodedImage> {
    let media_type = MediaType::from_path(path);
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read image: {:?}", path))?;

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("Failed to sniff image format")?;
    if reader.format().is_none() {
        if let Some(media) = media_type {
            reader.set_format(media.image_format());
        }
    }

    let rgba = reader
        .decode()
        .with_context(|| format!("Failed to decode image: {:?}", path))?
        .into_rgba8();
    Ok(DecodedImage {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
        media_type,
    })
}

/// Builder for ImageFileProvider with configuration options.
pub struct ImageFileProviderBuilder {
    workers: usize,
    memory_entries: usize,
}

impl ImageFileProviderBuilder {
    pub fn new() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            memory_entries: DEFAULT_MEMORY_ENTRIES,
        }
    }

    pub fn workers(mut self, count: usize) -> Self {
        self.workers = count;
        self
    }

    pub fn memory_entries(mut self, entries: usize) -> Self {
        self.memory_entries = entries;
        self
    }

    pub fn build(self) -> Result<ImageFileProvider> {
        ImageFileProvider::start(self.workers, self.memory_entries)
    }
}

impl Default for ImageFileProviderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
