// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Frame Source stage: serves ready-made images round-robin.
//!
//! The source set comes from a [`FrameStore`] and is loaded lazily: on the
//! first call, and again every time the cursor runs off the end of the set.
//! Images dropped into a directory therefore show up on the next cycle
//! without a restart. A call fails when the set is still empty after a
//! reload or when the current source cannot be read; in the latter case the
//! cursor has already moved on, so the next call serves the next source.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::errors::ServiceError;
use crate::observability::messages::stage::{FrameServed, SourcesReloaded};
use crate::observability::messages::StructuredLog;
use crate::proto::{Frame, Reply, RequestBody};
use crate::stages::contracts::expect_next_frame;
use crate::traits::OperationHandler;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Where frames come from. Sources are identified by opaque names.
#[async_trait]
pub trait FrameStore: Send + Sync {
    /// Human-readable description of the store, for logs.
    fn origin(&self) -> String;

    /// Current source names, in serving order.
    async fn list(&self) -> io::Result<Vec<String>>;

    async fn read(&self, source: &str) -> io::Result<Vec<u8>>;
}

/// PNG and JPEG files in one directory, served in file-name order.
pub struct DirectoryStore {
    directory: PathBuf,
}

impl DirectoryStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn is_image(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
            .unwrap_or(false)
    }
}

#[async_trait]
impl FrameStore for DirectoryStore {
    fn origin(&self) -> String {
        self.directory.display().to_string()
    }

    async fn list(&self) -> io::Result<Vec<String>> {
        // A missing drop directory is created rather than treated as an error.
        tokio::fs::create_dir_all(&self.directory).await?;

        let mut entries = tokio::fs::read_dir(&self.directory).await?;
        let mut sources = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && Self::is_image(&path) {
                sources.push(path.display().to_string());
            }
        }
        sources.sort();
        Ok(sources)
    }

    async fn read(&self, source: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(source).await
    }
}

/// A fixed list of named images held in memory.
pub struct MemoryStore {
    images: Vec<(String, Vec<u8>)>,
}

impl MemoryStore {
    pub fn new(images: Vec<(String, Vec<u8>)>) -> Self {
        Self { images }
    }
}

#[async_trait]
impl FrameStore for MemoryStore {
    fn origin(&self) -> String {
        "memory".to_string()
    }

    async fn list(&self) -> io::Result<Vec<String>> {
        Ok(self.images.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn read(&self, source: &str) -> io::Result<Vec<u8>> {
        self.images
            .iter()
            .find(|(name, _)| name == source)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, source.to_string()))
    }
}

#[derive(Default)]
struct Cursor {
    sources: Vec<String>,
    next: usize,
}

impl Cursor {
    fn needs_reload(&self) -> bool {
        self.next >= self.sources.len()
    }
}

/// `nextFrame` handler.
pub struct FrameSourceHandler {
    store: Arc<dyn FrameStore>,
    settings: HashMap<String, f64>,
    cursor: Mutex<Cursor>,
}

impl FrameSourceHandler {
    /// `settings` are the acquisition parameters attached to every frame.
    pub fn new(store: Arc<dyn FrameStore>, settings: HashMap<String, f64>) -> Self {
        Self {
            store,
            settings,
            cursor: Mutex::new(Cursor::default()),
        }
    }

    pub async fn next_frame(&self) -> Result<Frame, ServiceError> {
        let mut cursor = self.cursor.lock().await;

        if cursor.needs_reload() {
            self.reload(&mut cursor).await?;
        }

        // Advance before reading so an unreadable source is skipped next
        // time. Vanished files drop out at the relist after this cycle.
        let source = cursor.sources[cursor.next].clone();
        cursor.next += 1;

        let image = self.store.read(&source).await.map_err(|error| {
            ServiceError::UpstreamUnavailable(format!("failed to read {}: {}", source, error))
        })?;

        FrameServed {
            source: &source,
            size: image.len(),
        }
        .log();

        Ok(Frame {
            image,
            settings: self.settings.clone(),
            timestamp: unix_timestamp(),
        })
    }

    async fn reload(&self, cursor: &mut Cursor) -> Result<(), ServiceError> {
        let origin = self.store.origin();
        let sources = self.store.list().await.map_err(|error| {
            ServiceError::UpstreamUnavailable(format!("failed to list {}: {}", origin, error))
        })?;

        SourcesReloaded {
            origin: &origin,
            count: sources.len(),
        }
        .log();

        if sources.is_empty() {
            *cursor = Cursor::default();
            return Err(ServiceError::UpstreamUnavailable(format!(
                "no images found in {}",
                origin
            )));
        }

        *cursor = Cursor { sources, next: 0 };
        Ok(())
    }
}

#[async_trait]
impl OperationHandler for FrameSourceHandler {
    async fn handle(&self, body: RequestBody) -> Result<Reply, ServiceError> {
        expect_next_frame(body)?;
        Ok(Reply::Frame(self.next_frame().await?))
    }

    fn name(&self) -> &'static str {
        "frame_source"
    }
}

fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}
