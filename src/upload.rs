use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use thiserror::Error;

pub const DEFAULT_UPLOAD_DELAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_SUCCESS_DISPLAY: Duration = Duration::from_millis(3000);

// ---------------------------------------------------------------------------
// Accepted file kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Jpeg,
    Png,
    Pdf,
}

impl FileKind {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Pdf => "application/pdf",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMetadata {
    pub file_name: String,
    /// None when the file could not be stat'ed at drop time.
    pub size_bytes: Option<u64>,
    pub content_type: &'static str,
}

impl UploadMetadata {
    pub fn for_file(path: &Path, kind: FileKind) -> Self {
        Self {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            size_bytes: std::fs::metadata(path).ok().map(|m| m.len()),
            content_type: kind.content_type(),
        }
    }
}

// ---------------------------------------------------------------------------
// Upload collaborator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadHandle(pub String);

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Upload failed: {0}")]
    Transfer(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Accepts a file and hands back a receipt. A real implementation would talk
/// to a storage service here.
pub trait Uploader {
    fn upload(&mut self, file: &Path, meta: &UploadMetadata) -> Result<UploadHandle, UploadError>;
}

/// Never touches the network or the file contents. Fails only when the file
/// is gone by the time the simulated transfer completes.
#[derive(Debug, Default)]
pub struct MockUploader {
    completed: u64,
}

impl Uploader for MockUploader {
    fn upload(&mut self, file: &Path, meta: &UploadMetadata) -> Result<UploadHandle, UploadError> {
        let size = std::fs::metadata(file)?.len();
        self.completed += 1;
        let mut hasher = Sha256::new();
        hasher.update(meta.file_name.as_bytes());
        hasher.update(size.to_le_bytes());
        hasher.update(self.completed.to_le_bytes());
        let digest = hex::encode(hasher.finalize());
        tracing::info!(file = %file.display(), content_type = meta.content_type, "simulated upload complete");
        Ok(UploadHandle(digest[..12].to_string()))
    }
}

// ---------------------------------------------------------------------------
// Simulation state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    TooManyFiles(usize),
    UnsupportedType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Started,
    /// A transfer is already in flight; the drop was ignored.
    Busy,
    Empty,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Uploading {
        file: PathBuf,
        meta: UploadMetadata,
        started: Instant,
    },
    Success {
        file_name: String,
        handle: UploadHandle,
        since: Instant,
    },
}

/// Idle → Uploading → Success → Idle, advanced by `tick`. At most one upload
/// is in flight; drops that arrive meanwhile are refused with `Busy`.
pub struct UploadSimulator<U: Uploader = MockUploader> {
    state: UploadState,
    uploader: U,
    upload_delay: Duration,
    success_display: Duration,
    last_error: Option<String>,
}

impl UploadSimulator<MockUploader> {
    pub fn new(upload_delay: Duration, success_display: Duration) -> Self {
        Self::with_uploader(MockUploader::default(), upload_delay, success_display)
    }
}

impl<U: Uploader> UploadSimulator<U> {
    pub fn with_uploader(uploader: U, upload_delay: Duration, success_display: Duration) -> Self {
        Self {
            state: UploadState::Idle,
            uploader,
            upload_delay,
            success_display,
            last_error: None,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.state, UploadState::Uploading { .. })
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn drop_files(&mut self, files: &[PathBuf], now: Instant) -> DropOutcome {
        if files.is_empty() {
            return DropOutcome::Empty;
        }
        if self.is_uploading() {
            tracing::debug!("drop ignored, upload already in flight");
            return DropOutcome::Busy;
        }
        if files.len() > 1 {
            return DropOutcome::Rejected(RejectReason::TooManyFiles(files.len()));
        }
        let file = &files[0];
        let Some(kind) = FileKind::from_path(file) else {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file.display().to_string());
            return DropOutcome::Rejected(RejectReason::UnsupportedType(name));
        };
        let meta = UploadMetadata::for_file(file, kind);
        tracing::info!(file = %file.display(), "upload started");
        self.last_error = None;
        self.state = UploadState::Uploading {
            file: file.clone(),
            meta,
            started: now,
        };
        DropOutcome::Started
    }

    /// Advance timers. Returns true when the state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.state {
            UploadState::Uploading { file, meta, started } => {
                if now.saturating_duration_since(*started) < self.upload_delay {
                    return false;
                }
                let file_name = meta.file_name.clone();
                match self.uploader.upload(file, meta) {
                    Ok(handle) => {
                        self.state = UploadState::Success {
                            file_name,
                            handle,
                            since: now,
                        };
                    }
                    Err(e) => {
                        tracing::error!("upload of {file_name} failed: {e}");
                        self.last_error = Some(e.to_string());
                        self.state = UploadState::Idle;
                    }
                }
                true
            }
            UploadState::Success { since, .. } => {
                if now.saturating_duration_since(*since) < self.success_display {
                    return false;
                }
                self.state = UploadState::Idle;
                true
            }
            UploadState::Idle => false,
        }
    }

    /// Abandon an in-flight upload. Returns false when nothing was running.
    pub fn cancel(&mut self) -> bool {
        if self.is_uploading() {
            tracing::info!("upload cancelled");
            self.state = UploadState::Idle;
            true
        } else {
            false
        }
    }

    /// Fraction of the simulated transfer elapsed, while uploading.
    pub fn progress(&self, now: Instant) -> Option<f64> {
        let UploadState::Uploading { started, .. } = &self.state else {
            return None;
        };
        if self.upload_delay.is_zero() {
            return Some(1.0);
        }
        let elapsed = now.saturating_duration_since(*started).as_secs_f64();
        Some((elapsed / self.upload_delay.as_secs_f64()).min(1.0))
    }

    /// When the next timer fires, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.state {
            UploadState::Uploading { started, .. } => Some(*started + self.upload_delay),
            UploadState::Success { since, .. } => Some(*since + self.success_display),
            UploadState::Idle => None,
        }
    }
}
