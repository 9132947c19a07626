use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

/// Prefix of every stored relative path, independent of where the upload
/// directory actually lives.
const STORED_PREFIX: &str = "uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    PitchDeck,
    ProfilePhoto,
}

impl FileKind {
    fn subdir(self) -> &'static str {
        match self {
            FileKind::PitchDeck => "pitch_decks",
            FileKind::ProfilePhoto => "profile_photos",
        }
    }
}

/// Whether a resolved file matched its stored path or only its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Stored,
    Basename,
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Original client filename (basename only).
    pub filename: String,
    /// `uploads/<kind>/<uuid>.<ext>`
    pub relative_path: String,
    pub size: i64,
}

/// Uploaded files on local disk, one flat directory per kind.
///
/// Files are named `<uuid>.<ext>` so client filenames never reach the
/// filesystem. Nothing is ever deleted: applications keep pointing at the
/// pitch deck that was current when they were sent.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub async fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(root.join(FileKind::PitchDeck.subdir())).await?;
        fs::create_dir_all(root.join(FileKind::ProfilePhoto.subdir())).await?;
        info!("Upload directory: {}", root.display());
        Ok(Self { root })
    }

    pub async fn store(&self, kind: FileKind, original_filename: &str, bytes: &[u8]) -> Result<StoredFile> {
        let filename = Path::new(original_filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let stored_name = match extension_of(&filename) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        let path = self.root.join(kind.subdir()).join(&stored_name);
        let mut file = fs::File::create(&path).await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        info!("Stored {} ({} bytes) at {}", filename, bytes.len(), path.display());
        Ok(StoredFile {
            filename,
            relative_path: format!("{}/{}/{}", STORED_PREFIX, kind.subdir(), stored_name),
            size: bytes.len() as i64,
        })
    }

    /// Candidate locations for a stored reference, most specific first.
    /// Older rows may hold paths written under a different working
    /// directory or upload root.
    pub fn candidates(&self, stored_path: &str) -> Vec<(PathBuf, Lookup)> {
        let stored = Path::new(stored_path);
        if stored.components().any(|c| matches!(c, Component::ParentDir)) {
            return Vec::new();
        }
        let Some(basename) = stored.file_name() else {
            return Vec::new();
        };

        let mut out = Vec::new();
        if stored.is_absolute() {
            out.push((stored.to_path_buf(), Lookup::Stored));
        }
        if let Some(parent) = self.root.parent() {
            out.push((parent.join(stored), Lookup::Stored));
        }
        if let Ok(rest) = stored.strip_prefix(STORED_PREFIX) {
            out.push((self.root.join(rest), Lookup::Stored));
        }
        out.push((self.root.join(FileKind::PitchDeck.subdir()).join(basename), Lookup::Basename));
        out.push((self.root.join(basename), Lookup::Basename));
        out.push((
            Path::new(".").join(STORED_PREFIX).join(FileKind::PitchDeck.subdir()).join(basename),
            Lookup::Basename,
        ));
        out.push((stored.to_path_buf(), Lookup::Stored));
        out
    }

    /// First candidate that exists on disk, with how it was found.
    pub async fn locate(&self, stored_path: &str) -> Option<(PathBuf, Lookup)> {
        for (candidate, lookup) in self.candidates(stored_path) {
            if fs::metadata(&candidate).await.map(|m| m.is_file()).unwrap_or(false) {
                return Some((candidate, lookup));
            }
        }
        None
    }

    pub async fn resolve(&self, stored_path: &str) -> Option<PathBuf> {
        match self.locate(stored_path).await {
            Some((path, Lookup::Basename)) => {
                warn!("Resolved '{}' by file name only: {}", stored_path, path.display());
                Some(path)
            }
            Some((path, Lookup::Stored)) => Some(path),
            None => {
                warn!("No file found for stored path '{}'", stored_path);
                None
            }
        }
    }
}

/// Lowercased extension without the dot.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
}

pub fn content_type_for(path: &str) -> &'static str {
    match extension_of(path).as_deref() {
        Some("pdf") => "application/pdf",
        Some("ppt") => "application/vnd.ms-powerpoint",
        Some("pptx") => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
