use std::{
    io::Cursor,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::Context;

use crate::{config::SnapshotConfig, error::LocateError, statics::MIN_IMAGE_SIDE};

#[derive(Debug, Clone, PartialEq)]
pub enum ImageKind {
    /// Path passed on the command line, usually by motion's `on_picture_save`
    CliPath,
    /// Newest snapshot found in the watched directory
    Snapshot,
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::CliPath => "passed argument",
            Self::Snapshot => "newest snapshot",
        })
    }
}

#[derive(Debug)]
pub struct LocatedImage {
    pub kind: ImageKind,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl LocatedImage {
    pub fn from_path(kind: ImageKind, path: PathBuf) -> anyhow::Result<Self> {
        if !path.is_file() {
            return Err(LocateError::NotAFile(path).into());
        }

        let bytes = std::fs::read(&path).with_context(|| format!("reading image {path:?}"))?;
        if bytes.is_empty() {
            return Err(LocateError::Empty(path).into());
        }

        Ok(Self { kind, path, bytes })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("image.jpg"))
    }

    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Reads the image header for its size, without decoding the pixels
    pub fn dimensions(&self) -> anyhow::Result<(u32, u32)> {
        let dims = image::ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()?
            .into_dimensions()?;
        Ok(dims)
    }

    fn probe(&self) {
        match self.dimensions() {
            Ok((w, h)) if w < MIN_IMAGE_SIDE || h < MIN_IMAGE_SIDE => tracing::warn!(
                "{:?} is {w}x{h}, smaller than the analysis service accepts",
                self.path
            ),
            Ok((w, h)) => tracing::debug!("{:?} is {w}x{h}, {} bytes", self.path, self.bytes.len()),
            Err(err) => tracing::warn!("could not read image header of {:?}: {err}", self.path),
        }
    }
}

fn newest_snapshot(dir: &Path, suffix: &str) -> anyhow::Result<PathBuf> {
    let mut best: Option<(SystemTime, PathBuf)> = None;

    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {dir:?}"))? {
        let entry = entry?;
        let name = entry.file_name();
        if !name.to_string_lossy().ends_with(suffix) {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified()?;
        let path = entry.path();

        let newer = match &best {
            None => true,
            Some((time, existing)) => (modified, &path) > (*time, existing),
        };
        if newer {
            best = Some((modified, path));
        }
    }

    best.map(|(_, path)| path).ok_or_else(|| {
        LocateError::NoSnapshot {
            dir: dir.to_owned(),
            suffix: suffix.to_owned(),
        }
        .into()
    })
}

/// Finds the image to analyze: `path` if given, else the newest snapshot.
pub fn locate(path: Option<PathBuf>, snapshots: &SnapshotConfig) -> anyhow::Result<LocatedImage> {
    let image = match path {
        Some(path) => LocatedImage::from_path(ImageKind::CliPath, path)?,
        None => {
            let path = newest_snapshot(&snapshots.directory, &snapshots.suffix)?;
            LocatedImage::from_path(ImageKind::Snapshot, path)?
        }
    };

    tracing::info!("Using {} {:?}", image.kind, image.path);
    image.probe();
    Ok(image)
}
