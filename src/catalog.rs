//! Directory scanning and stem-keyed pairing of card images and audio clips.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::ResourceError;

const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "gif"];
const AUDIO_EXTS: &[&str] = &["mp3"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Image,
    Audio,
}

/// Classify `path` by its (case-insensitive) extension.
#[must_use]
pub fn classify(path: &Path) -> Option<ResourceKind> {
    let ext = path
        .extension()
        .and_then(OsStr::to_str)?
        .to_ascii_lowercase();
    if IMAGE_EXTS.contains(&ext.as_str()) {
        Some(ResourceKind::Image)
    } else if AUDIO_EXTS.contains(&ext.as_str()) {
        Some(ResourceKind::Audio)
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub label: String,
    pub image: PathBuf,
    pub audio: PathBuf,
}

/// The cards available to one session, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

/// A loaded catalog plus the recoverable problems met while building it.
#[derive(Debug)]
pub struct ScanReport {
    pub catalog: Catalog,
    pub problems: Vec<ResourceError>,
    /// Files without a counterpart of the other kind, or shadowed duplicates.
    pub unpaired: Vec<PathBuf>,
}

impl Catalog {
    /// Scan `directories` in order and pair images with audio by file stem.
    ///
    /// Per-directory failures are collected into the report and scanning
    /// moves on. Fails only when no complete pair was found anywhere.
    pub fn load(directories: &[PathBuf]) -> Result<ScanReport, ResourceError> {
        let mut entries = Vec::new();
        let mut problems = Vec::new();
        let mut unpaired = Vec::new();

        for dir in directories {
            match scan_directory(dir) {
                Ok(scan) => {
                    debug!(
                        dir = %dir.display(),
                        paired = scan.entries.len(),
                        unpaired = scan.unpaired.len(),
                        "directory scanned"
                    );
                    entries.extend(scan.entries);
                    unpaired.extend(scan.unpaired);
                }
                Err(err) => {
                    warn!(dir = %dir.display(), error = %err, "skipping directory");
                    problems.push(err);
                }
            }
        }

        for path in &unpaired {
            warn!(path = %path.display(), "no matching image/audio counterpart; ignored");
        }

        if entries.is_empty() {
            return Err(ResourceError::EmptyCatalog { problems });
        }
        info!(
            cards = entries.len(),
            directories = directories.len(),
            "catalog loaded"
        );
        Ok(ScanReport {
            catalog: Catalog { entries },
            problems,
            unpaired,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    pub fn images(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|e| e.image.as_path())
    }

    pub fn audios(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(|e| e.audio.as_path())
    }
}

#[derive(Default)]
struct DirectoryScan {
    entries: Vec<CatalogEntry>,
    unpaired: Vec<PathBuf>,
}

#[derive(Default)]
struct Pending {
    image: Option<PathBuf>,
    audio: Option<PathBuf>,
}

fn scan_directory(dir: &Path) -> Result<DirectoryScan, ResourceError> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(ResourceError::NotADirectory(dir.to_path_buf())),
        Err(err) => return Err(io_problem(dir, err)),
    }

    // Stems in the order their image was first seen.
    let mut order: Vec<String> = Vec::new();
    let mut by_stem: HashMap<String, Pending> = HashMap::new();
    let mut scan = DirectoryScan::default();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            // Dangling symlink: the link itself is listed, its target is gone.
            Err(err)
                if err.depth() > 0
                    && err.io_error().map(std::io::Error::kind) == Some(ErrorKind::NotFound) =>
            {
                if let Some(path) = err.path() {
                    warn!(path = %path.display(), "dangling link; ignored");
                    scan.unpaired.push(path.to_path_buf());
                }
                continue;
            }
            Err(err) => return Err(walk_problem(dir, err)),
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let Some(kind) = classify(&path) else {
            continue;
        };
        let Some(stem) = path.file_stem().and_then(OsStr::to_str).map(str::to_owned) else {
            scan.unpaired.push(path);
            continue;
        };

        let slot = by_stem.entry(stem.clone()).or_default();
        let target = match kind {
            ResourceKind::Image => &mut slot.image,
            ResourceKind::Audio => &mut slot.audio,
        };
        if target.is_some() {
            scan.unpaired.push(path);
            continue;
        }
        if kind == ResourceKind::Image {
            order.push(stem);
        }
        *target = Some(path);
    }

    for stem in order {
        let Some(Pending { image, audio }) = by_stem.remove(&stem) else {
            continue;
        };
        match (image, audio) {
            (Some(image), Some(audio)) => scan.entries.push(CatalogEntry {
                label: stem,
                image,
                audio,
            }),
            (image, audio) => scan.unpaired.extend(image.into_iter().chain(audio)),
        }
    }
    // Audio clips whose stem never had an image.
    let mut leftovers: Vec<PathBuf> = by_stem
        .into_values()
        .flat_map(|p| p.image.into_iter().chain(p.audio))
        .collect();
    leftovers.sort();
    scan.unpaired.extend(leftovers);

    Ok(scan)
}

fn walk_problem(dir: &Path, err: walkdir::Error) -> ResourceError {
    let path = err.path().unwrap_or(dir).to_path_buf();
    match err.into_io_error() {
        Some(io) => io_problem(&path, io),
        None => ResourceError::Io {
            path,
            source: std::io::Error::other("filesystem loop"),
        },
    }
}

fn io_problem(path: &Path, err: std::io::Error) -> ResourceError {
    match err.kind() {
        ErrorKind::NotFound => ResourceError::MissingDirectory(path.to_path_buf()),
        ErrorKind::PermissionDenied => ResourceError::PermissionDenied(path.to_path_buf()),
        _ => ResourceError::Io {
            path: path.to_path_buf(),
            source: err,
        },
    }
}

/// A named resource directory the operator can select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    pub name: String,
    pub path: PathBuf,
}

/// List the decks under `root`: its visible subdirectories, or `root`
/// itself when it has none.
pub fn discover_decks(root: &Path) -> Result<Vec<Deck>, ResourceError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(ResourceError::NotADirectory(root.to_path_buf())),
        Err(err) => return Err(io_problem(root, err)),
    }

    let mut decks = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|err| walk_problem(root, err))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        decks.push(Deck {
            name,
            path: entry.into_path(),
        });
    }

    if decks.is_empty() {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        decks.push(Deck {
            name,
            path: root.to_path_buf(),
        });
    }
    Ok(decks)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckChoice {
    One(String),
    All,
}

impl DeckChoice {
    /// Parse operator input: `all`, a 1-based deck number, or a deck name.
    pub fn parse(input: &str, decks: &[Deck]) -> Result<Self, ResourceError> {
        let input = input.trim();
        if input.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        if let Ok(n) = input.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| decks.get(i))
                .map(|d| Self::One(d.name.clone()))
                .ok_or_else(|| ResourceError::UnknownDeck(input.to_string()));
        }
        decks
            .iter()
            .find(|d| d.name == input)
            .map(|d| Self::One(d.name.clone()))
            .ok_or_else(|| ResourceError::UnknownDeck(input.to_string()))
    }

    pub fn resolve(&self, decks: &[Deck]) -> Result<Vec<PathBuf>, ResourceError> {
        match self {
            Self::All => Ok(decks.iter().map(|d| d.path.clone()).collect()),
            Self::One(name) => decks
                .iter()
                .find(|d| &d.name == name)
                .map(|d| vec![d.path.clone()])
                .ok_or_else(|| ResourceError::UnknownDeck(name.clone())),
        }
    }
}
