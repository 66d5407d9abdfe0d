//! Synchronous atlas loading from a directory of image + manifest pairs.
//!
//! A directory such as
//!
//! ```text
//! BlackHelmetAtlas/
//!   black-0@2x.png
//!   black-0.json
//!   black-1@2x.png
//!   black-1.json
//! ```
//!
//! is scanned (hidden entries skipped), files are grouped by base name, and
//! every base name that has both an image and a `.json` manifest becomes a
//! root of the resulting [`TextureAtlas`]. Pairs are processed in base-name
//! order so repeated loads of the same directory are identical.
//!
//! Cancellation is cooperative: the token is polled per scanned file, per pair
//! and per frame. A cancelled load returns `None` and keeps nothing it built.

use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::resources::atlasdescriptor::AtlasDescriptor;
use crate::resources::textureatlas::{NormRect, RootImage, Texture, TextureAtlas};

/// Manifest file extension (compared case-insensitively).
pub const MANIFEST_EXTENSION: &str = "json";

/// Shared cancellation flag for an in-flight load.
///
/// Cloning shares the flag. Cancelling is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Image and manifest paths discovered for one base name.
#[derive(Debug, Default, Clone, PartialEq)]
struct CandidatePair {
    image: Option<(PathBuf, f32)>,
    manifest: Option<PathBuf>,
}

/// Split an image stem like `black@2x` into (`black`, 2.0).
pub fn split_scale_suffix(stem: &str) -> (&str, f32) {
    if let Some((base, suffix)) = stem.rsplit_once('@') {
        if let Some(factor) = suffix.strip_suffix('x').or_else(|| suffix.strip_suffix('X')) {
            if let Ok(scale) = factor.parse::<f32>() {
                if scale > 0.0 {
                    return (base, scale);
                }
            }
        }
    }
    (stem, 1.0)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Scan `dir` and group entries by base name. Returns `None` when cancelled.
fn discover_pairs(dir: &Path, cancel: &CancelToken) -> Option<BTreeMap<String, CandidatePair>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list atlas directory {:?}: {}", dir, e);
            return Some(BTreeMap::new());
        }
    };

    let mut pairs: BTreeMap<String, CandidatePair> = BTreeMap::new();
    for entry in entries.flatten() {
        if cancel.is_cancelled() {
            return None;
        }
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if is_hidden(file_name) || !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let is_manifest = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(MANIFEST_EXTENSION));

        if is_manifest {
            let stem = stem.to_string();
            pairs.entry(stem).or_default().manifest = Some(path);
        } else {
            let (base, scale) = split_scale_suffix(stem);
            let base = base.to_string();
            pairs.entry(base).or_default().image = Some((path, scale));
        }
    }
    Some(pairs)
}

/// Decode one image + manifest pair into a root and its frames.
fn load_pair(
    base: &str,
    image_path: &Path,
    scale: f32,
    manifest_path: &Path,
) -> Option<(RootImage, AtlasDescriptor)> {
    let image = match image::open(image_path) {
        Ok(image) => image,
        Err(e) => {
            warn!("Skipping atlas root '{}': cannot decode {:?}: {}", base, image_path, e);
            return None;
        }
    };
    let bytes = match std::fs::read(manifest_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Skipping atlas root '{}': cannot read {:?}: {}", base, manifest_path, e);
            return None;
        }
    };
    let descriptor = match AtlasDescriptor::parse(&bytes) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            warn!("Skipping atlas root '{}': {}", base, e);
            return None;
        }
    };
    Some((RootImage::new(image_path, image, scale), descriptor))
}

/// Load every valid image + manifest pair in `dir` into one atlas.
///
/// Returns `None` when no pair loads or when `cancel` fires.
pub fn load(dir: impl AsRef<Path>, cancel: &CancelToken) -> Option<TextureAtlas> {
    let dir = dir.as_ref();
    let pairs = discover_pairs(dir, cancel)?;

    let mut roots: Vec<RootImage> = Vec::new();
    let mut textures: FxHashMap<String, Texture> = FxHashMap::default();

    for (base, pair) in &pairs {
        if cancel.is_cancelled() {
            return None;
        }
        let (Some((image_path, scale)), Some(manifest_path)) = (&pair.image, &pair.manifest) else {
            debug!("Ignoring unpaired atlas file(s) for '{}'", base);
            continue;
        };
        let Some((root, descriptor)) = load_pair(base, image_path, *scale, manifest_path) else {
            continue;
        };

        let root_index = roots.len();
        let (root_w, root_h) = root.normalization_size();
        for (name, rect) in descriptor.frames() {
            if cancel.is_cancelled() {
                return None;
            }
            let texture = Texture::new(root_index, NormRect::from_source(rect, root_w, root_h));
            if textures.insert(name.to_string(), texture).is_some() {
                warn!("Frame '{}' is defined by more than one manifest; '{}' wins", name, base);
            }
        }
        roots.push(root);
    }

    if cancel.is_cancelled() || roots.is_empty() {
        return None;
    }

    info!(
        "Loaded atlas {:?}: {} frames from {} root(s)",
        dir,
        textures.len(),
        roots.len()
    );
    Some(TextureAtlas::new(dir, roots, textures))
}
