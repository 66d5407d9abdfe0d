//! Sprite-sheet manifest parsing.
//!
//! A manifest maps frame names to source rectangles in image pixel space
//! (origin top-left, y down). Two document shapes are accepted:
//!
//! ```json
//! { "helmet-00": { "x": 0, "y": 0, "w": 512, "h": 512 } }
//! ```
//!
//! ```json
//! { "frames": { "helmet-00": { "frame": { "x": 0, "y": 0, "w": 512, "h": 512 } } },
//!   "meta": { "app": "packer" } }
//! ```
//!
//! Each frame record is either a bare rectangle or a rectangle wrapped in a
//! `frame` object. Unknown fields inside records are ignored. Serializing an
//! [`AtlasDescriptor`] reproduces the shape and record style it was read with.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while decoding a manifest.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("manifest matches neither a frame map nor a frames/meta object: {0}")]
    UnrecognizedShape(String),
}

/// Source rectangle of a frame, in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl FrameRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        FrameRect { x, y, w, h }
    }
}

/// A frame record as it appeared in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameRecord {
    /// `{ "x": .., "y": .., "w": .., "h": .. }`
    Bare(FrameRect),
    /// `{ "frame": { "x": .., "y": .., "w": .., "h": .. } }`
    Wrapped { frame: FrameRect },
}

impl FrameRecord {
    pub fn rect(&self) -> FrameRect {
        match self {
            FrameRecord::Bare(rect) => *rect,
            FrameRecord::Wrapped { frame } => *frame,
        }
    }
}

/// Which top-level document shape a manifest used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestShape {
    /// Flat `name -> record` mapping.
    FrameMap,
    /// `{ "frames": {..}, "meta": {..} }`
    FramesWithMeta,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    FrameMap(BTreeMap<String, FrameRecord>),
    FramesWithMeta {
        frames: BTreeMap<String, FrameRecord>,
        #[serde(default, deserialize_with = "lenient_meta")]
        meta: Option<BTreeMap<String, String>>,
    },
}

#[derive(Serialize)]
struct FramesWithMetaOut<'a> {
    frames: &'a BTreeMap<String, FrameRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<&'a BTreeMap<String, String>>,
}

/// `meta` that is not a string map is dropped rather than failing the manifest.
fn lenient_meta<'de, D>(deserializer: D) -> Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decoded manifest: frame name -> source rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasDescriptor {
    frames: BTreeMap<String, FrameRecord>,
    meta: Option<BTreeMap<String, String>>,
    shape: ManifestShape,
}

impl AtlasDescriptor {
    /// Build a flat-shape descriptor from bare rectangles.
    pub fn from_rects<I, S>(rects: I) -> Self
    where
        I: IntoIterator<Item = (S, FrameRect)>,
        S: Into<String>,
    {
        AtlasDescriptor {
            frames: rects
                .into_iter()
                .map(|(name, rect)| (name.into(), FrameRecord::Bare(rect)))
                .collect(),
            meta: None,
            shape: ManifestShape::FrameMap,
        }
    }

    /// Decode a manifest from raw JSON bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        let document: Document = serde_json::from_value(value)
            .map_err(|e| ParseError::UnrecognizedShape(e.to_string()))?;
        Ok(match document {
            Document::FrameMap(frames) => AtlasDescriptor {
                frames,
                meta: None,
                shape: ManifestShape::FrameMap,
            },
            Document::FramesWithMeta { frames, meta } => AtlasDescriptor {
                frames,
                meta,
                shape: ManifestShape::FramesWithMeta,
            },
        })
    }

    /// Serialize back to the shape this descriptor was read with.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        match self.shape {
            ManifestShape::FrameMap => serde_json::to_string(&self.frames),
            ManifestShape::FramesWithMeta => serde_json::to_string(&FramesWithMetaOut {
                frames: &self.frames,
                meta: self.meta.as_ref(),
            }),
        }
    }

    pub fn shape(&self) -> ManifestShape {
        self.shape
    }

    pub fn meta(&self) -> Option<&BTreeMap<String, String>> {
        self.meta.as_ref()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<FrameRect> {
        self.frames.get(name).map(FrameRecord::rect)
    }

    /// Frames in name order.
    pub fn frames(&self) -> impl Iterator<Item = (&str, FrameRect)> {
        self.frames.iter().map(|(name, record)| (name.as_str(), record.rect()))
    }
}
