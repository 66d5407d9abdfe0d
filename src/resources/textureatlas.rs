//! Decoded texture atlases.
//!
//! A [`TextureAtlas`] owns one or more decoded root images and a table of
//! named sub-textures. Each sub-texture is a rectangle normalized to its
//! root's size with a bottom-left origin, ready for a renderer that samples
//! in texture space.
//!
//! Atlases are immutable after construction and shared behind `Arc` by the
//! animator, frame runs and display nodes.

use image::{DynamicImage, RgbaImage};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::resources::atlasdescriptor::FrameRect;

/// Rectangle in normalized texture space (0..1, origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl NormRect {
    /// Normalize a top-left-origin pixel rectangle against a root of
    /// `root_w` x `root_h` pixels, flipping the vertical axis.
    pub fn from_source(rect: FrameRect, root_w: f32, root_h: f32) -> Self {
        let w = rect.w / root_w;
        let h = rect.h / root_h;
        NormRect {
            x: rect.x / root_w,
            y: 1.0 - rect.y / root_h - h,
            w,
            h,
        }
    }
}

/// A named sub-texture: which root it lives in and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Texture {
    /// Index into [`TextureAtlas::roots`]; `None` for the blank placeholder.
    pub root: Option<usize>,
    pub rect: NormRect,
}

impl Texture {
    pub fn new(root: usize, rect: NormRect) -> Self {
        Texture {
            root: Some(root),
            rect,
        }
    }

    /// Texture that samples nothing.
    pub fn blank() -> Self {
        Texture {
            root: None,
            rect: NormRect::default(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.root.is_none()
    }
}

/// A decoded source image backing one or more sub-textures.
#[derive(Debug)]
pub struct RootImage {
    pub path: PathBuf,
    /// Resolution scale factor (`@2x` -> 2.0).
    pub scale: f32,
    image: DynamicImage,
    rgba: OnceLock<RgbaImage>,
}

impl RootImage {
    pub fn new(path: impl Into<PathBuf>, image: DynamicImage, scale: f32) -> Self {
        RootImage {
            path: path.into(),
            scale: if scale > 0.0 { scale } else { 1.0 },
            image,
            rgba: OnceLock::new(),
        }
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Size in points (pixels divided by scale).
    pub fn point_size(&self) -> (f32, f32) {
        let (w, h) = self.pixel_size();
        (w as f32 / self.scale, h as f32 / self.scale)
    }

    /// Size used to normalize manifest rectangles: point size (at least one
    /// point per axis) times scale.
    pub fn normalization_size(&self) -> (f32, f32) {
        let (w, h) = self.point_size();
        (w.max(1.0) * self.scale, h.max(1.0) * self.scale)
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Upload-ready RGBA8 pixels, converted on first use.
    pub fn rgba(&self) -> &RgbaImage {
        self.rgba.get_or_init(|| self.image.to_rgba8())
    }

    pub fn is_resident(&self) -> bool {
        self.rgba.get().is_some()
    }
}

/// Named sub-textures backed by decoded root images.
#[derive(Debug)]
pub struct TextureAtlas {
    source: PathBuf,
    roots: Vec<RootImage>,
    textures: FxHashMap<String, Texture>,
    texture_names: Vec<String>,
}

impl TextureAtlas {
    /// Assemble an atlas. `texture_names` is derived from the texture table,
    /// sorted, so the two can never disagree and loads are reproducible.
    pub fn new(
        source: impl Into<PathBuf>,
        roots: Vec<RootImage>,
        textures: FxHashMap<String, Texture>,
    ) -> Self {
        let mut texture_names: Vec<String> = textures.keys().cloned().collect();
        texture_names.sort();
        TextureAtlas {
            source: source.into(),
            roots,
            textures,
            texture_names,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn roots(&self) -> &[RootImage] {
        &self.roots
    }

    /// Registered frame names in ascending order.
    pub fn texture_names(&self) -> &[String] {
        &self.texture_names
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    /// Look up a frame by name.
    ///
    /// Asking for an unregistered name is a programming error: debug builds
    /// assert, release builds get a blank placeholder.
    pub fn texture_named(&self, name: &str) -> Texture {
        match self.textures.get(name) {
            Some(texture) => *texture,
            None => {
                debug_assert!(false, "texture '{}' is not in atlas {:?}", name, self.source);
                Texture::blank()
            }
        }
    }

    /// Convert every root to its upload-ready form.
    pub fn preload(&self) {
        if self.textures.is_empty() {
            return;
        }
        for root in &self.roots {
            root.rgba();
        }
    }

    pub fn is_preloaded(&self) -> bool {
        self.roots.iter().all(RootImage::is_resident)
    }
}
