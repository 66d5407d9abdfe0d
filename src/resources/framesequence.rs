//! Ordered frame lists derived from an atlas.

use std::sync::Arc;

use crate::resources::textureatlas::{Texture, TextureAtlas};

/// Frame names of `atlas` in ascending lexicographic order.
pub fn sequence(atlas: &TextureAtlas) -> Vec<String> {
    let mut names = atlas.texture_names().to_vec();
    names.sort();
    names
}

/// One displayable frame: its position in the sequence and its texture.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: usize,
    pub name: Arc<str>,
    pub atlas: Arc<TextureAtlas>,
}

impl Frame {
    pub fn texture(&self) -> Texture {
        self.atlas.texture_named(&self.name)
    }
}

/// Index-to-frame lookup for one atlas, rebuilt whenever the atlas changes.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    atlas: Arc<TextureAtlas>,
    names: Vec<Arc<str>>,
}

impl FrameSequence {
    pub fn new(atlas: Arc<TextureAtlas>) -> Self {
        let names = sequence(&atlas).into_iter().map(Arc::from).collect();
        FrameSequence { atlas, names }
    }

    pub fn atlas(&self) -> &Arc<TextureAtlas> {
        &self.atlas
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.as_ref())
    }

    pub fn frame(&self, index: usize) -> Option<Frame> {
        self.names.get(index).map(|name| Frame {
            index,
            name: name.clone(),
            atlas: self.atlas.clone(),
        })
    }

    /// Frames at `indices`, in the given order. Out-of-range indices are skipped.
    pub fn frames(&self, indices: impl IntoIterator<Item = usize>) -> Vec<Frame> {
        indices.into_iter().filter_map(|i| self.frame(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::textureatlas::{NormRect, RootImage};
    use image::DynamicImage;
    use rustc_hash::FxHashMap;

    fn atlas_with(names: &[&str]) -> Arc<TextureAtlas> {
        let textures: FxHashMap<String, Texture> = names
            .iter()
            .map(|n| (n.to_string(), Texture::new(0, NormRect::default())))
            .collect();
        let root = RootImage::new("r.png", DynamicImage::new_rgba8(1, 1), 1.0);
        Arc::new(TextureAtlas::new("test", vec![root], textures))
    }

    #[test]
    fn sorts_names_lexicographically() {
        let atlas = atlas_with(&["b", "a", "c"]);
        for _ in 0..5 {
            assert_eq!(sequence(&atlas), vec!["a", "b", "c"]);
        }
    }

    #[test]
    fn lexicographic_not_numeric() {
        let atlas = atlas_with(&["f10", "f2", "f1"]);
        assert_eq!(sequence(&atlas), vec!["f1", "f10", "f2"]);
    }

    #[test]
    fn frame_lookup_follows_sequence_order() {
        let seq = FrameSequence::new(atlas_with(&["b", "a", "c"]));
        assert_eq!(seq.len(), 3);
        let frame = seq.frame(1).unwrap();
        assert_eq!(frame.index, 1);
        assert_eq!(&*frame.name, "b");
        assert!(seq.frame(3).is_none());
        let names: Vec<_> = seq.frames([2, 0, 7]).iter().map(|f| f.name.to_string()).collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn empty_atlas_gives_empty_sequence() {
        let seq = FrameSequence::new(atlas_with(&[]));
        assert!(seq.is_empty());
        assert!(seq.frame(0).is_none());
    }
}
