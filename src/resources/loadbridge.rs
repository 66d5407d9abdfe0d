//! Bridge between the UI context and background atlas workers.
//!
//! [`LoadBridge::load`] and [`LoadBridge::preload`] spawn a worker thread and
//! return a [`PendingLoad`] handle. Workers send their result over a
//! `crossbeam_channel`; the UI context collects them with
//! [`LoadBridge::drain`], normally from the
//! [`poll_atlas_loads`](crate::systems::atlasload::poll_atlas_loads) system.
//!
//! Delivery rules
//! - Each request is delivered at most once.
//! - A request cancelled before it is drained is never delivered, even if its
//!   worker already finished.
//! - Cancelling after delivery, or cancelling twice, does nothing.

use bevy_ecs::prelude::Resource;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::debug;
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::resources::atlasloader::{self, CancelToken};
use crate::resources::textureatlas::TextureAtlas;

pub type LoadId = u64;

/// Result of a background request.
#[derive(Debug, Clone)]
pub enum LoadCompletion {
    /// Directory load finished; `None` when no atlas could be assembled.
    Loaded(Option<Arc<TextureAtlas>>),
    /// Every root of the atlas is upload-ready.
    Preloaded(Arc<TextureAtlas>),
}

/// Handle to an in-flight request.
#[derive(Debug, Clone)]
pub struct PendingLoad {
    id: LoadId,
    token: CancelToken,
}

impl PendingLoad {
    pub fn id(&self) -> LoadId {
        self.id
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Owns the worker result channel and the table of undelivered requests.
#[derive(Resource)]
pub struct LoadBridge {
    tx: Sender<(LoadId, LoadCompletion)>,
    rx: Receiver<(LoadId, LoadCompletion)>,
    in_flight: FxHashMap<LoadId, CancelToken>,
    next_id: LoadId,
}

impl Default for LoadBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadBridge {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        LoadBridge {
            tx,
            rx,
            in_flight: FxHashMap::default(),
            next_id: 0,
        }
    }

    fn register(&mut self) -> PendingLoad {
        let id = self.next_id;
        self.next_id += 1;
        let token = CancelToken::new();
        self.in_flight.insert(id, token.clone());
        PendingLoad { id, token }
    }

    /// Load the atlas in `dir` on a worker thread.
    pub fn load(&mut self, dir: impl Into<PathBuf>) -> PendingLoad {
        let pending = self.register();
        let dir = dir.into();
        let id = pending.id;
        let token = pending.token.clone();
        let tx = self.tx.clone();
        debug!("Atlas load #{} started for {:?}", id, dir);
        std::thread::spawn(move || {
            if token.is_cancelled() {
                return;
            }
            let atlas = atlasloader::load(&dir, &token);
            if !token.is_cancelled() {
                let _ = tx.send((id, LoadCompletion::Loaded(atlas.map(Arc::new))));
            }
        });
        pending
    }

    /// Make every root of `atlas` upload-ready on a worker thread.
    ///
    /// An atlas without frames completes without spawning a worker.
    pub fn preload(&mut self, atlas: Arc<TextureAtlas>) -> PendingLoad {
        let pending = self.register();
        let id = pending.id;
        if atlas.is_empty() {
            let _ = self.tx.send((id, LoadCompletion::Preloaded(atlas)));
            return pending;
        }
        let token = pending.token.clone();
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            atlas.preload();
            if !token.is_cancelled() {
                let _ = tx.send((id, LoadCompletion::Preloaded(atlas)));
            }
        });
        pending
    }

    /// Collect finished requests on the calling (UI) context.
    ///
    /// Cancelled requests are forgotten here whether or not their worker
    /// reported back.
    pub fn drain(&mut self) -> Vec<(LoadId, LoadCompletion)> {
        self.in_flight.retain(|_, token| !token.is_cancelled());
        let mut done = Vec::new();
        for (id, completion) in self.rx.try_iter() {
            if self.in_flight.remove(&id).is_some() {
                done.push((id, completion));
            }
        }
        done
    }

    /// Requests that are neither delivered nor cancelled.
    pub fn in_flight(&self) -> usize {
        self.in_flight
            .values()
            .filter(|token| !token.is_cancelled())
            .count()
    }
}
