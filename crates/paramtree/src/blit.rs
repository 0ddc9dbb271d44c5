//! Cached-background redraw for animated artists.
//!
//! A [`BlitManager`] caches a snapshot of a canvas background and keeps an
//! arbitrarily nested collection of animated artists. A redraw restores the
//! snapshot, draws every artist on top and blits the result, which is much
//! cheaper than redrawing the whole figure.
//!
//! The manager is toolkit-agnostic: the canvas is reached through a
//! [`RenderBackend`].
//!
//! # Example
//!
//! ```
//! use paramtree::blit::{ArtistTree, BlitManager, RenderBackend};
//! use paramtree::config::ConfigPath;
//!
//! #[derive(Default)]
//! struct Canvas { drawn: Vec<&'static str> }
//!
//! impl RenderBackend for Canvas {
//!     type Background = ();
//!     type Artist = &'static str;
//!     fn canvas_id(&self) -> &str { "main" }
//!     fn copy_background(&mut self) {}
//!     fn restore_background(&mut self, _: &()) {}
//!     fn draw_artist(&mut self, artist: &&'static str) { self.drawn.push(*artist) }
//!     fn remove_artist(&mut self, _: &&'static str) {}
//!     fn blit(&mut self) {}
//!     fn flush_events(&mut self) {}
//! }
//!
//! let mut manager = BlitManager::new(Canvas::default());
//! manager
//!     .insert_artists(&ConfigPath::from(["rings"]), ArtistTree::list(["ring_0", "ring_1"]))
//!     .unwrap();
//! manager.update();
//! assert_eq!(manager.backend().drawn, vec!["ring_0", "ring_1"]);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use paramtree_core::logging::{span_names, targets};
use paramtree_core::{ConnectionId, PerfSpan, Result, Signal, TreeError};

use crate::config::{ConfigPath, PathSegment};

/// The canvas operations a [`BlitManager`] needs.
pub trait RenderBackend {
    /// An opaque snapshot of the canvas background.
    type Background;
    /// A handle to a drawable artist.
    type Artist;

    /// Identifies the canvas, for matching draw events.
    fn canvas_id(&self) -> &str;

    /// Snapshots the current canvas contents.
    fn copy_background(&mut self) -> Self::Background;

    /// Paints a snapshot back onto the canvas.
    fn restore_background(&mut self, background: &Self::Background);

    /// Draws one artist onto the canvas.
    fn draw_artist(&mut self, artist: &Self::Artist);

    /// Detaches an artist from its figure.
    fn remove_artist(&mut self, artist: &Self::Artist);

    /// Pushes the drawn region to the screen.
    fn blit(&mut self);

    /// Lets the event loop process pending events.
    fn flush_events(&mut self);
}

/// A nested collection of artists.
///
/// Leaves are artists; maps keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtistTree<A> {
    /// A single artist.
    Artist(A),
    /// An ordered list of subtrees.
    List(Vec<ArtistTree<A>>),
    /// An insertion-ordered map of subtrees.
    Map(Vec<(String, ArtistTree<A>)>),
}

impl<A> Default for ArtistTree<A> {
    fn default() -> Self {
        ArtistTree::Map(Vec::new())
    }
}

impl<A> ArtistTree<A> {
    /// Creates an empty map.
    pub fn map() -> Self {
        Self::default()
    }

    /// Creates a list of artists.
    pub fn list(artists: impl IntoIterator<Item = A>) -> Self {
        ArtistTree::List(artists.into_iter().map(ArtistTree::Artist).collect())
    }

    /// Inserts an entry, builder style. Has no effect on non-maps.
    pub fn with(mut self, key: impl Into<String>, tree: impl Into<ArtistTree<A>>) -> Self {
        if let ArtistTree::Map(entries) = &mut self {
            let key = key.into();
            let tree = tree.into();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => *existing = tree,
                None => entries.push((key, tree)),
            }
        }
        self
    }

    /// Returns the direct child addressed by `segment`.
    pub fn child(&self, segment: &PathSegment) -> Option<&ArtistTree<A>> {
        match (self, segment) {
            (ArtistTree::Map(entries), PathSegment::Key(key)) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            (ArtistTree::List(items), PathSegment::Index(i)) => items.get(*i),
            _ => None,
        }
    }

    fn child_mut(&mut self, segment: &PathSegment) -> Option<&mut ArtistTree<A>> {
        match (self, segment) {
            (ArtistTree::Map(entries), PathSegment::Key(key)) => {
                entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            (ArtistTree::List(items), PathSegment::Index(i)) => items.get_mut(*i),
            _ => None,
        }
    }

    /// Resolves `path` to a subtree.
    pub fn get(&self, path: &ConfigPath) -> Option<&ArtistTree<A>> {
        path.segments()
            .iter()
            .try_fold(self, |tree, segment| tree.child(segment))
    }

    fn get_mut(&mut self, path: &ConfigPath) -> Option<&mut ArtistTree<A>> {
        let mut tree = self;
        for segment in path.segments() {
            tree = tree.child_mut(segment)?;
        }
        Some(tree)
    }

    fn remove_child(&mut self, segment: &PathSegment) -> Option<ArtistTree<A>> {
        match (self, segment) {
            (ArtistTree::Map(entries), PathSegment::Key(key)) => {
                let position = entries.iter().position(|(k, _)| k == key)?;
                Some(entries.remove(position).1)
            }
            (ArtistTree::List(items), PathSegment::Index(i)) if *i < items.len() => {
                Some(items.remove(*i))
            }
            _ => None,
        }
    }

    /// Inserts or replaces the child addressed by `segment`, returning the
    /// replaced subtree. A list index may be one past the end to append.
    fn insert_child(&mut self, segment: &PathSegment, tree: ArtistTree<A>) -> std::result::Result<Option<ArtistTree<A>>, ArtistTree<A>> {
        match (self, segment) {
            (ArtistTree::Map(entries), PathSegment::Key(key)) => {
                match entries.iter_mut().find(|(k, _)| k == key) {
                    Some((_, existing)) => Ok(Some(std::mem::replace(existing, tree))),
                    None => {
                        entries.push((key.clone(), tree));
                        Ok(None)
                    }
                }
            }
            (ArtistTree::List(items), PathSegment::Index(i)) if *i < items.len() => {
                Ok(Some(std::mem::replace(&mut items[*i], tree)))
            }
            (ArtistTree::List(items), PathSegment::Index(i)) if *i == items.len() => {
                items.push(tree);
                Ok(None)
            }
            _ => Err(tree),
        }
    }

    /// Iterates over every artist in insertion order.
    ///
    /// The walk uses an explicit stack, so depth is bounded only by memory.
    pub fn artists(&self) -> Artists<'_, A> {
        Artists { stack: vec![self] }
    }

    /// Returns the number of artists in the tree.
    pub fn artist_count(&self) -> usize {
        self.artists().count()
    }

    /// Returns true if the tree holds no artists.
    pub fn is_empty(&self) -> bool {
        self.artists().next().is_none()
    }
}

impl<A> From<Vec<ArtistTree<A>>> for ArtistTree<A> {
    fn from(items: Vec<ArtistTree<A>>) -> Self {
        ArtistTree::List(items)
    }
}

/// Depth-first iterator over the artists of an [`ArtistTree`].
pub struct Artists<'a, A> {
    stack: Vec<&'a ArtistTree<A>>,
}

impl<'a, A> Iterator for Artists<'a, A> {
    type Item = &'a A;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(tree) = self.stack.pop() {
            match tree {
                ArtistTree::Artist(artist) => return Some(artist),
                ArtistTree::List(items) => self.stack.extend(items.iter().rev()),
                ArtistTree::Map(entries) => self.stack.extend(entries.iter().rev().map(|(_, v)| v)),
            }
        }
        None
    }
}

/// A flag raised by a configuration change and consumed by a redraw.
///
/// Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct RedrawRequest {
    pending: Arc<AtomicBool>,
}

impl RedrawRequest {
    /// Creates a request that is not pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag whenever `signal` is emitted.
    ///
    /// Typically connected to a tree model's `dict_modified`.
    pub fn connect_to(&self, signal: &Signal<()>) -> ConnectionId {
        let pending = self.pending.clone();
        signal.connect(move |_| pending.store(true, Ordering::Release))
    }

    /// Raises the flag.
    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Returns true if a redraw has been requested.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }
}

/// Redraws animated artists over a cached background.
pub struct BlitManager<B: RenderBackend> {
    backend: B,
    background: Option<B::Background>,
    artists: ArtistTree<B::Artist>,
    connected: bool,
    redraw: RedrawRequest,
}

impl<B: RenderBackend> BlitManager<B> {
    /// Creates a manager connected to the backend's draw events.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            background: None,
            artists: ArtistTree::map(),
            connected: true,
            redraw: RedrawRequest::new(),
        }
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the backend mutably.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Returns the managed artists.
    pub fn artists(&self) -> &ArtistTree<B::Artist> {
        &self.artists
    }

    /// Returns true if a background snapshot is cached.
    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    /// Drops the cached background, e.g. after the canvas was resized.
    pub fn invalidate_background(&mut self) {
        self.background = None;
    }

    /// Returns true until [`disconnect`](Self::disconnect) is called.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Returns a handle that schedules a redraw on the next
    /// [`update_if_requested`](Self::update_if_requested).
    pub fn redraw_request(&self) -> RedrawRequest {
        self.redraw.clone()
    }

    /// Caches a fresh background and draws all artists.
    ///
    /// Events from another canvas are rejected with
    /// [`TreeError::CanvasMismatch`]. `None` means a direct call.
    pub fn on_draw(&mut self, event_canvas: Option<&str>) -> Result<()> {
        if let Some(canvas) = event_canvas {
            if canvas != self.backend.canvas_id() {
                return Err(TreeError::CanvasMismatch {
                    expected: self.backend.canvas_id().to_string(),
                    found: canvas.to_string(),
                });
            }
        }
        self.background = Some(self.backend.copy_background());
        self.draw_all_artists();
        Ok(())
    }

    /// Handles a draw event from the toolkit. Ignored once disconnected.
    pub fn draw_event(&mut self, canvas: &str) -> Result<()> {
        if !self.connected {
            return Ok(());
        }
        self.on_draw(Some(canvas))
    }

    /// Restores the background, redraws all artists and blits.
    ///
    /// Without a cached background this caches one first, exactly like a
    /// draw event would. Events are flushed either way.
    pub fn update(&mut self) {
        let _perf = PerfSpan::new(span_names::BLIT);
        let restored = match &self.background {
            Some(background) => {
                self.backend.restore_background(background);
                true
            }
            None => {
                self.background = Some(self.backend.copy_background());
                false
            }
        };
        self.draw_all_artists();
        if restored {
            self.backend.blit();
        }
        self.backend.flush_events();
    }

    /// Runs [`update`](Self::update) if a redraw was requested since the
    /// last call. Returns true if it did.
    pub fn update_if_requested(&mut self) -> bool {
        if !self.connected || !self.redraw.take() {
            return false;
        }
        self.update();
        true
    }

    /// Draws every artist in insertion order.
    pub fn draw_all_artists(&mut self) {
        let mut drawn = 0usize;
        for artist in self.artists.artists() {
            self.backend.draw_artist(artist);
            drawn += 1;
        }
        tracing::trace!(target: targets::BLIT, drawn, "drew animated artists");
    }

    /// Places `tree` at `path`, replacing whatever was there.
    ///
    /// Every segment but the last must exist. Replaced artists are removed
    /// from the canvas. An empty path replaces the whole collection.
    pub fn insert_artists(&mut self, path: &ConfigPath, tree: impl Into<ArtistTree<B::Artist>>) -> Result<()> {
        let tree = tree.into();
        let Some(last) = path.last() else {
            let old = std::mem::replace(&mut self.artists, tree);
            self.remove_from_canvas(&old);
            return Ok(());
        };

        let parent_path = path.parent().unwrap_or_default();
        let parent = self
            .artists
            .get_mut(&parent_path)
            .ok_or_else(|| TreeError::path_not_found(path))?;
        match parent.insert_child(last, tree) {
            Ok(Some(old)) => {
                self.remove_from_canvas(&old);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(_) => Err(TreeError::path_not_found(path)),
        }
    }

    /// Removes every artist at or below `path` from the canvas and forgets
    /// them.
    ///
    /// A missing path is a no-op. An empty path removes everything.
    pub fn remove_artists(&mut self, path: &ConfigPath) {
        let removed = match path.last() {
            None => std::mem::take(&mut self.artists),
            Some(last) => {
                let parent_path = path.parent().unwrap_or_default();
                let Some(removed) = self
                    .artists
                    .get_mut(&parent_path)
                    .and_then(|parent| parent.remove_child(last))
                else {
                    return;
                };
                removed
            }
        };
        tracing::debug!(target: targets::BLIT, %path, count = removed.artist_count(), "removing artists");
        self.remove_from_canvas(&removed);
    }

    /// Removes all artists.
    pub fn remove_all_artists(&mut self) {
        self.remove_artists(&ConfigPath::root());
    }

    /// Removes all artists and stops reacting to draw events and redraw
    /// requests.
    pub fn disconnect(&mut self) {
        self.remove_all_artists();
        self.connected = false;
        self.redraw.take();
    }

    fn remove_from_canvas(&mut self, tree: &ArtistTree<B::Artist>) {
        for artist in tree.artists() {
            self.backend.remove_artist(artist);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        events: Vec<String>,
        snapshots: u32,
    }

    impl RenderBackend for Recorder {
        type Background = u32;
        type Artist = String;

        fn canvas_id(&self) -> &str {
            "canvas-1"
        }

        fn copy_background(&mut self) -> u32 {
            self.snapshots += 1;
            self.events.push(format!("copy {}", self.snapshots));
            self.snapshots
        }

        fn restore_background(&mut self, background: &u32) {
            self.events.push(format!("restore {background}"));
        }

        fn draw_artist(&mut self, artist: &String) {
            self.events.push(format!("draw {artist}"));
        }

        fn remove_artist(&mut self, artist: &String) {
            self.events.push(format!("remove {artist}"));
        }

        fn blit(&mut self) {
            self.events.push("blit".into());
        }

        fn flush_events(&mut self) {
            self.events.push("flush".into());
        }
    }

    fn artist(name: &str) -> ArtistTree<String> {
        ArtistTree::Artist(name.to_string())
    }

    fn manager() -> BlitManager<Recorder> {
        let mut manager = BlitManager::new(Recorder::default());
        let tree = ArtistTree::map()
            .with("rings", vec![artist("ring_0"), artist("ring_1")])
            .with(
                "labels",
                ArtistTree::map()
                    .with("panel_0", artist("label_0"))
                    .with("panel_1", vec![artist("label_1a"), artist("label_1b")]),
            );
        manager.insert_artists(&ConfigPath::root(), tree).unwrap();
        manager.backend_mut().events.clear();
        manager
    }

    #[test]
    fn test_artists_in_insertion_order() {
        let manager = manager();
        let names: Vec<_> = manager.artists().artists().cloned().collect();
        assert_eq!(names, vec!["ring_0", "ring_1", "label_0", "label_1a", "label_1b"]);
    }

    #[test]
    fn test_update_without_background_caches_one() {
        let mut manager = manager();
        manager.update();
        assert!(manager.has_background());
        assert_eq!(
            manager.backend().events,
            vec!["copy 1", "draw ring_0", "draw ring_1", "draw label_0", "draw label_1a", "draw label_1b", "flush"]
        );
    }

    #[test]
    fn test_update_restores_cached_background() {
        let mut manager = manager();
        manager.on_draw(None).unwrap();
        manager.backend_mut().events.clear();

        manager.update();
        let events = &manager.backend().events;
        assert_eq!(events.first().map(String::as_str), Some("restore 1"));
        assert_eq!(&events[events.len() - 2..], &["blit".to_string(), "flush".to_string()]);
        assert_eq!(manager.backend().snapshots, 1);
    }

    #[test]
    fn test_invalidated_background_is_copied_again() {
        let mut manager = manager();
        manager.update();
        manager.invalidate_background();
        assert!(!manager.has_background());
        manager.backend_mut().events.clear();

        manager.update();
        let events = &manager.backend().events;
        assert_eq!(events.first().map(String::as_str), Some("copy 2"));
        assert!(!events.iter().any(|e| e == "blit" || e.starts_with("restore")));
        assert!(manager.has_background());
    }

    #[test]
    fn test_on_draw_rejects_foreign_canvas() {
        let mut manager = manager();
        let err = manager.on_draw(Some("canvas-2")).unwrap_err();
        assert_eq!(
            err,
            TreeError::CanvasMismatch {
                expected: "canvas-1".into(),
                found: "canvas-2".into(),
            }
        );
        assert!(!manager.has_background());
    }

    #[test]
    fn test_remove_nested_path() {
        let mut manager = manager();
        manager.remove_artists(&ConfigPath::from(["labels", "panel_1"]));
        assert_eq!(manager.backend().events, vec!["remove label_1a", "remove label_1b"]);
        assert_eq!(manager.artists().artist_count(), 3);

        let mut ring = ConfigPath::from(["rings"]);
        ring.push(0usize);
        manager.remove_artists(&ring);
        let names: Vec<_> = manager.artists().artists().cloned().collect();
        assert_eq!(names, vec!["ring_1", "label_0"]);
    }

    #[test]
    fn test_remove_missing_path_is_noop() {
        let mut manager = manager();
        manager.remove_artists(&ConfigPath::from(["labels", "panel_9"]));
        manager.remove_artists(&ConfigPath::from(["nope", "deeper"]));
        assert!(manager.backend().events.is_empty());
        assert_eq!(manager.artists().artist_count(), 5);
    }

    #[test]
    fn test_remove_empty_path_removes_everything() {
        let mut manager = manager();
        manager.remove_artists(&ConfigPath::root());
        assert_eq!(manager.backend().events.len(), 5);
        assert!(manager.artists().is_empty());
    }

    #[test]
    fn test_insert_replaces_and_removes_old() {
        let mut manager = manager();
        manager
            .insert_artists(&ConfigPath::from(["labels", "panel_0"]), artist("label_0b"))
            .unwrap();
        assert_eq!(manager.backend().events, vec!["remove label_0"]);

        let err = manager
            .insert_artists(&ConfigPath::from(["missing", "x"]), artist("y"))
            .unwrap_err();
        assert!(matches!(err, TreeError::PathNotFound { .. }));
    }

    #[test]
    fn test_redraw_request_and_disconnect() {
        let mut manager = manager();
        let signal = Signal::<()>::new();
        manager.redraw_request().connect_to(&signal);

        assert!(!manager.update_if_requested());
        signal.emit(());
        assert!(manager.update_if_requested());
        assert!(!manager.update_if_requested());

        manager.disconnect();
        assert!(manager.artists().is_empty());
        signal.emit(());
        assert!(!manager.update_if_requested());
        manager.draw_event("canvas-2").unwrap();
        assert!(!manager.is_connected());
    }

    #[test]
    fn test_deep_tree_walk() {
        let mut tree = artist("leaf");
        for _ in 0..1_000 {
            tree = ArtistTree::List(vec![tree]);
        }
        assert_eq!(tree.artist_count(), 1);
    }
}
