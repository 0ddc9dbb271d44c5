//! Integration tests for redrawing artists after configuration edits.

use paramtree::prelude::*;

#[derive(Debug, Default)]
struct Canvas {
    draws: usize,
    blits: usize,
    snapshots: usize,
    removed: Vec<u32>,
}

impl RenderBackend for Canvas {
    type Background = usize;
    type Artist = u32;

    fn canvas_id(&self) -> &str {
        "polar-view"
    }

    fn copy_background(&mut self) -> usize {
        self.snapshots += 1;
        self.snapshots
    }

    fn restore_background(&mut self, _background: &usize) {}

    fn draw_artist(&mut self, _artist: &u32) {
        self.draws += 1;
    }

    fn remove_artist(&mut self, artist: &u32) {
        self.removed.push(*artist);
    }

    fn blit(&mut self) {
        self.blits += 1;
    }

    fn flush_events(&mut self) {}
}

#[test]
fn config_edits_schedule_one_redraw() {
    let param = Parameter::new("tth", 10.0).with_bounds(0.0, 90.0).shared();
    let config = ConfigNode::from(ConfigMap::new().with("tth", ConfigMap::from_parameter(param))).shared();
    let model = CalibrationTreeModel::new(config, CalibrationVariant::Default);

    let mut manager = BlitManager::new(Canvas::default());
    manager
        .insert_artists(
            &ConfigPath::root(),
            ArtistTree::map()
                .with("rings", ArtistTree::list([1u32, 2, 3]))
                .with("overlays", ArtistTree::map().with("spots", ArtistTree::list([4u32]))),
        )
        .unwrap();
    manager.draw_event("polar-view").unwrap();
    assert_eq!(manager.backend().draws, 4);

    manager.redraw_request().connect_to(model.dict_modified());
    model
        .set_config_val(&ConfigPath::from(["tth", "_value"]), 12.5)
        .unwrap();
    model
        .set_config_val(&ConfigPath::from(["tth", "_vary"]), true)
        .unwrap();

    assert!(manager.update_if_requested());
    assert!(!manager.update_if_requested());
    assert_eq!(manager.backend().draws, 8);
    assert_eq!(manager.backend().blits, 1);
    assert_eq!(manager.backend().snapshots, 1);
}

#[test]
fn foreign_draw_events_are_errors() {
    let mut manager = BlitManager::new(Canvas::default());
    let err = manager.draw_event("cartesian-view").unwrap_err();
    assert!(matches!(err, TreeError::CanvasMismatch { .. }));
    assert!(!manager.has_background());
}

#[test]
fn disconnect_removes_every_artist() {
    let mut manager = BlitManager::new(Canvas::default());
    manager
        .insert_artists(&ConfigPath::from(["rings"]), ArtistTree::list([7u32, 8]))
        .unwrap();
    manager
        .insert_artists(&ConfigPath::from(["labels"]), ArtistTree::list([9u32]))
        .unwrap();

    manager.disconnect();
    assert_eq!(manager.backend().removed, vec![7, 8, 9]);
    assert!(!manager.is_connected());
    assert!(manager.artists().is_empty());
}
