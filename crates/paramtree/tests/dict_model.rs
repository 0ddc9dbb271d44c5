//! Integration tests for tree structure, resets and option handling.

use std::sync::Arc;

use parking_lot::Mutex;
use paramtree::prelude::*;
use serde_json::json;

fn calibration_document() -> ConfigNode {
    let mut config = ConfigNode::from_json(json!({
        "beam": {
            "energy": {"_value": 65.35, "_vary": false, "_min": 60.0, "_max": 70.0},
            "vector": {
                "azimuth": {"_value": 90.0, "_vary": false, "_min": 80.0, "_max": 100.0},
                "polar": {"_value": 90.0, "_vary": false, "_min": 80.0, "_max": 100.0}
            }
        },
        "detectors": [
            {"distance": {"_value": 1000.0, "_vary": true, "_min": 900.0, "_max": 1100.0}}
        ]
    }));
    config.attach_parameters();
    config
}

fn row_keys(model: &impl ItemModel, parent: &ModelIndex) -> Vec<String> {
    (0..model.row_count(parent))
        .map(|row| model.display_text(&model.index(row, 0, parent)).unwrap_or_default())
        .collect()
}

#[test]
fn reset_with_new_shape_leaves_no_stale_rows() {
    let model = DictTreeModel::new(
        calibration_document().shared(),
        ColumnSchema::default_calibration(),
    );
    let root = ModelIndex::invalid();
    let beam = model.index(0, 0, &root);
    assert_eq!(model.row_count(&beam), 2);

    let events = Arc::new(Mutex::new(Vec::new()));
    let e = events.clone();
    model.signals().model_about_to_reset.connect(move |_| e.lock().push("about"));
    let e = events.clone();
    model.signals().model_reset.connect(move |_| e.lock().push("reset"));

    let flat = ConfigNode::from(ConfigMap::new().with("wavelength", ConfigMap::new().with("_value", 0.5)));
    model.update_from_config(flat.shared());

    assert_eq!(*events.lock(), vec!["about", "reset"]);
    assert_eq!(row_keys(&model, &root), vec!["wavelength"]);
    let wavelength = model.index(0, 0, &root);
    assert_eq!(model.row_count(&wavelength), 0);
    // Indices from the old tree resolve to nothing.
    assert_eq!(model.row_count(&beam), 0);
}

#[test]
fn json_documents_become_calibration_rows() {
    let model = CalibrationTreeModel::new(calibration_document().shared(), CalibrationVariant::Default);
    let root = ModelIndex::invalid();
    assert_eq!(row_keys(&model, &root), vec!["beam", "detectors"]);

    let detectors = model.index(1, 0, &root);
    assert_eq!(row_keys(&model, &detectors), vec!["0"]);
    let first = model.index(0, 0, &detectors);
    assert_eq!(row_keys(&model, &first), vec!["distance"]);

    let mut distance = ConfigPath::from(["detectors"]);
    distance.push(0usize);
    distance.push("distance");
    model.set_config_val(&distance.join("_value"), 1200.0).unwrap();

    let max = model.index_for_path(&distance, 4);
    assert_eq!(model.data(&max, ItemRole::Display).as_float(), Some(1300.0));
}

#[test]
fn blacklisted_paths_are_hidden_and_restored() {
    let model = DictTreeModel::new(
        calibration_document().shared(),
        ColumnSchema::default_calibration(),
    );
    let root = ModelIndex::invalid();

    model.set_blacklisted_paths([["beam", "vector"]]);
    let beam = model.index(0, 0, &root);
    assert_eq!(row_keys(&model, &beam), vec!["energy"]);

    model.set_blacklisted_paths(Vec::<ConfigPath>::new());
    let beam = model.index(0, 0, &root);
    assert_eq!(row_keys(&model, &beam), vec!["energy", "vector"]);
}

#[test]
fn private_keys_can_be_shown() {
    let config = ConfigNode::from(
        ConfigMap::new()
            .with("_internal", 1i64)
            .with("visible", 2i64),
    );
    let model = DictTreeModel::with_options(
        config.shared(),
        ColumnSchema::delta_calibration(),
        TreeModelOptions::new().with_hide_private_keys(false),
    );
    assert_eq!(row_keys(&model, &ModelIndex::invalid()), vec!["_internal", "visible"]);
}

#[test]
fn read_only_models_reject_edits() {
    let model = DictTreeModel::with_options(
        calibration_document().shared(),
        ColumnSchema::default_calibration(),
        TreeModelOptions::new().with_editable(false),
    );
    let energy = model.index_for_path(&ConfigPath::from(["beam", "energy"]), 1);

    assert!(!model.flags(&energy).editable);
    assert!(!model.set_data(&energy, ItemData::Float(61.0), ItemRole::Edit));
    assert_eq!(
        model.get_value(&ConfigPath::from(["beam", "energy", "_value"])).unwrap(),
        ConfigValue::Float(65.35)
    );
}

#[test]
fn options_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("tree.toml");
    TreeModelOptions::new()
        .with_blacklisted_paths([["beam", "vector"]])
        .save(&file)
        .unwrap();

    let model = DictTreeModel::with_options(
        calibration_document().shared(),
        ColumnSchema::default_calibration(),
        TreeModelOptions::load(&file).unwrap(),
    );
    let beam = model.index(0, 0, &ModelIndex::invalid());
    assert_eq!(row_keys(&model, &beam), vec!["energy"]);
}

#[test]
fn json_key_order_becomes_row_order() {
    let config = ConfigNode::from_json(json!({
        "zeta": {"_value": 1.0},
        "alpha": {"_value": 2.0},
        "mid": [3, 4]
    }));
    let model = DictTreeModel::new(config.shared(), ColumnSchema::default_calibration());
    assert_eq!(row_keys(&model, &ModelIndex::invalid()), vec!["zeta", "alpha", "mid"]);
}

#[test]
fn switchable_keys_from_options_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("indexing.toml");
    std::fs::write(
        &file,
        r#"
lists_resizable = false

[[combo_keys]]
parent = ["seed_search", "method"]
key = "label"
default = { filter_radius = 1.0, threshold = 1.0 }

[[combo_keys]]
parent = ["seed_search", "method"]
key = "blob_log"
default = { min_sigma = 0.5, max_sigma = 5.0, num_sigma = 10.0 }
"#,
    )
    .unwrap();

    let config = ConfigNode::from_json(json!({
        "seed_search": {
            "hkl_seeds": [0, 1, 2],
            "method": {"label": {"filter_radius": 1.0, "threshold": 1.0}}
        }
    }));
    let model = DictTreeModel::with_options(
        config.shared(),
        ColumnSchema::default_calibration(),
        TreeModelOptions::load(&file).unwrap(),
    );

    let label = ConfigPath::from(["seed_search", "method", "label"]);
    assert_eq!(model.combo_alternatives(&label), vec!["blob_log"]);
    model.change_combo_item(&label, "blob_log").unwrap();

    let method = model.index_for_path(&ConfigPath::from(["seed_search", "method"]), 0);
    assert_eq!(row_keys(&model, &method), vec!["blob_log"]);
    let blob = model.index(0, 0, &method);
    assert_eq!(row_keys(&model, &blob), vec!["min_sigma", "max_sigma", "num_sigma"]);

    // Lists stay fixed with these options.
    let mut seed = ConfigPath::from(["seed_search", "hkl_seeds"]);
    seed.push(0usize);
    assert!(!model.can_remove_list_item(&seed));
    assert!(matches!(
        model.insert_list_item(&seed),
        Err(TreeError::InvalidStructureEdit { .. })
    ));
}
