#![forbid(unsafe_code)]

//! Binding joins declared in a map file.

use std::rc::Rc;

use joinbind_core::{Analog, ChannelIdentity, Digital, Serial};
use joinbind_harness::RecordingProvider;
use joinbind_runtime::{JoinMap, JoinMapError, JoinScope};

const PANEL_JSON: &str = r#"{
  "joins": {
    "power":   { "kind": "boolean", "join": 1 },
    "volume":  { "kind": "analog",  "join": 1, "read_only": true },
    "display": { "kind": "string",  "join": 5, "description": "Now playing" }
  }
}"#;

#[test]
fn panel_map_drives_bindings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("panel.json");
    std::fs::write(&path, PANEL_JSON).unwrap();

    let map = JoinMap::load(&path).unwrap();
    let p = Rc::new(RecordingProvider::new());
    let mut scope = JoinScope::new();

    let power = map.bind::<Digital, _>(&p, "power").unwrap();
    let power_pub = power.publisher();
    scope.hold(power);
    let volume = map.bind_read_only::<Analog, _>(&p, "volume").unwrap();
    let level = volume.state();
    scope.hold(volume);

    power_pub.publish(true);
    p.feedback::<Analog>(1, 64.0);
    assert_eq!(level.get(), 64.0);
    assert_eq!(p.published(ChannelIdentity::of::<Digital>(1)).len(), 1);
    assert_eq!(p.live_count(), 2);

    drop(scope);
    assert_eq!(p.live_count(), 0);
}

#[test]
fn wrong_marker_is_reported_not_bound() {
    let map = JoinMap::from_json_str(PANEL_JSON).unwrap();
    let p = Rc::new(RecordingProvider::new());

    let err = map.bind_read_only::<Serial, _>(&p, "power").unwrap_err();
    assert!(matches!(err, JoinMapError::KindMismatch { .. }));
    assert!(p.calls().is_empty());
}
