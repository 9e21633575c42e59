// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;

#[test]
fn serializes_with_camel_case_field_names() {
    let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
    let entry = AutostartEntry::new("Greeter.csx", at);

    let json = serde_json::to_value(&entry).unwrap();

    assert_eq!(json["fileName"], "Greeter.csx");
    assert_eq!(json["addedAt"], "2026-03-14T09:26:53Z");
    assert!(json.get("script_id").is_none());
}

#[test]
fn deserializes_offset_timestamps() {
    let json = r#"{ "fileName": "Pets.csx", "addedAt": "2026-03-14T11:26:53+02:00" }"#;

    let entry: AutostartEntry = serde_json::from_str(json).unwrap();

    assert_eq!(entry.script_id, "pets.csx");
    assert_eq!(
        entry.added_at,
        Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap()
    );
}

#[test]
fn equality_follows_script_id_case_rules() {
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(
        AutostartEntry::new("Foo.lua", at),
        AutostartEntry::new("FOO.LUA", at)
    );
}
