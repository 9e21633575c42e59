// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::{HashMap, HashSet};

#[yare::parameterized(
    same          = { "Foo.lua", "Foo.lua", true },
    lower         = { "Foo.lua", "foo.lua", true },
    upper         = { "Foo.lua", "FOO.LUA", true },
    non_ascii     = { "Ärger.lua", "ärger.LUA", true },
    other_name    = { "Foo.lua", "Bar.lua", false },
    prefix        = { "Foo.lua", "Foo.lu", false },
    other_ext     = { "Foo.lua", "Foo.csx", false },
)]
fn matches_ignores_case(left: &str, right: &str, expected: bool) {
    assert_eq!(ScriptId::new(left).matches(right), expected);
    assert_eq!(ScriptId::new(left) == ScriptId::new(right), expected);
}

#[test]
fn hash_agrees_with_eq() {
    let mut set = HashSet::new();
    set.insert(ScriptId::new("Foo.lua"));
    assert!(set.contains(&ScriptId::new("FOO.LUA")));
    assert!(!set.insert(ScriptId::new("foo.lua")));
    assert_eq!(set.len(), 1);

    let mut map = HashMap::new();
    map.insert(ScriptId::new("Greeter.csx"), 1);
    assert_eq!(map.get(&ScriptId::new("greeter.csx")), Some(&1));
}

#[test]
fn original_spelling_is_preserved() {
    let id = ScriptId::new("MyScript.csx");
    assert_eq!(id.as_str(), "MyScript.csx");
    assert_eq!(id.to_string(), "MyScript.csx");
    assert_eq!(id, "myscript.csx");
}

#[yare::parameterized(
    with_ext    = { "Greeter.csx", "Greeter" },
    double_ext  = { "pets.backup.csx", "pets.backup" },
    no_ext      = { "README", "README" },
)]
fn file_stem_drops_extension(id: &str, stem: &str) {
    assert_eq!(ScriptId::new(id).file_stem(), stem);
}

#[test]
fn serializes_as_plain_string() {
    let id = ScriptId::new("Foo.lua");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"Foo.lua\"");
    let back: ScriptId = serde_json::from_str(&json).unwrap();
    assert_eq!(back.as_str(), "Foo.lua");
}
