//! Property tests for the plist level codec.

use gmd_model::{DictValue, Level, LevelCodec, LevelType, PlistLevelCodec};
use proptest::prelude::*;

fn text() -> impl Strategy<Value = String> {
    // Printable text including XML metacharacters and level-data punctuation.
    "[ -~]{0,40}"
}

fn extra_value() -> impl Strategy<Value = DictValue> {
    prop_oneof![
        any::<i64>().prop_map(DictValue::Integer),
        (-1.0e9f64..1.0e9).prop_map(DictValue::Real),
        text().prop_map(DictValue::String),
        any::<bool>().prop_map(DictValue::Bool),
    ]
}

fn level() -> impl Strategy<Value = Level> {
    (
        text(),
        text(),
        text(),
        any::<i64>(),
        0i64..6,
        any::<i64>(),
        prop::collection::vec(extra_value(), 0..5),
    )
        .prop_map(
            |(name, description, level_string, official_song, kind, song_id, extras)| {
                let mut level = Level {
                    name,
                    description,
                    level_string,
                    official_song,
                    level_type: LevelType::from_code(kind),
                    song_id,
                    ..Level::default()
                };
                for (index, value) in extras.into_iter().enumerate() {
                    level.extra.insert(format!("x{index}"), value);
                }
                level
            },
        )
}

proptest! {
    #[test]
    fn test_parse_inverts_serialize(level in level()) {
        let codec = PlistLevelCodec::new();
        let text = codec.serialize(&level).unwrap();
        let parsed = codec.parse(&text).unwrap();
        prop_assert!(!parsed.legacy);
        prop_assert_eq!(parsed.level, level);
    }
}

#[test]
fn test_editable_flag_is_not_serialized() {
    let mut level = Level::new("Flag");
    level.editable = true;

    let codec = PlistLevelCodec::new();
    let parsed = codec.parse(&codec.serialize(&level).unwrap()).unwrap();
    assert!(!parsed.level.editable);
    assert_eq!(parsed.level.name, "Flag");
}

#[test]
fn test_foreign_class_marker_survives_round_trip() {
    let raw = concat!(
        r#"<?xml version="1.0"?><plist version="1.0" gjver="2.0"><dict>"#,
        "<k>kCEK</k><i>5</i>",
        "<k>k2</k><s>Odd Class</s>",
        "</dict></plist>",
    );
    let codec = PlistLevelCodec::new();
    let first = codec.parse(raw).unwrap().level;
    assert_eq!(first.extra.get("kCEK"), Some(&DictValue::Integer(5)));

    let second = codec.parse(&codec.serialize(&first).unwrap()).unwrap().level;
    assert_eq!(second, first);
}
