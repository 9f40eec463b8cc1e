//! In-memory level entity.

use crate::dictionary::{DictValue, Dictionary};

/// Dictionary keys for the level fields this workspace reads or writes.
pub mod keys {
    /// Class marker written at the top of every level dictionary.
    pub const CLASS: &str = "kCEK";
    /// Value of [`CLASS`] for a level.
    pub const LEVEL_CLASS: i64 = 4;
    pub const NAME: &str = "k2";
    pub const DESCRIPTION: &str = "k3";
    pub const LEVEL_STRING: &str = "k4";
    pub const OFFICIAL_SONG: &str = "k8";
    pub const LEVEL_TYPE: &str = "k21";
    pub const SONG_ID: &str = "k45";
}

/// Where a level came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelType {
    /// No type recorded.
    #[default]
    Unset,
    Official,
    /// Locally authored, shown under "My Levels".
    Editor,
    Saved,
    Online,
    Other(i64),
}

impl LevelType {
    /// Decode the stored integer code.
    #[must_use]
    pub const fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Unset,
            1 => Self::Official,
            2 => Self::Editor,
            3 => Self::Saved,
            4 => Self::Online,
            other => Self::Other(other),
        }
    }

    /// The stored integer code.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Unset => 0,
            Self::Official => 1,
            Self::Editor => 2,
            Self::Saved => 3,
            Self::Online => 4,
            Self::Other(code) => code,
        }
    }
}

/// A single editable level.
///
/// The typed fields cover every key the container codec touches. All other
/// keys are carried in `extra` so that a level survives a parse/serialize
/// cycle unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Level {
    pub name: String,
    /// Description as stored in the document (base64 text in current files).
    pub description: String,
    /// Semicolon-delimited object records.
    pub level_string: String,
    pub official_song: i64,
    pub level_type: LevelType,
    /// Custom song id, `0` when the level uses an official track.
    pub song_id: i64,
    /// In-memory only; never written to the dictionary.
    pub editable: bool,
    pub extra: Dictionary,
}

impl Level {
    /// Create an empty level with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether the level references a downloaded custom song.
    #[must_use]
    pub fn uses_custom_song(&self) -> bool {
        self.song_id > 0
    }

    /// Number of object records, excluding the leading header record.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.level_string
            .split(';')
            .skip(1)
            .filter(|record| !record.is_empty())
            .count()
    }

    /// Build a level from a parsed dictionary.
    ///
    /// Keys whose stored type does not match the typed field stay in `extra`.
    #[must_use]
    pub fn from_dictionary(dict: Dictionary) -> Self {
        let mut level = Self::default();
        for (key, value) in dict {
            let leftover = match key.as_str() {
                keys::CLASS if value.as_integer() == Some(keys::LEVEL_CLASS) => None,
                keys::NAME => take_string(value, &mut level.name),
                keys::DESCRIPTION => take_string(value, &mut level.description),
                keys::LEVEL_STRING => take_string(value, &mut level.level_string),
                keys::OFFICIAL_SONG => take_integer(value, &mut level.official_song),
                keys::SONG_ID => take_integer(value, &mut level.song_id),
                keys::LEVEL_TYPE => {
                    let mut code = 0;
                    let leftover = take_integer(value, &mut code);
                    level.level_type = LevelType::from_code(code);
                    leftover
                }
                _ => Some(value),
            };
            if let Some(value) = leftover {
                level.extra.insert(key, value);
            }
        }
        level
    }

    /// Flatten the level into a dictionary, typed keys first.
    ///
    /// Empty strings and zero integers are omitted. The class marker is
    /// [`keys::LEVEL_CLASS`] unless `extra` carries its own.
    #[must_use]
    pub fn to_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        let class = self
            .extra
            .get(keys::CLASS)
            .cloned()
            .unwrap_or(DictValue::Integer(keys::LEVEL_CLASS));
        dict.insert(keys::CLASS, class);
        put_string(&mut dict, keys::NAME, &self.name);
        put_string(&mut dict, keys::DESCRIPTION, &self.description);
        put_string(&mut dict, keys::LEVEL_STRING, &self.level_string);
        put_integer(&mut dict, keys::OFFICIAL_SONG, self.official_song);
        put_integer(&mut dict, keys::LEVEL_TYPE, self.level_type.code());
        put_integer(&mut dict, keys::SONG_ID, self.song_id);
        for (key, value) in self.extra.iter() {
            if dict.get(key).is_none() {
                dict.insert(key, value.clone());
            }
        }
        dict
    }
}

fn take_string(value: DictValue, slot: &mut String) -> Option<DictValue> {
    match value {
        DictValue::String(text) => {
            *slot = text;
            None
        }
        other => Some(other),
    }
}

fn take_integer(value: DictValue, slot: &mut i64) -> Option<DictValue> {
    match value {
        DictValue::Integer(number) => {
            *slot = number;
            None
        }
        DictValue::String(text) => match text.trim().parse::<i64>() {
            Ok(number) => {
                *slot = number;
                None
            }
            Err(_) => Some(DictValue::String(text)),
        },
        other => Some(other),
    }
}

fn put_string(dict: &mut Dictionary, key: &str, value: &str) {
    if !value.is_empty() {
        dict.insert(key, value);
    }
}

fn put_integer(dict: &mut Dictionary, key: &str, value: i64) {
    if value != 0 {
        dict.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_count_skips_header_and_empty_records() {
        let mut level = Level::new("count");
        level.level_string = "kS38,1_40_2_125;1,1,2,15;1,8,2,45;;".to_string();
        assert_eq!(level.object_count(), 2);

        level.level_string.clear();
        assert_eq!(level.object_count(), 0);
    }

    #[test]
    fn test_dictionary_roundtrip_keeps_extra_order() {
        let mut level = Level::new("Extras");
        level.song_id = 467_339;
        level.level_type = LevelType::Editor;
        level.extra.insert("k18", 3_i64);
        level.extra.insert("k5", "Creator");

        let rebuilt = Level::from_dictionary(level.to_dictionary());
        assert_eq!(rebuilt, level);
        let keys: Vec<&str> = rebuilt.extra.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["k18", "k5"]);
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let mut dict = Dictionary::new();
        dict.insert(keys::SONG_ID, "1001");
        dict.insert(keys::OFFICIAL_SONG, "not a number");

        let level = Level::from_dictionary(dict);
        assert_eq!(level.song_id, 1001);
        assert!(level.uses_custom_song());
        assert_eq!(level.official_song, 0);
        assert_eq!(
            level.extra.get(keys::OFFICIAL_SONG),
            Some(&DictValue::String("not a number".to_string()))
        );
    }

    #[test]
    fn test_foreign_class_marker_is_kept() {
        let mut dict = Dictionary::new();
        dict.insert(keys::CLASS, 5_i64);
        dict.insert(keys::NAME, "Odd");

        let level = Level::from_dictionary(dict);
        assert_eq!(level.extra.get(keys::CLASS), Some(&DictValue::Integer(5)));
        let rebuilt = level.to_dictionary();
        assert_eq!(rebuilt.get(keys::CLASS), Some(&DictValue::Integer(5)));
        assert_eq!(Level::from_dictionary(rebuilt), level);
    }

    #[test]
    fn test_level_type_codes() {
        assert_eq!(LevelType::from_code(2), LevelType::Editor);
        assert_eq!(LevelType::from_code(9), LevelType::Other(9));
        assert_eq!(LevelType::Online.code(), 4);
    }
}
