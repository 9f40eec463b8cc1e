//! Plist dictionary codec.
//!
//! Current documents look like
//! `<?xml version="1.0"?><plist version="1.0" gjver="2.0"><dict><k>k2</k><s>Name</s>…</dict></plist>`
//! and use the short tag vocabulary (`k`, `s`, `i`, `r`, `t`, `d`). Older
//! documents omit the `gjver` attribute and may use the long Apple plist
//! vocabulary (`key`, `string`, `integer`, `real`, `true`, `false`, `dict`).
//! Both are accepted on read; writes always produce the current layout.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesDecl, BytesEnd, BytesRef, BytesStart, BytesText, Event};
use tracing::trace;

use crate::codec::{LevelCodec, ParsedLevel};
use crate::dictionary::{DictValue, Dictionary};
use crate::error::{DictError, Result};
use crate::level::Level;

const PLIST_VERSION: &str = "1.0";
const GJ_VERSION: &str = "2.0";

/// Default [`LevelCodec`] reading and writing plist level documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlistLevelCodec;

impl PlistLevelCodec {
    /// Create a new codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LevelCodec for PlistLevelCodec {
    fn parse(&self, raw: &str) -> Result<ParsedLevel> {
        let (dict, legacy) = DictReader::new(raw).read_document()?;
        trace!(keys = dict.len(), legacy, "parsed level dictionary");
        Ok(ParsedLevel {
            level: Level::from_dictionary(dict),
            legacy,
        })
    }

    fn serialize(&self, level: &Level) -> Result<String> {
        write_document(&level.to_dictionary())
    }
}

/// Element roles, independent of which tag vocabulary spelled them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Key,
    String,
    Integer,
    Real,
    True,
    False,
    Dict,
    Plist,
}

impl Tag {
    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"k" | b"key" => Some(Self::Key),
            b"s" | b"string" => Some(Self::String),
            b"i" | b"integer" => Some(Self::Integer),
            b"r" | b"real" => Some(Self::Real),
            b"t" | b"true" => Some(Self::True),
            b"f" | b"false" => Some(Self::False),
            b"d" | b"dict" => Some(Self::Dict),
            b"plist" => Some(Self::Plist),
            _ => None,
        }
    }
}

fn element_name(name: &[u8]) -> String {
    String::from_utf8_lossy(name).into_owned()
}

fn is_blank(text: &BytesText<'_>) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

struct DictReader<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> DictReader<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            reader: Reader::from_str(raw),
        }
    }

    /// Read the root dictionary and report whether the layout is legacy.
    fn read_document(mut self) -> Result<(Dictionary, bool)> {
        let legacy = loop {
            match self.reader.read_event()? {
                Event::Start(start) => match Tag::from_name(start.name().as_ref()) {
                    Some(Tag::Plist) => {
                        let gjver = start
                            .try_get_attribute("gjver")
                            .map_err(quick_xml::Error::from)?;
                        break gjver.is_none();
                    }
                    // A bare root dictionary predates the plist wrapper.
                    Some(Tag::Dict) => return Ok((self.read_dict()?, true)),
                    _ => {
                        return Err(DictError::unexpected(
                            element_name(start.name().as_ref()),
                            "document",
                        ));
                    }
                },
                Event::Text(text) if is_blank(&text) => {}
                Event::Decl(_) | Event::Comment(_) | Event::DocType(_) | Event::PI(_) => {}
                Event::Eof => return Err(DictError::MissingRoot),
                other => return Err(unexpected_event(&other, "document")),
            }
        };

        loop {
            match self.reader.read_event()? {
                Event::Start(start) if Tag::from_name(start.name().as_ref()) == Some(Tag::Dict) => {
                    return Ok((self.read_dict()?, legacy));
                }
                Event::Empty(start) if Tag::from_name(start.name().as_ref()) == Some(Tag::Dict) => {
                    return Ok((Dictionary::new(), legacy));
                }
                Event::Text(text) if is_blank(&text) => {}
                Event::Comment(_) => {}
                Event::End(_) | Event::Eof => return Err(DictError::MissingRoot),
                other => return Err(unexpected_event(&other, "plist")),
            }
        }
    }

    fn read_dict(&mut self) -> Result<Dictionary> {
        let mut dict = Dictionary::new();
        loop {
            match self.reader.read_event()? {
                Event::Start(start) => match Tag::from_name(start.name().as_ref()) {
                    Some(Tag::Key) => {
                        let key = self.read_text(start.name().as_ref().to_vec(), "key")?;
                        let value = self.read_value(&key)?;
                        dict.insert(key, value);
                    }
                    _ => {
                        return Err(DictError::unexpected(
                            element_name(start.name().as_ref()),
                            "dictionary",
                        ));
                    }
                },
                Event::End(end) if Tag::from_name(end.name().as_ref()) == Some(Tag::Dict) => {
                    return Ok(dict);
                }
                Event::Text(text) if is_blank(&text) => {}
                Event::Comment(_) => {}
                Event::Eof => return Err(DictError::UnexpectedEof { context: "dictionary" }),
                other => return Err(unexpected_event(&other, "dictionary")),
            }
        }
    }

    fn read_value(&mut self, key: &str) -> Result<DictValue> {
        loop {
            match self.reader.read_event()? {
                Event::Start(start) => {
                    let name = start.name().as_ref().to_vec();
                    return match Tag::from_name(&name) {
                        Some(Tag::String) => Ok(DictValue::String(self.read_text(name, "string")?)),
                        Some(Tag::Integer) => {
                            let text = self.read_text(name, "integer")?;
                            parse_integer(key, &text)
                        }
                        Some(Tag::Real) => {
                            let text = self.read_text(name, "real")?;
                            parse_real(key, &text)
                        }
                        Some(Tag::True) => {
                            self.read_text(name, "bool")?;
                            Ok(DictValue::Bool(true))
                        }
                        Some(Tag::False) => {
                            self.read_text(name, "bool")?;
                            Ok(DictValue::Bool(false))
                        }
                        Some(Tag::Dict) => Ok(DictValue::Dict(self.read_dict()?)),
                        _ => Err(DictError::unexpected(element_name(&name), "value")),
                    };
                }
                Event::Empty(start) => {
                    return match Tag::from_name(start.name().as_ref()) {
                        Some(Tag::True) => Ok(DictValue::Bool(true)),
                        Some(Tag::False) => Ok(DictValue::Bool(false)),
                        Some(Tag::String) => Ok(DictValue::String(String::new())),
                        Some(Tag::Dict) => Ok(DictValue::Dict(Dictionary::new())),
                        Some(Tag::Integer) => parse_integer(key, ""),
                        Some(Tag::Real) => parse_real(key, ""),
                        _ => Err(DictError::unexpected(
                            element_name(start.name().as_ref()),
                            "value",
                        )),
                    };
                }
                Event::Text(text) if is_blank(&text) => {}
                Event::Comment(_) => {}
                Event::Eof => return Err(DictError::UnexpectedEof { context: "value" }),
                other => return Err(unexpected_event(&other, "value")),
            }
        }
    }

    /// Collect the text content of an element up to its end tag.
    fn read_text(&mut self, end: Vec<u8>, context: &'static str) -> Result<String> {
        let mut out = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(text) => {
                    out.push_str(&text.decode().map_err(quick_xml::Error::from)?);
                }
                Event::CData(data) => {
                    out.push_str(&data.decode().map_err(quick_xml::Error::from)?);
                }
                Event::GeneralRef(reference) => resolve_reference(&reference, &mut out)?,
                Event::End(tag) if tag.name().as_ref() == end.as_slice() => return Ok(out),
                Event::Comment(_) => {}
                Event::Eof => return Err(DictError::UnexpectedEof { context }),
                other => return Err(unexpected_event(&other, context)),
            }
        }
    }
}

fn resolve_reference(reference: &BytesRef<'_>, out: &mut String) -> Result<()> {
    let name = reference.decode().map_err(quick_xml::Error::from)?;
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        return match parsed.and_then(char::from_u32) {
            Some(ch) => {
                out.push(ch);
                Ok(())
            }
            None => Err(DictError::UnknownEntity(name.into_owned())),
        };
    }
    match resolve_predefined_entity(&name) {
        Some(text) => {
            out.push_str(text);
            Ok(())
        }
        None => Err(DictError::UnknownEntity(name.into_owned())),
    }
}

fn unexpected_event(event: &Event<'_>, context: &'static str) -> DictError {
    let found = match event {
        Event::Start(start) | Event::Empty(start) => element_name(start.name().as_ref()),
        Event::End(end) => format!("/{}", element_name(end.name().as_ref())),
        Event::Text(_) | Event::CData(_) | Event::GeneralRef(_) => "#text".to_string(),
        _ => "#markup".to_string(),
    };
    DictError::unexpected(found, context)
}

fn parse_integer(key: &str, text: &str) -> Result<DictValue> {
    text.trim()
        .parse::<i64>()
        .map(DictValue::Integer)
        .map_err(|_| DictError::invalid_number(key, "integer", text))
}

fn parse_real(key: &str, text: &str) -> Result<DictValue> {
    text.trim()
        .parse::<f64>()
        .map(DictValue::Real)
        .map_err(|_| DictError::invalid_number(key, "real", text))
}

fn write_document(dict: &Dictionary) -> Result<String> {
    let mut xml = Writer::new(Vec::new());
    xml.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;

    let mut root = BytesStart::new("plist");
    root.push_attribute(("version", PLIST_VERSION));
    root.push_attribute(("gjver", GJ_VERSION));
    xml.write_event(Event::Start(root))?;
    write_dict(&mut xml, dict)?;
    xml.write_event(Event::End(BytesEnd::new("plist")))?;

    Ok(String::from_utf8(xml.into_inner())?)
}

fn write_dict(xml: &mut Writer<Vec<u8>>, dict: &Dictionary) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new("dict")))?;
    for (key, value) in dict.iter() {
        write_element(xml, "k", key)?;
        match value {
            DictValue::Integer(number) => write_element(xml, "i", &number.to_string())?,
            DictValue::Real(number) => write_element(xml, "r", &number.to_string())?,
            DictValue::String(text) => write_element(xml, "s", text)?,
            DictValue::Bool(true) => xml.write_event(Event::Empty(BytesStart::new("t")))?,
            DictValue::Bool(false) => xml.write_event(Event::Empty(BytesStart::new("f")))?,
            DictValue::Dict(nested) => write_dict(xml, nested)?,
        }
    }
    xml.write_event(Event::End(BytesEnd::new("dict")))?;
    Ok(())
}

fn write_element(xml: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(tag)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelType;

    const MODERN: &str = r#"<?xml version="1.0"?><plist version="1.0" gjver="2.0"><dict><k>kCEK</k><i>4</i><k>k2</k><s>Bloodbath</s><k>k3</k><s>VGhlIGhhcmRlc3Q=</s><k>k4</k><s>kS38,1;1,1,2,15,3,15;</s><k>k21</k><i>2</i><k>k45</k><i>467339</i><k>k13</k><t /><k>k16</k><r>1.5</r></dict></plist>"#;

    const LEGACY: &str = r#"<?xml version="1.0"?>
<plist version="1.0">
  <dict>
    <key>k2</key><string>Old &amp; Gold</string>
    <key>k3</key><string>T2xk</string>
    <key>k8</key><integer>3</integer>
    <key>k99</key><false/>
  </dict>
</plist>"#;

    #[test]
    fn test_parses_modern_document() {
        let parsed = PlistLevelCodec::new().parse(MODERN).unwrap();
        assert!(!parsed.legacy);
        let level = parsed.level;
        assert_eq!(level.name, "Bloodbath");
        assert_eq!(level.description, "VGhlIGhhcmRlc3Q=");
        assert_eq!(level.level_string, "kS38,1;1,1,2,15,3,15;");
        assert_eq!(level.level_type, LevelType::Editor);
        assert_eq!(level.song_id, 467_339);
        assert_eq!(level.extra.get("k13"), Some(&DictValue::Bool(true)));
        assert_eq!(level.extra.get("k16"), Some(&DictValue::Real(1.5)));
    }

    #[test]
    fn test_parses_legacy_document() {
        let parsed = PlistLevelCodec::new().parse(LEGACY).unwrap();
        assert!(parsed.legacy);
        assert_eq!(parsed.level.name, "Old & Gold");
        assert_eq!(parsed.level.description, "T2xk");
        assert_eq!(parsed.level.official_song, 3);
        assert_eq!(parsed.level.extra.get("k99"), Some(&DictValue::Bool(false)));
    }

    #[test]
    fn test_serialize_writes_modern_layout() {
        let mut level = Level::new("A <tricky> & \"name\"");
        level.level_string = "kS38,1;".to_string();
        let codec = PlistLevelCodec::new();
        let text = codec.serialize(&level).unwrap();

        assert!(text.starts_with(r#"<?xml version="1.0"?><plist version="1.0" gjver="2.0"><dict><k>kCEK</k><i>4</i>"#));
        let parsed = codec.parse(&text).unwrap();
        assert!(!parsed.legacy);
        assert_eq!(parsed.level, level);
    }

    #[test]
    fn test_keeps_surrounding_whitespace_in_strings() {
        let raw = r#"<plist version="1.0" gjver="2.0"><dict><k>k2</k><s>  spaced  </s></dict></plist>"#;
        let parsed = PlistLevelCodec::new().parse(raw).unwrap();
        assert_eq!(parsed.level.name, "  spaced  ");
    }

    #[test]
    fn test_nested_dictionaries_roundtrip() {
        let mut inner = Dictionary::new();
        inner.insert("kA2", 1_i64);
        let mut level = Level::new("Nested");
        level.extra.insert("kI6", inner);

        let codec = PlistLevelCodec::new();
        let parsed = codec.parse(&codec.serialize(&level).unwrap()).unwrap();
        assert_eq!(parsed.level, level);
    }

    #[test]
    fn test_rejects_missing_root() {
        let err = PlistLevelCodec::new().parse("").unwrap_err();
        assert!(matches!(err, DictError::MissingRoot));
    }

    #[test]
    fn test_rejects_bad_integer() {
        let raw = r#"<plist gjver="2.0"><dict><k>k8</k><i>x1</i></dict></plist>"#;
        let err = PlistLevelCodec::new().parse(raw).unwrap_err();
        assert!(matches!(err, DictError::InvalidNumber { kind: "integer", .. }));
    }

    #[test]
    fn test_rejects_truncated_document() {
        let raw = r#"<plist gjver="2.0"><dict><k>k2</k><s>cut"#;
        assert!(PlistLevelCodec::new().parse(raw).is_err());
    }
}
