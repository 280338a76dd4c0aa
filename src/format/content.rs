//! `content.json`: the element tree and document metadata

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::container::{ContainerKind, DrawableContainer};
use crate::domain::{CaptureDetails, ContainerId, Rect};
use crate::error::FormatError;
use crate::fields::{FieldHolder, FieldType, FieldValue, ValueKind};

/// Content version written by this crate
pub const CONTENT_VERSION: u32 = 2;

const TYPE_KEY: &str = "$type";
const VALUE_KEY: &str = "value";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContentJson {
    pub version: u32,
    #[serde(default = "default_counter_start")]
    pub counter_start: i32,
    #[serde(default)]
    pub capture: Option<CaptureDetails>,
    #[serde(default)]
    pub containers: Vec<ContainerJson>,
}

fn default_counter_start() -> i32 {
    1
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ContainerJson {
    #[serde(rename = "$type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ContainerId>,
    pub bounds: Rect,
    #[serde(default)]
    pub fields: BTreeMap<String, WireValue>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ContainerJson>,
}

/// A field value as stored: `{ "$type": <tag>, "value": <v> }`.
///
/// Tags this crate doesn't know are kept so the loader can report them.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WireValue {
    Known(FieldValue),
    Unknown(String),
}

impl Serialize for WireValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = match self {
            WireValue::Known(value) => value,
            WireValue::Unknown(tag) => {
                return Err(serde::ser::Error::custom(format!(
                    "cannot write unknown field value type '{tag}'"
                )));
            }
        };
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(TYPE_KEY, value.kind().tag())?;
        match value {
            FieldValue::Null => {}
            FieldValue::Int(v) => map.serialize_entry(VALUE_KEY, v)?,
            FieldValue::String(v) => map.serialize_entry(VALUE_KEY, v)?,
            FieldValue::Bool(v) => map.serialize_entry(VALUE_KEY, v)?,
            FieldValue::Single(v) => map.serialize_entry(VALUE_KEY, v)?,
            FieldValue::Double(v) | FieldValue::Decimal(v) => map.serialize_entry(VALUE_KEY, v)?,
            FieldValue::Color(v) => map.serialize_entry(VALUE_KEY, v)?,
            FieldValue::ArrowHeads(v) => map.serialize_entry(VALUE_KEY, v)?,
            FieldValue::Flags(v) => map.serialize_entry(VALUE_KEY, v)?,
            FieldValue::PreparedFilter(v) => map.serialize_entry(VALUE_KEY, v)?,
            FieldValue::Alignment(v) => map.serialize_entry(VALUE_KEY, v)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WireValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(WireValueVisitor)
    }
}

struct WireValueVisitor;

impl<'de> Visitor<'de> for WireValueVisitor {
    type Value = WireValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a field value object starting with \"$type\"")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<WireValue, A::Error> {
        match map.next_key::<String>()? {
            Some(key) if key == TYPE_KEY => {}
            Some(key) => {
                return Err(de::Error::custom(format!(
                    "\"$type\" must be the first key of a field value, found \"{key}\""
                )));
            }
            None => return Err(de::Error::missing_field(TYPE_KEY)),
        }
        let tag: String = map.next_value()?;
        let Some(kind) = ValueKind::from_tag(&tag) else {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            return Ok(WireValue::Unknown(tag));
        };

        let mut value = None;
        while let Some(key) = map.next_key::<String>()? {
            if key != VALUE_KEY {
                map.next_value::<IgnoredAny>()?;
                continue;
            }
            if value.is_some() {
                return Err(de::Error::duplicate_field(VALUE_KEY));
            }
            value = Some(match kind {
                ValueKind::Null => {
                    map.next_value::<IgnoredAny>()?;
                    FieldValue::Null
                }
                ValueKind::Int => FieldValue::Int(map.next_value()?),
                ValueKind::String => FieldValue::String(map.next_value()?),
                ValueKind::Bool => FieldValue::Bool(map.next_value()?),
                ValueKind::Single => FieldValue::Single(map.next_value()?),
                ValueKind::Double => FieldValue::Double(map.next_value()?),
                ValueKind::Decimal => FieldValue::Decimal(map.next_value()?),
                ValueKind::Color => FieldValue::Color(map.next_value()?),
                ValueKind::ArrowHeadCombination => FieldValue::ArrowHeads(map.next_value()?),
                ValueKind::FieldFlag => FieldValue::Flags(map.next_value()?),
                ValueKind::PreparedFilter => FieldValue::PreparedFilter(map.next_value()?),
                ValueKind::StringAlignment => FieldValue::Alignment(map.next_value()?),
            });
        }
        match (kind, value) {
            (_, Some(value)) => Ok(WireValue::Known(value)),
            (ValueKind::Null, None) => Ok(WireValue::Known(FieldValue::Null)),
            (_, None) => Err(de::Error::missing_field(VALUE_KEY)),
        }
    }
}

impl ContainerJson {
    pub fn from_container(container: &DrawableContainer) -> Self {
        let fields = container
            .own_fields()
            .iter()
            .map(|field| {
                (
                    field.field_type().name().to_string(),
                    WireValue::Known(field.value().clone()),
                )
            })
            .collect();
        Self {
            type_name: container.kind().type_name().to_string(),
            id: Some(container.id()),
            bounds: container.bounds(),
            fields,
            text: container.text().to_string(),
            children: container
                .children()
                .iter()
                .map(ContainerJson::from_container)
                .collect(),
        }
    }

    /// Rebuild the element. Unknown names fail the conversion.
    pub fn into_container(self) -> Result<DrawableContainer, FormatError> {
        let kind: ContainerKind = self
            .type_name
            .parse()
            .map_err(FormatError::UnknownContainerType)?;
        let mut container = DrawableContainer::with_default_fields(kind, self.bounds)
            .with_text(self.text);
        if let Some(id) = self.id {
            container = container.with_id(id);
        }

        let mut fields = self
            .fields
            .into_iter()
            .map(|(name, wire)| -> Result<(FieldType, FieldValue), FormatError> {
                let field_type: FieldType =
                    name.parse().map_err(FormatError::UnknownFieldType)?;
                match wire {
                    WireValue::Known(value) => Ok((field_type, value)),
                    WireValue::Unknown(tag) => Err(FormatError::UnknownFieldVariant(tag)),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        // the prepared filter rebuilds the children its sibling fields address
        let filter_field = kind.prepared_filter_field();
        fields.sort_by_key(|(field_type, _)| Some(*field_type) != filter_field);
        for (field_type, value) in fields {
            container.set_field_value(field_type, value)?;
        }

        if !self.children.is_empty() {
            let children = self
                .children
                .into_iter()
                .map(ContainerJson::into_container)
                .collect::<Result<Vec<_>, _>>()?;
            container.replace_children(children);
        }
        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Color;
    use crate::fields::{ArrowHeads, PreparedFilter};

    fn parse(json: &str) -> Result<WireValue, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_value_object_shape() {
        let json = serde_json::to_string(&WireValue::Known(FieldValue::Color(Color::RED))).unwrap();
        assert_eq!(json, r##"{"$type":"Color","value":"#FFFF0000"}"##);
        let json = serde_json::to_string(&WireValue::Known(FieldValue::ArrowHeads(
            ArrowHeads::BothPoints,
        )))
        .unwrap();
        assert_eq!(json, r#"{"$type":"ArrowHeadCombination","value":"BothPoints"}"#);
    }

    #[test]
    fn test_type_key_must_come_first() {
        assert!(parse(r#"{"value": 3, "$type": "Int"}"#).is_err());
        assert_eq!(
            parse(r#"{"$type": "Int", "value": 3}"#).unwrap(),
            WireValue::Known(FieldValue::Int(3))
        );
    }

    #[test]
    fn test_unknown_tag_is_kept() {
        assert_eq!(
            parse(r#"{"$type": "Gradient", "value": {"stops": [1, 2]}}"#).unwrap(),
            WireValue::Unknown("Gradient".to_string())
        );
    }

    #[test]
    fn test_missing_value_is_an_error() {
        assert!(parse(r#"{"$type": "Bool"}"#).is_err());
        assert_eq!(
            parse(r#"{"$type": "Null"}"#).unwrap(),
            WireValue::Known(FieldValue::Null)
        );
    }

    #[test]
    fn test_container_conversion_keeps_children() {
        let mut obfuscate =
            DrawableContainer::with_default_fields(ContainerKind::Obfuscate, Rect::new(1, 2, 30, 40));
        obfuscate
            .set_field_value(
                FieldType::PreparedFilterObfuscate,
                FieldValue::PreparedFilter(PreparedFilter::Blur),
            )
            .unwrap();
        obfuscate
            .set_field_value(FieldType::BlurRadius, FieldValue::Int(9))
            .unwrap();

        let json = serde_json::to_string(&ContainerJson::from_container(&obfuscate)).unwrap();
        let back: ContainerJson = serde_json::from_str(&json).unwrap();
        assert_eq!(back.into_container().unwrap(), obfuscate);
    }

    #[test]
    fn test_unset_field_is_written() {
        let mut rect =
            DrawableContainer::with_default_fields(ContainerKind::Rectangle, Rect::new(0, 0, 8, 8));
        rect.set_field_value(FieldType::LineColor, FieldValue::Null)
            .unwrap();

        let wire = ContainerJson::from_container(&rect);
        assert_eq!(
            wire.fields.get("LINE_COLOR"),
            Some(&WireValue::Known(FieldValue::Null))
        );
        let json = serde_json::to_string(&wire).unwrap();
        let back: ContainerJson = serde_json::from_str(&json).unwrap();
        let loaded = back.into_container().unwrap();
        assert_eq!(loaded.field_value(FieldType::LineColor), Some(&FieldValue::Null));
        assert_eq!(loaded, rect);
    }

    #[test]
    fn test_prepared_filter_is_applied_before_child_fields() {
        let wire: ContainerJson = serde_json::from_str(
            r#"{"$type": "ObfuscateContainer", "bounds": {"left":0,"top":0,"right":9,"bottom":9},
                "fields": {
                    "BLUR_RADIUS": {"$type": "Int", "value": 6},
                    "PREPARED_FILTER_OBFUSCATE": {"$type": "PreparedFilter", "value": "Blur"}
                }}"#,
        )
        .unwrap();
        let container = wire.into_container().unwrap();
        assert_eq!(
            container.field_value(FieldType::PreparedFilterObfuscate),
            Some(&FieldValue::PreparedFilter(PreparedFilter::Blur))
        );
        assert_eq!(container.int_value(FieldType::BlurRadius), 6);
    }

    #[test]
    fn test_unknown_names_fail() {
        let unknown_kind: ContainerJson = serde_json::from_str(
            r#"{"$type": "SvgContainer", "bounds": {"left":0,"top":0,"right":1,"bottom":1}}"#,
        )
        .unwrap();
        assert!(matches!(
            unknown_kind.into_container(),
            Err(FormatError::UnknownContainerType(name)) if name == "SvgContainer"
        ));

        let unknown_field: ContainerJson = serde_json::from_str(
            r#"{"$type": "LineContainer", "bounds": {"left":0,"top":0,"right":1,"bottom":1},
                "fields": {"GLOW": {"$type": "Int", "value": 1}}}"#,
        )
        .unwrap();
        assert!(matches!(
            unknown_field.into_container(),
            Err(FormatError::UnknownFieldType(name)) if name == "GLOW"
        ));

        let unknown_variant: ContainerJson = serde_json::from_str(
            r#"{"$type": "LineContainer", "bounds": {"left":0,"top":0,"right":1,"bottom":1},
                "fields": {"LINE_COLOR": {"$type": "Gradient", "value": 1}}}"#,
        )
        .unwrap();
        assert!(matches!(
            unknown_variant.into_container(),
            Err(FormatError::UnknownFieldVariant(tag)) if tag == "Gradient"
        ));
    }
}
