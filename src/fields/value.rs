//! Field types and their value domains

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::Color;

/// Semantic kind of an editable element property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Arrowheads,
    BlurRadius,
    Brightness,
    FillColor,
    Flags,
    FontBold,
    FontFamily,
    FontItalic,
    FontSize,
    HighlightColor,
    LineColor,
    LineThickness,
    MagnificationFactor,
    PixelSize,
    PreparedFilterHighlight,
    PreparedFilterObfuscate,
    PreviewQuality,
    Shadow,
    TextHorizontalAlignment,
    TextVerticalAlignment,
}

impl FieldType {
    pub const ALL: [FieldType; 20] = [
        FieldType::Arrowheads,
        FieldType::BlurRadius,
        FieldType::Brightness,
        FieldType::FillColor,
        FieldType::Flags,
        FieldType::FontBold,
        FieldType::FontFamily,
        FieldType::FontItalic,
        FieldType::FontSize,
        FieldType::HighlightColor,
        FieldType::LineColor,
        FieldType::LineThickness,
        FieldType::MagnificationFactor,
        FieldType::PixelSize,
        FieldType::PreparedFilterHighlight,
        FieldType::PreparedFilterObfuscate,
        FieldType::PreviewQuality,
        FieldType::Shadow,
        FieldType::TextHorizontalAlignment,
        FieldType::TextVerticalAlignment,
    ];

    /// Persisted name, e.g. `LINE_THICKNESS`
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Arrowheads => "ARROWHEADS",
            FieldType::BlurRadius => "BLUR_RADIUS",
            FieldType::Brightness => "BRIGHTNESS",
            FieldType::FillColor => "FILL_COLOR",
            FieldType::Flags => "FLAGS",
            FieldType::FontBold => "FONT_BOLD",
            FieldType::FontFamily => "FONT_FAMILY",
            FieldType::FontItalic => "FONT_ITALIC",
            FieldType::FontSize => "FONT_SIZE",
            FieldType::HighlightColor => "HIGHLIGHT_COLOR",
            FieldType::LineColor => "LINE_COLOR",
            FieldType::LineThickness => "LINE_THICKNESS",
            FieldType::MagnificationFactor => "MAGNIFICATION_FACTOR",
            FieldType::PixelSize => "PIXEL_SIZE",
            FieldType::PreparedFilterHighlight => "PREPARED_FILTER_HIGHLIGHT",
            FieldType::PreparedFilterObfuscate => "PREPARED_FILTER_OBFUSCATE",
            FieldType::PreviewQuality => "PREVIEW_QUALITY",
            FieldType::Shadow => "SHADOW",
            FieldType::TextHorizontalAlignment => "TEXT_HORIZONTAL_ALIGNMENT",
            FieldType::TextVerticalAlignment => "TEXT_VERTICAL_ALIGNMENT",
        }
    }

    /// The one value domain this field type accepts
    pub fn kind(self) -> ValueKind {
        match self {
            FieldType::Arrowheads => ValueKind::ArrowHeadCombination,
            FieldType::BlurRadius
            | FieldType::LineThickness
            | FieldType::MagnificationFactor
            | FieldType::PixelSize => ValueKind::Int,
            FieldType::Brightness | FieldType::PreviewQuality => ValueKind::Double,
            FieldType::FillColor | FieldType::HighlightColor | FieldType::LineColor => {
                ValueKind::Color
            }
            FieldType::Flags => ValueKind::FieldFlag,
            FieldType::FontBold | FieldType::FontItalic | FieldType::Shadow => ValueKind::Bool,
            FieldType::FontFamily => ValueKind::String,
            FieldType::FontSize => ValueKind::Single,
            FieldType::PreparedFilterHighlight | FieldType::PreparedFilterObfuscate => {
                ValueKind::PreparedFilter
            }
            FieldType::TextHorizontalAlignment | FieldType::TextVerticalAlignment => {
                ValueKind::StringAlignment
            }
        }
    }

    /// Static default used when neither the cache nor the config has a value
    pub fn default_value(self) -> FieldValue {
        match self {
            FieldType::Arrowheads => FieldValue::ArrowHeads(ArrowHeads::EndPoint),
            FieldType::BlurRadius => FieldValue::Int(3),
            FieldType::Brightness => FieldValue::Double(0.9),
            FieldType::FillColor => FieldValue::Color(Color::TRANSPARENT),
            FieldType::Flags => FieldValue::Flags(FieldFlags::NONE),
            FieldType::FontBold | FieldType::FontItalic => FieldValue::Bool(false),
            FieldType::FontFamily => FieldValue::String("Sans".to_string()),
            FieldType::FontSize => FieldValue::Single(11.0),
            FieldType::HighlightColor => FieldValue::Color(Color::YELLOW),
            FieldType::LineColor => FieldValue::Color(Color::RED),
            FieldType::LineThickness => FieldValue::Int(2),
            FieldType::MagnificationFactor => FieldValue::Int(2),
            FieldType::PixelSize => FieldValue::Int(5),
            FieldType::PreparedFilterHighlight => {
                FieldValue::PreparedFilter(PreparedFilter::TextHighlight)
            }
            FieldType::PreparedFilterObfuscate => {
                FieldValue::PreparedFilter(PreparedFilter::Pixelize)
            }
            FieldType::PreviewQuality => FieldValue::Double(1.0),
            FieldType::Shadow => FieldValue::Bool(true),
            FieldType::TextHorizontalAlignment | FieldType::TextVerticalAlignment => {
                FieldValue::Alignment(StringAlignment::Center)
            }
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Discriminator of a [`FieldValue`], also the persisted `$type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Int,
    String,
    Bool,
    Single,
    Double,
    Decimal,
    Color,
    ArrowHeadCombination,
    FieldFlag,
    PreparedFilter,
    StringAlignment,
}

impl ValueKind {
    pub const ALL: [ValueKind; 12] = [
        ValueKind::Null,
        ValueKind::Int,
        ValueKind::String,
        ValueKind::Bool,
        ValueKind::Single,
        ValueKind::Double,
        ValueKind::Decimal,
        ValueKind::Color,
        ValueKind::ArrowHeadCombination,
        ValueKind::FieldFlag,
        ValueKind::PreparedFilter,
        ValueKind::StringAlignment,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ValueKind::Null => "Null",
            ValueKind::Int => "Int",
            ValueKind::String => "String",
            ValueKind::Bool => "Bool",
            ValueKind::Single => "Single",
            ValueKind::Double => "Double",
            ValueKind::Decimal => "Decimal",
            ValueKind::Color => "Color",
            ValueKind::ArrowHeadCombination => "ArrowHeadCombination",
            ValueKind::FieldFlag => "FieldFlag",
            ValueKind::PreparedFilter => "PreparedFilter",
            ValueKind::StringAlignment => "StringAlignment",
        }
    }

    pub fn from_tag(tag: &str) -> Option<ValueKind> {
        ValueKind::ALL.into_iter().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Which ends of a line get an arrow head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrowHeads {
    None,
    StartPoint,
    EndPoint,
    BothPoints,
}

impl ArrowHeads {
    pub fn at_start(self) -> bool {
        matches!(self, ArrowHeads::StartPoint | ArrowHeads::BothPoints)
    }

    pub fn at_end(self) -> bool {
        matches!(self, ArrowHeads::EndPoint | ArrowHeads::BothPoints)
    }
}

/// Bit set describing how an element's fields behave in the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldFlags(pub u32);

impl FieldFlags {
    pub const NONE: FieldFlags = FieldFlags(0);
    /// Element needs an explicit confirm before it is applied
    pub const CONFIRMABLE: FieldFlags = FieldFlags(1);
    /// Element takes part in auto-numbering
    pub const COUNTER: FieldFlags = FieldFlags(2);

    pub fn contains(self, other: FieldFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: FieldFlags) -> FieldFlags {
        FieldFlags(self.0 | other.0)
    }
}

/// Preset filter chain applied by highlight and obfuscate elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreparedFilter {
    Blur,
    Pixelize,
    TextHighlight,
    AreaHighlight,
    Grayscale,
    Magnification,
}

/// Text alignment along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringAlignment {
    Near,
    Center,
    Far,
}

/// Value of a field. `Null` means "unset".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    #[default]
    Null,
    Int(i32),
    String(String),
    Bool(bool),
    Single(f32),
    Double(f64),
    Decimal(f64),
    Color(Color),
    ArrowHeads(ArrowHeads),
    Flags(FieldFlags),
    PreparedFilter(PreparedFilter),
    Alignment(StringAlignment),
}

impl FieldValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Null => ValueKind::Null,
            FieldValue::Int(_) => ValueKind::Int,
            FieldValue::String(_) => ValueKind::String,
            FieldValue::Bool(_) => ValueKind::Bool,
            FieldValue::Single(_) => ValueKind::Single,
            FieldValue::Double(_) => ValueKind::Double,
            FieldValue::Decimal(_) => ValueKind::Decimal,
            FieldValue::Color(_) => ValueKind::Color,
            FieldValue::ArrowHeads(_) => ValueKind::ArrowHeadCombination,
            FieldValue::Flags(_) => ValueKind::FieldFlag,
            FieldValue::PreparedFilter(_) => ValueKind::PreparedFilter,
            FieldValue::Alignment(_) => ValueKind::StringAlignment,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Whether this value may be stored in a field of `field_type`
    pub fn fits(&self, field_type: FieldType) -> bool {
        self.is_null() || self.kind() == field_type.kind()
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Single(v) => Some(f64::from(*v)),
            FieldValue::Double(v) | FieldValue::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            FieldValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_arrow_heads(&self) -> Option<ArrowHeads> {
        match self {
            FieldValue::ArrowHeads(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_flags(&self) -> Option<FieldFlags> {
        match self {
            FieldValue::Flags(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_prepared_filter(&self) -> Option<PreparedFilter> {
        match self {
            FieldValue::PreparedFilter(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_alignment(&self) -> Option<StringAlignment> {
        match self {
            FieldValue::Alignment(a) => Some(*a),
            _ => None,
        }
    }
}
