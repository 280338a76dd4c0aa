//! Element kinds and the static registry of their fields

use std::fmt;
use std::str::FromStr;

use crate::domain::Color;
use crate::fields::{FieldFlags, FieldType, FieldValue, PreparedFilter, Scope};

/// Filters applied to the background inside a filter element's bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Blur,
    Pixelize,
    Highlight,
    Brightness,
    Grayscale,
    Magnifier,
}

/// Kind of a drawable element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Rectangle,
    Ellipse,
    Line,
    Arrow,
    Text,
    StepLabel,
    Highlight,
    Obfuscate,
    /// Only appears as a child of a highlight or obfuscate element
    Filter(FilterKind),
}

use FieldType as F;

const OUTLINE_FIELDS: &[FieldType] = &[F::LineThickness, F::LineColor, F::FillColor, F::Shadow];
const LINE_FIELDS: &[FieldType] = &[F::LineThickness, F::LineColor, F::Shadow];
const ARROW_FIELDS: &[FieldType] = &[F::LineThickness, F::LineColor, F::Shadow, F::Arrowheads];
const TEXT_FIELDS: &[FieldType] = &[
    F::LineThickness,
    F::LineColor,
    F::FillColor,
    F::Shadow,
    F::FontFamily,
    F::FontSize,
    F::FontBold,
    F::FontItalic,
    F::TextHorizontalAlignment,
    F::TextVerticalAlignment,
];
const STEP_LABEL_FIELDS: &[FieldType] = &[F::FillColor, F::LineColor, F::Flags];
const HIGHLIGHT_FIELDS: &[FieldType] =
    &[F::LineThickness, F::LineColor, F::Shadow, F::PreparedFilterHighlight];
const OBFUSCATE_FIELDS: &[FieldType] =
    &[F::LineThickness, F::LineColor, F::Shadow, F::PreparedFilterObfuscate];
const BLUR_FIELDS: &[FieldType] = &[F::BlurRadius, F::PreviewQuality];
const PIXELIZE_FIELDS: &[FieldType] = &[F::PixelSize];
const HIGHLIGHT_FILTER_FIELDS: &[FieldType] = &[F::HighlightColor];
const BRIGHTNESS_FIELDS: &[FieldType] = &[F::Brightness];
const MAGNIFIER_FIELDS: &[FieldType] = &[F::MagnificationFactor];

impl ContainerKind {
    pub const ALL: [ContainerKind; 14] = [
        ContainerKind::Rectangle,
        ContainerKind::Ellipse,
        ContainerKind::Line,
        ContainerKind::Arrow,
        ContainerKind::Text,
        ContainerKind::StepLabel,
        ContainerKind::Highlight,
        ContainerKind::Obfuscate,
        ContainerKind::Filter(FilterKind::Blur),
        ContainerKind::Filter(FilterKind::Pixelize),
        ContainerKind::Filter(FilterKind::Highlight),
        ContainerKind::Filter(FilterKind::Brightness),
        ContainerKind::Filter(FilterKind::Grayscale),
        ContainerKind::Filter(FilterKind::Magnifier),
    ];

    /// Persisted `$type` discriminator
    pub fn type_name(self) -> &'static str {
        match self {
            ContainerKind::Rectangle => "RectangleContainer",
            ContainerKind::Ellipse => "EllipseContainer",
            ContainerKind::Line => "LineContainer",
            ContainerKind::Arrow => "ArrowContainer",
            ContainerKind::Text => "TextContainer",
            ContainerKind::StepLabel => "StepLabelContainer",
            ContainerKind::Highlight => "HighlightContainer",
            ContainerKind::Obfuscate => "ObfuscateContainer",
            ContainerKind::Filter(FilterKind::Blur) => "BlurFilter",
            ContainerKind::Filter(FilterKind::Pixelize) => "PixelizationFilter",
            ContainerKind::Filter(FilterKind::Highlight) => "HighlightFilter",
            ContainerKind::Filter(FilterKind::Brightness) => "BrightnessFilter",
            ContainerKind::Filter(FilterKind::Grayscale) => "GrayscaleFilter",
            ContainerKind::Filter(FilterKind::Magnifier) => "MagnifierFilter",
        }
    }

    /// Key for last-used field values of this kind
    pub fn scope(self) -> Scope {
        Scope(self.type_name())
    }

    /// Fields every element of this kind carries
    pub fn supported_fields(self) -> &'static [FieldType] {
        match self {
            ContainerKind::Rectangle | ContainerKind::Ellipse => OUTLINE_FIELDS,
            ContainerKind::Line => LINE_FIELDS,
            ContainerKind::Arrow => ARROW_FIELDS,
            ContainerKind::Text => TEXT_FIELDS,
            ContainerKind::StepLabel => STEP_LABEL_FIELDS,
            ContainerKind::Highlight => HIGHLIGHT_FIELDS,
            ContainerKind::Obfuscate => OBFUSCATE_FIELDS,
            ContainerKind::Filter(FilterKind::Blur) => BLUR_FIELDS,
            ContainerKind::Filter(FilterKind::Pixelize) => PIXELIZE_FIELDS,
            ContainerKind::Filter(FilterKind::Highlight) => HIGHLIGHT_FILTER_FIELDS,
            ContainerKind::Filter(FilterKind::Brightness) => BRIGHTNESS_FIELDS,
            ContainerKind::Filter(FilterKind::Grayscale) => &[],
            ContainerKind::Filter(FilterKind::Magnifier) => MAGNIFIER_FIELDS,
        }
    }

    /// Kind-specific starting value that beats the configured defaults
    pub fn default_override(self, field_type: FieldType) -> Option<FieldValue> {
        match (self, field_type) {
            (ContainerKind::Highlight | ContainerKind::Obfuscate, F::LineThickness) => {
                Some(FieldValue::Int(0))
            }
            (ContainerKind::Highlight | ContainerKind::Obfuscate, F::Shadow) => {
                Some(FieldValue::Bool(false))
            }
            (ContainerKind::Text, F::LineThickness) => Some(FieldValue::Int(0)),
            (ContainerKind::StepLabel, F::FillColor) => Some(FieldValue::Color(Color::RED)),
            (ContainerKind::StepLabel, F::LineColor) => Some(FieldValue::Color(Color::WHITE)),
            (ContainerKind::StepLabel, F::Flags) => Some(FieldValue::Flags(FieldFlags::COUNTER)),
            _ => None,
        }
    }

    /// Field selecting the child filters, for filter elements
    pub fn prepared_filter_field(self) -> Option<FieldType> {
        match self {
            ContainerKind::Highlight => Some(F::PreparedFilterHighlight),
            ContainerKind::Obfuscate => Some(F::PreparedFilterObfuscate),
            _ => None,
        }
    }

    /// Lines and arrows keep their drawn direction in their bounds
    pub fn is_line_like(self) -> bool {
        matches!(self, ContainerKind::Line | ContainerKind::Arrow)
    }

    pub fn is_filter(self) -> bool {
        matches!(self, ContainerKind::Highlight | ContainerKind::Obfuscate)
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl FromStr for ContainerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContainerKind::ALL
            .into_iter()
            .find(|k| k.type_name() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Child filters a prepared filter expands to
pub fn filters_for(prepared: PreparedFilter) -> &'static [FilterKind] {
    match prepared {
        PreparedFilter::Blur => &[FilterKind::Blur],
        PreparedFilter::Pixelize => &[FilterKind::Pixelize],
        PreparedFilter::TextHighlight => &[FilterKind::Highlight],
        PreparedFilter::AreaHighlight => &[FilterKind::Brightness, FilterKind::Blur],
        PreparedFilter::Grayscale => &[FilterKind::Grayscale],
        PreparedFilter::Magnification => &[FilterKind::Magnifier],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names_round_trip() {
        for kind in ContainerKind::ALL {
            assert_eq!(kind.type_name().parse::<ContainerKind>(), Ok(kind));
        }
        assert!("SvgContainer".parse::<ContainerKind>().is_err());
    }

    #[test]
    fn test_overrides_fit_supported_fields() {
        for kind in ContainerKind::ALL {
            for field_type in FieldType::ALL {
                if let Some(value) = kind.default_override(field_type) {
                    assert!(kind.supported_fields().contains(&field_type));
                    assert!(value.fits(field_type));
                }
            }
        }
    }

    #[test]
    fn test_prepared_filter_field_is_supported() {
        for kind in ContainerKind::ALL {
            if let Some(field_type) = kind.prepared_filter_field() {
                assert!(kind.supported_fields().contains(&field_type));
            }
        }
    }
}
