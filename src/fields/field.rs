//! A single named, typed, scoped property

use std::fmt;

use crate::error::FieldError;

use super::value::{FieldType, FieldValue};

/// Key separating independent uses of one field type, e.g. the line
/// thickness of rectangles versus the line thickness of arrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope(pub &'static str);

impl Scope {
    pub const AGGREGATOR: Scope = Scope("FieldAggregator");
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Change notification produced by a field write
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChanged {
    pub field_type: FieldType,
    pub scope: Scope,
    pub old: FieldValue,
    pub new: FieldValue,
}

/// One property instance. The stored value always fits the field type.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    field_type: FieldType,
    scope: Scope,
    value: FieldValue,
}

impl Field {
    /// Create an unset field
    pub fn new(field_type: FieldType, scope: Scope) -> Self {
        Self {
            field_type,
            scope,
            value: FieldValue::Null,
        }
    }

    pub fn with_value(
        field_type: FieldType,
        scope: Scope,
        value: FieldValue,
    ) -> Result<Self, FieldError> {
        let mut field = Self::new(field_type, scope);
        field.set(value)?;
        Ok(field)
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn has_value(&self) -> bool {
        !self.value.is_null()
    }

    /// Current value, `FieldValue::Null` while unset
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// Current value, or the field type's static default while unset
    pub fn value_or_default(&self) -> FieldValue {
        if self.has_value() {
            self.value.clone()
        } else {
            self.field_type.default_value()
        }
    }

    /// Store a new value.
    ///
    /// Returns the change notification, or `None` when the value is
    /// unchanged.
    pub fn set(&mut self, value: FieldValue) -> Result<Option<FieldChanged>, FieldError> {
        if !value.fits(self.field_type) {
            return Err(FieldError::DomainMismatch {
                field_type: self.field_type,
                expected: self.field_type.kind(),
                actual: value.kind(),
            });
        }
        if self.value == value {
            return Ok(None);
        }
        let old = std::mem::replace(&mut self.value, value);
        Ok(Some(FieldChanged {
            field_type: self.field_type,
            scope: self.scope,
            old,
            new: self.value.clone(),
        }))
    }

    pub fn clear(&mut self) -> Option<FieldChanged> {
        // Null fits every field type
        self.set(FieldValue::Null).ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Color;
    use crate::fields::ValueKind;

    const SCOPE: Scope = Scope("RectangleContainer");

    #[test]
    fn test_set_rejects_wrong_domain() {
        let mut field = Field::new(FieldType::LineColor, SCOPE);
        let err = field.set(FieldValue::Int(4)).unwrap_err();
        assert_eq!(
            err,
            FieldError::DomainMismatch {
                field_type: FieldType::LineColor,
                expected: ValueKind::Color,
                actual: ValueKind::Int,
            }
        );
        assert!(!field.has_value());
    }

    #[test]
    fn test_set_reports_change_once() {
        let mut field = Field::new(FieldType::LineThickness, SCOPE);
        let change = field.set(FieldValue::Int(5)).unwrap().unwrap();
        assert_eq!(change.old, FieldValue::Null);
        assert_eq!(change.new, FieldValue::Int(5));
        assert_eq!(field.set(FieldValue::Int(5)).unwrap(), None);
    }

    #[test]
    fn test_unset_falls_back_to_default() {
        let mut field = Field::with_value(
            FieldType::LineColor,
            SCOPE,
            FieldValue::Color(Color::BLACK),
        )
        .unwrap();
        assert_eq!(field.value_or_default(), FieldValue::Color(Color::BLACK));
        assert!(field.clear().is_some());
        assert_eq!(field.value(), &FieldValue::Null);
        assert_eq!(field.value_or_default(), FieldValue::Color(Color::RED));
    }
}
