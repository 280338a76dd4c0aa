//! The field holder capability

use crate::domain::{Color, ContainerId};
use crate::error::FieldError;

use super::field::{Field, FieldChanged};
use super::value::{FieldType, FieldValue};

/// Anything exposing a `FieldType -> Field` mapping.
pub trait FieldHolder {
    /// Field types this holder exposes, in a stable order
    fn field_types(&self) -> Vec<FieldType>;

    fn field(&self, field_type: FieldType) -> Option<&Field>;

    /// Write a value. Fails with `Unsupported` when the holder has no
    /// such field and `DomainMismatch` when the value doesn't fit.
    fn set_field_value(
        &mut self,
        field_type: FieldType,
        value: FieldValue,
    ) -> Result<Option<FieldChanged>, FieldError>;

    fn has_field(&self, field_type: FieldType) -> bool {
        self.field(field_type).is_some()
    }

    fn field_value(&self, field_type: FieldType) -> Option<&FieldValue> {
        self.field(field_type).map(Field::value)
    }

    /// Value with the static default applied when missing or unset
    fn value_or_default(&self, field_type: FieldType) -> FieldValue {
        self.field(field_type)
            .map(Field::value_or_default)
            .unwrap_or_else(|| field_type.default_value())
    }

    fn int_value(&self, field_type: FieldType) -> i32 {
        self.value_or_default(field_type).as_int().unwrap_or_default()
    }

    fn bool_value(&self, field_type: FieldType) -> bool {
        self.value_or_default(field_type)
            .as_bool()
            .unwrap_or_default()
    }

    fn f64_value(&self, field_type: FieldType) -> f64 {
        self.value_or_default(field_type).as_f64().unwrap_or_default()
    }

    fn color_value(&self, field_type: FieldType) -> Color {
        self.value_or_default(field_type)
            .as_color()
            .unwrap_or(Color::TRANSPARENT)
    }
}

/// Resolves element ids to holders, so field edits can be applied
/// without the editor owning the elements.
pub trait FieldHolderStore {
    fn holder(&self, id: ContainerId) -> Option<&dyn FieldHolder>;

    fn holder_mut(&mut self, id: ContainerId) -> Option<&mut dyn FieldHolder>;
}
