//! One vector element drawn on top of the background

use crate::domain::{ContainerId, Rect, SurfaceId};
use crate::error::FieldError;
use crate::fields::{
    Field, FieldCache, FieldChanged, FieldHolder, FieldType, FieldValue, PreparedFilter, Scope,
};

use super::kind::{ContainerKind, filters_for};

/// A drawable element with its fields.
///
/// Highlight and obfuscate elements own child filter elements that share
/// their bounds. The surface an element is attached to is referenced by
/// id only; the surface owns its elements.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableContainer {
    id: ContainerId,
    kind: ContainerKind,
    bounds: Rect,
    fields: Vec<Field>,
    text: String,
    children: Vec<DrawableContainer>,
    surface: Option<SurfaceId>,
}

impl DrawableContainer {
    /// Create an element whose fields start from the session's last used
    /// values.
    pub fn new(kind: ContainerKind, bounds: Rect, cache: &FieldCache) -> Self {
        let mut container = Self::build(kind, bounds, |field_type, scope| {
            cache.create_field(field_type, scope, kind.default_override(field_type))
        });
        container.configure_children(Some(cache));
        container
    }

    /// Create an element from the static defaults only, used when
    /// restoring persisted elements.
    pub fn with_default_fields(kind: ContainerKind, bounds: Rect) -> Self {
        let mut container = Self::build(kind, bounds, |field_type, scope| {
            let value = kind
                .default_override(field_type)
                .unwrap_or_else(|| field_type.default_value());
            Field::with_value(field_type, scope, value)
                .unwrap_or_else(|_| Field::new(field_type, scope))
        });
        container.configure_children(None);
        container
    }

    fn build(
        kind: ContainerKind,
        bounds: Rect,
        mut make_field: impl FnMut(FieldType, Scope) -> Field,
    ) -> Self {
        let scope = kind.scope();
        let fields = kind
            .supported_fields()
            .iter()
            .map(|field_type| make_field(*field_type, scope))
            .collect();
        Self {
            id: ContainerId::new(),
            kind,
            bounds,
            fields,
            text: String::new(),
            children: Vec::new(),
            surface: None,
        }
    }

    /// Keep a persisted identity
    pub(crate) fn with_id(mut self, id: ContainerId) -> Self {
        self.id = id;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Move or resize; child filters follow.
    pub(crate) fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        for child in &mut self.children {
            child.set_bounds(bounds);
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn set_text(&mut self, text: String) -> String {
        std::mem::replace(&mut self.text, text)
    }

    pub fn children(&self) -> &[DrawableContainer] {
        &self.children
    }

    pub(crate) fn replace_children(
        &mut self,
        children: Vec<DrawableContainer>,
    ) -> Vec<DrawableContainer> {
        std::mem::replace(&mut self.children, children)
    }

    /// Surface this element is attached to
    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub(crate) fn attach(&mut self, surface: SurfaceId) {
        self.surface = Some(surface);
    }

    pub(crate) fn detach(&mut self) {
        self.surface = None;
    }

    /// Own fields, without those of child filters
    pub fn own_fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn prepared_filter(&self) -> Option<PreparedFilter> {
        let field_type = self.kind.prepared_filter_field()?;
        self.field(field_type)?.value_or_default().as_prepared_filter()
    }

    /// Rebuild the child filters from the prepared filter field.
    ///
    /// Children take their values from the cache when one is given and
    /// from the static defaults otherwise.
    pub(crate) fn configure_children(&mut self, cache: Option<&FieldCache>) {
        let Some(prepared) = self.prepared_filter() else {
            return;
        };
        let bounds = self.bounds;
        self.children = filters_for(prepared)
            .iter()
            .map(|filter| {
                let kind = ContainerKind::Filter(*filter);
                match cache {
                    Some(cache) => DrawableContainer::new(kind, bounds, cache),
                    None => DrawableContainer::with_default_fields(kind, bounds),
                }
            })
            .collect();
        log::debug!(
            "Configured {} with {:?}: {} filter(s)",
            self.kind,
            prepared,
            self.children.len()
        );
    }

    fn own_field_mut(&mut self, field_type: FieldType) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.field_type() == field_type)
    }

    /// Whether the point hits this element
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.bounds.contains_point(x, y)
    }
}

impl FieldHolder for DrawableContainer {
    fn field_types(&self) -> Vec<FieldType> {
        let mut types: Vec<FieldType> = self.fields.iter().map(Field::field_type).collect();
        for child in &self.children {
            for field_type in child.field_types() {
                if !types.contains(&field_type) {
                    types.push(field_type);
                }
            }
        }
        types
    }

    fn field(&self, field_type: FieldType) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.field_type() == field_type)
            .or_else(|| self.children.iter().find_map(|c| c.field(field_type)))
    }

    /// Writes the own field and every child field of that type. A change
    /// of the prepared filter rebuilds the children from static defaults.
    fn set_field_value(
        &mut self,
        field_type: FieldType,
        value: FieldValue,
    ) -> Result<Option<FieldChanged>, FieldError> {
        if !self.has_field(field_type) {
            return Err(FieldError::Unsupported(field_type));
        }
        let mut changed = None;
        if let Some(field) = self.own_field_mut(field_type) {
            changed = field.set(value.clone())?;
        }
        for child in &mut self.children {
            if child.has_field(field_type) {
                let child_change = child.set_field_value(field_type, value.clone())?;
                changed = changed.or(child_change);
            }
        }
        if changed.is_some() && self.kind.prepared_filter_field() == Some(field_type) {
            self.configure_children(None);
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::FilterKind;
    use crate::domain::Color;

    fn kinds(children: &[DrawableContainer]) -> Vec<ContainerKind> {
        children.iter().map(|c| c.kind()).collect()
    }

    #[test]
    fn test_new_uses_last_used_values() {
        let cache = FieldCache::default();
        cache.remember(
            FieldType::LineColor,
            ContainerKind::Rectangle.scope(),
            &FieldValue::Color(Color::BLACK),
        );
        let rect = DrawableContainer::new(ContainerKind::Rectangle, Rect::default(), &cache);
        assert_eq!(rect.color_value(FieldType::LineColor), Color::BLACK);

        let ellipse = DrawableContainer::new(ContainerKind::Ellipse, Rect::default(), &cache);
        assert_eq!(ellipse.color_value(FieldType::LineColor), Color::RED);
    }

    #[test]
    fn test_field_set_follows_registry() {
        let line = DrawableContainer::with_default_fields(ContainerKind::Line, Rect::default());
        assert_eq!(
            line.field_types(),
            vec![FieldType::LineThickness, FieldType::LineColor, FieldType::Shadow]
        );
        assert!(!line.has_field(FieldType::FillColor));
    }

    #[test]
    fn test_unsupported_field_is_rejected() {
        let mut line = DrawableContainer::with_default_fields(ContainerKind::Line, Rect::default());
        let err = line
            .set_field_value(FieldType::FontSize, FieldValue::Single(3.0))
            .unwrap_err();
        assert_eq!(err, FieldError::Unsupported(FieldType::FontSize));
    }

    #[test]
    fn test_filter_children_follow_prepared_filter() {
        let mut obfuscate = DrawableContainer::with_default_fields(
            ContainerKind::Obfuscate,
            Rect::new(0, 0, 20, 20),
        );
        assert_eq!(
            kinds(obfuscate.children()),
            vec![ContainerKind::Filter(FilterKind::Pixelize)]
        );
        assert!(obfuscate.has_field(FieldType::PixelSize));

        obfuscate
            .set_field_value(
                FieldType::PreparedFilterObfuscate,
                FieldValue::PreparedFilter(PreparedFilter::Blur),
            )
            .unwrap();
        assert_eq!(
            kinds(obfuscate.children()),
            vec![ContainerKind::Filter(FilterKind::Blur)]
        );
        assert!(!obfuscate.has_field(FieldType::PixelSize));
        assert!(obfuscate.has_field(FieldType::BlurRadius));
    }

    #[test]
    fn test_child_fields_are_written_through_parent() {
        let mut highlight = DrawableContainer::with_default_fields(
            ContainerKind::Highlight,
            Rect::new(0, 0, 20, 20),
        );
        highlight
            .set_field_value(FieldType::HighlightColor, FieldValue::Color(Color::RED))
            .unwrap();
        assert_eq!(
            highlight.children()[0].color_value(FieldType::HighlightColor),
            Color::RED
        );
    }

    #[test]
    fn test_children_follow_bounds() {
        let mut highlight = DrawableContainer::with_default_fields(
            ContainerKind::Highlight,
            Rect::new(0, 0, 20, 20),
        );
        highlight.set_bounds(Rect::new(5, 5, 25, 25));
        assert_eq!(highlight.children()[0].bounds(), Rect::new(5, 5, 25, 25));
    }
}
