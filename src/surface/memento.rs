//! Undo records for surface operations

use image::RgbaImage;

use crate::container::DrawableContainer;
use crate::domain::{ContainerId, Rect};
use crate::fields::{FieldHolder, FieldType, FieldValue};
use crate::memento::Memento;

use super::content::{SurfaceContent, SurfaceEvent};

/// Child filter lists before and after a prepared filter change
pub type ChildrenChange = (Vec<DrawableContainer>, Vec<DrawableContainer>);

/// One reversible surface operation.
///
/// Elements popped off the live list by undo (or redo) are parked inside
/// the memento until they are re-inserted.
#[derive(Debug)]
pub enum SurfaceMemento {
    AddElement {
        index: usize,
        id: ContainerId,
        parked: Option<Box<DrawableContainer>>,
    },
    RemoveElement {
        index: usize,
        id: ContainerId,
        parked: Option<Box<DrawableContainer>>,
    },
    ChangeBounds {
        id: ContainerId,
        before: Rect,
        after: Rect,
    },
    ChangeField {
        id: ContainerId,
        field_type: FieldType,
        before: FieldValue,
        after: FieldValue,
        children: Option<ChildrenChange>,
    },
    ChangeText {
        id: ContainerId,
        before: String,
        after: String,
    },
    ChangeZOrder {
        id: ContainerId,
        from: usize,
        to: usize,
    },
    ChangeSelection {
        before: Vec<ContainerId>,
        after: Vec<ContainerId>,
    },
    /// Holds the background and bounds to swap in; undo and redo are the
    /// same swap.
    Crop {
        image: RgbaImage,
        bounds: Vec<(ContainerId, Rect)>,
    },
    Batch {
        name: &'static str,
        steps: Vec<SurfaceMemento>,
    },
}

impl SurfaceMemento {
    fn insert(content: &mut SurfaceContent, index: usize, parked: &mut Option<Box<DrawableContainer>>) {
        let Some(container) = parked.take() else {
            log::warn!("No parked element to re-insert");
            return;
        };
        if let Err(err) = content.insert_element(index, *container) {
            log::error!("Failed to re-insert element: {err}");
        }
    }

    fn park(content: &mut SurfaceContent, id: ContainerId, parked: &mut Option<Box<DrawableContainer>>) {
        match content.take_element(id) {
            Some((_, container)) => *parked = Some(Box::new(container)),
            None => log::warn!("Element {id} is not on the surface"),
        }
    }

    fn write_field(
        content: &mut SurfaceContent,
        id: ContainerId,
        field_type: FieldType,
        value: &FieldValue,
        children: Option<&Vec<DrawableContainer>>,
    ) {
        let Some(container) = content.elements.get_mut(id) else {
            return;
        };
        if let Err(err) = container.set_field_value(field_type, value.clone()) {
            log::error!("Failed to restore {field_type} on {id}: {err}");
        }
        if let Some(children) = children {
            container.replace_children(children.clone());
        }
        content.events.push(SurfaceEvent::FieldChanged(id, field_type));
    }

    fn write_text(content: &mut SurfaceContent, id: ContainerId, text: &str) {
        if let Some(container) = content.elements.get_mut(id) {
            container.set_text(text.to_string());
            content.events.push(SurfaceEvent::ElementChanged(id));
        }
    }

    fn move_to(content: &mut SurfaceContent, id: ContainerId, index: usize) {
        if content.elements.move_to(id, index).is_some() {
            content.events.push(SurfaceEvent::ElementChanged(id));
        }
    }

    fn swap_crop(content: &mut SurfaceContent, image: &mut RgbaImage, bounds: &mut [(ContainerId, Rect)]) {
        std::mem::swap(&mut content.image, image);
        for (id, rect) in bounds.iter_mut() {
            if let Some(container) = content.elements.get_mut(*id) {
                let current = container.bounds();
                container.set_bounds(*rect);
                *rect = current;
            }
        }
        content.events.push(SurfaceEvent::BackgroundChanged);
    }
}

impl Memento for SurfaceMemento {
    type Target = SurfaceContent;

    fn undo(&mut self, content: &mut SurfaceContent) {
        match self {
            SurfaceMemento::AddElement { id, parked, .. } => Self::park(content, *id, parked),
            SurfaceMemento::RemoveElement { index, parked, .. } => {
                Self::insert(content, *index, parked)
            }
            SurfaceMemento::ChangeBounds { id, before, .. } => content.set_bounds(*id, *before),
            SurfaceMemento::ChangeField {
                id,
                field_type,
                before,
                children,
                ..
            } => Self::write_field(
                content,
                *id,
                *field_type,
                before,
                children.as_ref().map(|(before, _)| before),
            ),
            SurfaceMemento::ChangeText { id, before, .. } => Self::write_text(content, *id, before),
            SurfaceMemento::ChangeZOrder { id, from, .. } => Self::move_to(content, *id, *from),
            SurfaceMemento::ChangeSelection { before, .. } => content.set_selection(before.clone()),
            SurfaceMemento::Crop { image, bounds } => Self::swap_crop(content, image, bounds),
            SurfaceMemento::Batch { steps, .. } => {
                for step in steps.iter_mut().rev() {
                    step.undo(content);
                }
            }
        }
    }

    fn redo(&mut self, content: &mut SurfaceContent) {
        match self {
            SurfaceMemento::AddElement { index, parked, .. } => {
                Self::insert(content, *index, parked)
            }
            SurfaceMemento::RemoveElement { id, parked, .. } => Self::park(content, *id, parked),
            SurfaceMemento::ChangeBounds { id, after, .. } => content.set_bounds(*id, *after),
            SurfaceMemento::ChangeField {
                id,
                field_type,
                after,
                children,
                ..
            } => Self::write_field(
                content,
                *id,
                *field_type,
                after,
                children.as_ref().map(|(_, after)| after),
            ),
            SurfaceMemento::ChangeText { id, after, .. } => Self::write_text(content, *id, after),
            SurfaceMemento::ChangeZOrder { id, to, .. } => Self::move_to(content, *id, *to),
            SurfaceMemento::ChangeSelection { after, .. } => content.set_selection(after.clone()),
            SurfaceMemento::Crop { image, bounds } => Self::swap_crop(content, image, bounds),
            SurfaceMemento::Batch { steps, .. } => {
                for step in steps.iter_mut() {
                    step.redo(content);
                }
            }
        }
    }

    /// Consecutive edits of the same element and property collapse into
    /// the first one's `before` and the last one's `after`.
    fn merge(&mut self, next: &Self) -> bool {
        match (self, next) {
            (
                SurfaceMemento::ChangeBounds { id, after, .. },
                SurfaceMemento::ChangeBounds {
                    id: next_id,
                    after: next_after,
                    ..
                },
            ) if id == next_id => {
                *after = *next_after;
                true
            }
            (
                SurfaceMemento::ChangeField {
                    id,
                    field_type,
                    after,
                    children,
                    ..
                },
                SurfaceMemento::ChangeField {
                    id: next_id,
                    field_type: next_type,
                    after: next_after,
                    children: next_children,
                    ..
                },
            ) if id == next_id && field_type == next_type => {
                *after = next_after.clone();
                match (children, next_children) {
                    (Some((_, after_children)), Some((_, next_after_children))) => {
                        *after_children = next_after_children.clone();
                    }
                    (children @ None, Some(next)) => *children = Some(next.clone()),
                    _ => {}
                }
                true
            }
            (
                SurfaceMemento::ChangeText { id, after, .. },
                SurfaceMemento::ChangeText {
                    id: next_id,
                    after: next_after,
                    ..
                },
            ) if id == next_id => {
                after.clone_from(next_after);
                true
            }
            _ => false,
        }
    }

    fn action_name(&self) -> &'static str {
        match self {
            SurfaceMemento::AddElement { .. } => "Add element",
            SurfaceMemento::RemoveElement { .. } => "Remove element",
            SurfaceMemento::ChangeBounds { .. } => "Move element",
            SurfaceMemento::ChangeField { .. } => "Change property",
            SurfaceMemento::ChangeText { .. } => "Edit text",
            SurfaceMemento::ChangeZOrder { .. } => "Change order",
            SurfaceMemento::ChangeSelection { .. } => "Change selection",
            SurfaceMemento::Crop { .. } => "Crop",
            SurfaceMemento::Batch { name, .. } => name,
        }
    }
}
