//! Mutable document state shared by the surface and its mementos

use image::RgbaImage;

use crate::container::{DrawableContainer, DrawableContainerList};
use crate::domain::{ContainerId, Rect, SurfaceId};
use crate::error::SurfaceError;

/// Notification for renderers and other observers of a surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    ElementAdded(ContainerId),
    ElementRemoved(ContainerId),
    /// Bounds, text or z-order changed
    ElementChanged(ContainerId),
    FieldChanged(ContainerId, crate::fields::FieldType),
    SelectionChanged,
    BackgroundChanged,
    Invalidated,
}

/// Everything undo/redo can touch
#[derive(Debug)]
pub struct SurfaceContent {
    pub(crate) id: SurfaceId,
    pub(crate) image: RgbaImage,
    pub(crate) elements: DrawableContainerList,
    pub(crate) selection: Vec<ContainerId>,
    pub(crate) events: Vec<SurfaceEvent>,
}

impl SurfaceContent {
    pub(crate) fn new(image: RgbaImage) -> Self {
        Self {
            id: SurfaceId::new(),
            image,
            elements: DrawableContainerList::new(),
            selection: Vec::new(),
            events: Vec::new(),
        }
    }

    pub(crate) fn image_rect(&self) -> Rect {
        Rect::new(0, 0, self.image.width() as i32, self.image.height() as i32)
    }

    pub(crate) fn insert_element(
        &mut self,
        index: usize,
        mut container: DrawableContainer,
    ) -> Result<(), SurfaceError> {
        let id = container.id();
        container.attach(self.id);
        self.elements.insert(index, container)?;
        self.events.push(SurfaceEvent::ElementAdded(id));
        Ok(())
    }

    /// Remove from the live list; the element keeps no surface handle
    pub(crate) fn take_element(&mut self, id: ContainerId) -> Option<(usize, DrawableContainer)> {
        let (index, mut container) = self.elements.remove(id)?;
        container.detach();
        if self.selection.contains(&id) {
            let selection = self.selection.iter().copied().filter(|s| *s != id).collect();
            self.set_selection(selection);
        }
        self.events.push(SurfaceEvent::ElementRemoved(id));
        Some((index, container))
    }

    pub(crate) fn set_bounds(&mut self, id: ContainerId, bounds: Rect) {
        if let Some(container) = self.elements.get_mut(id) {
            container.set_bounds(bounds);
            self.events.push(SurfaceEvent::ElementChanged(id));
        }
    }

    pub(crate) fn set_selection(&mut self, selection: Vec<ContainerId>) {
        if self.selection != selection {
            self.selection = selection;
            self.events.push(SurfaceEvent::SelectionChanged);
        }
    }
}
