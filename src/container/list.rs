//! Ordered element collection; list order is render order

use crate::domain::ContainerId;
use crate::error::SurfaceError;
use crate::fields::{FieldHolder, FieldHolderStore};

use super::drawable::DrawableContainer;

/// Elements from bottom to top. An id appears at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawableContainerList {
    items: Vec<DrawableContainer>,
}

impl DrawableContainerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawableContainer> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, DrawableContainer> {
        self.items.iter_mut()
    }

    pub fn ids(&self) -> Vec<ContainerId> {
        self.items.iter().map(DrawableContainer::id).collect()
    }

    pub fn contains(&self, id: ContainerId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: ContainerId) -> Option<usize> {
        self.items.iter().position(|c| c.id() == id)
    }

    pub fn get(&self, id: ContainerId) -> Option<&DrawableContainer> {
        self.items.iter().find(|c| c.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: ContainerId) -> Option<&mut DrawableContainer> {
        self.items.iter_mut().find(|c| c.id() == id)
    }

    /// Topmost element containing the point
    pub fn element_at(&self, x: i32, y: i32) -> Option<&DrawableContainer> {
        self.items.iter().rev().find(|c| c.contains_point(x, y))
    }

    /// Append on top of the z-order
    pub fn push(&mut self, container: DrawableContainer) -> Result<usize, SurfaceError> {
        let index = self.items.len();
        self.insert(index, container)?;
        Ok(index)
    }

    /// Insert at `index`, clamped to the list length
    pub fn insert(&mut self, index: usize, container: DrawableContainer) -> Result<(), SurfaceError> {
        if self.contains(container.id()) {
            debug_assert!(false, "duplicate element {}", container.id());
            return Err(SurfaceError::DuplicateElement(container.id()));
        }
        let index = index.min(self.items.len());
        self.items.insert(index, container);
        Ok(())
    }

    /// Remove one element, returning its former index
    pub fn remove(&mut self, id: ContainerId) -> Option<(usize, DrawableContainer)> {
        let index = self.index_of(id)?;
        Some((index, self.items.remove(index)))
    }

    /// Remove several elements. Survivors keep their relative order;
    /// removed elements come back with their former indices, ascending.
    pub fn remove_many(&mut self, ids: &[ContainerId]) -> Vec<(usize, DrawableContainer)> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.items.len());
        for (index, container) in std::mem::take(&mut self.items).into_iter().enumerate() {
            if ids.contains(&container.id()) {
                removed.push((index, container));
            } else {
                kept.push(container);
            }
        }
        self.items = kept;
        removed
    }

    /// Move an element to a new z-order position, returning the old one
    pub fn move_to(&mut self, id: ContainerId, index: usize) -> Option<usize> {
        let (from, container) = self.remove(id)?;
        let index = index.min(self.items.len());
        self.items.insert(index, container);
        Some(from)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a DrawableContainerList {
    type Item = &'a DrawableContainer;
    type IntoIter = std::slice::Iter<'a, DrawableContainer>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FieldHolderStore for DrawableContainerList {
    fn holder(&self, id: ContainerId) -> Option<&dyn FieldHolder> {
        self.get(id).map(|c| c as &dyn FieldHolder)
    }

    fn holder_mut(&mut self, id: ContainerId) -> Option<&mut dyn FieldHolder> {
        self.get_mut(id).map(|c| c as &mut dyn FieldHolder)
    }
}
