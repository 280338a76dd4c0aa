//! The editable document: background raster, elements, selection and
//! history.
//!
//! Every mutation goes through [`Surface`], which records a
//! [`SurfaceMemento`] when asked to, keeps the field aggregator bound to
//! the selection and queues [`SurfaceEvent`]s for whoever renders the
//! surface.

pub mod content;
pub mod memento;

use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

use image::RgbaImage;

use crate::config::EditorConfig;
use crate::container::{ContainerKind, DrawableContainer, DrawableContainerList};
use crate::domain::{CaptureDetails, ContainerId, Rect, SurfaceId};
use crate::error::{FormatError, SurfaceError};
use crate::fields::{
    Field, FieldAggregator, FieldCache, FieldFlags, FieldHolder, FieldType, FieldValue,
};
use crate::format::{self, CancelFlag, Document};
use crate::memento::UndoStack;
use crate::render;

pub use content::{SurfaceContent, SurfaceEvent};
pub use memento::SurfaceMemento;

/// An annotated capture being edited
#[derive(Debug)]
pub struct Surface {
    content: SurfaceContent,
    history: UndoStack<SurfaceMemento>,
    aggregator: FieldAggregator,
    cache: FieldCache,
    capture: CaptureDetails,
    counter_start: i32,
    modified: bool,
    gesture_open: bool,
}

impl Surface {
    pub fn new(image: RgbaImage, cache: FieldCache) -> Self {
        Self {
            content: SurfaceContent::new(image),
            history: UndoStack::default(),
            aggregator: FieldAggregator::new(),
            cache,
            capture: CaptureDetails::default(),
            counter_start: 1,
            modified: false,
            gesture_open: false,
        }
    }

    /// Create a surface for a fresh capture, applying its crop region
    pub fn from_capture(
        image: RgbaImage,
        capture: CaptureDetails,
        cache: FieldCache,
        config: &EditorConfig,
    ) -> Self {
        let full = Rect::new(0, 0, image.width() as i32, image.height() as i32);
        let image = match capture.crop.and_then(|crop| crop.intersect(full)) {
            Some(crop) if crop != full => {
                log::debug!("Cropping capture to {:?}", crop);
                image::imageops::crop_imm(
                    &image,
                    crop.left as u32,
                    crop.top as u32,
                    crop.width() as u32,
                    crop.height() as u32,
                )
                .to_image()
            }
            Some(_) => image,
            None => {
                if capture.crop.is_some() {
                    log::warn!("Capture crop lies outside the image, keeping full image");
                }
                image
            }
        };
        let mut surface = Self::new(image, cache);
        surface.history = UndoStack::new(config.undo_limit());
        surface.counter_start = config.counter_start;
        surface.capture = capture;
        surface
    }

    /// Rebuild a surface from a loaded document. Nothing is undoable and
    /// the surface starts unmodified.
    pub fn from_document(document: Document, cache: FieldCache) -> Result<Self, SurfaceError> {
        let Document {
            image,
            elements,
            capture,
            counter_start,
        } = document;
        let mut surface = Self::new(image, cache);
        surface.capture = capture;
        surface.counter_start = counter_start;
        for element in elements {
            if surface.content.elements.contains(element.id()) {
                return Err(SurfaceError::DuplicateElement(element.id()));
            }
            let index = surface.content.elements.len();
            surface.content.insert_element(index, element)?;
        }
        surface.content.events.clear();
        Ok(surface)
    }

    /// Owned copy of the persistent state, safe to hand to another thread
    pub fn snapshot(&self) -> Document {
        Document {
            image: self.content.image.clone(),
            elements: self
                .content
                .elements
                .iter()
                .map(|element| {
                    let mut element = element.clone();
                    element.detach();
                    element
                })
                .collect(),
            capture: self.capture.clone(),
            counter_start: self.counter_start,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.content.id
    }

    pub fn image(&self) -> &RgbaImage {
        &self.content.image
    }

    pub fn capture(&self) -> &CaptureDetails {
        &self.capture
    }

    pub fn field_cache(&self) -> &FieldCache {
        &self.cache
    }

    pub fn modified(&self) -> bool {
        self.modified
    }

    /// Drain pending notifications
    pub fn take_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.content.events)
    }

    fn touch(&mut self, invalidate: bool) {
        self.modified = true;
        if invalidate {
            self.content.events.push(SurfaceEvent::Invalidated);
        }
    }

    // --- elements ---

    pub fn elements(&self) -> &DrawableContainerList {
        &self.content.elements
    }

    pub fn element(&self, id: ContainerId) -> Option<&DrawableContainer> {
        self.content.elements.get(id)
    }

    pub fn is_on_surface(&self, id: ContainerId) -> bool {
        self.content.elements.contains(id)
    }

    /// Topmost element under the point
    pub fn element_at(&self, x: i32, y: i32) -> Option<&DrawableContainer> {
        self.content.elements.element_at(x, y)
    }

    fn require(&self, id: ContainerId) -> Result<&DrawableContainer, SurfaceError> {
        self.content
            .elements
            .get(id)
            .ok_or(SurfaceError::UnknownElement(id))
    }

    /// Put an element on top of the z-order
    pub fn add_element(
        &mut self,
        container: DrawableContainer,
        make_undoable: bool,
        invalidate: bool,
    ) -> Result<ContainerId, SurfaceError> {
        let id = container.id();
        if self.content.elements.contains(id) {
            return Err(SurfaceError::DuplicateElement(id));
        }
        let index = self.content.elements.len();
        self.content.insert_element(index, container)?;
        if make_undoable {
            self.history.make_undoable(
                SurfaceMemento::AddElement {
                    index,
                    id,
                    parked: None,
                },
                false,
            );
        }
        log::debug!("Added element {id} at {index}");
        self.touch(invalidate);
        Ok(id)
    }

    /// Add several elements as one undo step. Either all are added or
    /// none.
    pub fn add_elements(
        &mut self,
        containers: Vec<DrawableContainer>,
        make_undoable: bool,
    ) -> Result<Vec<ContainerId>, SurfaceError> {
        let mut ids: Vec<ContainerId> = Vec::with_capacity(containers.len());
        for container in &containers {
            let id = container.id();
            if self.content.elements.contains(id) || ids.contains(&id) {
                return Err(SurfaceError::DuplicateElement(id));
            }
            ids.push(id);
        }

        let mut steps = Vec::with_capacity(containers.len());
        for container in containers {
            let id = container.id();
            let index = self.content.elements.len();
            self.content.insert_element(index, container)?;
            steps.push(SurfaceMemento::AddElement {
                index,
                id,
                parked: None,
            });
        }
        if make_undoable && !steps.is_empty() {
            self.history.make_undoable(
                SurfaceMemento::Batch {
                    name: "Add elements",
                    steps,
                },
                false,
            );
        }
        self.touch(true);
        Ok(ids)
    }

    /// Take an element off the surface, deselecting it first. When
    /// undoable, the deselection and the removal are one undo step.
    pub fn remove_element(
        &mut self,
        id: ContainerId,
        make_undoable: bool,
    ) -> Result<(), SurfaceError> {
        self.remove_elements(&[id], make_undoable)
    }

    /// Remove several elements as one undo step
    pub fn remove_elements(
        &mut self,
        ids: &[ContainerId],
        make_undoable: bool,
    ) -> Result<(), SurfaceError> {
        for id in ids {
            self.require(*id)?;
        }

        let mut steps = Vec::new();
        let before = self.content.selection.clone();
        let after: Vec<ContainerId> = before
            .iter()
            .copied()
            .filter(|s| !ids.contains(s))
            .collect();
        if after != before {
            self.content.set_selection(after.clone());
            self.rebind_aggregator();
            steps.push(SurfaceMemento::ChangeSelection { before, after });
        }

        let mut indexed: Vec<(usize, ContainerId)> = ids
            .iter()
            .filter_map(|id| self.content.elements.index_of(*id).map(|i| (i, *id)))
            .collect();
        indexed.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        indexed.dedup();
        for (_, id) in indexed {
            if let Some((index, container)) = self.content.take_element(id) {
                log::debug!("Removed element {id} from {index}");
                steps.push(SurfaceMemento::RemoveElement {
                    index,
                    id,
                    parked: Some(Box::new(container)),
                });
            }
        }

        if make_undoable {
            let memento = if steps.len() == 1 {
                steps.pop()
            } else {
                let name = if ids.len() == 1 {
                    "Remove element"
                } else {
                    "Remove elements"
                };
                Some(SurfaceMemento::Batch { name, steps })
            };
            if let Some(memento) = memento {
                self.history.make_undoable(memento, false);
            }
        }
        self.touch(true);
        Ok(())
    }

    // --- selection ---

    pub fn selected_elements(&self) -> &[ContainerId] {
        &self.content.selection
    }

    pub fn is_selected(&self, id: ContainerId) -> bool {
        self.content.selection.contains(&id)
    }

    /// Field view over the current selection
    pub fn field_aggregator(&self) -> &FieldAggregator {
        &self.aggregator
    }

    /// Whether selected elements disagree on a field value
    pub fn selection_has_mixed_values(&self, field_type: FieldType) -> bool {
        self.aggregator
            .has_mixed_values(field_type, &self.content.elements)
    }

    pub fn select_element(&mut self, id: ContainerId) -> Result<(), SurfaceError> {
        let container = self
            .content
            .elements
            .get(id)
            .ok_or(SurfaceError::UnknownElement(id))?;
        if self.content.selection.contains(&id) {
            return Ok(());
        }
        self.aggregator.bind_element(id, container);
        let mut selection = self.content.selection.clone();
        selection.push(id);
        self.content.set_selection(selection);
        Ok(())
    }

    pub fn select_elements(&mut self, ids: &[ContainerId]) -> Result<(), SurfaceError> {
        for id in ids {
            self.require(*id)?;
        }
        for id in ids {
            self.select_element(*id)?;
        }
        Ok(())
    }

    pub fn deselect_element(&mut self, id: ContainerId) {
        if !self.content.selection.contains(&id) {
            return;
        }
        self.aggregator.unbind_element(id, &self.content.elements);
        let selection = self
            .content
            .selection
            .iter()
            .copied()
            .filter(|s| *s != id)
            .collect();
        self.content.set_selection(selection);
    }

    pub fn deselect_all_elements(&mut self) {
        self.aggregator.unbind_all();
        self.content.set_selection(Vec::new());
    }

    /// Drop stale ids from the selection and rebind the aggregator
    fn rebind_aggregator(&mut self) {
        let elements = &self.content.elements;
        let selection: Vec<ContainerId> = self
            .content
            .selection
            .iter()
            .copied()
            .filter(|id| elements.contains(*id))
            .collect();
        self.content.set_selection(selection);

        self.aggregator.unbind_all();
        for id in &self.content.selection {
            if let Some(container) = self.content.elements.get(*id) {
                self.aggregator.bind_element(*id, container);
            }
        }
    }

    // --- geometry and z-order ---

    /// Start a drag or resize; edits until `end_gesture` merge per
    /// element and property
    pub fn begin_gesture(&mut self) {
        self.history.seal();
        self.gesture_open = true;
    }

    pub fn end_gesture(&mut self) {
        self.gesture_open = false;
        self.history.seal();
    }

    pub fn set_element_bounds(&mut self, id: ContainerId, bounds: Rect) -> Result<(), SurfaceError> {
        let before = self.require(id)?.bounds();
        if before == bounds {
            return Ok(());
        }
        self.content.set_bounds(id, bounds);
        self.history.make_undoable(
            SurfaceMemento::ChangeBounds {
                id,
                before,
                after: bounds,
            },
            self.gesture_open,
        );
        self.touch(true);
        Ok(())
    }

    pub fn move_element(&mut self, id: ContainerId, dx: i32, dy: i32) -> Result<(), SurfaceError> {
        let bounds = self.require(id)?.bounds().translate(dx, dy);
        self.set_element_bounds(id, bounds)
    }

    /// Move an element to a z-order position; returns false when it was
    /// already there
    pub fn move_element_to_index(
        &mut self,
        id: ContainerId,
        index: usize,
    ) -> Result<bool, SurfaceError> {
        let from = self
            .content
            .elements
            .index_of(id)
            .ok_or(SurfaceError::UnknownElement(id))?;
        let to = index.min(self.content.elements.len().saturating_sub(1));
        if from == to {
            return Ok(false);
        }
        self.content.elements.move_to(id, to);
        self.content.events.push(SurfaceEvent::ElementChanged(id));
        self.history
            .make_undoable(SurfaceMemento::ChangeZOrder { id, from, to }, false);
        self.touch(true);
        Ok(true)
    }

    pub fn pull_to_top(&mut self, id: ContainerId) -> Result<bool, SurfaceError> {
        self.move_element_to_index(id, usize::MAX)
    }

    pub fn push_to_bottom(&mut self, id: ContainerId) -> Result<bool, SurfaceError> {
        self.move_element_to_index(id, 0)
    }

    // --- fields and text ---

    /// Set a field on one element as a user edit. The value is remembered
    /// for new elements of the same kind.
    ///
    /// Returns false when the value did not change.
    pub fn set_field_value(
        &mut self,
        id: ContainerId,
        field_type: FieldType,
        value: FieldValue,
    ) -> Result<bool, SurfaceError> {
        let container = self
            .content
            .elements
            .get_mut(id)
            .ok_or(SurfaceError::UnknownElement(id))?;
        let before = container.field_value(field_type).cloned().unwrap_or_default();
        let rebuilds_children = container.kind().prepared_filter_field() == Some(field_type);
        let children_before = rebuilds_children.then(|| container.children().to_vec());

        if container.set_field_value(field_type, value.clone())?.is_none() {
            return Ok(false);
        }
        let memento = self.after_field_write(id, field_type, before, value, children_before);
        self.history.make_undoable(memento, self.gesture_open);
        self.rebind_aggregator();
        self.touch(true);
        Ok(true)
    }

    /// Set a field on every selected element exposing it, as one undo
    /// step. Returns false when no element changed.
    pub fn set_selected_field_value(
        &mut self,
        field_type: FieldType,
        value: FieldValue,
    ) -> Result<bool, SurfaceError> {
        let mut snapshots = Vec::new();
        for id in self.aggregator.bound_elements() {
            let Some(container) = self.content.elements.get(*id) else {
                continue;
            };
            if !container.has_field(field_type) {
                continue;
            }
            let rebuilds_children = container.kind().prepared_filter_field() == Some(field_type);
            snapshots.push((
                *id,
                container.field_value(field_type).cloned().unwrap_or_default(),
                rebuilds_children.then(|| container.children().to_vec()),
            ));
        }

        let changes =
            self.aggregator
                .set_field_value(field_type, value.clone(), &mut self.content.elements)?;
        if changes.is_empty() {
            return Ok(false);
        }

        let mut steps = Vec::with_capacity(changes.len());
        for (id, before, children_before) in snapshots {
            if changes.iter().any(|(changed, _)| *changed == id) {
                steps.push(self.after_field_write(
                    id,
                    field_type,
                    before,
                    value.clone(),
                    children_before,
                ));
            }
        }
        let memento = if steps.len() == 1 {
            steps.pop()
        } else {
            Some(SurfaceMemento::Batch {
                name: "Change property",
                steps,
            })
        };
        if let Some(memento) = memento {
            self.history.make_undoable(memento, self.gesture_open);
        }
        self.rebind_aggregator();
        self.touch(true);
        Ok(true)
    }

    /// Bookkeeping after a user field write: remember the value, rebuild
    /// filter children from the cache and describe the change for undo.
    fn after_field_write(
        &mut self,
        id: ContainerId,
        field_type: FieldType,
        before: FieldValue,
        after: FieldValue,
        children_before: Option<Vec<DrawableContainer>>,
    ) -> SurfaceMemento {
        let mut children = None;
        if let Some(container) = self.content.elements.get_mut(id) {
            if let Some(scope) = container.field(field_type).map(Field::scope) {
                self.cache.remember(field_type, scope, &after);
            }
            if let Some(children_before) = children_before {
                container.configure_children(Some(&self.cache));
                children = Some((children_before, container.children().to_vec()));
            }
        }
        self.content
            .events
            .push(SurfaceEvent::FieldChanged(id, field_type));
        SurfaceMemento::ChangeField {
            id,
            field_type,
            before,
            after,
            children,
        }
    }

    pub fn set_element_text(
        &mut self,
        id: ContainerId,
        text: impl Into<String>,
    ) -> Result<bool, SurfaceError> {
        let text = text.into();
        let container = self
            .content
            .elements
            .get_mut(id)
            .ok_or(SurfaceError::UnknownElement(id))?;
        if container.text() == text {
            return Ok(false);
        }
        let before = container.set_text(text.clone());
        self.content.events.push(SurfaceEvent::ElementChanged(id));
        self.history.make_undoable(
            SurfaceMemento::ChangeText {
                id,
                before,
                after: text,
            },
            self.gesture_open,
        );
        self.touch(true);
        Ok(true)
    }

    // --- step labels ---

    pub fn counter_start(&self) -> i32 {
        self.counter_start
    }

    pub fn set_counter_start(&mut self, counter_start: i32) {
        if self.counter_start != counter_start {
            self.counter_start = counter_start;
            self.touch(true);
        }
    }

    /// Number shown by a counting step label: `counter_start` plus the
    /// number of counting labels below it
    pub fn step_number(&self, id: ContainerId) -> Option<i32> {
        let mut number = self.counter_start;
        for container in &self.content.elements {
            if !is_counting_label(container) {
                continue;
            }
            if container.id() == id {
                return Some(number);
            }
            number += 1;
        }
        None
    }

    // --- history ---

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo step names, oldest first
    pub fn undo_history(&self) -> Vec<&'static str> {
        self.history.history()
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(&mut self.content) {
            Ok(()) => {
                self.after_history();
                true
            }
            Err(err) => {
                log::debug!("{err}");
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&mut self.content) {
            Ok(()) => {
                self.after_history();
                true
            }
            Err(err) => {
                log::debug!("{err}");
                false
            }
        }
    }

    fn after_history(&mut self) {
        self.rebind_aggregator();
        self.touch(true);
    }

    // --- crop and export ---

    /// Crop the background to `rect` as one undo step.
    ///
    /// The rectangle is clipped to the image. Every element moves by the
    /// crop origin; filter elements are clipped to the new image.
    pub fn apply_crop(&mut self, rect: Rect) -> Result<(), SurfaceError> {
        let clip = rect
            .intersect(self.content.image_rect())
            .ok_or(SurfaceError::EmptyCrop)?;
        let cropped = image::imageops::crop_imm(
            &self.content.image,
            clip.left as u32,
            clip.top as u32,
            clip.width() as u32,
            clip.height() as u32,
        )
        .to_image();
        let image = std::mem::replace(&mut self.content.image, cropped);
        let new_rect = self.content.image_rect();

        let mut bounds = Vec::with_capacity(self.content.elements.len());
        for container in self.content.elements.iter_mut() {
            let before = container.bounds();
            let mut after = before.translate(-clip.left, -clip.top);
            if container.kind().is_filter()
                && let Some(clipped) = after.intersect(new_rect)
            {
                after = clipped;
            }
            container.set_bounds(after);
            bounds.push((container.id(), before));
        }
        log::info!(
            "Cropped surface to {}x{} at ({}, {})",
            clip.width(),
            clip.height(),
            clip.left,
            clip.top
        );
        self.content.events.push(SurfaceEvent::BackgroundChanged);
        self.history
            .make_undoable(SurfaceMemento::Crop { image, bounds }, false);
        self.touch(true);
        Ok(())
    }

    /// Background with every element drawn on top. The surface is not
    /// changed.
    pub fn image_for_export(&self) -> RgbaImage {
        render::flatten(&self.content.image, &self.content.elements)
    }

    /// Write the flattened image as PNG
    pub fn write_export_png<W: Write>(&self, w: W) -> Result<(), FormatError> {
        format::write_png(w, &self.image_for_export())?;
        Ok(())
    }

    // --- persistence ---

    pub fn save<W: Write + Seek>(&mut self, w: W) -> Result<(), SurfaceError> {
        self.save_with_cancel(w, &CancelFlag::default())
    }

    /// Save in the current format; clears `modified` on success
    pub fn save_with_cancel<W: Write + Seek>(
        &mut self,
        w: W,
        cancel: &CancelFlag,
    ) -> Result<(), SurfaceError> {
        format::write_document(&self.snapshot(), w, cancel)?;
        self.modified = false;
        Ok(())
    }

    /// Save through a temporary file next to `path`, replacing it only
    /// once the write succeeded
    pub fn save_to_path(&mut self, path: &Path) -> Result<(), SurfaceError> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut file = tempfile::NamedTempFile::new_in(dir).map_err(FormatError::from)?;
        self.save(file.as_file_mut())?;
        file.persist(path)
            .map_err(|err| FormatError::from(err.error))?;
        log::info!("Saved {}", path.display());
        Ok(())
    }

    pub fn load<R: Read + Seek>(r: R, cache: FieldCache) -> Result<Self, SurfaceError> {
        let document = format::read_document(r, &CancelFlag::default())?;
        Self::from_document(document, cache)
    }

    pub fn load_from_path(path: &Path, cache: FieldCache) -> Result<Self, SurfaceError> {
        let file = File::open(path).map_err(FormatError::from)?;
        let surface = Self::load(BufReader::new(file), cache)?;
        log::info!("Loaded {}", path.display());
        Ok(surface)
    }

    /// New element of `kind` that starts from this session's field values
    pub fn create_element(&self, kind: ContainerKind, bounds: Rect) -> DrawableContainer {
        DrawableContainer::new(kind, bounds, &self.cache)
    }
}

fn is_counting_label(container: &DrawableContainer) -> bool {
    container.kind() == ContainerKind::StepLabel
        && container
            .field_value(FieldType::Flags)
            .and_then(FieldValue::as_flags)
            .is_some_and(|flags| flags.contains(FieldFlags::COUNTER))
}
