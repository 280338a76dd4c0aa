use std::io::{Cursor, Write};

use image::{Rgba, RgbaImage};
use snappea_editor::fields::{ArrowHeads, PreparedFilter};
use snappea_editor::format::write_png;
use snappea_editor::{
    CancelFlag, Color, ContainerKind, FieldCache, FieldHolder, FieldType, FieldValue,
    FormatError, Rect, Surface, SurfaceError,
};

fn background() -> RgbaImage {
    RgbaImage::from_fn(64, 48, |x, y| Rgba([x as u8 * 4, y as u8 * 5, 90, 255]))
}

/// Surface with one element of every top-level kind and some edits
fn busy_surface() -> Surface {
    let mut surface = Surface::new(background(), FieldCache::default());
    let kinds = [
        ContainerKind::Rectangle,
        ContainerKind::Ellipse,
        ContainerKind::Line,
        ContainerKind::Arrow,
        ContainerKind::Text,
        ContainerKind::StepLabel,
        ContainerKind::Highlight,
        ContainerKind::Obfuscate,
    ];
    let mut ids = Vec::new();
    for (i, kind) in kinds.into_iter().enumerate() {
        let i = i as i32;
        let element = surface.create_element(kind, Rect::new(i * 5, i * 3, i * 5 + 20, i * 3 + 12));
        ids.push(surface.add_element(element, true, true).unwrap());
    }
    surface
        .set_field_value(ids[0], FieldType::FillColor, FieldValue::Color(Color::YELLOW))
        .unwrap();
    surface
        .set_field_value(
            ids[3],
            FieldType::Arrowheads,
            FieldValue::ArrowHeads(ArrowHeads::BothPoints),
        )
        .unwrap();
    surface.set_element_text(ids[4], "look here").unwrap();
    surface
        .set_field_value(
            ids[7],
            FieldType::PreparedFilterObfuscate,
            FieldValue::PreparedFilter(PreparedFilter::Blur),
        )
        .unwrap();
    surface.move_element(ids[2], 3, -1).unwrap();
    surface.pull_to_top(ids[0]).unwrap();
    surface
}

#[test]
fn undo_to_exhaustion_then_redo_everything() {
    let mut surface = busy_surface();
    let final_state = surface.snapshot();
    let history_len = surface.undo_history().len();

    let mut steps = 0;
    while surface.undo() {
        steps += 1;
    }
    assert_eq!(steps, history_len);
    assert!(surface.elements().is_empty());
    assert!(!surface.can_undo());

    while surface.redo() {}
    assert_eq!(surface.snapshot().elements, final_state.elements);
}

#[test]
fn undo_then_redo_is_identity_at_every_step() {
    let mut surface = busy_surface();
    while surface.can_undo() {
        let before = surface.snapshot();
        assert!(surface.undo());
        assert!(surface.redo());
        assert_eq!(surface.snapshot(), before);
        surface.undo();
    }
}

#[test]
fn save_then_load_reconstructs_document() {
    let mut surface = busy_surface();
    surface.set_counter_start(7);
    let mut bytes = Cursor::new(Vec::new());
    surface.save(&mut bytes).unwrap();
    assert!(!surface.modified());

    bytes.set_position(0);
    let loaded = Surface::load(bytes, FieldCache::default()).unwrap();
    assert!(!loaded.modified());
    assert!(!loaded.can_undo());
    assert_eq!(loaded.snapshot(), surface.snapshot());
    assert_eq!(loaded.counter_start(), 7);
}

#[test]
fn unset_field_survives_save_and_load() {
    let mut surface = Surface::new(background(), FieldCache::default());
    let element = surface.create_element(ContainerKind::Rectangle, Rect::new(2, 2, 20, 20));
    let id = surface.add_element(element, true, true).unwrap();
    surface
        .set_field_value(id, FieldType::LineColor, FieldValue::Null)
        .unwrap();

    let mut bytes = Cursor::new(Vec::new());
    surface.save(&mut bytes).unwrap();
    bytes.set_position(0);
    let loaded = Surface::load(bytes, FieldCache::default()).unwrap();
    assert_eq!(
        loaded.element(id).unwrap().field_value(FieldType::LineColor),
        Some(&FieldValue::Null)
    );
    assert_eq!(loaded.snapshot(), surface.snapshot());
}

#[test]
fn save_to_path_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.greenshot");
    let mut surface = busy_surface();
    surface.save_to_path(&path).unwrap();

    let loaded = Surface::load_from_path(&path, FieldCache::default()).unwrap();
    assert_eq!(loaded.elements().len(), surface.elements().len());
    assert_eq!(loaded.image(), surface.image());
}

#[test]
fn legacy_file_with_bad_marker_is_rejected() {
    let mut bytes = Vec::new();
    write_png(&mut bytes, &background()).unwrap();
    bytes.write_all(&0u64.to_le_bytes()).unwrap();
    bytes.write_all(b"Snapshot20.1xx").unwrap();
    assert!(matches!(
        Surface::load(Cursor::new(bytes), FieldCache::default()),
        Err(SurfaceError::Format(FormatError::NotAGreenshotFile))
    ));
}

#[test]
fn legacy_image_only_file_loads() {
    let mut bytes = Vec::new();
    write_png(&mut bytes, &background()).unwrap();
    bytes.write_all(&0u64.to_le_bytes()).unwrap();
    bytes.write_all(b"Greenshot01.02").unwrap();
    let surface = Surface::load(Cursor::new(bytes), FieldCache::default()).unwrap();
    assert_eq!(surface.image(), &background());
    assert!(surface.elements().is_empty());
}

fn archive(content: Option<&str>) -> Cursor<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut bytes);
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("image.png", options).unwrap();
        write_png(&mut zip, &background()).unwrap();
        if let Some(content) = content {
            zip.start_file("content.json", options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    bytes.set_position(0);
    bytes
}

#[test]
fn archive_without_content_is_not_a_document() {
    assert!(matches!(
        Surface::load(archive(None), FieldCache::default()),
        Err(SurfaceError::Format(FormatError::NotAGreenshotFile))
    ));
}

#[test]
fn unknown_names_fail_the_whole_load() {
    let unknown_variant = r#"{"version": 2, "containers": [
        {"$type": "RectangleContainer", "bounds": {"left": 0, "top": 0, "right": 5, "bottom": 5},
         "fields": {"LINE_COLOR": {"$type": "Gradient", "value": "red to blue"}}}
    ]}"#;
    assert!(matches!(
        Surface::load(archive(Some(unknown_variant)), FieldCache::default()),
        Err(SurfaceError::Format(FormatError::UnknownFieldVariant(tag))) if tag == "Gradient"
    ));

    let unknown_container = r#"{"version": 2, "containers": [
        {"$type": "RectangleContainer", "bounds": {"left": 0, "top": 0, "right": 5, "bottom": 5}},
        {"$type": "SpeechbubbleContainer", "bounds": {"left": 0, "top": 0, "right": 5, "bottom": 5}}
    ]}"#;
    assert!(matches!(
        Surface::load(archive(Some(unknown_container)), FieldCache::default()),
        Err(SurfaceError::Format(FormatError::UnknownContainerType(name)))
            if name == "SpeechbubbleContainer"
    ));
}

#[test]
fn content_written_by_hand_loads() {
    let content = r##"{"version": 2, "counterStart": 2, "containers": [
        {"$type": "ArrowContainer", "bounds": {"left": 40, "top": 30, "right": 2, "bottom": 4},
         "fields": {
            "LINE_COLOR": {"$type": "Color", "value": "#FF0000FF"},
            "LINE_THICKNESS": {"$type": "Int", "value": 4},
            "ARROWHEADS": {"$type": "ArrowHeadCombination", "value": "StartPoint"}
         }}
    ]}"##;
    let surface = Surface::load(archive(Some(content)), FieldCache::default()).unwrap();
    let arrow = surface.elements().iter().next().unwrap();
    assert_eq!(arrow.kind(), ContainerKind::Arrow);
    assert_eq!(arrow.bounds(), Rect::new(40, 30, 2, 4));
    assert_eq!(arrow.color_value(FieldType::LineColor), Color::rgb(0, 0, 255));
    assert_eq!(arrow.int_value(FieldType::LineThickness), 4);
    assert_eq!(surface.counter_start(), 2);
}

#[test]
fn remove_then_undo_restores_selection_and_position() {
    let mut surface = Surface::new(background(), FieldCache::default());
    let a = surface.create_element(ContainerKind::Rectangle, Rect::new(0, 0, 10, 10));
    let b = surface.create_element(ContainerKind::Ellipse, Rect::new(0, 0, 10, 10));
    let c = surface.create_element(ContainerKind::Line, Rect::new(0, 0, 10, 10));
    let ids = surface.add_elements(vec![a, b, c], true).unwrap();
    surface.select_elements(&[ids[1], ids[2]]).unwrap();

    surface.remove_element(ids[1], true).unwrap();
    assert_eq!(surface.selected_elements(), &[ids[2]]);

    assert!(surface.undo());
    assert_eq!(surface.elements().ids(), ids);
    assert_eq!(surface.selected_elements(), &[ids[1], ids[2]]);
    assert_eq!(surface.field_aggregator().bound_elements(), &[ids[1], ids[2]]);
}

#[test]
fn drag_is_one_undo_step() {
    let mut surface = Surface::new(background(), FieldCache::default());
    let element = surface.create_element(ContainerKind::Rectangle, Rect::new(0, 0, 10, 10));
    let id = surface.add_element(element, true, true).unwrap();

    surface.begin_gesture();
    surface.move_element(id, 1, 1).unwrap();
    surface.move_element(id, 1, 1).unwrap();
    surface.move_element(id, 1, 1).unwrap();
    surface.end_gesture();

    assert!(surface.undo());
    assert_eq!(surface.element(id).unwrap().bounds(), Rect::new(0, 0, 10, 10));
    assert!(surface.undo());
    assert!(!surface.is_on_surface(id));
}

#[test]
fn cancelled_save_reports_cancellation() {
    let mut surface = busy_surface();
    let cancel = CancelFlag::new();
    cancel.cancel();
    assert!(matches!(
        surface.save_with_cancel(Cursor::new(Vec::new()), &cancel),
        Err(SurfaceError::Format(FormatError::Cancelled))
    ));
    assert!(surface.modified());
}

#[test]
fn export_does_not_mutate_the_document() {
    let surface = busy_surface();
    let before = surface.snapshot();
    let exported = surface.image_for_export();
    assert_eq!(exported.dimensions(), surface.image().dimensions());
    assert_eq!(surface.snapshot(), before);
}
