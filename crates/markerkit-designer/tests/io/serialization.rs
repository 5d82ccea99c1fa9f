use markerkit_core::{Point, Rect};
use markerkit_designer::serialization::FILE_FORMAT_VERSION;
use markerkit_designer::{
    load_document, save_document, ArtworkElement, ArtworkTemplate, ArtworkTemplateLibrary,
    DesignDocument, DocumentFile, DocumentStatus, TextElement,
};

use crate::common::upright_template;

fn document() -> DesignDocument {
    let mut doc = DesignDocument::new(&upright_template(), "Whitaker");
    doc.push_element(
        TextElement::new("WHITAKER", "Times", 3.5, Point::new(18.0, 2.5)).with_rotation(-2.0),
    )
    .unwrap();
    doc.push_element(ArtworkElement::new("art/lily.png", Rect::new(3.0, 3.0, 6.0, 9.0)))
        .unwrap();
    doc.set_status(DocumentStatus::Completed).unwrap();
    doc
}

#[test]
fn test_save_and_load_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("whitaker.json");
    let doc = document();

    save_document(&doc, &path).unwrap();
    let loaded = load_document(&path).unwrap();

    assert_eq!(loaded, doc);
    assert_eq!(loaded.status(), DocumentStatus::Completed);
    assert_eq!(loaded.template_id(), "upright-60");
}

#[test]
fn test_file_carries_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("versioned.json");
    DocumentFile::new(document()).save_to_file(&path).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["version"], FILE_FORMAT_VERSION);
    assert_eq!(raw["document"]["status"], "completed");
    assert_eq!(raw["document"]["elements"][1]["type"], "artwork");
}

#[test]
fn test_load_missing_file_has_context() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_document(dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read document file"));
}

#[test]
fn test_artwork_library_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("artwork.json");

    let mut library = ArtworkTemplateLibrary::new();
    let art = ArtworkTemplate::capture(&document(), "Lily panel", Some("previews/lily.png".into()));
    let id = art.id().to_string();
    library.add(art).unwrap();
    library.save_to_file(&path).unwrap();

    let loaded = ArtworkTemplateLibrary::load_from_file(&path).unwrap();
    let art = loaded.get(&id).unwrap();
    assert_eq!(art.name(), "Lily panel");
    assert_eq!(art.preview_ref(), Some("previews/lily.png"));
    assert_eq!(art.elements().len(), 2);

    let empty = ArtworkTemplateLibrary::load_from_file(&dir.path().join("none.json")).unwrap();
    assert!(empty.is_empty());
}
