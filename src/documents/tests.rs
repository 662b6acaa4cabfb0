use super::*;
use tempfile::TempDir;

fn write_doc(root: &Path, folder: &str, name: &str, content: &str) {
    let dir = root.join("docs").join(folder);
    fs::create_dir_all(&dir).expect("should create docs folder");
    fs::write(dir.join(name), content).expect("should write document");
}

#[test]
fn jurisdiction_lookup() {
    assert_eq!(Jurisdiction::from_folder("federal"), Jurisdiction::Federal);
    assert_eq!(Jurisdiction::from_folder("ontario"), Jurisdiction::Provincial);
    assert_eq!(Jurisdiction::from_folder("provinces"), Jurisdiction::Provincial);
    assert_eq!(Jurisdiction::from_folder("wcag"), Jurisdiction::Standards);
}

#[test]
fn unmapped_folders_are_unknown() {
    for name in ["", "Federal", "quebec", "misc", "wcag2", "ontario ", "../federal"] {
        assert_eq!(
            Jurisdiction::from_folder(name),
            Jurisdiction::Unknown,
            "folder {name:?} should be unknown"
        );
    }
}

#[test]
fn label_round_trip() {
    for jurisdiction in [
        Jurisdiction::Federal,
        Jurisdiction::Provincial,
        Jurisdiction::Standards,
        Jurisdiction::Unknown,
    ] {
        assert_eq!(Jurisdiction::from_label(jurisdiction.as_str()), jurisdiction);
        assert_eq!(jurisdiction.to_string(), jurisdiction.as_str());
    }
}

#[test]
fn loads_documents_with_metadata() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let root = temp_dir.path();
    write_doc(root, "federal", "accessible_canada_act.txt", "The ACA applies federally.");
    write_doc(root, "ontario", "aoda.txt", "AODA applies in Ontario.");
    write_doc(root, "wcag", "wcag_21.txt", "WCAG 2.1 success criteria.");

    let documents = load_documents(&root.join("docs"), root).expect("should load documents");
    assert_eq!(documents.len(), 3);

    let aca = &documents[0];
    assert_eq!(aca.metadata.source, "accessible_canada_act");
    assert_eq!(aca.metadata.jurisdiction, Jurisdiction::Federal);
    assert_eq!(
        aca.metadata.file_path,
        Path::new("docs")
            .join("federal")
            .join("accessible_canada_act.txt")
            .to_string_lossy()
    );
    assert_eq!(aca.content, "The ACA applies federally.");

    assert_eq!(documents[1].metadata.jurisdiction, Jurisdiction::Provincial);
    assert_eq!(documents[2].metadata.jurisdiction, Jurisdiction::Standards);
}

#[test]
fn unknown_folder_does_not_fail_ingestion() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let root = temp_dir.path();
    write_doc(root, "municipal", "toronto_bylaw.txt", "City accessibility bylaw.");

    let documents = load_documents(&root.join("docs"), root).expect("should load documents");
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].metadata.jurisdiction, Jurisdiction::Unknown);
}

#[test]
fn skips_non_text_files_and_top_level_files() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let root = temp_dir.path();
    write_doc(root, "federal", "notes.md", "not loaded");
    write_doc(root, "federal", "aca.txt", "loaded");
    fs::write(root.join("docs").join("README.txt"), "top level").expect("should write");

    let documents = load_documents(&root.join("docs"), root).expect("should load documents");
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].metadata.source, "aca");
}

#[test]
fn empty_docs_directory_is_an_ingestion_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let docs = temp_dir.path().join("docs");
    fs::create_dir_all(docs.join("federal")).expect("should create folder");

    let result = load_documents(&docs, temp_dir.path());
    assert!(matches!(result, Err(AdvisorError::Ingestion(_))));
}

#[test]
fn missing_docs_directory_is_an_ingestion_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let result = load_documents(&temp_dir.path().join("docs"), temp_dir.path());
    assert!(matches!(result, Err(AdvisorError::Ingestion(_))));
}

#[test]
fn file_outside_root_keeps_full_path() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let other_root = TempDir::new().expect("should create second temp dir");
    write_doc(temp_dir.path(), "federal", "aca.txt", "text");

    let documents =
        load_documents(&temp_dir.path().join("docs"), other_root.path()).expect("should load");
    assert!(Path::new(&documents[0].metadata.file_path).is_absolute());
}
