use super::*;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Maps each text onto three topic axes by keyword so nearest neighbours are predictable
struct KeywordEmbedder {
    model: String,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    fn new(model: &str) -> Arc<Self> {
        Arc::new(Self {
            model: model.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Embedder for KeywordEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn embed_batch(&self, texts: &[String]) -> crate::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|text| {
                let text = text.to_lowercase();
                vec![
                    0.1 + f32::from(u8::from(text.contains("federal"))),
                    0.1 + f32::from(u8::from(text.contains("ontario"))),
                    0.1 + f32::from(u8::from(text.contains("contrast"))),
                ]
            })
            .collect())
    }
}

fn write_corpus(root: &std::path::Path) {
    let docs = root.join("docs");
    for (folder, file, content) in [
        (
            "federal",
            "accessible_canada_act.txt",
            "Federal regulated entities must publish accessibility plans.",
        ),
        (
            "ontario",
            "aoda.txt",
            "Ontario organizations must file accessibility compliance reports.",
        ),
        (
            "wcag",
            "wcag_21.txt",
            "Text contrast must be at least 4.5 to 1.",
        ),
    ] {
        fs::create_dir_all(docs.join(folder)).expect("should create folder");
        fs::write(docs.join(folder).join(file), content).expect("should write document");
    }
}

fn test_config(root: &std::path::Path) -> Config {
    Config {
        base_dir: root.to_path_buf(),
        ..Config::default()
    }
}

#[tokio::test]
async fn open_without_manifest_is_none() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = test_config(temp_dir.path());

    let opened = Index::open(&config, KeywordEmbedder::new("keyword"))
        .await
        .expect("open should succeed");
    assert!(opened.is_none());
}

#[tokio::test]
async fn build_writes_manifest_and_answers_queries() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_corpus(temp_dir.path());
    let config = test_config(temp_dir.path());

    let index = Index::build(&config, KeywordEmbedder::new("keyword"))
        .await
        .expect("build should succeed");

    let manifest = index.manifest();
    assert_eq!(manifest.entry_count, 3);
    assert_eq!(manifest.document_count, 3);
    assert_eq!(manifest.dimension, Some(3));
    assert_eq!(manifest.embedding_model, "keyword");
    assert!(config.index_path().join("manifest.json").exists());
    assert!(!config.build_lock_path().exists());

    let hits = index
        .search("What do federal laws require?", 1)
        .await
        .expect("search should succeed");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].metadata.source, "accessible_canada_act");
    assert_eq!(hits[0].metadata.jurisdiction, crate::documents::Jurisdiction::Federal);
}

#[tokio::test]
async fn open_rejects_different_embedding_model() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_corpus(temp_dir.path());
    let config = test_config(temp_dir.path());

    Index::build(&config, KeywordEmbedder::new("keyword-v1"))
        .await
        .expect("build should succeed");

    let result = Index::open(&config, KeywordEmbedder::new("keyword-v2")).await;
    match result {
        Err(AdvisorError::IndexModelMismatch {
            index_model,
            configured_model,
        }) => {
            assert_eq!(index_model, "keyword-v1");
            assert_eq!(configured_model, "keyword-v2");
        }
        other => panic!("expected a model mismatch, got {other:?}"),
    }
}

#[tokio::test]
async fn build_fails_while_locked() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_corpus(temp_dir.path());
    let config = test_config(temp_dir.path());

    let _held = BuildLock::acquire(&config.build_lock_path()).expect("should acquire lock");
    let result = Index::build(&config, KeywordEmbedder::new("keyword")).await;

    assert!(matches!(result, Err(AdvisorError::IndexLocked(_))));
}

#[tokio::test]
async fn build_without_documents_is_an_ingestion_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = test_config(temp_dir.path());

    let result = Index::build(&config, KeywordEmbedder::new("keyword")).await;

    assert!(matches!(result, Err(AdvisorError::Ingestion(_))));
    assert!(!config.build_lock_path().exists());
}

#[tokio::test]
async fn whitespace_corpus_builds_an_empty_index() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let folder = temp_dir.path().join("docs").join("federal");
    fs::create_dir_all(&folder).expect("should create folder");
    fs::write(folder.join("blank.txt"), "  \n\n  ").expect("should write document");
    let config = test_config(temp_dir.path());
    let embedder = KeywordEmbedder::new("keyword");

    let index = Index::build(&config, Arc::<KeywordEmbedder>::clone(&embedder))
        .await
        .expect("build should succeed");
    assert!(index.is_empty());
    assert_eq!(index.manifest().dimension, None);

    let reopened = Index::open(&config, Arc::<KeywordEmbedder>::clone(&embedder))
        .await
        .expect("open should succeed")
        .expect("manifest should exist");
    let hits = reopened
        .search("anything", 5)
        .await
        .expect("search should succeed");
    assert!(hits.is_empty());
    assert_eq!(embedder.calls(), 0);
}

#[tokio::test]
async fn loader_returns_same_handle() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_corpus(temp_dir.path());
    let embedder = KeywordEmbedder::new("keyword");
    let loader = IndexLoader::new(
        test_config(temp_dir.path()),
        Arc::<KeywordEmbedder>::clone(&embedder),
    );

    assert!(!loader.is_loaded());
    let first = loader.get_index().await.expect("first load should succeed");
    let calls_after_build = embedder.calls();
    let second = loader.get_index().await.expect("second load should succeed");

    assert!(loader.is_loaded());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(embedder.calls(), calls_after_build);
}

#[tokio::test]
async fn loader_rebuild_replaces_handle() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    write_corpus(temp_dir.path());
    let mut loader =
        IndexLoader::new(test_config(temp_dir.path()), KeywordEmbedder::new("keyword"));

    let first = loader.get_index().await.expect("load should succeed");
    let rebuilt = loader.rebuild().await.expect("rebuild should succeed");
    let current = loader.get_index().await.expect("load should succeed");

    assert!(!Arc::ptr_eq(&first, &rebuilt));
    assert!(Arc::ptr_eq(&rebuilt, &current));
    assert_eq!(current.len(), 3);
}
