// Shared fakes for integration tests
// Each test binary uses a different subset of these helpers

#![expect(dead_code, reason = "not every integration test uses every helper")]

use accessibility_advisor::Result;
use accessibility_advisor::config::Config;
use accessibility_advisor::embeddings::Embedder;
use accessibility_advisor::llm::ChatModel;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const HASH_DIMENSION: usize = 64;

/// Deterministic bag-of-words embedder: texts sharing words land close together
pub struct HashEmbedder {
    model: String,
    batch_calls: AtomicUsize,
    texts_embedded: AtomicUsize,
}

impl HashEmbedder {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            batch_calls: AtomicUsize::new(0),
            texts_embedded: AtomicUsize::new(0),
        }
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub fn texts_embedded(&self) -> usize {
        self.texts_embedded.load(Ordering::SeqCst)
    }

    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; HASH_DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2)
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % HASH_DIMENSION as u64) as usize;
            vector[bucket] += 1.0;
        }
        // Keeps texts without qualifying words away from the zero vector
        vector[0] += 0.01;

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        vector.iter().map(|v| v / norm).collect()
    }
}

impl Embedder for HashEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.texts_embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|text| Self::vector_for(text)).collect())
    }
}

/// Chat model standing in for both the verifier and the advisor.
///
/// The verifier reply marks questions mentioning any `off_topic` word as irrelevant.
/// The advisor reply cites the first source named in its prompt.
pub struct ScriptedChatModel {
    verifier_model: String,
    off_topic: Vec<String>,
    verifier_override: Option<String>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedChatModel {
    pub fn new(config: &Config) -> Self {
        Self {
            verifier_model: config.models.verifier_model.clone(),
            off_topic: ["pizza", "topping", "recipe"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            verifier_override: None,
            prompts: Mutex::default(),
        }
    }

    /// Reply to every verifier prompt with `reply` instead of a JSON verdict
    pub fn with_verifier_reply(mut self, reply: &str) -> Self {
        self.verifier_override = Some(reply.to_string());
        self
    }

    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().expect("lock should not be poisoned").clone()
    }

    fn verdict(&self, prompt: &str) -> String {
        if let Some(reply) = &self.verifier_override {
            return reply.clone();
        }
        let question = prompt
            .rsplit("Question:")
            .next()
            .unwrap_or_default()
            .to_lowercase();
        let relevant = !self.off_topic.iter().any(|word| question.contains(word));
        format!("```json\n{{\"is_relevant\": {relevant}}}\n```")
    }

    fn answer(prompt: &str) -> String {
        let cited = prompt
            .lines()
            .find_map(|line| line.split("] Source: ").nth(1))
            .and_then(|rest| rest.split(" (Jurisdiction").next());

        match cited {
            Some(source) => format!(
                "Several obligations apply to this situation [Source: {source}]."
            ),
            None => "No specific law in the available documents applies to this question."
                .to_string(),
        }
    }
}

impl ChatModel for ScriptedChatModel {
    fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .expect("lock should not be poisoned")
            .push((model.to_string(), prompt.to_string()));

        if model == self.verifier_model {
            Ok(self.verdict(prompt))
        } else {
            Ok(Self::answer(prompt))
        }
    }
}

/// Write a small corpus covering every jurisdiction folder plus an unmapped one
pub fn write_corpus(root: &Path) {
    let documents = [
        (
            "federal",
            "accessible_canada_act.txt",
            "Accessible Canada Act\n\n\
             The Act applies to federally regulated businesses such as banks, \
             telecommunications companies and interprovincial transportation. \
             Federally regulated entities must publish accessibility plans, \
             establish feedback processes and prepare progress reports.",
        ),
        (
            "ontario",
            "aoda.txt",
            "Accessibility for Ontarians with Disabilities Act\n\n\
             Every provider of goods or services in Ontario with one or more \
             employees must comply with AODA standards and file compliance reports.",
        ),
        (
            "wcag",
            "wcag_21.txt",
            "Web Content Accessibility Guidelines 2.1\n\n\
             Success criterion 1.4.3 requires text contrast of at least 4.5 to 1. \
             WCAG 2.1 adds criteria for mobile devices and low vision users.",
        ),
        (
            "archive",
            "notes.txt",
            "Historical notes about older accessibility guidance.",
        ),
    ];

    for (folder, file, content) in documents {
        let dir = root.join("docs").join(folder);
        fs::create_dir_all(&dir).expect("should create docs folder");
        fs::write(dir.join(file), content).expect("should write document");
    }
}

/// Configuration rooted at `root` with small batches so builds make several embedding calls
pub fn test_config(root: &Path) -> Config {
    let mut config = Config {
        base_dir: root.to_path_buf(),
        ..Config::default()
    };
    config.provider.embedding_batch_size = 2;
    config.chunking.chunk_size = 200;
    config.chunking.chunk_overlap = 40;
    config
}
