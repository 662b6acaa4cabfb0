
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, warn};

use crate::documents::{Document, DocumentMetadata};

/// Separators tried in order, from paragraph breaks down to a hard character cut
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// A bounded excerpt of a document, the unit that gets embedded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    pub metadata: DocumentMetadata,
    /// Position of this chunk within its document
    pub chunk_index: usize,
}

/// Configuration for content chunking, lengths in characters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length
    pub chunk_size: usize,
    /// Maximum amount of text carried over from one chunk into the next
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Split every document into chunks that inherit its metadata
#[inline]
pub fn split_documents(documents: &[Document], config: &ChunkingConfig) -> Vec<Chunk> {
    let chunks: Vec<Chunk> = documents
        .iter()
        .flat_map(|document| {
            split_text(&document.content, config)
                .into_iter()
                .enumerate()
                .map(|(chunk_index, content)| Chunk {
                    content,
                    metadata: document.metadata.clone(),
                    chunk_index,
                })
        })
        .collect();

    debug!(
        "Split {} documents into {} chunks (avg {} chars)",
        documents.len(),
        chunks.len(),
        chunks
            .iter()
            .map(|c| char_len(&c.content))
            .sum::<usize>()
            / chunks.len().max(1)
    );

    chunks
}

/// Split text at the coarsest natural boundary that keeps pieces within `chunk_size`.
///
/// Adjacent chunks share up to `chunk_overlap` characters of trailing context.
#[inline]
pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    if config.chunk_size == 0 {
        return Vec::new();
    }
    split_recursive(text, &SEPARATORS, config)
}

fn split_recursive(text: &str, separators: &[&str], config: &ChunkingConfig) -> Vec<String> {
    // Pick the first separator present in the text; "" always matches
    let (position, separator) = separators
        .iter()
        .enumerate()
        .find(|(_, sep)| sep.is_empty() || text.contains(**sep))
        .map_or((separators.len(), ""), |(i, sep)| (i, *sep));
    let finer = separators.get(position + 1..).unwrap_or_default();

    let pieces: Vec<String> = if separator.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(separator)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect()
    };

    let mut chunks = Vec::new();
    let mut fitting = Vec::new();

    for piece in pieces {
        if char_len(&piece) < config.chunk_size {
            fitting.push(piece);
            continue;
        }

        if !fitting.is_empty() {
            chunks.extend(merge_pieces(&fitting, separator, config));
            fitting.clear();
        }

        if finer.is_empty() {
            chunks.push(piece);
        } else {
            chunks.extend(split_recursive(&piece, finer, config));
        }
    }

    if !fitting.is_empty() {
        chunks.extend(merge_pieces(&fitting, separator, config));
    }

    chunks
}

/// Greedily join pieces into windows no longer than `chunk_size`, keeping
/// at most `chunk_overlap` characters of the previous window as the start of the next.
fn merge_pieces(pieces: &[String], separator: &str, config: &ChunkingConfig) -> Vec<String> {
    let separator_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut window: VecDeque<(&str, usize)> = VecDeque::new();
    let mut total = 0;

    for piece in pieces {
        let piece_len = char_len(piece);
        let joined_len = |window_len: usize| if window_len > 0 { separator_len } else { 0 };

        if total + piece_len + joined_len(window.len()) > config.chunk_size {
            if total > config.chunk_size {
                warn!(
                    "Created a chunk of {} chars, longer than the configured {}",
                    total, config.chunk_size
                );
            }

            if !window.is_empty() {
                push_window(&mut chunks, &window, separator);

                while total > config.chunk_overlap
                    || (total > 0
                        && total + piece_len + joined_len(window.len()) > config.chunk_size)
                {
                    let Some((_, front_len)) = window.pop_front() else {
                        break;
                    };
                    total -= front_len + if window.is_empty() { 0 } else { separator_len };
                }
            }
        }

        total += piece_len + joined_len(window.len());
        window.push_back((piece.as_str(), piece_len));
    }

    push_window(&mut chunks, &window, separator);
    chunks
}

fn push_window(chunks: &mut Vec<String>, window: &VecDeque<(&str, usize)>, separator: &str) {
    let joined = window.iter().map(|(piece, _)| *piece).join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

#[inline]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
