// Document ingestion
// Loads the plain-text corpus from docs/<jurisdiction-folder>/*.txt

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{AdvisorError, Result};

/// Governing authority level a document pertains to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Jurisdiction {
    Federal,
    Provincial,
    Standards,
    Unknown,
}

impl Jurisdiction {
    /// Map a docs subdirectory name to its jurisdiction. Unlisted folders are `Unknown`.
    #[inline]
    pub fn from_folder(name: &str) -> Self {
        match name {
            "federal" => Self::Federal,
            "ontario" | "provinces" => Self::Provincial,
            "wcag" => Self::Standards,
            _ => Self::Unknown,
        }
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Federal => "federal",
            Self::Provincial => "provincial",
            Self::Standards => "standards",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a stored label back into a jurisdiction
    #[inline]
    pub fn from_label(label: &str) -> Self {
        match label {
            "federal" => Self::Federal,
            "provincial" => Self::Provincial,
            "standards" => Self::Standards,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// File name without extension, used as the citation name
    pub source: String,
    pub jurisdiction: Jurisdiction,
    /// Path relative to the project root
    pub file_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub content: String,
    pub metadata: DocumentMetadata,
}

/// Load every `.txt` file found one level below `docs_dir`.
///
/// Subdirectories and files are visited in name order. Fails with
/// [`AdvisorError::Ingestion`] when the directory is missing or yields no documents.
#[inline]
pub fn load_documents(docs_dir: &Path, project_root: &Path) -> Result<Vec<Document>> {
    if !docs_dir.is_dir() {
        return Err(AdvisorError::Ingestion(format!(
            "Documents directory not found: {}",
            docs_dir.display()
        )));
    }

    let mut documents = Vec::new();

    for subdir in sorted_entries(docs_dir)? {
        if !subdir.is_dir() {
            debug!("Skipping non-directory entry {}", subdir.display());
            continue;
        }

        let folder = subdir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let jurisdiction = Jurisdiction::from_folder(&folder);
        if jurisdiction == Jurisdiction::Unknown {
            warn!("Folder '{}' has no jurisdiction mapping, labelling documents unknown", folder);
        }

        for file in sorted_entries(&subdir)? {
            if !is_text_file(&file) {
                continue;
            }

            let content = fs::read_to_string(&file).map_err(|e| {
                AdvisorError::Ingestion(format!("Failed to read {}: {}", file.display(), e))
            })?;

            let source = file
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();

            debug!(
                "Loaded {} ({} chars, jurisdiction {})",
                file.display(),
                content.chars().count(),
                jurisdiction
            );

            documents.push(Document {
                content,
                metadata: DocumentMetadata {
                    source,
                    jurisdiction,
                    file_path: relative_path(&file, project_root),
                },
            });
        }
    }

    if documents.is_empty() {
        return Err(AdvisorError::Ingestion(format!(
            "No documents found in {}",
            docs_dir.display()
        )));
    }

    info!(
        "Loaded {} documents from {}",
        documents.len(),
        docs_dir.display()
    );
    Ok(documents)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| AdvisorError::Ingestion(format!("Failed to read {}: {}", dir.display(), e)))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

fn is_text_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "txt")
}

fn relative_path(file: &Path, project_root: &Path) -> String {
    file.strip_prefix(project_root)
        .unwrap_or(file)
        .to_string_lossy()
        .into_owned()
}
