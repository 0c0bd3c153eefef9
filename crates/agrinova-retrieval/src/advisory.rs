//! Advisory records and corpus loading.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::{Result, RetrievalError};

/// Maximum characters of record text returned with a hit.
pub const EXCERPT_CHARS: usize = 1000;

/// One advisory in the retrieval corpus. Immutable after load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryRecord {
    /// Stable identifier.
    pub id: String,
    /// Optional headline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Body text; this is what gets embedded.
    pub text: String,
}

impl AdvisoryRecord {
    /// Construct a record without a title.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            text: text.into(),
        }
    }

    /// Attach a title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Title or the empty string.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// The first [`EXCERPT_CHARS`] characters of the text.
    pub fn excerpt(&self) -> &str {
        truncate_chars(&self.text, EXCERPT_CHARS)
    }
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// Load the corpus from a JSON array file.
///
/// A missing file is logged and yields an empty corpus so the service still
/// starts with an empty index. Read or parse failures are errors.
pub fn load_corpus(path: &Path) -> Result<Vec<AdvisoryRecord>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!(path = %path.display(), "advisory file not found, retrieval will return no results");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(RetrievalError::CorpusRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let records: Vec<AdvisoryRecord> =
        serde_json::from_str(&content).map_err(|source| RetrievalError::CorpusParse {
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), count = records.len(), "advisories loaded");
    Ok(records)
}
