//! Model references: catalog URLs or explicit id pairs.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// `.../models/{id}` with an optional slug and an optional
/// `modelVersionId` query parameter anywhere in the query string.
static MODEL_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"models/(\d+)(?:/[^?#\s]*)?(?:\?(?:[^#\s]*&)?modelVersionId=(\d+))?").unwrap()
});

/// Extract `(model_id, version_id)` from a catalog URL.
///
/// Anything that does not look like a model URL yields `(None, None)`.
pub fn parse_model_url(url: &str) -> (Option<String>, Option<String>) {
    match MODEL_URL.captures(url) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str().to_string()),
            caps.get(2).map(|m| m.as_str().to_string()),
        ),
        None => (None, None),
    }
}

/// A resolved reference, ready for the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReference {
    pub model_id: String,
    pub version_id: Option<String>,
    pub original_url: Option<String>,
}

impl ModelReference {
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();
        match parse_model_url(url) {
            (Some(model_id), version_id) => Some(Self {
                model_id,
                version_id,
                original_url: Some(url.to_string()),
            }),
            _ => None,
        }
    }
}

/// One entry of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchItem {
    Url(String),
    Ids {
        model_id: String,
        version_id: Option<String>,
    },
}

impl BatchItem {
    /// `None` when the item does not name a model.
    pub fn resolve(&self) -> Option<ModelReference> {
        match self {
            Self::Url(url) => ModelReference::parse(url),
            Self::Ids {
                model_id,
                version_id,
            } => {
                let model_id = model_id.trim();
                if model_id.is_empty() {
                    return None;
                }
                Some(ModelReference {
                    model_id: model_id.to_string(),
                    version_id: version_id
                        .as_deref()
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(str::to_string),
                    original_url: None,
                })
            }
        }
    }
}

impl fmt::Display for BatchItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Ids {
                model_id,
                version_id: Some(v),
            } => write!(f, "({}, {})", model_id, v),
            Self::Ids { model_id, .. } => write!(f, "({}, latest)", model_id),
        }
    }
}

impl From<&str> for BatchItem {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for BatchItem {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}
