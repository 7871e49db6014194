//! Typed views over the catalog's model and version payloads.
//!
//! The catalog returns loosely-shaped JSON. Only the fields the pipeline
//! reads are modelled here; the full raw payload is kept alongside so the
//! metadata sidecar can persist exactly what the API returned.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Declared model type, as reported by the catalog's `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelType {
    Checkpoint,
    CheckpointMerge,
    Lora,
    TextualInversion,
    Hypernetwork,
    ControlNet,
    Other(String),
}

impl ModelType {
    /// Parse the catalog spelling. Matching is case-insensitive and ignores
    /// surrounding whitespace; anything unrecognised is kept verbatim.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "checkpoint" => Self::Checkpoint,
            "checkpoint merge" => Self::CheckpointMerge,
            "lora" => Self::Lora,
            "textualinversion" => Self::TextualInversion,
            "hypernetwork" => Self::Hypernetwork,
            "controlnet" => Self::ControlNet,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    /// Lower-case key used by the directory router.
    pub fn route_key(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Checkpoint => "Checkpoint",
            Self::CheckpointMerge => "Checkpoint Merge",
            Self::Lora => "LoRA",
            Self::TextualInversion => "TextualInversion",
            Self::Hypernetwork => "Hypernetwork",
            Self::ControlNet => "ControlNet",
            Self::Other(s) => s.as_str(),
        };
        f.write_str(s)
    }
}

/// Tags arrive either as bare strings or as `{ "name": ... }` objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawTag {
    Name(String),
    Object {
        #[serde(default)]
        name: String,
    },
    Unsupported(serde::de::IgnoredAny),
}

impl RawTag {
    fn into_name(self) -> Option<String> {
        match self {
            Self::Name(name) | Self::Object { name } if !name.is_empty() => Some(name),
            _ => None,
        }
    }
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<Vec<RawTag>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(RawTag::into_name)
        .collect())
}

fn null_to_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct ModelFields {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default, deserialize_with = "null_to_default")]
    name: String,
    #[serde(default, rename = "type", deserialize_with = "null_to_default")]
    model_type: String,
    #[serde(default, deserialize_with = "null_to_default")]
    description: String,
    #[serde(default, deserialize_with = "deserialize_tags")]
    tags: Vec<String>,
}

/// One catalog entry.
#[derive(Debug, Clone)]
pub struct ModelRecord {
    pub id: Option<u64>,
    pub name: String,
    pub model_type: ModelType,
    pub description: String,
    /// Tag names, already normalised to plain strings.
    pub tags: Vec<String>,
    raw: Value,
}

impl ModelRecord {
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let fields = ModelFields::deserialize(&raw)?;
        let model_type = if fields.model_type.trim().is_empty() {
            ModelType::Other("Unknown".to_string())
        } else {
            ModelType::parse(&fields.model_type)
        };
        Ok(Self {
            id: fields.id,
            name: fields.name,
            model_type,
            description: fields.description,
            tags: fields.tags,
            raw,
        })
    }

    /// The payload exactly as the catalog returned it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Display name, falling back to `Model_{id}` when the catalog omits it.
    pub fn display_name(&self, model_id: &str) -> String {
        if self.name.trim().is_empty() {
            format!("Model_{}", model_id)
        } else {
            self.name.clone()
        }
    }

    /// Id of the first listed version, which the catalog orders newest first.
    pub fn latest_version_id(&self) -> Option<u64> {
        self.raw
            .get("modelVersions")?
            .as_array()?
            .first()?
            .get("id")?
            .as_u64()
    }
}

/// A downloadable file attached to a version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDescriptor {
    #[serde(default, rename = "type", deserialize_with = "null_to_default")]
    pub file_type: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub name: String,
    #[serde(default, rename = "downloadUrl")]
    pub download_url: Option<String>,
}

/// A preview image attached to a version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDescriptor {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersionFields {
    id: u64,
    #[serde(default, deserialize_with = "null_to_default")]
    name: String,
    #[serde(default, deserialize_with = "null_to_default")]
    description: String,
    #[serde(default, rename = "baseModel", deserialize_with = "null_to_default")]
    base_model: String,
    #[serde(default, rename = "trainedWords", deserialize_with = "null_to_default")]
    trained_words: Vec<String>,
    #[serde(default, deserialize_with = "null_to_default")]
    files: Vec<FileDescriptor>,
    #[serde(default, deserialize_with = "null_to_default")]
    images: Vec<ImageDescriptor>,
}

/// One version of a model.
#[derive(Debug, Clone)]
pub struct VersionRecord {
    pub id: u64,
    pub name: String,
    pub description: String,
    /// Declared base model, verbatim. The primary classification signal.
    pub base_model: String,
    pub trained_words: Vec<String>,
    pub files: Vec<FileDescriptor>,
    pub images: Vec<ImageDescriptor>,
    raw: Value,
}

impl VersionRecord {
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let fields = VersionFields::deserialize(&raw)?;
        Ok(Self {
            id: fields.id,
            name: fields.name,
            description: fields.description,
            base_model: fields.base_model,
            trained_words: fields.trained_words,
            files: fields.files,
            images: fields.images,
            raw,
        })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_type_parses_catalog_spellings() {
        assert_eq!(ModelType::parse("LORA"), ModelType::Lora);
        assert_eq!(ModelType::parse("Checkpoint Merge"), ModelType::CheckpointMerge);
        assert_eq!(ModelType::parse(" TextualInversion "), ModelType::TextualInversion);
        assert_eq!(
            ModelType::parse("MotionModule"),
            ModelType::Other("MotionModule".to_string())
        );
    }

    #[test]
    fn route_key_is_lowercase() {
        assert_eq!(ModelType::Lora.route_key(), "lora");
        assert_eq!(ModelType::CheckpointMerge.route_key(), "checkpoint merge");
        assert_eq!(ModelType::Other("VAE".into()).route_key(), "vae");
    }

    #[test]
    fn tags_normalize_from_strings_and_objects() {
        let model = ModelRecord::from_value(json!({
            "id": 1,
            "name": "Mixed",
            "type": "LoRA",
            "tags": ["anime", { "name": "style" }, 42]
        }))
        .unwrap();
        assert_eq!(model.tags, vec!["anime".to_string(), "style".to_string()]);
    }

    #[test]
    fn missing_model_fields_default() {
        let model = ModelRecord::from_value(json!({ "id": 5, "description": null })).unwrap();
        assert_eq!(model.model_type, ModelType::Other("Unknown".to_string()));
        assert_eq!(model.description, "");
        assert_eq!(model.display_name("5"), "Model_5");
    }

    #[test]
    fn latest_version_is_first_listed() {
        let model = ModelRecord::from_value(json!({
            "id": 1,
            "modelVersions": [{ "id": 30 }, { "id": 20 }]
        }))
        .unwrap();
        assert_eq!(model.latest_version_id(), Some(30));
    }

    #[test]
    fn version_keeps_raw_payload() {
        let raw = json!({
            "id": 9,
            "baseModel": "SDXL 1.0",
            "files": [{ "type": "Model", "name": "foo.safetensors", "downloadUrl": "https://x/f" }],
            "images": [{ "url": null }],
            "stats": { "downloadCount": 3 }
        });
        let version = VersionRecord::from_value(raw.clone()).unwrap();
        assert_eq!(version.id, 9);
        assert_eq!(version.files[0].name, "foo.safetensors");
        assert!(version.images[0].url.is_none());
        assert_eq!(version.raw(), &raw);
    }

    #[test]
    fn version_without_id_is_rejected() {
        assert!(VersionRecord::from_value(json!({ "name": "v1" })).is_err());
    }
}
