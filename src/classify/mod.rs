//! Classification domain: decides which architecture family a model
//! belongs to.
//!
//! Two policies share one output vocabulary ([`BaseModelKey`]):
//! - `BaseModelField` normalises the version's declared `baseModel`
//!   (authoritative, used by the pipeline by default).
//! - `FreeText` scans names, description and tags for keywords
//!   (kept for the older entry point).

mod base_model;
mod keywords;

pub use base_model::{aliases, normalize, BaseModelKey};
pub use keywords::{combined_text, detect};

use crate::catalog::{ModelRecord, VersionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassificationPolicy {
    #[default]
    BaseModelField,
    FreeText,
}

impl ClassificationPolicy {
    pub fn classify(&self, model: &ModelRecord, version: &VersionRecord) -> BaseModelKey {
        match self {
            Self::BaseModelField => normalize(&version.base_model),
            Self::FreeText => detect(model, version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn policies_can_disagree() {
        let model = ModelRecord::from_value(json!({
            "name": "Pony Style",
            "type": "LORA"
        }))
        .unwrap();
        let version = VersionRecord::from_value(json!({
            "id": 2,
            "baseModel": "SDXL 1.0"
        }))
        .unwrap();

        assert_eq!(
            ClassificationPolicy::BaseModelField.classify(&model, &version),
            BaseModelKey::Sdxl
        );
        assert_eq!(
            ClassificationPolicy::FreeText.classify(&model, &version),
            BaseModelKey::Pony
        );
    }

    #[test]
    fn default_policy_is_base_model_field() {
        assert_eq!(
            ClassificationPolicy::default(),
            ClassificationPolicy::BaseModelField
        );
    }
}
