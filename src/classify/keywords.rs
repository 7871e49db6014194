//! Free-text keyword scan: the older classification policy.
//!
//! Looks for architecture keywords in the model name, version name,
//! description and tags, most specific variant first. Only when no keyword
//! fires does it fall back to substring tests on the declared base model.
//! Findings are reported in the same canonical vocabulary as the primary
//! path; families the router has no home for degrade to `Unknown`.

use super::base_model::BaseModelKey;
use crate::catalog::{ModelRecord, VersionRecord};

enum Family {
    Key(BaseModelKey),
    /// Recognised, but without a canonical key. Stops the scan.
    Unrouted(&'static str),
}

/// Ordered keyword groups. The first group with any hit wins.
static KEYWORD_GROUPS: &[(&[&str], Family)] = &[
    (
        &["flux.1-s", "flux 1 s", "flux1s", "flux.1 s"],
        Family::Key(BaseModelKey::FluxSchnell),
    ),
    (
        &["flux.1-dev", "flux.1-d", "flux 1 dev", "flux 1 d", "flux1d", "flux.1 dev", "flux.1 d"],
        Family::Key(BaseModelKey::FluxDev),
    ),
    (&["flux", "flux.1", "flux1"], Family::Key(BaseModelKey::Flux)),
    (
        &["hunyuan video", "hunyuan-video", "hunyuanvideo"],
        Family::Key(BaseModelKey::HunyuanVideo),
    ),
    (
        &["hunyuan", "hunyuan-1", "hunyuan 1"],
        Family::Key(BaseModelKey::HunyuanDit),
    ),
    (
        &[
            "wan video 14b i2v 720p",
            "wan-video-14b-i2v-720p",
            "wanvideo14bi2v720p",
            "wan video 14b i2v 480p",
            "wan-video-14b-i2v-480p",
            "wanvideo14bi2v480p",
            "wan video 14b t2v",
            "wan-video-14b-t2v",
            "wanvideo14bt2v",
            "wan video 1.3b t2v",
            "wan-video-1.3b-t2v",
            "wanvideo1.3bt2v",
            "wan video 1_3b t2v",
        ],
        Family::Unrouted("wan video"),
    ),
    (&["lumina", "lumina-t2x"], Family::Key(BaseModelKey::LuminaT2x)),
    (&["kolors", "kwai-kolors"], Family::Key(BaseModelKey::Kolors)),
    (&["mochi", "mochi-1"], Family::Key(BaseModelKey::Mochi)),
    (
        &["ltx-video", "ltxv", "ltx video", "lightricks"],
        Family::Key(BaseModelKey::LtxVideo),
    ),
    (
        &["cogvideox-5b", "cogvideox 5b", "cogvideox5b"],
        Family::Key(BaseModelKey::CogVideoX5b),
    ),
    (
        &["cogvideox-2b", "cogvideox 2b", "cogvideox2b"],
        Family::Key(BaseModelKey::CogVideoX2b),
    ),
    (
        &["cogvideox", "cog-videox", "cog videox"],
        Family::Unrouted("cogvideox"),
    ),
    (&["noobai", "noob-ai", "noob ai"], Family::Key(BaseModelKey::NoobAiXl)),
    (&["illustrious", "illust"], Family::Key(BaseModelKey::IllustriousXl)),
    (&["pony", "ponyxl", "pony diffusion"], Family::Key(BaseModelKey::Pony)),
    (&["sdxl turbo", "sdxl-turbo"], Family::Key(BaseModelKey::SdxlTurbo)),
    (&["sdxl", "xl", "stable diffusion xl"], Family::Key(BaseModelKey::Sdxl)),
    (
        &["sd15", "sd 1.5", "stable diffusion 1.5", "v1-5"],
        Family::Key(BaseModelKey::Sd15),
    ),
    (
        &["sd21", "sd 2.1", "stable diffusion 2.1", "v2-1"],
        Family::Key(BaseModelKey::Sd21),
    ),
];

/// Lower-cased concatenation of every free-text field.
pub fn combined_text(model: &ModelRecord, version: &VersionRecord) -> String {
    let mut parts = vec![
        model.name.to_lowercase(),
        version.name.to_lowercase(),
        model.description.to_lowercase(),
    ];
    parts.extend(model.tags.iter().map(|t| t.to_lowercase()));
    parts.join(" ")
}

/// Classify by keyword scan, then by the declared base model.
pub fn detect(model: &ModelRecord, version: &VersionRecord) -> BaseModelKey {
    let text = combined_text(model, version);

    for (keywords, family) in KEYWORD_GROUPS {
        if keywords.iter().any(|kw| text.contains(kw)) {
            return match family {
                Family::Key(key) => *key,
                Family::Unrouted(name) => {
                    log::warn!(
                        "[CLASSIFY] '{}' looks like {}, which has no library folder, using 'unknown'",
                        model.name,
                        name
                    );
                    BaseModelKey::Unknown
                }
            };
        }
    }

    if let Some(key) = from_declared_base(&version.base_model, &text) {
        return key;
    }

    log::warn!(
        "[CLASSIFY] Could not detect base model for '{}', using 'unknown'",
        model.name
    );
    BaseModelKey::Unknown
}

fn from_declared_base(declared: &str, text: &str) -> Option<BaseModelKey> {
    let base = declared.trim().to_lowercase();
    if base.is_empty() {
        return None;
    }

    let key = if base.contains("flux") {
        if base.contains("dev") || base.contains("1-d") || base.ends_with(" d") {
            BaseModelKey::FluxDev
        } else if base.contains("schnell") || base.contains("1-s") || base.ends_with(" s") {
            BaseModelKey::FluxSchnell
        } else {
            BaseModelKey::Flux
        }
    } else if base.contains("hunyuan") {
        if base.contains("video") {
            BaseModelKey::HunyuanVideo
        } else {
            BaseModelKey::HunyuanDit
        }
    } else if base.contains("sdxl") || base.contains("xl") {
        if text.contains("illustrious") || base.contains("illustrious") {
            BaseModelKey::IllustriousXl
        } else if text.contains("pony") || base.contains("pony") {
            BaseModelKey::Pony
        } else if base.contains("turbo") {
            BaseModelKey::SdxlTurbo
        } else {
            BaseModelKey::Sdxl
        }
    } else if base.contains("sd 1.5") || base.contains("v1-5") {
        BaseModelKey::Sd15
    } else if base.contains("sd 2.1") || base.contains("v2-1") {
        BaseModelKey::Sd21
    } else if base.contains("lumina") {
        BaseModelKey::LuminaT2x
    } else if base.contains("kolors") {
        BaseModelKey::Kolors
    } else if base.contains("mochi") {
        BaseModelKey::Mochi
    } else if base.contains("ltx") {
        BaseModelKey::LtxVideo
    } else if base.contains("noob") {
        BaseModelKey::NoobAiXl
    } else if base.contains("pony") {
        BaseModelKey::Pony
    } else if base.contains("illustrious") {
        BaseModelKey::IllustriousXl
    } else {
        return None;
    };

    Some(key)
}
