//! Static route table: (model type, base-model key) → library subdirectory.
//!
//! Every routable model type has an `unknown` entry so a classification
//! miss still lands in a type-specific `Other/` folder.

use crate::classify::BaseModelKey;
use BaseModelKey::*;

/// One row of the route table.
#[derive(Debug, Clone, Copy)]
pub struct RouteEntry {
    /// Lower-case model type, as produced by `ModelType::route_key`.
    pub model_type: &'static str,
    pub base: BaseModelKey,
    pub path: &'static str,
}

const fn r(model_type: &'static str, base: BaseModelKey, path: &'static str) -> RouteEntry {
    RouteEntry {
        model_type,
        base,
        path,
    }
}

const CKPT: &str = "checkpoint";
const MERGE: &str = "checkpoint merge";
const LORA: &str = "lora";
const TI: &str = "textualinversion";
const HYPER: &str = "hypernetwork";
const CNET: &str = "controlnet";

static ROUTES: &[RouteEntry] = &[
    // FLUX.1 [dev]
    r(CKPT, FluxDev, "FLUX/FLUX.1-Dev/Checkpoint"),
    r(MERGE, FluxDev, "FLUX/FLUX.1-Dev/Checkpoint"),
    r(LORA, FluxDev, "FLUX/FLUX.1-Dev/Lora"),
    r(TI, FluxDev, "FLUX/FLUX.1-Dev/Embeddings"),
    r(CNET, FluxDev, "FLUX/FLUX.1-Dev/ControlNet"),
    // FLUX.1 [schnell]
    r(CKPT, FluxSchnell, "FLUX/FLUX.1-Schnell/Checkpoint"),
    r(MERGE, FluxSchnell, "FLUX/FLUX.1-Schnell/Checkpoint"),
    r(LORA, FluxSchnell, "FLUX/FLUX.1-Schnell/Lora"),
    r(TI, FluxSchnell, "FLUX/FLUX.1-Schnell/Embeddings"),
    r(CNET, FluxSchnell, "FLUX/FLUX.1-Schnell/ControlNet"),
    // FLUX, variant unknown
    r(CKPT, Flux, "FLUX/General/Checkpoint"),
    r(MERGE, Flux, "FLUX/General/Checkpoint"),
    r(LORA, Flux, "FLUX/General/Lora"),
    r(TI, Flux, "FLUX/General/Embeddings"),
    r(CNET, Flux, "FLUX/General/ControlNet"),
    // Illustrious XL
    r(CKPT, IllustriousXl, "SDXL/Illustrious/Checkpoint"),
    r(MERGE, IllustriousXl, "SDXL/Illustrious/Checkpoint"),
    r(LORA, IllustriousXl, "SDXL/Illustrious/Lora"),
    r(TI, IllustriousXl, "SDXL/Illustrious/Embeddings"),
    r(CNET, IllustriousXl, "SDXL/Illustrious/ControlNet"),
    // Pony Diffusion XL
    r(CKPT, Pony, "SDXL/Pony/Checkpoint"),
    r(MERGE, Pony, "SDXL/Pony/Checkpoint"),
    r(LORA, Pony, "SDXL/Pony/Lora"),
    r(TI, Pony, "SDXL/Pony/Embeddings"),
    r(CNET, Pony, "SDXL/Pony/ControlNet"),
    // SDXL 1.0
    r(CKPT, Sdxl, "SDXL/Base/Checkpoint"),
    r(MERGE, Sdxl, "SDXL/Base/Checkpoint"),
    r(LORA, Sdxl, "SDXL/Base/Lora"),
    r(TI, Sdxl, "SDXL/Base/Embeddings"),
    r(HYPER, Sdxl, "SDXL/Base/Hypernetworks"),
    r(CNET, Sdxl, "SDXL/Base/ControlNet"),
    // SDXL Turbo
    r(CKPT, SdxlTurbo, "SDXL/Turbo/Checkpoint"),
    r(MERGE, SdxlTurbo, "SDXL/Turbo/Checkpoint"),
    r(LORA, SdxlTurbo, "SDXL/Turbo/Lora"),
    // SD 1.5
    r(CKPT, Sd15, "SD15/Checkpoint"),
    r(MERGE, Sd15, "SD15/Checkpoint"),
    r(LORA, Sd15, "SD15/Lora"),
    r(TI, Sd15, "SD15/Embeddings"),
    r(HYPER, Sd15, "SD15/Hypernetworks"),
    r(CNET, Sd15, "SD15/ControlNet"),
    // SD 2.1
    r(CKPT, Sd21, "SD21/Checkpoint"),
    r(MERGE, Sd21, "SD21/Checkpoint"),
    r(LORA, Sd21, "SD21/Lora"),
    r(TI, Sd21, "SD21/Embeddings"),
    r(CNET, Sd21, "SD21/ControlNet"),
    // Hunyuan
    r(CKPT, HunyuanDit, "Hunyuan/Hunyuan-DiT/Checkpoint"),
    r(MERGE, HunyuanDit, "Hunyuan/Hunyuan-DiT/Checkpoint"),
    r(LORA, HunyuanDit, "Hunyuan/Hunyuan-DiT/Lora"),
    r(CKPT, HunyuanVideo, "Hunyuan/Hunyuan-Video/Checkpoint"),
    r(MERGE, HunyuanVideo, "Hunyuan/Hunyuan-Video/Checkpoint"),
    r(LORA, HunyuanVideo, "Hunyuan/Hunyuan-Video/Lora"),
    // Kolors
    r(CKPT, Kolors, "Kolors/Checkpoint"),
    r(MERGE, Kolors, "Kolors/Checkpoint"),
    r(LORA, Kolors, "Kolors/Lora"),
    r(TI, Kolors, "Kolors/Embeddings"),
    r(CNET, Kolors, "Kolors/ControlNet"),
    // Lumina
    r(CKPT, LuminaT2x, "Lumina/Checkpoint"),
    r(MERGE, LuminaT2x, "Lumina/Checkpoint"),
    r(LORA, LuminaT2x, "Lumina/Lora"),
    // Mochi
    r(CKPT, Mochi, "Mochi/Checkpoint"),
    r(MERGE, Mochi, "Mochi/Checkpoint"),
    r(LORA, Mochi, "Mochi/Lora"),
    // LTX-Video
    r(CKPT, LtxVideo, "LTX-Video/Checkpoint"),
    r(MERGE, LtxVideo, "LTX-Video/Checkpoint"),
    r(LORA, LtxVideo, "LTX-Video/Lora"),
    // CogVideoX
    r(CKPT, CogVideoX2b, "CogVideoX/2B/Checkpoint"),
    r(MERGE, CogVideoX2b, "CogVideoX/2B/Checkpoint"),
    r(LORA, CogVideoX2b, "CogVideoX/2B/Lora"),
    r(CKPT, CogVideoX5b, "CogVideoX/5B/Checkpoint"),
    r(MERGE, CogVideoX5b, "CogVideoX/5B/Checkpoint"),
    r(LORA, CogVideoX5b, "CogVideoX/5B/Lora"),
    // NoobAI XL
    r(CKPT, NoobAiXl, "NoobAI/XL/Checkpoint"),
    r(MERGE, NoobAiXl, "NoobAI/XL/Checkpoint"),
    r(LORA, NoobAiXl, "NoobAI/XL/Lora"),
    r(TI, NoobAiXl, "NoobAI/XL/Embeddings"),
    // Unknown base model
    r(CKPT, Unknown, "Other/Checkpoint"),
    r(MERGE, Unknown, "Other/Checkpoint"),
    r(LORA, Unknown, "Other/Lora"),
    r(TI, Unknown, "Other/Embeddings"),
    r(HYPER, Unknown, "Other/Hypernetworks"),
    r(CNET, Unknown, "Other/ControlNet"),
];

/// All route entries, in definition order.
pub fn routes() -> &'static [RouteEntry] {
    ROUTES
}

/// Exact lookup, no fallback.
pub fn find_route(model_type: &str, base: BaseModelKey) -> Option<&'static RouteEntry> {
    ROUTES
        .iter()
        .find(|e| e.model_type == model_type && e.base == base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn no_duplicate_keys() {
        let mut seen = HashSet::new();
        for e in routes() {
            assert!(
                seen.insert((e.model_type, e.base)),
                "duplicate route for ({}, {})",
                e.model_type,
                e.base
            );
        }
    }

    #[test]
    fn every_type_has_unknown_fallback() {
        let types: HashSet<&str> = routes().iter().map(|e| e.model_type).collect();
        for t in types {
            assert!(find_route(t, Unknown).is_some(), "missing unknown route for {}", t);
        }
    }

    #[test]
    fn paths_are_relative() {
        for e in routes() {
            assert!(!e.path.starts_with('/'), "{}", e.path);
            assert!(!e.path.contains(".."), "{}", e.path);
        }
    }
}
