//! Base-model normalisation: declared `baseModel` string → canonical key.
//!
//! Lookup is exact first, then a two-way substring test over the alias
//! table in definition order. Misses never fail; they degrade to
//! [`BaseModelKey::Unknown`] with a warning.

use std::fmt;

/// Closed vocabulary of architecture families the router understands.
///
/// The string forms are the catalog's own spellings, lower-cased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseModelKey {
    FluxDev,
    FluxSchnell,
    /// A FLUX model whose variant could not be pinned down.
    Flux,
    IllustriousXl,
    Pony,
    Sdxl,
    SdxlTurbo,
    Sd15,
    Sd21,
    HunyuanDit,
    HunyuanVideo,
    Kolors,
    LuminaT2x,
    Mochi,
    LtxVideo,
    CogVideoX2b,
    CogVideoX5b,
    NoobAiXl,
    Unknown,
}

impl BaseModelKey {
    pub const ALL: [BaseModelKey; 19] = [
        Self::FluxDev,
        Self::FluxSchnell,
        Self::Flux,
        Self::IllustriousXl,
        Self::Pony,
        Self::Sdxl,
        Self::SdxlTurbo,
        Self::Sd15,
        Self::Sd21,
        Self::HunyuanDit,
        Self::HunyuanVideo,
        Self::Kolors,
        Self::LuminaT2x,
        Self::Mochi,
        Self::LtxVideo,
        Self::CogVideoX2b,
        Self::CogVideoX5b,
        Self::NoobAiXl,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FluxDev => "flux.1 [dev]",
            Self::FluxSchnell => "flux.1 [schnell]",
            Self::Flux => "flux",
            Self::IllustriousXl => "illustrious xl v0.1",
            Self::Pony => "pony",
            Self::Sdxl => "sdxl 1.0",
            Self::SdxlTurbo => "sdxl turbo",
            Self::Sd15 => "sd 1.5",
            Self::Sd21 => "sd 2.1",
            Self::HunyuanDit => "hunyuan-dit",
            Self::HunyuanVideo => "hunyuan video",
            Self::Kolors => "kolors",
            Self::LuminaT2x => "lumina-t2x",
            Self::Mochi => "mochi",
            Self::LtxVideo => "ltx-video",
            Self::CogVideoX2b => "cogvideox-2b",
            Self::CogVideoX5b => "cogvideox-5b",
            Self::NoobAiXl => "noobai xl",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`as_str`](Self::as_str).
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == key)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for BaseModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alias table, lower-case. Order matters for the substring pass.
static BASE_MODEL_ALIASES: &[(&str, BaseModelKey)] = &[
    // FLUX
    ("flux.1 [dev]", BaseModelKey::FluxDev),
    ("flux.1 [schnell]", BaseModelKey::FluxSchnell),
    ("flux1dev", BaseModelKey::FluxDev),
    ("flux1schnell", BaseModelKey::FluxSchnell),
    ("flux dev", BaseModelKey::FluxDev),
    ("flux schnell", BaseModelKey::FluxSchnell),
    ("flux.1 d", BaseModelKey::FluxDev),
    ("flux.1 s", BaseModelKey::FluxSchnell),
    // SDXL family
    ("sdxl 1.0", BaseModelKey::Sdxl),
    ("sdxl", BaseModelKey::Sdxl),
    ("sdxl turbo", BaseModelKey::SdxlTurbo),
    ("illustrious xl v0.1", BaseModelKey::IllustriousXl),
    ("illustrious", BaseModelKey::IllustriousXl),
    ("pony", BaseModelKey::Pony),
    ("pony diffusion xl", BaseModelKey::Pony),
    // SD 1.x / 2.x
    ("sd 1.5", BaseModelKey::Sd15),
    ("sd1.5", BaseModelKey::Sd15),
    ("stable diffusion 1.5", BaseModelKey::Sd15),
    ("sd 2.1", BaseModelKey::Sd21),
    ("sd2.1", BaseModelKey::Sd21),
    // Others
    ("hunyuan-dit", BaseModelKey::HunyuanDit),
    ("hunyuan 1", BaseModelKey::HunyuanDit),
    ("hunyuan video", BaseModelKey::HunyuanVideo),
    ("kolors", BaseModelKey::Kolors),
    ("lumina-t2x", BaseModelKey::LuminaT2x),
    ("mochi", BaseModelKey::Mochi),
    ("ltx-video", BaseModelKey::LtxVideo),
    ("ltxv", BaseModelKey::LtxVideo),
    ("cogvideox-2b", BaseModelKey::CogVideoX2b),
    ("cogvideox-5b", BaseModelKey::CogVideoX5b),
    ("noobai xl", BaseModelKey::NoobAiXl),
];

/// The alias table, in lookup order.
pub fn aliases() -> &'static [(&'static str, BaseModelKey)] {
    BASE_MODEL_ALIASES
}

/// Map a declared base-model string to its canonical key.
pub fn normalize(declared: &str) -> BaseModelKey {
    let needle = declared.trim().to_lowercase();

    if needle.is_empty() {
        log::warn!("[CLASSIFY] No baseModel declared, using 'unknown'");
        return BaseModelKey::Unknown;
    }

    if let Some((_, key)) = BASE_MODEL_ALIASES.iter().find(|(alias, _)| *alias == needle) {
        return *key;
    }

    for (alias, key) in BASE_MODEL_ALIASES {
        if needle.contains(alias) || alias.contains(needle.as_str()) {
            log::info!(
                "[CLASSIFY] Matched '{}' to '{}' via partial match on '{}'",
                needle,
                key,
                alias
            );
            return *key;
        }
    }

    log::warn!("[CLASSIFY] Unknown base model '{}', using 'unknown'", needle);
    BaseModelKey::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_alias_maps_exactly() {
        for (alias, key) in aliases() {
            assert_eq!(normalize(alias), *key, "alias '{}'", alias);
        }
    }

    #[test]
    fn exact_match_beats_earlier_partial_match() {
        // "sdxl" would partially match "sdxl turbo", but the exact entry wins.
        assert_eq!(normalize("SDXL Turbo"), BaseModelKey::SdxlTurbo);
        assert_eq!(normalize("Pony Diffusion XL"), BaseModelKey::Pony);
    }

    #[test]
    fn case_and_whitespace_are_ignored() {
        assert_eq!(normalize("  SDXL 1.0  "), BaseModelKey::Sdxl);
        assert_eq!(normalize("Flux.1 [Dev]"), BaseModelKey::FluxDev);
        assert_eq!(normalize("\tIllustrious\n"), BaseModelKey::IllustriousXl);
    }

    #[test]
    fn partial_match_in_both_directions() {
        // input contains alias
        assert_eq!(normalize("SDXL Lightning"), BaseModelKey::Sdxl);
        assert_eq!(normalize("SD 1.5 LCM"), BaseModelKey::Sd15);
        // alias contains input
        assert_eq!(normalize("NoobAI"), BaseModelKey::NoobAiXl);
        assert_eq!(normalize("Lumina"), BaseModelKey::LuminaT2x);
    }

    #[test]
    fn catalog_short_flux_spellings() {
        assert_eq!(normalize("Flux.1 D"), BaseModelKey::FluxDev);
        assert_eq!(normalize("Flux.1 S"), BaseModelKey::FluxSchnell);
    }

    #[test]
    fn empty_or_whitespace_is_unknown() {
        assert_eq!(normalize(""), BaseModelKey::Unknown);
        assert_eq!(normalize("   \t"), BaseModelKey::Unknown);
    }

    #[test]
    fn unrecognised_is_unknown() {
        assert_eq!(normalize("Aura Flow"), BaseModelKey::Unknown);
        assert_eq!(normalize("SD 1.4"), BaseModelKey::Unknown);
    }

    #[test]
    fn key_strings_round_trip() {
        for key in BaseModelKey::ALL {
            assert_eq!(BaseModelKey::from_key(key.as_str()), Some(key));
        }
        assert_eq!(BaseModelKey::from_key("sd 3"), None);
    }
}
