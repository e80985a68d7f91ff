use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::HairgenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKey {
    WomenOneLength,
    WomenFrenchPerm,
    WomenLayered,
    MenTextureCrop,
    MenWolfCut,
}

impl StyleKey {
    pub const ALL: [StyleKey; 5] = [
        StyleKey::WomenOneLength,
        StyleKey::WomenFrenchPerm,
        StyleKey::WomenLayered,
        StyleKey::MenTextureCrop,
        StyleKey::MenWolfCut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleKey::WomenOneLength => "women_one_length",
            StyleKey::WomenFrenchPerm => "women_french_perm",
            StyleKey::WomenLayered => "women_layered",
            StyleKey::MenTextureCrop => "men_texture_crop",
            StyleKey::MenWolfCut => "men_wolf_cut",
        }
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleKey {
    type Err = HairgenError;

    /// Exact match only: no trimming, no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StyleKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| HairgenError::UnknownStyle(s.to_string()))
    }
}

// Prompts for the currently popular cuts.
static BUILTIN_PROMPTS: Lazy<HashMap<StyleKey, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (
            StyleKey::WomenOneLength,
            "a woman with short one-length bob haircut, sharp edges, photorealistic, 8k, high quality",
        ),
        (
            StyleKey::WomenFrenchPerm,
            "a woman with french perm, wool curly hair, vintage vibes, photorealistic, 8k",
        ),
        (
            StyleKey::WomenLayered,
            "a woman with trendy layered clavicle haircut, airy texture, photorealistic, 8k",
        ),
        (
            StyleKey::MenTextureCrop,
            "a man with texture crop haircut, korean style, clean fade, photorealistic, 8k",
        ),
        (
            StyleKey::MenWolfCut,
            "a man with edgy wolf cut mullet hairstyle, punk style, photorealistic, 8k",
        ),
    ])
});

/// Read-only style → prompt table, built once at startup and shared by all requests.
#[derive(Debug, Clone)]
pub struct PromptRegistry {
    prompts: HashMap<StyleKey, String>,
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptRegistry {
    pub fn builtin() -> Self {
        Self {
            prompts: BUILTIN_PROMPTS
                .iter()
                .map(|(key, prompt)| (*key, prompt.to_string()))
                .collect(),
        }
    }

    pub fn with_prompt(mut self, key: StyleKey, prompt: impl Into<String>) -> Self {
        self.prompts.insert(key, prompt.into());
        self
    }

    pub fn get(&self, key: StyleKey) -> Option<&str> {
        self.prompts.get(&key).map(String::as_str)
    }

    /// Resolves a raw style identifier to its key and prompt; `None` when unknown.
    pub fn lookup(&self, raw_key: &str) -> Option<(StyleKey, &str)> {
        let key = raw_key.parse::<StyleKey>().ok()?;
        self.get(key).map(|prompt| (key, prompt))
    }

    pub fn keys(&self) -> impl Iterator<Item = StyleKey> + '_ {
        StyleKey::ALL
            .into_iter()
            .filter(move |key| self.prompts.contains_key(key))
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}
