//! Text ↔ key association for one transformation run.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::config::KeyStrategy;
use crate::core::validator::TextValidator;

const HASH_KEY_PREFIX: &str = "key_";
const PATH_KEY_MAX_LEN: usize = 50;
const CUSTOM_KEY_WORDS: usize = 3;

/// Append-only registry mapping normalized text to catalog keys.
///
/// A text resolves to exactly one key for the lifetime of the registry and
/// a key is never shared by two texts.
#[derive(Debug)]
pub struct KeyRegistry {
    strategy: KeyStrategy,
    text_to_key: HashMap<String, String>,
    key_to_text: HashMap<String, String>,
    /// Keys in registration order.
    order: Vec<String>,
    duplicates: usize,
}

impl KeyRegistry {
    pub fn new(strategy: KeyStrategy) -> Self {
        Self {
            strategy,
            text_to_key: HashMap::new(),
            key_to_text: HashMap::new(),
            order: Vec::new(),
            duplicates: 0,
        }
    }

    /// Build a registry pre-loaded from an existing source catalog.
    ///
    /// Only string values that pass the validator are loaded, so keys stay
    /// stable across runs for text that has not changed.
    pub fn seeded(
        strategy: KeyStrategy,
        catalog: &Map<String, Value>,
        validator: &TextValidator,
    ) -> Self {
        let mut registry = Self::new(strategy);
        for (key, value) in catalog {
            let Some(text) = value.as_str() else {
                continue;
            };
            let text = text.trim();
            if registry.text_to_key.contains_key(text)
                || registry.key_to_text.contains_key(key)
                || !validator.is_translatable(text)
            {
                continue;
            }
            registry.insert(key.clone(), text.to_string());
        }
        registry
    }

    /// Key for `text`, registering a new one on first sight.
    pub fn resolve(&mut self, text: &str) -> String {
        let normalized = text.trim();
        if let Some(key) = self.text_to_key.get(normalized) {
            self.duplicates += 1;
            return key.clone();
        }

        let key = self.unique_key(derive_key(self.strategy, normalized));
        self.insert(key.clone(), normalized.to_string());
        key
    }

    /// Look up a key without registering anything.
    pub fn get(&self, text: &str) -> Option<&str> {
        self.text_to_key.get(text.trim()).map(String::as_str)
    }

    pub fn text_for(&self, key: &str) -> Option<&str> {
        self.key_to_text.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of `resolve` calls that hit an existing entry.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// `(key, text)` pairs in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .map(|key| (key.as_str(), self.key_to_text[key].as_str()))
    }

    fn insert(&mut self, key: String, text: String) {
        self.text_to_key.insert(text.clone(), key.clone());
        self.key_to_text.insert(key.clone(), text);
        self.order.push(key);
    }

    fn unique_key(&self, base: String) -> String {
        if !self.key_to_text.contains_key(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{}_{}", base, n))
            .find(|candidate| !self.key_to_text.contains_key(candidate))
            .unwrap_or(base)
    }
}

/// Derive a key for already-normalized text.
pub fn derive_key(strategy: KeyStrategy, text: &str) -> String {
    let key = match strategy {
        KeyStrategy::Text => return text.to_string(),
        KeyStrategy::Hash => return hash_key(text),
        KeyStrategy::Path => path_key(text),
        KeyStrategy::Custom => custom_key(text),
    };
    if key.is_empty() { hash_key(text) } else { key }
}

/// `key_` + base-36 of the absolute 32-bit `h * 31 + c` string hash.
fn hash_key(text: &str) -> String {
    let hash = text
        .encode_utf16()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(c as i32));
    format!("{}{}", HASH_KEY_PREFIX, to_base36(hash.unsigned_abs()))
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn path_key(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .take(PATH_KEY_MAX_LEN)
        .collect::<String>()
        .trim_end_matches('_')
        .to_string()
}

fn custom_key(text: &str) -> String {
    text.split_whitespace()
        .take(CUSTOM_KEY_WORDS)
        .map(|word| {
            word.to_lowercase()
                .chars()
                .filter(|c| c.is_alphabetic())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}
