// Rhyme suggestions - the only remote call in the app
// Providers never fail outward: anything that goes wrong comes back as empty lists

pub mod gemini; // Gemini generateContent client

pub use gemini::GeminiClient;

use futures::future::BoxFuture;
use serde::{Deserialize, Deserializer, Serialize};

/// What a provider hands back for one word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RhymeSet {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub perfect: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phonetic: Vec<String>,
}

impl RhymeSet {
    pub fn is_empty(&self) -> bool {
        self.perfect.is_empty() && self.phonetic.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Internal failure reasons. These stop at the provider boundary and are only logged.
#[derive(Debug, thiserror::Error)]
pub enum RhymeError {
    #[error("no API key set (looked in ${0})")]
    MissingApiKey(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider answered with HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("provider response contained no text")]
    EmptyResponse,
    #[error("could not parse provider JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Something that can suggest rhymes for a word.
///
/// Implementations must absorb every failure and return an empty `RhymeSet`
/// instead; callers have no error state to show.
pub trait RhymeProvider: Send + Sync {
    fn fetch_rhymes<'a>(&'a self, word: &'a str) -> BoxFuture<'a, RhymeSet>;
}

/// Single letters (or nothing at all) are not worth a request.
pub fn is_queryable(word: &str) -> bool {
    word.trim().chars().count() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rhyme_set_tolerates_missing_and_null_fields() {
        let set: RhymeSet = serde_json::from_str(r#"{"perfect": ["amor", "flor"]}"#).unwrap();
        assert_eq!(set.perfect, vec!["amor", "flor"]);
        assert!(set.phonetic.is_empty());

        let set: RhymeSet = serde_json::from_str(r#"{"perfect": null, "phonetic": ["dor"]}"#).unwrap();
        assert!(set.perfect.is_empty());
        assert_eq!(set.phonetic, vec!["dor"]);
    }

    #[test]
    fn test_is_queryable() {
        assert!(!is_queryable(""));
        assert!(!is_queryable(" a "));
        assert!(is_queryable("ai"));
        assert!(is_queryable("mão"));
    }
}
