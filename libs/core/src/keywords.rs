use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Phrases that trigger one intent. Matching is case-insensitive: `contains`
/// phrases may appear anywhere in the text, `exact` phrases must be the
/// whole text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSet {
    #[serde(default)]
    pub contains: Vec<String>,
    #[serde(default)]
    pub exact: Vec<String>,
}

impl KeywordSet {
    pub fn new<C, E>(contains: C, exact: E) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            contains: contains.into_iter().map(Into::into).collect(),
            exact: exact.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        let lower = text.trim().to_lowercase();
        self.exact.iter().any(|phrase| lower == phrase.to_lowercase())
            || self
                .contains
                .iter()
                .any(|phrase| lower.contains(&phrase.to_lowercase()))
    }
}

/// Keyword tables used to classify free text. Missing sets in a JSON
/// override fall back to the built-in Mongolian phrases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub tracking: KeywordSet,
    pub address: KeywordSet,
    pub contact: KeywordSet,
    pub origin: KeywordSet,
    pub info: KeywordSet,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            tracking: KeywordSet::new(["бараа шалгах", "ачаагаа шалгах"], ["бараа"]),
            address: KeywordSet::new(["хаяг", "байршил", "танай хаяг"], None::<String>),
            contact: KeywordSet::new(
                ["утас", "холбогдох дугаар", "дугаар"],
                None::<String>,
            ),
            origin: KeywordSet::new(
                ["хятадаас бараа татдаг", "хятадаас ирдэг", "хятад ачаа"],
                None::<String>,
            ),
            info: KeywordSet::new(["мэдээлэл", "танайх"], None::<String>),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeywordError {
    #[error("failed to read keyword file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid keyword file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl KeywordConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, KeywordError> {
        let raw = std::fs::read_to_string(path).map_err(|source| KeywordError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| KeywordError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_matches_phrase_or_exact_word() {
        let cfg = KeywordConfig::default();
        assert!(cfg.tracking.matches("Сайн уу, БАРАА ШАЛГАХ"));
        assert!(cfg.tracking.matches("бараа"));
        assert!(!cfg.tracking.matches("бараа авмаар байна"));
        assert!(!cfg.tracking.matches("12345"));
    }

    #[test]
    fn info_sets_match_substrings() {
        let cfg = KeywordConfig::default();
        assert!(cfg.address.matches("Танай хаяг хаана вэ?"));
        assert!(cfg.contact.matches("утасны дугаар өгөөч"));
        assert!(cfg.origin.matches("Та нар хятадаас бараа татдаг уу"));
        assert!(cfg.info.matches("мэдээлэл"));
        assert!(!cfg.info.matches("hello"));
    }

    #[test]
    fn json_override_keeps_missing_sets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.json");
        std::fs::write(&path, r#"{"tracking": {"contains": ["track"]}}"#).unwrap();
        let cfg = KeywordConfig::from_json_file(&path).unwrap();
        assert!(cfg.tracking.matches("please TRACK my parcel"));
        assert!(!cfg.tracking.matches("бараа"));
        assert_eq!(cfg.address, KeywordConfig::default().address);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            KeywordConfig::from_json_file(&path),
            Err(KeywordError::Parse { .. })
        ));
    }
}
