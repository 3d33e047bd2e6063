//! Publisher configuration.
//!
//! One immutable value handed to the engine at construction time; nothing
//! is re-read from global state at call sites. Loading the value from a
//! file or the environment is the embedding application's job; the struct
//! only needs to deserialize from whatever layer that application uses.

use std::path::PathBuf;

use serde::Deserialize;

use crate::artifact::ArtifactKind;

const DEFAULT_DEST_ROOT: &str = "cache";
const DEFAULT_BASE_URL: &str = "/";
const DEFAULT_SECURITY_TOKEN_FIELD: &str = "SecurityID";

/// Immutable configuration for a [`FilesystemPublisher`](crate::FilesystemPublisher).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Destination root for the artifact tree.
    pub dest_root: PathBuf,
    /// Site base URL stripped from incoming URLs and re-attached on
    /// enumeration.
    pub base_url: String,
    /// Which artifacts a publish produces (`html` or `php`).
    pub artifact_kind: ArtifactKind,
    /// Partition the tree by request host so identical paths on different
    /// virtual hosts never collide.
    pub domain_based_caching: bool,
    /// Write a precompressed `.gz` sibling next to each artifact.
    pub gzip_compression: bool,
    /// Skip pages that appear to contain a live form. A heuristic, not a
    /// security control: it scans for a hidden input named
    /// `security_token_field` and accepts false negatives.
    pub lazy_form_recognition: bool,
    /// Hidden-field name the form heuristic scans for.
    pub security_token_field: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            dest_root: PathBuf::from(DEFAULT_DEST_ROOT),
            base_url: DEFAULT_BASE_URL.to_owned(),
            artifact_kind: ArtifactKind::default(),
            domain_based_caching: false,
            gzip_compression: false,
            lazy_form_recognition: false,
            security_token_field: DEFAULT_SECURITY_TOKEN_FIELD.to_owned(),
        }
    }
}

impl PublisherConfig {
    /// True when the executable PHP variant is written alongside the HTML.
    pub fn php_enabled(&self) -> bool {
        self.artifact_kind.php_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = PublisherConfig::default();
        assert_eq!(config.dest_root, PathBuf::from("cache"));
        assert_eq!(config.base_url, "/");
        assert_eq!(config.artifact_kind, ArtifactKind::Php);
        assert!(!config.domain_based_caching);
        assert!(!config.gzip_compression);
        assert!(!config.lazy_form_recognition);
        assert_eq!(config.security_token_field, "SecurityID");
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let config: PublisherConfig = serde_json::from_str(
            r#"{"dest_root": "public/cache", "artifact_kind": "html", "gzip_compression": true}"#,
        )
        .expect("partial config should deserialize");

        assert_eq!(config.dest_root, PathBuf::from("public/cache"));
        assert_eq!(config.artifact_kind, ArtifactKind::Html);
        assert!(config.gzip_compression);
        assert_eq!(config.security_token_field, "SecurityID");
    }

    #[test]
    fn php_enabled_follows_artifact_kind() {
        let config = PublisherConfig {
            artifact_kind: ArtifactKind::Html,
            ..Default::default()
        };
        assert!(!config.php_enabled());
        assert!(PublisherConfig::default().php_enabled());
    }
}
