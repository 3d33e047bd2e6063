//! The cache engine: publish policy, purge and enumeration.
//!
//! `FilesystemPublisher` is handed one URL and one already-rendered
//! response at a time and makes a local, self-contained decision about
//! persisting it. Every documented failure path is reported through the
//! outcome records below; callers never see a panic for bad input or a
//! failed write.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::artifact::{self, HTML_EXTENSION, PHP_EXTENSION};
use crate::compress::compress_artifact;
use crate::config::PublisherConfig;
use crate::paths::{path_to_url, url_to_path};
use crate::response::RenderedResponse;
use crate::store::ArtifactStore;

/// Lifecycle operations over the published snapshot set.
///
/// The engine behind this trait owns no state beyond its configuration:
/// the destination tree on disk is the index, and every call re-reads it
/// as ground truth.
pub trait StaticPublisher {
    /// Apply the publish policy to a rendered response and persist the
    /// resulting artifacts.
    fn publish_url(
        &self,
        url: &str,
        response: &RenderedResponse,
        force_publish: bool,
    ) -> PublishOutcome;

    /// Remove every artifact published for a URL.
    fn purge_url(&self, url: &str) -> PurgeOutcome;

    /// Remove the entire destination tree.
    fn purge_all(&self) -> bool;

    /// Every URL with a published artifact, in directory traversal order.
    fn published_urls(&self) -> Vec<String>;
}

/// Result of a publish call.
///
/// `published` reports what the policy decided; `success` reports whether
/// the write completed. A 404 without force-publish yields
/// `published: false`, while a failed disk write for a 200 yields
/// `published: true, success: false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    pub published: bool,
    pub success: bool,
    pub status_code: u16,
    pub url: String,
}

impl PublishOutcome {
    fn rejected(url: &str, status_code: u16) -> Self {
        Self {
            published: false,
            success: false,
            status_code,
            url: url.to_owned(),
        }
    }
}

/// Result of a purge call. `path` is the artifact path stem the URL maps
/// to, absent when the URL itself was unmappable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeOutcome {
    pub success: bool,
    pub url: String,
    pub path: Option<PathBuf>,
}

impl PurgeOutcome {
    fn rejected(url: &str) -> Self {
        Self {
            success: false,
            url: url.to_owned(),
            path: None,
        }
    }
}

/// Cache engine persisting page snapshots as a static file tree.
#[derive(Debug)]
pub struct FilesystemPublisher {
    config: PublisherConfig,
    store: ArtifactStore,
}

impl FilesystemPublisher {
    pub fn new(config: PublisherConfig) -> Self {
        let store = ArtifactStore::new(config.dest_root.clone());
        Self { config, store }
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Published URLs found under one subtree of the destination root.
    pub fn published_urls_under(&self, start: &Path) -> Vec<String> {
        self.store
            .artifact_files(start)
            .into_iter()
            .filter(|file| {
                file.extension()
                    .and_then(|extension| extension.to_str())
                    .is_some_and(|extension| extension == HTML_EXTENSION)
            })
            .filter_map(|file| {
                path_to_url(
                    &file,
                    self.store.root(),
                    &self.config.base_url,
                    self.config.domain_based_caching,
                )
            })
            .collect()
    }

    fn url_to_path(&self, url: &str) -> Option<PathBuf> {
        url_to_path(url, &self.config.base_url, self.config.domain_based_caching)
    }

    /// Persist a page artifact: the response body as HTML, plus the
    /// executable PHP cache file when that variant is enabled. Success is
    /// the logical AND of the sub-writes, not a transaction: a standing
    /// HTML artifact survives a failed PHP write.
    fn publish_page(&self, url: &str, response: &RenderedResponse) -> bool {
        let Some(path) = self.url_to_path(url) else {
            warn!(url, "url is unmappable, page not published");
            return false;
        };

        let body = response.body();
        if self.config.lazy_form_recognition
            && contains_live_form(body, &self.config.security_token_field)
        {
            debug!(url, "page contains a live form, skipping publish");
            return false;
        }

        let mut success = true;
        if self.config.php_enabled() {
            let stub = artifact::php_cache_file(response);
            success = self.save_artifact(url, &stub, &with_extension(&path, PHP_EXTENSION));
        }
        self.save_artifact(url, body, &with_extension(&path, HTML_EXTENSION)) && success
    }

    /// Persist a redirect artifact replaying the `Location` header: an HTML
    /// stub for browsers, plus the PHP variant able to send the real 3xx
    /// status when enabled.
    fn publish_redirect(&self, url: &str, response: &RenderedResponse) -> bool {
        let Some(path) = self.url_to_path(url) else {
            warn!(url, "url is unmappable, redirect not published");
            return false;
        };
        let Some(location) = response.header("Location") else {
            warn!(
                url,
                status_code = response.status_code(),
                "redirect response has no Location header, nothing to replay"
            );
            return false;
        };

        let mut success = true;
        if self.config.php_enabled() {
            let stub = artifact::php_cache_file(response);
            success = self.save_artifact(url, &stub, &with_extension(&path, PHP_EXTENSION));
        }
        let stub = artifact::html_redirect(location);
        self.save_artifact(url, stub.as_bytes(), &with_extension(&path, HTML_EXTENSION)) && success
    }

    /// Atomically persist one artifact, then best-effort write its gzip
    /// sibling. A compression failure never downgrades the primary write.
    fn save_artifact(&self, url: &str, content: &[u8], relative: &Path) -> bool {
        match self.store.save(content, relative) {
            Ok(target) => {
                if self.config.gzip_compression
                    && let Err(err) = compress_artifact(&target)
                {
                    warn!(url, path = %target.display(), error = %err, "failed to write gzip variant");
                }
                true
            }
            Err(err) => {
                warn!(url, path = %relative.display(), error = %err, "failed to persist artifact");
                false
            }
        }
    }

    fn delete_artifact(&self, url: &str, relative: &Path) -> bool {
        match self.store.delete(relative) {
            Ok(()) => true,
            Err(err) => {
                warn!(url, path = %relative.display(), error = %err, "failed to delete artifact");
                false
            }
        }
    }
}

impl StaticPublisher for FilesystemPublisher {
    fn publish_url(
        &self,
        url: &str,
        response: &RenderedResponse,
        force_publish: bool,
    ) -> PublishOutcome {
        let status_code = response.status_code();
        if url.is_empty() {
            warn!("refusing to publish an empty url");
            return PublishOutcome::rejected(url, status_code);
        }

        // Error pages are only publishable when the PHP variant can send
        // the real status code; plain static HTML cannot convey a non-200.
        let published = (force_publish && self.config.php_enabled()) || status_code < 400;

        let success = if status_code < 300 {
            self.publish_page(url, response)
        } else if status_code < 400 {
            self.publish_redirect(url, response)
        } else if published {
            self.publish_page(url, response)
        } else {
            debug!(url, status_code, "response not publishable, nothing written");
            false
        };

        PublishOutcome {
            published,
            success,
            status_code,
            url: url.to_owned(),
        }
    }

    fn purge_url(&self, url: &str) -> PurgeOutcome {
        if url.is_empty() {
            warn!("refusing to purge an empty url");
            return PurgeOutcome::rejected(url);
        }
        let Some(path) = self.url_to_path(url) else {
            warn!(url, "url is unmappable, nothing to purge");
            return PurgeOutcome::rejected(url);
        };

        // Delete both variants regardless of which exist; absence is not
        // an error and each delete cascades to its gzip sibling.
        let html_removed = self.delete_artifact(url, &with_extension(&path, HTML_EXTENSION));
        let php_removed = self.delete_artifact(url, &with_extension(&path, PHP_EXTENSION));

        PurgeOutcome {
            success: html_removed && php_removed,
            url: url.to_owned(),
            path: Some(self.store.root().join(path)),
        }
    }

    fn purge_all(&self) -> bool {
        self.store.purge_all()
    }

    fn published_urls(&self) -> Vec<String> {
        // Every published URL has an HTML artifact, so enumerating only
        // those avoids duplicates from the PHP variant.
        self.published_urls_under(self.store.root())
    }
}

/// Append an artifact extension without disturbing extensions already in
/// the URL path (`feed.xml` → `feed.xml.html`).
fn with_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Case-insensitive scan for a hidden form token field.
fn contains_live_form(body: &[u8], token_field: &str) -> bool {
    let needle = format!("<input type=\"hidden\" name=\"{token_field}\"");
    let needle = needle.as_bytes();
    body.windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}
