//! Statica, a filesystem-backed static page cache.
//!
//! Given a rendered page response for a URL, the engine decides whether and
//! how to persist a durable, servable snapshot on disk, and manages the
//! lifecycle of that snapshot set: creation, enumeration, invalidation and
//! bulk purge. The directory tree doubles as the cache index: there is no
//! separate metadata store.
//!
//! ## Layout on disk
//!
//! ```text
//! <dest_root>/[<host>/]<url_path>.html
//! <dest_root>/[<host>/]<url_path>.php      (php artifact kind)
//! <dest_root>/[<host>/]<url_path>.html.gz  (gzip compression)
//! <dest_root>/[<host>/]<url_path>.php.gz   (both)
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use statica::{FilesystemPublisher, PublisherConfig, RenderedResponse, StaticPublisher};
//!
//! let publisher = FilesystemPublisher::new(PublisherConfig::default());
//! let response = RenderedResponse::new(200, "<html>hello</html>");
//! let outcome = publisher.publish_url("/hello", &response, false);
//! assert!(outcome.published);
//! ```
//!
//! The engine is synchronous and blocking; atomic replace-by-rename is its
//! single concurrency guarantee. Rendering, queueing and configuration
//! loading are the embedding application's concern.

mod artifact;
mod compress;
mod config;
mod error;
mod paths;
mod publisher;
mod response;
mod store;

pub use artifact::ArtifactKind;
pub use compress::compress_artifact;
pub use config::PublisherConfig;
pub use error::StoreError;
pub use paths::{path_to_url, url_to_path};
pub use publisher::{FilesystemPublisher, PublishOutcome, PurgeOutcome, StaticPublisher};
pub use response::RenderedResponse;
pub use store::ArtifactStore;
