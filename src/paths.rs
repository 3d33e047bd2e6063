//! URL ↔ cache-path mapping.
//!
//! Pure functions, no I/O. The cache tree has no metadata store, so this
//! mapping *is* the index: `published_urls` reconstructs URLs from artifact
//! paths with [`path_to_url`], which requires [`url_to_path`] to be stable
//! under the round trip for every path the engine itself produces.
//!
//! Query strings are not part of the mapping. A URL carrying one is
//! unmappable rather than silently truncated, so path-only caching stays an
//! explicit scope limit instead of quiet data loss.

use std::path::{Path, PathBuf};

use url::Url;

const INDEX_SEGMENT: &str = "index";

/// Map a URL to a cache path relative to the destination root.
///
/// The site `base_url` prefix is stripped before mapping. With
/// `domain_based` enabled the path is rooted under the URL's host directory
/// so identical paths on different virtual hosts never collide; without it
/// the host is discarded entirely.
///
/// Returns `None` for anything unmappable: an empty URL, a URL with a query
/// string, a host-less URL in domain mode, or a path that would escape the
/// cache root.
pub fn url_to_path(url: &str, base_url: &str, domain_based: bool) -> Option<PathBuf> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let (host, path, query) = split_url(url)?;
    if query.is_some_and(|query| !query.is_empty()) {
        return None;
    }

    let segment = strip_base(&path, base_url);
    let segment = segment.trim_matches('/');
    let mut name = if segment.is_empty() {
        INDEX_SEGMENT.to_owned()
    } else {
        segment.to_owned()
    };

    if domain_based {
        let host = host?;
        name = format!("{host}/{name}");
    }

    if name
        .split('/')
        .any(|part| part.is_empty() || part == "." || part == "..")
    {
        return None;
    }

    Some(PathBuf::from(name))
}

/// Map an artifact path back to the URL it was published under.
///
/// The inverse of [`url_to_path`] for engine-produced paths: strips the
/// destination root and the `.html` suffix, unfolds the `index` artifact
/// back into a trailing slash, and re-attaches either the host (domain
/// mode) or the site `base_url`.
pub fn path_to_url(path: &Path, dest_root: &Path, base_url: &str, domain_based: bool) -> Option<String> {
    let relative = path.strip_prefix(dest_root).unwrap_or(path);

    let mut segments = Vec::new();
    for component in relative.components() {
        segments.push(component.as_os_str().to_str()?);
    }
    let joined = segments.join("/");
    let rel = joined.strip_suffix(".html").unwrap_or(&joined);
    if rel.is_empty() {
        return None;
    }

    if domain_based {
        let (host, rest) = rel.split_once('/').unwrap_or((rel, ""));
        let rest = if rest == INDEX_SEGMENT { "" } else { rest };
        Some(format!("http://{host}/{rest}"))
    } else {
        let rest = if rel == INDEX_SEGMENT { "" } else { rel };
        let base = base_url.trim_end_matches('/');
        Some(format!("{base}/{rest}"))
    }
}

/// Split a URL into host, path and query, accepting both absolute URLs and
/// site-relative paths.
fn split_url(url: &str) -> Option<(Option<String>, String, Option<String>)> {
    match Url::parse(url) {
        Ok(parsed) => Some((
            parsed.host_str().map(str::to_owned),
            parsed.path().to_owned(),
            parsed.query().map(str::to_owned),
        )),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let without_fragment = url.split_once('#').map_or(url, |(head, _)| head);
            let (path, query) = match without_fragment.split_once('?') {
                Some((path, query)) => (path, Some(query.to_owned())),
                None => (without_fragment, None),
            };
            Some((None, path.to_owned(), query))
        }
        Err(_) => None,
    }
}

/// Strip the site base-URL prefix from a request path, case-insensitively.
fn strip_base(path: &str, base_url: &str) -> String {
    let base_path = match Url::parse(base_url) {
        Ok(parsed) => parsed.path().to_owned(),
        Err(_) => base_url.to_owned(),
    };

    if path
        .to_ascii_lowercase()
        .starts_with(&base_path.to_ascii_lowercase())
    {
        path[base_path.len()..].to_owned()
    } else {
        path.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_relative_url_maps_to_relative_path() {
        assert_eq!(url_to_path("/about-us", "/", false), Some(PathBuf::from("about-us")));
        assert_eq!(
            url_to_path("/parent/child", "/", false),
            Some(PathBuf::from("parent/child"))
        );
    }

    #[test]
    fn root_and_trailing_slash_map_to_index() {
        assert_eq!(url_to_path("/", "/", false), Some(PathBuf::from("index")));
        assert_eq!(url_to_path("/about/", "/", false), Some(PathBuf::from("about")));
        assert_eq!(
            url_to_path("https://example.com/", "/", false),
            Some(PathBuf::from("index"))
        );
    }

    #[test]
    fn base_url_prefix_is_stripped() {
        assert_eq!(
            url_to_path("/site/about-us", "/site/", false),
            Some(PathBuf::from("about-us"))
        );
        assert_eq!(
            url_to_path("https://example.com/site/about-us", "https://example.com/site/", false),
            Some(PathBuf::from("about-us"))
        );
    }

    #[test]
    fn query_string_is_unmappable() {
        assert_eq!(url_to_path("/search?q=rust", "/", false), None);
        assert_eq!(url_to_path("https://example.com/search?q=rust", "/", false), None);
    }

    #[test]
    fn empty_and_escaping_urls_are_unmappable() {
        assert_eq!(url_to_path("", "/", false), None);
        assert_eq!(url_to_path("   ", "/", false), None);
        assert_eq!(url_to_path("/../etc/passwd", "/", false), None);
        assert_eq!(url_to_path("/a/../b", "/", false), None);
    }

    #[test]
    fn domain_mode_partitions_by_host() {
        let a = url_to_path("https://a.example/page", "/", true).expect("host a should map");
        let b = url_to_path("https://b.example/page", "/", true).expect("host b should map");
        assert_eq!(a, PathBuf::from("a.example/page"));
        assert_eq!(b, PathBuf::from("b.example/page"));
        assert_ne!(a, b);
    }

    #[test]
    fn without_domain_mode_hosts_collide() {
        let a = url_to_path("https://a.example/page", "/", false).expect("host a should map");
        let b = url_to_path("https://b.example/page", "/", false).expect("host b should map");
        assert_eq!(a, b);
    }

    #[test]
    fn domain_mode_requires_a_host() {
        assert_eq!(url_to_path("/page", "/", true), None);
    }

    #[test]
    fn path_to_url_inverts_the_mapping() {
        let root = Path::new("cache");
        for url in ["/", "/about-us", "/parent/child", "/assets/feed.xml"] {
            let rel = url_to_path(url, "/", false).expect("url should map");
            let html = root.join(format!("{}.html", rel.display()));
            let back = path_to_url(&html, root, "/", false).expect("path should map back");
            assert_eq!(back, url);
            assert_eq!(url_to_path(&back, "/", false), Some(rel));
        }
    }

    #[test]
    fn path_to_url_round_trips_in_domain_mode() {
        let root = Path::new("cache");
        let rel = url_to_path("https://a.example/deep/page", "/", true).expect("url should map");
        let html = root.join(format!("{}.html", rel.display()));
        let back = path_to_url(&html, root, "/", true).expect("path should map back");
        assert_eq!(back, "http://a.example/deep/page");
        assert_eq!(url_to_path(&back, "/", true), Some(rel));
    }

    #[test]
    fn path_to_url_rebuilds_the_base_url() {
        let root = Path::new("cache");
        assert_eq!(
            path_to_url(&root.join("about-us.html"), root, "/site/", false),
            Some("/site/about-us".to_owned())
        );
        assert_eq!(
            path_to_url(&root.join("index.html"), root, "/site/", false),
            Some("/site/".to_owned())
        );
    }
}
