//! Mapping changed files to browser URLs and asset kinds.

use std::time::Duration;

/// Default name of the directory served at the site root.
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Default time a stylesheet swap may stay pending.
pub const DEFAULT_STYLESHEET_TIMEOUT: Duration = Duration::from_secs(5);

/// How changed files are mapped onto the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Directory name stripped from file paths to form URLs.
    pub public_dir: String,
    /// Extensions reloaded as stylesheets (compiled to `.css`).
    pub stylesheet_extensions: Vec<String>,
    /// Extensions reloaded as images.
    pub image_extensions: Vec<String>,
    /// How long a stylesheet swap waits for the new link to load.
    pub stylesheet_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            public_dir: DEFAULT_PUBLIC_DIR.to_owned(),
            stylesheet_extensions: ["css", "styl", "less", "scss", "sass"]
                .map(str::to_owned)
                .to_vec(),
            image_extensions: ["png", "jpg", "gif"].map(str::to_owned).to_vec(),
            stylesheet_timeout: DEFAULT_STYLESHEET_TIMEOUT,
        }
    }
}

/// What kind of asset a changed file is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Stylesheet,
    Image,
    Other,
}

/// A changed file resolved against the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    pub kind: AssetKind,
    /// Browser-relative URL, always starting with `/`.
    pub url: String,
}

impl ClientConfig {
    /// Classify a file by its (case-insensitive) extension.
    pub fn classify_extension(&self, ext: &str) -> AssetKind {
        if self.stylesheet_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            AssetKind::Stylesheet
        } else if self.image_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            AssetKind::Image
        } else {
            AssetKind::Other
        }
    }

    /// Resolve a changed file path to its asset kind and URL.
    ///
    /// Stylesheet sources are mapped to the compiled `.css` URL; every other
    /// URL keeps the file's spelling, since the page refers to it verbatim.
    pub fn resolve(&self, file: &str) -> Asset {
        let url = browser_url(file, &self.public_dir);
        let Some((stem, ext)) = split_extension(&url) else {
            return Asset {
                kind: AssetKind::Other,
                url,
            };
        };

        let kind = self.classify_extension(ext);
        let url = match kind {
            AssetKind::Stylesheet => format!("{stem}.css"),
            AssetKind::Image | AssetKind::Other => url.clone(),
        };
        Asset { kind, url }
    }
}

/// Strip everything up to and including the `public_dir` path component.
///
/// Paths without that component are used whole. The result always starts
/// with `/` and uses forward slashes.
pub fn browser_url(file: &str, public_dir: &str) -> String {
    let normalized = file.replace('\\', "/");
    let segments: Vec<&str> = normalized
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    let start = segments
        .iter()
        .position(|s| *s == public_dir)
        .map_or(0, |i| i + 1);

    format!("/{}", segments[start..].join("/"))
}

/// Split the last path segment's extension off a URL.
fn split_extension(url: &str) -> Option<(&str, &str)> {
    let name_start = url.rfind('/').map_or(0, |i| i + 1);
    let dot = url[name_start..].rfind('.')? + name_start;
    if dot == name_start {
        // Dotfile without an extension.
        return None;
    }
    Some((&url[..dot], &url[dot + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_browser_url_strips_public_dir() {
        assert_eq!(browser_url("public/css/app.css", "public"), "/css/app.css");
        assert_eq!(
            browser_url("/home/me/site/public/img/logo.png", "public"),
            "/img/logo.png"
        );
        assert_eq!(browser_url("public\\js\\moon.js", "public"), "/js/moon.js");
    }

    #[test]
    fn test_browser_url_without_public_dir() {
        assert_eq!(browser_url("css/app.css", "public"), "/css/app.css");
        assert_eq!(browser_url("./static/a.css", "static"), "/a.css");
    }

    #[test]
    fn test_browser_url_only_whole_components() {
        assert_eq!(
            browser_url("publication/public/a.css", "public"),
            "/a.css"
        );
        assert_eq!(browser_url("publications/a.css", "public"), "/publications/a.css");
    }

    #[test]
    fn test_resolve_stylesheet_sources() {
        let config = ClientConfig::default();

        for file in ["public/css/app.styl", "public/css/app.SCSS", "public/css/app.css"] {
            assert_eq!(
                config.resolve(file),
                Asset {
                    kind: AssetKind::Stylesheet,
                    url: "/css/app.css".to_owned(),
                }
            );
        }
    }

    #[test]
    fn test_resolve_images_keeps_url_case() {
        let config = ClientConfig::default();
        assert_eq!(
            config.resolve("public/img/Photo.JPG"),
            Asset {
                kind: AssetKind::Image,
                url: "/img/Photo.JPG".to_owned(),
            }
        );
        assert_eq!(config.resolve("public/js/App.JS").url, "/js/App.JS");
    }

    #[test]
    fn test_resolve_other() {
        let config = ClientConfig::default();
        assert_eq!(config.resolve("public/js/app.js").kind, AssetKind::Other);
        assert_eq!(config.resolve("public/Makefile").kind, AssetKind::Other);
        assert_eq!(config.resolve("public/.hidden").kind, AssetKind::Other);
    }

    #[test]
    fn test_custom_extension_lists() {
        let config = ClientConfig {
            image_extensions: vec!["webp".to_owned()],
            ..ClientConfig::default()
        };
        assert_eq!(config.classify_extension("WEBP"), AssetKind::Image);
        assert_eq!(config.classify_extension("png"), AssetKind::Other);
    }
}
