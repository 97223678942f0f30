//! Site configuration.
//!
//! `site.toml` is optional. Every key has a default that matches the
//! standard layout of the repository:
//!
//! ```toml
//! [paths]
//! source = "web"
//! output = "build"
//! native = "native"
//! artifact = "gingerbread.wasm"
//!
//! [resources]
//! include = ["images", "scripts", "styles", "favicon.ico"]
//! test_assets = "scripts/tests"
//! exclude_pages = ["test.html"]
//!
//! [serve]
//! enabled = true
//! port = 5500
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors raised while loading `site.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Configuration file structure (site.toml).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,

    pub paths: PathsConfig,
    pub resources: ResourcesConfig,
    pub serve: ServeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source tree holding pages and resources
    pub source: PathBuf,
    /// Output tree
    pub output: PathBuf,
    /// Root of the native project; the artifact lives under `zig-out/bin`
    pub native: PathBuf,
    /// File name of the prebuilt native artifact
    pub artifact: String,
    /// Extension of template pages
    pub page_extension: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("web"),
            output: PathBuf::from("build"),
            native: PathBuf::from("native"),
            artifact: "gingerbread.wasm".to_string(),
            page_extension: "html".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Directories and files copied verbatim, in order
    pub include: Vec<String>,
    /// Extra resource copied when building with tests
    pub test_assets: String,
    /// Pages skipped unless building with tests
    pub exclude_pages: Vec<String>,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            include: vec![
                "images".to_string(),
                "scripts".to_string(),
                "styles".to_string(),
                "favicon.ico".to_string(),
            ],
            test_assets: "scripts/tests".to_string(),
            exclude_pages: vec!["test.html".to_string()],
        }
    }
}

/// Development server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Run the watch loop after the initial build
    pub enabled: bool,
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Open browser on start
    pub open: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 5500,
            open: false,
        }
    }
}

impl SiteConfig {
    /// Load configuration from `path` if it exists.
    ///
    /// A missing file yields the defaults, resolved against the current
    /// directory. A file that exists but is malformed is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        if !path.exists() {
            return Ok(Self {
                base_dir,
                ..Default::default()
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: SiteConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = base_dir;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }
}

/// Everything a build reads, fixed once at startup.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source tree
    pub source_dir: PathBuf,

    /// Output tree
    pub output_dir: PathBuf,

    /// Native project root
    pub native_dir: PathBuf,

    /// Native artifact file name
    pub artifact: String,

    /// Extension identifying template pages
    pub page_extension: String,

    /// Resources relative to the source tree, copied in order
    pub resources: Vec<PathBuf>,

    /// Page names relative to the source tree that are not rendered
    pub exclude_pages: Vec<String>,
}

impl BuildConfig {
    /// Resolve the build inputs from the site config.
    ///
    /// With `tests` set, the test assets join the resource list and no page
    /// is excluded.
    pub fn new(site: &SiteConfig, tests: bool) -> Self {
        let mut resources: Vec<PathBuf> = site
            .resources
            .include
            .iter()
            .map(PathBuf::from)
            .collect();
        let mut exclude_pages = site.resources.exclude_pages.clone();

        if tests {
            resources.push(PathBuf::from(&site.resources.test_assets));
            exclude_pages.clear();
        }

        Self {
            source_dir: site.resolve(&site.paths.source),
            output_dir: site.resolve(&site.paths.output),
            native_dir: site.resolve(&site.paths.native),
            artifact: site.paths.artifact.clone(),
            page_extension: site.paths.page_extension.clone(),
            resources,
            exclude_pages,
        }
    }

    /// Where the native build leaves the artifact.
    pub fn artifact_source(&self) -> PathBuf {
        self.native_dir
            .join("zig-out")
            .join("bin")
            .join(&self.artifact)
    }

    /// Where the artifact is staged inside the output tree.
    pub fn artifact_dest(&self) -> PathBuf {
        self.output_dir.join("native").join(&self.artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().unwrap();
        let site = SiteConfig::load(&temp.path().join("site.toml")).unwrap();

        assert_eq!(site.base_dir, temp.path());
        assert_eq!(site.paths.source, PathBuf::from("web"));
        assert_eq!(site.serve.port, 5500);
        assert!(site.serve.enabled);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("site.toml");
        fs::write(&path, "[paths]\noutput = \"dist\"\n\n[serve]\nenabled = false\n").unwrap();

        let site = SiteConfig::load(&path).unwrap();

        assert_eq!(site.paths.output, PathBuf::from("dist"));
        assert_eq!(site.paths.artifact, "gingerbread.wasm");
        assert_eq!(site.resources.include.len(), 4);
        assert!(!site.serve.enabled);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("site.toml");
        fs::write(&path, "[paths\nsource = ").unwrap();

        let err = SiteConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn default_build_excludes_test_page() {
        let site = SiteConfig::default();
        let config = BuildConfig::new(&site, false);

        assert_eq!(
            config.resources,
            vec![
                PathBuf::from("images"),
                PathBuf::from("scripts"),
                PathBuf::from("styles"),
                PathBuf::from("favicon.ico"),
            ]
        );
        assert_eq!(config.exclude_pages, vec!["test.html".to_string()]);
    }

    #[test]
    fn tests_flag_adds_test_assets_and_clears_exclusions() {
        let site = SiteConfig::default();
        let config = BuildConfig::new(&site, true);

        assert_eq!(config.resources.last(), Some(&PathBuf::from("scripts/tests")));
        assert_eq!(config.resources.len(), 5);
        assert!(config.exclude_pages.is_empty());
    }

    #[test]
    fn resolves_paths_against_base_dir() {
        let site = SiteConfig {
            base_dir: PathBuf::from("/srv/site"),
            ..Default::default()
        };
        let config = BuildConfig::new(&site, false);

        assert_eq!(config.source_dir, PathBuf::from("/srv/site/web"));
        assert_eq!(
            config.artifact_source(),
            PathBuf::from("/srv/site/native/zig-out/bin/gingerbread.wasm")
        );
        assert_eq!(
            config.artifact_dest(),
            PathBuf::from("/srv/site/build/native/gingerbread.wasm")
        );
    }
}
