use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::DocsmithError;
use crate::DocsmithResult;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"docsmith.toml",
	".docsmith.toml",
	".config/docsmith.toml",
];

/// Name of the include directive recognized in reStructuredText documents
/// when `[docs] directive` is not set.
pub const DEFAULT_DIRECTIVE: &str = "includecode";

/// Comment prefix used to build section markers when none is configured.
pub const DEFAULT_COMMENT: &str = "//";

/// Command used to download remote page sources.
pub const DEFAULT_FETCH_COMMAND: &str = "curl -sSfL {url} -o {output}";

/// Renderer setting that selects the in-process markdown renderer.
pub const BUILTIN_RENDERER: &str = "builtin";

/// Configuration loaded from a `docsmith.toml` file.
///
/// ```toml
/// [project]
/// name = "Zipkin"
/// build_file = "build.gradle"
///
/// [docs]
/// source = "docs"
/// output = "target/docs"
/// theme = "sphinx_rtd_theme"
///
/// [include]
/// comment = "//"
/// encoding = "utf-8"
///
/// [links]
/// issue = { url = "https://github.com/openzipkin/zipkin/issues/%s", caption = "#%s" }
///
/// [site]
/// pages = ["index", "architecture", "instrumenting"]
/// header = "templates/header.html"
/// footer = "templates/footer.html"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct DocsmithConfig {
	/// Project metadata shared by the docs build and the site generator.
	#[serde(default)]
	pub project: ProjectConfig,
	/// Settings for expanding include directives in reStructuredText sources.
	#[serde(default)]
	pub docs: DocsConfig,
	/// Defaults applied to every include directive before its own options.
	#[serde(default)]
	pub include: IncludeDefaults,
	/// Link shortcuts keyed by role name, e.g. `:issue:`123``.
	#[serde(default)]
	pub links: BTreeMap<String, LinkShortcut>,
	/// Static site generation settings.
	#[serde(default)]
	pub site: SiteConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
	/// Display name of the project, available to site templates.
	#[serde(default)]
	pub name: Option<String>,
	/// Build file scanned for the release, e.g. `build.gradle`.
	#[serde(default)]
	pub build_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
	/// Directory holding the `.rst` sources, relative to the project root.
	pub source: PathBuf,
	/// Directory the expanded documents are written to.
	pub output: PathBuf,
	/// Name of the include directive.
	pub directive: String,
	/// Theme name handed to the documentation renderer.
	pub theme: Option<String>,
	/// Gitignore-style patterns for source documents to skip.
	pub exclude: Vec<String>,
}

impl Default for DocsConfig {
	fn default() -> Self {
		Self {
			source: PathBuf::from("docs"),
			output: PathBuf::from("target/docs"),
			directive: DEFAULT_DIRECTIVE.to_string(),
			theme: None,
			exclude: Vec::new(),
		}
	}
}

/// Defaults for include directive options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IncludeDefaults {
	pub comment: String,
	/// Explicit marker. When absent the marker is `comment + "#"`.
	pub marker: Option<String>,
	pub encoding: String,
	pub hide_excludes: bool,
	pub linenos: bool,
	pub language: Option<String>,
}

impl Default for IncludeDefaults {
	fn default() -> Self {
		Self {
			comment: DEFAULT_COMMENT.to_string(),
			marker: None,
			encoding: "utf-8".to_string(),
			hide_excludes: false,
			linenos: false,
			language: None,
		}
	}
}

/// A link shortcut. `%s` in `url` and `caption` is replaced by the role
/// target.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LinkShortcut {
	pub url: String,
	#[serde(default)]
	pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
	/// Page identifiers in generation order.
	pub pages: Vec<String>,
	/// Directory holding local `<page>.md` sources.
	pub source: PathBuf,
	/// Directory the generated `<page>.html` files are written to.
	pub output: PathBuf,
	/// Template written before each page body.
	pub header: Option<PathBuf>,
	/// Template written after each page body.
	pub footer: Option<PathBuf>,
	/// `builtin`, or a command line containing `{input}`.
	pub renderer: String,
	/// URL pattern containing `{page}` used when fetching remote sources.
	pub remote: Option<String>,
	/// Command line used to download a remote source. Supports `{url}` and
	/// `{output}`.
	pub fetch_command: String,
	/// Output file name overrides keyed by page identifier (without the
	/// `.html` extension).
	pub renames: BTreeMap<String, String>,
}

impl Default for SiteConfig {
	fn default() -> Self {
		Self {
			pages: Vec::new(),
			source: PathBuf::from("doc"),
			output: PathBuf::from("site"),
			header: None,
			footer: None,
			renderer: BUILTIN_RENDERER.to_string(),
			remote: None,
			fetch_command: DEFAULT_FETCH_COMMAND.to_string(),
			renames: BTreeMap::new(),
		}
	}
}

impl DocsmithConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> DocsmithResult<Option<DocsmithConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		tracing::debug!(path = %config_path.display(), "loading config");
		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;

		Ok(Some(config))
	}

	/// Load the config at `root`, falling back to defaults when absent.
	pub fn load_or_default(root: &Path) -> DocsmithResult<DocsmithConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}

	pub fn parse(content: &str) -> DocsmithResult<DocsmithConfig> {
		toml::from_str(content).map_err(|e| DocsmithError::ConfigParse(e.to_string()))
	}
}
