//! Static site generation from markdown pages.
//!
//! Each page identifier is resolved to a markdown source (a local file or a
//! remote download), rendered to an HTML fragment, and written to
//! `<output>/<page>.html` between the header and footer templates. Fetching
//! and rendering sit behind [`SourceFetcher`] and [`MarkdownRenderer`] so the
//! external tools can be swapped out.

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use serde::Serialize;

use crate::BUILTIN_RENDERER;
use crate::DocsmithConfig;
use crate::DocsmithError;
use crate::DocsmithResult;
use crate::ProjectVersion;
use crate::SiteConfig;

/// Converts a markdown file to an HTML fragment.
pub trait MarkdownRenderer {
	fn render(&self, source: &Path) -> DocsmithResult<String>;
}

/// Produces the markdown source of a page.
pub trait SourceFetcher {
	fn fetch(&self, page: &str, temp: &mut TempNames) -> DocsmithResult<PageSource>;
}

/// In-process renderer using GitHub flavored markdown. Raw HTML in pages is
/// passed through.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRenderer;

impl MarkdownRenderer for BuiltinRenderer {
	fn render(&self, source: &Path) -> DocsmithResult<String> {
		let content = std::fs::read_to_string(source)?;
		let options = markdown::Options {
			compile: markdown::CompileOptions {
				allow_dangerous_html: true,
				..markdown::CompileOptions::gfm()
			},
			..markdown::Options::gfm()
		};

		markdown::to_html_with_options(&content, &options).map_err(|e| {
			DocsmithError::Markdown {
				path: source.display().to_string(),
				reason: e.to_string(),
			}
		})
	}
}

/// Renders through an external command. `{input}` in the command is replaced
/// by the quoted source path and the command's stdout is the HTML.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
	pub command: String,
	pub working_dir: PathBuf,
}

impl MarkdownRenderer for CommandRenderer {
	fn render(&self, source: &Path) -> DocsmithResult<String> {
		let command = self.command.replace("{input}", &shell_quote(source));
		run_shell(&self.working_dir, &command)
	}
}

/// Reads `<dir>/<page>.md`.
#[derive(Debug, Clone)]
pub struct LocalFetcher {
	pub dir: PathBuf,
}

impl SourceFetcher for LocalFetcher {
	fn fetch(&self, page: &str, _temp: &mut TempNames) -> DocsmithResult<PageSource> {
		let path = self.dir.join(format!("{page}.md"));
		if !path.is_file() {
			return Err(DocsmithError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("page source `{}` does not exist", path.display()),
			)));
		}
		Ok(PageSource::Local(path))
	}
}

/// Downloads `url_pattern` with `{page}` substituted into a temporary file by
/// running `command` with `{url}` and `{output}` substituted.
#[derive(Debug, Clone)]
pub struct CommandFetcher {
	pub url_pattern: String,
	pub command: String,
	pub working_dir: PathBuf,
}

impl CommandFetcher {
	pub fn url(&self, page: &str) -> String {
		self.url_pattern.replace("{page}", page)
	}
}

impl SourceFetcher for CommandFetcher {
	fn fetch(&self, page: &str, temp: &mut TempNames) -> DocsmithResult<PageSource> {
		let file = temp.next("md");
		let url = self.url(page);
		let command = self
			.command
			.replace("{url}", &shell_quote(Path::new(&url)))
			.replace("{output}", &shell_quote(file.path()));

		tracing::debug!(page, url = %url, "fetching page source");
		run_shell(&self.working_dir, &command)?;
		Ok(PageSource::Fetched(file))
	}
}

/// Where the markdown of a page lives while it is rendered.
#[derive(Debug)]
pub enum PageSource {
	Local(PathBuf),
	/// A downloaded copy, removed when dropped.
	Fetched(TempFile),
}

impl PageSource {
	pub fn path(&self) -> &Path {
		match self {
			Self::Local(path) => path,
			Self::Fetched(file) => file.path(),
		}
	}
}

/// Hands out unique temporary file names for one generation run.
#[derive(Debug)]
pub struct TempNames {
	dir: PathBuf,
	prefix: String,
	counter: u64,
}

impl TempNames {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self {
			dir: dir.into(),
			prefix: format!(".docsmith-{}", std::process::id()),
			counter: 0,
		}
	}

	pub fn next(&mut self, extension: &str) -> TempFile {
		self.counter += 1;
		TempFile {
			path: self
				.dir
				.join(format!("{}-{}.{extension}", self.prefix, self.counter)),
		}
	}

	/// Number of names handed out so far.
	pub fn issued(&self) -> u64 {
		self.counter
	}
}

/// A temporary file path. The file, if it was created, is removed on drop.
#[derive(Debug)]
pub struct TempFile {
	path: PathBuf,
}

impl TempFile {
	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl Drop for TempFile {
	fn drop(&mut self) {
		match std::fs::remove_file(&self.path) {
			Ok(()) => tracing::debug!(path = %self.path.display(), "removed temporary file"),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
			Err(e) => {
				tracing::warn!(path = %self.path.display(), "failed to remove temporary file: {e}");
			}
		}
	}
}

/// Values available to the header and footer templates.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteContext {
	pub project: Option<String>,
	/// `[docs] theme`, for templates that pick stylesheets by theme.
	pub theme: Option<String>,
	#[serde(flatten)]
	pub version: ProjectVersion,
}

impl SiteContext {
	/// Project name, theme and the release read from `[project] build_file`.
	pub fn from_config(root: &Path, config: &DocsmithConfig) -> Self {
		let version = config
			.project
			.build_file
			.as_ref()
			.map(|build_file| ProjectVersion::from_build_file(&root.join(build_file)))
			.unwrap_or_default();

		Self {
			project: config.project.name.clone(),
			theme: config.docs.theme.clone(),
			version,
		}
	}
}

#[derive(Serialize)]
struct PageContext<'a> {
	page: &'a str,
	name: &'a str,
	#[serde(flatten)]
	site: &'a SiteContext,
}

/// A page that could not be generated.
#[derive(Debug)]
pub struct PageFailure {
	pub page: String,
	pub error: DocsmithError,
}

/// Outcome of a generation run.
#[derive(Debug, Default)]
pub struct SiteReport {
	pub written: Vec<PathBuf>,
	pub failures: Vec<PageFailure>,
}

impl SiteReport {
	pub fn is_ok(&self) -> bool {
		self.failures.is_empty()
	}
}

#[derive(Debug, Clone, Default)]
pub struct SiteGenerator {
	pub pages: Vec<String>,
	pub output_dir: PathBuf,
	pub header: String,
	pub footer: String,
	/// Output names keyed by page identifier.
	pub renames: BTreeMap<String, String>,
}

impl SiteGenerator {
	/// Build a generator from `[site]`, reading the header and footer
	/// templates relative to `root`.
	pub fn from_config(root: &Path, config: &SiteConfig) -> DocsmithResult<Self> {
		let read_template = |path: Option<&PathBuf>| -> DocsmithResult<String> {
			match path {
				Some(path) => Ok(std::fs::read_to_string(root.join(path))?),
				None => Ok(String::new()),
			}
		};

		Ok(Self {
			pages: config.pages.clone(),
			output_dir: root.join(&config.output),
			header: read_template(config.header.as_ref())?,
			footer: read_template(config.footer.as_ref())?,
			renames: config.renames.clone(),
		})
	}

	/// Name of the generated file for `page`, without extension.
	pub fn output_name<'a>(&'a self, page: &'a str) -> &'a str {
		self.renames.get(page).map_or(page, String::as_str)
	}

	pub fn output_path(&self, page: &str) -> PathBuf {
		self.output_dir.join(format!("{}.html", self.output_name(page)))
	}

	/// Generate every page in order. A failing page is recorded in the report
	/// and the remaining pages are still generated.
	pub fn generate(
		&self,
		fetcher: &dyn SourceFetcher,
		renderer: &dyn MarkdownRenderer,
		context: &SiteContext,
		temp: &mut TempNames,
	) -> DocsmithResult<SiteReport> {
		if self.pages.is_empty() {
			return Err(DocsmithError::NoPages);
		}

		std::fs::create_dir_all(&self.output_dir)?;
		let mut report = SiteReport::default();

		for page in &self.pages {
			match self.generate_page(page, fetcher, renderer, context, temp) {
				Ok(path) => {
					tracing::debug!(page = %page, path = %path.display(), "generated page");
					report.written.push(path);
				}
				Err(error) => {
					tracing::warn!(page = %page, "page generation failed: {error}");
					report.failures.push(PageFailure {
						page: page.clone(),
						error,
					});
				}
			}
		}

		Ok(report)
	}

	fn generate_page(
		&self,
		page: &str,
		fetcher: &dyn SourceFetcher,
		renderer: &dyn MarkdownRenderer,
		context: &SiteContext,
		temp: &mut TempNames,
	) -> DocsmithResult<PathBuf> {
		let source = fetcher.fetch(page, temp)?;
		let body = renderer.render(source.path())?;
		drop(source);

		let page_context = PageContext {
			page,
			name: self.output_name(page),
			site: context,
		};
		let header = render_template(&self.header, &page_context)?;
		let footer = render_template(&self.footer, &page_context)?;

		let path = self.output_path(page);
		std::fs::write(&path, wrap_page(&header, &body, &footer))?;
		Ok(path)
	}
}

/// Concatenate the header, body and footer.
pub fn wrap_page(header: &str, body: &str, footer: &str) -> String {
	let mut page = String::with_capacity(header.len() + body.len() + footer.len());
	page.push_str(header);
	page.push_str(body);
	page.push_str(footer);
	page
}

/// Render a header or footer through minijinja. Templates without template
/// syntax are returned unchanged.
fn render_template(template: &str, context: &impl Serialize) -> DocsmithResult<String> {
	if !has_template_syntax(template) {
		return Ok(template.to_string());
	}

	let mut env = minijinja::Environment::new();
	env.set_keep_trailing_newline(true);
	env.add_template("__page__", template)
		.map_err(|e| DocsmithError::TemplateRender(e.to_string()))?;

	let template = env
		.get_template("__page__")
		.map_err(|e| DocsmithError::TemplateRender(e.to_string()))?;

	template
		.render(minijinja::Value::from_serialize(context))
		.map_err(|e| DocsmithError::TemplateRender(e.to_string()))
}

fn has_template_syntax(content: &str) -> bool {
	content.contains("{{") || content.contains("{%") || content.contains("{#")
}

/// The renderer selected by `[site] renderer`.
pub fn renderer_from_config(root: &Path, config: &SiteConfig) -> Box<dyn MarkdownRenderer> {
	if config.renderer.trim() == BUILTIN_RENDERER {
		Box::new(BuiltinRenderer)
	} else {
		Box::new(CommandRenderer {
			command: config.renderer.clone(),
			working_dir: root.to_path_buf(),
		})
	}
}

/// A [`CommandFetcher`] when `remote` is set, otherwise a [`LocalFetcher`]
/// over `[site] source`.
pub fn fetcher_from_config(
	root: &Path,
	config: &SiteConfig,
	remote: bool,
) -> DocsmithResult<Box<dyn SourceFetcher>> {
	if !remote {
		return Ok(Box::new(LocalFetcher {
			dir: root.join(&config.source),
		}));
	}

	let url_pattern = config.remote.clone().ok_or(DocsmithError::NoRemote)?;
	Ok(Box::new(CommandFetcher {
		url_pattern,
		command: config.fetch_command.clone(),
		working_dir: root.to_path_buf(),
	}))
}

/// Quote `path` for the platform shell.
fn shell_quote(path: &Path) -> String {
	let raw = path.to_string_lossy();
	if cfg!(windows) {
		format!("\"{}\"", raw.replace('"', "\"\""))
	} else {
		format!("'{}'", raw.replace('\'', r"'\''"))
	}
}

/// Run `command` through the platform shell in `root` and return its stdout.
/// A non-zero exit status is an error carrying stderr.
fn run_shell(root: &Path, command: &str) -> DocsmithResult<String> {
	let output = if cfg!(windows) {
		Command::new("cmd")
			.arg("/C")
			.arg(command)
			.current_dir(root)
			.output()?
	} else {
		Command::new("sh")
			.arg("-c")
			.arg(command)
			.current_dir(root)
			.output()?
	};

	if !output.status.success() {
		let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
		let reason = if stderr.is_empty() {
			format!(
				"command exited with status {}",
				output
					.status
					.code()
					.map_or_else(|| "unknown".to_string(), |code| code.to_string())
			)
		} else {
			stderr
		};

		return Err(DocsmithError::Command {
			command: command.to_string(),
			reason,
		});
	}

	Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
