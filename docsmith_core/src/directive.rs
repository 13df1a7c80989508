use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::LazyLock;

use ignore::WalkBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use regex::Captures;
use regex::Regex;

use crate::Dependencies;
use crate::DocsmithConfig;
use crate::DocsmithError;
use crate::DocsmithResult;
use crate::IncludeDefaults;
use crate::IncludeOptions;
use crate::IncludeOutcome;
use crate::LinkShortcut;
use crate::LiteralBlock;
use crate::include_file;
use crate::normalize_line_endings;
use crate::parse_name_list;

/// Indentation of directive options and bodies relative to the directive.
const BODY_INDENT: &str = "   ";

static DIRECTIVE_START: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?P<indent>\s*)\.\.\s+(?P<name>[A-Za-z][\w.-]*)::(?:\s+(?P<argument>.*))?$")
		.unwrap_or_else(|e| panic!("invalid directive pattern: {e}"))
});

static DIRECTIVE_OPTION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^:(?P<name>[A-Za-z][\w-]*):(?:\s+(?P<value>.*))?$")
		.unwrap_or_else(|e| panic!("invalid option pattern: {e}"))
});

static LINK_ROLE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r":(?P<role>[A-Za-z][\w-]*):`(?P<target>[^`]+)`")
		.unwrap_or_else(|e| panic!("invalid role pattern: {e}"))
});

static EXPLICIT_TITLE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?P<title>.+?)\s*<(?P<target>[^<>]+)>$")
		.unwrap_or_else(|e| panic!("invalid title pattern: {e}"))
});

/// An include directive found in a reStructuredText document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveCall {
	pub name: String,
	pub argument: String,
	/// Options in source order. Flag options have no value.
	pub options: Vec<(String, Option<String>)>,
	/// Leading whitespace of the directive line.
	pub indent: String,
	/// 1-indexed line of the directive.
	pub line: usize,
	/// 1-indexed last line belonging to the directive (inclusive).
	pub end_line: usize,
}

/// Find every `.. <name>::` directive in `content`.
pub fn parse_directives(content: &str, name: &str) -> Vec<DirectiveCall> {
	let lines: Vec<&str> = content.lines().collect();
	let mut calls = Vec::new();
	let mut index = 0;

	while index < lines.len() {
		let Some(captures) = DIRECTIVE_START.captures(lines[index]) else {
			index += 1;
			continue;
		};
		if &captures["name"] != name {
			index += 1;
			continue;
		}

		let indent = captures["indent"].to_string();
		let argument = captures
			.name("argument")
			.map(|m| m.as_str().trim().to_string())
			.unwrap_or_default();
		let start = index;
		let mut options = Vec::new();
		index += 1;

		while index < lines.len() {
			let line = lines[index];
			let deeper = line.len() > indent.len()
				&& line.starts_with(indent.as_str())
				&& line[indent.len()..].starts_with(char::is_whitespace);
			let Some(option) = deeper
				.then(|| DIRECTIVE_OPTION.captures(line.trim()))
				.flatten()
			else {
				break;
			};
			options.push((
				option["name"].to_string(),
				option
					.name("value")
					.map(|m| m.as_str().trim().to_string())
					.filter(|value| !value.is_empty()),
			));
			index += 1;
		}

		calls.push(DirectiveCall {
			name: name.to_string(),
			argument,
			options,
			indent,
			line: start + 1,
			end_line: index,
		});
	}

	calls
}

impl IncludeOptions {
	/// Apply the options of `call` on top of `defaults`.
	pub fn from_directive(call: &DirectiveCall, defaults: &IncludeDefaults) -> DocsmithResult<Self> {
		let mut options = Self::from_defaults(defaults);

		for (name, value) in &call.options {
			let required = || {
				value
					.clone()
					.ok_or_else(|| DocsmithError::MissingOptionValue(name.clone()))
			};

			match name.as_str() {
				"section" => options.section = Some(required()?),
				"comment" => options.comment = required()?,
				"marker" => options.marker = Some(required()?),
				"include" => options.include = parse_name_list(&required()?),
				"exclude" => options.exclude = parse_name_list(&required()?),
				"hideexcludes" => options.hide_excludes = true,
				"linenos" => options.linenos = true,
				"language" => options.language = Some(required()?),
				"encoding" => options.encoding = required()?,
				"prepend" => options.prepend = Some(required()?),
				"append" => options.append = Some(required()?),
				_ => {
					return Err(DocsmithError::UnknownOption {
						directive: call.name.clone(),
						option: name.clone(),
					});
				}
			}
		}

		Ok(options)
	}
}

/// Everything needed to expand a document.
#[derive(Debug, Clone)]
pub struct ExpandSettings {
	pub directive: String,
	pub defaults: IncludeDefaults,
	pub links: BTreeMap<String, LinkShortcut>,
}

impl Default for ExpandSettings {
	fn default() -> Self {
		Self::from_config(&DocsmithConfig::default())
	}
}

impl ExpandSettings {
	pub fn from_config(config: &DocsmithConfig) -> Self {
		Self {
			directive: config.docs.directive.clone(),
			defaults: config.include.clone(),
			links: config.links.clone(),
		}
	}
}

/// A problem reported while expanding a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentWarning {
	pub file: PathBuf,
	/// 1-indexed line of the directive that produced the warning.
	pub line: usize,
	pub message: String,
}

/// The expanded form of one document.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
	pub content: String,
	pub dependencies: Dependencies,
	pub warnings: Vec<DocumentWarning>,
}

/// Replace every include directive in `content` with a literal block and
/// rewrite link shortcuts. `doc_path` is the path of the document; includes
/// are resolved against its directory.
pub fn expand_document(doc_path: &Path, content: &str, settings: &ExpandSettings) -> Expansion {
	let content = normalize_line_endings(content);
	let doc_dir = doc_path.parent().unwrap_or_else(|| Path::new(""));
	let lines: Vec<&str> = content.lines().collect();
	let mut expansion = Expansion::default();
	let mut output: Vec<String> = Vec::with_capacity(lines.len());
	let mut links = LinkRewriter::new(&settings.links);
	let mut cursor = 0;

	for call in parse_directives(&content, &settings.directive) {
		output.extend(
			lines[cursor..call.line - 1]
				.iter()
				.map(|line| links.rewrite(line)),
		);
		cursor = call.end_line;
		links.reset();

		let outcome = match IncludeOptions::from_directive(&call, &settings.defaults) {
			Ok(_) if call.argument.is_empty() => {
				Err(DocsmithError::MissingArgument(call.name.clone()).to_string())
			}
			Ok(options) => {
				match include_file(doc_dir, &call.argument, &options, &mut expansion.dependencies) {
					IncludeOutcome::Block(block) if block.text.trim().is_empty() => {
						Err(format!(
							"Include of \"{}\" produced no lines",
							block.source.display()
						))
					}
					IncludeOutcome::Block(block) => Ok(block),
					IncludeOutcome::Warning(warning) => Err(warning.message),
				}
			}
			Err(e) => Err(e.to_string()),
		};

		match outcome {
			Ok(block) => output.extend(render_literal_block(&block, &call.indent)),
			Err(message) => {
				output.extend(render_warning(&message, &call.indent));
				expansion.warnings.push(DocumentWarning {
					file: doc_path.to_path_buf(),
					line: call.line,
					message,
				});
			}
		}
	}

	output.extend(lines[cursor..].iter().map(|line| links.rewrite(line)));

	let mut text = output.join("\n");
	if content.ends_with('\n') {
		text.push('\n');
	}
	expansion.content = text;
	expansion
}

fn indent_body(text: &str, indent: &str) -> impl Iterator<Item = String> {
	text.lines().map(move |line| {
		if line.trim().is_empty() {
			String::new()
		} else {
			format!("{indent}{BODY_INDENT}{line}")
		}
	})
}

/// Render a block as a `code-block` directive, or as a plain `::` literal
/// block when neither a language nor line numbers were requested.
pub fn render_literal_block(block: &LiteralBlock, indent: &str) -> Vec<String> {
	let mut lines = Vec::new();
	if block.language.is_none() && !block.linenos {
		lines.push(format!("{indent}::"));
	} else {
		let language = block.language.as_deref().unwrap_or("text");
		lines.push(format!("{indent}.. code-block:: {language}"));
		if block.linenos {
			lines.push(format!("{indent}{BODY_INDENT}:linenos:"));
		}
	}
	lines.push(String::new());
	lines.extend(indent_body(&block.text, indent));
	lines
}

/// Render a warning admonition in place of a failed include.
pub fn render_warning(message: &str, indent: &str) -> Vec<String> {
	let mut lines = vec![format!("{indent}.. warning::"), String::new()];
	lines.extend(indent_body(message, indent));
	lines
}

/// Rewrite `:role:`target`` for every configured link shortcut. Roles that
/// are not configured are left untouched.
pub fn expand_links(line: &str, links: &BTreeMap<String, LinkShortcut>) -> String {
	if links.is_empty() || !line.contains(":`") {
		return line.to_string();
	}

	LINK_ROLE
		.replace_all(line, |captures: &Captures<'_>| {
			let Some(shortcut) = links.get(&captures["role"]) else {
				return captures[0].to_string();
			};
			let raw = &captures["target"];
			let (title, target) = match EXPLICIT_TITLE.captures(raw) {
				Some(explicit) => (Some(explicit["title"].to_string()), explicit["target"].to_string()),
				None => (None, raw.to_string()),
			};
			let url = shortcut.url.replace("%s", &target);
			let title = title.unwrap_or_else(|| {
				shortcut
					.caption
					.as_ref()
					.map_or_else(|| url.clone(), |caption| caption.replace("%s", &target))
			});
			format!("`{title} <{url}>`__")
		})
		.into_owned()
}

/// Directives whose body is literal text.
const LITERAL_DIRECTIVES: [&str; 4] = ["code-block", "code", "sourcecode", "literalinclude"];

fn indent_width(line: &str) -> usize {
	line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Whether the lines indented under `line` form a literal block: a paragraph
/// ending in `::` or one of the code directives.
fn opens_literal_block(line: &str) -> bool {
	match DIRECTIVE_START.captures(line) {
		Some(captures) => LITERAL_DIRECTIVES.contains(&&captures["name"]),
		None => line.trim_end().ends_with("::"),
	}
}

/// Applies [`expand_links`] line by line, leaving literal block bodies as
/// they are.
struct LinkRewriter<'a> {
	links: &'a BTreeMap<String, LinkShortcut>,
	/// Indentation of the line that opened the current literal block.
	literal_indent: Option<usize>,
}

impl<'a> LinkRewriter<'a> {
	fn new(links: &'a BTreeMap<String, LinkShortcut>) -> Self {
		Self {
			links,
			literal_indent: None,
		}
	}

	fn rewrite(&mut self, line: &str) -> String {
		let indent = indent_width(line);
		if let Some(block_indent) = self.literal_indent {
			if line.trim().is_empty() || indent > block_indent {
				return line.to_string();
			}
			self.literal_indent = None;
		}

		if opens_literal_block(line) {
			self.literal_indent = Some(indent);
		}
		expand_links(line, self.links)
	}

	fn reset(&mut self) {
		self.literal_indent = None;
	}
}

/// A document produced by [`expand_tree`].
#[derive(Debug, Clone)]
pub struct ExpandedFile {
	pub source: PathBuf,
	pub output: PathBuf,
	pub content: String,
	/// Content currently at `output`, if the file exists.
	pub previous: Option<String>,
}

impl ExpandedFile {
	pub fn is_changed(&self) -> bool {
		self.previous.as_deref() != Some(self.content.as_str())
	}
}

/// Result of expanding every document under a source directory.
#[derive(Debug, Default)]
pub struct ExpandResult {
	pub files: Vec<ExpandedFile>,
	pub dependencies: Dependencies,
	pub warnings: Vec<DocumentWarning>,
}

impl ExpandResult {
	pub fn changed(&self) -> impl Iterator<Item = &ExpandedFile> {
		self.files.iter().filter(|file| file.is_changed())
	}

	pub fn has_warnings(&self) -> bool {
		!self.warnings.is_empty()
	}
}

/// Build a `Gitignore` matcher from the `[docs] exclude` patterns.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> DocsmithResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			DocsmithError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| DocsmithError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

fn is_rst_file(path: &Path) -> bool {
	path.extension().and_then(|e| e.to_str()) == Some("rst")
}

/// Collect the `.rst` documents under `source_dir`, skipping `out_dir` and
/// anything matched by `exclude`.
fn collect_documents(source_dir: &Path, out_dir: &Path, exclude: &[String]) -> DocsmithResult<Vec<PathBuf>> {
	let exclude = build_exclude_matcher(source_dir, exclude)?;
	let mut documents = Vec::new();

	for entry in WalkBuilder::new(source_dir)
		.require_git(false)
		.git_global(false)
		.build()
	{
		let entry = match entry {
			Ok(entry) => entry,
			Err(e) => {
				tracing::warn!("skipping unreadable entry: {e}");
				continue;
			}
		};
		let path = entry.path();
		if path.starts_with(out_dir) || !path.is_file() || !is_rst_file(path) {
			continue;
		}
		if exclude.matched_path_or_any_parents(path, false).is_ignore() {
			continue;
		}
		documents.push(path.to_path_buf());
	}

	documents.sort();
	Ok(documents)
}

/// Expand every `.rst` document under `source_dir` into the same relative
/// location under `out_dir`. Nothing is written; see [`write_expansion`].
pub fn expand_tree(
	source_dir: &Path,
	out_dir: &Path,
	exclude: &[String],
	settings: &ExpandSettings,
) -> DocsmithResult<ExpandResult> {
	let mut result = ExpandResult::default();

	for source in collect_documents(source_dir, out_dir, exclude)? {
		let relative = source.strip_prefix(source_dir).unwrap_or(&source);
		let output = out_dir.join(relative);
		tracing::debug!(source = %source.display(), output = %output.display(), "expanding document");

		let content = std::fs::read_to_string(&source)?;
		let expansion = expand_document(&source, &content, settings);
		let previous = std::fs::read_to_string(&output).ok();

		result.dependencies.extend(expansion.dependencies);
		result.warnings.extend(expansion.warnings);
		result.files.push(ExpandedFile {
			source,
			output,
			content: expansion.content,
			previous,
		});
	}

	Ok(result)
}

/// Write every changed document of `result` to disk.
pub fn write_expansion(result: &ExpandResult) -> DocsmithResult<usize> {
	let mut written = 0;
	for file in result.changed() {
		if let Some(parent) = file.output.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&file.output, &file.content)?;
		written += 1;
	}
	Ok(written)
}
