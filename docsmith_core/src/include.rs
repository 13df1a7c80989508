//! Section-delimited code includes.
//!
//! Source files mark documentation fragments with paired marker comments:
//!
//! ```java
//! //#builder
//! Span span = Span.newBuilder()
//!     .traceId("463ac35c9f6413ad")
//!     //#timestamps
//!     .timestamp(1472470996199000L)
//!     //#timestamps
//!     .build();
//! //#builder
//! ```
//!
//! The first occurrence of a name opens a section and the next occurrence of
//! the same name closes it. Sections may nest. An include selects sections by
//! name, drops excluded ones (leaving a one-line elision behind), and removes
//! the common indentation of what remains.

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;

use crate::DEFAULT_COMMENT;
use crate::IncludeDefaults;
use crate::TextEncoding;

/// A file argument of the form `path` or `path#section`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
	pub path: PathBuf,
	pub section: Option<String>,
}

impl FileReference {
	/// Split `argument` on its last `#`. An empty section is treated as no
	/// section.
	pub fn parse(argument: &str) -> Self {
		let argument = argument.trim();
		match argument.rsplit_once('#') {
			Some((path, section)) => {
				let section = section.trim();
				Self {
					path: PathBuf::from(path.trim()),
					section: (!section.is_empty()).then(|| section.to_string()),
				}
			}
			None => {
				Self {
					path: PathBuf::from(argument),
					section: None,
				}
			}
		}
	}
}

/// Options accepted by the include directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeOptions {
	/// Primary section. Takes precedence over a `#section` path suffix.
	pub section: Option<String>,
	/// Comment prefix used for the default marker and for elision lines.
	pub comment: String,
	/// Explicit marker overriding `comment + "#"`.
	pub marker: Option<String>,
	pub include: Vec<String>,
	pub exclude: Vec<String>,
	/// Drop excluded sections without leaving an elision line.
	pub hide_excludes: bool,
	pub linenos: bool,
	pub language: Option<String>,
	pub encoding: String,
	/// Literal line placed before the extracted text.
	pub prepend: Option<String>,
	/// Literal line placed after the extracted text.
	pub append: Option<String>,
}

impl Default for IncludeOptions {
	fn default() -> Self {
		Self::from_defaults(&IncludeDefaults::default())
	}
}

impl IncludeOptions {
	/// Start from the configured defaults.
	pub fn from_defaults(defaults: &IncludeDefaults) -> Self {
		Self {
			section: None,
			comment: defaults.comment.clone(),
			marker: defaults.marker.clone(),
			include: Vec::new(),
			exclude: Vec::new(),
			hide_excludes: defaults.hide_excludes,
			linenos: defaults.linenos,
			language: defaults.language.clone(),
			encoding: defaults.encoding.clone(),
			prepend: None,
			append: None,
		}
	}

	/// The marker that opens and closes sections.
	pub fn marker(&self) -> String {
		match &self.marker {
			Some(marker) => marker.clone(),
			None if self.comment.is_empty() => format!("{DEFAULT_COMMENT}#"),
			None => format!("{}#", self.comment),
		}
	}
}

/// Split a comma separated list of section names.
pub fn parse_name_list(value: &str) -> Vec<String> {
	value
		.split(',')
		.map(str::trim)
		.filter(|name| !name.is_empty())
		.map(str::to_string)
		.collect()
}

/// The resolved filter for one include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFilter {
	pub marker: String,
	pub comment: String,
	pub include: BTreeSet<String>,
	pub exclude: BTreeSet<String>,
	pub hide_excludes: bool,
}

impl SectionFilter {
	/// Build the filter, folding the primary section into the include set.
	pub fn from_options(options: &IncludeOptions, reference: &FileReference) -> Self {
		let mut include: BTreeSet<String> = options.include.iter().cloned().collect();
		if let Some(section) = options.section.as_ref().or(reference.section.as_ref()) {
			include.insert(section.clone());
		}

		Self {
			marker: options.marker(),
			comment: options.comment.clone(),
			include,
			exclude: options.exclude.iter().cloned().collect(),
			hide_excludes: options.hide_excludes,
		}
	}

	fn is_excluded(&self, within: &BTreeSet<String>) -> bool {
		!within.is_disjoint(&self.exclude)
	}

	fn is_selected(&self, within: &BTreeSet<String>) -> bool {
		self.include.is_empty() || !within.is_disjoint(&self.include)
	}

	/// Return the marker column and section name if `line` is a marker line.
	fn marker_name<'a>(&self, line: &'a str) -> Option<(usize, &'a str)> {
		if self.marker.is_empty() {
			return None;
		}
		let offset = line.find(&self.marker)?;
		let name = line[offset + self.marker.len()..].trim();
		(!name.is_empty()).then(|| (line[..offset].chars().count(), name))
	}
}

/// Scan state threaded through the lines of one file.
#[derive(Debug, Default)]
struct ScanState {
	/// Sections currently open.
	within: BTreeSet<String>,
	excluding: bool,
	emitted: Vec<String>,
}

impl ScanState {
	fn advance(mut self, line: &str, filter: &SectionFilter) -> Self {
		let Some((column, name)) = filter.marker_name(line) else {
			if !self.excluding && filter.is_selected(&self.within) {
				self.emitted.push(line.to_string());
			}
			return self;
		};

		if !self.within.remove(name) {
			self.within.insert(name.to_string());
		}

		let excluding = filter.is_excluded(&self.within);
		// The elision is aligned with the marker column.
		if excluding && !self.excluding && !filter.hide_excludes {
			self.emitted.push(format!(
				"{}{} {} ...",
				" ".repeat(column),
				filter.comment,
				name.replace('-', " ")
			));
		}
		self.excluding = excluding;

		self
	}
}

/// Select the lines of `content` that `filter` keeps. Marker lines are never
/// part of the result.
pub fn extract_sections(content: &str, filter: &SectionFilter) -> Vec<String> {
	content
		.lines()
		.fold(ScanState::default(), |state, line| state.advance(line, filter))
		.emitted
}

fn leading_spaces(line: &str) -> usize {
	line.bytes().take_while(|&b| b == b' ').count()
}

/// Remove the smallest leading space count of the non-blank lines from every
/// line.
pub fn dedent(lines: &[String]) -> Vec<String> {
	let Some(min_indent) = lines
		.iter()
		.filter(|line| !line.trim().is_empty())
		.map(|line| leading_spaces(line))
		.min()
	else {
		return lines.to_vec();
	};

	lines
		.iter()
		.map(|line| {
			if leading_spaces(line) >= min_indent {
				line[min_indent..].to_string()
			} else {
				line.trim_start_matches(' ').to_string()
			}
		})
		.collect()
}

/// De-indent the extracted lines and add the prepend/append lines. The extra
/// lines are added after de-indentation and do not affect it.
pub fn render_block(lines: &[String], options: &IncludeOptions) -> String {
	let mut block = Vec::with_capacity(lines.len() + 2);
	if let Some(prepend) = &options.prepend {
		block.push(prepend.clone());
	}
	block.extend(dedent(lines));
	if let Some(append) = &options.append {
		block.push(append.clone());
	}
	block.join("\n")
}

/// Normalize CRLF line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

/// Files read while expanding includes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies(BTreeSet<PathBuf>);

impl Dependencies {
	pub fn record(&mut self, path: impl Into<PathBuf>) {
		self.0.insert(path.into());
	}

	pub fn contains(&self, path: &Path) -> bool {
		self.0.contains(path)
	}

	pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn extend(&mut self, other: Dependencies) {
		self.0.extend(other.0);
	}
}

/// The text of an include, ready to be placed in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralBlock {
	pub text: String,
	pub language: Option<String>,
	pub linenos: bool,
	/// Resolved path of the included file.
	pub source: PathBuf,
}

/// A problem that prevented an include from producing a block. It is
/// rendered into the document instead of aborting the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeWarning {
	pub path: PathBuf,
	pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeOutcome {
	Block(LiteralBlock),
	Warning(IncludeWarning),
}

/// Resolve `argument` against `doc_dir`, read the file, and extract the
/// selected sections.
///
/// A relative path is resolved against the directory of the document that
/// contains the include. Read and decode failures become
/// [`IncludeOutcome::Warning`].
pub fn include_file(
	doc_dir: &Path,
	argument: &str,
	options: &IncludeOptions,
	dependencies: &mut Dependencies,
) -> IncludeOutcome {
	let reference = FileReference::parse(argument);
	let path = if reference.path.is_absolute() {
		reference.path.clone()
	} else {
		doc_dir.join(&reference.path)
	};
	let display_path = path.display().to_string();

	let warning = |message: String| {
		tracing::warn!(path = %display_path, "{message}");
		IncludeOutcome::Warning(IncludeWarning {
			path: path.clone(),
			message,
		})
	};

	let encoding = match TextEncoding::from_label(&options.encoding) {
		Ok(encoding) => encoding,
		Err(e) => return warning(e.to_string()),
	};

	let bytes = match std::fs::read(&path) {
		Ok(bytes) => bytes,
		Err(e) => {
			return warning(format!(
				"Include file \"{display_path}\" not found or reading it failed: {e}"
			));
		}
	};

	let content = match encoding.decode(&bytes, &display_path) {
		Ok(content) => normalize_line_endings(&content),
		Err(_) => {
			return warning(format!(
				"Encoding \"{encoding}\" used for reading included file \"{display_path}\" seems to be \
				 wrong, try giving an :encoding: option"
			));
		}
	};

	let filter = SectionFilter::from_options(options, &reference);
	tracing::debug!(
		path = %display_path,
		include = ?filter.include,
		exclude = ?filter.exclude,
		"extracting sections"
	);
	let lines = extract_sections(&content, &filter);
	dependencies.record(&path);

	IncludeOutcome::Block(LiteralBlock {
		text: render_block(&lines, options),
		language: options.language.clone(),
		linenos: options.linenos,
		source: path,
	})
}
