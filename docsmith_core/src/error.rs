use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DocsmithError {
	#[error(transparent)]
	#[diagnostic(code(docsmith::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(docsmith::config_parse),
		help("check that docsmith.toml is valid TOML with [project], [docs], [include] and/or [site] sections")
	)]
	ConfigParse(String),

	#[error("unknown text encoding: `{0}`")]
	#[diagnostic(
		code(docsmith::unknown_encoding),
		help("supported encodings: utf-8, utf-8-sig, ascii, latin-1, utf-16le, utf-16be")
	)]
	UnknownEncoding(String),

	#[error("could not decode `{path}` as {encoding}")]
	#[diagnostic(
		code(docsmith::decode),
		help("specify the correct encoding with the `:encoding:` option")
	)]
	Decode { path: String, encoding: String },

	#[error("unknown option `:{option}:` for directive `{directive}`")]
	#[diagnostic(
		code(docsmith::unknown_option),
		help(
			"available options: section, comment, marker, include, exclude, hideexcludes, \
			 linenos, language, encoding, prepend, append"
		)
	)]
	UnknownOption { directive: String, option: String },

	#[error("directive option `:{0}:` requires a value")]
	#[diagnostic(code(docsmith::missing_option_value))]
	MissingOptionValue(String),

	#[error("directive `{0}` requires a file argument")]
	#[diagnostic(code(docsmith::missing_argument))]
	MissingArgument(String),

	#[error("markdown rendering failed for `{path}`: {reason}")]
	#[diagnostic(code(docsmith::markdown))]
	Markdown { path: String, reason: String },

	#[error("command `{command}` failed: {reason}")]
	#[diagnostic(
		code(docsmith::command),
		help("check that the command is installed and on your PATH")
	)]
	Command { command: String, reason: String },

	#[error("template rendering failed: {0}")]
	#[diagnostic(code(docsmith::template_render))]
	TemplateRender(String),

	#[error("no pages configured for the site")]
	#[diagnostic(
		code(docsmith::no_pages),
		help("add a `pages = [...]` list to the [site] section of docsmith.toml")
	)]
	NoPages,

	#[error("no remote url configured for the site")]
	#[diagnostic(
		code(docsmith::no_remote),
		help("set `remote = \"https://.../{{page}}.md\"` in the [site] section of docsmith.toml")
	)]
	NoRemote,
}

pub type DocsmithResult<T> = Result<T, DocsmithError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
