use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Build tooling for project documentation.",
	long_about = "docsmith expands section-delimited code includes in reStructuredText sources, \
	              generates the static HTML site from markdown pages, and reads the project \
	              release from the build file.\n\nQuick start:\n  docsmith expand   Expand \
	              include directives into the docs build directory\n  docsmith site     \
	              Render the markdown pages to HTML\n  docsmith version  Print the release and \
	              short version"
)]
pub struct DocsmithCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Print the text an include directive would produce.
	///
	/// The file is resolved relative to the project root. Use `path#section`
	/// or `--section` to select a section.
	Include(IncludeArgs),
	/// Expand include directives in the reStructuredText sources.
	///
	/// Every `.rst` file under the docs source directory is copied to the
	/// output directory with each include directive replaced by a literal
	/// block. Includes that fail are rendered as warnings in the document.
	Expand {
		/// Source directory. Defaults to `[docs] source` from docsmith.toml.
		#[arg(long)]
		source: Option<PathBuf>,

		/// Output directory. Defaults to `[docs] output` from docsmith.toml.
		#[arg(long, short)]
		out: Option<PathBuf>,

		/// Show what would change without writing files.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Exit with a non-zero status when any include produced a warning.
		#[arg(long, default_value_t = false)]
		strict: bool,
	},
	/// Generate the static HTML site from markdown pages.
	///
	/// Each page in `[site] pages` is rendered and written between the
	/// configured header and footer templates.
	Site {
		/// Fetch page sources from `[site] remote` instead of the local
		/// source directory.
		#[arg(long, default_value_t = false)]
		remote: bool,

		/// Output directory. Defaults to `[site] output` from docsmith.toml.
		#[arg(long, short)]
		out: Option<PathBuf>,
	},
	/// Print the project release and short version read from the build file.
	Version {
		/// Build file to scan. Defaults to `[project] build_file`.
		#[arg(long, short)]
		file: Option<PathBuf>,

		/// Output format.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Args)]
pub struct IncludeArgs {
	/// File to include, optionally followed by `#section`.
	pub reference: String,

	/// Section to include. Overrides a `#section` suffix.
	#[arg(long)]
	pub section: Option<String>,

	/// Comment prefix used to build the marker.
	#[arg(long)]
	pub comment: Option<String>,

	/// Marker overriding `<comment>#`.
	#[arg(long)]
	pub marker: Option<String>,

	/// Comma separated sections to include.
	#[arg(long)]
	pub include: Option<String>,

	/// Comma separated sections to exclude.
	#[arg(long)]
	pub exclude: Option<String>,

	/// Drop excluded sections without an elision line.
	#[arg(long, default_value_t = false)]
	pub hide_excludes: bool,

	/// Text encoding of the file.
	#[arg(long)]
	pub encoding: Option<String>,

	/// Line placed before the extracted text.
	#[arg(long)]
	pub prepend: Option<String>,

	/// Line placed after the extracted text.
	#[arg(long)]
	pub append: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
