use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use docsmith_cli::Commands;
use docsmith_cli::DocsmithCli;
use docsmith_cli::IncludeArgs;
use docsmith_cli::OutputFormat;
use docsmith_core::Dependencies;
use docsmith_core::DocsmithConfig;
use docsmith_core::DocumentWarning;
use docsmith_core::ExpandSettings;
use docsmith_core::IncludeOptions;
use docsmith_core::IncludeOutcome;
use docsmith_core::ProjectVersion;
use docsmith_core::SiteContext;
use docsmith_core::SiteGenerator;
use docsmith_core::TempNames;
use docsmith_core::expand_tree;
use docsmith_core::fetcher_from_config;
use docsmith_core::include_file;
use docsmith_core::parse_name_list;
use docsmith_core::renderer_from_config;
use docsmith_core::write_expansion;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = DocsmithCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose, use_color);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match &args.command {
		Some(Commands::Include(include)) => run_include(&args, include),
		Some(Commands::Expand {
			source,
			out,
			dry_run,
			strict,
		}) => run_expand(&args, source.as_deref(), out.as_deref(), *dry_run, *strict),
		Some(Commands::Site { remote, out }) => run_site(&args, *remote, out.as_deref()),
		Some(Commands::Version { file, format }) => run_version(&args, file.as_deref(), *format),
		None => {
			eprintln!("No subcommand specified. Run `docsmith --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<docsmith_core::DocsmithError>() {
			Ok(docsmith_err) => {
				let report: miette::Report = (*docsmith_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `DOCSMITH_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_env("DOCSMITH_LOG")
		.unwrap_or_else(|_| EnvFilter::new(format!("docsmith_core={default_level}")));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.without_time()
		.init();
}

fn resolve_root(args: &DocsmithCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}

fn run_include(args: &DocsmithCli, include: &IncludeArgs) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = DocsmithConfig::load_or_default(&root)?;
	let mut options = IncludeOptions::from_defaults(&config.include);

	if let Some(section) = &include.section {
		options.section = Some(section.clone());
	}
	if let Some(comment) = &include.comment {
		options.comment.clone_from(comment);
	}
	if let Some(marker) = &include.marker {
		options.marker = Some(marker.clone());
	}
	if let Some(names) = &include.include {
		options.include = parse_name_list(names);
	}
	if let Some(names) = &include.exclude {
		options.exclude = parse_name_list(names);
	}
	if include.hide_excludes {
		options.hide_excludes = true;
	}
	if let Some(encoding) = &include.encoding {
		options.encoding.clone_from(encoding);
	}
	options.prepend.clone_from(&include.prepend);
	options.append.clone_from(&include.append);

	let mut dependencies = Dependencies::default();
	match include_file(&root, &include.reference, &options, &mut dependencies) {
		IncludeOutcome::Block(block) => {
			println!("{}", block.text);
			Ok(())
		}
		IncludeOutcome::Warning(warning) => Err(warning.message.into()),
	}
}

fn print_document_warnings(warnings: &[DocumentWarning], root: &Path) {
	for warning in warnings {
		eprintln!(
			"{} {}:{}: {}",
			colored!("warning:", yellow),
			make_relative(&warning.file, root),
			warning.line,
			warning.message
		);
	}
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				print!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				print!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				print!("   {change}");
			}
		}
	}
}

fn run_expand(
	args: &DocsmithCli,
	source: Option<&Path>,
	out: Option<&Path>,
	dry_run: bool,
	strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = DocsmithConfig::load_or_default(&root)?;
	let source = source.map_or_else(|| root.join(&config.docs.source), Path::to_path_buf);
	let out = out.map_or_else(|| root.join(&config.docs.output), Path::to_path_buf);
	let settings = ExpandSettings::from_config(&config);

	tracing::debug!(source = %source.display(), out = %out.display(), "expanding documents");
	let result = expand_tree(&source, &out, &config.docs.exclude, &settings)?;
	print_document_warnings(&result.warnings, &root);

	let changed: Vec<_> = result.changed().collect();
	if changed.is_empty() {
		println!(
			"All {} document(s) are already up to date.",
			result.files.len()
		);
	} else if dry_run {
		println!("Dry run: would update {} document(s):", changed.len());
		for file in &changed {
			println!("  {}", make_relative(&file.output, &root));
			print_diff(file.previous.as_deref().unwrap_or(""), &file.content);
		}
	} else {
		let written = write_expansion(&result)?;
		println!("Expanded {written} document(s).");
		if args.verbose {
			for file in &changed {
				println!("  {}", make_relative(&file.output, &root));
			}
		}
	}

	if args.verbose && !result.dependencies.is_empty() {
		println!("Included files:");
		for dependency in result.dependencies.iter() {
			println!("  {}", make_relative(dependency, &root));
		}
	}

	if strict && result.has_warnings() {
		eprintln!(
			"{} {} include warning(s) found",
			colored!("error:", red),
			result.warnings.len()
		);
		process::exit(1);
	}

	Ok(())
}

fn project_version(config: &DocsmithConfig, root: &Path, file: Option<&Path>) -> Option<ProjectVersion> {
	let build_file = file
		.map(Path::to_path_buf)
		.or_else(|| config.project.build_file.as_ref().map(|path| root.join(path)))?;
	Some(ProjectVersion::from_build_file(&build_file))
}

fn run_site(
	args: &DocsmithCli,
	remote: bool,
	out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = DocsmithConfig::load_or_default(&root)?;

	let mut generator = SiteGenerator::from_config(&root, &config.site)?;
	if let Some(out) = out {
		generator.output_dir = out.to_path_buf();
	}
	let fetcher = fetcher_from_config(&root, &config.site, remote)?;
	let renderer = renderer_from_config(&root, &config.site);
	let context = SiteContext::from_config(&root, &config);
	let mut temp = TempNames::new(&root);

	let report = generator.generate(fetcher.as_ref(), renderer.as_ref(), &context, &mut temp)?;

	println!("Generated {} page(s).", report.written.len());
	if args.verbose {
		for path in &report.written {
			println!("  {}", make_relative(path, &root));
		}
	}

	if !report.is_ok() {
		for failure in &report.failures {
			eprintln!(
				"{} page `{}` failed: {}",
				colored!("error:", red),
				failure.page,
				failure.error
			);
		}
		process::exit(1);
	}

	Ok(())
}

fn run_version(
	args: &DocsmithCli,
	file: Option<&Path>,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = DocsmithConfig::load_or_default(&root)?;
	let Some(version) = project_version(&config, &root, file) else {
		return Err("no build file given; pass --file or set `[project] build_file`".into());
	};

	match format {
		OutputFormat::Text => {
			println!("release: {}", version.release);
			println!("version: {}", version.version);
		}
		OutputFormat::Json => {
			println!("{}", serde_json::to_string_pretty(&version)?);
		}
	}

	if !version.is_known() {
		eprintln!("{} no release found", colored!("warning:", yellow));
		process::exit(1);
	}

	Ok(())
}
