use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static RELEASE_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"\w+\s*=\s*["'](?P<release>\d+\.\d+\.\d+)["']"#)
		.unwrap_or_else(|e| panic!("invalid release pattern: {e}"))
});

static VERSION_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?P<version>\d+\.\d+)").unwrap_or_else(|e| panic!("invalid version pattern: {e}"))
});

/// Find the first `identifier = "X.Y.Z"` declaration in a build file and
/// return `X.Y.Z`.
///
/// Returns an empty string when the file cannot be read or contains no such
/// declaration; callers treat that as an unknown release.
pub fn find_release(path: &Path) -> String {
	let file = match std::fs::File::open(path) {
		Ok(file) => file,
		Err(e) => {
			tracing::debug!(path = %path.display(), "cannot open build file: {e}");
			return String::new();
		}
	};

	BufReader::new(file)
		.lines()
		.map_while(Result::ok)
		.find_map(|line| {
			RELEASE_DECLARATION
				.captures(&line)
				.map(|captures| captures["release"].to_string())
		})
		.unwrap_or_default()
}

/// The `X.Y` prefix of a release such as `1.2.0-SNAPSHOT`, or an empty string
/// when the release does not start with one.
pub fn release_to_version(release: &str) -> String {
	VERSION_PREFIX
		.captures(release)
		.map(|captures| captures["version"].to_string())
		.unwrap_or_default()
}

/// Release and short version of the project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectVersion {
	pub release: String,
	pub version: String,
}

impl ProjectVersion {
	pub fn from_release(release: impl Into<String>) -> Self {
		let release = release.into();
		let version = release_to_version(&release);
		Self { release, version }
	}

	/// Read the release from `build_file`. Unknown values are empty strings.
	pub fn from_build_file(build_file: &Path) -> Self {
		Self::from_release(find_release(build_file))
	}

	pub fn is_known(&self) -> bool {
		!self.release.is_empty()
	}
}
