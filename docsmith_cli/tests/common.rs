#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub const EXAMPLE_JAVA: &str = "\
package demo;

class Example {
  //#builder
  Span span = Span.newBuilder()
      .name(\"get\")
      //#timestamps
      .timestamp(1L)
      .duration(2L)
      //#timestamps
      .build();
  //#builder
}
";

pub fn docsmith_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("docsmith"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("DOCSMITH_LOG");
	cmd
}

pub fn write(root: &Path, relative: &str, content: &str) -> std::io::Result<()> {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)
}
