mod common;

use docsmith_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;

const INDEX_RST: &str = "\
Tracing
=======

See :issue:`42`.

.. includecode:: ../src/Example.java#builder
   :exclude: timestamps

Done.
";

const EXPANDED_RST: &str = "\
Tracing
=======

See `#42 <https://github.com/openzipkin/zipkin/issues/42>`__.

::

   Span span = Span.newBuilder()
       .name(\"get\")
       // timestamps ...
       .build();

Done.
";

const CONFIG: &str = "\
[links.issue]
url = \"https://github.com/openzipkin/zipkin/issues/%s\"
caption = \"#%s\"
";

fn setup(root: &std::path::Path) -> std::io::Result<()> {
	common::write(root, "docsmith.toml", CONFIG)?;
	common::write(root, "src/Example.java", common::EXAMPLE_JAVA)?;
	common::write(root, "docs/index.rst", INDEX_RST)
}

#[test]
fn expand_writes_documents() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;

	common::docsmith_cmd()
		.arg("expand")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Expanded 1 document(s)."));

	let expanded = std::fs::read_to_string(tmp.path().join("target/docs/index.rst"))?;
	assert_eq!(expanded, EXPANDED_RST);

	Ok(())
}

#[test]
fn expand_is_idempotent() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;

	common::docsmith_cmd()
		.arg("expand")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	common::docsmith_cmd()
		.arg("expand")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already up to date"));

	Ok(())
}

#[test]
fn expand_dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;

	common::docsmith_cmd()
		.arg("expand")
		.arg("--path")
		.arg(tmp.path())
		.arg("--dry-run")
		.assert()
		.success()
		.stdout(
			predicates::str::contains("Dry run: would update 1 document(s):")
				.and(predicates::str::contains("+   Span span = Span.newBuilder()")),
		);

	assert!(!tmp.path().join("target/docs/index.rst").exists());

	Ok(())
}

#[test]
fn expand_custom_output_directory() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;
	let out = tmp.path().join("build");

	common::docsmith_cmd()
		.arg("expand")
		.arg("--path")
		.arg(tmp.path())
		.arg("--out")
		.arg(&out)
		.assert()
		.success();

	assert!(out.join("index.rst").is_file());

	Ok(())
}

#[test]
fn expand_reports_include_warnings() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(
		tmp.path(),
		"docs/index.rst",
		"Intro\n\n.. includecode:: ../src/Missing.java\n",
	)?;

	common::docsmith_cmd()
		.arg("expand")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("warning: docs/index.rst:3:"));

	let expanded = std::fs::read_to_string(tmp.path().join("target/docs/index.rst"))?;
	assert!(expanded.contains(".. warning::"));

	Ok(())
}

#[test]
fn expand_strict_fails_on_warnings() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(
		tmp.path(),
		"docs/index.rst",
		"Intro\n\n.. includecode:: ../src/Missing.java\n",
	)?;

	common::docsmith_cmd()
		.arg("expand")
		.arg("--path")
		.arg(tmp.path())
		.arg("--strict")
		.assert()
		.failure()
		.code(1)
		.stderr(predicates::str::contains("1 include warning(s) found"));

	Ok(())
}

#[test]
fn expand_rejects_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "docsmith.toml", "[docs\nsource = 1")?;

	common::docsmith_cmd()
		.arg("expand")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2);

	Ok(())
}
