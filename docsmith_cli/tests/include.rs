mod common;

use docsmith_core::AnyEmptyResult;

#[test]
fn include_prints_dedented_section() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "src/Example.java", common::EXAMPLE_JAVA)?;

	common::docsmith_cmd()
		.arg("include")
		.arg("--path")
		.arg(tmp.path())
		.arg("src/Example.java#builder")
		.arg("--exclude")
		.arg("timestamps")
		.assert()
		.success()
		.stdout(
			"Span span = Span.newBuilder()\n    .name(\"get\")\n    // timestamps ...\n    \
			 .build();\n",
		);

	Ok(())
}

#[test]
fn include_section_flag_overrides_suffix() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "src/Example.java", common::EXAMPLE_JAVA)?;

	common::docsmith_cmd()
		.arg("include")
		.arg("--path")
		.arg(tmp.path())
		.arg("src/Example.java#builder")
		.arg("--section")
		.arg("timestamps")
		.assert()
		.success()
		.stdout(".timestamp(1L)\n.duration(2L)\n");

	Ok(())
}

#[test]
fn include_prepends_and_appends() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "src/Example.java", common::EXAMPLE_JAVA)?;

	common::docsmith_cmd()
		.arg("include")
		.arg("--path")
		.arg(tmp.path())
		.arg("src/Example.java#timestamps")
		.arg("--prepend")
		.arg("span")
		.arg("--append")
		.arg(";")
		.assert()
		.success()
		.stdout("span\n.timestamp(1L)\n.duration(2L)\n;\n");

	Ok(())
}

#[test]
fn include_missing_file_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::docsmith_cmd()
		.arg("include")
		.arg("--path")
		.arg(tmp.path())
		.arg("src/Missing.java")
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("not found or reading it failed"));

	Ok(())
}

#[test]
fn include_uses_config_comment() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "docsmith.toml", "[include]\ncomment = \"#\"\n")?;
	common::write(
		tmp.path(),
		"scripts/setup.py",
		"import os\n## env\nprint(os.environ)\n## env\n",
	)?;

	common::docsmith_cmd()
		.arg("include")
		.arg("--path")
		.arg(tmp.path())
		.arg("scripts/setup.py#env")
		.assert()
		.success()
		.stdout("print(os.environ)\n");

	Ok(())
}
