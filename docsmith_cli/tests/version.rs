mod common;

use docsmith_core::AnyEmptyResult;
use serde_json::Value;

const POM: &str = "<project>\n  <version>0.1-SNAPSHOT</version>\n</project>\n";
const GRADLE: &str = "group = 'io.zipkin'\nversion = '2.24.3'\n";

#[test]
fn version_prints_release_and_short_version() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "build.gradle", GRADLE)?;

	common::docsmith_cmd()
		.arg("version")
		.arg("--path")
		.arg(tmp.path())
		.arg("--file")
		.arg(tmp.path().join("build.gradle"))
		.assert()
		.success()
		.stdout("release: 2.24.3\nversion: 2.24\n");

	Ok(())
}

#[test]
fn version_reads_build_file_from_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "docsmith.toml", "[project]\nbuild_file = \"build.gradle\"\n")?;
	common::write(tmp.path(), "build.gradle", GRADLE)?;

	let output = common::docsmith_cmd()
		.arg("version")
		.arg("--path")
		.arg(tmp.path())
		.arg("--format")
		.arg("json")
		.output()?;

	assert!(output.status.success());
	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["release"], "2.24.3");
	assert_eq!(json["version"], "2.24");

	Ok(())
}

#[test]
fn version_fails_without_release() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "pom.xml", POM)?;

	common::docsmith_cmd()
		.arg("version")
		.arg("--path")
		.arg(tmp.path())
		.arg("--file")
		.arg(tmp.path().join("pom.xml"))
		.assert()
		.failure()
		.code(1)
		.stdout("release: \nversion: \n")
		.stderr(predicates::str::contains("no release found"));

	Ok(())
}

#[test]
fn version_requires_build_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::docsmith_cmd()
		.arg("version")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2)
		.stderr(predicates::str::contains("no build file given"));

	Ok(())
}
