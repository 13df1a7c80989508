mod common;

use docsmith_core::AnyEmptyResult;

const CONFIG: &str = "\
[project]
name = \"zipkin\"
build_file = \"build.gradle\"

[docs]
theme = \"sphinx_rtd_theme\"

[site]
pages = [\"index\", \"quickstart\"]
header = \"templates/header.html\"
footer = \"templates/footer.html\"

[site.renames]
quickstart = \"getting-started\"
";

fn setup(root: &std::path::Path) -> std::io::Result<()> {
	common::write(root, "docsmith.toml", CONFIG)?;
	common::write(root, "build.gradle", "version = '2.24.3'\n")?;
	common::write(
		root,
		"templates/header.html",
		"<html class=\"{{ theme }}\"><title>{{ project }} {{ version }} {{ page }}</title><body>\n",
	)?;
	common::write(root, "templates/footer.html", "</body></html>\n")?;
	common::write(root, "doc/index.md", "# Zipkin\n")?;
	common::write(root, "doc/quickstart.md", "Run *it*.\n")
}

#[test]
fn site_renders_pages_between_header_and_footer() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;

	common::docsmith_cmd()
		.arg("site")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Generated 2 page(s)."));

	let index = std::fs::read_to_string(tmp.path().join("site/index.html"))?;
	assert!(index.starts_with(
		"<html class=\"sphinx_rtd_theme\"><title>zipkin 2.24 index</title><body>\n<h1>Zipkin</h1>"
	));
	assert!(index.ends_with("</body></html>\n"));

	let quickstart = std::fs::read_to_string(tmp.path().join("site/getting-started.html"))?;
	assert!(quickstart.contains("<p>Run <em>it</em>.</p>"));
	assert!(!tmp.path().join("site/quickstart.html").exists());

	Ok(())
}

#[test]
fn site_continues_after_failed_page() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;
	std::fs::remove_file(tmp.path().join("doc/index.md"))?;

	common::docsmith_cmd()
		.arg("site")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(1)
		.stderr(predicates::str::contains("page `index` failed"));

	assert!(tmp.path().join("site/getting-started.html").is_file());

	Ok(())
}

#[test]
fn site_requires_pages() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::docsmith_cmd()
		.arg("site")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.code(2);

	Ok(())
}

#[test]
fn site_remote_requires_url() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	setup(tmp.path())?;

	common::docsmith_cmd()
		.arg("site")
		.arg("--path")
		.arg(tmp.path())
		.arg("--remote")
		.assert()
		.failure()
		.code(2);

	Ok(())
}
