#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const IR: &str = r#"{"version":1,"types":[]}"#;

/// A project dir with a config, an IR file and fake tools.
struct Fixture {
    tmp: TempDir,
    generator: PathBuf,
    compiler: PathBuf,
}

impl Fixture {
    fn new(config: &str) -> Self {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("conjure-plugin.yml"), config).unwrap();
        fs::write(tmp.path().join("api.json"), IR).unwrap();
        fs::create_dir_all(tmp.path().join("conjure")).unwrap();
        fs::write(tmp.path().join("conjure/api.yml"), "types: {}\n").unwrap();

        let generator = script(
            tmp.path(),
            "fake-generator",
            r#"[ "$1" = generate ] || exit 9
mkdir -p "$3/pkg"
cp "$2" "$3/pkg/ir.conjure.json"
echo "package api" > "$3/api.conjure.go"
"#,
        );
        let compiler = script(
            tmp.path(),
            "fake-conjure",
            &format!("[ \"$1\" = compile ] || exit 9\necho '{IR}' > \"$3\"\n"),
        );
        Self {
            tmp,
            generator,
            compiler,
        }
    }

    fn dir(&self) -> &Path {
        self.tmp.path()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("conjure-plugin"));
        cmd.arg("--project-dir")
            .arg(self.dir())
            .arg("--generator")
            .arg(&self.generator)
            .arg("--conjure")
            .arg(&self.compiler)
            .env_remove("RUST_LOG");
        cmd
    }
}

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

const SINGLE: &str = r#"version: 2
projects:
  api:
    output-dir: gen/api
    ir-locator: api.json
    group-id: com.example
    extensions:
      team: platform
"#;

#[test]
fn generate_then_verify_is_clean() {
    let fx = Fixture::new(SINGLE);
    fx.cmd()
        .arg("generate")
        .assert()
        .success()
        .stdout(contains("'api' generated (2 written"));
    assert_eq!(
        fs::read_to_string(fx.dir().join("gen/api/pkg/ir.conjure.json")).unwrap(),
        IR
    );

    fx.cmd()
        .args(["generate", "--verify"])
        .assert()
        .success()
        .stdout(contains("up to date"));

    fx.cmd()
        .arg("generate")
        .assert()
        .success()
        .stdout(contains("'api' up to date (2 unchanged)"));
}

#[test]
fn verify_reports_differences_and_fails_without_writing() {
    let fx = Fixture::new(SINGLE);
    fx.cmd().arg("generate").assert().success();
    fs::write(fx.dir().join("gen/api/api.conjure.go"), "edited\n").unwrap();
    fs::write(fx.dir().join("gen/api/old.conjure.go"), "stale\n").unwrap();
    fs::write(fx.dir().join("gen/api/handwritten.go"), "keep\n").unwrap();

    fx.cmd()
        .args(["generate", "--verify"])
        .assert()
        .failure()
        .stdout(contains("  api:"))
        .stdout(contains("    api.conjure.go: checksum changed from"))
        .stdout(contains("    old.conjure.go: existed before, no longer exists"))
        .stdout(contains("handwritten.go").not());

    assert_eq!(
        fs::read_to_string(fx.dir().join("gen/api/api.conjure.go")).unwrap(),
        "edited\n"
    );

    fx.cmd().arg("generate").assert().success();
    assert!(!fx.dir().join("gen/api/old.conjure.go").exists());
    assert!(fx.dir().join("gen/api/handwritten.go").exists());
    fx.cmd().args(["generate", "--verify"]).assert().success();
}

#[test]
fn unknown_project_is_rejected() {
    let fx = Fixture::new(SINGLE);
    fx.cmd()
        .args(["generate", "nope"])
        .assert()
        .failure()
        .stderr(contains("unknown project 'nope'"));
}

#[test]
fn conflicting_output_dirs_fail_before_generation() {
    let fx = Fixture::new(
        r#"version: 2
projects:
  api:
    output-dir: gen/shared
    ir-locator: api.json
  backend:
    output-dir: gen/shared
    ir-locator: api.json
"#,
    );
    fx.cmd()
        .arg("generate")
        .assert()
        .failure()
        .stderr(contains("api").and(contains("backend")));
    assert!(!fx.dir().join("gen").exists());
}

#[test]
fn relative_and_absolute_output_dirs_conflict_without_project_dir() {
    let fx = Fixture::new(SINGLE);
    let absolute = fs::canonicalize(fx.dir()).unwrap().join("gen/shared");
    fs::write(
        fx.dir().join("conjure-plugin.yml"),
        format!(
            "version: 2\nprojects:\n  api:\n    output-dir: gen/shared\n    ir-locator: api.json\n  backend:\n    output-dir: {}\n    ir-locator: api.json\n",
            absolute.display()
        ),
    )
    .unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("conjure-plugin"))
        .current_dir(fx.dir())
        .arg("--generator")
        .arg(&fx.generator)
        .arg("--conjure")
        .arg(&fx.compiler)
        .env_remove("RUST_LOG")
        .arg("generate")
        .assert()
        .failure()
        .stderr(contains("api").and(contains("backend")));
    assert!(!fx.dir().join("gen").exists());
}

#[test]
fn misspelled_config_key_is_rejected() {
    let fx = Fixture::new(
        r#"version: 2
projects:
  api:
    output-dir: gen/api
    ir-locator: api.json
    skip-delete-generated-file: true
"#,
    );
    fx.cmd()
        .arg("generate")
        .assert()
        .failure()
        .stderr(contains("skip-delete-generated-file"));
    assert!(!fx.dir().join("gen").exists());
}

#[test]
fn unknown_asset_type_fails_before_any_project_runs() {
    let fx = Fixture::new(SINGLE);
    let asset = script(fx.dir(), "odd-asset", "echo '{\"type\":\"unknown-type\"}'\n");
    fx.cmd()
        .arg("--assets")
        .arg(&asset)
        .arg("generate")
        .assert()
        .failure()
        .stderr(contains("unknown-type"));
    assert!(!fx.dir().join("gen").exists());
}

#[test]
fn ir_prints_ir_with_static_extensions() {
    let fx = Fixture::new(SINGLE);
    let output = fx.cmd().args(["ir", "api"]).output().unwrap();
    assert!(output.status.success(), "{output:?}");
    let ir: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(ir["extensions"]["team"], "platform");
    assert_eq!(ir["version"], 1);
}

const YAML_PROJECTS: &str = r#"version: 2
projects:
  api:
    output-dir: gen/api
    ir-locator: conjure/api.yml
    group-id: com.example
  prebuilt:
    output-dir: gen/prebuilt
    ir-locator: api.json
    group-id: com.example
"#;

fn backcompat_asset(dir: &Path, check_exit: i32) -> PathBuf {
    script(
        dir,
        "backcompat-asset",
        &format!(
            r#"case "$1" in
  conjure-plugin-asset-type) echo '{{"type":"backcompat"}}' ;;
  *checkBackCompat*) echo "INCOMPATIBLE: type Foo removed"; exit {check_exit} ;;
  *acceptBackCompatBreaks*) echo accepted >> "{log}"; exit 0 ;;
  *) exit 7 ;;
esac
"#,
            log = dir.join("accepted.log").display()
        ),
    )
}

#[test]
fn incompatible_check_prints_asset_output_and_hint() {
    let fx = Fixture::new(YAML_PROJECTS);
    let asset = backcompat_asset(fx.dir(), 1);
    fx.cmd()
        .arg("--assets")
        .arg(&asset)
        .arg("check-backcompat")
        .assert()
        .failure()
        .stdout(contains("INCOMPATIBLE: type Foo removed"))
        .stdout(contains("conjure-plugin accept-backcompat-breaks api"))
        .stdout(contains("prebuilt").not())
        .stderr(contains("backcompat check failed for 1 project(s): api"));
}

#[test]
fn compatible_check_and_accept_succeed() {
    let fx = Fixture::new(YAML_PROJECTS);
    let asset = backcompat_asset(fx.dir(), 0);
    fx.cmd()
        .arg("--assets")
        .arg(&asset)
        .arg("check-backcompat")
        .assert()
        .success()
        .stdout(contains("'api' is backwards compatible"));

    fx.cmd()
        .arg("--assets")
        .arg(&asset)
        .args(["accept-backcompat-breaks", "api"])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(fx.dir().join("accepted.log")).unwrap(),
        "accepted\n"
    );
}

#[test]
fn asset_crash_is_an_error_not_incompatibility() {
    let fx = Fixture::new(YAML_PROJECTS);
    let asset = backcompat_asset(fx.dir(), 2);
    fx.cmd()
        .arg("--assets")
        .arg(&asset)
        .arg("check-backcompat")
        .assert()
        .failure()
        .stdout(contains("accept-backcompat-breaks").not())
        .stderr(contains("error:"));
}

#[test]
fn publish_dry_run_lists_uploads() {
    if Command::new("git").arg("--version").output().is_err() {
        eprintln!("git not available; skipping");
        return;
    }
    let fx = Fixture::new(
        r#"version: 2
projects:
  api:
    output-dir: gen/api
    ir-locator: api.json
    group-id: com.example
    publish: true
  internal:
    output-dir: gen/internal
    ir-locator: api.json
    group-id: com.example
"#,
    );
    let git = |args: &[&str]| {
        let ok = Command::new("git")
            .args(["-c", "user.name=test", "-c", "user.email=test@example.com"])
            .args(["-c", "commit.gpgsign=false", "-c", "tag.gpgsign=false"])
            .args(args)
            .current_dir(fx.dir())
            .output()
            .unwrap()
            .status
            .success();
        assert!(ok, "git {args:?}");
    };
    git(&["init", "-q"]);
    git(&["add", "-A"]);
    git(&["commit", "-q", "-m", "init"]);
    git(&["tag", "v3.1.0"]);

    fx.cmd()
        .args(["publish", "--url", "http://127.0.0.1:9/repo", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("[dry-run] ✓ 'api' com/example/api/3.1.0"))
        .stdout(contains(
            "http://127.0.0.1:9/repo/com/example/api/3.1.0/api-3.1.0.conjure.json",
        ))
        .stdout(contains("internal").not());
}
