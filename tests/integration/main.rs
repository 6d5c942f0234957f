//! Integration tests for depot

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn depot() -> Command {
        cargo_bin_cmd!("depot")
    }

    #[test]
    fn help_displays() {
        depot()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "source dependency fetch-and-build orchestrator",
            ));
    }

    #[test]
    fn version_displays() {
        depot()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("depot"));
    }

    #[test]
    fn sync_help() {
        depot()
            .args(["sync", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Fetch and build"));
    }

    #[test]
    fn init_creates_manifest() {
        let temp = TempDir::new().unwrap();
        depot()
            .current_dir(temp.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("depot.toml"));

        assert!(temp.path().join("depot.toml").exists());
    }

    #[test]
    fn init_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("depot.toml"), "deps = []\n").unwrap();

        depot()
            .current_dir(temp.path())
            .arg("init")
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn missing_manifest_hints_init() {
        let temp = TempDir::new().unwrap();
        depot()
            .current_dir(temp.path())
            .env("DEPOT_CONFIG", temp.path().join("no-global.toml"))
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Manifest file not found"))
            .stderr(predicate::str::contains("depot init"));
    }

    #[test]
    fn status_on_empty_manifest() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("depot.toml"), "deps = []\n").unwrap();

        depot()
            .current_dir(temp.path())
            .env("DEPOT_CONFIG", temp.path().join("no-global.toml"))
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("No dependencies declared"));
    }

    #[test]
    fn status_reports_unfetched_dependency() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("depot.toml"),
            "deps = [\"fmtlib/fmt\"]\n",
        )
        .unwrap();

        depot()
            .current_dir(temp.path())
            .env("DEPOT_CONFIG", temp.path().join("no-global.toml"))
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("fmtlib/fmt"))
            .stdout(predicate::str::contains("not fetched"));
    }

    #[test]
    fn sync_on_empty_manifest() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("depot.toml"), "deps = []\n").unwrap();

        depot()
            .current_dir(temp.path())
            .env("DEPOT_CONFIG", temp.path().join("no-global.toml"))
            .arg("sync")
            .assert()
            .success()
            .stdout(predicate::str::contains("No dependencies declared"));
    }

    #[test]
    fn sync_rejects_malformed_record() {
        let temp = TempDir::new().unwrap();
        // A record with no url, no shorthand, and no build table
        std::fs::write(temp.path().join("depot.toml"), "deps = [{ hash = \"abc\" }]\n").unwrap();

        depot()
            .current_dir(temp.path())
            .env("DEPOT_CONFIG", temp.path().join("no-global.toml"))
            .arg("sync")
            .assert()
            .failure()
            .stderr(predicate::str::contains("dependency #1"));
    }

    #[test]
    fn sync_rejects_unknown_build_system() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("depot.toml"),
            "deps = [{ build = { system = \"bazel\" } }]\n",
        )
        .unwrap();

        depot()
            .current_dir(temp.path())
            .env("DEPOT_CONFIG", temp.path().join("no-global.toml"))
            .arg("sync")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unsupported build system"))
            .stderr(predicate::str::contains("cmake, make, meson"));
    }
}
