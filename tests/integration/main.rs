//! Integration tests for exoflow

mod cli_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;

    fn exoflow() -> Command {
        Command::cargo_bin("exoflow").unwrap()
    }

    #[test]
    fn help_displays() {
        exoflow()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("whole-exome analysis pipeline driver"));
    }

    #[test]
    fn version_displays() {
        exoflow()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("exoflow"));
    }

    #[test]
    fn run_help_displays_runmode() {
        exoflow()
            .args(["run", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--runmode"));
    }

    #[test]
    fn cache_requires_sif_cache() {
        exoflow().arg("cache").assert().failure();
    }

    #[test]
    fn run_requires_arguments() {
        exoflow().arg("run").assert().failure();
    }

    #[test]
    fn unlock_missing_directory_fails() {
        exoflow()
            .args(["unlock", "--output", "/nonexistent/exoflow-run"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("/nonexistent/exoflow-run"));
    }
}

mod cache_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Seed a minimal pipeline base with an image manifest.
    fn seed_base(root: &Path, manifest: &str) {
        let assets = root.join("assets");
        std::fs::create_dir_all(&assets).unwrap();
        std::fs::write(assets.join("images.json"), manifest).unwrap();
    }

    fn exoflow() -> Command {
        Command::cargo_bin("exoflow").unwrap()
    }

    const TWO_IMAGES: &str =
        r#"{"images":{"a":"docker://x/y:1.0","b":"docker://x/z:2.0"}}"#;

    #[test]
    fn cache_dry_run_reports_missing_images() {
        let temp = TempDir::new().unwrap();
        seed_base(temp.path(), TWO_IMAGES);
        let cache = temp.path().join("sif-cache");

        exoflow()
            .env("EXOFLOW_HOME", temp.path())
            .args(["cache", "--sif-cache"])
            .arg(&cache)
            .arg("--dry-run")
            .assert()
            .success()
            .stderr(predicate::str::contains("docker://x/y:1.0"))
            .stderr(predicate::str::contains("docker://x/z:2.0"))
            .stdout(predicate::str::contains("2 image(s) would be pulled"));

        // Reconciliation created the cache dir but pulled nothing
        assert!(cache.is_dir());
        assert_eq!(std::fs::read_dir(&cache).unwrap().count(), 0);
    }

    #[test]
    fn cache_up_to_date_after_sifs_exist() {
        let temp = TempDir::new().unwrap();
        seed_base(temp.path(), TWO_IMAGES);
        let cache = temp.path().join("sif-cache");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("y_1.0.sif"), b"").unwrap();
        std::fs::write(cache.join("z_2.0.sif"), b"").unwrap();

        exoflow()
            .env("EXOFLOW_HOME", temp.path())
            .args(["cache", "--sif-cache"])
            .arg(&cache)
            .assert()
            .success()
            .stdout(predicate::str::contains("already up to date"));
    }

    #[test]
    fn cache_path_as_file_fails_before_any_mutation() {
        let temp = TempDir::new().unwrap();
        seed_base(temp.path(), TWO_IMAGES);
        let cache_file = temp.path().join("cachefile");
        std::fs::write(&cache_file, b"precious").unwrap();

        exoflow()
            .env("EXOFLOW_HOME", temp.path())
            .args(["cache", "--sif-cache"])
            .arg(&cache_file)
            .assert()
            .failure()
            .stderr(predicate::str::contains("regular file"));

        // The offending file is left untouched
        assert_eq!(std::fs::read(&cache_file).unwrap(), b"precious");
    }

    #[test]
    fn cache_malformed_manifest_is_fatal() {
        let temp = TempDir::new().unwrap();
        seed_base(temp.path(), "{not json");
        let cache = temp.path().join("sif-cache");

        exoflow()
            .env("EXOFLOW_HOME", temp.path())
            .args(["cache", "--sif-cache"])
            .arg(&cache)
            .arg("--dry-run")
            .assert()
            .failure()
            .stderr(predicate::str::contains("images.json"));
    }
}

mod scheduler_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn exoflow() -> Command {
        Command::cargo_bin("exoflow").unwrap()
    }

    /// Seed a pipeline base with an image manifest and a cacher payload.
    fn seed_base(root: &Path, manifest: &str) {
        let assets = root.join("assets");
        std::fs::create_dir_all(&assets).unwrap();
        std::fs::write(assets.join("images.json"), manifest).unwrap();
        let resources = root.join("resources");
        std::fs::create_dir_all(&resources).unwrap();
        std::fs::write(resources.join("cacher"), "#!/bin/sh\n").unwrap();
    }

    /// Drop an executable stand-in for a scheduler or engine binary into
    /// `dir`, which the test prepends to PATH.
    fn fake_command(dir: &Path, name: &str, script: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn shim_path(dir: &Path) -> String {
        format!(
            "{}:{}",
            dir.display(),
            std::env::var("PATH").unwrap_or_default()
        )
    }

    #[test]
    fn submission_failure_carries_scheduler_stderr_verbatim() {
        let temp = TempDir::new().unwrap();
        seed_base(temp.path(), r#"{"images":{"a":"docker://x/y:1.0"}}"#);
        let bin = temp.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        fake_command(
            &bin,
            "sbatch",
            "#!/bin/sh\necho 'sbatch: error: invalid partition' >&2\nexit 1\n",
        );

        exoflow()
            .env("EXOFLOW_HOME", temp.path())
            .env("PATH", shim_path(&bin))
            .args(["cache", "--sif-cache"])
            .arg(temp.path().join("sif-cache"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("sbatch: error: invalid partition"));
    }

    #[test]
    fn submission_success_reports_parsable_job_id() {
        let temp = TempDir::new().unwrap();
        seed_base(temp.path(), r#"{"images":{"a":"docker://x/y:1.0"}}"#);
        let bin = temp.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let argv_log = temp.path().join("sbatch-argv");
        fake_command(
            &bin,
            "sbatch",
            &format!("#!/bin/sh\necho \"$@\" > {}\necho 51234567\n", argv_log.display()),
        );

        exoflow()
            .env("EXOFLOW_HOME", temp.path())
            .env("PATH", shim_path(&bin))
            .args(["cache", "--sif-cache"])
            .arg(temp.path().join("sif-cache"))
            .assert()
            .success()
            .stdout(predicate::str::contains("51234567"));

        let argv = std::fs::read_to_string(&argv_log).unwrap();
        assert!(argv.contains("--parsable"));
        assert!(argv.contains("-i docker://x/y:1.0"));
    }

    #[test]
    fn unlock_is_idempotent_when_no_lock_exists() {
        let temp = TempDir::new().unwrap();
        let run_dir = temp.path().join("run");
        std::fs::create_dir_all(&run_dir).unwrap();
        let bin = temp.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        // The engine exits 0 whether or not a lock existed
        fake_command(&bin, "snakemake", "#!/bin/sh\nexit 0\n");

        for _ in 0..2 {
            exoflow()
                .env("PATH", shim_path(&bin))
                .args(["unlock", "--output"])
                .arg(&run_dir)
                .assert()
                .success()
                .stdout(predicate::str::contains("Unlocked"));
        }
    }
}

mod run_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn exoflow() -> Command {
        Command::cargo_bin("exoflow").unwrap()
    }

    /// Seed a pipeline base with one genome configuration.
    fn seed_base(root: &Path) {
        let genomes = root.join("assets").join("genomes").join("generic");
        std::fs::create_dir_all(&genomes).unwrap();
        let targets = root.join("targets.bed");
        std::fs::write(&targets, "chr1\t1\t100\n").unwrap();
        std::fs::write(
            genomes.join("hg38.json"),
            format!(r#"{{"targets":"{}"}}"#, targets.display()),
        )
        .unwrap();
    }

    #[test]
    fn run_init_creates_resolved_config() {
        let temp = TempDir::new().unwrap();
        seed_base(temp.path());
        let input = temp.path().join("s1.R1.fastq.gz");
        std::fs::write(&input, b"@read").unwrap();
        let run_dir = temp.path().join("run");

        exoflow()
            .env("EXOFLOW_HOME", temp.path())
            .args(["run", "--runmode", "init"])
            .arg("--input")
            .arg(&input)
            .arg("--output")
            .arg(&run_dir)
            .args(["--genome", "hg38"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Initialized run directory"));

        assert!(run_dir.join("config.json").is_file());
        assert!(run_dir.join("fastqs").join("s1.R1.fastq.gz").exists());
    }

    #[test]
    fn run_init_unknown_genome_lists_available() {
        let temp = TempDir::new().unwrap();
        seed_base(temp.path());
        let input = temp.path().join("s1.R1.fastq.gz");
        std::fs::write(&input, b"@read").unwrap();

        exoflow()
            .env("EXOFLOW_HOME", temp.path())
            .args(["run", "--runmode", "init"])
            .arg("--input")
            .arg(&input)
            .arg("--output")
            .arg(temp.path().join("run"))
            .args(["--genome", "hg19"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("hg38"));
    }

    #[test]
    fn run_dryrun_requires_initialized_directory() {
        let temp = TempDir::new().unwrap();
        seed_base(temp.path());
        let input = temp.path().join("s1.R1.fastq.gz");
        std::fs::write(&input, b"@read").unwrap();
        let run_dir = temp.path().join("uninitialized");
        std::fs::create_dir_all(&run_dir).unwrap();

        exoflow()
            .env("EXOFLOW_HOME", temp.path())
            .args(["run", "--runmode", "dryrun"])
            .arg("--input")
            .arg(&input)
            .arg("--output")
            .arg(&run_dir)
            .args(["--genome", "hg38"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not initialized"));
    }
}
