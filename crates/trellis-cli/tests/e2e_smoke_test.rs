use std::{
    fs,
    path::{Path, PathBuf},
};

use log::LevelFilter;
use tempfile::tempdir;

use trellis_cli::Args;

fn demos_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

/// Collects all .nomnoml files from a directory
fn collect_diagram_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("nomnoml")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Args pinned to an empty config file so no local or user configuration
/// leaks into the run.
fn args_for(input: &Path, output: &Path, config: &Path) -> Args {
    Args {
        input: input.to_path_buf(),
        output: Some(output.to_path_buf()),
        config: Some(config.to_path_buf()),
        log_level: LevelFilter::Off,
    }
}

fn empty_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, "").expect("Failed to write config");
    path
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let config = empty_config(temp_dir.path());
    let valid_demos = collect_diagram_files(demos_dir());
    assert!(!valid_demos.is_empty(), "No valid demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_filename = format!("{}.svg", demo_path.file_stem().unwrap().to_string_lossy());
        let output_path = temp_dir.path().join(output_filename);

        match trellis_cli::run(&args_for(demo_path, &output_path, &config)) {
            Ok(()) => {
                let svg = fs::read_to_string(&output_path).expect("Output should be written");
                assert!(svg.starts_with("<svg"), "{} is not SVG", output_path.display());
            }
            Err(err) => failed_demos.push((demo_path.clone(), err)),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nValid demos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid demo(s) failed unexpectedly", failed_demos.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let config = empty_config(temp_dir.path());
    let error_demos = collect_diagram_files(demos_dir().join("errors"));
    assert!(!error_demos.is_empty(), "No error demos found in demos/errors/");

    let mut unexpected_successes = Vec::new();

    for demo_path in &error_demos {
        let output_path = temp_dir.path().join("out.svg");

        if trellis_cli::run(&args_for(demo_path, &output_path, &config)).is_ok() {
            unexpected_successes.push(demo_path.clone());
        }
        assert!(
            !output_path.exists(),
            "{} produced output despite failing",
            demo_path.display()
        );
    }

    if !unexpected_successes.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpected_successes {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpected_successes.len()
        );
    }
}

#[test]
fn e2e_config_file_is_applied() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("diagram.nomnoml");
    let config = temp_dir.path().join("config.toml");
    let output = temp_dir.path().join("diagram.svg");

    fs::write(&input, "[A] -> [B]").unwrap();
    fs::write(&config, "[directives]\nbackground = \"\"\n").unwrap();

    trellis_cli::run(&args_for(&input, &output, &config)).expect("Rendering should succeed");

    let svg = fs::read_to_string(&output).unwrap();
    assert_eq!(svg.matches("class=\"node\"").count(), 2);
    assert_eq!(svg.matches("<rect").count(), 2, "No background rect without a background");
}
