//! Integration tests for the `run` command.
use policysim::cli::{RunOpts, handle_run_command};
use policysim::settings::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the default example model.
fn get_model_dir() -> PathBuf {
    PathBuf::from("demos/default")
}

fn run_opts(output_dir: PathBuf) -> RunOpts {
    RunOpts {
        output_dir: Some(output_dir),
        overwrite: false,
    }
}

/// An integration test for the `run` command.
#[test]
fn test_handle_run_command() {
    unsafe { std::env::set_var("POLICYSIM_LOG_LEVEL", "off") };

    {
        // Save results to non-existent directory to check that directory creation works
        let tempdir = tempdir().unwrap();
        let output_dir = tempdir.path().join("results");
        handle_run_command(
            &get_model_dir(),
            &run_opts(output_dir.clone()),
            Some(Settings::default()),
        )
        .unwrap();

        for file_name in [
            "summary.csv",
            "mode_shares.csv",
            "emissions_by_mode.csv",
            "costs_by_mode.csv",
            "burden_by_income.csv",
            "travel_time_by_mode.csv",
            "best_performers.csv",
            "metadata.toml",
        ] {
            assert!(output_dir.join(file_name).is_file(), "{file_name} missing");
        }

        // Header plus one line per scenario
        let summary = fs::read_to_string(output_dir.join("summary.csv")).unwrap();
        assert_eq!(summary.lines().count(), 6);
        assert!(summary.lines().nth(1).unwrap().starts_with("baseline,66.7,"));

        // One line per metric
        let best = fs::read_to_string(output_dir.join("best_performers.csv")).unwrap();
        assert_eq!(best.lines().next().unwrap(), "metric,scenario");
        assert_eq!(best.lines().count(), 6);
        assert!(best.lines().any(|line| line == "emissions,green_transport"));
    }

    // Second time will fail because the logging is already initialised
    let tempdir = tempdir().unwrap();
    assert_eq!(
        handle_run_command(
            &get_model_dir(),
            &run_opts(tempdir.path().join("results")),
            Some(Settings::default())
        )
        .unwrap_err()
        .chain()
        .next()
        .unwrap()
        .to_string(),
        "Failed to initialise logging."
    );
}
