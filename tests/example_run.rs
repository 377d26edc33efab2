//! Integration tests for the `example run` command.
use policysim::cli::RunOpts;
use policysim::cli::example::handle_example_run_command;
use policysim::settings::Settings;
use tempfile::tempdir;

/// An integration test for the `example run` command.
#[test]
fn test_handle_example_run_command() {
    unsafe { std::env::set_var("POLICYSIM_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("thailand_results");
    let opts = RunOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: false,
    };
    handle_example_run_command("thailand", &opts, Some(Settings::default())).unwrap();
    assert!(output_dir.join("summary.csv").is_file());

    // Unknown examples are rejected before anything is run
    assert!(handle_example_run_command("atlantis", &opts, Some(Settings::default())).is_err());
}
