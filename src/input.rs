//! Common routines for handling input data.
use anyhow::{Context, Result, ensure};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Check that a value is finite and not negative
pub fn check_non_negative(value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "Value must be a finite number greater than or equal to zero"
    );

    Ok(())
}

/// Check that a value is finite and greater than zero
pub fn check_positive(value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "Value must be a finite number greater than zero"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Record {
        name: String,
        value: f64,
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "name = \"hello\"\nvalue = 1.5").unwrap();
        }

        assert_eq!(
            read_toml::<Record>(&file_path).unwrap(),
            Record {
                name: "hello".to_string(),
                value: 1.5
            }
        );

        // Missing file
        let missing = dir.path().join("missing.toml");
        assert!(read_toml::<Record>(&missing).is_err());
    }

    #[test]
    fn test_read_toml_invalid() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "name = \"hello\"\nvalue = \"one\"").unwrap();
        }

        let err = read_toml::<Record>(&file_path).unwrap_err();
        assert_eq!(err.to_string(), input_err_msg(&file_path));
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(1.0, true)]
    #[case(-1e-10, false)]
    #[case(f64::INFINITY, false)]
    #[case(f64::NAN, false)]
    fn test_check_non_negative(#[case] value: f64, #[case] expected_valid: bool) {
        assert_eq!(check_non_negative(value).is_ok(), expected_valid);
    }

    #[rstest]
    #[case(1e-10, true)]
    #[case(0.0, false)]
    #[case(-1.0, false)]
    #[case(f64::NAN, false)]
    fn test_check_positive(#[case] value: f64, #[case] expected_valid: bool) {
        assert_eq!(check_positive(value).is_ok(), expected_valid);
    }
}
