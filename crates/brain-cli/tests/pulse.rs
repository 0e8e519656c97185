use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

#[test]
fn pulse_estimate_reports_bpm() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("brain");
    cmd.args([
        "pulse-estimate",
        "--input",
        &sample_path("test_data/pulse_72bpm.csv"),
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let actual: Value = serde_json::from_slice(&output)?;

    assert_eq!(actual["sample_count"].as_u64(), Some(360));
    assert_eq!(actual["detection"]["pass"].as_str(), Some("primary"));
    let bpm = actual["bpm"].as_f64().expect("bpm present");
    assert!((bpm - 72.0).abs() < 1.0, "bpm {}", bpm);
    Ok(())
}

#[test]
fn short_recording_has_no_estimate() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("brain");
    cmd.args([
        "pulse-estimate",
        "--input",
        &sample_path("test_data/pulse_short.csv"),
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let actual: Value = serde_json::from_slice(&output)?;

    assert_eq!(actual["sample_count"].as_u64(), Some(20));
    assert!(actual["detection"].is_null());
    assert!(actual["bpm"].is_null());
    Ok(())
}

#[test]
fn config_can_raise_minimum_sample_count() -> Result<(), Box<dyn Error>> {
    let mut config = tempfile::NamedTempFile::new()?;
    writeln!(config, "[pulse]\nmin_samples = 400")?;

    let mut cmd = cargo_bin_cmd!("brain");
    cmd.args([
        "--config",
        config.path().to_str().expect("utf8 path"),
        "pulse-estimate",
        "--input",
        &sample_path("test_data/pulse_72bpm.csv"),
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let actual: Value = serde_json::from_slice(&output)?;
    assert!(actual["bpm"].is_null());
    Ok(())
}

#[test]
fn invalid_config_fails() -> Result<(), Box<dyn Error>> {
    let mut config = tempfile::NamedTempFile::new()?;
    writeln!(config, "[pulse]\nprimary_threshold = 0.1\nfallback_threshold = 0.5")?;

    let mut cmd = cargo_bin_cmd!("brain");
    cmd.args([
        "--config",
        config.path().to_str().expect("utf8 path"),
        "pulse-estimate",
        "--input",
        &sample_path("test_data/pulse_72bpm.csv"),
    ]);
    cmd.assert().failure();
    Ok(())
}

#[test]
fn rate_from_peaks_applies_bounds() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("brain");
    cmd.args([
        "rate-from-peaks",
        "--input",
        &sample_path("test_data/peaks_60bpm.txt"),
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let actual: Value = serde_json::from_slice(&output)?;
    assert_eq!(actual["peaks"].as_u64(), Some(3));
    assert_eq!(actual["bpm"].as_f64(), Some(60.0));

    let mut cmd = cargo_bin_cmd!("brain");
    cmd.args([
        "rate-from-peaks",
        "--input",
        &sample_path("test_data/peaks_250bpm.txt"),
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let actual: Value = serde_json::from_slice(&output)?;
    assert!(actual["bpm"].is_null());
    Ok(())
}

fn sample_path(relative: &str) -> String {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join(relative);
    root.to_string_lossy().to_string()
}
