use crate::{roi::FaceBox, session::Observation, signal::TimedSample};
use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::path::Path;

/// Read a two-column `timestamp,value` CSV into samples.
pub fn read_timed_samples(
    path: &Path,
    time_col: &str,
    value_col: &str,
) -> Result<Vec<TimedSample>> {
    let mut reader = open(path)?;
    let headers = reader.headers().context("reading header")?.clone();
    let t_idx = locate_column(&headers, time_col, "timestamp")?;
    let v_idx = locate_column(&headers, value_col, "value")?;

    let mut samples = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading record {}", row + 1))?;
        let t = required_f64(&record, t_idx)
            .with_context(|| format!("row {}: timestamp", row + 1))?;
        let v = required_f64(&record, v_idx)
            .with_context(|| format!("row {}: {}", row + 1, value_col))?;
        samples.push(TimedSample::new(t, v));
    }
    Ok(samples)
}

/// Read a per-frame recording with `t`, `green` and `ear` columns.
///
/// Blank `green`/`ear` cells mean the value was unavailable for that frame.
/// Optional `face_x`, `face_y`, `face_w`, `face_h`, `frame_w`, `frame_h`
/// columns carry the detector box for the focus heuristic.
pub fn read_recording(path: &Path) -> Result<Vec<Observation>> {
    let mut reader = open(path)?;
    let headers = reader.headers().context("reading header")?.clone();
    let t_idx = locate_column(&headers, "t", "timestamp")?;
    let green_idx = locate_column(&headers, "green", "green mean")?;
    let ear_idx = locate_column(&headers, "ear", "eye aspect ratio")?;
    let face_idx: Option<[usize; 4]> = ["face_x", "face_y", "face_w", "face_h"]
        .iter()
        .map(|col| locate_column(&headers, col, "face box").ok())
        .collect::<Option<Vec<_>>>()
        .map(|v| [v[0], v[1], v[2], v[3]]);
    let frame_idx = locate_column(&headers, "frame_w", "frame width")
        .ok()
        .zip(locate_column(&headers, "frame_h", "frame height").ok());

    let mut observations = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("reading record {}", row + 1))?;
        let mut obs = Observation::at(
            required_f64(&record, t_idx).with_context(|| format!("row {}: t", row + 1))?,
        );
        obs.green = optional_f64(&record, green_idx)
            .with_context(|| format!("row {}: green", row + 1))?;
        obs.eye_ratio = optional_f64(&record, ear_idx)
            .with_context(|| format!("row {}: ear", row + 1))?;
        if let Some(idx) = face_idx {
            let values = idx
                .iter()
                .map(|&i| optional_f64(&record, i))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("row {}: face box", row + 1))?;
            if let &[Some(x), Some(y), Some(w), Some(h)] = values.as_slice() {
                obs.face = Some(FaceBox::new(x, y, w, h));
            }
        }
        if let Some((w_idx, h_idx)) = frame_idx {
            let w = optional_f64(&record, w_idx)?;
            let h = optional_f64(&record, h_idx)?;
            obs.frame_size = w.zip(h).map(|(w, h)| (w as u32, h as u32));
        }
        observations.push(obs);
    }
    Ok(observations)
}

fn open(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(file))
}

fn locate_column(headers: &StringRecord, requested: &str, hint: &str) -> Result<usize> {
    headers
        .iter()
        .position(|name| name.eq_ignore_ascii_case(requested))
        .ok_or_else(|| anyhow!("missing {} column ({})", hint, requested))
}

fn required_f64(record: &StringRecord, idx: usize) -> Result<f64> {
    optional_f64(record, idx)?.ok_or_else(|| anyhow!("empty cell"))
}

fn optional_f64(record: &StringRecord, idx: usize) -> Result<Option<f64>> {
    match record.get(idx).map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse::<f64>()
            .map(Some)
            .with_context(|| format!("not a number: {}", text)),
    }
}
