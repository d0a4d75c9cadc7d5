//! Report generation
//!
//! Builds per-recording summaries and query results, and renders them as
//! plain text or JSON.

use crate::config::{OutputFormat, QuerySet};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gaze_core::{GazeDataFile, Recording, TimeUnit};
use serde::Serialize;
use std::fmt::{self, Write};
use std::path::{Path, PathBuf};

/// Report for one data file
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub source: PathBuf,
    pub generated_at: DateTime<Utc>,
    pub recordings: Vec<RecordingReport>,
}

#[derive(Debug, Serialize)]
pub struct RecordingReport {
    pub index: usize,
    pub label: Option<String>,
    pub recorded_at: Option<DateTime<Utc>>,
    pub time_unit: TimeUnit,
    pub n_samples: usize,
    pub n_sac: usize,
    pub n_fix: usize,
    pub n_msg: usize,
    pub mean_sac_dur: Option<f64>,
    pub mean_fix_dur: Option<f64>,
    pub messages: Vec<MessageHit>,
    pub regions: Vec<RegionHit>,
    pub microsaccades: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MessageHit {
    pub pattern: String,
    pub index: usize,
    pub time: f64,
    pub text: String,
    /// Closest sample; absent when the recording has no samples
    pub nearest_sample: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RegionHit {
    pub name: String,
    pub region: String,
    pub fixation_indices: Vec<usize>,
    pub start_times: Vec<f64>,
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

impl RecordingReport {
    pub fn build(index: usize, recording: &Recording, queries: &QuerySet) -> Result<Self> {
        let mut messages = Vec::new();
        for query in &queries.messages {
            let indices = recording
                .find_message_indices(&query.pattern, query.match_mode())
                .with_context(|| format!("Message query {:?} failed", query.pattern))?;
            for i in indices {
                let msg = &recording.msg()[i];
                messages.push(MessageHit {
                    pattern: query.pattern.clone(),
                    index: i,
                    time: msg.time,
                    text: msg.text.clone(),
                    nearest_sample: recording.find_nearest_index_from_message(i).ok(),
                });
            }
        }

        let mut regions = Vec::new();
        for region in &queries.regions {
            let fixation_indices = recording
                .fixation_indices_in_region(&region.query())
                .with_context(|| format!("Region query '{}' failed", region.name))?;
            let start_times = fixation_indices
                .iter()
                .map(|&i| recording.fix()[i].start_time)
                .collect();
            regions.push(RegionHit {
                name: region.name.clone(),
                region: region.region.to_string(),
                fixation_indices,
                start_times,
            });
        }

        let microsaccades = match &queries.microsaccade {
            Some(config) => {
                let mut total = 0;
                for i in 0..recording.n_fix() {
                    total += recording
                        .microsaccades(i, config)
                        .with_context(|| format!("Microsaccade detection failed on fixation {}", i))?
                        .len();
                }
                Some(total)
            }
            None => None,
        };

        Ok(Self {
            index,
            label: recording.label().map(str::to_string),
            recorded_at: recording.recorded_at(),
            time_unit: recording.time_unit(),
            n_samples: recording.samples().len(),
            n_sac: recording.n_sac(),
            n_fix: recording.n_fix(),
            n_msg: recording.n_msg(),
            mean_sac_dur: mean(&recording.sac_dur()),
            mean_fix_dur: mean(&recording.fix_dur()),
            messages,
            regions,
            microsaccades,
        })
    }
}

impl FileReport {
    /// Build the report for `selection` (all recordings when `None`)
    pub fn build(
        source: &Path,
        data: &GazeDataFile,
        selection: Option<&[usize]>,
        queries: &QuerySet,
    ) -> Result<Self> {
        let indices: Vec<usize> = match selection {
            Some(indices) => indices.to_vec(),
            None => (0..data.recordings.len()).collect(),
        };

        let mut recordings = Vec::with_capacity(indices.len());
        for i in indices {
            let recording = data.recording(i)?;
            log::debug!("Building report for recording {} of {:?}", i, source);
            recordings.push(RecordingReport::build(i, recording, queries)?);
        }

        Ok(Self {
            source: source.to_path_buf(),
            generated_at: Utc::now(),
            recordings,
        })
    }

    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Txt => {
                let mut out = String::new();
                self.write_txt(&mut out).context("Failed to format report")?;
                Ok(out)
            }
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize report")
            }
        }
    }

    fn write_txt(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "═══════════════════════════════════════════════")?;
        writeln!(out, "  Gaze Report: {}", self.source.display())?;
        writeln!(out, "  Generated {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(out, "═══════════════════════════════════════════════")?;

        for rec in &self.recordings {
            writeln!(out)?;
            writeln!(
                out,
                "Recording {}{}",
                rec.index,
                rec.label.as_deref().map(|l| format!(" ({})", l)).unwrap_or_default()
            )?;
            if let Some(at) = rec.recorded_at {
                writeln!(out, "  Recorded:   {}", at.format("%Y-%m-%d %H:%M:%S"))?;
            }
            writeln!(out, "  Samples:    {}", rec.n_samples)?;
            writeln!(out, "  Saccades:   {}", rec.n_sac)?;
            writeln!(out, "  Fixations:  {}", rec.n_fix)?;
            writeln!(out, "  Messages:   {}", rec.n_msg)?;
            if let Some(d) = rec.mean_sac_dur {
                writeln!(out, "  Mean saccade duration:  {:.3} {}", d, rec.time_unit)?;
            }
            if let Some(d) = rec.mean_fix_dur {
                writeln!(out, "  Mean fixation duration: {:.3} {}", d, rec.time_unit)?;
            }

            if !rec.messages.is_empty() {
                writeln!(out, "  Message matches:")?;
                for hit in &rec.messages {
                    let sample = hit
                        .nearest_sample
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    writeln!(
                        out,
                        "    [{:>4}] {:>12.3}  sample {:>8}  {}",
                        hit.index, hit.time, sample, hit.text
                    )?;
                }
            }

            for region in &rec.regions {
                writeln!(
                    out,
                    "  Region '{}' {}: {} fixations",
                    region.name,
                    region.region,
                    region.fixation_indices.len()
                )?;
                for (i, t) in region.fixation_indices.iter().zip(&region.start_times) {
                    writeln!(out, "    fix[{:>4}] starts {:.3}", i, t)?;
                }
            }

            if let Some(n) = rec.microsaccades {
                writeln!(out, "  Microsaccades: {}", n)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MessageQueryConfig, RegionQueryConfig};
    use gaze_core::{ContainsMode, FixationEvent, MessageEvent, Point, Region, SampleStream};

    fn data() -> GazeDataFile {
        let recording = Recording::builder()
            .with_label("demo")
            .with_samples(SampleStream::from_times(vec![0.0, 2.0, 4.0, 6.0]).unwrap())
            .add_message(MessageEvent::new(1.9, "stimulus 860"))
            .add_fixation(FixationEvent::new(0.0, 5.0, vec![Point::new(800.0, 500.0)]).unwrap())
            .build()
            .unwrap();
        GazeDataFile::new(vec![recording])
    }

    fn queries() -> QuerySet {
        QuerySet {
            messages: vec![MessageQueryConfig {
                pattern: "stimulus \\d+".to_string(),
                regex: true,
            }],
            regions: vec![RegionQueryConfig {
                name: "center".to_string(),
                region: Region::circle(800.0, 500.0, 200.0).unwrap(),
                period: None,
                mode: ContainsMode::All,
            }],
            microsaccade: None,
        }
    }

    #[test]
    fn test_report_contents() {
        let report = FileReport::build(Path::new("demo.json"), &data(), None, &queries()).unwrap();
        let rec = &report.recordings[0];
        assert_eq!(rec.n_fix, 1);
        assert_eq!(rec.mean_fix_dur, Some(5.0));
        assert_eq!(rec.mean_sac_dur, None);
        assert_eq!(rec.messages.len(), 1);
        assert_eq!(rec.messages[0].nearest_sample, Some(1));
        assert_eq!(rec.regions[0].fixation_indices, vec![0]);
    }

    #[test]
    fn test_render_formats() {
        let report = FileReport::build(Path::new("demo.json"), &data(), Some(&[0]), &queries()).unwrap();

        let txt = report.render(OutputFormat::Txt).unwrap();
        assert!(txt.contains("Recording 0 (demo)"));
        assert!(txt.contains("Region 'center' circle:800,500,200: 1 fixations"));

        let json = report.render(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["recordings"][0]["n_msg"], 1);
    }

    #[test]
    fn test_bad_selection() {
        let result = FileReport::build(Path::new("demo.json"), &data(), Some(&[3]), &queries());
        assert!(result.is_err());
    }
}
