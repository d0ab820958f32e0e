//! Replay report generation
//!
//! TXT reports list only the frames where the derived state changed, plus a
//! summary. JSON reports carry every frame.

use crate::replay::{Replay, TickRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{self, Write};
use ui_state::{LongitudinalPersonality, UiConfig, UiStatus};

/// Output format for the replay report
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Txt,
    Json,
}

/// Aggregate numbers over a replay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub frames: usize,
    pub onroad_frames: usize,
    pub onroad_transitions: usize,
    pub engaged_frames: usize,
    pub override_frames: usize,
    pub interaction_timeouts: usize,
}

impl Summary {
    pub fn from_records(records: &[TickRecord]) -> Self {
        let mut summary = Summary {
            frames: records.len(),
            ..Summary::default()
        };
        let mut prev_started = false;
        for r in records {
            if r.started {
                summary.onroad_frames += 1;
                if !prev_started {
                    summary.onroad_transitions += 1;
                }
            }
            if r.engaged {
                summary.engaged_frames += 1;
            }
            if r.started && r.status == UiStatus::Override {
                summary.override_frames += 1;
            }
            if r.timeout_fired {
                summary.interaction_timeouts += 1;
            }
            prev_started = r.started;
        }
        summary
    }
}

/// Complete replay report
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub scenario: String,
    pub generated_at: DateTime<Utc>,
    pub ui_state_version: String,
    pub config: UiConfig,
    pub is_metric: bool,
    pub personality: LongitudinalPersonality,
    pub summary: Summary,
    pub frames: Vec<TickRecord>,
}

impl Report {
    pub fn new(scenario: impl Into<String>, config: UiConfig, replay: Replay) -> Self {
        Self {
            scenario: scenario.into(),
            generated_at: Utc::now(),
            ui_state_version: ui_state::VERSION.to_string(),
            config,
            is_metric: replay.is_metric,
            personality: replay.personality,
            summary: Summary::from_records(&replay.frames),
            frames: replay.frames,
        }
    }

    /// Render in the requested format
    pub fn render(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Txt => Ok(self.to_txt()?),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    fn to_txt(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        writeln!(out, "═══════════════════════════════════════════════")?;
        writeln!(out, "  UI State Replay - {}", self.scenario)?;
        writeln!(out, "═══════════════════════════════════════════════")?;
        writeln!(
            out,
            "Generated: {}  (ui-state v{}, {} fps)",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.ui_state_version,
            self.config.fps
        )?;
        writeln!(
            out,
            "Units: {}  Personality: {}\n",
            if self.is_metric { "metric" } else { "imperial" },
            self.personality
        )?;

        writeln!(
            out,
            "{:>7} {:>9} {:>5} {:>7} {:>11} {:>6} {:>10} {:>7} {:>7}",
            "frame", "t(ms)", "ign", "onroad", "panda", "light", "status", "engaged", "timeout"
        )?;
        writeln!(out, "{}", "─".repeat(79))?;

        let mut prev: Option<&TickRecord> = None;
        for r in &self.frames {
            if prev.map_or(true, |p| r.differs_from(p)) {
                writeln!(
                    out,
                    "{:>7} {:>9} {:>5} {:>7} {:>11} {:>6.1} {:>10} {:>7} {:>7}",
                    r.frame,
                    r.elapsed_ms,
                    r.ignition,
                    r.started,
                    r.panda_type.to_string(),
                    r.light_sensor,
                    r.status.to_string(),
                    r.engaged,
                    if r.timeout_fired { "fired" } else { "" }
                )?;
            }
            prev = Some(r);
        }

        let s = &self.summary;
        writeln!(out, "\nSummary:")?;
        writeln!(out, "  Frames:               {}", s.frames)?;
        writeln!(out, "  Onroad frames:        {}", s.onroad_frames)?;
        writeln!(out, "  Onroad transitions:   {}", s.onroad_transitions)?;
        writeln!(out, "  Engaged frames:       {}", s.engaged_frames)?;
        writeln!(out, "  Override frames:      {}", s.override_frames)?;
        writeln!(out, "  Interaction timeouts: {}", s.interaction_timeouts)?;
        Ok(out)
    }
}
