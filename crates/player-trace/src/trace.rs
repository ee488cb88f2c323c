//! Headless run of the motion/sync loop against an arena scene

use player_core::{
    FixedStepClock, MotionSyncLoop, NodeId, OverlayPlane, SceneConfig, SceneError, SceneStore,
    Transform, ViewportSize,
};
use serde::Serialize;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output encoding for trace records
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per line
    Json,
    Csv,
}

/// Everything a trace run needs besides the scene config
#[derive(Debug, Clone)]
pub struct Scenario {
    pub frames: u32,
    pub delta: f32,
    /// Pointer position in CSS pixels, applied before the first frame
    pub pointer: Option<(f32, f32)>,
    pub viewport: ViewportSize,
    /// Frames to run before the model (and its anchor) finish loading
    pub load_after: u32,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            frames: 120,
            delta: 1.0 / 60.0,
            pointer: None,
            viewport: ViewportSize::new(1280.0, 720.0, 1.0),
            load_after: 0,
        }
    }
}

/// One line of the trace
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceRecord {
    pub frame: u32,
    pub time: f32,
    pub camera: [f32; 3],
    pub bob: Option<f32>,
    pub yaw: Option<f32>,
    pub overlay: Option<[f32; 3]>,
    pub synced: bool,
    pub noise_time: f32,
}

impl TraceRecord {
    pub const CSV_HEADER: &'static str =
        "frame,time,camera_x,camera_y,camera_z,bob,yaw,overlay_x,overlay_y,overlay_z,synced,noise_time";

    pub fn to_csv(&self) -> String {
        let opt = |v: Option<f32>| v.map(|v| v.to_string()).unwrap_or_default();
        let overlay = self.overlay.map(|o| o.map(Some)).unwrap_or([None; 3]);
        format!(
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            self.frame,
            self.time,
            self.camera[0],
            self.camera[1],
            self.camera[2],
            opt(self.bob),
            opt(self.yaw),
            opt(overlay[0]),
            opt(overlay[1]),
            opt(overlay[2]),
            self.synced,
            self.noise_time
        )
    }
}

/// Nodes of the stand-in player model: root, body and the tagged screen
fn spawn_model(store: &mut SceneStore, anchor_tag: &str) -> Result<NodeId, SceneError> {
    let root = store.spawn("player", None, Transform::IDENTITY)?;
    let body = store.spawn("body", Some(root), Transform::from_xyz(0.0, 1.0, 0.0))?;
    let screen = store.spawn("screen", Some(body), Transform::from_xyz(0.0, 0.35, 0.12))?;
    store.set_tag(screen, anchor_tag)?;
    Ok(root)
}

/// Run the scenario and collect one record per frame
pub fn run(config: &SceneConfig, scenario: &Scenario) -> Result<Vec<TraceRecord>, TraceError> {
    let mut store = SceneStore::new();
    let camera = store.spawn("camera", None, Transform::IDENTITY)?;
    let mut sync = MotionSyncLoop::new(config, camera);
    let mut clock = FixedStepClock::new(scenario.delta);
    let plane = OverlayPlane::new(&config.overlay);

    if let Some((x, y)) = scenario.pointer {
        sync.on_pointer_move(x, y, &scenario.viewport);
    }

    info!(
        frames = scenario.frames,
        delta = scenario.delta,
        load_after = scenario.load_after,
        "Starting trace"
    );

    let mut records = Vec::with_capacity(scenario.frames as usize);
    for frame in 0..scenario.frames {
        if frame == scenario.load_after && !sync.is_model_loaded() {
            let root = spawn_model(&mut store, &config.overlay.anchor_tag)?;
            let overlay = sync.load_model(&mut store, root, &config.overlay.anchor_tag, &plane)?;
            debug!(frame, anchored = overlay.is_some(), "Model loaded");
        }

        let report = sync.run(&mut clock, &mut store)?;
        records.push(TraceRecord {
            frame,
            time: report.time,
            camera: report.camera.to_array(),
            bob: report.model.map(|p| p.bob),
            yaw: report.model.map(|p| p.yaw),
            overlay: report.overlay.map(|t| t.translation.to_array()),
            synced: report.overlay.is_some(),
            noise_time: store.noise_time(),
        });
    }

    Ok(records)
}

pub fn write_records<W: Write>(
    out: &mut W,
    records: &[TraceRecord],
    format: OutputFormat,
) -> Result<(), TraceError> {
    match format {
        OutputFormat::Json => {
            for record in records {
                serde_json::to_writer(&mut *out, record)?;
                writeln!(out)?;
            }
        }
        OutputFormat::Csv => {
            writeln!(out, "{}", TraceRecord::CSV_HEADER)?;
            for record in records {
                writeln!(out, "{}", record.to_csv())?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_waits_for_model() {
        let scenario = Scenario {
            frames: 10,
            load_after: 4,
            ..Default::default()
        };
        let records = run(&SceneConfig::default(), &scenario).unwrap();

        assert_eq!(records.len(), 10);
        assert!(records[..4].iter().all(|r| !r.synced && r.bob.is_none()));
        assert!(records[4..].iter().all(|r| r.synced && r.bob.is_some()));
    }

    #[test]
    fn test_overlay_tracks_screen_height() {
        let records = run(&SceneConfig::default(), &Scenario::default()).unwrap();
        for record in records {
            let overlay = record.overlay.unwrap();
            let bob = record.bob.unwrap();
            // screen sits 1.35 above the model root, which bobs
            assert!((overlay[1] - (1.35 + bob)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_first_frame_has_zero_time() {
        let records = run(&SceneConfig::default(), &Scenario::default()).unwrap();
        assert_eq!(records[0].time, 0.0);
        assert_eq!(records[0].noise_time, 0.0);
        assert!((records[60].time - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_pointer_drifts_camera() {
        let scenario = Scenario {
            frames: 300,
            pointer: Some((1280.0, 360.0)),
            ..Default::default()
        };
        let records = run(&SceneConfig::default(), &scenario).unwrap();
        let last = records.last().unwrap();
        assert!((last.camera[0] - 0.75).abs() < 1e-4);
        assert!((last.camera[1] - 1.25).abs() < 1e-4);
    }

    #[test]
    fn test_json_lines_output() {
        let scenario = Scenario {
            frames: 3,
            ..Default::default()
        };
        let records = run(&SceneConfig::default(), &scenario).unwrap();
        let mut out = Vec::new();
        write_records(&mut out, &records, OutputFormat::Json).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        let value: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(value["frame"], 2);
        assert_eq!(value["synced"], true);
    }

    #[test]
    fn test_csv_output_before_load() {
        let scenario = Scenario {
            frames: 2,
            load_after: 5,
            ..Default::default()
        };
        let records = run(&SceneConfig::default(), &scenario).unwrap();
        let mut out = Vec::new();
        write_records(&mut out, &records, OutputFormat::Csv).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(TraceRecord::CSV_HEADER));
        let row: Vec<_> = lines.next().unwrap().split(',').collect();
        assert_eq!(row.len(), 12);
        assert_eq!(row[5], "");
        assert_eq!(row[10], "false");
    }
}
