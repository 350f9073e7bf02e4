//! Headless execution of a [`RunSpec`].

use crate::protocol::Inbound;
use crate::source::FieldKind;
use crate::worker::Worker;
use flowtrail_core::error::EngineError;
use flowtrail_core::frame::Frame;
use flowtrail_core::run_spec::RunSpec;
use flowtrail_core::Engine;
use flowtrail_lines::{FlowLines, FlowLinesParams};
use log::info;
use serde::Serialize;
use serde_json::Value;

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub source: String,
    pub seed: u64,
    pub ticks: usize,
    /// Live particles after the last tick.
    pub particles: usize,
    /// Particles spawned over the whole run.
    pub spawned: u64,
    /// Vertices in the last frame.
    pub points: usize,
    /// `[min_x, min_y, max_x, max_y]` of the last frame.
    pub bounds: Option<[f32; 4]>,
    /// Tunables in effect at the end of the run.
    pub params: Value,
}

/// Bakes the field, applies `spec.params` as one `update`, then runs
/// `spec.ticks` ticks of `spec.dt`. Returns the report and the last frame.
pub fn replay(spec: &RunSpec) -> Result<(RunReport, Frame), EngineError> {
    spec.validate()?;
    let kind = FieldKind::from_name(&spec.source)?;
    let field = kind.bake(spec.width, spec.height, spec.seed, &spec.params)?;

    let mut update = match &spec.params {
        Value::Object(map) => map.clone(),
        Value::Null => serde_json::Map::new(),
        other => {
            return Err(EngineError::InvalidMessage(format!(
                "params must be a JSON object, got {other}"
            )))
        }
    };
    let field =
        serde_json::to_value(&field).map_err(|e| EngineError::InvalidMessage(e.to_string()))?;
    update.insert("flow_field".into(), field);

    let mut worker = Worker::new(FlowLines::new(spec.seed, FlowLinesParams::default()));
    worker.handle(Inbound::Update(Value::Object(update)))?;

    let mut frame = worker.engine().emit();
    for _ in 0..spec.ticks {
        if let Some(reply) = worker.handle(Inbound::tick(spec.dt))? {
            frame = reply.into_frame();
        }
    }

    let engine = worker.engine();
    let report = RunReport {
        source: spec.source.clone(),
        seed: spec.seed,
        ticks: spec.ticks,
        particles: engine.particle_count(),
        spawned: engine.spawned(),
        points: frame.point_count(),
        bounds: frame.bounds().map(|(x0, y0, x1, y1)| [x0, y0, x1, y1]),
        params: engine.params(),
    };
    info!(
        "replayed {} ticks of '{}': {} particles, {} points",
        report.ticks, report.source, report.particles, report.points
    );
    Ok((report, frame))
}
