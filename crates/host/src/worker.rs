//! The single-owner message loop around an [`Engine`].

use crate::protocol::{Inbound, Outbound};
use flowtrail_core::error::EngineError;
use flowtrail_core::Engine;
use flowtrail_lines::FlowLines;
use log::debug;

/// Owns one engine and processes host messages strictly one at a time.
///
/// `update` messages reconfigure the engine and produce no reply. Ticks
/// advance the engine and reply with an [`Outbound::Iterate`] frame. A
/// rejected message leaves the engine untouched.
pub struct Worker<E: Engine = FlowLines> {
    engine: E,
    ticks: u64,
    updates: u64,
}

impl<E: Engine> Worker<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            ticks: 0,
            updates: 0,
        }
    }

    /// Processes one decoded message to completion.
    pub fn handle(&mut self, message: Inbound) -> Result<Option<Outbound>, EngineError> {
        match message {
            Inbound::Update(payload) => {
                self.engine.reconfigure(&payload);
                self.updates += 1;
                debug!("update #{} applied", self.updates);
                Ok(None)
            }
            Inbound::Tick { delta_time } => {
                self.engine.step(delta_time)?;
                self.ticks += 1;
                Ok(Some(Outbound::Iterate(self.engine.emit())))
            }
        }
    }

    /// Decodes a JSON envelope, processes it, and encodes the reply.
    pub fn handle_json(&mut self, text: &str) -> Result<Option<String>, EngineError> {
        let message = Inbound::from_json(text)?;
        match self.handle(message)? {
            Some(reply) => serde_json::to_string(&reply)
                .map(Some)
                .map_err(|e| EngineError::InvalidMessage(e.to_string())),
            None => Ok(None),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Ticks processed successfully.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Updates applied.
    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl Default for Worker<FlowLines> {
    fn default() -> Self {
        Self::new(FlowLines::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Update;
    use flowtrail_core::field::VectorField;
    use serde_json::{json, Value};

    fn worker() -> Worker {
        Worker::default()
    }

    fn field_update() -> Inbound {
        let field = VectorField::uniform(8, 4, [60.0, 60.0, 60.0]).unwrap();
        Inbound::update(&Update {
            line_count: Some(10),
            trail_count: Some(3),
            ..Update::with_field(field)
        })
    }

    #[test]
    fn update_produces_no_reply() {
        let mut worker = worker();
        assert_eq!(worker.handle(field_update()).unwrap(), None);
        assert_eq!(worker.updates(), 1);
        assert_eq!(worker.ticks(), 0);
    }

    #[test]
    fn tick_replies_with_iterate_frame() {
        let mut worker = worker();
        worker.handle(field_update()).unwrap();
        let frame = worker
            .handle(Inbound::tick(1.0))
            .unwrap()
            .expect("tick must reply")
            .into_frame();
        assert!(frame.is_consistent());
        assert!(frame.point_count() >= 20);
        assert_eq!(worker.engine().particle_count(), 10);
    }

    #[test]
    fn tick_before_field_is_missing_field() {
        let mut worker = worker();
        assert!(matches!(
            worker.handle(Inbound::tick(1.0)),
            Err(EngineError::MissingField)
        ));
        assert_eq!(worker.ticks(), 0);
    }

    #[test]
    fn rejected_tick_leaves_state_untouched() {
        let mut worker = worker();
        worker.handle(field_update()).unwrap();
        worker.handle(Inbound::tick(1.0)).unwrap();
        let before = worker.engine().emit();
        assert!(worker.handle_json(r#"{"type":"tick","data":{}}"#).is_err());
        assert_eq!(worker.engine().emit(), before);
        assert_eq!(worker.ticks(), 1);
    }

    #[test]
    fn json_round_trip_through_worker() {
        let mut worker = worker();
        let update = serde_json::to_string(&field_update().to_value()).unwrap();
        assert_eq!(worker.handle_json(&update).unwrap(), None);

        let reply = worker
            .handle_json(r#"{"type":"tick","data":{"delta_time":1}}"#)
            .unwrap()
            .unwrap();
        let reply: Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(reply["type"], "iterate");
        let positions = reply["data"]["positions_buffer"].as_array().unwrap();
        let colors = reply["data"]["colors_buffer"].as_array().unwrap();
        assert_eq!(colors.len(), 2 * positions.len());
    }

    #[test]
    fn update_between_ticks_takes_effect_on_next_tick() {
        let mut worker = worker();
        worker.handle(field_update()).unwrap();
        worker.handle(Inbound::tick(1.0)).unwrap();
        worker
            .handle(Inbound::Update(json!({"line_count": 3})))
            .unwrap();
        assert_eq!(worker.engine().particle_count(), 0);
        worker.handle(Inbound::tick(1.0)).unwrap();
        assert_eq!(worker.engine().particle_count(), 3);
    }

    #[test]
    fn same_messages_same_replies() {
        let run = || {
            let mut worker = worker();
            worker.handle(field_update()).unwrap();
            (0..50)
                .map(|_| worker.handle(Inbound::tick(0.75)).unwrap())
                .last()
                .flatten()
        };
        assert_eq!(run(), run());
    }
}
