//! Event bus.
//!
//! The engine hands every lifecycle event to an `EventBus`. Awaited events
//! go through `emit`, which gets mutable access to the game state and runs
//! to completion before the action continues, so listeners can apply
//! their own changes first. Notifications go through `notify`.

use crate::core::GameState;

use super::event::GameEvent;

/// Receiver of lifecycle events.
pub trait EventBus {
    /// An awaited event. Returns once every listener is done.
    fn emit(&mut self, state: &mut GameState, event: &GameEvent);

    /// A fire-and-forget notification.
    fn notify(&mut self, _state: &GameState, _event: &GameEvent) {}
}

/// Ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&mut self, _state: &mut GameState, _event: &GameEvent) {}
}

/// Records every event, in order.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Position of the first event of a kind.
    #[must_use]
    pub fn position(&self, kind: super::EventKind) -> Option<usize> {
        self.events.iter().position(|e| e.kind == kind)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventBus for EventLog {
    fn emit(&mut self, _state: &mut GameState, event: &GameEvent) {
        self.events.push(event.clone());
    }

    fn notify(&mut self, _state: &GameState, event: &GameEvent) {
        self.events.push(event.clone());
    }
}

impl<F> EventBus for F
where
    F: FnMut(&mut GameState, &GameEvent),
{
    fn emit(&mut self, state: &mut GameState, event: &GameEvent) {
        self(state, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EngineConfig, InstanceId, PlayerId};
    use crate::triggers::EventKind;

    #[test]
    fn test_event_log_records_in_order() {
        let mut state = GameState::new(EngineConfig::new(2), 1);
        let mut log = EventLog::new();

        log.notify(&state, &GameEvent::exerted(PlayerId::new(0), InstanceId(1)));
        log.emit(&mut state, &GameEvent::quested(PlayerId::new(0), InstanceId(1)));

        assert_eq!(log.events().len(), 2);
        assert_eq!(log.position(EventKind::CardQuested), Some(1));
    }

    #[test]
    fn test_closure_bus_mutates_state() {
        let mut state = GameState::new(EngineConfig::new(2), 1);
        let mut bus = |state: &mut GameState, event: &GameEvent| {
            state.players[event.player].lore += 1;
        };

        bus.emit(&mut state, &GameEvent::quested(PlayerId::new(0), InstanceId(1)));
        assert_eq!(state.players[PlayerId::new(0)].lore, 1);
    }
}
