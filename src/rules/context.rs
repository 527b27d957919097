//! The context every rule and effect handler runs in.

use crate::core::{EngineError, GameState};
use crate::decisions::DecisionMaker;
use crate::effects::{Invocation, TypedEffect};
use crate::triggers::EventBus;

/// Executes new-style typed effects.
///
/// Installed by hosts that understand typed effect kinds. Without one,
/// typed effects fall back to their legacy translation.
pub trait AbilityExecutor {
    fn execute(
        &mut self,
        state: &mut GameState,
        decisions: &mut dyn DecisionMaker,
        effect: &TypedEffect,
        invocation: &Invocation,
    ) -> Result<(), EngineError>;
}

impl<F> AbilityExecutor for F
where
    F: FnMut(&mut GameState, &TypedEffect, &Invocation) -> Result<(), EngineError>,
{
    fn execute(
        &mut self,
        state: &mut GameState,
        _decisions: &mut dyn DecisionMaker,
        effect: &TypedEffect,
        invocation: &Invocation,
    ) -> Result<(), EngineError> {
        self(state, effect, invocation)
    }
}

/// Game state plus the collaborators handlers may call back into.
///
/// Handlers receive the context explicitly, so any number of games can
/// run side by side.
pub struct GameContext<'a> {
    pub state: &'a mut GameState,
    pub decisions: &'a mut dyn DecisionMaker,
    pub events: &'a mut dyn EventBus,
    pub executor: Option<&'a mut dyn AbilityExecutor>,
    /// Effect nesting depth. Zero outside any effect.
    pub(crate) depth: u32,
}

impl<'a> GameContext<'a> {
    pub fn new(state: &'a mut GameState, decisions: &'a mut dyn DecisionMaker, events: &'a mut dyn EventBus) -> Self {
        Self {
            state,
            decisions,
            events,
            executor: None,
            depth: 0,
        }
    }

    /// Install an ability executor (builder pattern).
    #[must_use]
    pub fn with_executor(mut self, executor: &'a mut dyn AbilityExecutor) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Outside any effect resolution?
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.depth == 0
    }

    /// Reconcile, banish lethally damaged cards and check for a winner.
    ///
    /// Does nothing while an effect is resolving; the outermost operation
    /// settles once it is done.
    pub fn settle(&mut self) -> Result<(), EngineError> {
        if !self.is_top_level() {
            return Ok(());
        }
        super::banish::settle(self)
    }
}
