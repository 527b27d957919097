//! The choice protocol.
//!
//! Whenever a rule needs a player to pick something (a target, a card to
//! play for free, an ally to Support) the engine builds a `ChoiceRequest`
//! and asks the installed `DecisionMaker`. The call is synchronous: the
//! action is suspended until the decision maker answers.
//!
//! Failures never reach the caller of an action. A decision maker that
//! errors, declines, or answers with an invalid selection gets a
//! deterministic fallback instead (first valid option unless the rule
//! supplies its own, e.g. highest cost).

mod request;

use std::collections::VecDeque;

use log::warn;

pub use request::{ChoiceError, ChoiceOption, ChoiceRequest, ChoiceResponse};

use crate::core::entity::InstanceId;
use crate::core::GameState;

/// Answers choice requests for players.
pub trait DecisionMaker {
    /// Ask for a choice. The state is read-only for the duration.
    fn request_choice(&mut self, state: &GameState, request: &ChoiceRequest) -> Result<ChoiceResponse, ChoiceError>;
}

/// Headless play: every request falls back.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDecisions;

impl DecisionMaker for NoDecisions {
    fn request_choice(&mut self, _state: &GameState, _request: &ChoiceRequest) -> Result<ChoiceResponse, ChoiceError> {
        Err(ChoiceError::NoHandler)
    }
}

/// Answers from a queue, recording every request. For tests and replays.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDecisions {
    responses: VecDeque<ChoiceResponse>,
    requests: Vec<ChoiceRequest>,
}

impl ScriptedDecisions {
    #[must_use]
    pub fn new(responses: impl IntoIterator<Item = ChoiceResponse>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            requests: Vec::new(),
        }
    }

    /// Queue another response.
    pub fn push(&mut self, response: ChoiceResponse) {
        self.responses.push_back(response);
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> &[ChoiceRequest] {
        &self.requests
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl DecisionMaker for ScriptedDecisions {
    fn request_choice(&mut self, _state: &GameState, request: &ChoiceRequest) -> Result<ChoiceResponse, ChoiceError> {
        self.requests.push(request.clone());
        self.responses.pop_front().ok_or(ChoiceError::Exhausted)
    }
}

impl<F> DecisionMaker for F
where
    F: FnMut(&GameState, &ChoiceRequest) -> Result<ChoiceResponse, ChoiceError>,
{
    fn request_choice(&mut self, state: &GameState, request: &ChoiceRequest) -> Result<ChoiceResponse, ChoiceError> {
        self(state, request)
    }
}

/// Ask for a choice, falling back to the first valid options on failure.
pub fn choose(decisions: &mut dyn DecisionMaker, state: &GameState, request: &ChoiceRequest) -> Vec<String> {
    choose_with(decisions, state, request, ChoiceRequest::first_valid)
}

/// Ask for a choice, falling back to `fallback` on failure.
pub fn choose_with(
    decisions: &mut dyn DecisionMaker,
    state: &GameState,
    request: &ChoiceRequest,
    fallback: impl FnOnce(&ChoiceRequest) -> Vec<String>,
) -> Vec<String> {
    if request.valid_options().next().is_none() {
        return Vec::new();
    }

    let outcome = decisions
        .request_choice(state, request)
        .and_then(|response| request.validate(&response).map(|()| response));

    match outcome {
        Ok(response) => response.selected,
        Err(ChoiceError::NoHandler) => fallback(request),
        Err(err) => {
            warn!("choice `{}` for {} failed ({}), using fallback", request.prompt, request.player, err);
            fallback(request)
        }
    }
}

/// `choose`, reading the selected options as card ids.
pub fn choose_cards(decisions: &mut dyn DecisionMaker, state: &GameState, request: &ChoiceRequest) -> Vec<InstanceId> {
    choose(decisions, state, request)
        .iter()
        .filter_map(|id| InstanceId::parse_option(id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EngineConfig, PlayerId};

    fn state() -> GameState {
        GameState::new(EngineConfig::new(2), 7)
    }

    fn request() -> ChoiceRequest {
        ChoiceRequest::pick_one(
            PlayerId::new(0),
            "Choose",
            vec![ChoiceOption::new("10", "A"), ChoiceOption::new("11", "B")],
        )
    }

    #[test]
    fn test_no_decisions_falls_back_to_first() {
        let mut decisions = NoDecisions;
        assert_eq!(choose(&mut decisions, &state(), &request()), vec!["10".to_string()]);
    }

    #[test]
    fn test_scripted_decisions() {
        let mut decisions = ScriptedDecisions::new([ChoiceResponse::new(["11"])]);
        assert_eq!(choose_cards(&mut decisions, &state(), &request()), vec![InstanceId(11)]);
        assert_eq!(decisions.requests().len(), 1);

        // Exhausted: falls back.
        assert_eq!(choose_cards(&mut decisions, &state(), &request()), vec![InstanceId(10)]);
    }

    #[test]
    fn test_invalid_response_falls_back() {
        let mut decisions = ScriptedDecisions::new([ChoiceResponse::new(["99"])]);
        assert_eq!(choose(&mut decisions, &state(), &request()), vec!["10".to_string()]);
    }

    #[test]
    fn test_custom_fallback() {
        let mut decisions = NoDecisions;
        let picked = choose_with(&mut decisions, &state(), &request(), |req| {
            req.valid_options().last().map(|o| vec![o.id.clone()]).unwrap_or_default()
        });
        assert_eq!(picked, vec!["11".to_string()]);
    }

    #[test]
    fn test_no_valid_options_skips_request() {
        let mut decisions = ScriptedDecisions::new([ChoiceResponse::new(["10"])]);
        let req = ChoiceRequest::pick_one(PlayerId::new(0), "Choose", vec![ChoiceOption::new("10", "A").invalid()]);
        assert!(choose(&mut decisions, &state(), &req).is_empty());
        assert!(decisions.requests().is_empty());
    }

    #[test]
    fn test_closure_decision_maker() {
        let mut decisions = |_: &GameState, req: &ChoiceRequest| -> Result<ChoiceResponse, ChoiceError> {
            Ok(ChoiceResponse::new([req.options[1].id.clone()]))
        };
        assert_eq!(choose(&mut decisions, &state(), &request()), vec!["11".to_string()]);
    }
}
