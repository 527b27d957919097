//! Choice requests and responses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;

/// One selectable option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: String,
    pub display: String,
    /// Invalid options are shown but can't be picked.
    pub valid: bool,
}

impl ChoiceOption {
    /// A valid option.
    pub fn new(id: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display: display.into(),
            valid: true,
        }
    }

    /// An option for a card.
    #[must_use]
    pub fn card(id: InstanceId, name: &str) -> Self {
        Self::new(id.option_id(), name)
    }

    #[must_use]
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }
}

/// A question put to a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceRequest {
    pub prompt: String,
    pub player: PlayerId,
    pub options: Vec<ChoiceOption>,
    /// Fewest options that must be selected.
    pub min: usize,
    /// Most options that may be selected.
    pub max: usize,
    /// Card asking.
    pub source: Option<InstanceId>,
    /// Card the question is about, if any.
    pub target: Option<InstanceId>,
}

impl ChoiceRequest {
    /// Ask `player` to pick exactly one option.
    pub fn pick_one(player: PlayerId, prompt: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        Self {
            prompt: prompt.into(),
            player,
            options,
            min: 1,
            max: 1,
            source: None,
            target: None,
        }
    }

    /// Set selection bounds (builder pattern).
    #[must_use]
    pub fn with_bounds(mut self, min: usize, max: usize) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: Option<InstanceId>) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: Option<InstanceId>) -> Self {
        self.target = target;
        self
    }

    /// Valid options, in order.
    pub fn valid_options(&self) -> impl Iterator<Item = &ChoiceOption> {
        self.options.iter().filter(|o| o.valid)
    }

    /// Check a response against this request.
    pub fn validate(&self, response: &ChoiceResponse) -> Result<(), ChoiceError> {
        let count = response.selected.len();
        if count < self.min || count > self.max {
            return Err(ChoiceError::WrongCount {
                min: self.min,
                max: self.max,
                got: count,
            });
        }
        for (i, id) in response.selected.iter().enumerate() {
            if !self.valid_options().any(|o| &o.id == id) {
                return Err(ChoiceError::InvalidOption(id.clone()));
            }
            if response.selected[..i].contains(id) {
                return Err(ChoiceError::InvalidOption(id.clone()));
            }
        }
        Ok(())
    }

    /// The first `min` valid options (at least one when `max` allows).
    #[must_use]
    pub fn first_valid(&self) -> Vec<String> {
        let wanted = self.min.max(1).min(self.max);
        self.valid_options().take(wanted).map(|o| o.id.clone()).collect()
    }
}

/// The options a player picked.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceResponse {
    pub selected: Vec<String>,
}

impl ChoiceResponse {
    pub fn new(selected: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            selected: selected.into_iter().map(Into::into).collect(),
        }
    }

    /// Pick cards by id.
    pub fn cards(ids: impl IntoIterator<Item = InstanceId>) -> Self {
        Self {
            selected: ids.into_iter().map(InstanceId::option_id).collect(),
        }
    }

    /// Pick nothing.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }
}

/// Why a choice couldn't be made. Never leaves the engine: every failure
/// is replaced by a fallback selection.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChoiceError {
    #[error("no decision maker available")]
    NoHandler,

    #[error("player declined to choose")]
    Declined,

    #[error("scripted responses exhausted")]
    Exhausted,

    #[error("option `{0}` is not a valid choice")]
    InvalidOption(String),

    #[error("expected between {min} and {max} selections, got {got}")]
    WrongCount { min: usize, max: usize, got: usize },

    #[error("decision maker failed: {0}")]
    Failed(String),
}
