//! The ability parser's output format.
//!
//! Card data carries ability descriptors as JSON. Two shapes are accepted
//! and always will be:
//!
//! - legacy: an `action` verb with flat fields
//!   (`{"trigger": "on_play", "action": "deal_damage", "amount": 2}`)
//! - typed: a `type` verb with `params`, handed to the ability executor
//!   (`{"trigger": "on_play", "type": "gain_lore", "params": {"amount": 1}}`)
//!
//! Either may nest: `{"effects": [...]}` is a sequence.
//!
//! Conversion to the typed model happens once, when a card is loaded.
//! Costs are normalised to one list: a `costs` array, when present, fully
//! replaces the older single `cost` object. A typed effect keeps its
//! legacy translation (when its verb has one) as the fallback used when
//! no executor is installed.
//!
//! ```
//! use lore_engine::effects::ast::AbilityAst;
//! use lore_engine::effects::{Ability, AbilityKind, Cost};
//!
//! let ast: AbilityAst = serde_json::from_str(r#"{
//!     "trigger": "activated",
//!     "cost": {"exert": true, "ink": 1},
//!     "costs": [{"type": "exert"}],
//!     "action": "draw",
//!     "amount": 1
//! }"#).unwrap();
//!
//! let ability = Ability::try_from(ast).unwrap();
//! match ability.kind {
//!     AbilityKind::Activated { costs, .. } => assert_eq!(costs, vec![Cost::Exert]),
//!     _ => unreachable!(),
//! }
//! ```

use serde::Deserialize;
use serde_json::Value;

use super::ability::{Ability, AbilityKind, Cost, LegacyStatic, StaticEffect, StaticTarget, TriggerKind};
use super::active::{Duration, Restriction};
use super::effect::{Amount, Effect, PlayerTarget, TargetSpec, TypedEffect};
use crate::cards::{CardFilter, CardType, Keyword, OwnerScope, Stat};
use crate::core::EngineError;
use crate::triggers::{Comparison, Condition};

// === Input shapes ===

/// One ability descriptor.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AbilityAst {
    #[serde(default)]
    pub name: Option<String>,
    /// `static`, `activated`, `keyword`, or a trigger (`on_play`, `on_quest`, ...).
    #[serde(default)]
    pub trigger: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub condition: Option<ConditionAst>,
    /// Older single-object cost.
    #[serde(default)]
    pub cost: Option<LegacyCostAst>,
    /// Cost list. Supersedes `cost` when present.
    #[serde(default)]
    pub costs: Option<Vec<CostAst>>,
    #[serde(flatten)]
    pub body: EffectAst,
}

/// One effect descriptor.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EffectAst {
    pub action: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub params: Option<Value>,
    pub effects: Option<Vec<EffectAst>>,
    pub target: Option<TargetAst>,
    pub from: Option<TargetAst>,
    pub to: Option<TargetAst>,
    pub amount: Option<AmountAst>,
    pub duration: Option<String>,
    pub stat: Option<String>,
    pub keyword: Option<String>,
    pub keywords: Vec<String>,
    pub subtype: Option<String>,
    pub scope: Option<String>,
    pub player: Option<String>,
    pub condition: Option<ConditionAst>,
    #[serde(alias = "effect")]
    pub then: Option<Box<EffectAst>>,
    #[serde(alias = "else")]
    pub otherwise: Option<Box<EffectAst>>,
    pub filter: Option<CardFilter>,
    pub max_cost: Option<u32>,
    pub optional: Option<bool>,
    pub random: Option<bool>,
    pub exerted: Option<bool>,
}

impl EffectAst {
    /// The verb, whichever shape carries it.
    #[must_use]
    pub fn verb(&self) -> Option<&str> {
        self.action.as_deref().or(self.kind.as_deref())
    }

    /// No verb and no nested effects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verb().is_none() && self.effects.is_none()
    }
}

/// Older cost object: `{"exert": true, "ink": 2}`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LegacyCostAst {
    pub exert: bool,
    pub ink: u32,
    pub discard: u32,
    pub banish_self: bool,
}

/// One entry of a `costs` array.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CostAst {
    Exert,
    Ink {
        amount: u32,
    },
    Discard {
        #[serde(default = "one")]
        amount: u32,
    },
    BanishSelf,
}

fn one() -> u32 {
    1
}

/// A target: a symbolic name or a detailed filter.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum TargetAst {
    Named(String),
    Detailed(TargetDetailAst),
}

/// `{"type": "all", "mine": true, "other": true, "subtypes": ["Hero"]}`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TargetDetailAst {
    /// `self`, `chosen` or `all`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub card_type: Option<String>,
    pub mine: Option<bool>,
    pub owner: Option<String>,
    pub other: bool,
    pub subtype: Option<String>,
    pub subtypes: Vec<String>,
    pub name: Option<String>,
    pub max_cost: Option<u32>,
    pub damaged: Option<bool>,
    pub exerted: Option<bool>,
}

/// An amount: a literal, or a count of cards in play.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum AmountAst {
    Fixed(i32),
    Count(CountAst),
}

/// `{"per": "character", "subtype": "Pirate", "scope": "yours", "other": true}`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CountAst {
    #[serde(alias = "per")]
    pub card_type: Option<String>,
    pub subtype: Option<String>,
    pub subtypes: Vec<String>,
    pub scope: Option<String>,
    pub other: bool,
    pub damaged: Option<bool>,
    pub multiplier: Option<i32>,
}

/// A condition descriptor.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionAst {
    HandSize {
        #[serde(default)]
        comparison: Comparison,
        value: u32,
    },
    HasCardNamed {
        name: String,
        #[serde(default)]
        scope: Option<String>,
    },
    #[serde(alias = "has_character")]
    HasCardMatching {
        #[serde(default)]
        filter: CardFilter,
        #[serde(default)]
        comparison: Comparison,
        #[serde(default = "one")]
        count: u32,
    },
    SelfStat {
        stat: String,
        #[serde(default)]
        comparison: Comparison,
        value: i32,
    },
    SelfDamaged,
    SelfUndamaged,
    SelfExerted,
    SelfReady,
    SelfHasCardUnder,
    CardPlacedUnderThisTurn,
    YourTurn,
    LoreAtLeast {
        value: u32,
    },
    All {
        conditions: Vec<ConditionAst>,
    },
    Any {
        conditions: Vec<ConditionAst>,
    },
    Not {
        condition: Box<ConditionAst>,
    },
    Always,
    Never,
}

// === Conditions ===

impl TryFrom<ConditionAst> for Condition {
    type Error = EngineError;

    fn try_from(ast: ConditionAst) -> Result<Self, Self::Error> {
        Ok(match ast {
            ConditionAst::HandSize { comparison, value } => Condition::HandSize { comparison, value },
            ConditionAst::HasCardNamed { name, scope } => Condition::HasCardNamed {
                name,
                scope: owner_scope(scope.as_deref(), OwnerScope::Any)?,
            },
            ConditionAst::HasCardMatching {
                filter,
                comparison,
                count,
            } => Condition::HasCardMatching {
                filter,
                comparison,
                count,
            },
            ConditionAst::SelfStat { stat, comparison, value } => Condition::SelfStat {
                stat: parse_stat(&stat)?,
                comparison,
                value,
            },
            ConditionAst::SelfDamaged => Condition::SelfDamaged(true),
            ConditionAst::SelfUndamaged => Condition::SelfDamaged(false),
            ConditionAst::SelfExerted => Condition::SelfExerted(true),
            ConditionAst::SelfReady => Condition::SelfExerted(false),
            ConditionAst::SelfHasCardUnder => Condition::SelfHasCardUnder,
            ConditionAst::CardPlacedUnderThisTurn => Condition::CardPlacedUnderThisTurn,
            ConditionAst::YourTurn => Condition::IsYourTurn,
            ConditionAst::LoreAtLeast { value } => Condition::LoreAtLeast(value),
            ConditionAst::All { conditions } => Condition::All(convert_all(conditions)?),
            ConditionAst::Any { conditions } => Condition::Any(convert_all(conditions)?),
            ConditionAst::Not { condition } => Condition::Not(Box::new(Condition::try_from(*condition)?)),
            ConditionAst::Always => Condition::Always,
            ConditionAst::Never => Condition::Never,
        })
    }
}

fn convert_all(conditions: Vec<ConditionAst>) -> Result<Vec<Condition>, EngineError> {
    conditions.into_iter().map(Condition::try_from).collect()
}

fn condition(ast: &Option<ConditionAst>) -> Result<Option<Condition>, EngineError> {
    ast.clone().map(Condition::try_from).transpose()
}

fn required_condition(ast: &EffectAst, verb: &str) -> Result<Condition, EngineError> {
    condition(&ast.condition)?.ok_or_else(|| EngineError::invalid(format!("`{}` needs a condition", verb)))
}

// === Field helpers ===

fn owner_scope(text: Option<&str>, default: OwnerScope) -> Result<OwnerScope, EngineError> {
    match text {
        None => Ok(default),
        Some(text) => OwnerScope::parse(text).ok_or_else(|| EngineError::invalid(format!("unknown scope `{}`", text))),
    }
}

fn parse_stat(text: &str) -> Result<Stat, EngineError> {
    Stat::parse(text).ok_or_else(|| EngineError::invalid(format!("unknown stat `{}`", text)))
}

fn card_type(text: &str) -> Result<CardType, EngineError> {
    CardType::parse(text).ok_or_else(|| EngineError::invalid(format!("unknown card type `{}`", text)))
}

/// The stat a verb modifies: from the verb itself (`modify_lore`) or its `stat` field.
fn stat_of(verb: &str, ast: &EffectAst) -> Result<Stat, EngineError> {
    match &ast.stat {
        Some(stat) => parse_stat(stat),
        None => Ok(Stat::parse(verb).unwrap_or(Stat::Strength)),
    }
}

fn amount(ast: &EffectAst, default: i32) -> Result<Amount, EngineError> {
    match &ast.amount {
        None => Ok(Amount::Fixed(default)),
        Some(AmountAst::Fixed(n)) => Ok(Amount::Fixed(*n)),
        Some(AmountAst::Count(count)) => {
            let mut filter = CardFilter::any().owned_by(owner_scope(count.scope.as_deref(), OwnerScope::Any)?);
            filter.card_type = count.card_type.as_deref().map(card_type).transpose()?;
            filter.subtypes.extend(count.subtype.iter().cloned());
            filter.subtypes.extend(count.subtypes.iter().cloned());
            filter.exclude_source = count.other;
            filter.damaged = count.damaged;
            Ok(Amount::Count {
                filter,
                multiplier: count.multiplier.unwrap_or(1),
            })
        }
    }
}

/// A literal amount. Dynamic amounts are rejected where only literals make sense.
fn fixed(ast: &EffectAst, default: u32, verb: &str) -> Result<u32, EngineError> {
    match amount(ast, default as i32)? {
        Amount::Fixed(n) => Ok(n.max(0) as u32),
        Amount::Count { .. } => Err(EngineError::invalid(format!("`{}` needs a fixed amount", verb))),
    }
}

fn fixed_i32(ast: &EffectAst, default: i32, verb: &str) -> Result<i32, EngineError> {
    match amount(ast, default)? {
        Amount::Fixed(n) => Ok(n),
        Amount::Count { .. } => Err(EngineError::invalid(format!("`{}` needs a fixed amount", verb))),
    }
}

fn players(ast: &EffectAst, default: PlayerTarget) -> Result<PlayerTarget, EngineError> {
    match &ast.player {
        None => Ok(default),
        Some(text) => PlayerTarget::parse(text).ok_or_else(|| EngineError::invalid(format!("unknown player `{}`", text))),
    }
}

fn duration(ast: &EffectAst, default: Duration) -> Result<Duration, EngineError> {
    match &ast.duration {
        None => Ok(default),
        Some(text) if text == "until" => Ok(Duration::Until(
            condition(&ast.condition)?.ok_or_else(|| EngineError::invalid("`until` duration needs a condition"))?,
        )),
        Some(text) => Duration::parse(text).ok_or_else(|| EngineError::invalid(format!("unknown duration `{}`", text))),
    }
}

fn keyword(ast: &EffectAst, verb: &str) -> Result<Keyword, EngineError> {
    ast.keyword
        .as_deref()
        .map(Keyword::parse)
        .ok_or_else(|| EngineError::invalid(format!("`{}` needs a keyword", verb)))
}

/// Build a filter from a detailed target. Card type defaults to character.
fn detail_filter(detail: &TargetDetailAst) -> Result<CardFilter, EngineError> {
    let scope = match (detail.mine, detail.owner.as_deref()) {
        (Some(true), _) => OwnerScope::Yours,
        (Some(false), _) => OwnerScope::Opponents,
        (None, owner) => owner_scope(owner, OwnerScope::Any)?,
    };
    let mut filter = CardFilter::of_type(card_type(detail.card_type.as_deref().unwrap_or("character"))?).owned_by(scope);
    filter.exclude_source = detail.other;
    filter.subtypes.extend(detail.subtype.iter().cloned());
    filter.subtypes.extend(detail.subtypes.iter().cloned());
    filter.name = detail.name.clone();
    filter.max_cost = detail.max_cost;
    filter.damaged = detail.damaged;
    filter.exerted = detail.exerted;
    Ok(filter)
}

/// Resolve a symbolic target name.
fn named_target(name: &str) -> Result<TargetSpec, EngineError> {
    let characters = CardFilter::characters;
    Ok(match name.trim().to_ascii_lowercase().as_str() {
        "self" | "this" | "source" | "this_character" => TargetSpec::Source,
        "chosen" | "chosen_character" | "character" => TargetSpec::Chosen(characters()),
        "chosen_opposing_character" | "opposing_character" => TargetSpec::Chosen(characters().opponents()),
        "chosen_own_character" | "your_character" | "chosen_character_of_yours" => TargetSpec::Chosen(characters().yours()),
        "chosen_other_character" => TargetSpec::Chosen(characters().other()),
        "chosen_item" => TargetSpec::Chosen(CardFilter::of_type(CardType::Item)),
        "chosen_location" => TargetSpec::Chosen(CardFilter::of_type(CardType::Location)),
        "chosen_damaged_character" => TargetSpec::Chosen(characters().damaged(true)),
        "all_characters" | "each_character" => TargetSpec::All(characters()),
        "all_opposing_characters" | "each_opposing_character" => TargetSpec::All(characters().opponents()),
        "your_characters" | "all_your_characters" => TargetSpec::All(characters().yours()),
        "your_other_characters" => TargetSpec::All(characters().yours().other()),
        "all_opposing_damaged_characters" => TargetSpec::All(characters().opponents().damaged(true)),
        other => return Err(EngineError::invalid(format!("unknown target `{}`", other))),
    })
}

fn target_spec(ast: &Option<TargetAst>, default: TargetSpec) -> Result<TargetSpec, EngineError> {
    match ast {
        None => Ok(default),
        Some(TargetAst::Named(name)) => named_target(name),
        Some(TargetAst::Detailed(detail)) => match detail.kind.as_deref().unwrap_or("chosen") {
            "self" | "this" => Ok(TargetSpec::Source),
            "chosen" => Ok(TargetSpec::Chosen(detail_filter(detail)?)),
            "all" | "each" => Ok(TargetSpec::All(detail_filter(detail)?)),
            other => Err(EngineError::invalid(format!("unknown target type `{}`", other))),
        },
    }
}

/// Targets of static sub-effects: the card itself, or a scope in play.
fn static_target(ast: &Option<TargetAst>) -> Result<StaticTarget, EngineError> {
    match target_spec(ast, TargetSpec::Source)? {
        TargetSpec::Source => Ok(StaticTarget::SelfOnly),
        TargetSpec::All(filter) | TargetSpec::Chosen(filter) => Ok(StaticTarget::Cards(filter)),
        TargetSpec::Resolved(_) => Err(EngineError::invalid("static target can't name a card")),
    }
}

fn nested(ast: &Option<Box<EffectAst>>) -> Result<Option<Box<Effect>>, EngineError> {
    ast.as_deref()
        .cloned()
        .map(|inner| Effect::try_from(inner).map(Box::new))
        .transpose()
}

fn sequence(effects: &[EffectAst]) -> Result<Effect, EngineError> {
    effects
        .iter()
        .cloned()
        .map(Effect::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map(Effect::Sequence)
}

// === Effects ===

impl TryFrom<EffectAst> for Effect {
    type Error = EngineError;

    fn try_from(ast: EffectAst) -> Result<Self, Self::Error> {
        match (&ast.action, &ast.kind) {
            (Some(action), _) => legacy_effect(action, &ast),
            (None, Some(kind)) => Ok(Effect::Typed(TypedEffect {
                kind: kind.clone(),
                params: ast.params.clone().unwrap_or(Value::Null),
                fallback: typed_fallback(kind, &ast).map(Box::new),
            })),
            (None, None) => match &ast.effects {
                Some(effects) => sequence(effects),
                None => Err(EngineError::invalid("effect has no action, type or effects")),
            },
        }
    }
}

/// The legacy translation of a typed verb, reading fields from `params`.
fn typed_fallback(kind: &str, ast: &EffectAst) -> Option<Effect> {
    let from_params = match &ast.params {
        Some(Value::Object(params)) => {
            let mut fields = params.clone();
            fields.insert("action".to_string(), Value::String(kind.to_string()));
            serde_json::from_value::<EffectAst>(Value::Object(fields)).ok()
        }
        _ => None,
    };
    let candidate = from_params.unwrap_or_else(|| EffectAst {
        action: Some(kind.to_string()),
        kind: None,
        params: None,
        ..ast.clone()
    });
    legacy_effect(kind, &candidate).ok()
}

fn legacy_effect(verb: &str, ast: &EffectAst) -> Result<Effect, EngineError> {
    let chosen = TargetSpec::chosen_character;
    Ok(match verb {
        "sequence" => sequence(ast.effects.as_deref().unwrap_or_default())?,

        "draw" | "draw_cards" => Effect::Draw {
            amount: fixed(ast, 1, verb)?,
            players: players(ast, PlayerTarget::You)?,
        },
        "gain_lore" => Effect::GainLore {
            amount: amount(ast, 1)?,
            players: players(ast, PlayerTarget::You)?,
        },
        "lose_lore" | "opponent_loses_lore" => Effect::LoseLore {
            amount: fixed(ast, 1, verb)?,
            players: players(ast, PlayerTarget::Opponents)?,
        },
        "discard" => Effect::Discard {
            amount: fixed(ast, 1, verb)?,
            players: players(ast, PlayerTarget::You)?,
            random: ast.random.unwrap_or(false),
        },
        "opponent_discard" => Effect::Discard {
            amount: fixed(ast, 1, verb)?,
            players: PlayerTarget::Opponent,
            random: ast.random.unwrap_or(false),
        },
        "all_opponents_discard" => Effect::Discard {
            amount: fixed(ast, 1, verb)?,
            players: PlayerTarget::Opponents,
            random: ast.random.unwrap_or(false),
        },
        "ink_from_deck" | "put_top_card_into_inkwell" => Effect::InkFromDeck {
            amount: fixed(ast, 1, verb)?,
            exerted: ast.exerted.unwrap_or(true),
        },
        "reduce_next_cost" | "reduce_cost_next" => Effect::ReduceNextCost {
            amount: fixed(ast, 1, verb)?,
            filter: ast.filter.clone().unwrap_or_default(),
        },
        "play_free_card" | "play_for_free" => Effect::PlayFreeCard {
            filter: ast.filter.clone().unwrap_or_default(),
        },

        "ready" | "ready_character" => Effect::Ready {
            target: target_spec(&ast.target, TargetSpec::Source)?,
        },
        "exert" | "exert_character" => Effect::Exert {
            target: target_spec(&ast.target, TargetSpec::chosen_opposing())?,
        },
        "deal_damage" => Effect::DealDamage {
            amount: amount(ast, 1)?,
            target: target_spec(&ast.target, chosen())?,
        },
        "deal_damage_aoe" => Effect::DealDamage {
            amount: amount(ast, 1)?,
            target: match target_spec(&ast.target, TargetSpec::all_opposing())? {
                TargetSpec::Chosen(filter) => TargetSpec::All(filter),
                other => other,
            },
        },
        "heal" | "remove_damage" => Effect::Heal {
            amount: fixed(ast, 1, verb)?,
            target: target_spec(&ast.target, TargetSpec::Source)?,
        },
        "banish" => Effect::Banish {
            target: target_spec(&ast.target, chosen())?,
            max_cost: ast.max_cost,
        },
        "banish_self" => Effect::Banish {
            target: TargetSpec::Source,
            max_cost: None,
        },
        "return_to_hand" | "bounce" => Effect::ReturnToHand {
            target: target_spec(&ast.target, chosen())?,
        },
        "move_damage" => Effect::MoveDamage {
            amount: fixed(ast, 1, verb)?,
            from: target_spec(&ast.from, TargetSpec::Chosen(CardFilter::characters().damaged(true)))?,
            to: target_spec(if ast.to.is_some() { &ast.to } else { &ast.target }, TargetSpec::chosen_opposing())?,
        },
        "return_from_discard" => Effect::ReturnFromDiscard {
            filter: ast.filter.clone().unwrap_or_default(),
            optional: ast.optional.unwrap_or(true),
        },
        "return_from_discard_mandatory" => Effect::ReturnFromDiscard {
            filter: ast.filter.clone().unwrap_or_default(),
            optional: false,
        },
        "boost" => Effect::Boost {
            amount: fixed(ast, 1, verb)?,
        },
        "ready_cant_quest" => Effect::ReadyCantQuest {
            target: target_spec(&ast.target, TargetSpec::Chosen(CardFilter::characters().yours()))?,
        },

        "grant_keyword" | "grant_keyword_temporary" => Effect::GrantKeyword {
            keyword: keyword(ast, verb)?,
            target: target_spec(&ast.target, TargetSpec::Source)?,
            duration: duration(ast, Duration::UntilEndOfTurn)?,
        },
        "temp_stat_buff" | "stat_buff" | "dynamic_stat_buff" | "modify_strength" | "modify_willpower"
        | "modify_lore" => Effect::StatBuff {
            stat: stat_of(verb, ast)?,
            amount: amount(ast, 1)?,
            target: target_spec(&ast.target, TargetSpec::Source)?,
            duration: duration(ast, Duration::UntilEndOfTurn)?,
        },
        "cant_quest" | "cant_ready" | "cant_challenge" => Effect::Restrict {
            restriction: Restriction::parse(verb).ok_or_else(|| EngineError::UnknownAction(verb.to_string()))?,
            target: target_spec(&ast.target, TargetSpec::chosen_opposing())?,
            duration: duration(ast, Duration::NextTurnStart)?,
        },
        "cant_play_actions" | "cant_play_songs" => Effect::RestrictPlayers {
            restriction: Restriction::parse(verb).ok_or_else(|| EngineError::UnknownAction(verb.to_string()))?,
            players: players(ast, PlayerTarget::Opponents)?,
            duration: duration(ast, Duration::NextTurnStart)?,
        },

        "conditional_effect" => {
            let then = match (nested(&ast.then)?, &ast.effects) {
                (Some(then), _) => then,
                (None, Some(effects)) => Box::new(sequence(effects)?),
                (None, None) => return Err(EngineError::invalid("`conditional_effect` needs an effect")),
            };
            Effect::Conditional {
                condition: required_condition(ast, verb)?,
                then,
                otherwise: nested(&ast.otherwise)?,
            }
        }
        "trigger_effect" => Effect::Conditional {
            condition: condition(&ast.condition)?.unwrap_or(Condition::Always),
            then: nested(&ast.then)?.ok_or_else(|| EngineError::invalid("`trigger_effect` needs an effect"))?,
            otherwise: None,
        },

        "sing_requirement" | "song_requirement" => Effect::SingRequirement {
            cost: fixed(ast, 3, verb)?,
        },

        other => return Err(EngineError::UnknownAction(other.to_string())),
    })
}

// === Static abilities ===

fn static_effects(ast: &EffectAst) -> Result<Vec<StaticEffect>, EngineError> {
    let Some(verb) = ast.verb() else {
        return match &ast.effects {
            Some(effects) => {
                let mut all = Vec::new();
                for effect in effects {
                    all.extend(static_effects(effect)?);
                }
                Ok(all)
            }
            None => Ok(Vec::new()),
        };
    };

    let legacy = |legacy: LegacyStatic| -> Result<Vec<StaticEffect>, EngineError> {
        if ast.condition.is_some() {
            return Err(EngineError::invalid(format!(
                "`{}` can't carry its own condition; put it on the ability",
                verb
            )));
        }
        Ok(vec![StaticEffect::Legacy(legacy)])
    };
    let your_characters = || CardFilter::characters().yours();

    match verb {
        "resist" => Ok(vec![StaticEffect::Resist(fixed(ast, 1, verb)?)]),
        "modify" | "modify_stat" | "stat_buff" | "modify_strength" | "modify_willpower" | "modify_lore" => {
            Ok(vec![StaticEffect::Modify {
                stat: stat_of(verb, ast)?,
                amount: amount(ast, 1)?,
                target: static_target(&ast.target)?,
                condition: condition(&ast.condition)?,
            }])
        }
        "grant_keyword" => Ok(vec![StaticEffect::GrantKeyword {
            keyword: keyword(ast, verb)?,
            target: static_target(&ast.target)?,
            condition: condition(&ast.condition)?,
        }]),

        "cant_play_songs" => legacy(LegacyStatic::CantPlaySongs {
            players: players(ast, PlayerTarget::Opponents)?,
        }),
        "cant_challenge" => legacy(LegacyStatic::CantChallenge {
            target: static_target(&ast.target)?,
        }),
        "conditional_cant_ready" => Ok(vec![StaticEffect::Legacy(LegacyStatic::ConditionalCantReady {
            condition: required_condition(ast, verb)?,
        })]),
        "reduce_cost" => legacy(LegacyStatic::ReduceCost {
            amount: fixed(ast, 1, verb)?,
            filter: ast.filter.clone().unwrap_or_default(),
        }),
        "reduce_move_cost" => legacy(LegacyStatic::ReduceMoveCost {
            amount: fixed(ast, 1, verb)?,
        }),
        "buff_subtype" => {
            let filter = match static_target(&ast.target)? {
                StaticTarget::Cards(filter) => filter,
                StaticTarget::SelfOnly => your_characters(),
            };
            let filter = match &ast.subtype {
                Some(subtype) => filter.with_subtype(subtype.clone()),
                None => filter,
            };
            legacy(LegacyStatic::BuffSubtype {
                filter,
                stat: stat_of(verb, ast)?,
                amount: fixed_i32(ast, 1, verb)?,
            })
        }
        "conditional_lore_bonus" => Ok(vec![StaticEffect::Legacy(LegacyStatic::ConditionalLoreBonus {
            condition: required_condition(ast, verb)?,
            amount: fixed_i32(ast, 1, verb)?,
        })]),
        "lore_per_opposing_damaged" => legacy(LegacyStatic::LorePerOpposingDamaged {
            amount: fixed_i32(ast, 1, verb)?,
        }),
        "buff_all_characters" => {
            let filter = match static_target(&ast.target)? {
                StaticTarget::Cards(filter) => filter,
                StaticTarget::SelfOnly => {
                    CardFilter::characters().owned_by(owner_scope(ast.scope.as_deref(), OwnerScope::Yours)?)
                }
            };
            legacy(LegacyStatic::BuffAllCharacters {
                filter,
                stat: stat_of(verb, ast)?,
                amount: fixed_i32(ast, 1, verb)?,
            })
        }
        "conditional_stat_buff" => Ok(vec![StaticEffect::Legacy(LegacyStatic::ConditionalStatBuff {
            condition: required_condition(ast, verb)?,
            stat: stat_of(verb, ast)?,
            amount: fixed_i32(ast, 1, verb)?,
        })]),
        "grant_keyword_to_others" => legacy(LegacyStatic::GrantKeywordToOthers {
            keyword: keyword(ast, verb)?,
            filter: ast.filter.clone().unwrap_or_else(|| your_characters().other()),
        }),
        "conditional_grant_keywords" => {
            let mut keywords: Vec<Keyword> = ast.keywords.iter().map(|k| Keyword::parse(k)).collect();
            keywords.extend(ast.keyword.as_deref().map(Keyword::parse));
            Ok(vec![StaticEffect::Legacy(LegacyStatic::ConditionalGrantKeywords {
                condition: required_condition(ast, verb)?,
                keywords,
            })])
        }
        "dynamic_stat_per_count" => legacy(LegacyStatic::DynamicStatPerCount {
            stat: stat_of(verb, ast)?,
            amount: amount(ast, 1)?,
        }),
        "modify_lore_goal" => legacy(LegacyStatic::ModifyLoreGoal {
            amount: fixed_i32(ast, 1, verb)?,
            players: players(ast, PlayerTarget::Opponents)?,
        }),
        other => Err(EngineError::UnknownAction(other.to_string())),
    }
}

// === Abilities ===

/// Verbs whose condition is part of the effect itself.
fn takes_condition(verb: &str) -> bool {
    matches!(
        verb,
        "conditional_effect"
            | "conditional_cant_ready"
            | "conditional_lore_bonus"
            | "conditional_stat_buff"
            | "conditional_grant_keywords"
    )
}

fn normalize_costs(cost: Option<LegacyCostAst>, costs: Option<Vec<CostAst>>) -> Vec<Cost> {
    if let Some(costs) = costs {
        return costs
            .into_iter()
            .map(|cost| match cost {
                CostAst::Exert => Cost::Exert,
                CostAst::Ink { amount } => Cost::Ink(amount),
                CostAst::Discard { amount } => Cost::Discard(amount),
                CostAst::BanishSelf => Cost::BanishSelf,
            })
            .collect();
    }

    let Some(cost) = cost else {
        return Vec::new();
    };
    let mut list = Vec::new();
    if cost.exert {
        list.push(Cost::Exert);
    }
    if cost.ink > 0 {
        list.push(Cost::Ink(cost.ink));
    }
    if cost.discard > 0 {
        list.push(Cost::Discard(cost.discard));
    }
    if cost.banish_self {
        list.push(Cost::BanishSelf);
    }
    list
}

impl TryFrom<AbilityAst> for Ability {
    type Error = EngineError;

    fn try_from(ast: AbilityAst) -> Result<Self, Self::Error> {
        let AbilityAst {
            name,
            trigger,
            keyword,
            condition: mut condition_ast,
            cost,
            costs,
            mut body,
        } = ast;

        // Conditional forms written with the condition on the ability.
        if body.verb().is_some_and(takes_condition) && body.condition.is_none() {
            body.condition = condition_ast.take();
        }

        let keyword = keyword.as_deref().map(Keyword::parse);
        let trigger = trigger.as_deref().unwrap_or("on_play").trim().to_ascii_lowercase();

        let kind = match trigger.as_str() {
            "static" | "passive" | "continuous" => {
                let mut effects = static_effects(&body)?;
                if let (true, Some(Keyword::Resist(n))) = (body.is_empty(), &keyword) {
                    effects.push(StaticEffect::Resist(*n));
                }
                AbilityKind::Static(effects)
            }
            "keyword" => match (&keyword, body.is_empty()) {
                (Some(Keyword::Boost(n)), true) => AbilityKind::Activated {
                    costs: vec![Cost::Ink(*n)],
                    effect: Effect::Boost { amount: 1 },
                },
                (Some(Keyword::Resist(n)), true) => AbilityKind::Static(vec![StaticEffect::Resist(*n)]),
                (_, true) => AbilityKind::Static(Vec::new()),
                (_, false) => AbilityKind::Static(static_effects(&body)?),
            },
            "activated" => {
                let effect = match (&keyword, body.is_empty()) {
                    (Some(Keyword::Boost(_)), true) => Effect::Boost { amount: 1 },
                    _ => Effect::try_from(body)?,
                };
                let mut costs = normalize_costs(cost, costs);
                if let (true, Some(Keyword::Boost(n))) = (costs.is_empty(), &keyword) {
                    costs.push(Cost::Ink(*n));
                }
                return Ok(Ability {
                    name,
                    keyword,
                    condition: condition_ast.map(Condition::try_from).transpose()?,
                    ..Ability::activated(costs, effect)
                });
            }
            other => {
                let trigger = TriggerKind::parse(other)
                    .ok_or_else(|| EngineError::invalid(format!("unknown trigger `{}`", other)))?;
                AbilityKind::Triggered {
                    trigger,
                    effect: Effect::try_from(body)?,
                }
            }
        };

        Ok(Ability {
            name,
            keyword,
            condition: condition_ast.map(Condition::try_from).transpose()?,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ability(json: &str) -> Result<Ability, EngineError> {
        Ability::try_from(serde_json::from_str::<AbilityAst>(json).unwrap())
    }

    fn effect(json: &str) -> Result<Effect, EngineError> {
        Effect::try_from(serde_json::from_str::<EffectAst>(json).unwrap())
    }

    #[test]
    fn test_legacy_action() {
        let effect = effect(r#"{"action": "deal_damage", "amount": 2, "target": "chosen_opposing_character"}"#).unwrap();
        assert_eq!(effect, Effect::deal_damage(2, TargetSpec::chosen_opposing()));
    }

    #[test]
    fn test_aoe_target() {
        let effect = effect(r#"{"action": "deal_damage_aoe", "amount": 1}"#).unwrap();
        assert_eq!(effect, Effect::deal_damage(1, TargetSpec::all_opposing()));
    }

    #[test]
    fn test_typed_effect_keeps_fallback() {
        let effect = effect(r#"{"type": "gain_lore", "params": {"amount": 2}}"#).unwrap();
        match effect {
            Effect::Typed(typed) => {
                assert_eq!(typed.kind, "gain_lore");
                assert_eq!(typed.params["amount"], 2);
                assert_eq!(typed.fallback.as_deref(), Some(&Effect::gain_lore(2)));
            }
            other => panic!("expected typed effect, got {:?}", other),
        }
    }

    #[test]
    fn test_typed_effect_without_translation() {
        let effect = effect(r#"{"type": "summon_storm", "params": {"size": 3}}"#).unwrap();
        assert!(matches!(effect, Effect::Typed(TypedEffect { fallback: None, .. })));
    }

    #[test]
    fn test_unknown_legacy_action() {
        assert!(matches!(
            effect(r#"{"action": "summon_storm"}"#),
            Err(EngineError::UnknownAction(verb)) if verb == "summon_storm"
        ));
    }

    #[test]
    fn test_nested_effects() {
        let effect = effect(r#"{"effects": [{"action": "draw"}, {"action": "gain_lore", "amount": 1}]}"#).unwrap();
        assert_eq!(effect, Effect::sequence([Effect::draw(1), Effect::gain_lore(1)]));
    }

    #[test]
    fn test_conditional_effect() {
        let effect = effect(
            r#"{"action": "conditional_effect",
                "condition": {"type": "hand_size", "comparison": "at_most", "value": 2},
                "then": {"action": "draw", "amount": 2},
                "else": {"action": "gain_lore"}}"#,
        )
        .unwrap();

        assert_eq!(
            effect,
            Effect::Conditional {
                condition: Condition::HandSize {
                    comparison: Comparison::AtMost,
                    value: 2
                },
                then: Box::new(Effect::draw(2)),
                otherwise: Some(Box::new(Effect::gain_lore(1))),
            }
        );
    }

    #[test]
    fn test_dynamic_amount() {
        let effect = effect(
            r#"{"action": "dynamic_stat_buff", "target": "self",
                "amount": {"per": "character", "subtype": "Pirate", "scope": "yours", "other": true, "multiplier": 2}}"#,
        )
        .unwrap();

        match effect {
            Effect::StatBuff {
                amount: Amount::Count { filter, multiplier },
                stat,
                ..
            } => {
                assert_eq!(stat, Stat::Strength);
                assert_eq!(multiplier, 2);
                assert_eq!(filter.owner, OwnerScope::Yours);
                assert!(filter.exclude_source);
                assert_eq!(filter.card_type, Some(CardType::Character));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_costs_supersede_cost() {
        let ab = ability(
            r#"{"trigger": "activated", "cost": {"exert": true, "ink": 2},
                "costs": [{"type": "ink", "amount": 1}, {"type": "discard"}], "action": "draw"}"#,
        )
        .unwrap();
        match ab.kind {
            AbilityKind::Activated { costs, .. } => assert_eq!(costs, vec![Cost::Ink(1), Cost::Discard(1)]),
            _ => panic!("expected activated"),
        }
    }

    #[test]
    fn test_legacy_cost_object() {
        let ab = ability(r#"{"trigger": "activated", "cost": {"banish_self": true, "exert": true}, "action": "draw"}"#)
            .unwrap();
        match ab.kind {
            AbilityKind::Activated { costs, .. } => assert_eq!(costs, vec![Cost::Exert, Cost::BanishSelf]),
            _ => panic!("expected activated"),
        }
    }

    #[test]
    fn test_static_ability() {
        let ab = ability(
            r#"{"trigger": "static",
                "condition": {"type": "has_card_named", "name": "Captain"},
                "effects": [
                    {"type": "modify_strength", "amount": 2,
                     "target": {"type": "all", "mine": true, "other": true, "subtypes": ["Pirate"]}},
                    {"action": "grant_keyword", "keyword": "Evasive",
                     "condition": {"type": "self_damaged"}}
                ]}"#,
        )
        .unwrap();

        assert!(ab.condition.is_some());
        let effects = ab.static_effects();
        assert_eq!(effects.len(), 2);
        match &effects[0] {
            StaticEffect::Modify {
                stat,
                amount,
                target: StaticTarget::Cards(filter),
                condition: None,
            } => {
                assert_eq!(*stat, Stat::Strength);
                assert_eq!(*amount, Amount::Fixed(2));
                assert_eq!(filter.owner, OwnerScope::Yours);
                assert!(filter.exclude_source);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            &effects[1],
            StaticEffect::GrantKeyword { keyword: Keyword::Evasive, target: StaticTarget::SelfOnly, condition: Some(_) }
        ));
    }

    #[test]
    fn test_static_legacy_forms() {
        let ab = ability(r#"{"trigger": "static", "action": "buff_subtype", "subtype": "Hero", "amount": 1}"#).unwrap();
        match &ab.static_effects()[0] {
            StaticEffect::Legacy(LegacyStatic::BuffSubtype { filter, stat, amount }) => {
                assert!(filter.subtypes.iter().any(|s| s == "Hero"));
                assert_eq!(*stat, Stat::Strength);
                assert_eq!(*amount, 1);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(matches!(
            ability(r#"{"trigger": "static", "action": "conditional_lore_bonus", "amount": 1}"#),
            Err(EngineError::InvalidAst(_))
        ));

        let bonus = ability(
            r#"{"trigger": "static", "condition": {"type": "self_exerted"},
                "action": "conditional_lore_bonus", "amount": 2}"#,
        )
        .unwrap();
        assert!(bonus.condition.is_none());
        assert_eq!(
            bonus.static_effects(),
            &[StaticEffect::Legacy(LegacyStatic::ConditionalLoreBonus {
                condition: Condition::SelfExerted(true),
                amount: 2
            })]
        );
    }

    #[test]
    fn test_keyword_abilities() {
        let boost = ability(r#"{"trigger": "keyword", "keyword": "Boost 2"}"#).unwrap();
        assert!(boost.is_boost());
        assert!(matches!(boost.kind, AbilityKind::Activated { ref costs, .. } if costs == &vec![Cost::Ink(2)]));

        let resist = ability(r#"{"trigger": "static", "keyword": "Resist +1"}"#).unwrap();
        assert_eq!(resist.static_effects(), &[StaticEffect::Resist(1)]);

        let singer = ability(r#"{"trigger": "keyword", "keyword": "Singer 5"}"#).unwrap();
        assert_eq!(singer.keyword, Some(Keyword::Singer(5)));
    }

    #[test]
    fn test_triggered_default_and_unknown_trigger() {
        let ab = ability(r#"{"action": "draw", "amount": 1}"#).unwrap();
        assert_eq!(ab.trigger(), Some(TriggerKind::OnPlay));

        assert!(matches!(ability(r#"{"trigger": "whenever", "action": "draw"}"#), Err(EngineError::InvalidAst(_))));
    }

    #[test]
    fn test_condition_moves_into_conditional_effect() {
        let ab = ability(
            r#"{"trigger": "on_quest", "condition": {"type": "card_placed_under_this_turn"},
                "action": "conditional_effect", "then": {"action": "gain_lore", "amount": 2}}"#,
        )
        .unwrap();

        assert!(ab.condition.is_none());
        assert!(matches!(
            ab.effect(),
            Some(Effect::Conditional { condition: Condition::CardPlacedUnderThisTurn, .. })
        ));
    }
}
