//! The turn cycle.
//!
//! ## Start of turn
//!
//! 1. Effects lasting until the player's next turn expire
//! 2. The player's cards and ink ready, unless something says otherwise
//! 3. Per-turn flags and ability markers reset
//! 4. The player draws (not on the very first turn unless configured)
//! 5. Start-of-turn abilities resolve
//!
//! ## End of turn
//!
//! End-of-turn abilities resolve first, then this-turn effects expire and
//! play passes to the next player.

use log::{debug, info};

use super::ability::fire_triggers;
use super::context::GameContext;
use crate::continuous;
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::core::{EngineError, GameState};
use crate::effects::{ActiveEffect, Duration, Restriction, TriggerKind};
use crate::triggers::{ConditionContext, ConditionEvaluator, EventKind, GameEvent};

const LOG_TARGET: &str = "lore_engine::action";

fn condition_met(state: &GameState, effect: &ActiveEffect) -> bool {
    match &effect.duration {
        Duration::Until(condition) => {
            ConditionEvaluator::evaluate(condition, &ConditionContext::new(state, effect.controller, effect.source))
        }
        _ => false,
    }
}

/// Drop `Until` effects whose condition now holds.
fn expire_satisfied(state: &mut GameState) {
    let view = &*state;
    let expired: Vec<_> = view
        .active_effects
        .iter()
        .filter(|e| condition_met(view, e))
        .map(|e| e.id)
        .collect();
    if !expired.is_empty() {
        debug!("{} conditional effects expire", expired.len());
        state.remove_effects(|e| expired.contains(&e.id));
    }
}

/// Resolve `trigger` on every card `player` has in play, in play order.
fn fire_for_player(ctx: &mut GameContext, player: PlayerId, trigger: TriggerKind) -> Result<(), EngineError> {
    let cards: Vec<InstanceId> = ctx.state.player(player).play.iter().map(|c| c.instance_id).collect();
    ctx.depth += 1;
    let result = cards
        .into_iter()
        .try_for_each(|id| fire_triggers(ctx, id, trigger, None));
    ctx.depth -= 1;
    result
}

/// Begin the active player's turn.
pub fn start_turn(ctx: &mut GameContext) -> Result<(), EngineError> {
    let player = ctx.state.active_player;
    let turn = ctx.state.turn_number;
    info!(target: LOG_TARGET, "turn {} begins for {}", turn, player);

    ctx.state
        .remove_effects(|e| matches!(e.duration, Duration::NextTurnStart) && e.controller == player && e.created_turn < turn);
    expire_satisfied(ctx.state);
    continuous::recalculate(ctx.state);

    let view = &*ctx.state;
    let held: Vec<InstanceId> = view
        .player(player)
        .play
        .iter()
        .map(|c| c.instance_id)
        .filter(|id| view.card_restricted(*id, Restriction::CantReady))
        .collect();
    let state = ctx.state.player_mut(player);
    for card in state.play.iter_mut() {
        card.meta.clear_turn_markers();
        if !held.contains(&card.instance_id) {
            card.ready = true;
        }
    }
    for card in state.inkwell.iter_mut() {
        card.ready = true;
    }
    state.inked_this_turn = false;

    if turn > 1 || ctx.state.config.draw_on_first_turn {
        for id in ctx.state.draw(player, 1) {
            let event = GameEvent::new(EventKind::CardDrawn, player).with_source(id);
            ctx.events.notify(ctx.state, &event);
        }
    }
    continuous::recalculate(ctx.state);

    ctx.events.emit(ctx.state, &GameEvent::new(EventKind::TurnStarted, player).with_value(i64::from(turn)));
    fire_for_player(ctx, player, TriggerKind::OnStartTurn)?;
    ctx.settle()
}

/// End the active player's turn and hand play to the next player.
pub fn end_turn(ctx: &mut GameContext) -> Result<(), EngineError> {
    let player = ctx.state.active_player;
    let turn = ctx.state.turn_number;
    fire_for_player(ctx, player, TriggerKind::OnEndTurn)?;

    ctx.state
        .remove_effects(|e| matches!(e.duration, Duration::UntilEndOfTurn | Duration::OneUse));
    expire_satisfied(ctx.state);
    for (_, state) in ctx.state.players.iter_mut() {
        for card in state.play.iter_mut() {
            card.meta.temporary_strength = 0;
        }
    }
    ctx.state.player_mut(player).cost_reductions.clear();
    ctx.state.turn_history.clear();

    ctx.events.emit(ctx.state, &GameEvent::new(EventKind::TurnEnded, player).with_value(i64::from(turn)));
    info!(target: LOG_TARGET, "turn {} ends for {}", turn, player);

    ctx.state.active_player = ctx.state.next_player(player);
    ctx.state.turn_number += 1;
    ctx.settle()
}

/// End the current turn and start the next one, unless the game is over.
pub fn pass_turn(ctx: &mut GameContext) -> Result<(), EngineError> {
    end_turn(ctx)?;
    if ctx.state.is_over() {
        return Ok(());
    }
    start_turn(ctx)
}
