//! Putting a card into the inkwell.

use log::{debug, info};

use super::context::GameContext;
use crate::cards::Zone;
use crate::continuous;
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::triggers::GameEvent;

/// Ink a card from `player`'s hand. Once per turn, inkable cards only.
/// The card enters the inkwell ready.
pub fn ink(ctx: &mut GameContext, player: PlayerId, card_id: InstanceId) -> bool {
    let state = ctx.state.player(player);
    if state.inked_this_turn {
        debug!("{} has already inked this turn", player);
        return false;
    }
    let Some(card) = state.hand.iter().find(|c| c.instance_id == card_id) else {
        debug!("{} is not in {}'s hand", card_id, player);
        return false;
    };
    if !card.inkable {
        debug!("{} is not inkable", card.name);
        return false;
    }
    let name = card.name.clone();

    ctx.state.move_card(card_id, Zone::Inkwell);
    if let Some(card) = ctx.state.card_mut(card_id) {
        card.ready = true;
    }
    ctx.state.player_mut(player).inked_this_turn = true;
    info!(target: "lore_engine::action", "{} inks {}", player, name);

    ctx.events.notify(ctx.state, &GameEvent::inked(player, card_id));
    continuous::recalculate(ctx.state);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardInstance;
    use crate::core::{EngineConfig, GameState};
    use crate::decisions::NoDecisions;
    use crate::triggers::{EventKind, EventLog};

    #[test]
    fn test_ink_once_per_turn() {
        let p0 = PlayerId::new(0);
        let mut state = GameState::new(EngineConfig::new(2), 1);
        for id in 1..=2 {
            state.put_into(CardInstance::character(InstanceId(id), p0, "Inky", 1, 1, 1, 1).inkable(), Zone::Hand);
        }
        let (mut decisions, mut events) = (NoDecisions, EventLog::new());
        let mut ctx = GameContext::new(&mut state, &mut decisions, &mut events);

        assert!(ink(&mut ctx, p0, InstanceId(1)));
        assert!(!ink(&mut ctx, p0, InstanceId(2)));
        assert!(!ink(&mut ctx, p0, InstanceId(2)));

        let player = state.player(p0);
        assert_eq!(player.inkwell.len(), 1);
        assert_eq!(player.hand.len(), 1);
        assert_eq!(player.ready_ink(), 1);
        assert_eq!(events.events().len(), 1);
        assert_eq!(events.events()[0].kind, EventKind::CardInked);
    }

    #[test]
    fn test_uninkable_and_missing_cards() {
        let p0 = PlayerId::new(0);
        let mut state = GameState::new(EngineConfig::new(2), 1);
        state.put_into(CardInstance::character(InstanceId(1), p0, "Dry", 1, 1, 1, 1), Zone::Hand);
        let (mut decisions, mut events) = (NoDecisions, EventLog::new());
        let mut ctx = GameContext::new(&mut state, &mut decisions, &mut events);

        assert!(!ink(&mut ctx, p0, InstanceId(1)));
        assert!(!ink(&mut ctx, p0, InstanceId(9)));
        assert!(!ctx.state.player(p0).inked_this_turn);
    }
}
