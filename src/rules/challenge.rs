//! Challenges between characters.
//!
//! ## Who can be challenged
//!
//! Only exerted opposing characters. Evasive defenders can only be
//! challenged by Evasive attackers, and while the defending player has an
//! exerted Bodyguard the attacker is able to challenge, it must be chosen.

use log::{debug, info};

use super::ability::fire_triggers;
use super::context::GameContext;
use crate::cards::{CardInstance, CardType, Keyword};
use crate::continuous;
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::core::EngineError;
use crate::effects::{apply_damage, Restriction, TriggerKind};
use crate::triggers::{EventKind, GameEvent};

fn can_reach(attacker: &CardInstance, defender: &CardInstance) -> bool {
    defender.card_type == CardType::Character
        && !defender.ready
        && (!defender.has_keyword(&Keyword::Evasive) || attacker.has_keyword(&Keyword::Evasive))
}

/// Challenge `defender` with `player`'s `attacker`.
///
/// Both characters deal damage equal to their strength to each other;
/// the attacker adds its Challenger bonus.
pub fn challenge(
    ctx: &mut GameContext,
    player: PlayerId,
    attacker_id: InstanceId,
    defender_id: InstanceId,
) -> Result<bool, EngineError> {
    let state = &*ctx.state;
    let Some(attacker) = state.in_play(attacker_id).filter(|c| c.owner == player) else {
        debug!("{} has no {} in play", player, attacker_id);
        return Ok(false);
    };
    if attacker.card_type != CardType::Character || !attacker.ready {
        debug!("{} can't challenge", attacker.name);
        return Ok(false);
    }
    if attacker.is_drying(state.turn_number) && !attacker.has_keyword(&Keyword::Rush) {
        debug!("{} is drying", attacker.name);
        return Ok(false);
    }
    if state.card_restricted(attacker_id, Restriction::CantChallenge) {
        debug!("{} can't challenge", attacker.name);
        return Ok(false);
    }
    let Some(defender) = state.in_play(defender_id) else {
        debug!("{} is not in play", defender_id);
        return Ok(false);
    };
    if defender.owner == player || !can_reach(attacker, defender) {
        debug!("{} can't challenge {}", attacker.name, defender.name);
        return Ok(false);
    }
    if !defender.has_keyword(&Keyword::Bodyguard) {
        let guarded = state
            .player(defender.owner)
            .characters()
            .any(|c| c.has_keyword(&Keyword::Bodyguard) && can_reach(attacker, c));
        if guarded {
            debug!("{} must challenge a Bodyguard first", attacker.name);
            return Ok(false);
        }
    }

    let dealt = attacker.effective_strength() + attacker.challenger_bonus();
    let taken = defender.effective_strength();
    let (opponent, names) = (defender.owner, (attacker.name.clone(), defender.name.clone()));
    info!(target: "lore_engine::action", "{} challenges {}", names.0, names.1);

    if let Some(card) = ctx.state.card_mut(attacker_id) {
        card.ready = false;
    }
    ctx.events.notify(ctx.state, &GameEvent::exerted(player, attacker_id));
    let event = GameEvent::new(EventKind::CardChallenged, player)
        .with_source(attacker_id)
        .with_target(defender_id);
    ctx.events.emit(ctx.state, &event);
    continuous::recalculate(ctx.state);

    apply_damage(ctx, defender_id, dealt, player, Some(attacker_id));
    apply_damage(ctx, attacker_id, taken, opponent, Some(defender_id));

    ctx.depth += 1;
    let resolved = fire_triggers(ctx, attacker_id, TriggerKind::OnChallenge, Some(defender_id));
    ctx.depth -= 1;
    resolved?;

    ctx.settle()?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Zone;
    use crate::core::{EngineConfig, GameState};
    use crate::decisions::NoDecisions;
    use crate::effects::{Ability, Effect};
    use crate::triggers::NullEventBus;

    fn p(id: u8) -> PlayerId {
        PlayerId::new(id)
    }

    fn setup(attacker: CardInstance, defender: CardInstance) -> GameState {
        let mut state = GameState::new(EngineConfig::new(2), 1);
        state.turn_number = 3;
        state.put_into(attacker, Zone::Play);
        let mut defender = defender;
        defender.ready = false;
        state.put_into(defender, Zone::Play);
        continuous::recalculate(&mut state);
        state
    }

    fn run(state: &mut GameState, attacker: u32, defender: u32) -> bool {
        let (mut decisions, mut events) = (NoDecisions, NullEventBus);
        let mut ctx = GameContext::new(state, &mut decisions, &mut events);
        challenge(&mut ctx, p(0), InstanceId(attacker), InstanceId(defender)).unwrap()
    }

    fn card(state: &GameState, id: u32) -> &CardInstance {
        state.find_card(InstanceId(id)).unwrap()
    }

    #[test]
    fn test_damage_exchange_and_banish() {
        let mut state = setup(
            CardInstance::character(InstanceId(1), p(0), "Brawler", 3, 3, 4, 1),
            CardInstance::character(InstanceId(2), p(1), "Victim", 2, 2, 3, 1),
        );
        assert!(run(&mut state, 1, 2));

        assert_eq!(card(&state, 2).zone, Zone::Discard);
        let brawler = card(&state, 1);
        assert_eq!(brawler.damage, 2);
        assert!(!brawler.ready);
    }

    #[test]
    fn test_challenger_and_resist() {
        let mut state = setup(
            CardInstance::character(InstanceId(1), p(0), "Duelist", 3, 1, 4, 1).with_keyword(Keyword::Challenger(2)),
            CardInstance::character(InstanceId(2), p(1), "Knight", 2, 1, 5, 1).with_keyword(Keyword::Resist(1)),
        );
        assert!(run(&mut state, 1, 2));
        assert_eq!(card(&state, 2).damage, 2);
        assert_eq!(card(&state, 1).damage, 1);
    }

    #[test]
    fn test_ready_defender_and_drying_attacker() {
        let mut state = setup(
            CardInstance::character(InstanceId(1), p(0), "Rookie", 3, 3, 4, 1),
            CardInstance::character(InstanceId(2), p(1), "Guard", 2, 1, 3, 1),
        );
        state.card_mut(InstanceId(1)).unwrap().turn_played = Some(3);
        assert!(!run(&mut state, 1, 2));

        state.card_mut(InstanceId(1)).unwrap().base_keywords.push(Keyword::Rush);
        continuous::recalculate(&mut state);
        state.card_mut(InstanceId(2)).unwrap().ready = true;
        assert!(!run(&mut state, 1, 2));

        state.card_mut(InstanceId(2)).unwrap().ready = false;
        assert!(run(&mut state, 1, 2));
    }

    #[test]
    fn test_evasive_and_bodyguard() {
        let mut state = setup(
            CardInstance::character(InstanceId(1), p(0), "Grunt", 3, 1, 4, 1),
            CardInstance::character(InstanceId(2), p(1), "Flyer", 2, 1, 3, 1).with_keyword(Keyword::Evasive),
        );
        assert!(!run(&mut state, 1, 2));

        let mut guard = CardInstance::character(InstanceId(3), p(1), "Shield", 2, 1, 5, 1).with_keyword(Keyword::Bodyguard);
        guard.ready = false;
        state.put_into(guard, Zone::Play);
        state.put_into(CardInstance::character(InstanceId(4), p(1), "Squire", 2, 1, 3, 1), Zone::Play);
        state.card_mut(InstanceId(4)).unwrap().ready = false;
        continuous::recalculate(&mut state);

        assert!(!run(&mut state, 1, 4));
        assert!(run(&mut state, 1, 3));
    }

    #[test]
    fn test_on_challenge_trigger() {
        let attacker = CardInstance::character(InstanceId(1), p(0), "Raider", 3, 1, 4, 1)
            .with_ability(Ability::triggered(TriggerKind::OnChallenge, Effect::gain_lore(1)));
        let mut state = setup(attacker, CardInstance::character(InstanceId(2), p(1), "Mark", 2, 1, 3, 1));
        assert!(run(&mut state, 1, 2));
        assert_eq!(state.player(p(0)).lore, 1);
    }
}
