//! Singing songs.
//!
//! A character may exert to play a song for free if its singing value
//! reaches the song's requirement. The singing value is the larger of the
//! character's printed cost and any `Singer N` it has.

use log::{debug, info};

use super::context::GameContext;
use crate::cards::{CardInstance, CardType, Keyword, Zone};
use crate::core::entity::InstanceId;
use crate::core::player::PlayerId;
use crate::core::{EngineError, GameState};
use crate::effects::{EffectResolver, Invocation, Restriction};
use crate::triggers::GameEvent;

fn singer_rating(keyword: &Keyword) -> Option<u32> {
    match keyword {
        Keyword::Singer(n) => Some(*n),
        _ => None,
    }
}

/// How costly a song this character can sing.
///
/// Reads derived keywords, printed keywords and keyword-tagged abilities,
/// so a `Singer` granted this turn counts.
#[must_use]
pub fn singer_value(card: &CardInstance) -> u32 {
    let keywords = card.keywords.iter().chain(&card.base_keywords);
    let tagged = card.abilities.iter().filter_map(|a| a.keyword.as_ref());
    keywords
        .chain(tagged)
        .filter_map(singer_rating)
        .fold(card.cost, u32::max)
}

/// The cost a singer must reach to sing `song`.
#[must_use]
pub fn song_requirement(state: &GameState, song: &CardInstance) -> u32 {
    song.abilities
        .iter()
        .filter_map(|a| a.effect())
        .find_map(|e| e.sing_requirement())
        .unwrap_or(state.config.default_song_cost)
}

/// Exert `singer` to sing `song` from `player`'s hand.
pub fn sing_song(
    ctx: &mut GameContext,
    player: PlayerId,
    singer_id: InstanceId,
    song_id: InstanceId,
) -> Result<bool, EngineError> {
    let state = &*ctx.state;
    let Some(singer) = state.in_play(singer_id).filter(|c| c.owner == player) else {
        debug!("{} has no {} in play", player, singer_id);
        return Ok(false);
    };
    if singer.card_type != CardType::Character || !singer.ready {
        debug!("{} can't sing", singer.name);
        return Ok(false);
    }
    if singer.is_drying(state.turn_number) {
        debug!("{} is drying and can't sing", singer.name);
        return Ok(false);
    }
    let Some(song) = state.player(player).hand.iter().find(|c| c.instance_id == song_id) else {
        debug!("{} is not in {}'s hand", song_id, player);
        return Ok(false);
    };
    if !song.is_song() {
        debug!("{} is not a song", song.name);
        return Ok(false);
    }
    if state.player_restricted(player, Restriction::CantPlaySongs) {
        debug!("{} can't play songs", player);
        return Ok(false);
    }
    let (value, required) = (singer_value(singer), song_requirement(state, song));
    if value < required {
        debug!("{} sings at {}, {} needs {}", singer.name, value, song.name, required);
        return Ok(false);
    }
    let effects: Vec<_> = song
        .abilities
        .iter()
        .filter_map(|a| a.effect())
        .filter_map(|e| e.without_sing_requirement())
        .collect();
    info!(target: "lore_engine::action", "{} sings {}", singer.name, song.name);

    if let Some(card) = ctx.state.card_mut(singer_id) {
        card.ready = false;
    }
    ctx.events.notify(ctx.state, &GameEvent::exerted(player, singer_id));
    ctx.events.emit(ctx.state, &GameEvent::sung(player, singer_id, song_id));
    ctx.state.move_card(song_id, Zone::Discard);

    let invocation = Invocation::new(player).from_source(song_id);
    ctx.depth += 1;
    let resolved = effects
        .iter()
        .try_for_each(|effect| EffectResolver::resolve(ctx, effect, &invocation));
    ctx.depth -= 1;
    resolved?;

    ctx.settle()?;
    Ok(true)
}
