use super::LineContext;
use crate::game_data::OWNER_SUFFIXES;

const TARGETED: &str = "Targeted (";
const TARGETED_PLAYER: &str = "Targeted (Player): ";
const JOINED: [&str; 3] = [" has joined the raid.", " joined the raid.", " has joined the group."];
const SHRINKS: &str = " shrinks.";
const SAYS: &str = " says, '";
const LEADER: &str = "My leader is ";
const LEADER_END: &str = ".'";

/// Identity announcements that carry no combat information. Returns true if
/// the line was one of them and must not be classified further.
pub(super) fn consume(ctx: &LineContext<'_>, text: &str) -> bool {
    if text.starts_with(TARGETED) {
        if let Some(name) = text.strip_prefix(TARGETED_PLAYER) {
            ctx.register_player(name.trim_end());
        }
        return true;
    }

    for suffix in JOINED {
        if let Some(name) = text.strip_suffix(suffix) {
            if !ctx.is_self(name) {
                ctx.register_player(name);
            }
            return true;
        }
    }

    if let Some(pet) = text.strip_suffix(SHRINKS) {
        for suffix in OWNER_SUFFIXES {
            if let Some(owner) = pet.strip_suffix(suffix)
                && ctx.identity.is_possible_player_name(owner)
            {
                ctx.register_pet(pet, owner);
                break;
            }
        }
        return true;
    }

    // "Gobaber says, 'My leader is Fllint.'" and nothing else in the line
    if let Some((pet, said)) = text.split_once(SAYS)
        && let Some(owner) = said
            .strip_prefix(LEADER)
            .and_then(|rest| rest.strip_suffix(LEADER_END))
        && !pet.is_empty()
        && !ctx.identity.is_verified_player(pet)
    {
        if ctx.identity.is_possible_player_name(owner) {
            ctx.register_pet(pet, owner);
        }
        return true;
    }

    false
}
