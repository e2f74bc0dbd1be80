use super::LineContext;
use crate::combat_log::line::TokenSequence;
use crate::combat_log::record::{
    ClassifiedRecord, LootRecord, LootSource, MezBreakRecord, ResistKind, ResistRecord,
    RollRecord,
};
use crate::context::{IStr, intern};
use crate::game_data::{CORPSE_SUFFIXES, CURRENCY_RATES, PlayerClass, labels};

const ANONYMOUS: &str = "ANONYMOUS";
const MAGIC_DIE: &str = "**A Magic Die is rolled by ";

/// Single forward pass: the first trigger word that validates wins.
pub(super) fn classify(
    ctx: &LineContext<'_>,
    text: &str,
    tokens: &TokenSequence<'_>,
) -> Option<ClassifiedRecord> {
    if who(ctx, text) {
        return None;
    }

    // "--Kazint has looted a Bone Chip from a goblin's corpse.--"
    let unwrapped;
    let tokens = match text.strip_prefix("--").and_then(|t| t.strip_suffix("--")) {
        Some(inner) => {
            unwrapped = TokenSequence::new(inner);
            &unwrapped
        }
        None => tokens,
    };
    let last = tokens.last_index();

    for (i, &token) in tokens.iter().enumerate() {
        let record = match token {
            "looted" => looted(ctx, tokens, i, last).map(ClassifiedRecord::Loot),
            "receive" if i == 1 && tokens.is(0, "You") => {
                currency(ctx, tokens, last).map(ClassifiedRecord::Loot)
            }
            "won" => won_roll(ctx, tokens, i, last).map(ClassifiedRecord::Loot),
            "given" => given(ctx, tokens, i, last).map(ClassifiedRecord::Loot),
            "awakened" => awakened(ctx, tokens, i, last).map(ClassifiedRecord::MezBreak),
            "reflected" => reflected(ctx, tokens, i, last).map(ClassifiedRecord::Resist),
            "resisted" | "resist" => resisted(ctx, tokens, i, last).map(ClassifiedRecord::Resist),
            "rolled" => rolled(ctx, text).map(ClassifiedRecord::Rolled),
            _ => None,
        };
        if record.is_some() {
            return record;
        }
    }
    None
}

fn tail(tokens: &TokenSequence<'_>, start: usize, last: usize) -> String {
    let mut text = tokens.join(start, last + 1);
    while text.ends_with(['.', '!']) {
        text.pop();
    }
    text
}

fn quantity(word: &str) -> Option<u64> {
    match word {
        "a" | "an" => Some(1),
        n => n.parse::<u64>().ok(),
    }
}

fn strip_corpse(name: &str) -> &str {
    CORPSE_SUFFIXES
        .iter()
        .find_map(|s| name.strip_suffix(s))
        .unwrap_or(name)
}

// ─────────────────────────────────────────────────────────────────────────────
// Loot
// ─────────────────────────────────────────────────────────────────────────────

/// "Kazint has looted a Bone Chip from a goblin's corpse."
fn looted(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>, at: usize, last: usize) -> Option<LootRecord> {
    if at < 2 || !tokens.is_any(at - 1, &["has", "have"]) {
        return None;
    }
    let looter = tokens.join(0, at - 1);
    let quantity = quantity(tokens.get(at + 1)?)?;

    let (item, source) = match (at + 2..=last).find(|&i| tokens[i] == "from") {
        Some(from) => {
            let npc = tail(tokens, from + 1, last);
            let npc = strip_corpse(&npc);
            (tokens.join(at + 2, from), LootSource::Corpse(intern(npc)))
        }
        None => (tail(tokens, at + 2, last), LootSource::Unknown),
    };
    if looter.is_empty() || item.is_empty() {
        return None;
    }
    Some(LootRecord {
        looter: ctx.name(&looter),
        item: intern(&item),
        quantity,
        source,
    })
}

/// "You receive 129 platinum, 2 gold and 1 copper as your split."
/// "You receive 3 gold from the corpse."
fn currency(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>, last: usize) -> Option<LootRecord> {
    let mut copper = 0u64;
    let mut i = 2;
    let mut source = LootSource::Unknown;

    while i <= last {
        let token = tokens[i];
        match token {
            "and" | "," | "" => i += 1,
            "as" => {
                if tokens.is(i + 1, "your") && tokens.is(i + 2, "split.") {
                    source = LootSource::Split;
                    break;
                }
                return None;
            }
            "from" => {
                let from = tail(tokens, i + 1, last);
                source = LootSource::Corpse(intern(strip_corpse(&from)));
                break;
            }
            _ => {
                let count = token.parse::<u64>().ok()?;
                let denomination = tokens.get(i + 1)?.trim_end_matches([',', '.']);
                let rate = CURRENCY_RATES.get(denomination)?;
                copper = copper.checked_add(count.checked_mul(*rate)?)?;
                i += 2;
            }
        }
    }

    (copper > 0).then(|| LootRecord {
        looter: intern(ctx.player()),
        item: intern(labels::CURRENCY),
        quantity: copper,
        source,
    })
}

/// "Kazint won the need roll on 1 item(s): Bone Chip with a roll of 883."
fn won_roll(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>, at: usize, last: usize) -> Option<LootRecord> {
    if at == 0 || !tokens.is(at + 1, "the") || last < 4 {
        return None;
    }
    let items = (at + 2..=last).find(|&i| tokens[i] == "item(s):")?;
    if !tokens.is(items - 2, "on") {
        return None;
    }
    let quantity = quantity(tokens[items - 1])?;
    if !tokens.is(last - 2, "roll") || !tokens.is(last - 1, "of") || !tokens.is(last - 4, "with") {
        return None;
    }
    let roll = tokens[last].trim_end_matches('.').parse::<u32>().ok()?;
    let item = tokens.join(items + 1, last - 4);
    if item.is_empty() {
        return None;
    }
    Some(LootRecord {
        looter: ctx.name(&tokens.join(0, at)),
        item: intern(&item),
        quantity,
        source: LootSource::WonRoll { roll },
    })
}

/// "Kazint was given 1 item(s): Bone Chip."
fn given(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>, at: usize, last: usize) -> Option<LootRecord> {
    if at < 2 || !tokens.is(at - 1, "was") || !tokens.is(at + 2, "item(s):") {
        return None;
    }
    let quantity = quantity(tokens.get(at + 1)?)?;
    let item = tail(tokens, at + 3, last);
    if item.is_empty() {
        return None;
    }
    Some(LootRecord {
        looter: ctx.name(&tokens.join(0, at - 1)),
        item: intern(&item),
        quantity,
        source: LootSource::Given,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Spells
// ─────────────────────────────────────────────────────────────────────────────

/// "a goblin has been awakened by Kazint."
fn awakened(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>, at: usize, last: usize) -> Option<MezBreakRecord> {
    if at < 3 || !tokens.is(at - 1, "been") || !tokens.is(at - 2, "has") || !tokens.is(at + 1, "by") {
        return None;
    }
    let breaker = tail(tokens, at + 2, last);
    if breaker.is_empty() {
        return None;
    }
    Some(MezBreakRecord {
        breaker: ctx.name(&breaker),
        awakened: ctx.name(&tokens.join(0, at - 2)),
    })
}

/// "Kazint's Fire Bolt spell has been reflected by a goblin."
fn reflected(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>, at: usize, last: usize) -> Option<ResistRecord> {
    if at < 5
        || !tokens.is(at - 1, "been")
        || !tokens.is(at - 2, "has")
        || !tokens.is(at - 3, "spell")
        || !tokens.is(at + 1, "by")
    {
        return None;
    }
    let owner = (0..at - 3).find(|&i| tokens[i] == "Your" || tokens[i].ends_with("'s"))?;
    let caster = tokens.join(0, owner + 1);
    let caster = caster.strip_suffix("'s").unwrap_or(&caster);
    let spell = tokens.join(owner + 1, at - 3);
    let defender = tail(tokens, at + 2, last);
    if spell.is_empty() || defender.is_empty() {
        return None;
    }
    Some(ResistRecord {
        attacker: ctx.name(caster),
        defender: ctx.name(&defender),
        spell: intern(&spell),
        kind: ResistKind::Reflected,
    })
}

/// "a goblin resisted your Fire Bolt!", "Your target resisted the Fire Bolt
/// spell.", "You resist the Fire Bolt spell!"
fn resisted(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>, at: usize, last: usize) -> Option<ResistRecord> {
    let unknown = || intern(labels::UNK);
    let player = || intern(ctx.player());

    let (attacker, defender, spell): (IStr, IStr, String) = if tokens[at] == "resisted"
        && at == 2
        && tokens.is(0, "Your")
        && tokens.is(1, "target")
        && tokens.is(3, "the")
        && tokens.is_any(last, &["spell.", "spell!"])
    {
        (player(), unknown(), tokens.join(4, last))
    } else if tokens[at] == "resisted" && at > 0 && tokens.is(at + 1, "your") {
        (player(), ctx.name(&tokens.join(0, at)), tail(tokens, at + 2, last))
    } else if tokens[at] == "resist"
        && at == 1
        && tokens.is(0, "You")
        && tokens.is(2, "the")
        && tokens.is_any(last, &["spell.", "spell!"])
    {
        (unknown(), player(), tokens.join(3, last))
    } else {
        return None;
    };

    if spell.is_empty() {
        return None;
    }
    Some(ResistRecord {
        attacker,
        defender,
        spell: intern(&spell),
        kind: ResistKind::Resisted,
    })
}

/// "**A Magic Die is rolled by Kazint. It could have been any number from 0
/// to 1000, but this time it turned up a 532."
fn rolled(ctx: &LineContext<'_>, text: &str) -> Option<RollRecord> {
    let rest = text.strip_prefix(MAGIC_DIE)?;
    let (player, rest) = rest.split_once('.')?;
    let (_, range) = rest.split_once(" from ")?;
    let (low, range) = range.split_once(" to ")?;
    let (max, rest) = range.split_once(',')?;
    let (_, rolled) = rest.rsplit_once(' ')?;

    low.trim().parse::<u32>().ok()?;
    Some(RollRecord {
        player: ctx.name(player),
        max: max.trim().parse().ok()?,
        rolled: rolled.trim_end_matches('.').parse().ok()?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Who
// ─────────────────────────────────────────────────────────────────────────────

/// "[110 Grave Lord (Necromancer)] Kazint (Dark Elf) <Guild>" and
/// "[ANONYMOUS] Kazint". Registers the player; never a record.
fn who(ctx: &LineContext<'_>, text: &str) -> bool {
    let Some(rest) = text.strip_prefix('[') else {
        return false;
    };
    let Some((bracket, after)) = rest.split_once("] ") else {
        return false;
    };
    let name = after.split(' ').next().unwrap_or_default();
    if !ctx.identity.is_possible_player_name(name) {
        return false;
    }

    if bracket == ANONYMOUS {
        ctx.identity.add_verified_player(name);
        return true;
    }

    let Some((level, title)) = bracket.split_once(' ') else {
        return false;
    };
    let Ok(level) = level.parse::<u16>() else {
        return false;
    };
    let class = title
        .rsplit_once('(')
        .and_then(|(_, c)| c.strip_suffix(')'))
        .and_then(PlayerClass::from_name);
    let Some(class) = class else {
        return false;
    };

    ctx.identity.add_verified_player(name);
    ctx.identity.set_player_class(name, class);
    ctx.identity.set_player_level(name, level);
    true
}
