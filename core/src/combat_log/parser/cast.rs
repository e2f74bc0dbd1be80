use super::LineContext;
use crate::combat_log::line::TokenSequence;
use crate::combat_log::record::{
    CastKind, ClassifiedRecord, ReceivedSpellRecord, SpecialRecord, SpellCastRecord, ZoneRecord,
};
use crate::context::{IStr, intern};
use crate::game_data::{SPECIAL_CODES, labels};
use crate::registry::SpellResolution;
use memchr::memmem;

const ZONE_PREFIX: &str = "You have entered ";
/// "You have entered an area where levitation effects do not function." and
/// arena notices aren't zone changes.
const NOT_ZONES: [&str; 2] = ["an area", "an Arena"];

const WORN_OFF_PREFIX: &str = "Your ";
const WORN_OFF_INFIX: &str = " spell has worn off of ";

/// Landed-on-other messages are looked up after this many leading words at most.
const MAX_RECEIVER_WORDS: usize = 4;

const SELF_CASTS: [(&str, CastKind); 3] = [
    ("You begin casting ", CastKind::Cast),
    ("You begin singing ", CastKind::Sing),
    ("You activate ", CastKind::Activate),
];

const OTHER_CASTS: [(&str, CastKind); 3] = [
    (" begins casting ", CastKind::Cast),
    (" begins singing ", CastKind::Sing),
    (" activates ", CastKind::Activate),
];

const LEGACY_CASTS: [(&str, CastKind); 2] = [
    (" begins to cast a spell.", CastKind::Cast),
    (" begins to sing a song.", CastKind::Sing),
];

pub(super) fn classify(
    ctx: &LineContext<'_>,
    text: &str,
    tokens: &TokenSequence<'_>,
) -> Option<ClassifiedRecord> {
    zone(text)
        .map(ClassifiedRecord::Zone)
        .or_else(|| worn_off(ctx, text).map(ClassifiedRecord::ReceivedSpell))
        .or_else(|| on_you(ctx, text).map(ClassifiedRecord::ReceivedSpell))
        .or_else(|| on_other(ctx, text).map(ClassifiedRecord::ReceivedSpell))
        .or_else(|| interrupted(ctx, tokens).map(ClassifiedRecord::SpellCast))
        .or_else(|| cast(ctx, text))
}

fn sentence(text: &str) -> &str {
    text.strip_suffix('.').unwrap_or(text)
}

fn named_spell(resolution: &Option<SpellResolution>) -> Option<IStr> {
    resolution
        .as_ref()
        .and_then(|r| r.unique())
        .map(|spell| intern(&spell.name))
}

// ─────────────────────────────────────────────────────────────────────────────
// Announcements that take priority over casts
// ─────────────────────────────────────────────────────────────────────────────

fn zone(text: &str) -> Option<ZoneRecord> {
    let zone = sentence(text.strip_prefix(ZONE_PREFIX)?);
    if zone.is_empty() || NOT_ZONES.iter().any(|p| zone.starts_with(p)) {
        return None;
    }
    Some(ZoneRecord { zone: intern(zone) })
}

/// "Your Clarity spell has worn off of Kazint."
fn worn_off(ctx: &LineContext<'_>, text: &str) -> Option<ReceivedSpellRecord> {
    let rest = text.strip_prefix(WORN_OFF_PREFIX)?;
    let pos = memmem::find(rest.as_bytes(), WORN_OFF_INFIX.as_bytes())?;
    let spell = &rest[..pos];
    let receiver = sentence(&rest[pos + WORN_OFF_INFIX.len()..]);
    if spell.is_empty() || receiver.is_empty() {
        return None;
    }
    Some(ReceivedSpellRecord {
        receiver: ctx.name(receiver),
        spell: Some(intern(spell)),
        resolution: ctx.spells.resolve(spell),
        wore_off: true,
    })
}

/// Catalog text addressed to the local player: landing or wearing off.
fn on_you(ctx: &LineContext<'_>, text: &str) -> Option<ReceivedSpellRecord> {
    let (resolution, wore_off) = match ctx.spells.wear_off(text) {
        Some(resolution) => (resolution, true),
        None => (ctx.spells.lands_on_you(text)?, false),
    };
    let resolution = Some(resolution);
    Some(ReceivedSpellRecord {
        receiver: intern(ctx.player()),
        spell: named_spell(&resolution),
        resolution,
        wore_off,
    })
}

/// "<Name> <catalog text>". The name may span several words.
fn on_other(ctx: &LineContext<'_>, text: &str) -> Option<ReceivedSpellRecord> {
    let (receiver, resolution) = memchr::memchr_iter(b' ', text.as_bytes())
        .take(MAX_RECEIVER_WORDS)
        .find_map(|sp| {
            ctx.spells
                .lands_on_other(&text[sp + 1..])
                .map(|resolution| (&text[..sp], resolution))
        })?;

    if resolution.candidates().iter().any(|spell| spell.pet_only) {
        ctx.identity.add_verified_pet(receiver);
    }
    let resolution = Some(resolution);
    Some(ReceivedSpellRecord {
        receiver: ctx.name(receiver),
        spell: named_spell(&resolution),
        resolution,
        wore_off: false,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Casts
// ─────────────────────────────────────────────────────────────────────────────

/// "Your Fire Bolt spell is interrupted." / "Kazint's Fire Bolt spell is interrupted."
fn interrupted(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>) -> Option<SpellCastRecord> {
    let last = tokens.last_index();
    if last < 4
        || !tokens.is(last, "interrupted.")
        || !tokens.is(last - 1, "is")
        || !tokens.is(last - 2, "spell")
    {
        return None;
    }
    let owner = (0..last - 2).find(|&i| {
        tokens[i] == "Your" || tokens[i].ends_with("'s") || tokens[i].ends_with("`s")
    })?;

    let caster = if tokens[owner] == "Your" {
        ctx.player().to_string()
    } else {
        let joined = tokens.join(0, owner + 1);
        joined[..joined.len() - 2].to_string()
    };
    let spell = tokens.join(owner + 1, last - 2);
    if caster.is_empty() || spell.is_empty() {
        return None;
    }

    Some(SpellCastRecord {
        caster: intern(&caster),
        spell: intern(&spell),
        kind: CastKind::Cast,
        interrupted: true,
        resolution: ctx.spells.resolve(&spell),
    })
}

fn split_cast(text: &str) -> Option<(&str, &str, CastKind)> {
    for (prefix, kind) in SELF_CASTS {
        if let Some(spell) = text.strip_prefix(prefix) {
            return Some((labels::YOU, sentence(spell), kind));
        }
    }
    for (infix, kind) in OTHER_CASTS {
        if let Some(pos) = memmem::find(text.as_bytes(), infix.as_bytes()) {
            return Some((&text[..pos], sentence(&text[pos + infix.len()..]), kind));
        }
    }
    // "Kazint begins to cast a spell. <Complete Heal>"
    for (infix, kind) in LEGACY_CASTS {
        if let Some(pos) = memmem::find(text.as_bytes(), infix.as_bytes()) {
            let rest = &text[pos + infix.len()..];
            let open = rest.find('<')?;
            let close = open + rest[open..].find('>')?;
            return Some((&text[..pos], &rest[open + 1..close], kind));
        }
    }
    None
}

fn cast(ctx: &LineContext<'_>, text: &str) -> Option<ClassifiedRecord> {
    let (caster, spell, kind) = split_cast(text)?;
    if caster.is_empty() || spell.is_empty() {
        return None;
    }
    let is_self = ctx.is_self(caster);
    let caster = ctx.actor(caster);

    if is_self && let Some(code) = SPECIAL_CODES.get(spell) {
        return Some(ClassifiedRecord::Special(SpecialRecord {
            player: intern(caster),
            code: *code,
            spell: intern(spell),
        }));
    }

    let resolution = ctx.spells.resolve(spell);
    if let Some(class) = resolution
        .as_ref()
        .and_then(|r| r.unique())
        .and_then(|spell| spell.single_class())
        && ctx.register_player(caster)
    {
        ctx.identity.set_player_class(caster, class);
    }

    Some(ClassifiedRecord::SpellCast(SpellCastRecord {
        caster: intern(caster),
        spell: intern(spell),
        kind,
        interrupted: false,
        resolution,
    }))
}
