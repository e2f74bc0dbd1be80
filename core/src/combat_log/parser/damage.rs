use super::LineContext;
use crate::combat_log::line::TokenSequence;
use crate::combat_log::record::{
    ClassifiedRecord, DamageRecord, DamageType, DeathRecord, ModifierMask, TauntRecord,
};
use crate::context::{IStr, intern, intern_upper};
use crate::game_data::{
    CORPSE_SUFFIXES, EXCLUDED_DEFENDER_SUFFIXES, HINTLESS_DEFENDERS, NPC_SPELL_LEVEL,
    OWNER_SUFFIXES, RESIST_WORDS, ResistType, hit_verb_third_person, labels,
};
use crate::registry::SpellResolution;
use memchr::memmem;

/// Old-format crit announcements. The damage itself follows on the next line.
const LEGACY_CRITS: [&str; 6] = [
    " scores a critical hit!",
    " score a critical hit!",
    " lands a Crippling Blow!",
    " land a Crippling Blow!",
    " delivers a critical blast!",
    " deliver a critical blast!",
];

const NON_MELEE_LABEL: &str = "NON-MELEE";

// ─────────────────────────────────────────────────────────────────────────────
// Scan
// ─────────────────────────────────────────────────────────────────────────────

/// Positions of the keywords the shape tests key off. Each field holds the
/// first occurrence up to the stop index.
#[derive(Debug, Default)]
struct DamageScan {
    /// is / was / are
    is: Option<usize>,
    /// has / have
    has: Option<usize>,
    taken: Option<usize>,
    by: Option<usize>,
    /// "by" directly after "damage"
    by_damage: Option<usize>,
    from: Option<usize>,
    for_: Option<usize>,
    /// "points"/"point" followed by "of"
    points: Option<usize>,
    damage: Option<usize>,
    non_melee: Option<usize>,
    slain: Option<usize>,
    /// "tries"/"try" followed by "to"
    tries: Option<usize>,
    but: Option<usize>,
    hit: Option<usize>,
    verb: Option<usize>,
    capture: Option<usize>,
    attention: Option<usize>,
    failed: Option<usize>,
    focused: Option<usize>,
}

fn first(slot: &mut Option<usize>, index: usize) {
    if slot.is_none() {
        *slot = Some(index);
    }
}

impl DamageScan {
    /// Returns None when the line clearly belongs to another classifier.
    fn new(tokens: &TokenSequence<'_>, stop: usize) -> Option<Self> {
        let mut scan = Self::default();

        for (i, &token) in tokens.iter().enumerate().take(stop + 1) {
            if token.starts_with('(') || token == "healed" || token == "casting" {
                return None;
            }

            match token {
                "is" | "was" | "are" => first(&mut scan.is, i),
                "has" | "have" => first(&mut scan.has, i),
                "taken" => first(&mut scan.taken, i),
                "by" => first(&mut scan.by, i),
                "from" => first(&mut scan.from, i),
                "for" => first(&mut scan.for_, i),
                "points" | "point" if tokens.is(i + 1, "of") => first(&mut scan.points, i),
                "damage" | "damage." => first(&mut scan.damage, i),
                "non-melee" => first(&mut scan.non_melee, i),
                "slain" => first(&mut scan.slain, i),
                "tries" | "try" if tokens.is(i + 1, "to") => first(&mut scan.tries, i),
                "but" => first(&mut scan.but, i),
                "hit" => first(&mut scan.hit, i),
                "capture" | "captures" => first(&mut scan.capture, i),
                "attention!" | "attention." => first(&mut scan.attention, i),
                "failed" => first(&mut scan.failed, i),
                "focused" => first(&mut scan.focused, i),
                _ => {}
            }

            if i > 0 && scan.verb.is_none() && hit_verb_third_person(token).is_some() {
                scan.verb = Some(i);
            }
        }

        if let Some(damage) = scan.damage
            && tokens.is(damage, "damage")
            && tokens.is(damage + 1, "by")
        {
            scan.by_damage = Some(damage + 1);
        }
        Some(scan)
    }
}

fn amount(tokens: &TokenSequence<'_>, index: usize) -> Option<u64> {
    tokens.get(index)?.parse::<u64>().ok()
}

/// Text from `start` through the stop token with the sentence's final
/// punctuation removed.
fn tail(tokens: &TokenSequence<'_>, start: usize, stop: usize) -> String {
    let mut text = tokens.join(start, stop + 1);
    while text.ends_with(['.', '!']) {
        text.pop();
    }
    text
}

fn strip_possessive(name: &str) -> &str {
    name.strip_suffix("'s")
        .or_else(|| name.strip_suffix("`s"))
        .unwrap_or(name)
}

// ─────────────────────────────────────────────────────────────────────────────
// Shapes
// ─────────────────────────────────────────────────────────────────────────────

enum Attacker {
    /// Name from the line, normalized like any participant.
    Name(String),
    /// Sentinel kept verbatim.
    Label(IStr),
}

struct Hit {
    attacker: Attacker,
    defender: String,
    total: u64,
    damage_type: DamageType,
    sub_type: IStr,
    resist: Option<ResistType>,
    spell: Option<SpellResolution>,
}

impl Hit {
    fn new(
        attacker: Attacker,
        defender: String,
        total: u64,
        damage_type: DamageType,
        sub_type: IStr,
    ) -> Self {
        Self {
            attacker,
            defender,
            total,
            damage_type,
            sub_type,
            resist: None,
            spell: None,
        }
    }

    fn with_spell(mut self, spell: Option<SpellResolution>) -> Self {
        if self.resist.is_none() {
            self.resist = spell.as_ref().and_then(|s| s.unique()).and_then(|s| s.resist);
        }
        self.spell = spell;
        self
    }
}

/// "<B> is <verb> by ... for N points of non-melee damage." Returns the
/// indices of "is", "by" and "for" with the amount.
fn shield_span(tokens: &TokenSequence<'_>, scan: &DamageScan) -> Option<(usize, usize, usize, u64)> {
    let is = scan.is?;
    let by = scan.by?;
    let for_ = scan.for_?;
    let points = scan.points?;
    let non_melee = scan.non_melee?;

    if is == 0
        || by != is + 2
        || for_ <= by + 1
        || points != for_ + 2
        || non_melee != points + 2
        || !tokens.is(non_melee + 1, "damage.")
    {
        return None;
    }
    Some((is, by, for_, amount(tokens, for_ + 1)?))
}

fn shield_owner(tokens: &TokenSequence<'_>, by: usize, for_: usize) -> Option<usize> {
    (by + 1..for_).find(|&i| tokens[i] == "YOUR" || tokens[i].ends_with("'s"))
}

/// "a goblin is pierced by YOUR thorns for 10 points of non-melee damage."
fn damage_shield(tokens: &TokenSequence<'_>, scan: &DamageScan) -> Option<Hit> {
    let (is, by, for_, total) = shield_span(tokens, scan)?;
    let owner = shield_owner(tokens, by, for_)?;

    let attacker = tokens.join(by + 1, owner + 1);
    let attacker = strip_possessive(&attacker).to_string();
    let shield = tokens.join(owner + 1, for_);
    Some(Hit::new(
        Attacker::Name(attacker),
        tokens.join(0, is),
        total,
        DamageType::Ds,
        intern(&shield),
    ))
}

/// Same sentence with no owner: the shield's source isn't logged.
fn reflected_shield(tokens: &TokenSequence<'_>, scan: &DamageScan) -> Option<Hit> {
    let (is, by, for_, total) = shield_span(tokens, scan)?;
    if shield_owner(tokens, by, for_).is_some() {
        return None;
    }
    Some(Hit::new(
        Attacker::Label(intern(labels::RS)),
        tokens.join(0, is),
        total,
        DamageType::Ds,
        intern(&tokens.join(by + 1, for_)),
    ))
}

/// "a goblin has taken an extra 5000 points of non-melee damage from Kazint's Holy Bane spell."
fn bane(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>, scan: &DamageScan, stop: usize) -> Option<Hit> {
    let has = scan.has?;
    let taken = scan.taken?;
    let from = scan.from?;
    if has == 0
        || taken != has + 1
        || !tokens.is(taken + 1, "an")
        || !tokens.is(taken + 2, "extra")
        || from <= taken + 3
        || !tokens.is(stop, "spell.")
    {
        return None;
    }
    let total = amount(tokens, taken + 3)?;

    let whole = tokens.join(from + 1, stop);
    let owner = if ctx.spells.resolve(&whole).is_some() {
        None
    } else {
        (from + 1..stop).find(|&i| {
            matches!(tokens[i], "YOUR" | "Your" | "your") || tokens[i].ends_with("'s")
        })
    };

    let (attacker, spell) = match owner {
        Some(o) => {
            let name = tokens.join(from + 1, o + 1);
            (
                Attacker::Name(strip_possessive(&name).to_string()),
                tokens.join(o + 1, stop),
            )
        }
        None => (Attacker::Label(intern(labels::UNK)), whole),
    };

    let resolution = ctx.spells.resolve(&spell);
    Some(
        Hit::new(attacker, tokens.join(0, has), total, DamageType::Bane, intern(&spell))
            .with_spell(resolution),
    )
}

/// Optional resist word between "of" and "damage". Returns Err when a word
/// sits there that isn't a resist.
fn resist_between(tokens: &TokenSequence<'_>, points: usize, damage: usize) -> Result<Option<ResistType>, ()> {
    match damage.checked_sub(points) {
        Some(2) => Ok(None),
        Some(3) => tokens
            .get(points + 2)
            .and_then(|w| RESIST_WORDS.get(w).copied())
            .map(Some)
            .ok_or(()),
        _ => Err(()),
    }
}

/// "Astralx crushes Sontalak for 126225 points of damage."
fn melee(tokens: &TokenSequence<'_>, scan: &DamageScan, stop: usize) -> Option<Hit> {
    let verb = scan.verb?;
    let for_ = scan.for_?;
    let points = scan.points?;
    let damage = scan.damage?;
    if scan.non_melee.is_some()
        || scan.by_damage.is_some()
        || for_ <= verb + 1
        || points != for_ + 2
        || damage != stop
        || !tokens.is(damage, "damage.")
    {
        return None;
    }
    let resist = resist_between(tokens, points, damage).ok()?;
    let total = amount(tokens, for_ + 1)?;

    let third = hit_verb_third_person(tokens[verb])?;
    let defender_start = if matches!(third, "frenzies") && tokens.is(verb + 1, "on") {
        verb + 2
    } else {
        verb + 1
    };

    let mut hit = Hit::new(
        Attacker::Name(tokens.join(0, verb)),
        tokens.join(defender_start, for_),
        total,
        DamageType::Melee,
        intern(&third.to_uppercase()),
    );
    hit.resist = resist;
    Some(hit)
}

/// "Kazint hit a goblin for 5000 points of fire damage by Spear of Ro."
fn spell_damage(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>, scan: &DamageScan, stop: usize) -> Option<Hit> {
    let verb = scan.verb?;
    let for_ = scan.for_?;
    let points = scan.points?;
    let damage = scan.damage?;
    let by = scan.by_damage?;
    if for_ <= verb + 1 || points != for_ + 2 || by >= stop {
        return None;
    }
    let resist = resist_between(tokens, points, damage).ok()?;
    let total = amount(tokens, for_ + 1)?;

    let spell = tail(tokens, by + 1, stop);
    let resolution = ctx.spells.resolve(&spell);
    let damage_type = match resolution.as_ref().and_then(|r| r.unique()) {
        Some(def) if def.is_bane => DamageType::Bane,
        Some(def) if def.is_proc => DamageType::Proc,
        _ => DamageType::Dd,
    };

    let mut hit = Hit::new(
        Attacker::Name(tokens.join(0, verb)),
        tokens.join(verb + 1, for_),
        total,
        damage_type,
        intern(&spell),
    );
    hit.resist = resist;
    Some(hit.with_spell(resolution))
}

/// "a goblin has taken 3000 damage from Pyre of the Fallen by Kazint."
/// Also "... from your <spell>." and the old-server form with attacker and
/// spell swapped.
fn dot(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>, scan: &DamageScan, stop: usize) -> Option<Hit> {
    let has = scan.has?;
    let taken = scan.taken?;
    let from = scan.from?;
    if has == 0 || taken != has + 1 || !tokens.is(taken + 2, "damage") || from != taken + 3 {
        return None;
    }
    let total = amount(tokens, taken + 1)?;

    let (attacker, spell) = if tokens.is_any(from + 1, &["your", "Your"]) {
        (tokens[from + 1].to_string(), tail(tokens, from + 2, stop))
    } else {
        let by = (from + 2..=stop).find(|&i| tokens[i] == "by")?;
        let spell = tokens.join(from + 1, by);
        let attacker = tail(tokens, by + 1, stop);
        if ctx.spells.is_legacy_spell(&attacker) {
            (spell, attacker)
        } else {
            (attacker, spell)
        }
    };
    if attacker.is_empty() || spell.is_empty() {
        return None;
    }

    let damage_type = if spell.eq_ignore_ascii_case(&attacker) {
        DamageType::OtherDmg
    } else {
        DamageType::Dot
    };
    let resolution = ctx.spells.resolve(&spell);
    Some(
        Hit::new(Attacker::Name(attacker), tokens.join(0, has), total, damage_type, intern(&spell))
            .with_spell(resolution),
    )
}

/// "Lawlstryke has taken 216717 damage by Wisp Explosion."
fn unattributed(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>, scan: &DamageScan, stop: usize) -> Option<Hit> {
    let has = scan.has?;
    let taken = scan.taken?;
    let by = scan.by?;
    if has == 0 || taken != has + 1 || !tokens.is(taken + 2, "damage") || by != taken + 3 {
        return None;
    }
    let total = amount(tokens, taken + 1)?;

    let spell = tail(tokens, by + 1, stop);
    if spell.is_empty() {
        return None;
    }
    let resolution = ctx.spells.resolve(&spell);
    let damage_type = match &resolution {
        Some(r) if r.candidates().iter().all(|s| s.level < NPC_SPELL_LEVEL) => DamageType::Dot,
        _ => DamageType::OtherDmg,
    };

    let label = intern(&spell);
    Some(
        Hit::new(Attacker::Label(label), tokens.join(0, has), total, damage_type, label)
            .with_spell(resolution),
    )
}

/// "Kazint hit a goblin for 500 points of non-melee damage."
fn legacy_direct(tokens: &TokenSequence<'_>, scan: &DamageScan, stop: usize) -> Option<Hit> {
    let hit = scan.hit?;
    let for_ = scan.for_?;
    let points = scan.points?;
    let non_melee = scan.non_melee?;
    if hit == 0
        || scan.is.is_some_and(|i| i < hit)
        || scan.by.is_some_and(|b| b > hit)
        || for_ <= hit + 1
        || points != for_ + 2
        || non_melee != points + 2
        || non_melee + 1 != stop
        || !tokens.is(stop, "damage.")
    {
        return None;
    }
    let total = amount(tokens, for_ + 1)?;
    Some(Hit::new(
        Attacker::Name(tokens.join(0, hit)),
        tokens.join(hit + 1, for_),
        total,
        DamageType::Dd,
        intern(NON_MELEE_LABEL),
    ))
}

/// "Kazint was hit by non-melee for 50 points of damage."
fn unknown_non_melee(tokens: &TokenSequence<'_>, scan: &DamageScan, stop: usize) -> Option<Hit> {
    let was = scan.is?;
    if was == 0
        || !tokens.is(was + 1, "hit")
        || !tokens.is(was + 2, "by")
        || !tokens.is(was + 3, "non-melee")
        || !tokens.is(was + 4, "for")
        || !tokens.is(was + 6, "points")
        || !tokens.is(was + 7, "of")
        || !tokens.is(was + 8, "damage.")
        || was + 8 != stop
    {
        return None;
    }
    let total = amount(tokens, was + 5)?;
    Some(Hit::new(
        Attacker::Label(intern(labels::UNK)),
        tokens.join(0, was),
        total,
        DamageType::Dd,
        intern(NON_MELEE_LABEL),
    ))
}

fn miss_type(word: &str) -> Option<DamageType> {
    let kind = match word.trim_end_matches('!') {
        "miss" | "misses" => DamageType::Miss,
        "dodge" | "dodges" => DamageType::Dodge,
        "parry" | "parries" => DamageType::Parry,
        "block" | "blocks" => DamageType::Block,
        "riposte" | "ripostes" => DamageType::Riposte,
        "INVULNERABLE" => DamageType::Invulnerable,
        "absorb" | "absorbs" => DamageType::Absorb,
        _ => return None,
    };
    Some(kind)
}

/// "Test One Hundred Three tries to punch Kazint, but misses!"
fn miss(tokens: &TokenSequence<'_>, scan: &DamageScan, stop: usize) -> Option<Hit> {
    let tries = scan.tries?;
    let but = scan.but?;
    if tries == 0 || but <= tries + 3 {
        return None;
    }
    let third = hit_verb_third_person(tokens.get(tries + 2)?)?;
    let damage_type = (but + 1..=stop).find_map(|i| miss_type(tokens[i]))?;

    let defender = tokens.join(tries + 3, but);
    let defender = defender.strip_suffix(',').unwrap_or(&defender).to_string();
    Some(Hit::new(
        Attacker::Name(tokens.join(0, tries)),
        defender,
        0,
        damage_type,
        intern(&third.to_uppercase()),
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Participants
// ─────────────────────────────────────────────────────────────────────────────

struct Participant {
    key: IStr,
    owner: Option<IStr>,
}

fn owner_of(ctx: &LineContext<'_>, name: &str) -> Option<IStr> {
    for suffix in OWNER_SUFFIXES {
        if let Some(owner) = name.strip_suffix(suffix)
            && ctx.identity.is_possible_player_name(owner)
        {
            return Some(intern_upper(owner));
        }
    }
    ctx.identity.pet_owner(name).map(|owner| intern_upper(&owner))
}

/// Corpse suffix stripped, self mapped, length checked.
fn clean_name<'b>(ctx: &LineContext<'b>, raw: &'b str) -> Option<&'b str> {
    let mut name = raw.trim();
    if let Some(stripped) = CORPSE_SUFFIXES.iter().find_map(|s| name.strip_suffix(s)) {
        name = stripped;
    }
    let name = ctx.actor(name);
    if name.is_empty() || name.len() > ctx.config.max_name_length {
        return None;
    }
    Some(name)
}

fn participant(ctx: &LineContext<'_>, raw: &str) -> Option<Participant> {
    let name = clean_name(ctx, raw)?;
    Some(Participant {
        key: intern_upper(name),
        owner: owner_of(ctx, name),
    })
}

fn hints_allowed(defender: &str) -> bool {
    !HINTLESS_DEFENDERS.contains(defender.to_lowercase().as_str())
        && !defender.ends_with("`s Mount")
        && !defender.ends_with("`s mount")
}

fn finish(ctx: &LineContext<'_>, hit: Hit, modifiers: Option<&str>) -> Option<DamageRecord> {
    if EXCLUDED_DEFENDER_SUFFIXES
        .iter()
        .any(|s| hit.defender.ends_with(s))
    {
        return None;
    }
    let defender = participant(ctx, &hit.defender)?;

    let (attacker, attacker_owner, actor) = match &hit.attacker {
        Attacker::Label(label) => (*label, None, None),
        Attacker::Name(raw) => {
            let name = clean_name(ctx, raw)?;
            (intern_upper(name), owner_of(ctx, name), Some(name))
        }
    };

    let hint_player = actor.filter(|_| hints_allowed(&hit.defender));
    let mut mask = modifiers
        .map(|text| ctx.modifiers.parse(text, hint_player, ctx.identity))
        .unwrap_or_default();
    if ctx.crit.take_for(
        attacker,
        ctx.line_number,
        ctx.timestamp,
        ctx.config.crit_window_secs,
    ) {
        mask |= ModifierMask::CRIT;
    }

    Some(DamageRecord {
        attacker,
        attacker_owner,
        defender: defender.key,
        defender_owner: defender.owner,
        total: hit.total,
        damage_type: hit.damage_type,
        sub_type: hit.sub_type,
        resist: hit.resist,
        modifiers: mask,
        spell: hit.spell,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Deaths and Taunts
// ─────────────────────────────────────────────────────────────────────────────

/// "X has been slain by Y!", "You have been slain by Y!", "You have slain X!"
fn slain(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>, scan: &DamageScan, stop: usize) -> Option<DeathRecord> {
    let slain = scan.slain?;
    let has = scan.has?;

    let (victim, killer) = if has > 0
        && slain == has + 2
        && tokens.is(has + 1, "been")
        && tokens.is(slain + 1, "by")
    {
        (tokens.join(0, has), tail(tokens, slain + 2, stop))
    } else if has == 1 && slain == 2 && tokens.is(0, "You") {
        (tail(tokens, slain + 1, stop), tokens[0].to_string())
    } else {
        return None;
    };

    let victim = participant(ctx, &victim)?;
    let killer = participant(ctx, &killer)?;
    Some(DeathRecord {
        slain: victim.key,
        slain_owner: victim.owner,
        killer: killer.key,
        killer_owner: killer.owner,
    })
}

fn taunt(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>, scan: &DamageScan, stop: usize) -> Option<TauntRecord> {
    let (taunter, npc, success, improved) = if let (Some(c), Some(a)) = (scan.capture, scan.attention)
        && c > 0
        && a > c + 1
    {
        // "You capture a goblin's attention!"
        let npc = tokens.join(c + 1, a);
        (tokens.join(0, c), strip_possessive(&npc).to_string(), true, false)
    } else if let Some(f) = scan.failed
        && f > 0
        && tokens.is(f + 1, "to")
        && tokens.is(f + 2, "taunt")
    {
        // "Kazint failed to taunt a goblin."
        (tokens.join(0, f), tail(tokens, f + 3, stop), false, false)
    } else if let Some(f) = scan.focused
        && f > 1
        && tokens.is(f - 1, "is")
        && tokens.is(f + 1, "on")
        && tokens.is(f + 2, "attacking")
    {
        // "a goblin is focused on attacking Kazint due to an improved taunt."
        let due = (f + 3..=stop).find(|&i| tokens[i] == "due")?;
        (tokens.join(f + 3, due), tokens.join(0, f - 1), true, true)
    } else {
        return None;
    };

    let taunter = participant(ctx, &taunter)?.key;
    let npc = participant(ctx, &npc)?.key;
    ctx.crit.take_for(
        taunter,
        ctx.line_number,
        ctx.timestamp,
        ctx.config.crit_window_secs,
    );
    Some(TauntRecord {
        taunter,
        npc,
        success,
        improved,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry
// ─────────────────────────────────────────────────────────────────────────────

/// Marks the pending crit for an old-format announcement.
fn legacy_crit(ctx: &LineContext<'_>, text: &str) -> bool {
    for phrase in LEGACY_CRITS {
        if let Some(pos) = memmem::find(text.as_bytes(), phrase.as_bytes())
            && pos > 0
        {
            ctx.crit
                .mark(ctx.name_key(&text[..pos]), ctx.line_number, ctx.timestamp);
            return true;
        }
    }
    false
}

pub(super) fn classify(
    ctx: &LineContext<'_>,
    text: &str,
    tokens: &TokenSequence<'_>,
) -> Option<ClassifiedRecord> {
    if legacy_crit(ctx, text) {
        return None;
    }

    let (stop, modifiers) = tokens.trailing_parenthetical();
    let scan = DamageScan::new(tokens, stop)?;

    let hit = damage_shield(tokens, &scan)
        .or_else(|| reflected_shield(tokens, &scan))
        .or_else(|| bane(ctx, tokens, &scan, stop))
        .or_else(|| melee(tokens, &scan, stop))
        .or_else(|| spell_damage(ctx, tokens, &scan, stop))
        .or_else(|| dot(ctx, tokens, &scan, stop))
        .or_else(|| unattributed(ctx, tokens, &scan, stop))
        .or_else(|| legacy_direct(tokens, &scan, stop))
        .or_else(|| unknown_non_melee(tokens, &scan, stop))
        .or_else(|| miss(tokens, &scan, stop));

    if let Some(hit) = hit {
        return finish(ctx, hit, modifiers.as_deref()).map(ClassifiedRecord::Damage);
    }

    slain(ctx, tokens, &scan, stop)
        .map(ClassifiedRecord::Death)
        .or_else(|| taunt(ctx, tokens, &scan, stop).map(ClassifiedRecord::Taunt))
}
