use super::LineContext;
use crate::combat_log::line::TokenSequence;
use crate::combat_log::record::{ClassifiedRecord, HealRecord, HealType, ModifierMask};
use crate::context::intern;
use crate::game_data::labels;

const WARD_SUFFIX: &str = "`s ward";
const REFLEXIVE: [&str; 4] = ["himself", "herself", "itself", "themselves"];
/// Spells that only heal the caster's own pet.
const PET_HEAL_SPELLS: [&str; 2] = ["Mend Companion", "Theft of Essence"];

/// "<Healer> healed <Healed> [over time] for N [(M)] hit points [by <spell>]."
/// "<Healed> has been healed [over time] for N [(M)] hit points [by <spell>]."
pub(super) fn classify(ctx: &LineContext<'_>, tokens: &TokenSequence<'_>) -> Option<ClassifiedRecord> {
    let (stop, modifiers) = tokens.trailing_parenthetical();
    let healed_at = (1..=stop).find(|&i| tokens[i] == "healed")?;

    let passive = healed_at >= 2
        && tokens.is(healed_at - 1, "been")
        && tokens.is_any(healed_at - 2, &["has", "have"]);

    let for_ = (healed_at + 1..=stop).find(|&i| tokens[i] == "for")?;
    let over_time = for_ >= 2 && tokens.is(for_ - 2, "over") && tokens.is(for_ - 1, "time");
    let name_end = if over_time { for_ - 2 } else { for_ };

    let (healer, healed) = if passive {
        (labels::UNK.to_string(), tokens.join(0, healed_at - 2))
    } else {
        (tokens.join(0, healed_at), tokens.join(healed_at + 1, name_end))
    };
    if healer.is_empty() || healed.is_empty() {
        return None;
    }

    let total = tokens.get(for_ + 1)?.parse::<u64>().ok()?;
    let mut next = for_ + 2;
    let mut over_total = total;
    if let Some(overheal) = tokens
        .get(next)
        .and_then(|t| t.strip_prefix('('))
        .and_then(|t| t.strip_suffix(')'))
    {
        over_total = overheal.parse::<u64>().ok()?;
        next += 1;
    }
    if !tokens.is(next, "hit") || !tokens.is_any(next + 1, &["points", "points."]) {
        return None;
    }

    let spell = if tokens.is(next + 2, "by") {
        let mut spell = tokens.join(next + 3, stop + 1);
        if spell.ends_with('.') {
            spell.pop();
        }
        (!spell.is_empty()).then_some(spell)
    } else {
        None
    };

    // a ward heals on behalf of its owner
    let healer = healer
        .strip_suffix(WARD_SUFFIX)
        .map(str::to_string)
        .unwrap_or(healer);
    let healer = ctx.actor(&healer).to_string();
    let healed = if REFLEXIVE.contains(&healed.as_str()) || healed == "yourself" {
        healer.clone()
    } else {
        ctx.actor(&healed).to_string()
    };

    // swarm pets: "Kazint`s pet" and friends
    if let Some((owner, _)) = healed.split_once("`s ")
        && ctx.identity.is_verified_player(owner)
    {
        ctx.identity.add_verified_pet(&healed);
        ctx.identity.set_pet_owner(&healed, owner);
        return None;
    }
    if let Some(spell) = &spell
        && !passive
        && PET_HEAL_SPELLS.iter().any(|p| spell.starts_with(p))
        && healed != healer
    {
        ctx.register_pet(&healed, &healer);
    }

    let hint_player = (!passive).then_some(healer.as_str());
    let mask = modifiers
        .map(|text| ctx.modifiers.parse(&text, hint_player, ctx.identity))
        .unwrap_or(ModifierMask::NONE);
    let resolution = spell.as_deref().and_then(|s| ctx.spells.resolve(s));

    Some(ClassifiedRecord::Heal(HealRecord {
        healer: intern(&healer),
        healed: intern(&healed),
        total,
        over_total,
        heal_type: if over_time { HealType::Hot } else { HealType::Heal },
        sub_type: spell.as_deref().map(intern),
        modifiers: mask,
        spell: resolution,
    }))
}
