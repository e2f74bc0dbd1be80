use super::*;
use crate::combat_log::record::{
    CastKind, ChatChannel, DamageRecord, DamageType, HealType, LootSource, ResistKind,
};
use crate::context::resolve;
use crate::game_data::{PlayerClass, ResistType};
use crate::registry::SpellDefinition;

const PLAYER: &str = "Kazint";

fn test_parser() -> LogParser {
    LogParser::with_defaults(ParserConfig::for_player(PLAYER))
}

fn parser_with(spells: Vec<SpellDefinition>, identity: Arc<PlayerRegistry>) -> LogParser {
    LogParser::new(
        ParserConfig::for_player(PLAYER),
        identity,
        Arc::new(SpellBook::new(spells)),
    )
}

fn line(action: &str) -> String {
    format!("[Sun Apr 18 21:26:15 2021] {action}")
}

fn classify(parser: &LogParser, action: &str) -> Option<ClassifiedRecord> {
    let state = parser.new_state();
    parser
        .parse_line(1, &line(action), &state)
        .map(|event| event.record)
}

fn damage(parser: &LogParser, action: &str) -> DamageRecord {
    match classify(parser, action) {
        Some(ClassifiedRecord::Damage(record)) => record,
        other => panic!("expected damage for {action:?}, got {other:?}"),
    }
}

#[derive(Default)]
struct Collector {
    events: Vec<LogEvent>,
    flushed: Vec<(Vec<IStr>, f64)>,
}

impl RecordHandler for Collector {
    fn handle_record(&mut self, event: &LogEvent) {
        self.events.push(event.clone());
    }

    fn on_slain_flush(&mut self, names: &[IStr], timestamp: f64) {
        self.flushed.push((names.to_vec(), timestamp));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Damage
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_melee_with_modifiers() {
    let parser = test_parser();
    let state = parser.new_state();
    let event = parser
        .parse_line(
            1,
            "[Sun Apr 18 21:26:15 2021] Astralx crushes Sontalak for 126225 points of damage. (Strikethrough Critical)",
            &state,
        )
        .unwrap();
    assert_eq!(event.timestamp, 1618781175.0);

    let ClassifiedRecord::Damage(record) = event.record else {
        panic!("expected damage");
    };
    assert_eq!(resolve(record.attacker), "ASTRALX");
    assert_eq!(resolve(record.defender), "SONTALAK");
    assert_eq!(record.total, 126225);
    assert_eq!(record.damage_type, DamageType::Melee);
    assert_eq!(resolve(record.sub_type), "CRUSHES");
    assert!(record.modifiers.is_crit());
    assert!(record.modifiers.is_strikethrough());
    assert!(record.resist.is_none());
}

#[test]
fn test_unknown_modifier_keeps_the_rest() {
    let record = damage(
        &test_parser(),
        "Astralx crushes Sontalak for 5 points of damage. (Locked Lucky Critical)",
    );
    assert!(record.modifiers.is_lucky());
    assert!(record.modifiers.is_crit());
}

#[test]
fn test_melee_base_verb_from_self() {
    let record = damage(&test_parser(), "You crush a goblin for 500 points of damage.");
    assert_eq!(resolve(record.attacker), "KAZINT");
    assert_eq!(resolve(record.defender), "A GOBLIN");
    assert_eq!(resolve(record.sub_type), "CRUSHES");
}

#[test]
fn test_melee_frenzies_on() {
    let record = damage(&test_parser(), "A goblin frenzies on YOU for 50 points of damage.");
    assert_eq!(resolve(record.attacker), "A GOBLIN");
    assert_eq!(resolve(record.defender), "KAZINT");
    assert_eq!(resolve(record.sub_type), "FRENZIES");
}

#[test]
fn test_spell_label_attacker_without_catalog_entry() {
    let record = damage(
        &test_parser(),
        "Lawlstryke has taken 216717 damage by Wisp Explosion.",
    );
    assert_eq!(resolve(record.defender), "LAWLSTRYKE");
    assert_eq!(resolve(record.attacker), "Wisp Explosion");
    assert_eq!(record.total, 216717);
    assert_eq!(record.damage_type, DamageType::OtherDmg);
}

#[test]
fn test_spell_label_attacker_uses_catalog_level() {
    let action = "Lawlstryke has taken 216717 damage by Wisp Explosion.";

    let npc = parser_with(
        vec![SpellDefinition::new("Wisp Explosion", 255)],
        Arc::new(PlayerRegistry::new()),
    );
    assert_eq!(damage(&npc, action).damage_type, DamageType::OtherDmg);

    let player = parser_with(
        vec![SpellDefinition::new("Wisp Explosion", 105)],
        Arc::new(PlayerRegistry::new()),
    );
    let record = damage(&player, action);
    assert_eq!(record.damage_type, DamageType::Dot);
    assert!(record.spell.is_some());
}

#[test]
fn test_miss_punch() {
    let record = damage(
        &test_parser(),
        "Test One Hundred Three tries to punch Kazint, but misses!",
    );
    assert_eq!(resolve(record.attacker), "TEST ONE HUNDRED THREE");
    assert_eq!(resolve(record.defender), "KAZINT");
    assert_eq!(record.total, 0);
    assert_eq!(record.damage_type, DamageType::Miss);
    assert_eq!(resolve(record.sub_type), "PUNCHES");
}

#[test]
fn test_miss_terminal_words() {
    let parser = test_parser();
    let cases = [
        ("A goblin tries to hit YOU, but YOU dodge!", DamageType::Dodge),
        ("A goblin tries to hit YOU, but YOU parry!", DamageType::Parry),
        ("A goblin tries to hit YOU, but YOU block!", DamageType::Block),
        ("A goblin tries to hit YOU, but YOU are INVULNERABLE!", DamageType::Invulnerable),
        ("A goblin tries to hit YOU, but YOUR magical skin absorbs the blow!", DamageType::Absorb),
    ];
    for (action, expected) in cases {
        let record = damage(&parser, action);
        assert_eq!(record.damage_type, expected, "{action}");
        assert_eq!(resolve(record.defender), "KAZINT");
    }
}

#[test]
fn test_riposte_struck_through_is_still_tagged_riposte() {
    let record = damage(
        &test_parser(),
        "A goblin tries to hit Kazint, but Kazint ripostes! (Strikethrough)",
    );
    assert_eq!(record.damage_type, DamageType::Riposte);
    assert!(record.modifiers.is_strikethrough());
}

#[test]
fn test_damage_shield_owned_by_player() {
    let record = damage(
        &test_parser(),
        "A goblin is pierced by YOUR thorns for 10 points of non-melee damage.",
    );
    assert_eq!(resolve(record.attacker), "KAZINT");
    assert_eq!(resolve(record.defender), "A GOBLIN");
    assert_eq!(record.damage_type, DamageType::Ds);
    assert_eq!(record.total, 10);
}

#[test]
fn test_damage_shield_possessive_and_unowned() {
    let parser = test_parser();
    let record = damage(
        &parser,
        "A goblin is burned by Fllint's flames for 30 points of non-melee damage.",
    );
    assert_eq!(resolve(record.attacker), "FLLINT");
    assert_eq!(resolve(record.sub_type), "flames");

    let record = damage(
        &parser,
        "A goblin is pierced by thorns for 12 points of non-melee damage.",
    );
    assert_eq!(resolve(record.attacker), "Rs");
    assert_eq!(record.damage_type, DamageType::Ds);
}

#[test]
fn test_bane_damage() {
    let record = damage(
        &test_parser(),
        "A goblin has taken an extra 5000 points of non-melee damage from Fllint's Holy Bane spell.",
    );
    assert_eq!(resolve(record.attacker), "FLLINT");
    assert_eq!(resolve(record.defender), "A GOBLIN");
    assert_eq!(record.damage_type, DamageType::Bane);
    assert_eq!(resolve(record.sub_type), "Holy Bane");
    assert_eq!(record.total, 5000);
}

#[test]
fn test_spell_damage_typed_by_catalog() {
    let mut spear = SpellDefinition::new("Spear of Ro", 110);
    spear.is_proc = true;
    let parser = parser_with(vec![spear], Arc::new(PlayerRegistry::new()));

    let record = damage(
        &parser,
        "Kazint hit a goblin for 5000 points of fire damage by Spear of Ro.",
    );
    assert_eq!(record.damage_type, DamageType::Proc);
    assert_eq!(record.resist, Some(ResistType::Fire));
    assert_eq!(resolve(record.sub_type), "Spear of Ro");

    let record = damage(
        &parser,
        "Kazint hit a goblin for 700 points of cold damage by Ice Comet.",
    );
    assert_eq!(record.damage_type, DamageType::Dd);
    assert!(record.spell.is_none());
}

#[test]
fn test_dot_forms() {
    let parser = test_parser();

    let record = damage(
        &parser,
        "A goblin has taken 3000 damage from Pyre of the Fallen by Fllint.",
    );
    assert_eq!(resolve(record.attacker), "FLLINT");
    assert_eq!(resolve(record.sub_type), "Pyre of the Fallen");
    assert_eq!(record.damage_type, DamageType::Dot);

    let record = damage(&parser, "A goblin has taken 300 damage from your Pyre of the Fallen.");
    assert_eq!(resolve(record.attacker), "KAZINT");
    assert_eq!(record.damage_type, DamageType::Dot);

    let record = damage(&parser, "You have taken 120 damage from Creeping Plague by Creeping Plague.");
    assert_eq!(resolve(record.defender), "KAZINT");
    assert_eq!(record.damage_type, DamageType::OtherDmg);
}

#[test]
fn test_dot_legacy_swap() {
    let mut legacy = SpellDefinition::new("Boil Blood", 50);
    legacy.legacy = true;
    let parser = parser_with(vec![legacy], Arc::new(PlayerRegistry::new()));

    let record = damage(&parser, "A goblin has taken 40 damage from Fllint by Boil Blood.");
    assert_eq!(resolve(record.attacker), "FLLINT");
    assert_eq!(resolve(record.sub_type), "Boil Blood");
}

#[test]
fn test_legacy_and_unknown_non_melee() {
    let parser = test_parser();

    let record = damage(&parser, "Fllint hit a goblin for 500 points of non-melee damage.");
    assert_eq!(resolve(record.attacker), "FLLINT");
    assert_eq!(record.damage_type, DamageType::Dd);

    let record = damage(&parser, "Kazint was hit by non-melee for 50 points of damage.");
    assert_eq!(resolve(record.attacker), "Unk");
    assert_eq!(resolve(record.defender), "KAZINT");
    assert_eq!(record.damage_type, DamageType::Dd);
    assert_eq!(record.total, 50);
}

#[test]
fn test_pet_owner_from_suffix() {
    let record = damage(&test_parser(), "Fllint`s pet bites a goblin for 20 points of damage.");
    assert_eq!(resolve(record.attacker), "FLLINT`S PET");
    assert_eq!(record.attacker_owner.map(resolve), Some("FLLINT"));
}

#[test]
fn test_rejected_damage() {
    let parser = test_parser();
    let long = "A".repeat(70);
    assert!(classify(&parser, &format!("{long} crushes Sontalak for 5 points of damage.")).is_none());
    assert!(classify(&parser, "Kazint crushes a treasure chest for 5 points of damage.").is_none());
    assert!(classify(&parser, "Kazint crushes Sontalak for lots points of damage.").is_none());
}

#[test]
fn test_legacy_crit_marks_next_line() {
    let parser = test_parser();
    let state = parser.new_state();

    assert!(parser.parse_line(1, &line("Fllint scores a critical hit! (5000)"), &state).is_none());
    let event = parser
        .parse_line(2, &line("Fllint hits a goblin for 5000 points of damage."), &state)
        .unwrap();
    let ClassifiedRecord::Damage(record) = event.record else {
        panic!("expected damage");
    };
    assert!(record.modifiers.is_crit());

    // a gap between the lines breaks the correlation
    parser.parse_line(10, &line("Fllint delivers a critical blast!"), &state);
    let event = parser
        .parse_line(12, &line("Fllint hits a goblin for 9000 points of damage."), &state)
        .unwrap();
    let ClassifiedRecord::Damage(record) = event.record else {
        panic!("expected damage");
    };
    assert!(!record.modifiers.is_crit());
}

#[test]
fn test_class_hint_suppressed_for_dummies() {
    let identity = Arc::new(PlayerRegistry::new());
    let parser = parser_with(Vec::new(), identity.clone());

    classify(&parser, "Bowyer hits a training dummy for 10 points of damage. (Headshot)");
    assert!(!identity.is_verified_player("Bowyer"));

    classify(&parser, "Arrowz hits a goblin for 10 points of damage. (Double Bow Shot)");
    assert_eq!(identity.player_class("Arrowz"), Some(PlayerClass::Ranger));
}

// ─────────────────────────────────────────────────────────────────────────────
// Deaths, taunts and the slain queue
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_slain_shapes() {
    let parser = test_parser();

    let Some(ClassifiedRecord::Death(death)) = classify(&parser, "A goblin has been slain by Kazint!")
    else {
        panic!("expected death");
    };
    assert_eq!(resolve(death.slain), "A GOBLIN");
    assert_eq!(resolve(death.killer), "KAZINT");

    let Some(ClassifiedRecord::Death(death)) = classify(&parser, "You have slain a goblin!") else {
        panic!("expected death");
    };
    assert_eq!(resolve(death.slain), "A GOBLIN");
    assert_eq!(resolve(death.killer), "KAZINT");

    let Some(ClassifiedRecord::Death(death)) =
        classify(&parser, "Fllint`s pet has been slain by a goblin!")
    else {
        panic!("expected death");
    };
    assert_eq!(death.slain_owner.map(resolve), Some("FLLINT"));
}

#[test]
fn test_taunts() {
    let parser = test_parser();

    let Some(ClassifiedRecord::Taunt(taunt)) = classify(&parser, "You capture a goblin's attention!")
    else {
        panic!("expected taunt");
    };
    assert_eq!(resolve(taunt.taunter), "KAZINT");
    assert_eq!(resolve(taunt.npc), "A GOBLIN");
    assert!(taunt.success);

    let Some(ClassifiedRecord::Taunt(taunt)) = classify(&parser, "Fllint failed to taunt a goblin.")
    else {
        panic!("expected taunt");
    };
    assert!(!taunt.success);

    let Some(ClassifiedRecord::Taunt(taunt)) = classify(
        &parser,
        "A goblin is focused on attacking Fllint due to an improved taunt.",
    ) else {
        panic!("expected taunt");
    };
    assert_eq!(resolve(taunt.taunter), "FLLINT");
    assert_eq!(resolve(taunt.npc), "A GOBLIN");
    assert!(taunt.improved);
}

#[test]
fn test_slain_queue_flushes_once() {
    let parser = test_parser();
    let state = parser.new_state();
    let mut collector = Collector::default();

    let lines = [
        "[Sun Apr 18 21:26:15 2021] A goblin has been slain by Kazint!",
        "[Sun Apr 18 21:26:15 2021] A goblin has been slain by Kazint!",
        "[Sun Apr 18 21:26:16 2021] Kazint crushes a rat for 5 points of damage.",
        "[Sun Apr 18 21:26:17 2021] Kazint crushes a rat for 5 points of damage.",
    ];
    for (i, text) in lines.iter().enumerate() {
        parser.process_line(i as u64 + 1, text, &state, &mut collector);
    }
    parser.finalize(&state, &mut collector);

    assert_eq!(collector.events.len(), 4);
    assert_eq!(collector.flushed.len(), 1);
    let (names, timestamp) = &collector.flushed[0];
    assert_eq!(names, &vec![intern("A GOBLIN")]);
    assert_eq!(*timestamp, 1618781176.0);
}

#[test]
fn test_finalize_flushes_remaining_and_dispatch_matches_process() {
    let parser = test_parser();
    let state = parser.new_state();
    let events: Vec<LogEvent> = [
        "[Sun Apr 18 21:26:15 2021] Kazint crushes a rat for 5 points of damage.",
        "[Sun Apr 18 21:26:16 2021] A rat has been slain by Kazint!",
    ]
    .iter()
    .enumerate()
    .filter_map(|(i, text)| parser.parse_line(i as u64 + 1, text, &state))
    .collect();

    let mut collector = Collector::default();
    parser.dispatch(&events, &state, &mut collector);
    assert!(collector.flushed.is_empty());

    parser.finalize(&state, &mut collector);
    assert_eq!(collector.flushed.len(), 1);
    assert_eq!(collector.flushed[0].0, vec![intern("A RAT")]);
    assert!(state.slain.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Heals
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_heal_by_spell() {
    let record = classify(
        &test_parser(),
        "Fllint healed Foob for 11820 hit points by Blessing of the Ancients III.",
    );
    let Some(ClassifiedRecord::Heal(heal)) = record else {
        panic!("expected heal");
    };
    assert_eq!(resolve(heal.healer), "Fllint");
    assert_eq!(resolve(heal.healed), "Foob");
    assert_eq!(heal.total, 11820);
    assert_eq!(heal.over_total, 11820);
    assert_eq!(heal.heal_type, HealType::Heal);
    assert_eq!(heal.sub_type.map(resolve), Some("Blessing of the Ancients III"));
}

#[test]
fn test_heal_over_time_with_overheal_and_crit() {
    let record = classify(
        &test_parser(),
        "Fllint healed Foob over time for 1000 (1500) hit points by Celestial Regeneration. (Critical)",
    );
    let Some(ClassifiedRecord::Heal(heal)) = record else {
        panic!("expected heal");
    };
    assert_eq!(heal.heal_type, HealType::Hot);
    assert_eq!(heal.total, 1000);
    assert_eq!(heal.over_total, 1500);
    assert!(heal.modifiers.is_crit());
    assert_eq!(heal.sub_type.map(resolve), Some("Celestial Regeneration"));
}

#[test]
fn test_heal_variants() {
    let parser = test_parser();

    let Some(ClassifiedRecord::Heal(heal)) =
        classify(&parser, "Foob has been healed for 500 hit points by Light of Life.")
    else {
        panic!("expected heal");
    };
    assert_eq!(resolve(heal.healer), "Unk");
    assert_eq!(resolve(heal.healed), "Foob");

    let Some(ClassifiedRecord::Heal(heal)) =
        classify(&parser, "Fllint`s ward healed Foob for 100 hit points.")
    else {
        panic!("expected heal");
    };
    assert_eq!(resolve(heal.healer), "Fllint");
    assert!(heal.sub_type.is_none());

    let Some(ClassifiedRecord::Heal(heal)) =
        classify(&parser, "Fllint healed himself for 100 hit points.")
    else {
        panic!("expected heal");
    };
    assert_eq!(resolve(heal.healed), "Fllint");

    let Some(ClassifiedRecord::Heal(heal)) =
        classify(&parser, "You healed Foob for 250 hit points by Remedy.")
    else {
        panic!("expected heal");
    };
    assert_eq!(resolve(heal.healer), "Kazint");
}

#[test]
fn test_pet_heals() {
    let identity = Arc::new(PlayerRegistry::new());
    identity.add_verified_player("Fllint");
    let parser = parser_with(Vec::new(), identity.clone());

    assert!(classify(&parser, "Foob healed Fllint`s pet for 100 hit points.").is_none());
    assert!(identity.is_verified_pet("Fllint`s pet"));
    assert_eq!(identity.pet_owner("Fllint`s pet").as_deref(), Some("Fllint"));

    let record = classify(&parser, "Fllint healed Gobaber for 2000 hit points by Mend Companion Rk. II.");
    assert!(matches!(record, Some(ClassifiedRecord::Heal(_))));
    assert!(identity.is_verified_pet("Gobaber"));
    assert_eq!(identity.pet_owner("Gobaber").as_deref(), Some("Fllint"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Casts
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_cast_forms() {
    let parser = test_parser();

    let Some(ClassifiedRecord::SpellCast(cast)) = classify(&parser, "You begin casting Complete Heal.")
    else {
        panic!("expected cast");
    };
    assert_eq!(resolve(cast.caster), "Kazint");
    assert_eq!(resolve(cast.spell), "Complete Heal");
    assert_eq!(cast.kind, CastKind::Cast);

    let Some(ClassifiedRecord::SpellCast(cast)) = classify(&parser, "Fllint begins singing Selo's Accelerando.")
    else {
        panic!("expected cast");
    };
    assert_eq!(cast.kind, CastKind::Sing);
    assert_eq!(resolve(cast.spell), "Selo's Accelerando");

    let Some(ClassifiedRecord::SpellCast(cast)) =
        classify(&parser, "Fllint begins to cast a spell. <Complete Heal>")
    else {
        panic!("expected cast");
    };
    assert_eq!(resolve(cast.caster), "Fllint");
    assert_eq!(resolve(cast.spell), "Complete Heal");

    let Some(ClassifiedRecord::SpellCast(cast)) = classify(&parser, "Your Fire Bolt spell is interrupted.")
    else {
        panic!("expected cast");
    };
    assert!(cast.interrupted);
    assert_eq!(resolve(cast.caster), "Kazint");
    assert_eq!(resolve(cast.spell), "Fire Bolt");

    let Some(ClassifiedRecord::SpellCast(cast)) =
        classify(&parser, "Fllint's Complete Heal spell is interrupted.")
    else {
        panic!("expected cast");
    };
    assert_eq!(resolve(cast.caster), "Fllint");
}

#[test]
fn test_special_abilities_only_for_self() {
    let parser = test_parser();

    let Some(ClassifiedRecord::Special(special)) =
        classify(&parser, "You activate Glyph of Destruction.")
    else {
        panic!("expected special");
    };
    assert_eq!(special.code, 'G');
    assert_eq!(resolve(special.player), "Kazint");

    let record = classify(&parser, "Fllint activates Glyph of Destruction.");
    assert!(matches!(record, Some(ClassifiedRecord::SpellCast(_))));
}

#[test]
fn test_cast_class_hint() {
    let identity = Arc::new(PlayerRegistry::new());
    let mut pyre = SpellDefinition::new("Pyre of the Fallen", 110);
    pyre.classes = vec![PlayerClass::Necromancer];
    let parser = parser_with(vec![pyre], identity.clone());

    classify(&parser, "Fllint begins casting Pyre of the Fallen.");
    assert!(identity.is_verified_player("Fllint"));
    assert_eq!(identity.player_class("Fllint"), Some(PlayerClass::Necromancer));
}

#[test]
fn test_zone_and_received_spells() {
    let identity = Arc::new(PlayerRegistry::new());
    let mut barrier = SpellDefinition::new("Thorny Barrier", 60);
    barrier.pet_only = true;
    barrier.lands_on_other = Some("is surrounded by a thorny barrier.".to_string());
    barrier.lands_on_you = Some("You are surrounded by a thorny barrier.".to_string());
    let parser = parser_with(vec![barrier], identity.clone());

    let Some(ClassifiedRecord::Zone(zone)) = classify(&parser, "You have entered The Plane of Knowledge.")
    else {
        panic!("expected zone");
    };
    assert_eq!(resolve(zone.zone), "The Plane of Knowledge");
    assert!(classify(&parser, "You have entered an area where levitation effects do not function.").is_none());

    let Some(ClassifiedRecord::ReceivedSpell(received)) =
        classify(&parser, "Your Clarity spell has worn off of Fllint.")
    else {
        panic!("expected worn off");
    };
    assert!(received.wore_off);
    assert_eq!(resolve(received.receiver), "Fllint");

    let Some(ClassifiedRecord::ReceivedSpell(received)) =
        classify(&parser, "Gobaber is surrounded by a thorny barrier.")
    else {
        panic!("expected landed");
    };
    assert_eq!(resolve(received.receiver), "Gobaber");
    assert_eq!(received.spell.map(resolve), Some("Thorny Barrier"));
    assert!(identity.is_verified_pet("Gobaber"));

    let Some(ClassifiedRecord::ReceivedSpell(received)) =
        classify(&parser, "You are surrounded by a thorny barrier.")
    else {
        panic!("expected landed on you");
    };
    assert_eq!(resolve(received.receiver), "Kazint");
}

#[test]
fn test_ambiguous_landing_keeps_candidates() {
    let mut first = SpellDefinition::new("Talisman of Wunshi", 100);
    first.lands_on_you = Some("You feel the spirit of Wunshi.".to_string());
    let mut second = SpellDefinition::new("Spirit of Wunshi", 90);
    second.lands_on_you = Some("You feel the spirit of Wunshi.".to_string());
    let parser = parser_with(vec![first, second], Arc::new(PlayerRegistry::new()));

    let Some(ClassifiedRecord::ReceivedSpell(received)) =
        classify(&parser, "You feel the spirit of Wunshi.")
    else {
        panic!("expected landed on you");
    };
    assert!(received.spell.is_none());
    assert!(received.resolution.unwrap().is_ambiguous());
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat and identity lines
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_chat_self() {
    let parser = test_parser();

    let Some(ClassifiedRecord::Chat(chat)) = classify(&parser, "You say, 'hello there'") else {
        panic!("expected chat");
    };
    assert_eq!(chat.channel, ChatChannel::Say);
    assert_eq!(resolve(chat.sender), "Kazint");
    assert_eq!(chat.text, "hello there");

    let Some(ClassifiedRecord::Chat(chat)) = classify(&parser, "You told Fllint, 'on my way'") else {
        panic!("expected chat");
    };
    assert_eq!(chat.channel, ChatChannel::Tell);
    assert_eq!(chat.receiver.map(resolve), Some("Fllint"));

    let Some(ClassifiedRecord::Chat(chat)) = classify(&parser, "You tell your raid, 'pull in 10'")
    else {
        panic!("expected chat");
    };
    assert_eq!(chat.channel, ChatChannel::Raid);
}

#[test]
fn test_chat_others() {
    let identity = Arc::new(PlayerRegistry::new());
    let parser = parser_with(Vec::new(), identity.clone());

    let Some(ClassifiedRecord::Chat(chat)) = classify(&parser, "Fllint tells the guild, 'pull now'")
    else {
        panic!("expected chat");
    };
    assert_eq!(chat.channel, ChatChannel::Guild);
    assert_eq!(resolve(chat.sender), "Fllint");
    assert!(identity.is_verified_player("Fllint"));

    let Some(ClassifiedRecord::Chat(chat)) =
        classify(&parser, "Fllint tells general:1, 'wts bone chips'")
    else {
        panic!("expected chat");
    };
    assert_eq!(chat.channel, ChatChannel::Custom(intern("general")));
    assert_eq!(chat.text, "wts bone chips");

    let Some(ClassifiedRecord::Chat(chat)) = classify(&parser, "Fllint tells you, 'inc'") else {
        panic!("expected chat");
    };
    assert_eq!(chat.receiver.map(resolve), Some("Kazint"));

    // a sender this long can't be a chat keyword match
    assert!(!matches!(
        classify(&parser, "A very long goblin name here says, 'hi'"),
        Some(ClassifiedRecord::Chat(_))
    ));
}

#[test]
fn test_prefilter_consumes_identity_lines() {
    let identity = Arc::new(PlayerRegistry::new());
    let parser = parser_with(Vec::new(), identity.clone());

    assert!(classify(&parser, "Targeted (Player): Fllint").is_none());
    assert!(identity.is_verified_player("Fllint"));

    assert!(classify(&parser, "Foob has joined the group.").is_none());
    assert!(identity.is_verified_player("Foob"));

    assert!(classify(&parser, "Gobaber says, 'My leader is Fllint.'").is_none());
    assert!(identity.is_verified_pet("Gobaber"));
    assert_eq!(identity.pet_owner("Gobaber").as_deref(), Some("Fllint"));
}

#[test]
fn test_quoted_pet_phrase_is_chat() {
    let identity = Arc::new(PlayerRegistry::new());
    let parser = parser_with(Vec::new(), identity.clone());

    let Some(ClassifiedRecord::Chat(chat)) =
        classify(&parser, "Fllint says, 'Gobaber says, 'My leader is Fllint.''")
    else {
        panic!("expected chat");
    };
    assert_eq!(chat.channel, ChatChannel::Say);
    assert_eq!(resolve(chat.sender), "Fllint");
    assert!(!identity.is_verified_pet("Fllint"));
    assert!(!identity.is_verified_pet("Gobaber"));

    // a known player repeating the sentence stays a player
    identity.add_verified_player("Foob");
    assert!(matches!(
        classify(&parser, "Foob says, 'My leader is Fllint.'"),
        Some(ClassifiedRecord::Chat(_))
    ));
    assert!(!identity.is_verified_pet("Foob"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Loot and misc
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_loot_forms() {
    let parser = test_parser();

    let Some(ClassifiedRecord::Loot(loot)) =
        classify(&parser, "--Fllint has looted a Bone Chip from a goblin's corpse.--")
    else {
        panic!("expected loot");
    };
    assert_eq!(resolve(loot.looter), "Fllint");
    assert_eq!(resolve(loot.item), "Bone Chip");
    assert_eq!(loot.quantity, 1);
    assert_eq!(loot.source, LootSource::Corpse(intern("a goblin")));

    let Some(ClassifiedRecord::Loot(loot)) =
        classify(&parser, "--You have looted 3 Bone Chip from a goblin's corpse.--")
    else {
        panic!("expected loot");
    };
    assert_eq!(resolve(loot.looter), "Kazint");
    assert_eq!(loot.quantity, 3);

    let Some(ClassifiedRecord::Loot(loot)) = classify(
        &parser,
        "--Fllint won the need roll on 1 item(s): Bone Chip with a roll of 883.--",
    ) else {
        panic!("expected won roll");
    };
    assert_eq!(loot.source, LootSource::WonRoll { roll: 883 });
    assert_eq!(resolve(loot.item), "Bone Chip");

    let Some(ClassifiedRecord::Loot(loot)) =
        classify(&parser, "--Fllint was given 2 item(s): Bone Chip.--")
    else {
        panic!("expected given");
    };
    assert_eq!(loot.source, LootSource::Given);
    assert_eq!(loot.quantity, 2);
}

#[test]
fn test_currency_split() {
    let Some(ClassifiedRecord::Loot(loot)) = classify(
        &test_parser(),
        "You receive 129 platinum, 2 gold and 1 copper as your split.",
    ) else {
        panic!("expected currency");
    };
    assert_eq!(resolve(loot.looter), "Kazint");
    assert_eq!(resolve(loot.item), "Currency");
    assert_eq!(loot.quantity, 129_201);
    assert_eq!(loot.source, LootSource::Split);
}

#[test]
fn test_currency_overflow_yields_nothing() {
    let parser = test_parser();
    assert!(classify(&parser, "You receive 18446744073709552 platinum as your split.").is_none());
    assert!(
        classify(
            &parser,
            "You receive 18446744073709551 platinum and 18446744073709551 platinum as your split.",
        )
        .is_none()
    );
}

#[test]
fn test_mez_reflect_and_resists() {
    let parser = test_parser();

    let Some(ClassifiedRecord::MezBreak(mez)) = classify(&parser, "A goblin has been awakened by Fllint.")
    else {
        panic!("expected mez break");
    };
    assert_eq!(resolve(mez.breaker), "Fllint");
    assert_eq!(resolve(mez.awakened), "A goblin");

    let Some(ClassifiedRecord::Resist(resist)) =
        classify(&parser, "Fllint's Fire Bolt spell has been reflected by a goblin.")
    else {
        panic!("expected reflect");
    };
    assert_eq!(resist.kind, ResistKind::Reflected);
    assert_eq!(resolve(resist.attacker), "Fllint");
    assert_eq!(resolve(resist.spell), "Fire Bolt");

    let Some(ClassifiedRecord::Resist(resist)) = classify(&parser, "A goblin resisted your Fire Bolt!")
    else {
        panic!("expected resist");
    };
    assert_eq!(resolve(resist.attacker), "Kazint");
    assert_eq!(resolve(resist.defender), "A goblin");

    let Some(ClassifiedRecord::Resist(resist)) =
        classify(&parser, "Your target resisted the Fire Bolt spell.")
    else {
        panic!("expected resist");
    };
    assert_eq!(resolve(resist.defender), "Unk");

    let Some(ClassifiedRecord::Resist(resist)) = classify(&parser, "You resist the Fire Bolt spell!")
    else {
        panic!("expected resist");
    };
    assert_eq!(resolve(resist.attacker), "Unk");
    assert_eq!(resolve(resist.defender), "Kazint");
    assert_eq!(resolve(resist.spell), "Fire Bolt");
}

#[test]
fn test_random_roll() {
    let Some(ClassifiedRecord::Rolled(roll)) = classify(
        &test_parser(),
        "**A Magic Die is rolled by Fllint. It could have been any number from 0 to 1000, but this time it turned up a 532.",
    ) else {
        panic!("expected roll");
    };
    assert_eq!(resolve(roll.player), "Fllint");
    assert_eq!(roll.max, 1000);
    assert_eq!(roll.rolled, 532);
}

#[test]
fn test_who_registers_identity() {
    let identity = Arc::new(PlayerRegistry::new());
    let parser = parser_with(Vec::new(), identity.clone());

    assert!(classify(&parser, "[110 Grave Lord (Necromancer)] Fllint (Dark Elf) <Guild>").is_none());
    assert_eq!(identity.player_class("Fllint"), Some(PlayerClass::Necromancer));
    assert_eq!(identity.player_level("Fllint"), Some(110));

    assert!(classify(&parser, "[ANONYMOUS] Foobar  <Some Guild>").is_none());
    assert!(identity.is_verified_player("Foobar"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Whole-engine properties
// ─────────────────────────────────────────────────────────────────────────────

const SAMPLE_LINES: [&str; 8] = [
    "[Sun Apr 18 21:26:15 2021] Astralx crushes Sontalak for 126225 points of damage. (Strikethrough Critical)",
    "[Mon Apr 26 21:07:21 2021] Lawlstryke has taken 216717 damage by Wisp Explosion.",
    "[Sat Apr 24 01:08:49 2021] Test One Hundred Three tries to punch Kazint, but misses!",
    "[Sun Feb 24 21:00:58 2019] Fllint healed Foob for 11820 hit points by Blessing of the Ancients III.",
    "[Sun Apr 18 21:26:15 2021] A goblin has been slain by Kazint!",
    "[Sun Apr 18 21:26:15 2021] You receive 129 platinum, 2 gold and 1 copper as your split.",
    "[Sun Apr 18 21:26:15 2021] Fllint tells the guild, 'pull now'",
    "[Sun Apr 18 21:26:15 2021] Fllint healed Foob over time for 1000 (1500) hit points by Celestial Regeneration. (Critical)",
];

#[test]
fn test_idempotent_with_fresh_state() {
    let parser = test_parser();
    for text in SAMPLE_LINES {
        let first = parser.parse_line(1, text, &parser.new_state());
        let second = parser.parse_line(1, text, &parser.new_state());
        assert!(first.is_some(), "{text}");
        assert_eq!(first, second, "{text}");
    }
}

#[test]
fn test_total_on_malformed_input() {
    let parser = test_parser();
    let state = parser.new_state();

    let malformed = [
        String::new(),
        "short".to_string(),
        "[Sun Apr 18 21:26:15 2021]".to_string(),
        line("Astralx crushes Sontalak for 5 points of damage. (Critical"),
        line(") ( )) ( (( ) ) ) )"),
        line("( ( ( ( ( ( ( ( ( ( ( ("),
        line("tries to but misses!"),
        line("has taken damage by"),
        line("You receive platinum as your split."),
        line("healed for hit points by"),
        line("--has looted--"),
        line("[ ] ] [ [ ["),
        line("Kazint hits é for ü points of damage."),
        format!("{}\u{00e9}\u{00e9}\u{00e9}", line("x")),
        line("Kazint crushes a goblin for 99999999999999999999999 points of damage."),
        line("Fllint healed Kazint for 18446744073709551616 (99999999999999999999) hit points."),
        line("You receive 18446744073709552 platinum as your split."),
        line("You receive 99999999999999999999 copper from the corpse."),
        line("Kazint won the need roll on 99999999999999999999 item(s): Bone Chip with a roll of 4294967296."),
        line("**A Magic Die is rolled by Kazint. It could have been any number from 0 to 99999999999, but this time it turned up a 4294967296."),
        line(&format!("{} hits a goblin for 5 points of damage.", "\u{00c9}".repeat(32))),
        line(&format!("{} has been slain by Kazint!", "\u{00fc}\u{00e9}".repeat(32))),
        line(&format!("Targeted (Player): {}", "\u{00c9}".repeat(64))),
        line(&format!("Foob says, 'My leader is {}.'", "\u{00e9}".repeat(64))),
    ];
    for text in &malformed {
        let _ = parser.parse_line(1, text, &state);
    }
    assert!(parser.parse_line(1, &malformed[3], &state).is_none());

    // every prefix of every sample line
    for text in SAMPLE_LINES {
        for (cut, _) in text.char_indices() {
            let _ = parser.parse_line(1, &text[..cut], &state);
        }
    }
}
