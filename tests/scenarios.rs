mod common;

use estate_sim::model::{
    Badge, DecisionKind, GameOver, LifeEventKind, ProspectId, ProspectKind, Role, WarLevyChoice,
};
use estate_sim::testutil::{self, small_world};
use estate_sim::{Decisions, PersonId, SimError};

fn spouse_of_head(world: &estate_sim::WorldState) -> PersonId {
    world.player().unwrap().spouse.unwrap()
}

#[test]
fn oversubscribed_labor_sheds_builders() {
    let engine = common::engine();
    let mut world = small_world(5);
    world.estate.population = 10;
    world.estate.farmers = 10;
    world.estate.builders = 10;

    let preview = engine.preview(&world).unwrap();
    let labor = preview.report.labor;
    assert_eq!(labor.requested_farmers, 10);
    assert_eq!(labor.requested_builders, 10);
    assert_eq!(labor.farmers, 10);
    assert_eq!(labor.builders, 0);
    assert!(labor.was_oversubscribed);
    assert!(labor.auto_clamped);
    assert!(labor.assigned() <= labor.available);

    let estate = &preview.projected.estate;
    assert!(estate.farmers + estate.builders <= estate.population);
}

#[test]
fn accepted_grant_pays_out_once() {
    let engine = common::engine();
    let mut world = small_world(8);
    world.estate.arrears.coin = 10;

    let preview = engine.preview(&world).unwrap();
    let id = ProspectId::new(ProspectKind::Grant, 0);
    let window = preview.report.prospects_window.as_ref().unwrap();
    assert!(window.shown.iter().any(|row| row.id == id));
    let grant = preview.projected.prospects.get(&id).unwrap().effects.coin_delta;
    assert_eq!(grant, 7);

    let mut accepted = world.clone();
    let mut rejected = world.clone();
    engine
        .commit(&mut accepted, &Decisions::default().accept(id.clone()))
        .unwrap();
    engine
        .commit(&mut rejected, &Decisions::default().reject(id.clone()))
        .unwrap();

    assert_eq!(accepted.estate.coin - rejected.estate.coin, 7);
    assert!(accepted.prospects.is_decided(&id));
    assert!(rejected.prospects.is_decided(&id));
    assert!(accepted.prospects.get(&id).is_none());
}

#[test]
fn head_dying_mid_turn_keeps_the_head_row() {
    let engine = common::engine();
    let mut world = small_world(3);
    world.turn = 1;
    let wife = spouse_of_head(&world);
    world.persons.get_mut(&wife).unwrap().mark_dead(0);
    let head = world.player().unwrap().head.unwrap();
    world.persons.get_mut(&head).unwrap().age = 96;

    let preview = engine.preview(&world).unwrap();
    let row = preview.report.roster_row(head).unwrap();
    assert_eq!(row.role, Role::Head);
    assert!(row.has_badge(Badge::Deceased));
    assert!(preview
        .report
        .life_events
        .iter()
        .any(|e| e.kind == LifeEventKind::Death && e.person == Some(head)));
}

#[test]
fn heir_succeeds_a_dead_head() {
    let engine = common::engine();
    let mut world = small_world(3);
    let head = world.player().unwrap().head.unwrap();
    let heir = world.player().unwrap().heir.unwrap();
    world.persons.get_mut(&head).unwrap().age = 96;

    let report = engine.commit(&mut world, &Decisions::default()).unwrap();
    assert!(!world.is_alive(head));
    assert_eq!(world.player().unwrap().head, Some(heir));
    assert!(report
        .life_events
        .iter()
        .any(|e| e.kind == LifeEventKind::Succession));
    assert_eq!(world.game_over, None);
}

#[test]
fn marriage_to_a_shown_candidate() {
    let engine = common::engine();
    let mut world = small_world(9);
    let son = testutil::unmarried_son(&mut world, 22);

    let preview = engine.preview(&world).unwrap();
    let window = preview.report.marriage_window.clone().unwrap();
    assert_eq!(window.subject, son);
    let candidate = window.shown[0].person;

    let report = engine
        .commit(&mut world, &Decisions::default().arrange_marriage(candidate))
        .unwrap();
    assert!(
        !report.notes.iter().any(|n| n.decision == DecisionKind::Marriage),
        "{:?}",
        report.notes
    );
    let graph = estate_sim::kinship::KinshipGraph::of(&world);
    assert_eq!(graph.spouse_of(son), Some(candidate));
    assert_eq!(
        world.person(candidate).unwrap().house,
        Some(world.player_house)
    );
}

#[test]
fn overflowing_labor_plan_becomes_a_note() {
    let engine = common::engine();
    let mut world = small_world(8);
    let mut untouched = world.clone();

    let report = engine
        .commit(&mut world, &Decisions::default().with_labor(u32::MAX, 1))
        .unwrap();
    let baseline = engine.commit(&mut untouched, &Decisions::default()).unwrap();

    assert!(report.notes.iter().any(|n| n.decision == DecisionKind::Labor));
    assert_eq!(world.estate.farmers, untouched.estate.farmers);
    assert_eq!(world.estate.builders, untouched.estate.builders);
    assert_eq!(report.labor, baseline.labor);
}

#[test]
fn invalid_decisions_become_notes() {
    let engine = common::engine();
    let mut world = small_world(4);
    let coin = world.estate.coin;
    let decisions = Decisions::default()
        .sell(1_000_000)
        .start_construction("observatory")
        .pay(coin + 50, 0)
        .arrange_marriage(PersonId(9999));

    let report = engine.commit(&mut world, &decisions).unwrap();
    for kind in [
        DecisionKind::Sell,
        DecisionKind::Construction,
        DecisionKind::Marriage,
        DecisionKind::Obligations,
    ] {
        assert!(
            report.notes.iter().any(|n| n.decision == kind),
            "missing {kind} note"
        );
    }
    assert_eq!(report.market.sold, 0);
    assert_eq!(world.estate.project, None);
    assert_eq!(report.obligations.paid_coin, 0);
}

#[test]
fn refusing_an_absent_levy_is_noted() {
    let engine = common::engine();
    let mut world = small_world(4);
    world.estate.dues.war_levy = None;
    let preview = engine.preview(&world).unwrap();
    if preview.projected.estate.dues.war_levy.is_some() {
        return;
    }
    let report = engine
        .commit(&mut world, &Decisions::default().levy(WarLevyChoice::Refuse))
        .unwrap();
    assert!(report
        .notes
        .iter()
        .any(|n| n.decision == DecisionKind::Obligations));
}

#[test]
fn unrest_ceiling_ends_the_run() {
    let engine = common::engine();
    let mut world = small_world(6);
    world.estate.unrest = 100;
    world.estate.coin = 0;
    world.estate.arrears.coin = 80;

    let report = engine.commit(&mut world, &Decisions::default()).unwrap();
    assert_eq!(report.game_over, Some(GameOver::Dispossessed));
    assert_eq!(world.game_over, Some(GameOver::Dispossessed));
    assert_eq!(world.log.len(), 1);

    assert!(matches!(engine.preview(&world), Err(SimError::RunEnded)));
    assert!(matches!(
        engine.commit(&mut world, &Decisions::default()),
        Err(SimError::RunEnded)
    ));
    assert_eq!(world.log.len(), 1);
}
