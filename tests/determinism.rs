mod common;

use estate_sim::run_turns;

#[test]
fn same_seed_and_decisions_replay_identically() {
    let engine = common::engine();
    let plan = common::varied_plan(8);

    let mut a = common::genesis(31);
    let mut b = common::genesis(31);
    let reports_a = run_turns(&mut a, &engine, &plan).unwrap();
    let reports_b = run_turns(&mut b, &engine, &plan).unwrap();

    assert_eq!(reports_a, reports_b);
    assert_eq!(a, b);
    assert_eq!(a.log.len(), reports_a.len());
}

#[test]
fn different_seeds_diverge() {
    let engine = common::engine();
    let plan = common::varied_plan(6);

    let mut a = common::genesis(1);
    let mut b = common::genesis(2);
    run_turns(&mut a, &engine, &plan).unwrap();
    run_turns(&mut b, &engine, &plan).unwrap();
    assert_ne!(a, b);
}

#[test]
fn preview_matches_the_commit_it_precedes() {
    let engine = common::engine();
    let mut world = common::genesis(12);
    let plan = common::varied_plan(4);
    for decisions in &plan {
        if world.is_over() {
            break;
        }
        let preview = engine.preview(&world).unwrap();
        let mut committed = world.clone();
        let report = engine.commit(&mut committed, decisions).unwrap();
        assert_eq!(preview.report.weather, report.weather);
        assert_eq!(preview.report.production.harvest, report.production.harvest);
        assert_eq!(preview.report.fired_events, report.fired_events);
        world = committed;
    }
}

#[test]
fn previews_do_not_consume_randomness() {
    let engine = common::engine();
    let plan = common::varied_plan(5);

    let mut quiet = common::genesis(77);
    let mut busy = common::genesis(77);
    for decisions in &plan {
        for _ in 0..3 {
            engine.preview(&busy).unwrap();
        }
        engine.commit(&mut quiet, decisions).unwrap();
        engine.commit(&mut busy, decisions).unwrap();
        if quiet.is_over() {
            break;
        }
    }
    assert_eq!(quiet, busy);
}
