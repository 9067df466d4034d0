//! Time-boxed offers: expiry, generation, resolution and the window.

use rand::Rng;
use tracing::{debug, info};

use crate::config::{Balance, ProspectConfig};
use crate::error::{SimError, SimResult};
use crate::household;
use crate::id::PersonId;
use crate::kinship::KinshipGraph;
use crate::marriage::{self, Candidate};
use crate::model::{
    Arrears, Confidence, LifeEvent, LifeEventKind, PredictedEffects, Prospect, ProspectAction,
    ProspectId, ProspectKind, ProspectOutcome, ProspectRow, ProspectsWindow, RelationshipChange,
    RelationshipDelta, Requirements, Sex, StandingFlag, WorldState,
};
use crate::rng::RngStream;

/// Coin a liege grant offers against `arrears`.
pub fn grant_coin(arrears: Arrears, cfg: &ProspectConfig) -> i64 {
    let owed = arrears.coin.max(0) + arrears.bushels.max(0);
    (2 + owed / 2).clamp(cfg.grant_min, cfg.grant_max)
}

/// Close every active offer past its expiry and free its reservations.
pub fn expire(world: &mut WorldState) -> Vec<ProspectId> {
    let turn = world.turn;
    let expired: Vec<ProspectId> = world
        .prospects
        .active
        .iter()
        .filter(|p| p.is_expired(turn))
        .map(|p| p.id.clone())
        .collect();
    for id in &expired {
        world.prospects.close(id, ProspectOutcome::Expired, turn);
        world.reservations.release_offer(id);
        info!(prospect = %id, "prospect expired");
    }
    expired
}

/// Generate at most one new offer per kind, in the order grant,
/// inheritance claim, marriage, while fewer than the cap are active.
///
/// `arrears` is the arrears position the turn opened with. Every draw comes
/// from a sub-stream of `stream` named after the kind.
pub fn generate(
    world: &mut WorldState,
    balance: &Balance,
    arrears: Arrears,
    stream: &RngStream,
) -> SimResult<Vec<ProspectId>> {
    let mut created = Vec::new();
    if world.is_over() {
        return Ok(created);
    }
    let cfg = &balance.prospects;
    for kind in [
        ProspectKind::Grant,
        ProspectKind::InheritanceClaim,
        ProspectKind::Marriage,
    ] {
        if world.prospects.active.len() >= cfg.max_active {
            break;
        }
        if world.prospects.has_active_kind(kind) {
            continue;
        }
        let id = ProspectId::new(kind, world.turn);
        if world.prospects.is_decided(&id) {
            continue;
        }
        let mut rng = stream.fork(kind.as_str());
        let prospect = match kind {
            ProspectKind::Grant => grant_offer(world, balance, arrears)?,
            ProspectKind::InheritanceClaim => claim_offer(world, balance, &mut rng)?,
            ProspectKind::Marriage => marriage_offer(world, balance, &mut rng)?,
        };
        let Some(prospect) = prospect else { continue };
        if let Some(candidate) = prospect.candidate {
            world
                .reservations
                .reserve(candidate, prospect.id.clone(), prospect.expires_turn);
        }
        debug!(prospect = %prospect.id, "prospect generated");
        created.push(prospect.id.clone());
        world.prospects.active.push(prospect);
    }
    Ok(created)
}

fn blank(world: &WorldState, kind: ProspectKind, cfg: &ProspectConfig) -> Prospect {
    Prospect {
        id: ProspectId::new(kind, world.turn),
        kind,
        generated_turn: world.turn,
        expires_turn: world.turn + cfg.ttl_turns,
        house: None,
        subject: None,
        candidate: None,
        summary: String::new(),
        requirements: Requirements::default(),
        cost: 0,
        effects: PredictedEffects::default(),
        confidence: Confidence::High,
        allowed: vec![ProspectAction::Accept, ProspectAction::Reject],
    }
}

fn grant_offer(world: &WorldState, balance: &Balance, arrears: Arrears) -> SimResult<Option<Prospect>> {
    if arrears.is_clear() {
        return Ok(None);
    }
    let liege = world.house(world.liege_house)?;
    let head = world.player()?.head;
    let coin = grant_coin(arrears, &balance.prospects);

    let mut p = blank(world, ProspectKind::Grant, &balance.prospects);
    p.house = Some(liege.id);
    p.subject = head;
    p.summary = format!(
        "House {} offers {coin} coin against your arrears, for a favour owed",
        liege.name
    );
    p.effects.coin_delta = coin;
    p.effects.flags.push(StandingFlag::LiegeFavorOwed);
    if let (Some(from), Some(to)) = (world.liege_head(), head) {
        p.effects.relationships.push(RelationshipChange {
            from,
            to,
            delta: RelationshipDelta::new(3, 0, 0),
        });
    }
    Ok(Some(p))
}

/// Outsiders who could press a claim on the player house: adults of the
/// marriage age band in neighbouring houses who are neither head nor heir.
fn claimants(world: &WorldState, balance: &Balance) -> SimResult<Vec<Candidate>> {
    let scope = marriage::marriage_scope(world, world.player_house)?;
    let band = balance.household.marriage_min_age..=balance.household.marriage_max_age;
    let mut out = Vec::new();
    for house_id in &scope {
        let house = world.house(*house_id)?;
        for person in world.living_in_house(*house_id) {
            let p = world.person(person)?;
            if !band.contains(&p.age)
                || house.head == Some(person)
                || house.heir == Some(person)
                || world.reservations.is_reserved(person, world.turn)
            {
                continue;
            }
            out.push(Candidate {
                person,
                house: house.id,
                tier: house.tier,
                proximity: house.proximity,
            });
        }
    }
    out.sort();
    Ok(out)
}

fn claim_offer(
    world: &WorldState,
    balance: &Balance,
    rng: &mut RngStream,
) -> SimResult<Option<Prospect>> {
    let player = world.player()?;
    if player.head.is_none() || player.heir.is_some() || player.adopted_heir.is_some() {
        return Ok(None);
    }
    let pool = claimants(world, balance)?;
    let shortlist = &pool[..pool.len().min(marriage::WINDOW_SIZE)];
    if shortlist.is_empty() {
        return Ok(None);
    }
    let pick = &shortlist[rng.random_range(0..shortlist.len())];
    let claimant = world.person(pick.person)?;
    let house = world.house(pick.house)?;
    let cost = balance.prospects.claim_cost;

    let mut p = blank(world, ProspectKind::InheritanceClaim, &balance.prospects);
    p.house = Some(pick.house);
    p.subject = player.head;
    p.candidate = Some(pick.person);
    p.summary = format!(
        "{} of House {} would stand as your heir, for {cost} coin in fees",
        claimant.name, house.name
    );
    p.cost = cost;
    p.requirements.min_coin = cost;
    p.confidence = Confidence::Medium;
    p.effects.flags.push(StandingFlag::ClaimPressed);
    if let (Some(from), Some(to)) = (house.head, player.head) {
        p.effects.relationships.push(RelationshipChange {
            from,
            to,
            delta: RelationshipDelta::new(-3, 0, 5),
        });
    }
    Ok(Some(p))
}

fn marriage_offer(
    world: &WorldState,
    balance: &Balance,
    rng: &mut RngStream,
) -> SimResult<Option<Prospect>> {
    let Some(subject) = marriage::marriage_subject(world, balance)? else {
        return Ok(None);
    };
    let scope = marriage::marriage_scope(world, world.player_house)?;
    let pool = marriage::list_eligible_candidates(world, subject, &scope, balance)?;
    let shortlist = &pool[..pool.len().min(marriage::WINDOW_SIZE)];
    if shortlist.is_empty() {
        return Ok(None);
    }
    let pick = &shortlist[rng.random_range(0..shortlist.len())];
    let subject_person = world.person(subject)?;
    let candidate = world.person(pick.person)?;
    let house = world.house(pick.house)?;
    let dowry = balance.household.dowry;

    let mut p = blank(world, ProspectKind::Marriage, &balance.prospects);
    p.house = Some(pick.house);
    p.subject = Some(subject);
    p.candidate = Some(pick.person);
    p.summary = format!(
        "House {} proposes {} for {}",
        house.name, candidate.name, subject_person.name
    );
    if subject_person.sex == Sex::Female {
        p.effects.coin_delta = -dowry;
        p.requirements.min_coin = dowry;
    } else {
        p.effects.coin_delta = dowry;
    }
    p.effects.flags.push(StandingFlag::AllianceForged);
    if let (Some(other), Some(ours)) = (house.head, world.player()?.head) {
        for (from, to) in [(other, ours), (ours, other)] {
            p.effects.relationships.push(RelationshipChange {
                from,
                to,
                delta: RelationshipDelta::new(5, 0, 0),
            });
        }
    }
    Ok(Some(p))
}

/// Result of resolving one offer.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Accepted {
        unrest: i32,
        events: Vec<LifeEvent>,
    },
    Rejected,
    /// Already closed earlier. Nothing happened.
    AlreadyDecided,
    Unknown,
    NotAllowed,
    /// Requirements not met; the offer stays open.
    Infeasible(String),
}

/// Resolve an offer exactly once. Accepting applies every predicted effect;
/// nothing is applied unless all of it can be.
pub fn resolve(
    world: &mut WorldState,
    id: &ProspectId,
    action: ProspectAction,
    balance: &Balance,
) -> SimResult<Resolution> {
    if world.prospects.is_decided(id) {
        return Ok(Resolution::AlreadyDecided);
    }
    let Some(prospect) = world.prospects.get(id).cloned() else {
        return Ok(Resolution::Unknown);
    };
    if !prospect.allows(action) {
        return Ok(Resolution::NotAllowed);
    }
    let turn = world.turn;
    if action == ProspectAction::Reject {
        world.prospects.close(id, ProspectOutcome::Rejected, turn);
        world.reservations.release_offer(id);
        return Ok(Resolution::Rejected);
    }

    if let Some(reason) = infeasibility(world, &prospect)? {
        return Ok(Resolution::Infeasible(reason));
    }

    let effects = &prospect.effects;
    world.estate.coin += effects.coin_delta - prospect.cost;
    world.estate.bushels += effects.bushels_delta;
    world.estate.unrest += effects.unrest_delta;
    world.estate.actions_remaining -= prospect.requirements.actions;
    for change in &effects.relationships {
        world.adjust_relationship(change.from, change.to, change.delta, balance.relations.baseline());
    }
    world.flags.standing.extend(effects.flags.iter().copied());

    let mut events = Vec::new();
    match (prospect.kind, prospect.subject, prospect.candidate) {
        (ProspectKind::Marriage, Some(subject), Some(candidate)) => {
            world.reservations.release_offer(id);
            marriage::arrange_match(world, subject, candidate)?;
            events.push(LifeEvent {
                turn,
                kind: LifeEventKind::Marriage,
                house: prospect.house,
                person: Some(subject),
                detail: format!("married {candidate} by arrangement"),
            });
        }
        (ProspectKind::InheritanceClaim, _, Some(claimant)) => {
            adopt_claimant(world, claimant)?;
        }
        _ => {}
    }
    world.prospects.close(id, ProspectOutcome::Accepted, turn);
    world.reservations.release_offer(id);
    household::recompute_heirs(world)?;
    info!(prospect = %id, "prospect accepted");
    Ok(Resolution::Accepted {
        unrest: effects.unrest_delta,
        events,
    })
}

fn infeasibility(world: &WorldState, prospect: &Prospect) -> SimResult<Option<String>> {
    let estate = &world.estate;
    let needed = prospect.requirements.min_coin.max(prospect.cost);
    if estate.coin < needed {
        return Ok(Some(format!("needs {needed} coin, have {}", estate.coin)));
    }
    if estate.coin + prospect.effects.coin_delta - prospect.cost < 0 {
        return Ok(Some("cannot cover the cost".into()));
    }
    if estate.actions_remaining < prospect.requirements.actions {
        return Ok(Some("no actions left this turn".into()));
    }
    let graph = KinshipGraph::of(world);
    match prospect.kind {
        ProspectKind::Marriage => {
            let (Some(subject), Some(candidate)) = (prospect.subject, prospect.candidate) else {
                return Ok(Some("offer names nobody".into()));
            };
            for p in [subject, candidate] {
                if !world.is_alive(p) {
                    return Ok(Some(format!("{p} is no longer living")));
                }
                if graph.spouse_of(p).is_some() {
                    return Ok(Some(format!("{p} is already married")));
                }
            }
        }
        ProspectKind::InheritanceClaim => {
            let Some(claimant) = prospect.candidate else {
                return Ok(Some("offer names nobody".into()));
            };
            if !world.is_alive(claimant) {
                return Ok(Some(format!("{claimant} is no longer living")));
            }
        }
        ProspectKind::Grant => {}
    }
    Ok(None)
}

/// Bring a claimant into the player house as adopted heir.
fn adopt_claimant(world: &mut WorldState, claimant: PersonId) -> SimResult<()> {
    let player = world.player_house;
    if let Some(origin) = world.person(claimant)?.house {
        if origin != player {
            world.house_mut(origin)?.remove_member(claimant);
        }
    }
    world.person_mut(claimant)?.house = Some(player);
    let house = world.player_mut()?;
    house.retain_in_court(claimant);
    if house.adopted_heir.is_some_and(|a| a != claimant) {
        return Err(SimError::invariant(
            "single_adopted_heir",
            format!("{player} already has an adopted heir"),
        ));
    }
    house.adopted_heir = Some(claimant);
    Ok(())
}

/// Split active offers into those whose requirements are currently met
/// (shown) and the rest (hidden). Display only.
pub fn build_window(world: &WorldState, log: Vec<String>) -> ProspectsWindow {
    let estate = &world.estate;
    let mut window = ProspectsWindow {
        log,
        ..ProspectsWindow::default()
    };
    for p in &world.prospects.active {
        let needed = p.requirements.min_coin.max(p.cost);
        if estate.coin >= needed && estate.actions_remaining >= p.requirements.actions {
            window.shown.push(ProspectRow {
                id: p.id.clone(),
                kind: p.kind,
                summary: p.summary.clone(),
                expires_turn: p.expires_turn,
            });
        } else {
            window.hidden.push(p.id.clone());
        }
    }
    window
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Channel;
    use crate::testutil;

    #[test]
    fn grant_formula() {
        let cfg = ProspectConfig::default();
        assert_eq!(grant_coin(Arrears { coin: 10, bushels: 0 }, &cfg), 7);
        assert_eq!(grant_coin(Arrears { coin: 1, bushels: 0 }, &cfg), 2);
        assert_eq!(grant_coin(Arrears { coin: 40, bushels: 30 }, &cfg), 12);
        assert_eq!(grant_coin(Arrears { coin: 3, bushels: 4 }, &cfg), 5);
    }

    #[test]
    fn no_grant_without_arrears() {
        let mut world = testutil::small_world(4);
        let stream = RngStream::new(4, Channel::Prospects, 0);
        let ids = generate(&mut world, &Balance::default(), Arrears::default(), &stream).unwrap();
        assert!(ids.iter().all(|id| !id.as_str().starts_with("grant")));
    }

    #[test]
    fn generation_respects_cap_and_kinds() {
        let mut world = testutil::small_world(4);
        let mut balance = Balance::default();
        balance.prospects.max_active = 1;
        let stream = RngStream::new(4, Channel::Prospects, 0);
        let arrears = Arrears { coin: 10, bushels: 0 };
        let ids = generate(&mut world, &balance, arrears, &stream).unwrap();
        assert_eq!(ids, vec![ProspectId::new(ProspectKind::Grant, 0)]);
        let again = generate(&mut world, &balance, arrears, &stream).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn reject_then_accept_is_a_no_op() {
        let mut world = testutil::small_world(4);
        let stream = RngStream::new(4, Channel::Prospects, 0);
        let arrears = Arrears { coin: 10, bushels: 0 };
        generate(&mut world, &Balance::default(), arrears, &stream).unwrap();
        let id = ProspectId::new(ProspectKind::Grant, 0);
        let coin = world.estate.coin;
        let first = resolve(&mut world, &id, ProspectAction::Reject, &Balance::default()).unwrap();
        assert_eq!(first, Resolution::Rejected);
        let second = resolve(&mut world, &id, ProspectAction::Accept, &Balance::default()).unwrap();
        assert_eq!(second, Resolution::AlreadyDecided);
        assert_eq!(world.estate.coin, coin);
    }

    #[test]
    fn expiry_releases_reservations() {
        let mut world = testutil::small_world(4);
        testutil::unmarried_son(&mut world, 20);
        let stream = RngStream::new(4, Channel::Prospects, 0);
        generate(&mut world, &Balance::default(), Arrears::default(), &stream).unwrap();
        let offer = world
            .prospects
            .active
            .iter()
            .find(|p| p.kind == ProspectKind::Marriage)
            .cloned()
            .unwrap();
        let candidate = offer.candidate.unwrap();
        assert!(world.reservations.is_reserved(candidate, world.turn));

        world.turn = offer.expires_turn + 1;
        let expired = expire(&mut world);
        assert_eq!(expired, vec![offer.id.clone()]);
        assert!(world.reservations.holder(candidate).is_none());
        assert_eq!(
            world.prospects.decided[&offer.id].outcome,
            ProspectOutcome::Expired
        );
    }

    #[test]
    fn window_hides_unaffordable_offers() {
        let mut world = testutil::bare_world(4);
        world.estate.coin = 0;
        let stream = RngStream::new(4, Channel::Prospects, 0);
        generate(&mut world, &Balance::default(), Arrears::default(), &stream).unwrap();
        let claim = ProspectId::new(ProspectKind::InheritanceClaim, 0);
        assert!(world.prospects.get(&claim).is_some());
        let window = build_window(&world, Vec::new());
        assert!(window.hidden.contains(&claim));
        assert!(window.shown.iter().all(|r| r.id != claim));
    }
}
