//! Applying the player's decisions on commit.
//!
//! A decision that cannot be applied as given leaves a note in the report
//! and changes nothing; the rest of the turn still resolves.

use tracing::info;

use super::context::TurnContext;
use super::labor;
use crate::error::SimResult;
use crate::household;
use crate::marriage;
use crate::model::{
    ConstructionAction, DecisionKind, Decisions, LaborPlan, LifeEvent, LifeEventKind,
    MarriageAction, ObligationPayment, Project, ProspectResolution, Sex, UnrestSource,
    WarLevyChoice,
};
use crate::prospects::{self, Resolution};

/// Unrest from refusing a war levy.
pub const LEVY_REFUSAL_UNREST: i32 = 5;

/// Apply `decisions` in the fixed order labor, sell, construction,
/// marriage, prospects, obligations.
pub fn apply_decisions(ctx: &mut TurnContext, decisions: &Decisions) -> SimResult<()> {
    if ctx.world.is_over() {
        return Ok(());
    }
    if let Some(plan) = decisions.labor {
        apply_labor(ctx, plan);
    }
    if decisions.sell_bushels != 0 {
        apply_sale(ctx, decisions.sell_bushels);
    }
    apply_construction(ctx, &decisions.construction);
    apply_marriage(ctx, decisions.marriage)?;
    for resolution in &decisions.prospects {
        apply_prospect(ctx, resolution)?;
    }
    apply_obligations(ctx, decisions.obligations);
    Ok(())
}

fn reject(ctx: &mut TurnContext, decision: DecisionKind, message: String) {
    info!(%decision, %message, "decision rejected");
    ctx.report.note(decision, message);
}

/// New labor allocation, effective from next turn's production.
fn apply_labor(ctx: &mut TurnContext, plan: LaborPlan) {
    let estate = &ctx.world.estate;
    let population = estate.population;
    let requested = u64::from(plan.farmers) + u64::from(plan.builders);
    if requested > u64::from(population) {
        let message = format!("asked for {requested} workers but only {population} are available");
        return reject(ctx, DecisionKind::Labor, message);
    }
    let shift = plan.farmers.abs_diff(estate.farmers) + plan.builders.abs_diff(estate.builders);
    let cap = ctx.balance.economy.labor_shift_floor.max(population / 2);
    if shift > cap {
        let message = format!("moving {shift} workers exceeds the shift cap of {cap}");
        return reject(ctx, DecisionKind::Labor, message);
    }
    let estate = &mut ctx.world.estate;
    estate.farmers = plan.farmers;
    estate.builders = plan.builders;
}

fn apply_sale(ctx: &mut TurnContext, amount: i64) {
    let cap = ctx.report.market.sell_cap;
    let stores = ctx.world.estate.bushels;
    if amount < 0 {
        return reject(ctx, DecisionKind::Sell, format!("cannot sell {amount} bushels"));
    }
    if amount > cap {
        let message = format!("the market takes at most {cap} bushels this turn");
        return reject(ctx, DecisionKind::Sell, message);
    }
    if amount > stores {
        let message = format!("only {stores} bushels in store");
        return reject(ctx, DecisionKind::Sell, message);
    }
    let income = (amount as f64 * ctx.report.market.price).floor() as i64;
    let estate = &mut ctx.world.estate;
    estate.bushels -= amount;
    estate.coin += income;
    ctx.report.market.sold = amount;
    ctx.report.market.income = income;
}

fn apply_construction(ctx: &mut TurnContext, action: &ConstructionAction) {
    match action {
        ConstructionAction::None => {}
        ConstructionAction::Abandon => {
            if ctx.world.estate.project.take().is_none() {
                reject(ctx, DecisionKind::Construction, "nothing is under construction".into());
            }
        }
        ConstructionAction::Start { improvement } => {
            let content = ctx.content;
            let Some(def) = content.improvement(improvement) else {
                let message = format!("unknown improvement {improvement}");
                return reject(ctx, DecisionKind::Construction, message);
            };
            let estate = &ctx.world.estate;
            let problem = if estate.has_improvement(def.id) {
                Some(format!("the {} is already built", def.name))
            } else if let Some(project) = &estate.project {
                Some(format!("already building the {}", project.improvement))
            } else if estate.actions_remaining == 0 {
                Some("no actions left this turn".to_string())
            } else if estate.coin < def.cost {
                Some(format!("the {} costs {} coin", def.name, def.cost))
            } else {
                None
            };
            if let Some(message) = problem {
                return reject(ctx, DecisionKind::Construction, message);
            }
            let estate = &mut ctx.world.estate;
            estate.coin -= def.cost;
            estate.actions_remaining -= 1;
            estate.project = Some(Project {
                improvement: def.id.to_string(),
                progress: 0,
            });
        }
    }
}

fn apply_marriage(ctx: &mut TurnContext, action: MarriageAction) -> SimResult<()> {
    let MarriageAction::Arrange { candidate } = action else {
        return Ok(());
    };
    let Some(window) = &ctx.report.marriage_window else {
        reject(ctx, DecisionKind::Marriage, "no one is seeking a match".into());
        return Ok(());
    };
    let subject = window.subject;
    if !window.shown.iter().any(|row| row.person == candidate) {
        let message = format!("{candidate} is not among the offered matches");
        reject(ctx, DecisionKind::Marriage, message);
        return Ok(());
    }
    let dowry = ctx.balance.household.dowry;
    let bride = ctx.world.person(subject)?.sex == Sex::Female;
    if ctx.world.estate.actions_remaining == 0 {
        reject(ctx, DecisionKind::Marriage, "no actions left this turn".into());
        return Ok(());
    }
    if bride && ctx.world.estate.coin < dowry {
        reject(ctx, DecisionKind::Marriage, format!("the dowry is {dowry} coin"));
        return Ok(());
    }

    marriage::arrange_match(ctx.world, subject, candidate)?;
    let estate = &mut ctx.world.estate;
    estate.actions_remaining -= 1;
    estate.coin += if bride { -dowry } else { dowry };
    household::recompute_heirs(ctx.world)?;
    let turn = ctx.world.turn;
    ctx.report.life_events.push(LifeEvent {
        turn,
        kind: LifeEventKind::Marriage,
        house: Some(ctx.world.player_house),
        person: Some(subject),
        detail: format!("married {candidate}"),
    });
    Ok(())
}

fn log_offer(ctx: &mut TurnContext, line: String) {
    if let Some(window) = ctx.report.prospects_window.as_mut() {
        window.log.push(line);
    }
}

fn apply_prospect(ctx: &mut TurnContext, resolution: &ProspectResolution) -> SimResult<()> {
    let id = &resolution.id;
    match prospects::resolve(ctx.world, id, resolution.action, ctx.balance)? {
        Resolution::Accepted { unrest, events } => {
            ctx.report.add_unrest(UnrestSource::Event, unrest);
            ctx.report.life_events.extend(events);
            log_offer(ctx, format!("{id} accepted"));
        }
        Resolution::Rejected => log_offer(ctx, format!("{id} rejected")),
        Resolution::AlreadyDecided => {
            reject(ctx, DecisionKind::Prospect, format!("{id} was already decided"));
        }
        Resolution::Unknown => {
            reject(ctx, DecisionKind::Prospect, format!("no open offer {id}"));
        }
        Resolution::NotAllowed => {
            let message = format!("{id} does not allow {}", resolution.action);
            reject(ctx, DecisionKind::Prospect, message);
        }
        Resolution::Infeasible(reason) => {
            reject(ctx, DecisionKind::Prospect, format!("{id}: {reason}"));
        }
    }
    Ok(())
}

/// Pay dues first, then arrears; answer any war levy.
fn apply_obligations(ctx: &mut TurnContext, payment: ObligationPayment) {
    let estate = &ctx.world.estate;
    if payment.coin < 0 || payment.bushels < 0 {
        reject(ctx, DecisionKind::Obligations, "payments cannot be negative".into());
    } else if payment.coin > estate.coin || payment.bushels > estate.bushels {
        let message = format!(
            "cannot pay {} coin and {} bushels from {} coin and {} bushels",
            payment.coin, payment.bushels, estate.coin, estate.bushels
        );
        reject(ctx, DecisionKind::Obligations, message);
    } else {
        let estate = &mut ctx.world.estate;
        let (coin, bushels) = (payment.coin, payment.bushels);
        let to_dues_coin = coin.min(estate.dues.coin.max(0));
        let to_arrears_coin = (coin - to_dues_coin).min(estate.arrears.coin.max(0));
        let to_dues_bushels = bushels.min(estate.dues.bushels.max(0));
        let to_arrears_bushels = (bushels - to_dues_bushels).min(estate.arrears.bushels.max(0));
        estate.dues.coin -= to_dues_coin;
        estate.dues.bushels -= to_dues_bushels;
        estate.arrears.coin -= to_arrears_coin;
        estate.arrears.bushels -= to_arrears_bushels;
        let paid_coin = to_dues_coin + to_arrears_coin;
        let paid_bushels = to_dues_bushels + to_arrears_bushels;
        estate.coin -= paid_coin;
        estate.bushels -= paid_bushels;
        ctx.report.obligations.paid_coin = paid_coin;
        ctx.report.obligations.paid_bushels = paid_bushels;
    }

    let Some(demand) = ctx.world.estate.dues.war_levy else {
        if payment.war_levy.is_some() {
            reject(ctx, DecisionKind::Obligations, "no war levy was demanded".into());
        }
        return;
    };
    let mut choice = payment.war_levy.unwrap_or(WarLevyChoice::Refuse);
    match choice {
        WarLevyChoice::SendMen if ctx.world.estate.population >= demand.men => {
            ctx.world.estate.population -= demand.men;
            labor::clamp_and_report(&mut ctx.world.estate, &mut ctx.report.labor);
        }
        WarLevyChoice::PayCoin if ctx.world.estate.coin >= demand.coin => {
            ctx.world.estate.coin -= demand.coin;
        }
        WarLevyChoice::Refuse => {}
        _ => {
            let message = format!("cannot answer the levy with {choice}; refused");
            reject(ctx, DecisionKind::Obligations, message);
            choice = WarLevyChoice::Refuse;
        }
    }
    if choice == WarLevyChoice::Refuse {
        ctx.add_unrest(UnrestSource::Levy, LEVY_REFUSAL_UNREST);
    } else {
        ctx.world.estate.dues.war_levy = None;
    }
    ctx.report.obligations.levy_choice = Some(choice);
}
