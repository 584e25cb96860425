use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::engine::{impact, ledger, registry, valuation};
use crate::error::AppError;
use crate::models::notification::{Notification, NotificationCategory};
use crate::models::package::Package;
use crate::models::pickup::{Address, Pickup, PickupItem, PickupSlot, PickupStatus};
use crate::models::rewards::RewardAccount;
use crate::models::user::{Role, User};
use crate::notify;
use crate::state::AppState;
use crate::store::Database;

#[derive(Debug, Clone)]
pub struct PickupDraft {
    pub package_ids: Vec<Uuid>,
    pub scheduled_date: NaiveDate,
    pub scheduled_slot: PickupSlot,
    pub address: Address,
}

/// Public read-only projection for tracking-code lookups.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingView {
    pub tracking_code: String,
    pub status: PickupStatus,
    pub scheduled_date: NaiveDate,
    pub scheduled_slot: PickupSlot,
    pub total_items: u32,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Creates a pickup in `Pending`, claims every referenced package
/// (`Listed` -> `Scheduled`) and freezes the totals, all as one unit.
pub async fn create_pickup(
    state: &AppState,
    owner: &User,
    draft: PickupDraft,
) -> Result<Pickup, AppError> {
    let start = Instant::now();
    let now = Utc::now();

    if owner.role != Role::Owner {
        return Err(AppError::Forbidden("only owners schedule pickups".to_string()));
    }

    // Snapshot the fan-out audience before touching the store; the user
    // registry is outside the transactional lock.
    let verified_recyclers: Vec<Uuid> = state
        .users
        .iter()
        .filter(|entry| entry.value().is_recycler() && entry.value().verified)
        .map(|entry| entry.value().id)
        .collect();

    let staged = {
        let mut db = state.db.write().await;
        stage_create(&mut db, owner, &verified_recyclers, draft, now)
    };

    let pickup = finish(state, "create", start, staged)?;
    info!(
        pickup_id = %pickup.id,
        tracking_code = %pickup.tracking_code,
        reward_points = pickup.reward_points,
        "pickup scheduled"
    );

    Ok(pickup)
}

fn stage_create(
    db: &mut Database,
    owner: &User,
    verified_recyclers: &[Uuid],
    draft: PickupDraft,
    now: DateTime<Utc>,
) -> Result<(Pickup, Vec<Notification>), AppError> {
    let claimed = registry::claim_for_pickup(db, owner.id, &draft.package_ids, now)?;

    let refs: Vec<&Package> = claimed.iter().collect();
    let totals = valuation::aggregate(&refs);
    let reward_points = valuation::reward_points(claimed.len(), totals.total_value);

    let pickup = Pickup {
        id: Uuid::new_v4(),
        owner_id: owner.id,
        recycler_id: None,
        tracking_code: new_tracking_code(db),
        scheduled_date: draft.scheduled_date,
        scheduled_slot: draft.scheduled_slot,
        address: draft.address,
        items: claimed
            .iter()
            .map(|p| PickupItem {
                package_id: p.id,
                quantity: p.quantity,
            })
            .collect(),
        total_items: totals.total_items,
        total_weight: totals.total_weight,
        total_value: totals.total_value,
        reward_points,
        status: PickupStatus::Pending,
        completed_at: None,
        created_at: now,
    };

    db.tracking_codes
        .insert(pickup.tracking_code.clone(), pickup.id);
    db.pickups.insert(pickup.id, pickup.clone());

    let mut notifications = vec![notify::record(
        db,
        owner.id,
        NotificationCategory::Pickup,
        "Pickup scheduled",
        format!(
            "Your pickup {} is scheduled with {} item(s).",
            pickup.tracking_code, pickup.total_items
        ),
        json!({ "pickup_id": pickup.id, "tracking_code": pickup.tracking_code }),
        now,
    )];

    for recycler_id in verified_recyclers {
        notifications.push(notify::record(
            db,
            *recycler_id,
            NotificationCategory::Pickup,
            "New pickup available",
            format!(
                "A pickup with {} item(s) is waiting for a collector.",
                pickup.total_items
            ),
            json!({ "pickup_id": pickup.id }),
            now,
        ));
    }

    Ok((pickup, notifications))
}

/// Claims a pending pickup for a collection agent. Exactly one concurrent
/// caller wins; the others observe the confirmed status and get a conflict.
pub async fn accept_pickup(
    state: &AppState,
    pickup_id: Uuid,
    actor: &User,
) -> Result<Pickup, AppError> {
    let start = Instant::now();
    let now = Utc::now();

    if !actor.is_admin() {
        if !actor.is_recycler() {
            return Err(AppError::Forbidden("only collectors accept pickups".to_string()));
        }
        if !actor.verified {
            return Err(AppError::Forbidden("collector is not verified".to_string()));
        }
    }

    let staged = {
        let mut db = state.db.write().await;
        stage_accept(&mut db, pickup_id, actor.id, now)
    };

    let pickup = finish(state, "accept", start, staged)?;
    info!(pickup_id = %pickup.id, recycler_id = %actor.id, "pickup accepted");

    Ok(pickup)
}

fn stage_accept(
    db: &mut Database,
    pickup_id: Uuid,
    recycler_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(Pickup, Vec<Notification>), AppError> {
    let pickup = db.pickup_mut(pickup_id)?;

    if pickup.status != PickupStatus::Pending {
        return Err(AppError::Conflict(format!(
            "pickup {pickup_id} is already claimed"
        )));
    }

    pickup.status = PickupStatus::Confirmed;
    pickup.recycler_id = Some(recycler_id);
    let snapshot = pickup.clone();

    let notification = notify::record(
        db,
        snapshot.owner_id,
        NotificationCategory::Pickup,
        "Pickup confirmed",
        format!("A collector accepted pickup {}.", snapshot.tracking_code),
        json!({ "pickup_id": snapshot.id, "recycler_id": recycler_id }),
        now,
    );

    Ok((snapshot, vec![notification]))
}

/// Drives a pickup towards a later state. `Completed` runs the atomic
/// reward/impact commit; `Cancelled` reverts the attached packages.
pub async fn advance_pickup(
    state: &AppState,
    pickup_id: Uuid,
    target: PickupStatus,
    actor: &User,
) -> Result<Pickup, AppError> {
    let start = Instant::now();
    let now = Utc::now();

    let operation = match target {
        PickupStatus::InTransit => "in_transit",
        PickupStatus::Completed => "complete",
        PickupStatus::Cancelled => "cancel",
        _ => {
            return Err(AppError::InvalidRequest(format!(
                "cannot advance a pickup to {target:?}"
            )));
        }
    };

    let staged = {
        let mut db = state.db.write().await;
        stage_advance(&mut db, pickup_id, target, actor, now)
    };

    let pickup = finish(state, operation, start, staged)?;

    if pickup.status == PickupStatus::Completed {
        state
            .metrics
            .reward_points_awarded_total
            .inc_by(pickup.reward_points.max(0) as u64);
    }

    info!(pickup_id = %pickup.id, status = ?pickup.status, "pickup advanced");

    Ok(pickup)
}

fn stage_advance(
    db: &mut Database,
    pickup_id: Uuid,
    target: PickupStatus,
    actor: &User,
    now: DateTime<Utc>,
) -> Result<(Pickup, Vec<Notification>), AppError> {
    let (owner_id, recycler_id, status, package_ids) = {
        let pickup = db.pickup(pickup_id)?;
        (
            pickup.owner_id,
            pickup.recycler_id,
            pickup.status,
            pickup.items.iter().map(|i| i.package_id).collect::<Vec<_>>(),
        )
    };

    // Re-checked under the write guard: a concurrent winner has already
    // moved the status, and the loser must see it.
    if status.is_terminal() {
        return Err(AppError::Conflict(format!(
            "pickup {pickup_id} is already finalized"
        )));
    }

    match target {
        PickupStatus::InTransit | PickupStatus::Completed => {
            let is_assigned = recycler_id == Some(actor.id);
            if !actor.is_admin() && !is_assigned {
                return Err(AppError::Forbidden(
                    "only the assigned collector advances this pickup".to_string(),
                ));
            }
        }
        PickupStatus::Cancelled => {
            if !actor.is_admin() && owner_id != actor.id {
                return Err(AppError::Forbidden(
                    "only the owner cancels this pickup".to_string(),
                ));
            }
        }
        _ => unreachable!("validated by advance_pickup"),
    }

    match target {
        PickupStatus::InTransit => {
            if status != PickupStatus::Confirmed {
                return Err(AppError::Conflict(format!(
                    "pickup {pickup_id} is not confirmed"
                )));
            }

            let pickup = db.pickup_mut(pickup_id)?;
            pickup.status = PickupStatus::InTransit;
            let snapshot = pickup.clone();

            let notification = notify::record(
                db,
                owner_id,
                NotificationCategory::Pickup,
                "Pickup in transit",
                format!("Pickup {} is on its way.", snapshot.tracking_code),
                json!({ "pickup_id": snapshot.id }),
                now,
            );

            Ok((snapshot, vec![notification]))
        }
        PickupStatus::Completed => {
            // Completion is only legal once a collector holds the pickup.
            if !matches!(
                status,
                PickupStatus::Confirmed | PickupStatus::InTransit
            ) {
                return Err(AppError::Conflict(format!(
                    "pickup {pickup_id} has not been accepted"
                )));
            }

            stage_complete(db, pickup_id, &package_ids, now)
        }
        PickupStatus::Cancelled => {
            let pickup = db.pickup_mut(pickup_id)?;
            pickup.status = PickupStatus::Cancelled;
            let snapshot = pickup.clone();

            registry::release_to_listed(db, &package_ids, now);

            let mut notifications = vec![notify::record(
                db,
                owner_id,
                NotificationCategory::Pickup,
                "Pickup cancelled",
                format!(
                    "Pickup {} was cancelled; your packages are listed again.",
                    snapshot.tracking_code
                ),
                json!({ "pickup_id": snapshot.id }),
                now,
            )];

            if let Some(recycler) = recycler_id {
                notifications.push(notify::record(
                    db,
                    recycler,
                    NotificationCategory::Pickup,
                    "Pickup cancelled",
                    format!("Pickup {} was cancelled by the owner.", snapshot.tracking_code),
                    json!({ "pickup_id": snapshot.id }),
                    now,
                ));
            }

            Ok((snapshot, notifications))
        }
        _ => unreachable!("validated by advance_pickup"),
    }
}

/// The completion commit: status, package states, reward posting, ledger
/// entry, impact posting and the owner notification either all land
/// together or none do. The terminal check in `stage_advance` already ran
/// under this same guard, so the reward can only ever be credited once.
fn stage_complete(
    db: &mut Database,
    pickup_id: Uuid,
    package_ids: &[Uuid],
    now: DateTime<Utc>,
) -> Result<(Pickup, Vec<Notification>), AppError> {
    let (co2_saved, water_saved) = package_ids.iter().fold((0.0, 0.0), |(co2, water), id| {
        match db.packages.get(id) {
            Some(p) => (co2 + p.co2_saved, water + p.water_saved),
            None => (co2, water),
        }
    });

    let pickup = db.pickup_mut(pickup_id)?;
    pickup.status = PickupStatus::Completed;
    pickup.completed_at = Some(now);
    let snapshot = pickup.clone();

    registry::mark_picked_up(db, package_ids, now);

    let account = ledger::post_pickup_reward(
        db,
        snapshot.owner_id,
        snapshot.id,
        snapshot.reward_points,
        snapshot.total_value,
        now,
    );

    impact::post_pickup_impact(db, snapshot.owner_id, &snapshot, co2_saved, water_saved, now);

    let notification = notify::record(
        db,
        snapshot.owner_id,
        NotificationCategory::Reward,
        "Pickup completed",
        format!(
            "Pickup {} is complete. You earned {} points.",
            snapshot.tracking_code, snapshot.reward_points
        ),
        json!({
            "pickup_id": snapshot.id,
            "points": snapshot.reward_points,
            "tier": account.tier,
        }),
        now,
    );

    Ok((snapshot, vec![notification]))
}

/// Redemption shares the commit discipline: balance check, decrement and
/// ledger append happen under the same guard.
pub async fn redeem_points(
    state: &AppState,
    owner: &User,
    points: i64,
    description: Option<String>,
) -> Result<RewardAccount, AppError> {
    let start = Instant::now();
    let now = Utc::now();

    let staged = {
        let mut db = state.db.write().await;
        let description = description.unwrap_or_else(|| format!("redeemed {points} points"));
        match ledger::redeem(&mut db, owner.id, points, description, now) {
            Ok(account) => {
                let notification = notify::record(
                    &mut db,
                    owner.id,
                    NotificationCategory::Reward,
                    "Points redeemed",
                    format!("You redeemed {points} points."),
                    json!({ "points": points, "available": account.available_points }),
                    now,
                );
                Ok((account, vec![notification]))
            }
            Err(err) => Err(err),
        }
    };

    finish(state, "redeem", start, staged)
}

pub async fn track_pickup(state: &AppState, code: &str) -> Result<TrackingView, AppError> {
    let db = state.db.read().await;

    let pickup_id = db
        .tracking_codes
        .get(code)
        .copied()
        .ok_or_else(|| AppError::NotFound(format!("tracking code {code} not found")))?;
    let pickup = db.pickup(pickup_id)?;

    Ok(TrackingView {
        tracking_code: pickup.tracking_code.clone(),
        status: pickup.status,
        scheduled_date: pickup.scheduled_date,
        scheduled_slot: pickup.scheduled_slot,
        total_items: pickup.total_items,
        completed_at: pickup.completed_at,
    })
}

pub async fn get_pickup(
    state: &AppState,
    pickup_id: Uuid,
    actor: &User,
) -> Result<Pickup, AppError> {
    let db = state.db.read().await;
    let pickup = db.pickup(pickup_id)?;

    let is_party = pickup.owner_id == actor.id || pickup.recycler_id == Some(actor.id);
    if !actor.is_admin() && !is_party {
        return Err(AppError::Forbidden("not a party to this pickup".to_string()));
    }

    Ok(pickup.clone())
}

/// Role-scoped listing: owners see their own pickups, collectors see the
/// open pool plus their assignments, admins see everything.
pub async fn list_pickups(state: &AppState, actor: &User) -> Vec<Pickup> {
    let db = state.db.read().await;

    let mut pickups: Vec<Pickup> = db
        .pickups
        .values()
        .filter(|p| match actor.role {
            Role::Owner => p.owner_id == actor.id,
            Role::Recycler => {
                p.status == PickupStatus::Pending || p.recycler_id == Some(actor.id)
            }
            Role::Admin => true,
        })
        .cloned()
        .collect();

    pickups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    pickups
}

fn new_tracking_code(db: &Database) -> String {
    loop {
        let raw = Uuid::new_v4().simple().to_string();
        let candidate = format!("RPX-{}", raw[..8].to_uppercase());

        if !db.tracking_codes.contains_key(&candidate) {
            return candidate;
        }
    }
}

/// Records outcome metrics for one lifecycle unit and, on success,
/// dispatches the staged notifications now that the guard is gone.
fn finish<T>(
    state: &AppState,
    operation: &str,
    start: Instant,
    staged: Result<(T, Vec<Notification>), AppError>,
) -> Result<T, AppError> {
    let outcome = if staged.is_ok() { "success" } else { "rejected" };

    state
        .metrics
        .commit_latency_seconds
        .with_label_values(&[operation])
        .observe(start.elapsed().as_secs_f64());
    state
        .metrics
        .pickup_transitions_total
        .with_label_values(&[operation, outcome])
        .inc();

    match staged {
        Ok((value, notifications)) => {
            notify::dispatch(state, &notifications);
            Ok(value)
        }
        Err(err) => Err(err),
    }
}
