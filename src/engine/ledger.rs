use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::engine::valuation::round2;
use crate::error::AppError;
use crate::models::rewards::{LedgerEntry, LedgerKind, RewardAccount, RewardTier};
use crate::store::Database;

const CURRENCY_PER_REDEEMED_POINT: f64 = 0.1;

/// Credits a completed pickup's frozen reward points and appends the
/// matching ledger entry. Caller holds the write guard; the posting is
/// part of the completion unit.
pub fn post_pickup_reward(
    db: &mut Database,
    owner_id: Uuid,
    pickup_id: Uuid,
    points: i64,
    amount: f64,
    now: DateTime<Utc>,
) -> RewardAccount {
    let account = account_mut(db, owner_id, now);
    account.total_points += points;
    account.available_points += points;
    account.lifetime_points += points;
    account.tier = RewardTier::for_lifetime_points(account.lifetime_points);
    account.updated_at = now;
    let snapshot = account.clone();

    db.ledger.push(LedgerEntry {
        id: Uuid::new_v4(),
        user_id: owner_id,
        kind: LedgerKind::PickupReward,
        points,
        amount,
        description: format!("pickup reward: {points} points"),
        pickup_id: Some(pickup_id),
        created_at: now,
    });

    snapshot
}

/// Redemption: check available balance, decrement, append the entry, all
/// under the caller's write guard. Lifetime points (and so the tier) never
/// decrease.
pub fn redeem(
    db: &mut Database,
    owner_id: Uuid,
    points: i64,
    description: String,
    now: DateTime<Utc>,
) -> Result<RewardAccount, AppError> {
    if points <= 0 {
        return Err(AppError::InvalidRequest(
            "redemption must be for a positive number of points".to_string(),
        ));
    }

    let account = account_mut(db, owner_id, now);
    if account.available_points < points {
        return Err(AppError::Conflict(format!(
            "insufficient available points: requested {points}, available {}",
            account.available_points
        )));
    }

    account.available_points -= points;
    account.total_points -= points;
    account.updated_at = now;
    let snapshot = account.clone();

    db.ledger.push(LedgerEntry {
        id: Uuid::new_v4(),
        user_id: owner_id,
        kind: LedgerKind::Redemption,
        points: -points,
        amount: -round2(points as f64 * CURRENCY_PER_REDEEMED_POINT),
        description,
        pickup_id: None,
        created_at: now,
    });

    Ok(snapshot)
}

pub fn account_mut(db: &mut Database, owner_id: Uuid, now: DateTime<Utc>) -> &mut RewardAccount {
    db.reward_accounts
        .entry(owner_id)
        .or_insert_with(|| RewardAccount::new(owner_id, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rewards::RewardTier;

    fn db() -> Database {
        Database::new()
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(RewardTier::for_lifetime_points(0), RewardTier::Bronze);
        assert_eq!(RewardTier::for_lifetime_points(999), RewardTier::Bronze);
        assert_eq!(RewardTier::for_lifetime_points(1_000), RewardTier::Silver);
        assert_eq!(RewardTier::for_lifetime_points(4_999), RewardTier::Silver);
        assert_eq!(RewardTier::for_lifetime_points(5_000), RewardTier::Gold);
        assert_eq!(RewardTier::for_lifetime_points(14_999), RewardTier::Gold);
        assert_eq!(RewardTier::for_lifetime_points(15_000), RewardTier::Platinum);
        assert_eq!(RewardTier::for_lifetime_points(50_000), RewardTier::Diamond);
    }

    #[test]
    fn tier_is_monotone_in_lifetime_points() {
        let checkpoints = [0, 1, 999, 1_000, 4_999, 5_000, 14_999, 15_000, 49_999, 50_000, 1_000_000];
        let tiers: Vec<RewardTier> = checkpoints
            .iter()
            .map(|p| RewardTier::for_lifetime_points(*p))
            .collect();

        assert!(tiers.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn reward_posting_moves_all_three_balances_and_recomputes_tier() {
        let mut db = db();
        let owner = Uuid::new_v4();
        let now = Utc::now();

        let account = post_pickup_reward(&mut db, owner, Uuid::new_v4(), 1_200, 120.0, now);

        assert_eq!(account.total_points, 1_200);
        assert_eq!(account.available_points, 1_200);
        assert_eq!(account.lifetime_points, 1_200);
        assert_eq!(account.tier, RewardTier::Silver);
        assert_eq!(db.ledger.len(), 1);
        assert_eq!(db.ledger[0].points, 1_200);
    }

    #[test]
    fn redemption_rejects_overdraw_without_touching_state() {
        let mut db = db();
        let owner = Uuid::new_v4();
        let now = Utc::now();
        post_pickup_reward(&mut db, owner, Uuid::new_v4(), 100, 10.0, now);

        let err = redeem(&mut db, owner, 500, "gift card".to_string(), now).unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        let account = db.reward_accounts.get(&owner).unwrap();
        assert_eq!(account.available_points, 100);
        assert_eq!(db.ledger.len(), 1);
    }

    #[test]
    fn redemption_leaves_lifetime_points_and_tier_alone() {
        let mut db = db();
        let owner = Uuid::new_v4();
        let now = Utc::now();
        post_pickup_reward(&mut db, owner, Uuid::new_v4(), 6_000, 600.0, now);

        let account = redeem(&mut db, owner, 6_000, "payout".to_string(), now).unwrap();

        assert_eq!(account.available_points, 0);
        assert_eq!(account.total_points, 0);
        assert_eq!(account.lifetime_points, 6_000);
        assert_eq!(account.tier, RewardTier::Gold);
        assert_eq!(db.ledger.last().unwrap().points, -6_000);
    }
}
