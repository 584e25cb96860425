use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RewardTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl RewardTier {
    /// Tier is a pure function of lifetime points; the stored field on
    /// `RewardAccount` is only a cached projection of this.
    pub fn for_lifetime_points(points: i64) -> Self {
        match points {
            p if p >= 50_000 => RewardTier::Diamond,
            p if p >= 15_000 => RewardTier::Platinum,
            p if p >= 5_000 => RewardTier::Gold,
            p if p >= 1_000 => RewardTier::Silver,
            _ => RewardTier::Bronze,
        }
    }

    pub fn bonus_multiplier(&self) -> f64 {
        match self {
            RewardTier::Bronze => 1.0,
            RewardTier::Silver => 1.25,
            RewardTier::Gold => 1.5,
            RewardTier::Platinum => 2.0,
            RewardTier::Diamond => 2.5,
        }
    }

    /// Lifetime points needed to enter the next tier, `None` at the top.
    pub fn next_threshold(&self) -> Option<i64> {
        match self {
            RewardTier::Bronze => Some(1_000),
            RewardTier::Silver => Some(5_000),
            RewardTier::Gold => Some(15_000),
            RewardTier::Platinum => Some(50_000),
            RewardTier::Diamond => None,
        }
    }
}

/// Per-owner point balances. Invariant: `available_points <= total_points`;
/// balances move only through the ledger-producing operations (pickup
/// completion, redemption).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardAccount {
    pub owner_id: Uuid,
    pub total_points: i64,
    pub available_points: i64,
    pub lifetime_points: i64,
    pub tier: RewardTier,
    pub updated_at: DateTime<Utc>,
}

impl RewardAccount {
    pub fn new(owner_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            owner_id,
            total_points: 0,
            available_points: 0,
            lifetime_points: 0,
            tier: RewardTier::Bronze,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerKind {
    PickupReward,
    Redemption,
    Buyback,
}

/// Append-only audit record of a point/value movement. Never updated or
/// deleted; the system of record for reconciling `RewardAccount` balances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: LedgerKind,
    pub points: i64,
    pub amount: f64,
    pub description: String,
    pub pickup_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
