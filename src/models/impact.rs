use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-owner cumulative environmental totals. Monotonically non-decreasing;
/// mutated only by completed pickups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactAccount {
    pub owner_id: Uuid,
    pub total_packages: u32,
    pub total_weight: f64,
    pub co2_saved: f64,
    pub water_saved: f64,
    pub trees_equivalent: f64,
    pub landfill_diverted: f64,
    pub updated_at: DateTime<Utc>,
}

impl ImpactAccount {
    pub fn new(owner_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            owner_id,
            total_packages: 0,
            total_weight: 0.0,
            co2_saved: 0.0,
            water_saved: 0.0,
            trees_equivalent: 0.0,
            landfill_diverted: 0.0,
            updated_at: now,
        }
    }
}
