use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupStatus {
    Pending,
    Confirmed,
    InTransit,
    Completed,
    Cancelled,
}

impl PickupStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PickupStatus::Completed | PickupStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupSlot {
    Morning,
    Afternoon,
    Evening,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
}

/// Snapshot of one package at scheduling time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupItem {
    pub package_id: Uuid,
    pub quantity: u32,
}

/// A scheduled collection event. The totals and `reward_points` are
/// computed once at creation from the attached packages and frozen; later
/// package edits never reach back into an existing pickup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub recycler_id: Option<Uuid>,
    pub tracking_code: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_slot: PickupSlot,
    pub address: Address,
    pub items: Vec<PickupItem>,
    pub total_items: u32,
    pub total_weight: f64,
    pub total_value: f64,
    pub reward_points: i64,
    pub status: PickupStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
