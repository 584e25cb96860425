use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageKind {
    Box,
    Bottle,
    Container,
    Bag,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageCondition {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PackageStatus {
    Listed,
    Scheduled,
    PickedUp,
    Processing,
    Recycled,
    Reused,
}

/// A listed unit of packaging material. The three derived fields
/// (`estimated_value`, `co2_saved`, `water_saved`) are always recomputed
/// together whenever kind, condition, quantity or weight change, and only
/// while the package is still `Listed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: PackageKind,
    pub condition: PackageCondition,
    pub quantity: u32,
    pub weight_kg: Option<f64>,
    pub estimated_value: f64,
    pub co2_saved: f64,
    pub water_saved: f64,
    pub status: PackageStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
