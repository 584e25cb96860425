use std::collections::HashMap;

use uuid::Uuid;

use crate::error::AppError;
use crate::models::impact::ImpactAccount;
use crate::models::notification::Notification;
use crate::models::package::Package;
use crate::models::pickup::Pickup;
use crate::models::rewards::{LedgerEntry, RewardAccount};

/// Every table that participates in an atomic lifecycle commit. The whole
/// value sits behind one `RwLock` in `AppState`; holding the write guard
/// for the duration of an operation is the commit primitive: all writes of
/// one unit become visible together, and racing units serialise.
#[derive(Debug, Default)]
pub struct Database {
    pub packages: HashMap<Uuid, Package>,
    pub pickups: HashMap<Uuid, Pickup>,
    pub tracking_codes: HashMap<String, Uuid>,
    pub reward_accounts: HashMap<Uuid, RewardAccount>,
    pub impact_accounts: HashMap<Uuid, ImpactAccount>,
    pub ledger: Vec<LedgerEntry>,
    pub notifications: Vec<Notification>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn package(&self, id: Uuid) -> Result<&Package, AppError> {
        self.packages
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("package {id} not found")))
    }

    pub fn package_mut(&mut self, id: Uuid) -> Result<&mut Package, AppError> {
        self.packages
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("package {id} not found")))
    }

    pub fn pickup(&self, id: Uuid) -> Result<&Pickup, AppError> {
        self.pickups
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("pickup {id} not found")))
    }

    pub fn pickup_mut(&mut self, id: Uuid) -> Result<&mut Pickup, AppError> {
        self.pickups
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("pickup {id} not found")))
    }
}
