use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::engine::valuation::round2;
use crate::models::impact::ImpactAccount;
use crate::models::pickup::Pickup;
use crate::store::Database;

const CO2_KG_PER_TREE: f64 = 20.0;

/// Folds one completed pickup into the owner's cumulative totals. The
/// co2/water figures come from the packages' stored fields (frozen at the
/// last listed-time edit), the rest from the pickup's own frozen totals.
pub fn post_pickup_impact(
    db: &mut Database,
    owner_id: Uuid,
    pickup: &Pickup,
    co2_saved: f64,
    water_saved: f64,
    now: DateTime<Utc>,
) -> ImpactAccount {
    let account = db
        .impact_accounts
        .entry(owner_id)
        .or_insert_with(|| ImpactAccount::new(owner_id, now));

    account.total_packages += pickup.total_items;
    account.total_weight = round2(account.total_weight + pickup.total_weight);
    account.co2_saved = round2(account.co2_saved + co2_saved);
    account.water_saved = round2(account.water_saved + water_saved);
    account.landfill_diverted = round2(account.landfill_diverted + pickup.total_weight);
    account.trees_equivalent = round2(account.trees_equivalent + co2_saved / CO2_KG_PER_TREE);
    account.updated_at = now;

    account.clone()
}
