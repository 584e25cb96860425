use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::engine::valuation;
use crate::error::AppError;
use crate::models::package::{Package, PackageCondition, PackageKind, PackageStatus};
use crate::store::Database;

/// Owner-editable fields; any present field triggers a full revaluation.
#[derive(Debug, Default, Clone)]
pub struct PackageChanges {
    pub kind: Option<PackageKind>,
    pub condition: Option<PackageCondition>,
    pub quantity: Option<u32>,
    pub weight_kg: Option<f64>,
}

pub fn create_package(
    db: &mut Database,
    owner_id: Uuid,
    kind: PackageKind,
    condition: PackageCondition,
    quantity: u32,
    weight_kg: Option<f64>,
    now: DateTime<Utc>,
) -> Result<Package, AppError> {
    if quantity < 1 {
        return Err(AppError::InvalidRequest("quantity must be >= 1".to_string()));
    }
    if let Some(w) = weight_kg {
        if w < 0.0 {
            return Err(AppError::InvalidRequest("weight must be >= 0".to_string()));
        }
    }

    let valuation = valuation::value_package(kind, condition, quantity, weight_kg);
    let package = Package {
        id: Uuid::new_v4(),
        owner_id,
        kind,
        condition,
        quantity,
        weight_kg,
        estimated_value: valuation.estimated_value,
        co2_saved: valuation.co2_saved,
        water_saved: valuation.water_saved,
        status: PackageStatus::Listed,
        created_at: now,
        updated_at: now,
    };

    db.packages.insert(package.id, package.clone());
    Ok(package)
}

/// Owner edit, legal only while the package is still listed. The three
/// derived fields are recomputed together, never independently.
pub fn update_package(
    db: &mut Database,
    package_id: Uuid,
    owner_id: Uuid,
    changes: PackageChanges,
    now: DateTime<Utc>,
) -> Result<Package, AppError> {
    let package = db.package_mut(package_id)?;

    if package.owner_id != owner_id {
        return Err(AppError::Forbidden("package belongs to another owner".to_string()));
    }
    if package.status != PackageStatus::Listed {
        return Err(AppError::Conflict(format!(
            "package {package_id} is no longer listed"
        )));
    }

    if let Some(quantity) = changes.quantity {
        if quantity < 1 {
            return Err(AppError::InvalidRequest("quantity must be >= 1".to_string()));
        }
        package.quantity = quantity;
    }
    if let Some(kind) = changes.kind {
        package.kind = kind;
    }
    if let Some(condition) = changes.condition {
        package.condition = condition;
    }
    if let Some(weight) = changes.weight_kg {
        if weight < 0.0 {
            return Err(AppError::InvalidRequest("weight must be >= 0".to_string()));
        }
        package.weight_kg = Some(weight);
    }

    let valuation = valuation::value_package(
        package.kind,
        package.condition,
        package.quantity,
        package.weight_kg,
    );
    package.estimated_value = valuation.estimated_value;
    package.co2_saved = valuation.co2_saved;
    package.water_saved = valuation.water_saved;
    package.updated_at = now;

    Ok(package.clone())
}

pub fn delete_package(db: &mut Database, package_id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
    let package = db.package(package_id)?;

    if package.owner_id != owner_id {
        return Err(AppError::Forbidden("package belongs to another owner".to_string()));
    }
    if package.status != PackageStatus::Listed {
        return Err(AppError::Conflict(format!(
            "package {package_id} is no longer listed"
        )));
    }

    db.packages.remove(&package_id);
    Ok(())
}

/// Attaches packages to a pickup: every referenced package must exist,
/// belong to the owner and be listed. Validates the whole set before
/// mutating any row, so a bad reference leaves no partial transition.
pub fn claim_for_pickup(
    db: &mut Database,
    owner_id: Uuid,
    package_ids: &[Uuid],
    now: DateTime<Utc>,
) -> Result<Vec<Package>, AppError> {
    if package_ids.is_empty() {
        return Err(AppError::InvalidRequest(
            "a pickup needs at least one package".to_string(),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for id in package_ids {
        if !seen.insert(*id) {
            return Err(AppError::InvalidRequest(format!(
                "package {id} is referenced twice"
            )));
        }
    }

    for id in package_ids {
        let package = db.packages.get(id).ok_or_else(|| {
            AppError::InvalidRequest(format!("package {id} does not exist"))
        })?;
        if package.owner_id != owner_id {
            return Err(AppError::InvalidRequest(format!(
                "package {id} belongs to another owner"
            )));
        }
        if package.status != PackageStatus::Listed {
            return Err(AppError::InvalidRequest(format!(
                "package {id} is not listed"
            )));
        }
    }

    let mut claimed = Vec::with_capacity(package_ids.len());
    for id in package_ids {
        let package = db.package_mut(*id)?;
        package.status = PackageStatus::Scheduled;
        package.updated_at = now;
        claimed.push(package.clone());
    }

    Ok(claimed)
}

/// Reverts scheduled packages to listed; the only backward transition in
/// the package machine, driven solely by pickup cancellation.
pub fn release_to_listed(db: &mut Database, package_ids: &[Uuid], now: DateTime<Utc>) {
    for id in package_ids {
        if let Some(package) = db.packages.get_mut(id) {
            if package.status == PackageStatus::Scheduled {
                package.status = PackageStatus::Listed;
                package.updated_at = now;
            }
        }
    }
}

pub fn mark_picked_up(db: &mut Database, package_ids: &[Uuid], now: DateTime<Utc>) {
    for id in package_ids {
        if let Some(package) = db.packages.get_mut(id) {
            package.status = PackageStatus::PickedUp;
            package.updated_at = now;
        }
    }
}
