use crate::models::package::{Package, PackageCondition, PackageKind};

const CO2_KG_PER_KG: f64 = 2.5;
const WATER_L_PER_KG: f64 = 15.0;
const FALLBACK_WEIGHT_PER_ITEM_KG: f64 = 0.5;
const POINTS_PER_CURRENCY_UNIT: f64 = 10.0;
const POINTS_PER_PACKAGE: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Valuation {
    pub estimated_value: f64,
    pub co2_saved: f64,
    pub water_saved: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickupTotals {
    pub total_items: u32,
    pub total_weight: f64,
    pub total_value: f64,
}

/// Maps a package's declared attributes to its estimated monetary value and
/// environmental-impact estimate. Pure and deterministic; the three outputs
/// are always computed together.
pub fn value_package(
    kind: PackageKind,
    condition: PackageCondition,
    quantity: u32,
    weight_kg: Option<f64>,
) -> Valuation {
    let effective_weight = effective_weight(quantity, weight_kg);

    Valuation {
        estimated_value: round2(
            base_value(kind) * condition_multiplier(condition) * effective_weight * quantity as f64,
        ),
        co2_saved: round2(CO2_KG_PER_KG * effective_weight),
        water_saved: round2(WATER_L_PER_KG * effective_weight),
    }
}

pub fn aggregate(packages: &[&Package]) -> PickupTotals {
    PickupTotals {
        total_items: packages.iter().map(|p| p.quantity).sum(),
        total_weight: packages.iter().filter_map(|p| p.weight_kg).sum(),
        total_value: packages.iter().map(|p| p.estimated_value).sum(),
    }
}

pub fn reward_points(package_count: usize, total_value: f64) -> i64 {
    (total_value * POINTS_PER_CURRENCY_UNIT).floor() as i64
        + package_count as i64 * POINTS_PER_PACKAGE
}

fn effective_weight(quantity: u32, weight_kg: Option<f64>) -> f64 {
    match weight_kg {
        Some(w) if w > 0.0 => w,
        _ => quantity as f64 * FALLBACK_WEIGHT_PER_ITEM_KG,
    }
}

fn base_value(kind: PackageKind) -> f64 {
    match kind {
        PackageKind::Box => 0.5,
        PackageKind::Bottle => 0.8,
        PackageKind::Container => 0.6,
        PackageKind::Bag => 0.3,
        PackageKind::Other => 0.4,
    }
}

fn condition_multiplier(condition: PackageCondition) -> f64 {
    match condition {
        PackageCondition::Excellent => 1.0,
        PackageCondition::Good => 0.8,
        PackageCondition::Fair => 0.5,
        PackageCondition::Poor => 0.2,
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excellent_box_with_declared_weight() {
        let v = value_package(PackageKind::Box, PackageCondition::Excellent, 10, Some(5.0));

        assert_eq!(v.estimated_value, 25.0);
        assert_eq!(v.co2_saved, 12.5);
        assert_eq!(v.water_saved, 75.0);
    }

    #[test]
    fn missing_weight_falls_back_to_half_kilo_per_item() {
        let v = value_package(PackageKind::Bottle, PackageCondition::Good, 4, None);

        // effective weight 2.0 kg
        assert_eq!(v.co2_saved, 5.0);
        assert_eq!(v.water_saved, 30.0);
        assert_eq!(v.estimated_value, round2(0.8 * 0.8 * 2.0 * 4.0));
    }

    #[test]
    fn zero_weight_treated_as_undeclared() {
        let declared = value_package(PackageKind::Bag, PackageCondition::Fair, 2, Some(0.0));
        let undeclared = value_package(PackageKind::Bag, PackageCondition::Fair, 2, None);

        assert_eq!(declared, undeclared);
    }

    #[test]
    fn poor_condition_discounts_value() {
        let excellent =
            value_package(PackageKind::Container, PackageCondition::Excellent, 1, Some(1.0));
        let poor = value_package(PackageKind::Container, PackageCondition::Poor, 1, Some(1.0));

        assert!(poor.estimated_value < excellent.estimated_value);
        // impact depends only on weight, not condition
        assert_eq!(poor.co2_saved, excellent.co2_saved);
    }

    #[test]
    fn reward_points_floor_plus_per_package_bonus() {
        assert_eq!(reward_points(3, 25.0), 265);
        assert_eq!(reward_points(1, 6.25), 67);
        assert_eq!(reward_points(0, 0.0), 0);
    }
}
