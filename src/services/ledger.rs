//! Equipment ledger: availability accounting and return-condition handling
//!
//! Both operations are pure: they produce the updated unit and the loan
//! service commits it in the same atomic transaction as the loan write.
//! No other code path may mutate `available_quantity`.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{EquipmentStatus, EquipmentUnit, ReturnCondition},
};

pub struct EquipmentLedger;

impl EquipmentLedger {
    /// Adjust `available_quantity` by `delta` (±1). Fails with `Conflict`
    /// when the result would leave `[0, total_quantity]` instead of
    /// clamping: going out of bounds means a lost race or corrupt data,
    /// and the caller must see it.
    pub fn adjust_availability(unit: &EquipmentUnit, delta: i32) -> AppResult<EquipmentUnit> {
        let next = i64::from(unit.available_quantity) + i64::from(delta);
        if next < 0 || next > i64::from(unit.total_quantity) {
            return Err(AppError::Conflict(format!(
                "Equipment {}: availability {} {} is outside [0, {}]",
                unit.id,
                unit.available_quantity,
                if delta < 0 { format!("- {}", -delta) } else { format!("+ {}", delta) },
                unit.total_quantity
            )));
        }
        let mut updated = unit.clone();
        updated.available_quantity = next as u32;
        updated.updated_at = Utc::now();
        Ok(updated)
    }

    /// Record the condition reported on return and route the unit:
    /// `damaged` forces status `damaged` regardless of the maintenance
    /// flag; otherwise the flag sends it to `maintenance`, else back to
    /// `available`.
    pub fn apply_return_condition(
        unit: &EquipmentUnit,
        condition: ReturnCondition,
        requires_maintenance: bool,
    ) -> EquipmentUnit {
        let mut updated = unit.clone();
        updated.condition = condition.equipment_condition();
        updated.status = if condition.is_damaged() {
            EquipmentStatus::Damaged
        } else if requires_maintenance {
            EquipmentStatus::Maintenance
        } else {
            EquipmentStatus::Available
        };
        updated.updated_at = Utc::now();
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EquipmentCondition, EquipmentStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn unit(total: u32, available: u32) -> EquipmentUnit {
        let now = Utc::now();
        EquipmentUnit {
            id: Uuid::new_v4(),
            name: "Proyector Epson".into(),
            description: None,
            code: None,
            category: "proyectores".into(),
            brand: None,
            model: None,
            serial_number: None,
            location: None,
            status: EquipmentStatus::Available,
            condition: EquipmentCondition::Good,
            total_quantity: total,
            available_quantity: available,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn adjust_stays_within_bounds() {
        let u = unit(2, 1);
        assert_eq!(
            EquipmentLedger::adjust_availability(&u, -1).unwrap().available_quantity,
            0
        );
        assert_eq!(
            EquipmentLedger::adjust_availability(&u, 1).unwrap().available_quantity,
            2
        );
    }

    #[test]
    fn adjust_rejects_underflow_and_overflow() {
        let empty = unit(2, 0);
        assert!(EquipmentLedger::adjust_availability(&empty, -1)
            .unwrap_err()
            .is_conflict());

        let full = unit(2, 2);
        assert!(EquipmentLedger::adjust_availability(&full, 1)
            .unwrap_err()
            .is_conflict());
    }

    #[test]
    fn damaged_overrides_maintenance_flag() {
        let u = unit(1, 1);
        let updated =
            EquipmentLedger::apply_return_condition(&u, ReturnCondition::Damaged, true);
        assert_eq!(updated.status, EquipmentStatus::Damaged);
        assert_eq!(updated.condition, EquipmentCondition::Poor);
    }

    #[test]
    fn maintenance_flag_routes_to_maintenance() {
        let u = unit(1, 1);
        let updated = EquipmentLedger::apply_return_condition(&u, ReturnCondition::Fair, true);
        assert_eq!(updated.status, EquipmentStatus::Maintenance);

        let back = EquipmentLedger::apply_return_condition(&u, ReturnCondition::Good, false);
        assert_eq!(back.status, EquipmentStatus::Available);
        assert_eq!(back.condition, EquipmentCondition::Good);
    }
}
