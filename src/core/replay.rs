//! Quantity replay - the fold that turns a movement history into a quantity.
//!
//! Nothing in this module touches the database. The ledger loads an item's surviving
//! movements in chronological order, resolves each movement's effect, and hands them here.
//! Keeping the fold pure lets the same rule serve recording, deletion, and auditing.

use crate::{
    entities::{Effect, InventoryMovementModel},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

impl Effect {
    /// Applies this effect to a running quantity.
    ///
    /// `Increase` and `Decrease` treat `quantity` as a magnitude; `Absolute` treats it as the
    /// target value and ignores `previous` entirely, which makes it a reset point in replay.
    #[must_use]
    pub const fn apply(self, previous: i64, quantity: i64) -> i64 {
        match self {
            Self::Increase => previous.saturating_add(quantity),
            Self::Decrease => previous.saturating_sub(quantity),
            Self::Absolute => quantity,
        }
    }
}

/// One step of a replay: an effect and the movement quantity it applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStep {
    /// Arithmetic rule
    pub effect: Effect,
    /// Movement quantity
    pub quantity: i64,
}

/// Chronological ordering key: `movement_date`, then per-item `sequence`, then `id`.
///
/// Replay runs in ascending key order; listings show the reverse.
#[must_use]
pub fn chronological_key(movement: &InventoryMovementModel) -> (DateTime<Utc>, i64, i64) {
    (movement.movement_date, movement.sequence, movement.id)
}

/// Sorts movements into replay order.
pub fn sort_chronologically(movements: &mut [InventoryMovementModel]) {
    movements.sort_by_key(chronological_key);
}

/// Chooses the quantity replay starts from.
///
/// With surviving history the anchor is the cached `previous_qty` of the chronologically
/// first survivor. Without any, the item's current quantity is kept as is.
#[must_use]
pub fn baseline(first_remaining: Option<&InventoryMovementModel>, current_quantity: i64) -> i64 {
    first_remaining.map_or(current_quantity, |movement| movement.previous_qty)
}

/// Folds `steps` over `baseline` in the order given.
pub fn replay<I>(baseline: i64, steps: I) -> i64
where
    I: IntoIterator<Item = ReplayStep>,
{
    steps
        .into_iter()
        .fold(baseline, |running, step| step.effect.apply(running, step.quantity))
}

/// Replays stored movements, resolving each movement's effect through `effects`.
///
/// `movements` must already be in chronological order.
///
/// # Errors
/// Returns `Error::DanglingMovementType` if a movement references a type missing from `effects`.
pub fn replay_movements(
    baseline: i64,
    movements: &[InventoryMovementModel],
    effects: &HashMap<i64, Effect>,
) -> Result<i64> {
    let steps = movements
        .iter()
        .map(|movement| {
            effects
                .get(&movement.movement_type_id)
                .map(|&effect| ReplayStep {
                    effect,
                    quantity: movement.quantity,
                })
                .ok_or(Error::DanglingMovementType {
                    movement_id: movement.id,
                    movement_type_id: movement.movement_type_id,
                })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(replay(baseline, steps))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn movement(
        id: i64,
        sequence: i64,
        type_id: i64,
        quantity: i64,
        previous: i64,
    ) -> InventoryMovementModel {
        let date = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        InventoryMovementModel {
            id,
            item_id: 1,
            movement_type_id: type_id,
            quantity,
            previous_qty: previous,
            new_qty: 0,
            sequence,
            movement_date: date,
            created_at: date,
            user_id: 1,
            from_dept_id: None,
            to_dept_id: None,
            from_floor_id: None,
            to_floor_id: None,
            reference_no: None,
            notes: None,
        }
    }

    fn effects() -> HashMap<i64, Effect> {
        HashMap::from([
            (1, Effect::Increase),
            (2, Effect::Decrease),
            (3, Effect::Absolute),
        ])
    }

    #[test]
    fn test_effect_apply() {
        assert_eq!(Effect::Increase.apply(10, 5), 15);
        assert_eq!(Effect::Decrease.apply(10, 5), 5);
        assert_eq!(Effect::Decrease.apply(3, 5), -2);
        assert_eq!(Effect::Absolute.apply(10, 42), 42);
        assert_eq!(Effect::Absolute.apply(-7, 42), 42);
    }

    #[test]
    fn test_baseline_prefers_first_survivor() {
        let first = movement(7, 2, 2, 12, 30);
        assert_eq!(baseline(Some(&first), 18), 30);
        assert_eq!(baseline(None, 18), 18);
    }

    #[test]
    fn test_replay_after_removing_middle_movement() {
        // +5, +3, -2 from 0; the +3 has been removed.
        let survivors = [movement(1, 1, 1, 5, 0), movement(3, 3, 2, 2, 8)];
        let start = baseline(survivors.first(), 6);
        assert_eq!(replay_movements(start, &survivors, &effects()).unwrap(), 3);
    }

    #[test]
    fn test_absolute_is_a_reset_point() {
        let history = [
            movement(1, 1, 1, 100, 0),
            movement(2, 2, 3, 42, 100),
            movement(3, 3, 2, 2, 42),
        ];
        assert_eq!(replay_movements(0, &history, &effects()).unwrap(), 40);
        assert_eq!(replay_movements(-500, &history, &effects()).unwrap(), 40);
    }

    #[test]
    fn test_missing_type_is_dangling() {
        let history = [movement(1, 1, 99, 5, 0)];
        let result = replay_movements(0, &history, &effects());
        assert!(matches!(
            result.unwrap_err(),
            Error::DanglingMovementType {
                movement_id: 1,
                movement_type_id: 99
            }
        ));
    }

    #[test]
    fn test_sort_uses_sequence_then_id_on_equal_dates() {
        let mut history = vec![
            movement(5, 3, 1, 1, 0),
            movement(9, 1, 1, 1, 0),
            movement(4, 2, 1, 1, 0),
            movement(2, 2, 1, 1, 0),
        ];
        sort_chronologically(&mut history);
        let ids: Vec<i64> = history.iter().map(|m| m.id).collect();
        assert_eq!(ids, [9, 2, 4, 5]);
    }

    fn arb_step() -> impl Strategy<Value = ReplayStep> {
        (
            prop_oneof![
                Just(Effect::Increase),
                Just(Effect::Decrease),
                Just(Effect::Absolute)
            ],
            1_i64..1_000,
        )
            .prop_map(|(effect, quantity)| ReplayStep { effect, quantity })
    }

    proptest! {
        #[test]
        fn prop_history_before_last_absolute_is_irrelevant(
            initial_a in -10_000_i64..10_000,
            initial_b in -10_000_i64..10_000,
            prefix in prop::collection::vec(arb_step(), 0..20),
            target in 1_i64..1_000,
            suffix in prop::collection::vec(arb_step(), 0..20),
        ) {
            let reset = ReplayStep { effect: Effect::Absolute, quantity: target };
            let with_prefix: Vec<ReplayStep> = prefix
                .iter()
                .copied()
                .chain(std::iter::once(reset))
                .chain(suffix.iter().copied())
                .collect();
            let without_prefix: Vec<ReplayStep> =
                std::iter::once(reset).chain(suffix.iter().copied()).collect();
            prop_assert_eq!(
                replay(initial_a, with_prefix),
                replay(initial_b, without_prefix)
            );
        }
    }
}
