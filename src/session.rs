//! Transient edit session for one service's budget
//!
//! A scratch copy of a [`ServiceBudget`] with its own undo/redo history. The
//! store is not touched until the session is accepted, at which point the
//! whole budget is handed back as one action and the history is discarded.

use std::collections::VecDeque;

use crate::models::{BudgetField, PropagatedField, ServiceBudget, ServiceId, MONTHS};
use crate::services::propagation::{clear_override, set_field};
use crate::state::Action;

/// Undo steps kept when no depth is configured
pub const DEFAULT_UNDO_DEPTH: usize = 50;

/// Parameters of a bulk percentage adjustment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulkAdjust {
    pub field: BudgetField,
    pub from_month: usize,
    pub multiplier: f64,
    pub floor: f64,
    /// Apply the multiplier once per month of distance instead of once
    pub compound: bool,
}

impl BulkAdjust {
    /// Flat adjustment by a percentage, e.g. `10.0` for +10%
    pub fn percent(field: BudgetField, from_month: usize, percent: f64) -> Self {
        Self {
            field,
            from_month,
            multiplier: 1.0 + percent / 100.0,
            floor: 0.0,
            compound: false,
        }
    }

    pub fn compounding(mut self) -> Self {
        self.compound = true;
        self
    }

    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }

    /// New value for a month given its current value
    fn apply(&self, month: usize, value: f64) -> f64 {
        let exponent = if self.compound {
            (month - self.from_month + 1) as i32
        } else {
            1
        };
        (value * self.multiplier.powi(exponent)).max(self.floor).round()
    }
}

#[derive(Debug, Clone)]
pub struct AdjustSession {
    service_id: ServiceId,
    current: ServiceBudget,
    undo_stack: VecDeque<ServiceBudget>,
    redo_stack: Vec<ServiceBudget>,
    /// Snapshot from before the in-flight drag gesture
    pre_change: Option<ServiceBudget>,
    depth: usize,
}

impl AdjustSession {
    pub fn new(service_id: ServiceId, budget: ServiceBudget) -> Self {
        Self::with_depth(service_id, budget, DEFAULT_UNDO_DEPTH)
    }

    /// A session keeping at most `depth` undo steps
    pub fn with_depth(service_id: ServiceId, budget: ServiceBudget, depth: usize) -> Self {
        Self {
            service_id,
            current: budget,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            pre_change: None,
            depth: depth.max(1),
        }
    }

    pub fn service_id(&self) -> ServiceId {
        self.service_id
    }

    pub fn current(&self) -> &ServiceBudget {
        &self.current
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Whether a drag gesture is in flight
    pub fn is_dragging(&self) -> bool {
        self.pre_change.is_some()
    }

    /// Apply one step of a drag gesture
    ///
    /// The first call of a gesture remembers the budget as it was; the whole
    /// gesture becomes one undo step on [`commit`](Self::commit).
    pub fn set_value(&mut self, month: usize, field: BudgetField, value: f64) -> bool {
        if month >= MONTHS {
            return false;
        }
        if self.pre_change.is_none() {
            self.pre_change = Some(self.current);
        }
        set_field(&mut self.current, month, field, value)
    }

    /// Finish the in-flight gesture
    pub fn commit(&mut self) -> bool {
        match self.pre_change.take() {
            Some(before) => {
                self.push_undo(before);
                self.redo_stack.clear();
                true
            }
            None => false,
        }
    }

    /// A single edit that is its own undo step
    pub fn set_field_commit(&mut self, month: usize, field: BudgetField, value: f64) -> bool {
        self.apply_step(|budget| set_field(budget, month, field, value))
    }

    /// Reattach a month to the baseline as one undo step
    pub fn clear_override(&mut self, month: usize, field: BudgetField) -> bool {
        self.apply_step(|budget| clear_override(budget, month, field))
    }

    /// Scale a field from `from_month` through the last month as one undo step
    ///
    /// Month 0 keeps inheriting; every later touched month is overridden. New
    /// values are computed from the budget as it was before the adjustment.
    pub fn bulk_adjust(&mut self, adjust: BulkAdjust) -> bool {
        if adjust.from_month >= MONTHS {
            return false;
        }

        self.apply_step(|budget| {
            let before = budget.series(adjust.field);
            for (month, value) in before.iter().enumerate().skip(adjust.from_month) {
                let adjusted = adjust.apply(month, *value);
                if let Some(entry) = budget.month_mut(month) {
                    *entry.field_mut(adjust.field) = if month == 0 {
                        PropagatedField::inherited(adjusted)
                    } else {
                        PropagatedField::overridden(adjusted)
                    };
                }
            }
            true
        })
    }

    pub fn undo(&mut self) -> bool {
        self.commit();
        match self.undo_stack.pop_back() {
            Some(previous) => {
                self.redo_stack.push(std::mem::replace(&mut self.current, previous));
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.commit();
        match self.redo_stack.pop() {
            Some(next) => {
                let previous = std::mem::replace(&mut self.current, next);
                self.push_undo(previous);
                true
            }
            None => false,
        }
    }

    /// Hand the edited budget back to the store
    pub fn accept(mut self) -> Action {
        self.commit();
        Action::SetServiceBudget {
            service_id: self.service_id,
            budget: self.current,
        }
    }

    fn apply_step<F>(&mut self, edit: F) -> bool
    where
        F: FnOnce(&mut ServiceBudget) -> bool,
    {
        self.commit();
        let mut next = self.current;
        if !edit(&mut next) {
            return false;
        }
        let previous = std::mem::replace(&mut self.current, next);
        self.push_undo(previous);
        self.redo_stack.clear();
        true
    }

    fn push_undo(&mut self, snapshot: ServiceBudget) {
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.depth {
            self.undo_stack.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> AdjustSession {
        let mut budget = ServiceBudget::seeded(100.0, 0.0);
        set_field(&mut budget, 0, BudgetField::Consumption, 100.0);
        AdjustSession::new(ServiceId::new(), budget)
    }

    fn consumption(session: &AdjustSession) -> [f64; MONTHS] {
        session.current().series(BudgetField::Consumption)
    }

    #[test]
    fn test_drag_gesture_is_one_undo_step() {
        let mut s = session();

        s.set_value(4, BudgetField::Consumption, 110.0);
        s.set_value(4, BudgetField::Consumption, 120.0);
        s.set_value(4, BudgetField::Consumption, 130.0);
        assert!(s.is_dragging());
        assert!(s.commit());
        assert_eq!(s.undo_len(), 1);

        assert!(s.undo());
        assert_eq!(consumption(&s)[4], 100.0);
        assert!(!s.current().month(4).unwrap().consumption.is_overridden);
    }

    #[test]
    fn test_commit_without_gesture_is_noop() {
        let mut s = session();
        assert!(!s.commit());
        assert_eq!(s.undo_len(), 0);
    }

    #[test]
    fn test_set_field_commit_and_redo() {
        let mut s = session();

        s.set_field_commit(0, BudgetField::Consumption, 50.0);
        assert!(consumption(&s).iter().all(|v| *v == 50.0));

        assert!(s.undo());
        assert!(consumption(&s).iter().all(|v| *v == 100.0));
        assert!(s.can_redo());

        assert!(s.redo());
        assert!(consumption(&s).iter().all(|v| *v == 50.0));
        assert!(!s.can_redo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut s = session();
        s.set_field_commit(2, BudgetField::Overhead, 5.0);
        s.undo();
        assert_eq!(s.redo_len(), 1);

        s.set_field_commit(3, BudgetField::Overhead, 7.0);
        assert_eq!(s.redo_len(), 0);
    }

    #[test]
    fn test_committed_drag_clears_redo() {
        let mut s = session();
        s.set_field_commit(2, BudgetField::Overhead, 5.0);
        s.undo();
        assert!(s.can_redo());

        s.set_value(4, BudgetField::Consumption, 120.0);
        s.set_value(4, BudgetField::Consumption, 130.0);
        assert!(s.commit());

        assert!(!s.can_redo());
        assert!(!s.redo());
        assert_eq!(consumption(&s)[4], 130.0);
        assert_eq!(s.undo_len(), 1);
    }

    #[test]
    fn test_undo_redo_at_empty_boundaries() {
        let mut s = session();
        let before = *s.current();

        assert!(!s.undo());
        assert!(!s.redo());
        assert_eq!(*s.current(), before);
    }

    #[test]
    fn test_clear_override_is_undoable() {
        let mut s = session();
        s.set_field_commit(5, BudgetField::Consumption, 200.0);
        s.clear_override(5, BudgetField::Consumption);
        assert_eq!(consumption(&s)[5], 100.0);

        s.undo();
        assert_eq!(consumption(&s)[5], 200.0);
        assert!(s.current().month(5).unwrap().consumption.is_overridden);
    }

    #[test]
    fn test_clear_override_on_month_zero_is_noop() {
        let mut s = session();
        assert!(!s.clear_override(0, BudgetField::Consumption));
        assert_eq!(s.undo_len(), 0);
    }

    #[test]
    fn test_bulk_adjust_flat() {
        let mut s = session();
        assert!(s.bulk_adjust(BulkAdjust::percent(BudgetField::Consumption, 6, 10.0)));

        let values = consumption(&s);
        assert!(values[..6].iter().all(|v| *v == 100.0));
        assert!(values[6..].iter().all(|v| *v == 110.0));
        assert!(s.current().month(6).unwrap().consumption.is_overridden);
        assert!(!s.current().month(5).unwrap().consumption.is_overridden);
        assert_eq!(s.undo_len(), 1);
    }

    #[test]
    fn test_bulk_adjust_compound() {
        let mut s = session();
        s.bulk_adjust(BulkAdjust::percent(BudgetField::Consumption, 9, 10.0).compounding());

        let values = consumption(&s);
        assert_eq!(values[9], 110.0);
        assert_eq!(values[10], 121.0);
        assert_eq!(values[11], 133.0);
    }

    #[test]
    fn test_bulk_adjust_from_month_zero() {
        let mut s = session();
        s.bulk_adjust(BulkAdjust::percent(BudgetField::Consumption, 0, 50.0));

        let values = consumption(&s);
        assert!(values.iter().all(|v| *v == 150.0));
        assert!(!s.current().month(0).unwrap().consumption.is_overridden);
        assert!(s.current().month(1).unwrap().consumption.is_overridden);
    }

    #[test]
    fn test_bulk_adjust_respects_floor() {
        let mut s = session();
        s.bulk_adjust(BulkAdjust::percent(BudgetField::Consumption, 1, -95.0).with_floor(20.0));

        assert!(consumption(&s)[1..].iter().all(|v| *v == 20.0));
    }

    #[test]
    fn test_bulk_adjust_out_of_range() {
        let mut s = session();
        assert!(!s.bulk_adjust(BulkAdjust::percent(BudgetField::Consumption, 12, 10.0)));
        assert_eq!(s.undo_len(), 0);
    }

    #[test]
    fn test_undo_depth_is_bounded() {
        let mut budget = ServiceBudget::seeded(100.0, 0.0);
        set_field(&mut budget, 0, BudgetField::Consumption, 1.0);
        let mut s = AdjustSession::with_depth(ServiceId::new(), budget, 3);

        for i in 0..5 {
            s.set_field_commit(1, BudgetField::Consumption, 10.0 + i as f64);
        }
        assert_eq!(s.undo_len(), 3);

        while s.undo() {}
        // The two oldest steps fell off the stack
        assert_eq!(consumption(&s)[1], 11.0);
    }

    #[test]
    fn test_accept_commits_pending_gesture() {
        let mut s = session();
        let id = s.service_id();
        s.set_value(3, BudgetField::Discount, 15.0);

        match s.accept() {
            Action::SetServiceBudget { service_id, budget } => {
                assert_eq!(service_id, id);
                assert_eq!(budget.month(3).unwrap().discount.value, 15.0);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }
}
