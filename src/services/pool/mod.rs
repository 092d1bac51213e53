//! Course pool: every known course group plus the selection state machine.
//!
//! Per group: `Unselected -> Selected` when toggled on without collisions,
//! `Selected -> Unselected` when toggled off, and `Unselected -> pending`
//! when toggled on over selected groups. A pending override is resolved by
//! [`CoursePool::confirm_override`] (candidate selected, colliding groups
//! unselected in one step) or [`CoursePool::cancel_override`].
//!
//! Invariant: no two selected groups share a slot.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::{ScheduleError, ScheduleResult};
use crate::models::course::{CourseDraft, CourseGroup, GroupId};
use crate::models::slot::Slot;
use crate::services::conflict::{self, ConflictingGroup};

/// Grid height used when none is configured.
pub const DEFAULT_PERIODS_PER_DAY: u8 = 8;

/// A conflicting toggle awaiting the user's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingOverride {
    pub candidate: GroupId,
    pub conflicting: BTreeSet<GroupId>,
    pub conflicts: Vec<ConflictingGroup>,
    pub message: String,
}

/// Result of [`CoursePool::toggle_selection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    /// Nothing changed; the caller must confirm or cancel.
    Conflict(PendingOverride),
}

/// One selection flag change, as persisted by the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionChange {
    pub id: GroupId,
    pub selected: bool,
}

/// The flag changes an override confirmation applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverridePlan {
    pub select: GroupId,
    pub deselect: Vec<GroupId>,
}

impl OverridePlan {
    pub fn changes(&self) -> Vec<SelectionChange> {
        self.deselect
            .iter()
            .map(|id| SelectionChange {
                id: id.clone(),
                selected: false,
            })
            .chain(std::iter::once(SelectionChange {
                id: self.select.clone(),
                selected: true,
            }))
            .collect()
    }
}

/// In-memory store of course groups and their selection state.
#[derive(Debug, Clone)]
pub struct CoursePool {
    groups: Vec<CourseGroup>,
    periods_per_day: u8,
    pending: Option<PendingOverride>,
}

impl Default for CoursePool {
    fn default() -> Self {
        Self::new(DEFAULT_PERIODS_PER_DAY)
    }
}

impl CoursePool {
    pub fn new(periods_per_day: u8) -> Self {
        Self {
            groups: Vec::new(),
            periods_per_day,
            pending: None,
        }
    }

    pub fn periods_per_day(&self) -> u8 {
        self.periods_per_day
    }

    /// All groups in insertion order.
    pub fn groups(&self) -> impl Iterator<Item = &CourseGroup> {
        self.groups.iter()
    }

    pub fn selected_groups(&self) -> impl Iterator<Item = &CourseGroup> {
        self.groups.iter().filter(|group| group.selected)
    }

    pub fn get(&self, id: &GroupId) -> Option<&CourseGroup> {
        self.groups.iter().find(|group| &group.id == id)
    }

    pub fn contains(&self, id: &GroupId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn pending(&self) -> Option<&PendingOverride> {
        self.pending.as_ref()
    }

    fn position(&self, id: &GroupId) -> ScheduleResult<usize> {
        self.groups
            .iter()
            .position(|group| &group.id == id)
            .ok_or_else(|| ScheduleError::NotFound(id.clone()))
    }

    fn set_selected(&mut self, id: &GroupId, selected: bool) {
        if let Some(group) = self.groups.iter_mut().find(|group| &group.id == id) {
            group.selected = selected;
        }
    }

    /// Create a new unselected group from the add-course form.
    pub fn add_group(&mut self, draft: &CourseDraft) -> ScheduleResult<&CourseGroup> {
        draft.validate_within(self.periods_per_day)?;
        let group = CourseGroup::from_draft(GroupId::generate(), draft)?;
        log::info!(
            "Added course '{}' on {} period(s) {}",
            group.name,
            group.day,
            group.periods_label()
        );
        self.groups.push(group);
        Ok(&self.groups[self.groups.len() - 1])
    }

    /// Insert a group built elsewhere (e.g. loaded from storage). A selected
    /// group that would collide with the current selection is inserted
    /// unselected.
    pub fn insert_group(&mut self, mut group: CourseGroup) -> ScheduleResult<&CourseGroup> {
        group.validate(self.periods_per_day)?;
        if self.contains(&group.id) {
            return Err(ScheduleError::DuplicateId(group.id));
        }
        if group.selected && !conflict::evaluate(&self.groups, &group).is_empty() {
            log::warn!(
                "Course '{}' collides with the current selection; inserting it unselected",
                group.name
            );
            group.selected = false;
        }
        self.groups.push(group);
        Ok(&self.groups[self.groups.len() - 1])
    }

    /// Replace a group's details, keeping its id. A selected group whose new
    /// slots collide with another selected group becomes unselected.
    pub fn update_group(&mut self, id: &GroupId, draft: &CourseDraft) -> ScheduleResult<&CourseGroup> {
        draft.validate_within(self.periods_per_day)?;
        let index = self.position(id)?;

        let mut updated = CourseGroup::from_draft(id.clone(), draft)?;
        updated.selected = self.groups[index].selected;
        if updated.selected && !conflict::evaluate(&self.groups, &updated).is_empty() {
            log::warn!(
                "Updated course '{}' collides with the current selection; unselecting it",
                updated.name
            );
            updated.selected = false;
        }

        if self.pending_involves(id) {
            self.pending = None;
        }
        self.groups[index] = updated;
        log::info!("Updated course {}", id);
        Ok(&self.groups[index])
    }

    /// Remove a group and all of its slots, selected or not.
    pub fn delete_group(&mut self, id: &GroupId) -> ScheduleResult<CourseGroup> {
        let index = self.position(id).map_err(|err| {
            log::warn!("Delete ignored: course {} not found", id);
            err
        })?;
        if self.pending_involves(id) {
            self.pending = None;
        }
        let removed = self.groups.remove(index);
        log::info!("Deleted course '{}'", removed.name);
        Ok(removed)
    }

    /// Selected groups that collide with group `id` on its own day.
    pub fn conflicts_for(&self, id: &GroupId) -> ScheduleResult<Vec<ConflictingGroup>> {
        let candidate = &self.groups[self.position(id)?];
        Ok(conflict::evaluate(&self.groups, candidate))
    }

    /// Turn a group's selection on or off.
    ///
    /// Turning off always succeeds. Turning on either selects the group or,
    /// when it collides with selected groups, records a pending override and
    /// returns [`ToggleOutcome::Conflict`] without changing any selection.
    pub fn toggle_selection(&mut self, id: &GroupId, want_selected: bool) -> ScheduleResult<ToggleOutcome> {
        let index = self.position(id).map_err(|err| {
            log::warn!("Toggle ignored: course {} not found", id);
            err
        })?;

        if !want_selected {
            self.groups[index].selected = false;
            if self.pending_candidate() == Some(id) {
                self.pending = None;
            }
            return Ok(ToggleOutcome::Deselected);
        }

        if self.groups[index].selected {
            return Ok(ToggleOutcome::Selected);
        }

        let candidate = &self.groups[index];
        let conflicts = conflict::evaluate(&self.groups, candidate);
        if conflicts.is_empty() {
            self.groups[index].selected = true;
            if self.pending_candidate() == Some(id) {
                self.pending = None;
            }
            log::info!("Selected course '{}'", self.groups[index].name);
            return Ok(ToggleOutcome::Selected);
        }

        let pending = PendingOverride {
            candidate: id.clone(),
            conflicting: conflicts.iter().map(|group| group.id.clone()).collect(),
            message: conflict::conflict_message(candidate, &conflicts),
            conflicts,
        };
        log::info!(
            "Selecting '{}' needs confirmation: {} conflicting course(s)",
            candidate.name,
            pending.conflicting.len()
        );
        self.pending = Some(pending.clone());
        Ok(ToggleOutcome::Conflict(pending))
    }

    /// Work out what confirming the pending override for `id` would change,
    /// without changing anything. Collisions are re-derived from the current
    /// selection so the result always restores the slot invariant.
    pub fn override_plan(&self, id: &GroupId) -> ScheduleResult<OverridePlan> {
        let pending_id = self
            .pending_candidate()
            .ok_or(ScheduleError::NoPendingOverride)?;
        if pending_id != id {
            return Err(ScheduleError::PendingMismatch {
                pending: pending_id.clone(),
                requested: id.clone(),
            });
        }

        let deselect = self
            .conflicts_for(id)?
            .into_iter()
            .map(|group| group.id)
            .collect();
        Ok(OverridePlan {
            select: id.clone(),
            deselect,
        })
    }

    /// Select the pending candidate and unselect every group it collides
    /// with, then clear the pending override.
    pub fn confirm_override(&mut self, id: &GroupId) -> ScheduleResult<OverridePlan> {
        let plan = self.override_plan(id)?;
        for loser in &plan.deselect {
            self.set_selected(loser, false);
        }
        self.set_selected(&plan.select, true);
        self.pending = None;
        log::info!(
            "Override confirmed for {}: replaced {} course(s)",
            plan.select,
            plan.deselect.len()
        );
        Ok(plan)
    }

    /// Drop the pending override, if any, without changing any selection.
    pub fn cancel_override(&mut self) -> Option<PendingOverride> {
        let cancelled = self.pending.take();
        if let Some(pending) = &cancelled {
            log::info!("Override for {} cancelled", pending.candidate);
        }
        cancelled
    }

    /// Slots claimed by more than one selected group. Always empty unless the
    /// invariant has been broken.
    pub fn overlapping_selected_slots(&self) -> Vec<Slot> {
        let mut seen = BTreeSet::new();
        let mut overlaps = BTreeSet::new();
        for slot in self.selected_groups().flat_map(|group| group.slots()) {
            if !seen.insert(slot) {
                overlaps.insert(slot);
            }
        }
        overlaps.into_iter().collect()
    }

    fn pending_candidate(&self) -> Option<&GroupId> {
        self.pending.as_ref().map(|pending| &pending.candidate)
    }

    fn pending_involves(&self, id: &GroupId) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| &pending.candidate == id || pending.conflicting.contains(id))
    }
}
