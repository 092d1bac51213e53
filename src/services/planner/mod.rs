//! Schedule planner: keeps the in-memory pool in step with course storage.
//!
//! Every change is checked against the pool first, written to the store,
//! and only applied to the pool once the store has accepted it. When the
//! store fails the pool is left exactly as it was and the caller gets
//! [`ScheduleError::SaveFailed`]. Conflict evaluation and cancelling an
//! override never touch the store.

use crate::error::{ScheduleError, ScheduleResult};
use crate::models::course::{CourseDraft, CourseFields, CourseGroup, CourseRecord, GroupId};
use crate::services::conflict;
use crate::services::course::CourseStore;
use crate::services::pool::{CoursePool, OverridePlan, SelectionChange, ToggleOutcome};
use crate::services::projector::{self, ScheduleView};

fn save_failed(err: anyhow::Error) -> ScheduleError {
    log::warn!("Save failed: {:#}", err);
    ScheduleError::SaveFailed(format!("{:#}", err))
}

/// The pool plus the store that makes it durable.
pub struct SchedulePlanner<S: CourseStore> {
    store: S,
    pool: CoursePool,
}

impl<S: CourseStore> SchedulePlanner<S> {
    /// Planner with an empty pool; call [`load`](Self::load) to read the store.
    pub fn new(store: S, periods_per_day: u8) -> Self {
        Self {
            store,
            pool: CoursePool::new(periods_per_day),
        }
    }

    pub fn pool(&self) -> &CoursePool {
        &self.pool
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Rebuild the pool from storage. Records that cannot be decoded are
    /// skipped with a warning. Stored selections that would overlap an
    /// earlier one, or that name an unknown course, are dropped and removed
    /// from storage so the next load shows the same schedule.
    pub fn load(&mut self) -> ScheduleResult<usize> {
        let records = self
            .store
            .list()
            .map_err(|e| ScheduleError::LoadFailed(format!("{:#}", e)))?;
        let selected = self
            .store
            .load_selection()
            .map_err(|e| ScheduleError::LoadFailed(format!("{:#}", e)))?;

        let mut pool = CoursePool::new(self.pool.periods_per_day());
        for record in &records {
            let inserted = CourseGroup::from_record(record)
                .map_err(ScheduleError::from)
                .and_then(|group| pool.insert_group(group).map(|_| ()));
            if let Err(err) = inserted {
                log::warn!("Skipping stored course {} ({}): {}", record.id, record.name, err);
            }
        }

        let mut dropped = Vec::new();
        for id in selected.into_iter().map(GroupId::from) {
            match pool.conflicts_for(&id) {
                Ok(conflicts) if conflicts.is_empty() => {
                    pool.toggle_selection(&id, true)?;
                    continue;
                }
                Ok(_) => log::warn!("Dropping stored selection of {}: it overlaps another course", id),
                Err(_) => log::warn!("Dropping stored selection of unknown course {}", id),
            }
            dropped.push(SelectionChange { id, selected: false });
        }

        if !dropped.is_empty() {
            if let Err(err) = self.store.save_selection(&dropped) {
                log::warn!("Could not remove {} dropped selection(s): {:#}", dropped.len(), err);
            }
        }

        log::info!(
            "Loaded {} course(s), {} selected",
            pool.len(),
            pool.selected_groups().count()
        );
        self.pool = pool;
        Ok(self.pool.len())
    }

    /// Validate, store, then add the course to the pool (unselected).
    pub fn add_course(&mut self, draft: &CourseDraft) -> ScheduleResult<&CourseGroup> {
        draft.validate_within(self.pool.periods_per_day())?;
        let fields = draft.to_fields()?;
        let record = self.store.create(&fields).map_err(save_failed)?;

        let group = CourseGroup::from_record(&record)?;
        self.pool.insert_group(group)
    }

    /// Store and add a course given as raw fields with an encoded time, which
    /// may name periods that are not contiguous.
    pub fn add_encoded(&mut self, fields: &CourseFields) -> ScheduleResult<&CourseGroup> {
        fields.validate()?;
        let periods_per_day = self.pool.periods_per_day();
        let mut probe = CourseGroup::from_record(&CourseRecord::from_fields("", fields.clone()))?;
        probe.validate(periods_per_day)?;

        let record = self.store.create(fields).map_err(save_failed)?;
        probe.id = GroupId::from(record.id);
        self.pool.insert_group(probe)
    }

    /// Replace a course's details in storage and in the pool.
    ///
    /// A selected course whose new slots collide with another selected
    /// course loses its selection. That unselection is stored before the new
    /// details; if either write fails the stored selection is restored where
    /// possible and the pool is left unchanged.
    pub fn update_course(&mut self, id: &GroupId, draft: &CourseDraft) -> ScheduleResult<&CourseGroup> {
        draft.validate_within(self.pool.periods_per_day())?;
        let was_selected = match self.pool.get(id) {
            Some(group) => group.selected,
            None => {
                log::warn!("Update ignored: course {} not found", id);
                return Err(ScheduleError::NotFound(id.clone()));
            }
        };

        let updated = CourseGroup::from_draft(id.clone(), draft)?;
        let loses_selection =
            was_selected && !conflict::evaluate(self.pool.groups(), &updated).is_empty();
        let fields = draft.to_fields()?;

        if loses_selection {
            let change = SelectionChange { id: id.clone(), selected: false };
            self.store.save_selection(&[change]).map_err(save_failed)?;
        }

        if let Err(err) = self.store.update(id.as_str(), &fields) {
            if loses_selection {
                let restore = SelectionChange { id: id.clone(), selected: true };
                if let Err(restore_err) = self.store.save_selection(&[restore]) {
                    log::warn!("Could not restore selection of {}: {:#}", id, restore_err);
                }
            }
            return Err(save_failed(err));
        }

        self.pool.update_group(id, draft)
    }

    /// Delete a course from storage and the pool.
    pub fn delete_course(&mut self, id: &GroupId) -> ScheduleResult<CourseGroup> {
        if !self.pool.contains(id) {
            log::warn!("Delete ignored: course {} not found", id);
            return Err(ScheduleError::NotFound(id.clone()));
        }
        self.store.delete(id.as_str()).map_err(save_failed)?;
        self.pool.delete_group(id)
    }

    /// Toggle a course's selection. A conflicting toggle is reported without
    /// touching storage; everything else is stored before it is applied.
    pub fn toggle_selection(&mut self, id: &GroupId, want_selected: bool) -> ScheduleResult<ToggleOutcome> {
        let group = self.pool.get(id).ok_or_else(|| {
            log::warn!("Toggle ignored: course {} not found", id);
            ScheduleError::NotFound(id.clone())
        })?;

        let needs_store = if want_selected {
            !group.selected && self.pool.conflicts_for(id)?.is_empty()
        } else {
            group.selected
        };

        if needs_store {
            let change = SelectionChange { id: id.clone(), selected: want_selected };
            self.store.save_selection(&[change]).map_err(save_failed)?;
        }
        self.pool.toggle_selection(id, want_selected)
    }

    /// Confirm the pending override for `id`: store the new selection, then
    /// apply it to the pool in one step.
    pub fn confirm_override(&mut self, id: &GroupId) -> ScheduleResult<OverridePlan> {
        let plan = self.pool.override_plan(id)?;
        self.store
            .save_selection(&plan.changes())
            .map_err(save_failed)?;
        self.pool.confirm_override(id)
    }

    pub fn cancel_override(&mut self) -> bool {
        self.pool.cancel_override().is_some()
    }

    /// Grid, course list and pending override for presentation.
    pub fn view(&self) -> ScheduleView {
        projector::view(&self.pool)
    }
}
