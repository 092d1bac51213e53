//! Schedule projector: read models derived from the pool.
//!
//! The grid has one row per period and one column per day. Each contiguous
//! run of a selected group's periods is drawn as a single merged cell: the
//! lowest period of the run is the anchor carrying the span, the rest of the
//! run is covered and renders nothing.

use serde::Serialize;

use crate::models::course::periods::contiguous_runs;
use crate::models::course::{CourseGroup, GroupId};
use crate::models::slot::{Day, Slot};
use crate::services::pool::{CoursePool, PendingOverride};

/// What a grid cell shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridCell {
    Empty,
    Anchor {
        group_id: GroupId,
        name: String,
        course_type: String,
        color: String,
        span: u8,
    },
    Covered {
        group_id: GroupId,
    },
}

impl GridCell {
    pub fn group_id(&self) -> Option<&GroupId> {
        match self {
            GridCell::Empty => None,
            GridCell::Anchor { group_id, .. } | GridCell::Covered { group_id } => Some(group_id),
        }
    }
}

/// The weekly grid, rows indexed by period (1-based) and columns by day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleGrid {
    pub days: Vec<Day>,
    pub periods_per_day: u8,
    pub rows: Vec<Vec<GridCell>>,
}

impl ScheduleGrid {
    fn empty(periods_per_day: u8) -> Self {
        Self {
            days: Day::ALL.to_vec(),
            periods_per_day,
            rows: vec![vec![GridCell::Empty; Day::ALL.len()]; usize::from(periods_per_day)],
        }
    }

    /// The cell at `slot`, or `None` outside the grid.
    pub fn cell(&self, slot: Slot) -> Option<&GridCell> {
        let row = usize::from(slot.period).checked_sub(1)?;
        self.rows.get(row)?.get(slot.day.index())
    }

    fn cell_mut(&mut self, slot: Slot) -> Option<&mut GridCell> {
        let row = usize::from(slot.period).checked_sub(1)?;
        self.rows.get_mut(row)?.get_mut(slot.day.index())
    }

    /// Anchor each contiguous run of the group separately. A group with
    /// periods 1 and 3 draws two single-period cells instead of one span of
    /// two from period 1, which would cover period 2 without occupying it.
    fn place(&mut self, group: &CourseGroup) {
        for (start, span) in contiguous_runs(&group.periods) {
            for offset in 0..span {
                let slot = Slot { day: group.day, period: start + offset };
                let Some(cell) = self.cell_mut(slot) else {
                    log::warn!("Course '{}' extends past the grid at {}", group.name, slot);
                    continue;
                };
                *cell = if offset == 0 {
                    GridCell::Anchor {
                        group_id: group.id.clone(),
                        name: group.name.clone(),
                        course_type: group.course_type.clone(),
                        color: group.color.clone(),
                        span,
                    }
                } else {
                    GridCell::Covered { group_id: group.id.clone() }
                };
            }
        }
    }
}

/// Derive the grid of selected groups.
pub fn project(pool: &CoursePool) -> ScheduleGrid {
    let mut grid = ScheduleGrid::empty(pool.periods_per_day());
    for group in pool.selected_groups() {
        grid.place(group);
    }
    grid
}

/// One entry of the course list panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
    pub day: Day,
    pub periods: Vec<u8>,
    pub periods_label: String,
    pub course_type: String,
    pub color: String,
    pub description: Option<String>,
    pub selected: bool,
}

impl From<&CourseGroup> for GroupSummary {
    fn from(group: &CourseGroup) -> Self {
        Self {
            id: group.id.clone(),
            name: group.name.clone(),
            day: group.day,
            periods: group.periods.iter().copied().collect(),
            periods_label: group.periods_label(),
            course_type: group.course_type.clone(),
            color: group.color.clone(),
            description: group.description.clone(),
            selected: group.selected,
        }
    }
}

/// Every group in the pool, sorted by day, first period and name.
pub fn summarize(pool: &CoursePool) -> Vec<GroupSummary> {
    let mut summaries: Vec<GroupSummary> = pool.groups().map(GroupSummary::from).collect();
    summaries.sort_by(|a, b| {
        (a.day, a.periods.first(), &a.name).cmp(&(b.day, b.periods.first(), &b.name))
    });
    summaries
}

/// Everything a presentation layer needs after a pool change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleView {
    pub grid: ScheduleGrid,
    pub groups: Vec<GroupSummary>,
    pub pending: Option<PendingOverride>,
}

pub fn view(pool: &CoursePool) -> ScheduleView {
    ScheduleView {
        grid: project(pool),
        groups: summarize(pool),
        pending: pool.pending().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course::CourseDraft;
    use pretty_assertions::assert_eq;

    fn slot(day: Day, period: u8) -> Slot {
        Slot { day, period }
    }

    fn select(pool: &mut CoursePool, draft: CourseDraft) -> GroupId {
        let id = pool.add_group(&draft).unwrap().id.clone();
        pool.toggle_selection(&id, true).unwrap();
        id
    }

    #[test]
    fn test_empty_pool_projects_empty_grid() {
        let grid = project(&CoursePool::new(8));
        assert_eq!(grid.rows.len(), 8);
        assert!(grid.rows.iter().flatten().all(|cell| *cell == GridCell::Empty));
        assert!(grid.cell(slot(Day::Monday, 0)).is_none());
        assert!(grid.cell(slot(Day::Monday, 9)).is_none());
    }

    #[test]
    fn test_anchor_is_lowest_period_with_span() {
        let mut pool = CoursePool::default();
        let id = select(
            &mut pool,
            CourseDraft::new("Algebra", Day::Tuesday, 2, 4).with_color("#93c5fd"),
        );

        let grid = project(&pool);
        assert_eq!(
            grid.cell(slot(Day::Tuesday, 2)),
            Some(&GridCell::Anchor {
                group_id: id.clone(),
                name: "Algebra".to_string(),
                course_type: "General".to_string(),
                color: "#93c5fd".to_string(),
                span: 3,
            })
        );
        assert_eq!(
            grid.cell(slot(Day::Tuesday, 3)),
            Some(&GridCell::Covered { group_id: id.clone() })
        );
        assert_eq!(
            grid.cell(slot(Day::Tuesday, 4)),
            Some(&GridCell::Covered { group_id: id })
        );
        assert_eq!(grid.cell(slot(Day::Tuesday, 1)), Some(&GridCell::Empty));
        assert_eq!(grid.cell(slot(Day::Monday, 2)), Some(&GridCell::Empty));
    }

    #[test]
    fn test_unselected_groups_are_not_projected() {
        let mut pool = CoursePool::default();
        pool.add_group(&CourseDraft::single("Idle", Day::Monday, 1)).unwrap();
        let grid = project(&pool);
        assert_eq!(grid.cell(slot(Day::Monday, 1)), Some(&GridCell::Empty));
    }

    #[test]
    fn test_discrete_periods_anchor_each_run() {
        let mut pool = CoursePool::default();
        let draft = CourseDraft::single("Split", Day::Friday, 1);
        let id = pool.add_group(&draft).unwrap().id.clone();
        let mut group = pool.get(&id).unwrap().clone();
        pool.delete_group(&id).unwrap();
        group.periods = [1, 3, 4].into_iter().collect();
        group.selected = true;
        pool.insert_group(group).unwrap();

        let grid = project(&pool);
        assert!(matches!(
            grid.cell(slot(Day::Friday, 1)),
            Some(GridCell::Anchor { span: 1, .. })
        ));
        assert_eq!(grid.cell(slot(Day::Friday, 2)), Some(&GridCell::Empty));
        assert!(matches!(
            grid.cell(slot(Day::Friday, 3)),
            Some(GridCell::Anchor { span: 2, .. })
        ));
        assert!(matches!(
            grid.cell(slot(Day::Friday, 4)),
            Some(GridCell::Covered { .. })
        ));
    }

    #[test]
    fn test_deleted_group_disappears_from_grid_and_list() {
        let mut pool = CoursePool::default();
        let e = select(&mut pool, CourseDraft::new("E", Day::Monday, 1, 2));
        pool.delete_group(&e).unwrap();

        let view = view(&pool);
        assert_eq!(view.grid.cell(slot(Day::Monday, 1)), Some(&GridCell::Empty));
        assert_eq!(view.grid.cell(slot(Day::Monday, 2)), Some(&GridCell::Empty));
        assert!(view.groups.iter().all(|summary| summary.id != e));
    }

    #[test]
    fn test_summaries_sorted_and_labelled() {
        let mut pool = CoursePool::default();
        pool.add_group(&CourseDraft::new("Late", Day::Monday, 5, 6)).unwrap();
        pool.add_group(&CourseDraft::new("Wed", Day::Wednesday, 1, 1)).unwrap();
        pool.add_group(&CourseDraft::new("Early", Day::Monday, 1, 3)).unwrap();

        let names: Vec<(String, String)> = summarize(&pool)
            .into_iter()
            .map(|s| (s.name, s.periods_label))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Early".to_string(), "1-3".to_string()),
                ("Late".to_string(), "5-6".to_string()),
                ("Wed".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_view_carries_pending_override() {
        let mut pool = CoursePool::default();
        select(&mut pool, CourseDraft::single("A", Day::Monday, 1));
        let b = pool.add_group(&CourseDraft::single("B", Day::Monday, 1)).unwrap().id.clone();
        pool.toggle_selection(&b, true).unwrap();

        let view = view(&pool);
        assert_eq!(view.pending.map(|p| p.candidate), Some(b));
    }

    #[test]
    fn test_grid_serializes_cell_kind() {
        let mut pool = CoursePool::default();
        select(&mut pool, CourseDraft::new("A", Day::Monday, 1, 2));
        let json = serde_json::to_value(project(&pool)).unwrap();
        assert_eq!(json["rows"][0][0]["kind"], "anchor");
        assert_eq!(json["rows"][0][0]["span"], 2);
        assert_eq!(json["rows"][1][0]["kind"], "covered");
        assert_eq!(json["rows"][0][1]["kind"], "empty");
    }
}
