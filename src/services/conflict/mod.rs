//! Conflict resolver.
//!
//! Pure functions over the selected groups of a pool: given the slots held
//! by selected groups on one day and a candidate group, report every
//! candidate slot already held by a different selected group. Only exact
//! (day, period) equality counts as a collision.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::models::course::{CourseGroup, GroupId};
use crate::models::slot::{Day, Slot};

/// Owner of each slot held by a selected group on one day.
#[derive(Debug, Default, Clone)]
pub struct SelectedIndex<'a> {
    owners: HashMap<Slot, &'a CourseGroup>,
}

impl<'a> SelectedIndex<'a> {
    /// Index the selected groups scheduled on `day`. Unselected groups and
    /// other days are ignored.
    pub fn for_day<I>(groups: I, day: Day) -> Self
    where
        I: IntoIterator<Item = &'a CourseGroup>,
    {
        let mut owners = HashMap::new();
        for group in groups
            .into_iter()
            .filter(|group| group.selected && group.day == day)
        {
            for slot in group.slots() {
                owners.insert(slot, group);
            }
        }
        Self { owners }
    }

    pub fn owner(&self, slot: Slot) -> Option<&'a CourseGroup> {
        self.owners.get(&slot).copied()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// One candidate slot that collides with a selected group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotConflict {
    pub slot: Slot,
    pub existing: GroupId,
}

/// Find the candidate slots already held by other selected groups, in
/// period order.
pub fn find_conflicts(index: &SelectedIndex<'_>, candidate: &CourseGroup) -> Vec<SlotConflict> {
    candidate
        .slots()
        .filter_map(|slot| {
            index
                .owner(slot)
                .filter(|owner| owner.id != candidate.id)
                .map(|owner| SlotConflict {
                    slot,
                    existing: owner.id.clone(),
                })
        })
        .collect()
}

/// A selected group that collides with a candidate, with the periods where
/// they overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictingGroup {
    pub id: GroupId,
    pub name: String,
    pub day: Day,
    pub periods: BTreeSet<u8>,
    pub overlapping: BTreeSet<u8>,
}

/// Collapse per-slot conflicts into one entry per owning group, ordered by
/// the first overlapping period.
pub fn group_conflicts(index: &SelectedIndex<'_>, conflicts: &[SlotConflict]) -> Vec<ConflictingGroup> {
    let mut grouped: Vec<ConflictingGroup> = Vec::new();
    for conflict in conflicts {
        if let Some(existing) = grouped.iter_mut().find(|g| g.id == conflict.existing) {
            existing.overlapping.insert(conflict.slot.period);
            continue;
        }
        if let Some(owner) = index.owner(conflict.slot) {
            grouped.push(ConflictingGroup {
                id: owner.id.clone(),
                name: owner.name.clone(),
                day: owner.day,
                periods: owner.periods.clone(),
                overlapping: BTreeSet::from([conflict.slot.period]),
            });
        }
    }
    grouped
}

/// Evaluate a candidate against the selected groups on its own day.
pub fn evaluate<'a, I>(groups: I, candidate: &CourseGroup) -> Vec<ConflictingGroup>
where
    I: IntoIterator<Item = &'a CourseGroup>,
{
    let index = SelectedIndex::for_day(groups, candidate.day);
    let conflicts = find_conflicts(&index, candidate);
    log::debug!(
        "Evaluated '{}' against {} selected slot(s) on {}: {} collision(s)",
        candidate.name,
        index.len(),
        candidate.day,
        conflicts.len()
    );
    group_conflicts(&index, &conflicts)
}

/// User-facing description of a conflict, one line per colliding group.
pub fn conflict_message(candidate: &CourseGroup, conflicts: &[ConflictingGroup]) -> String {
    let mut lines: Vec<String> = conflicts
        .iter()
        .map(|group| {
            format!(
                "[{} period {}] already has a course: \"{}\".",
                group.day,
                crate::models::course::periods::format_periods(&group.overlapping),
                group.name
            )
        })
        .collect();
    lines.push(format!(
        "Do you want to replace {} with \"{}\"?",
        if conflicts.len() == 1 { "it" } else { "them" },
        candidate.name
    ));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course::CourseDraft;
    use pretty_assertions::assert_eq;

    fn group(id: &str, day: Day, start: u8, end: u8, selected: bool) -> CourseGroup {
        let draft = CourseDraft::new(format!("Course {}", id), day, start, end);
        let mut group = CourseGroup::from_draft(GroupId::from(id), &draft).unwrap();
        group.selected = selected;
        group
    }

    #[test]
    fn test_index_ignores_unselected_and_other_days() {
        let groups = vec![
            group("a", Day::Monday, 1, 3, true),
            group("b", Day::Monday, 4, 4, false),
            group("c", Day::Tuesday, 1, 2, true),
        ];
        let index = SelectedIndex::for_day(&groups, Day::Monday);
        assert_eq!(index.len(), 3);
        assert_eq!(
            index.owner(Slot { day: Day::Monday, period: 2 }).map(|g| g.id.as_str()),
            Some("a")
        );
        assert!(index.owner(Slot { day: Day::Monday, period: 4 }).is_none());
        assert!(index.owner(Slot { day: Day::Tuesday, period: 1 }).is_none());
    }

    #[test]
    fn test_find_conflicts_exact_slots_only() {
        let groups = vec![group("a", Day::Monday, 1, 3, true)];
        let candidate = group("b", Day::Monday, 3, 5, false);
        let index = SelectedIndex::for_day(&groups, Day::Monday);

        let conflicts = find_conflicts(&index, &candidate);
        assert_eq!(
            conflicts,
            vec![SlotConflict {
                slot: Slot { day: Day::Monday, period: 3 },
                existing: GroupId::from("a"),
            }]
        );
    }

    #[test]
    fn test_adjacent_periods_do_not_conflict() {
        let groups = vec![group("a", Day::Monday, 1, 2, true)];
        let candidate = group("b", Day::Monday, 3, 4, false);
        assert!(evaluate(&groups, &candidate).is_empty());
    }

    #[test]
    fn test_candidate_never_conflicts_with_itself() {
        let groups = vec![group("a", Day::Monday, 1, 2, true)];
        assert!(evaluate(&groups, &groups[0]).is_empty());
    }

    #[test]
    fn test_conflicts_grouped_by_owner() {
        let groups = vec![
            group("a", Day::Friday, 1, 2, true),
            group("b", Day::Friday, 4, 4, true),
        ];
        let candidate = group("c", Day::Friday, 1, 4, false);

        let grouped = evaluate(&groups, &candidate);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].id, GroupId::from("a"));
        assert_eq!(grouped[0].overlapping, BTreeSet::from([1, 2]));
        assert_eq!(grouped[0].periods, BTreeSet::from([1, 2]));
        assert_eq!(grouped[1].id, GroupId::from("b"));
        assert_eq!(grouped[1].overlapping, BTreeSet::from([4]));
    }

    #[test]
    fn test_other_days_never_conflict() {
        let groups = vec![group("a", Day::Tuesday, 1, 1, true)];
        let candidate = group("b", Day::Monday, 1, 1, false);
        assert!(evaluate(&groups, &candidate).is_empty());
    }

    #[test]
    fn test_conflict_message() {
        let groups = vec![group("a", Day::Monday, 1, 3, true)];
        let candidate = group("b", Day::Monday, 2, 2, false);
        let conflicts = evaluate(&groups, &candidate);

        assert_eq!(
            conflict_message(&candidate, &conflicts),
            "[Monday period 2] already has a course: \"Course a\".\n\
             Do you want to replace it with \"Course b\"?"
        );
    }
}
