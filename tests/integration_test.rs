// Integration tests for the planner over a file-backed database

mod fixtures;

use course_planner::models::course::{CourseDraft, CourseValidationError, GroupId};
use course_planner::models::slot::{Day, Slot};
use course_planner::services::course::CourseService;
use course_planner::services::database::Database;
use course_planner::services::planner::SchedulePlanner;
use course_planner::services::pool::ToggleOutcome;
use course_planner::services::projector::GridCell;
use course_planner::ScheduleError;
use fixtures::courses;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn selected_names<S: course_planner::services::course::CourseStore>(
    planner: &SchedulePlanner<S>,
) -> Vec<String> {
    let mut names: Vec<String> = planner
        .pool()
        .selected_groups()
        .map(|group| group.name.clone())
        .collect();
    names.sort();
    names
}

fn add(planner: &mut SchedulePlanner<CourseService<'_>>, draft: &CourseDraft) -> GroupId {
    planner.add_course(draft).expect("Failed to add course").id.clone()
}

#[test]
fn test_override_replaces_overlapping_course() {
    let dir = TempDir::new().unwrap();
    let db = fixtures::open_db(&dir.path().join("courses.db"));
    let mut planner = fixtures::planner(&db);

    let a = add(&mut planner, &courses::algebra());
    assert_eq!(planner.toggle_selection(&a, true).unwrap(), ToggleOutcome::Selected);

    let b = add(&mut planner, &courses::biology());
    let pending = match planner.toggle_selection(&b, true).unwrap() {
        ToggleOutcome::Conflict(pending) => pending,
        other => panic!("expected a conflict, got {:?}", other),
    };
    assert_eq!(pending.candidate, b);
    assert_eq!(pending.conflicting.iter().collect::<Vec<_>>(), vec![&a]);
    assert!(pending.message.contains("\"Algebra\""));
    assert_eq!(selected_names(&planner), vec!["Algebra"]);

    let plan = planner.confirm_override(&b).unwrap();
    assert_eq!(plan.deselect, vec![a.clone()]);
    assert_eq!(selected_names(&planner), vec!["Biology"]);
    assert!(planner.pool().pending().is_none());

    let view = planner.view();
    assert_eq!(view.grid.cell(Slot { day: Day::Monday, period: 1 }), Some(&GridCell::Empty));
    assert_eq!(
        view.grid.cell(Slot { day: Day::Monday, period: 2 }).and_then(GridCell::group_id),
        Some(&b)
    );
}

#[test]
fn test_different_days_never_conflict() {
    let dir = TempDir::new().unwrap();
    let db = fixtures::open_db(&dir.path().join("courses.db"));
    let mut planner = fixtures::planner(&db);

    let c = add(&mut planner, &courses::chemistry());
    planner.toggle_selection(&c, true).unwrap();
    let d = add(&mut planner, &courses::drawing());
    assert_eq!(planner.toggle_selection(&d, true).unwrap(), ToggleOutcome::Selected);

    assert_eq!(selected_names(&planner), vec!["Chemistry", "Drawing"]);
}

#[test]
fn test_deleted_course_leaves_grid_and_list() {
    let dir = TempDir::new().unwrap();
    let db = fixtures::open_db(&dir.path().join("courses.db"));
    let mut planner = fixtures::planner(&db);

    let e = add(&mut planner, &courses::economics());
    planner.toggle_selection(&e, true).unwrap();
    planner.delete_course(&e).unwrap();

    let view = planner.view();
    for period in 1..=2 {
        assert_eq!(
            view.grid.cell(Slot { day: Day::Monday, period }),
            Some(&GridCell::Empty)
        );
    }
    assert!(view.groups.iter().all(|group| group.id != e));
    assert!(fixtures::planner(&db).pool().is_empty());
}

#[test]
fn test_inverted_range_is_rejected() {
    let dir = TempDir::new().unwrap();
    let db = fixtures::open_db(&dir.path().join("courses.db"));
    let mut planner = fixtures::planner(&db);

    let result = planner
        .add_course(&CourseDraft::new("Backwards", Day::Friday, 5, 2))
        .map(|group| group.id.clone());
    assert_eq!(
        result,
        Err(ScheduleError::Validation(CourseValidationError::InvalidPeriodRange {
            start: 5,
            end: 2
        }))
    );
    assert!(planner.pool().is_empty());
    assert!(planner.store().list_all().unwrap().is_empty());
}

#[test]
fn test_schedule_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("courses.db");

    let (algebra, chemistry) = {
        let db = fixtures::open_db(&path);
        let mut planner = fixtures::planner(&db);
        let a = add(&mut planner, &courses::algebra());
        let c = add(&mut planner, &courses::chemistry());
        add(&mut planner, &courses::biology());
        planner.toggle_selection(&a, true).unwrap();
        planner.toggle_selection(&c, true).unwrap();
        (a, c)
    };

    let db = fixtures::open_db(&path);
    let planner = fixtures::planner(&db);
    assert_eq!(planner.pool().len(), 3);
    assert_eq!(selected_names(&planner), vec!["Algebra", "Chemistry"]);

    let view = planner.view();
    let labels: Vec<(&str, &str)> = view
        .groups
        .iter()
        .map(|group| (group.name.as_str(), group.periods_label.as_str()))
        .collect();
    assert_eq!(
        labels,
        vec![("Algebra", "1-3"), ("Biology", "2"), ("Chemistry", "1")]
    );

    match view.grid.cell(Slot { day: Day::Monday, period: 1 }) {
        Some(GridCell::Anchor { group_id, span, course_type, .. }) => {
            assert_eq!(group_id, &algebra);
            assert_eq!(*span, 3);
            assert_eq!(course_type, "Required");
        }
        other => panic!("expected an anchor, got {:?}", other),
    }
    assert_eq!(
        view.grid.cell(Slot { day: Day::Tuesday, period: 1 }).and_then(GridCell::group_id),
        Some(&chemistry)
    );
}

#[test]
fn test_cancelled_override_is_not_persisted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("courses.db");
    {
        let db = fixtures::open_db(&path);
        let mut planner = fixtures::planner(&db);
        let a = add(&mut planner, &courses::algebra());
        let b = add(&mut planner, &courses::biology());
        planner.toggle_selection(&a, true).unwrap();
        planner.toggle_selection(&b, true).unwrap();
        assert!(planner.cancel_override());
        assert_eq!(
            planner.confirm_override(&b).map(|plan| plan.select),
            Err(ScheduleError::NoPendingOverride)
        );
    }

    let db = fixtures::open_db(&path);
    assert_eq!(selected_names(&fixtures::planner(&db)), vec!["Algebra"]);
}

#[test]
fn test_view_serializes_for_presentation() {
    let db = Database::new(":memory:").unwrap();
    db.initialize_schema().unwrap();
    let mut planner = fixtures::planner(&db);
    let a = add(&mut planner, &courses::algebra());
    planner.toggle_selection(&a, true).unwrap();

    let json = serde_json::to_value(planner.view()).unwrap();
    let anchor = &json["grid"]["rows"][0][0];
    assert_eq!(anchor["kind"], "anchor");
    assert_eq!(anchor["span"], 3);
    assert_eq!(json["grid"]["rows"][1][0]["kind"], "covered");
    assert_eq!(json["groups"][0]["periods_label"], "1-3");
    assert!(json["pending"].is_null());
}
