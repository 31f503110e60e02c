use roster_core::db::open_db_in_memory;
use roster_core::{
    Activity, Collection, ConfirmationRequest, DeleteToggle, EvaluationState, InputFlow,
    InputRequest, ItemHandle, KvRosterRepository, MemorySink, Notice, Point, PointerEvent,
    RepoError, RepoResult, RosterApp, RosterConfig, RosterRepository, RosterSnapshot, Screen,
    SqliteKeyValueRepository, Student, StudentCategory, UiEvent,
};
use rusqlite::Connection;
use std::cell::RefCell;

type SqliteApp<'conn> = RosterApp<KvRosterRepository<SqliteKeyValueRepository<'conn>>, MemorySink>;

fn open_app(conn: &Connection) -> SqliteApp<'_> {
    open_app_with(conn, RosterConfig::default())
}

fn open_app_with(conn: &Connection, config: RosterConfig) -> SqliteApp<'_> {
    let repo = KvRosterRepository::new(SqliteKeyValueRepository::try_new(conn).unwrap());
    RosterApp::open(repo, MemorySink::new(), config).unwrap()
}

fn add_student<R: RosterRepository>(
    app: &mut RosterApp<R, MemorySink>,
    name: &str,
    category: StudentCategory,
) {
    app.handle_event(UiEvent::AddStudentTapped);
    app.handle_event(UiEvent::InputSubmitted(name.to_string()));
    app.handle_event(UiEvent::CategoryChosen(category));
}

fn add_activity<R: RosterRepository>(app: &mut RosterApp<R, MemorySink>, name: &str) {
    app.handle_event(UiEvent::AddActivityTapped);
    app.handle_event(UiEvent::InputSubmitted(name.to_string()));
}

fn grid_names<R: RosterRepository>(app: &RosterApp<R, MemorySink>) -> Vec<String> {
    let grid = app.sink().last_student_grid().unwrap();
    grid.names().into_iter().map(str::to_string).collect()
}

fn activity_names<R: RosterRepository>(app: &RosterApp<R, MemorySink>) -> Vec<String> {
    let list = app.sink().last_activity_list().unwrap();
    list.names().into_iter().map(str::to_string).collect()
}

fn press<R: RosterRepository>(
    app: &mut RosterApp<R, MemorySink>,
    handle: ItemHandle,
    down_ms: u64,
    up_ms: u64,
) {
    app.pointer(
        handle,
        PointerEvent::Down {
            at_ms: down_ms,
            position: Point::new(5.0, 5.0),
        },
    );
    app.tick(up_ms);
    app.pointer(handle, PointerEvent::Up { at_ms: up_ms });
}

#[test]
fn opening_renders_the_main_view() {
    let conn = open_db_in_memory().unwrap();
    let app = open_app(&conn);

    assert_eq!(app.screen(), Screen::Main);
    assert!(app.sink().main_visible);
    assert!(!app.sink().student_visible);
    assert!(grid_names(&app).is_empty());
}

#[test]
fn students_render_sorted_but_keep_insertion_handles() {
    let conn = open_db_in_memory().unwrap();
    let mut app = open_app(&conn);

    add_student(&mut app, "Zoé", StudentCategory::TierA);
    add_student(&mut app, "Amir", StudentCategory::TierB);

    assert_eq!(grid_names(&app), vec!["Amir", "Zoé"]);
    let grid = app.sink().last_student_grid().unwrap();
    assert_eq!(grid.handle_at(0), Some(ItemHandle::student(1)));
    assert_eq!(grid.handle_at(1), Some(ItemHandle::student(0)));
    assert_eq!(
        app.sink().input_requests,
        vec![
            InputRequest::StudentName,
            InputRequest::StudentCategory {
                name: "Zoé".to_string()
            },
            InputRequest::StudentName,
            InputRequest::StudentCategory {
                name: "Amir".to_string()
            },
        ]
    );
    assert_eq!(
        app.roster().students()[1].category,
        Some(StudentCategory::TierB)
    );
}

#[test]
fn activities_render_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let mut app = open_app(&conn);
    add_student(&mut app, "Zoé", StudentCategory::TierA);
    app.handle_event(UiEvent::ItemTapped(ItemHandle::student(0)));

    for name in ["Puzzle", "Chant", "Dessin"] {
        add_activity(&mut app, name);
    }

    assert_eq!(app.screen(), Screen::Student(0));
    assert!(app.sink().student_visible);
    assert_eq!(activity_names(&app), vec!["Dessin", "Chant", "Puzzle"]);
    let list = app.sink().last_activity_list().unwrap();
    assert_eq!(list.handle_at(0), Some(ItemHandle::activity(2)));
    assert_eq!(list.student_name, "Zoé");
}

#[test]
fn blank_name_reports_a_notice_and_adds_nothing() {
    let conn = open_db_in_memory().unwrap();
    let mut app = open_app(&conn);

    app.handle_event(UiEvent::AddStudentTapped);
    app.handle_event(UiEvent::InputSubmitted("   ".to_string()));

    assert_eq!(app.sink().notices, vec![Notice::NameRequired]);
    assert_eq!(app.input_flow(), &InputFlow::Idle);
    assert!(app.roster().students().is_empty());
}

#[test]
fn cancelling_the_category_step_aborts_the_add() {
    let conn = open_db_in_memory().unwrap();
    let mut app = open_app(&conn);

    app.handle_event(UiEvent::AddStudentTapped);
    app.handle_event(UiEvent::InputSubmitted("Zoé".to_string()));
    app.handle_event(UiEvent::InputCancelled);

    assert!(app.roster().students().is_empty());
    assert_eq!(app.input_flow(), &InputFlow::Idle);
}

#[test]
fn untagged_config_adds_student_straight_from_the_name() {
    let conn = open_db_in_memory().unwrap();
    let config = RosterConfig {
        category_tagging: false,
        ..RosterConfig::default()
    };
    let mut app = open_app_with(&conn, config);

    app.handle_event(UiEvent::AddStudentTapped);
    app.handle_event(UiEvent::InputSubmitted("Zoé".to_string()));

    assert_eq!(app.roster().students(), &[Student::new("Zoé", None)]);
}

#[test]
fn multi_select_commit_removes_selected_students() {
    let conn = open_db_in_memory().unwrap();
    let mut app = open_app(&conn);
    for name in ["Léa", "Marc", "Nina"] {
        add_student(&mut app, name, StudentCategory::TierA);
    }

    app.handle_event(UiEvent::DeleteToggleTapped(Collection::Students));
    let grid = app.sink().last_student_grid().unwrap();
    assert_eq!(grid.delete_toggle, DeleteToggle::Validate);
    assert!(grid.cards().all(|card| card.delete_mode));

    app.handle_event(UiEvent::ItemTapped(ItemHandle::student(0)));
    app.handle_event(UiEvent::ItemTapped(ItemHandle::student(2)));
    // Add tile is inert while selecting.
    app.handle_event(UiEvent::AddStudentTapped);
    assert_eq!(app.input_flow(), &InputFlow::Idle);

    app.handle_event(UiEvent::DeleteToggleTapped(Collection::Students));

    assert_eq!(grid_names(&app), vec!["Marc"]);
    let grid = app.sink().last_student_grid().unwrap();
    assert_eq!(grid.delete_toggle, DeleteToggle::Edit);
    assert_eq!(grid.handle_at(0), Some(ItemHandle::student(0)));
    assert!(!app.controller().is_selecting(Collection::Students));
}

#[test]
fn validating_an_empty_selection_leaves_delete_mode() {
    let conn = open_db_in_memory().unwrap();
    let mut app = open_app(&conn);
    add_student(&mut app, "Léa", StudentCategory::TierA);

    app.handle_event(UiEvent::DeleteToggleTapped(Collection::Students));
    app.handle_event(UiEvent::DeleteToggleTapped(Collection::Students));

    assert!(!app.controller().is_selecting(Collection::Students));
    assert_eq!(grid_names(&app), vec!["Léa"]);
}

#[test]
fn handle_captured_before_rename_still_targets_its_student() {
    let conn = open_db_in_memory().unwrap();
    let mut app = open_app(&conn);
    add_student(&mut app, "Bruno", StudentCategory::TierA);
    add_student(&mut app, "Camille", StudentCategory::TierB);
    let handle = app.sink().last_student_grid().unwrap().handle_at(0).unwrap();
    assert_eq!(handle, ItemHandle::student(0));

    // Moves Bruno to the end of the sorted grid.
    app.rename_student(0, "Yves");
    assert_eq!(grid_names(&app), vec!["Camille", "Yves"]);

    app.handle_event(UiEvent::ItemTapped(handle));
    assert_eq!(app.screen(), Screen::Student(0));
    assert_eq!(app.sink().last_activity_list().unwrap().student_name, "Yves");
}

#[test]
fn short_press_toggles_and_long_press_asks_to_delete() {
    let conn = open_db_in_memory().unwrap();
    let mut app = open_app(&conn);
    add_student(&mut app, "Zoé", StudentCategory::TierA);
    app.handle_event(UiEvent::ItemTapped(ItemHandle::student(0)));
    for name in ["Puzzle", "Chant", "Dessin"] {
        add_activity(&mut app, name);
    }
    app.handle_event(UiEvent::ItemTapped(ItemHandle::activity(2)));

    press(&mut app, ItemHandle::activity(0), 1_000, 1_120);
    assert_eq!(app.roster().students()[0].state_for(0), EvaluationState::new(1));
    assert!(app.sink().confirmations.is_empty());

    app.pointer(
        ItemHandle::activity(1),
        PointerEvent::Down {
            at_ms: 2_000,
            position: Point::new(5.0, 5.0),
        },
    );
    assert_eq!(app.next_deadline_ms(), Some(2_800));
    app.tick(2_799);
    assert!(app.sink().confirmations.is_empty());
    app.tick(2_800);
    assert_eq!(
        app.sink().confirmations,
        vec![ConfirmationRequest {
            handle: ItemHandle::activity(1),
            entity_name: "Chant".to_string(),
        }]
    );
    // The release after a fired hold is not a tap.
    app.pointer(ItemHandle::activity(1), PointerEvent::Up { at_ms: 2_900 });
    assert_eq!(app.roster().students()[0].state_for(1), None);

    app.handle_event(UiEvent::ConfirmationAnswered(true));

    assert_eq!(
        app.roster().activities(),
        &[Activity::new("Puzzle"), Activity::new("Dessin")]
    );
    let student = &app.roster().students()[0];
    assert_eq!(student.state_for(0), EvaluationState::new(1));
    assert_eq!(student.state_for(1), EvaluationState::new(1));
    assert_eq!(activity_names(&app), vec!["Dessin", "Puzzle"]);
}

#[test]
fn moving_past_the_slop_turns_a_hold_into_a_tap() {
    let conn = open_db_in_memory().unwrap();
    let mut app = open_app(&conn);
    add_student(&mut app, "Zoé", StudentCategory::TierA);

    let handle = ItemHandle::student(0);
    app.pointer(
        handle,
        PointerEvent::Down {
            at_ms: 0,
            position: Point::new(0.0, 0.0),
        },
    );
    app.pointer(
        handle,
        PointerEvent::Move {
            at_ms: 100,
            position: Point::new(30.0, 0.0),
        },
    );
    app.tick(900);
    app.pointer(handle, PointerEvent::Up { at_ms: 950 });

    assert!(app.sink().confirmations.is_empty());
    assert_eq!(app.screen(), Screen::Student(0));
}

#[test]
fn declined_confirmation_keeps_the_student() {
    let conn = open_db_in_memory().unwrap();
    let mut app = open_app(&conn);
    add_student(&mut app, "Zoé", StudentCategory::TierA);

    app.handle_event(UiEvent::ItemLongPressed(ItemHandle::student(0)));
    // Other input waits for the answer.
    app.handle_event(UiEvent::ItemTapped(ItemHandle::student(0)));
    assert_eq!(app.screen(), Screen::Main);

    app.handle_event(UiEvent::ConfirmationAnswered(false));
    assert_eq!(app.roster().students().len(), 1);
    assert!(app.controller().pending_confirmation().is_none());
}

#[test]
fn confirmed_student_delete_renumbers_the_rest() {
    let conn = open_db_in_memory().unwrap();
    let mut app = open_app(&conn);
    add_student(&mut app, "Léa", StudentCategory::TierA);
    add_student(&mut app, "Marc", StudentCategory::TierA);

    app.handle_event(UiEvent::ItemLongPressed(ItemHandle::student(0)));
    app.handle_event(UiEvent::ConfirmationAnswered(true));

    assert_eq!(grid_names(&app), vec!["Marc"]);
    app.handle_event(UiEvent::ItemTapped(ItemHandle::student(0)));
    assert_eq!(app.sink().last_activity_list().unwrap().student_name, "Marc");
}

#[test]
fn going_back_discards_an_activity_selection() {
    let conn = open_db_in_memory().unwrap();
    let mut app = open_app(&conn);
    add_student(&mut app, "Zoé", StudentCategory::TierA);
    app.handle_event(UiEvent::ItemTapped(ItemHandle::student(0)));
    add_activity(&mut app, "Puzzle");

    app.handle_event(UiEvent::DeleteToggleTapped(Collection::Activities));
    app.handle_event(UiEvent::ItemTapped(ItemHandle::activity(0)));
    app.handle_event(UiEvent::BackTapped);

    assert_eq!(app.screen(), Screen::Main);
    assert!(!app.controller().is_selecting(Collection::Activities));
    assert_eq!(app.roster().activities().len(), 1);
    assert!(app.sink().main_visible);
    assert!(!app.sink().student_visible);
}

#[test]
fn reopening_restores_the_saved_roster() {
    let conn = open_db_in_memory().unwrap();
    {
        let mut app = open_app(&conn);
        add_student(&mut app, "Zoé", StudentCategory::TierB);
        app.handle_event(UiEvent::ItemTapped(ItemHandle::student(0)));
        add_activity(&mut app, "Puzzle");
        app.handle_event(UiEvent::ItemTapped(ItemHandle::activity(0)));
    }

    let app = open_app(&conn);
    assert_eq!(grid_names(&app), vec!["Zoé"]);
    assert_eq!(app.roster().students()[0].state_for(0), EvaluationState::new(1));
}

struct FailingRepo {
    saves: RefCell<usize>,
}

impl RosterRepository for FailingRepo {
    fn load(&self) -> RepoResult<RosterSnapshot> {
        Ok(RosterSnapshot::default())
    }

    fn save(&self, _students: &[Student], _activities: &[Activity]) -> RepoResult<()> {
        *self.saves.borrow_mut() += 1;
        Err(RepoError::UninitializedConnection {
            expected_version: 1,
            actual_version: 0,
        })
    }
}

#[test]
fn failed_save_keeps_the_change_and_notifies() {
    let repo = FailingRepo {
        saves: RefCell::new(0),
    };
    let mut app = RosterApp::open(repo, MemorySink::new(), RosterConfig::default()).unwrap();

    add_student(&mut app, "Zoé", StudentCategory::TierA);

    assert_eq!(*app.service().repository().saves.borrow(), 1);
    assert_eq!(grid_names(&app), vec!["Zoé"]);
    assert!(matches!(
        app.sink().notices.as_slice(),
        [Notice::PersistenceFailed { .. }]
    ));
}
