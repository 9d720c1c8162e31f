use shared::domain::{Task, TaskId};

use super::*;

fn task(id: &str, title: &str, completed: bool) -> Task {
    Task {
        id: TaskId::new(id),
        title: title.to_string(),
        completed,
    }
}

#[test]
fn unloaded_view_says_so() {
    assert_eq!(render_view(&TaskListView::default()), "(loading tasks)\n");
}

#[test]
fn loaded_empty_view() {
    let view = TaskListView {
        loaded: true,
        ..Default::default()
    };
    assert_eq!(render_view(&view), "(no tasks)\n");
}

#[test]
fn tasks_are_numbered_with_completion_marks() {
    let view = TaskListView {
        tasks: vec![task("1", "Learn Rust", true), task("2", "Write tests", false)],
        pending_submissions: 1,
        loaded: true,
    };
    assert_eq!(
        render_view(&view),
        "  1. [x] Learn Rust\n  2. [ ] Write tests\n     adding...\n"
    );
}

#[test]
fn clock_placeholder_until_first_value() {
    assert_eq!(render_clock(None), "server time --:--:--");
    assert_eq!(render_clock(Some("12:30:05")), "server time 12:30:05");
}

#[test]
fn notices_are_tagged_by_severity() {
    let notice = Notice {
        action: client_core::TaskAction::Delete,
        severity: NoticeSeverity::Info,
        message: "task was already removed".into(),
    };
    assert_eq!(render_notice(&notice), "note: task was already removed");
    assert_eq!(render_status(ClockStatus::Disconnected), "clock: disconnected");
}

#[test]
fn printer_shows_the_view_again_when_a_failed_add_settles() {
    let mut printer = ViewPrinter::default();
    let mut view = TaskListView {
        tasks: vec![task("1", "Learn Rust", false)],
        pending_submissions: 0,
        loaded: true,
    };
    assert!(printer.update(&view).is_some());
    assert_eq!(printer.update(&view), None);

    view.pending_submissions = 1;
    let adding = printer.update(&view).expect("pending shown");
    assert!(adding.contains("adding..."));

    // The add failed: same tasks, flag cleared.
    view.pending_submissions = 0;
    let settled = printer.update(&view).expect("settled view shown");
    assert!(!settled.contains("adding..."));
    assert_eq!(settled, "  1. [ ] Learn Rust\n");
}
