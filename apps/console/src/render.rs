use std::fmt::Write;

use client_core::{ClockStatus, Notice, NoticeSeverity, TaskListView};
use shared::domain::Task;

const NO_TIME: &str = "--:--:--";

pub fn render_view(view: &TaskListView) -> String {
    let mut out = String::new();
    if !view.loaded {
        out.push_str("(loading tasks)\n");
    } else if view.tasks.is_empty() {
        out.push_str("(no tasks)\n");
    }
    for (pos, task) in view.tasks.iter().enumerate() {
        let mark = if task.completed { 'x' } else { ' ' };
        let _ = writeln!(out, "{:>3}. [{mark}] {}", pos + 1, task.title);
    }
    if view.pending_submission() {
        out.push_str("     adding...\n");
    }
    out
}

/// Re-renders the view only when something visible changed.
#[derive(Debug, Default)]
pub struct ViewPrinter {
    shown: Option<(bool, bool, Vec<Task>)>,
}

impl ViewPrinter {
    pub fn update(&mut self, view: &TaskListView) -> Option<String> {
        let key = (view.loaded, view.pending_submission(), view.tasks.clone());
        if self.shown.as_ref() == Some(&key) {
            return None;
        }
        self.shown = Some(key);
        Some(render_view(view))
    }
}

pub fn render_clock(value: Option<&str>) -> String {
    format!("server time {}", value.unwrap_or(NO_TIME))
}

pub fn render_status(status: ClockStatus) -> &'static str {
    match status {
        ClockStatus::Connecting => "clock: connecting",
        ClockStatus::Connected => "clock: live",
        ClockStatus::Disconnected => "clock: disconnected",
    }
}

pub fn render_notice(notice: &Notice) -> String {
    let tag = match notice.severity {
        NoticeSeverity::Info => "note",
        NoticeSeverity::Warning => "warning",
    };
    format!("{tag}: {}", notice.message)
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
