use std::fmt::Write as _;
use std::sync::Mutex;

use drill_core::model::{MissedFact, ResultMatrix};
use services::session::{MatrixView, Shade};
use services::{Feedback, SessionObserver};

/// Prints session notifications to stdout.
///
/// Keeps the latest grid so the `grid` command can redraw it on demand.
#[derive(Default)]
pub struct TerminalObserver {
    grid: Mutex<Option<MatrixView>>,
}

impl TerminalObserver {
    pub fn render_grid(&self) -> String {
        let guard = match self.grid.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.as_ref().map(render).unwrap_or_default()
    }
}

impl SessionObserver for TerminalObserver {
    fn on_question_changed(&self, first: u8, second: u8) {
        println!();
        println!("  {first} × {second} = ?");
    }

    fn on_tick(&self, seconds_remaining: u32) {
        if (1..=3).contains(&seconds_remaining) {
            println!("  … {seconds_remaining}s");
        }
    }

    fn on_feedback(&self, feedback: &Feedback) {
        let verdict = match (feedback.was_correct, feedback.timed_out()) {
            (true, _) => "correct",
            (false, true) => "time's up",
            (false, false) => "wrong",
        };
        println!("  {verdict}: {}", feedback.equation());
    }

    fn on_matrix_changed(&self, matrix: &ResultMatrix) {
        let view = MatrixView::from_matrix(matrix);
        match self.grid.lock() {
            Ok(mut guard) => *guard = Some(view),
            Err(poisoned) => *poisoned.into_inner() = Some(view),
        }
    }

    fn on_error_list_changed(&self, missed: &[MissedFact]) {
        if missed.is_empty() {
            return;
        }
        let list: Vec<String> = missed.iter().map(MissedFact::equation).collect();
        println!("  to practise: {}", list.join(", "));
    }

    fn on_stopped(&self) {
        println!("  session stopped");
    }
}

fn paint(shade: Shade, text: &str) -> String {
    format!(
        "\x1b[48;2;{};{};{}m\x1b[30m{text}\x1b[0m",
        shade.red, shade.green, shade.blue
    )
}

fn render(view: &MatrixView) -> String {
    let mut out = String::from("     ");
    for column in 1..=view.rows.len() {
        let _ = write!(out, "{column:>6}");
    }
    out.push('\n');

    for (idx, row) in view.rows.iter().enumerate() {
        let _ = write!(out, "{:>4} ", idx + 1);
        for cell in row {
            let text = format!("{:>6}", cell.label());
            match cell.shade() {
                Some(shade) => out.push_str(&paint(shade, &text)),
                None => out.push_str(&text),
            }
        }
        out.push('\n');
    }
    out
}
