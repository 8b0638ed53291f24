use std::io::{self, Stdout, Write};
use std::time::Duration;
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use parking_lot::Mutex;
use crate::core::{FileResultRecord, ProgressState};
use super::{glyph_bar, render_results, ProgressReporter};

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct SpinnerState {
    offsets: ProgressState,
    status: String,
    fraction: f64,
}

/// Single redrawn spinner line showing `done/total`, a glyph bar and the
/// current status. The per-file results block is written to `out` on finish.
pub struct InteractiveReporter<W: Write + Send = Stdout> {
    spinner: ProgressBar,
    state: Mutex<SpinnerState>,
    out: Mutex<W>,
}

impl InteractiveReporter<Stdout> {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.enable_steady_tick(TICK);
        Self::with_parts(spinner, io::stdout())
    }
}

impl Default for InteractiveReporter<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> InteractiveReporter<W> {
    /// Spinner drawn nowhere, results written to `out`.
    pub fn hidden(out: W) -> Self {
        Self::with_parts(ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden()), out)
    }

    fn with_parts(spinner: ProgressBar, out: W) -> Self {
        let spinner_style = ProgressStyle::with_template("{prefix} {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(spinner_style);
        Self {
            spinner,
            state: Mutex::new(SpinnerState::default()),
            out: Mutex::new(out),
        }
    }

    /// Last completeness fraction drawn.
    pub fn fraction(&self) -> f64 {
        self.state.lock().fraction
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn redraw(&self, state: &SpinnerState) {
        self.spinner.set_message(format!(
            "{} {}",
            style(glyph_bar(state.fraction)).cyan(),
            style(&state.status).bold()
        ));
    }
}

impl<W: Write + Send> ProgressReporter for InteractiveReporter<W> {
    fn set_status(&self, text: &str) {
        let mut state = self.state.lock();
        state.status = text.to_string();
        self.redraw(&state);
    }

    fn set_progress(&self, done: usize, total: usize, _file: Option<&str>) {
        let mut state = self.state.lock();
        state.fraction = state.offsets.completeness(done, total);
        self.spinner
            .set_prefix(style(format!("{done}/{total}")).dim().to_string());
        self.redraw(&state);
    }

    fn finish(&self, summary: &str, results: &[FileResultRecord]) {
        self.spinner.finish_and_clear();
        let mut out = self.out.lock();
        let _ = writeln!(
            out,
            "{} {}{}",
            style("✔").green(),
            style(summary).bold(),
            render_results(results)
        );
        let _ = out.flush();
    }

    fn offsets(&self) -> ProgressState {
        self.state.lock().offsets
    }

    fn set_offsets(&self, offsets: ProgressState) {
        self.state.lock().offsets = offsets;
    }
}
