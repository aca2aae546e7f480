//! Terminal progress bar for package fetches.

use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use sprout_fetch::{ProgressFormat, ProgressMonitor};

/// Single-line progress bar on stderr
pub struct ProgressBar {
    enabled: bool,
    state: Mutex<ProgressState>,
}

struct ProgressState {
    label: String,
    total: usize,
    current: usize,
    format: ProgressFormat,
    start_time: Instant,
    last_update: Option<Instant>,
}

impl ProgressBar {
    /// Draw only when stderr is a terminal
    pub fn detect() -> Self {
        Self::new(io::stderr().is_terminal())
    }

    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            state: Mutex::new(ProgressState {
                label: String::new(),
                total: 0,
                current: 0,
                format: ProgressFormat::Indeterminate,
                start_time: Instant::now(),
                last_update: None,
            }),
        }
    }

    /// Units worked so far
    pub fn current(&self) -> usize {
        self.state.lock().current
    }

    fn display(&self, state: &ProgressState) {
        if !self.enabled {
            return;
        }
        eprint!("\r{}", state.render());
        let _ = io::stderr().flush();
    }
}

impl ProgressState {
    fn render(&self) -> String {
        match self.format {
            ProgressFormat::NOfM => {
                let percentage = if self.total > 0 {
                    (self.current * 100) / self.total
                } else {
                    100
                };
                format!(
                    "{} [{}/{}] {}% ({:.1}s)",
                    self.label,
                    self.current,
                    self.total,
                    percentage,
                    self.start_time.elapsed().as_secs_f64()
                )
            },
            ProgressFormat::Indeterminate => {
                format!("{} ... ({:.1}s)", self.label, self.start_time.elapsed().as_secs_f64())
            },
        }
    }
}

impl ProgressMonitor for ProgressBar {
    fn start(&self, label: &str, total: usize, format: ProgressFormat) {
        let mut state = self.state.lock();
        state.label = label.to_string();
        state.total = total;
        state.current = 0;
        state.format = format;
        state.start_time = Instant::now();
        state.last_update = Some(state.start_time);
        self.display(&state);
    }

    fn worked(&self, units: usize) {
        let mut state = self.state.lock();
        state.current += units;

        // redraw at most every 100ms
        let now = Instant::now();
        let due = state
            .last_update
            .map_or(true, |last| now.duration_since(last) > Duration::from_millis(100));
        if due || state.current >= state.total {
            self.display(&state);
            state.last_update = Some(now);
        }
    }

    fn done(&self) {
        let state = self.state.lock();
        self.display(&state);
        if self.enabled {
            eprintln!();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_work() {
        let bar = ProgressBar::new(false);
        bar.start("Fetching packages", 3, ProgressFormat::NOfM);
        bar.worked(1);
        bar.worked(1);
        assert_eq!(bar.current(), 2);

        let state = bar.state.lock();
        assert!(state.render().starts_with("Fetching packages [2/3] 66%"));
    }

    #[test]
    fn test_indeterminate_render() {
        let bar = ProgressBar::new(false);
        bar.start("Running pub get", 1, ProgressFormat::Indeterminate);
        assert!(bar.state.lock().render().starts_with("Running pub get ..."));
    }

    #[test]
    fn test_empty_batch_is_complete() {
        let bar = ProgressBar::new(false);
        bar.start("Fetching packages", 0, ProgressFormat::NOfM);
        bar.done();
        assert!(bar.state.lock().render().contains("[0/0] 100%"));
    }
}
