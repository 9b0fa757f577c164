//! Progress reporting for long-running transfers.
//!
//! Operations never write to the terminal directly; they call a [`Reporter`]
//! handed in by the caller. [`ConsoleBar`] draws the classic fixed-width bar,
//! [`NoopReporter`] discards everything.

use std::io::{self, Write};

/// Width of the bar between the brackets
pub const BAR_WIDTH: u64 = 50;

/// Number of spaces written to wipe the bar once an operation completes
pub const CLEAR_WIDTH: usize = 80;

/// Receives cumulative progress from a running operation
pub trait Reporter {
    /// `current` bytes out of `total` are done
    fn report(&mut self, current: u64, total: u64);

    /// The operation completed; remove any indicator
    fn finish(&mut self);
}

/// Reporter that ignores all progress
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn report(&mut self, _current: u64, _total: u64) {}

    fn finish(&mut self) {}
}

/// Number of filled cells for `current / total`, capped at [`BAR_WIDTH`].
///
/// A zero total yields an empty bar.
pub fn filled_cells(current: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    let done = (BAR_WIDTH as u128 * current as u128 / total as u128) as u64;
    done.min(BAR_WIDTH)
}

/// Whole percentage of `current / total`, capped at 100. `None` for a zero total.
pub fn percent(current: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let pct = (100 * current as u128 / total as u128).min(100);
    Some(pct as u8)
}

/// Render the bar text, without the trailing carriage return
pub fn render_bar(current: u64, total: u64) -> String {
    let done = filled_cells(current, total) as usize;
    let rest = BAR_WIDTH as usize - done;
    format!("[{}{}]", "=".repeat(done), " ".repeat(rest))
}

/// Terminal progress bar redrawn in place with a carriage return
pub struct ConsoleBar<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleBar<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleBar<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for ConsoleBar<W> {
    fn report(&mut self, current: u64, total: u64) {
        let _ = write!(self.out, "{}\r", render_bar(current, total));
        let _ = self.out.flush();
    }

    fn finish(&mut self) {
        let _ = write!(self.out, "{}\r", " ".repeat(CLEAR_WIDTH));
        let _ = self.out.flush();
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, current: u64, total: u64) {
        (**self).report(current, total)
    }

    fn finish(&mut self) {
        (**self).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_cells() {
        assert_eq!(filled_cells(0, 10), 0);
        assert_eq!(filled_cells(5, 10), 25);
        assert_eq!(filled_cells(10, 10), 50);
        // floor, not round
        assert_eq!(filled_cells(1, 3), 16);
    }

    #[test]
    fn test_zero_total_does_not_divide() {
        assert_eq!(filled_cells(0, 0), 0);
        assert_eq!(filled_cells(7, 0), 0);
        assert_eq!(percent(0, 0), None);
    }

    #[test]
    fn test_overshoot_is_capped() {
        assert_eq!(filled_cells(20, 10), 50);
        assert_eq!(percent(20, 10), Some(100));
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        assert_eq!(filled_cells(u64::MAX, u64::MAX), 50);
        assert_eq!(percent(u64::MAX / 2, u64::MAX), Some(49));
    }

    #[test]
    fn test_render_bar_layout() {
        let bar = render_bar(5, 10);
        assert_eq!(bar.len(), 52);
        assert_eq!(bar, format!("[{}{}]", "=".repeat(25), " ".repeat(25)));
        assert_eq!(render_bar(0, 0), format!("[{}]", " ".repeat(50)));
    }

    #[test]
    fn test_console_bar_output() {
        let mut bar = ConsoleBar::new(Vec::new());
        bar.report(10, 10);
        bar.finish();

        let text = String::from_utf8(bar.into_inner()).unwrap();
        let expected = format!("[{}]\r{}\r", "=".repeat(50), " ".repeat(80));
        assert_eq!(text, expected);
        assert!(!text.contains('\n'));
    }
}
