//! Mock display for testing.
//!
//! Records every write and lets tests force failures. Clones share state,
//! so a test can keep a handle after moving the display into a reporter.

use super::{Display, DisplayError, DisplayLine, Row};
use std::sync::{Arc, Mutex, MutexGuard};

/// Mock display for testing.
#[derive(Debug, Default)]
pub struct MockDisplay {
    inner: Arc<Mutex<MockDisplayInner>>,
}

#[derive(Debug, Default)]
struct MockDisplayInner {
    begun: bool,
    rows: [Option<DisplayLine>; 2],
    writes: Vec<(Row, DisplayLine)>,
    flushes: usize,
    indicator: bool,
    indicator_changes: usize,
    fail_begin: Option<DisplayError>,
    fail_next_write: Option<String>,
}

impl MockDisplay {
    /// Create a new mock display.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockDisplayInner> {
        // A panicking test thread must not hide the recorded state.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make `begin()` fail with the given error.
    pub fn fail_begin(&self, error: DisplayError) {
        self.lock().fail_begin = Some(error);
    }

    /// Make the next `write_line()` fail.
    pub fn fail_next_write(&self, error: &str) {
        self.lock().fail_next_write = Some(error.to_string());
    }

    /// Whether `begin()` succeeded.
    pub fn is_begun(&self) -> bool {
        self.lock().begun
    }

    /// Current text of a row.
    pub fn row(&self, row: Row) -> Option<String> {
        self.lock().rows[row.index()]
            .as_ref()
            .map(|line| line.as_str().to_string())
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> Vec<(Row, DisplayLine)> {
        self.lock().writes.clone()
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.lock().writes.len()
    }

    /// Number of flushes.
    pub fn flush_count(&self) -> usize {
        self.lock().flushes
    }

    /// Current indicator state.
    pub fn indicator(&self) -> bool {
        self.lock().indicator
    }

    /// Number of indicator switches.
    pub fn indicator_changes(&self) -> usize {
        self.lock().indicator_changes
    }

    /// Forget recorded writes and flushes (rows and indicator are kept).
    pub fn clear_log(&self) {
        let mut inner = self.lock();
        inner.writes.clear();
        inner.flushes = 0;
    }
}

impl Clone for MockDisplay {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Display for MockDisplay {
    fn begin(&mut self) -> Result<(), DisplayError> {
        let mut inner = self.lock();
        if let Some(error) = inner.fail_begin.take() {
            return Err(error);
        }
        inner.begun = true;
        Ok(())
    }

    fn write_line(&mut self, row: Row, line: &DisplayLine) -> Result<(), DisplayError> {
        let mut inner = self.lock();
        if !inner.begun {
            return Err(DisplayError::WriteFailed("display not started".into()));
        }
        if let Some(error) = inner.fail_next_write.take() {
            return Err(DisplayError::WriteFailed(error));
        }
        inner.rows[row.index()] = Some(line.clone());
        inner.writes.push((row, line.clone()));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.lock().flushes += 1;
        Ok(())
    }

    fn set_indicator(&mut self, on: bool) -> Result<(), DisplayError> {
        let mut inner = self.lock();
        if inner.indicator != on {
            inner.indicator_changes += 1;
        }
        inner.indicator = on;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_writes_after_begin() {
        let mut display = MockDisplay::new();
        let handle = display.clone();
        display.begin().unwrap();
        display
            .write_line(Row::Bottom, &DisplayLine::new("TOKEN: 000001"))
            .unwrap();

        assert!(handle.is_begun());
        assert_eq!(handle.row(Row::Bottom).as_deref(), Some("TOKEN: 000001   "));
        assert_eq!(handle.row(Row::Top), None);
        assert_eq!(handle.write_count(), 1);
    }

    #[test]
    fn write_before_begin_fails() {
        let mut display = MockDisplay::new();
        let result = display.write_line(Row::Top, &DisplayLine::new("x"));
        assert!(matches!(result, Err(DisplayError::WriteFailed(_))));
    }

    #[test]
    fn forced_begin_failure() {
        let mut display = MockDisplay::new();
        display.fail_begin(DisplayError::NotFound);
        assert_eq!(display.begin(), Err(DisplayError::NotFound));
        assert!(!display.is_begun());
        // Only the next call fails.
        assert!(display.begin().is_ok());
    }

    #[test]
    fn forced_write_failure_is_one_shot() {
        let mut display = MockDisplay::new();
        display.begin().unwrap();
        display.fail_next_write("bus nack");
        let line = DisplayLine::new("x");
        assert_eq!(
            display.write_line(Row::Top, &line),
            Err(DisplayError::WriteFailed("bus nack".into()))
        );
        assert!(display.write_line(Row::Top, &line).is_ok());
    }

    #[test]
    fn indicator_counts_changes_only() {
        let mut display = MockDisplay::new();
        display.set_indicator(true).unwrap();
        display.set_indicator(true).unwrap();
        display.set_indicator(false).unwrap();
        assert!(!display.indicator());
        assert_eq!(display.indicator_changes(), 2);
    }
}
