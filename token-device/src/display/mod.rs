//! Character display abstraction.
//!
//! The runtime only needs to put text on a row, flush it, and switch an
//! auxiliary indicator (the backlight on the lab hardware). Bus addressing,
//! cursor commands and controller bring-up belong to the implementation.
//!
//! # Design
//!
//! - `begin()` brings the display up; failure is fatal for the device
//! - `write_line()` replaces one row with exactly [`DISPLAY_COLUMNS`] characters
//! - `flush()` pushes buffered rows out, if the implementation buffers
//! - `set_indicator()` switches the indicator

mod mock;

pub use mock::MockDisplay;

use std::fmt;
use thiserror::Error;
use token_types::constants::DISPLAY_COLUMNS;

/// Display errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    /// Nothing answered at any probed address.
    #[error("no display responded")]
    NotFound,

    /// A bus or terminal write failed.
    #[error("display write failed: {0}")]
    WriteFailed(String),
}

/// Display row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Row {
    /// Status row: sync state and elapsed time.
    Top,
    /// Token row.
    Bottom,
}

impl Row {
    /// Both rows, top first.
    pub const ALL: [Row; 2] = [Row::Top, Row::Bottom];

    /// Zero-based row number.
    pub fn index(&self) -> usize {
        match self {
            Self::Top => 0,
            Self::Bottom => 1,
        }
    }
}

/// One row of text, exactly [`DISPLAY_COLUMNS`] characters wide.
///
/// Longer text is cut, shorter text is padded with spaces so stale
/// characters from a previous write are overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayLine(String);

impl DisplayLine {
    /// Fit `text` to the display width.
    pub fn new(text: &str) -> Self {
        let mut line: String = text.chars().take(DISPLAY_COLUMNS).collect();
        let len = line.chars().count();
        line.extend(std::iter::repeat(' ').take(DISPLAY_COLUMNS - len));
        Self(line)
    }

    /// The padded text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A two-row character display.
pub trait Display {
    /// Bring the display up.
    fn begin(&mut self) -> Result<(), DisplayError>;

    /// Replace the text of one row.
    fn write_line(&mut self, row: Row, line: &DisplayLine) -> Result<(), DisplayError>;

    /// Push pending writes out.
    fn flush(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    /// Switch the indicator (backlight) on or off.
    fn set_indicator(&mut self, on: bool) -> Result<(), DisplayError>;
}

impl<D: Display + ?Sized> Display for &mut D {
    fn begin(&mut self) -> Result<(), DisplayError> {
        (**self).begin()
    }

    fn write_line(&mut self, row: Row, line: &DisplayLine) -> Result<(), DisplayError> {
        (**self).write_line(row, line)
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        (**self).flush()
    }

    fn set_indicator(&mut self, on: bool) -> Result<(), DisplayError> {
        (**self).set_indicator(on)
    }
}
