//! Terminal stand-ins for the optical hardware.
//!
//! - [`TerminalPulse`] paints a white block as the host's sync pulse
//! - [`TerminalDisplay`] renders the device's two display rows on one
//!   terminal line

use std::io::{self, Write};
use token_device::{Display, DisplayError, DisplayLine, Row};

const WHITE_BG: &str = "\x1b[47m";
const RESET: &str = "\x1b[0m";

/// Renders the light pulse the device's sensor watches for.
pub trait PulseRenderer {
    /// Start showing the pulse. Returns once it is on screen.
    fn show(&mut self) -> io::Result<()>;

    /// Remove the pulse.
    fn hide(&mut self) -> io::Result<()>;
}

/// Paints a solid white block of `width` x `height` cells.
#[derive(Debug)]
pub struct TerminalPulse<W> {
    out: W,
    width: u16,
    height: u16,
    shown: bool,
}

impl<W: Write> TerminalPulse<W> {
    /// Create a pulse renderer writing to `out`.
    pub fn new(out: W, width: u16, height: u16) -> Self {
        Self {
            out,
            width: width.max(1),
            height: height.max(1),
            shown: false,
        }
    }

    /// Consume the renderer and return the writer.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PulseRenderer for TerminalPulse<W> {
    fn show(&mut self) -> io::Result<()> {
        let row = " ".repeat(usize::from(self.width));
        for _ in 0..self.height {
            writeln!(self.out, "{WHITE_BG}{row}{RESET}")?;
        }
        self.out.flush()?;
        self.shown = true;
        Ok(())
    }

    fn hide(&mut self) -> io::Result<()> {
        if !self.shown {
            return Ok(());
        }
        // Cursor up over the block, then clear to end of screen.
        write!(self.out, "\x1b[{}A\x1b[J", self.height)?;
        self.out.flush()?;
        self.shown = false;
        Ok(())
    }
}

/// Shows the device display as `[row 0] [row 1]` on a single rewritten line.
///
/// Output only happens on flush and only when something changed.
#[derive(Debug)]
pub struct TerminalDisplay<W> {
    out: W,
    rows: [DisplayLine; 2],
    indicator: bool,
    dirty: bool,
    begun: bool,
}

impl<W: Write> TerminalDisplay<W> {
    /// Create a display writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            rows: [DisplayLine::new(""), DisplayLine::new("")],
            indicator: false,
            dirty: false,
            begun: false,
        }
    }

    /// Consume the display and return the writer.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Display for TerminalDisplay<W> {
    fn begin(&mut self) -> Result<(), DisplayError> {
        self.out
            .flush()
            .map_err(|e| DisplayError::WriteFailed(e.to_string()))?;
        self.begun = true;
        Ok(())
    }

    fn write_line(&mut self, row: Row, line: &DisplayLine) -> Result<(), DisplayError> {
        if !self.begun {
            return Err(DisplayError::WriteFailed("display not started".into()));
        }
        if self.rows[row.index()] != *line {
            self.rows[row.index()] = line.clone();
            self.dirty = true;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        if !self.dirty {
            return Ok(());
        }
        let mark = if self.indicator { '*' } else { ' ' };
        write!(
            self.out,
            "\r{mark}[{}] [{}]",
            self.rows[Row::Top.index()],
            self.rows[Row::Bottom.index()]
        )
        .and_then(|()| self.out.flush())
        .map_err(|e| DisplayError::WriteFailed(e.to_string()))?;
        self.dirty = false;
        Ok(())
    }

    fn set_indicator(&mut self, on: bool) -> Result<(), DisplayError> {
        if self.indicator != on {
            self.indicator = on;
            self.dirty = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_paints_and_clears_block() {
        let mut pulse = TerminalPulse::new(Vec::new(), 4, 2);
        pulse.show().unwrap();
        pulse.hide().unwrap();
        let out = String::from_utf8(pulse.into_inner()).unwrap();

        assert_eq!(out.matches(WHITE_BG).count(), 2);
        assert!(out.contains("    "));
        assert!(out.ends_with("\x1b[2A\x1b[J"));
    }

    #[test]
    fn hide_without_show_writes_nothing() {
        let mut pulse = TerminalPulse::new(Vec::new(), 4, 2);
        pulse.hide().unwrap();
        assert!(pulse.into_inner().is_empty());
    }

    #[test]
    fn display_renders_on_flush_only_when_changed() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.begin().unwrap();
        display
            .write_line(Row::Top, &DisplayLine::new("SYNC ok  t=   0s"))
            .unwrap();
        display
            .write_line(Row::Bottom, &DisplayLine::new("TOKEN: 855857"))
            .unwrap();
        display.flush().unwrap();
        display.flush().unwrap();

        let out = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(out, "\r [SYNC ok  t=   0s] [TOKEN: 855857   ]");
    }

    #[test]
    fn indicator_is_marked() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.begin().unwrap();
        display.set_indicator(true).unwrap();
        display.flush().unwrap();
        let out = String::from_utf8(display.into_inner()).unwrap();
        assert!(out.starts_with("\r*["));
    }

    #[test]
    fn write_before_begin_fails() {
        let mut display = TerminalDisplay::new(Vec::new());
        assert!(display
            .write_line(Row::Top, &DisplayLine::new("x"))
            .is_err());
    }
}
