//! Print the tokens accepted for a window.

use anyhow::Result;
use std::io::Write;
use token_core::{Candidates, Verifier};
use token_types::WindowIndex;

use crate::config::Config;

/// Which window to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum At {
    /// A window index.
    Window(u32),
    /// Seconds since synchronization.
    Elapsed(u64),
}

impl At {
    fn window(self, window_secs: u64) -> WindowIndex {
        match self {
            Self::Window(w) => WindowIndex::new(w),
            Self::Elapsed(secs) => {
                WindowIndex::new(u32::try_from(secs / window_secs).unwrap_or(u32::MAX))
            }
        }
    }
}

/// Run the token command.
pub fn run(config: &Config, at: At, json: bool) -> Result<()> {
    let verifier = Verifier::new(config.secret()?);
    let window = at.window(config.window_secs()?.get());
    let candidates = verifier.candidates(window);

    let stdout = std::io::stdout();
    render(&mut stdout.lock(), &candidates, json)
}

fn render<W: Write>(out: &mut W, candidates: &Candidates, json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(candidates)?)?;
        return Ok(());
    }

    writeln!(out, "Window:   {}", candidates.window)?;
    writeln!(out, "Token:    {}", candidates.current)?;
    writeln!(out, "Previous: {}", candidates.previous)?;
    writeln!(out, "Next:     {}", candidates.next)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use token_types::Secret;

    fn rendered(window: u32, json: bool) -> String {
        let candidates = Verifier::new(Secret::default()).candidates(WindowIndex::new(window));
        let mut out = Vec::new();
        render(&mut out, &candidates, json).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn elapsed_seconds_map_to_window() {
        assert_eq!(At::Elapsed(0).window(30), WindowIndex::new(0));
        assert_eq!(At::Elapsed(29).window(30), WindowIndex::new(0));
        assert_eq!(At::Elapsed(65).window(30), WindowIndex::new(2));
        assert_eq!(At::Window(7).window(30), WindowIndex::new(7));
        assert_eq!(At::Elapsed(u64::MAX).window(1), WindowIndex::new(u32::MAX));
    }

    #[test]
    fn text_output_is_zero_padded() {
        let text = rendered(2, false);
        assert!(text.contains("Window:   #2"));
        assert!(text.contains("Token:    009875"));
        assert!(text.contains("Previous: 746144"));
    }

    #[test]
    fn json_output_lists_candidates() {
        let value: serde_json::Value = serde_json::from_str(&rendered(0, true)).unwrap();
        assert_eq!(value["window"], 0);
        assert_eq!(value["current"], 855857);
        assert_eq!(value["previous"], 855857);
        assert_eq!(value["next"], 746144);
    }
}
