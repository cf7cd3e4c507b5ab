use std::io::{self, IsTerminal, Write};

use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Submit,
    Abort,
}

/// Restores cooked mode even when reading fails.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Returns `password` when given, otherwise prompts without echo.
/// Piped stdin is read as a plain line.
pub fn read_password(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    if !io::stdin().is_terminal() {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        return Ok(input.trim_end_matches(['\r', '\n']).to_string());
    }

    eprint!("{} ", "Password:".cyan().bold());
    io::stderr().flush()?;

    let mut buffer = String::new();
    let step = {
        let _raw = RawModeGuard::enable()?;
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            match apply_key(&mut buffer, key) {
                Step::Continue => {}
                other => break other,
            }
        }
    };
    eprintln!();

    if step == Step::Abort {
        anyhow::bail!("password prompt cancelled");
    }
    Ok(buffer)
}

fn apply_key(buffer: &mut String, key: KeyEvent) -> Step {
    if key.kind != KeyEventKind::Press {
        return Step::Continue;
    }
    match key.code {
        KeyCode::Enter => Step::Submit,
        KeyCode::Esc => Step::Abort,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Step::Abort,
        KeyCode::Backspace => {
            buffer.pop();
            Step::Continue
        }
        KeyCode::Char(c) => {
            buffer.push(c);
            Step::Continue
        }
        _ => Step::Continue,
    }
}
