//! User input: validated actions, selections, and prompts.
//!
//! All prompts treat EOF on stdin as a cancel, so piped input and
//! Ctrl-D fall back to the quit/back path of whichever menu is active.

use std::io::{self, BufRead, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use super::color::{paint, Color};
use super::err;

/// An action letter set for one menu. Implementors are small closed
/// enums so every call site matches exhaustively.
pub trait MenuAction: Sized + Copy {
    fn from_letter(letter: char) -> Option<Self>;

    /// Shown when an invalid letter is entered, e.g. `"a, d, s, q"`.
    fn letters() -> &'static str;

    /// The action a cancelled prompt maps to.
    fn quit() -> Self;
}

/// Read one line after a styled prompt. `None` means EOF.
pub fn prompt_line(prompt: &str) -> Option<String> {
    print!("{}", paint(Color::Blue, prompt));
    io::stdout().flush().ok();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        Err(_) => None,
    }
}

/// Read an action letter plus an optional 1-based selection, re-prompting
/// until both are valid for a list of `list_len` items. The returned
/// index is 0-based.
pub fn action_input<A: MenuAction>(list_len: usize) -> (A, Option<usize>) {
    loop {
        let Some(line) = prompt_line("Enter Action: ") else {
            return (A::quit(), None);
        };
        let mut words = line.split_whitespace();
        let Some(letter) = words.next() else {
            continue;
        };

        let action = match parse_letter::<A>(letter) {
            Some(action) => action,
            None => {
                err(format!("Invalid action {} (try {})", letter, A::letters()));
                continue;
            }
        };

        let Some(selection) = words.next() else {
            return (action, None);
        };
        match parse_index(selection, list_len) {
            Ok(index) => return (action, Some(index)),
            Err(msg) => err(msg),
        }
    }
}

/// Like [`action_input`], but the selection may be a list with ranges
/// (`1,3-5`). An omitted selection yields an empty list.
pub fn action_list_input<A: MenuAction>(list_len: usize) -> (A, Vec<usize>) {
    loop {
        let Some(line) = prompt_line("Enter Action: ") else {
            return (A::quit(), Vec::new());
        };
        let mut words = line.split_whitespace();
        let Some(letter) = words.next() else {
            continue;
        };

        let action = match parse_letter::<A>(letter) {
            Some(action) => action,
            None => {
                err(format!("Invalid action {} (try {})", letter, A::letters()));
                continue;
            }
        };

        let Some(selection) = words.next() else {
            return (action, Vec::new());
        };
        match parse_selection(selection, list_len) {
            Ok(indexes) => return (action, indexes),
            Err(msg) => err(msg),
        }
    }
}

/// Read a single 1-based menu selection, returned 0-based. `None` means
/// EOF.
pub fn menu_input(list_len: usize) -> Option<usize> {
    loop {
        let line = prompt_line("Enter Selection: ")?;
        match parse_index(line.trim(), list_len) {
            Ok(index) => return Some(index),
            Err(msg) => err(msg),
        }
    }
}

fn parse_letter<A: MenuAction>(token: &str) -> Option<A> {
    let mut chars = token.chars();
    let letter = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    A::from_letter(letter)
}

/// Parse a 1-based index against `list_len`, returning it 0-based.
fn parse_index(token: &str, list_len: usize) -> Result<usize, String> {
    let value: usize = token
        .parse()
        .map_err(|_| format!("Not a number {}.", token))?;
    if value < 1 || value > list_len {
        return Err(format!("Selection out of range (1 - {}).", list_len));
    }
    Ok(value - 1)
}

/// Parse a selection list like `2` or `1,3-5` against `list_len`,
/// returning 0-based indexes in the order given.
pub fn parse_selection(selection: &str, list_len: usize) -> Result<Vec<usize>, String> {
    let mut indexes = Vec::new();

    for part in selection.split(',') {
        match part.split_once('-') {
            None => {
                let value: usize = part
                    .parse()
                    .map_err(|_| format!("Not a number {}.", part))?;
                check_bounds(value, list_len)?;
                indexes.push(value - 1);
            }
            Some((lo, hi)) => {
                let lo: usize = lo
                    .parse()
                    .map_err(|_| format!("Invalid range {}.", part))?;
                let hi: usize = hi
                    .parse()
                    .map_err(|_| format!("Invalid range {}.", part))?;
                if lo > hi {
                    return Err(format!("Invalid range {}.", part));
                }
                // Both ends are checked before the range is expanded, so
                // an absurd upper bound never allocates.
                check_bounds(lo, list_len)?;
                check_bounds(hi, list_len)?;
                indexes.extend(lo - 1..=hi - 1);
            }
        }
    }

    Ok(indexes)
}

fn check_bounds(value: usize, list_len: usize) -> Result<(), String> {
    if value < 1 || value > list_len {
        return Err(format!(
            "Selection ({}) out of range (1 - {}).",
            value, list_len
        ));
    }
    Ok(())
}

/// Prompt for a password with no echo. `None` means cancelled (Esc or
/// Ctrl-C) or no terminal.
pub fn prompt_password(prompt: &str) -> Option<String> {
    print!("{}", paint(Color::Blue, prompt));
    io::stdout().flush().ok();

    if enable_raw_mode().is_err() {
        return None;
    }
    let mut password = String::new();
    let entered = loop {
        match event::read() {
            Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => match key.code {
                KeyCode::Enter => break Some(password.clone()),
                KeyCode::Esc => break None,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break None,
                KeyCode::Backspace => {
                    password.pop();
                }
                KeyCode::Char(c) => password.push(c),
                _ => {}
            },
            Ok(_) => {}
            Err(_) => break None,
        }
    };
    let _ = disable_raw_mode();
    println!();
    entered
}

/// Prompt for a local directory; rejects paths that are not existing
/// directories.
pub fn prompt_add_dir() -> Option<String> {
    let dir = prompt_line("Directory name: ")?;
    match std::fs::metadata(&dir) {
        Ok(meta) if meta.is_dir() => Some(dir),
        _ => {
            err("Invalid Directory. Could not add.");
            None
        }
    }
}

/// Prompt for a remote directory path; not validated locally.
pub fn prompt_add_remote_dir() -> Option<String> {
    prompt_line("Directory name: ")
}

/// Data gathered for a new remote site.
pub struct NewSite {
    pub name: String,
    pub username: String,
    pub hostname: String,
    pub port: u16,
}

/// Interactive new-site dialog. Username defaults to the local user,
/// port to 22. `None` means cancelled.
pub fn site_data() -> Option<NewSite> {
    let name = prompt_line("Enter the name of the site: ")?;

    let local_user = whoami::username();
    let username = prompt_line(&format!("Enter the username for the site [{}]: ", local_user))?;
    let username = if username.is_empty() { local_user } else { username };

    let hostname = prompt_line("Enter the hostname of the site: ")?;

    let port = loop {
        let entry = prompt_line("Enter the port of the site [22]: ")?;
        if entry.is_empty() {
            break 22;
        }
        match entry.parse::<u16>() {
            Ok(port) => break port,
            Err(_) => err("Not a number."),
        }
    };

    Some(NewSite {
        name,
        username,
        hostname,
        port,
    })
}

/// Ask the user to confirm a destructive action.
pub fn confirm_delete() -> bool {
    loop {
        let Some(resp) = prompt_line("Are you sure you want to delete? [y/n]: ") else {
            return false;
        };
        match resp.to_lowercase().as_str() {
            "y" => return true,
            "n" => return false,
            _ => err("Invalid response."),
        }
    }
}
