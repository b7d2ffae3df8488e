//! Console front end: colors, validated input, and menus.

pub mod color;
pub mod input;
pub mod menu;

use crate::ssh::{CredentialPrompt, Endpoint};
use color::{paint, Color};

/// Print an error line in red.
pub fn err(message: impl AsRef<str>) {
    println!("{}", paint(Color::Red, message.as_ref()));
}

/// Print an informational line in blue.
pub fn note(message: impl AsRef<str>) {
    println!("{}", paint(Color::Blue, message.as_ref()));
}

/// Password prompt backed by the interactive terminal.
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn password(&mut self, endpoint: &Endpoint, failure: &str) -> Option<String> {
        if !failure.is_empty() {
            err(format!("Connect failed: {}", failure));
        }
        input::prompt_password(&format!("Password for {}: ", endpoint.label()))
    }
}
