//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use bazaar_core::UserSummary;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a notice that needs the user's attention.
pub fn notice(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print the known fields of a user profile.
pub fn user(user: &UserSummary) {
    if let Some(id) = &user.id {
        let id = match id.as_str() {
            Some(s) => s.to_string(),
            None => id.to_string(),
        };
        field("ID", &id);
    }
    if let Some(name) = &user.name {
        field("Name", name);
    }
    if let Some(email) = &user.email {
        field("Email", email);
    }
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
