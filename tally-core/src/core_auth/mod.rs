//! Credential checks
//!
//! Callers present a SHA-512 hex digest as a bearer token. Standard
//! callers derive it from their identity fields and a fixed salt; the
//! administrator derives it from the current hour, so admin tokens
//! expire on the next wall-clock hour.

use chrono::{DateTime, Local};
use sha2::{Digest, Sha512};

/// Login that receives administrative treatment
pub const ADMIN_LOGIN: &str = "admin";

/// Salt mixed into standard-caller digests
pub const SALT: &str = "Otus";

/// Salt mixed into the time-based admin digest
pub const ADMIN_SALT: &str = "42";

/// Caller role, derived once per request from the login
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Standard,
}

impl Role {
    pub fn from_login(login: &str) -> Self {
        if login == ADMIN_LOGIN {
            Role::Admin
        } else {
            Role::Standard
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

fn sha512_hex(input: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Digest expected from the administrator at the given instant: the local
/// timestamp truncated to the hour, concatenated with the admin salt
pub fn admin_digest(at: DateTime<Local>) -> String {
    sha512_hex(&format!("{}{}", at.format("%Y%m%d%H"), ADMIN_SALT))
}

/// Digest expected from a standard caller: account (empty when absent),
/// login, and the fixed salt
pub fn user_digest(account: Option<&str>, login: &str) -> String {
    sha512_hex(&format!("{}{}{}", account.unwrap_or(""), login, SALT))
}

/// Compare the supplied token against the digest expected for these
/// identity fields. Case-sensitive, exact. Pure apart from reading the
/// wall clock for admin callers.
pub fn check_auth(role: Role, account: Option<&str>, login: &str, token: &str) -> bool {
    let expected = match role {
        Role::Admin => admin_digest(Local::now()),
        Role::Standard => user_digest(account, login),
    };
    expected == token
}
