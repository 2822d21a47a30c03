//! Date-derived login for the Fastprint feed.
//!
//! The feed rotates its credentials daily. Both halves are computed from the
//! calendar date with day, month, and two-digit year zero-padded.

use chrono::{Local, NaiveDate};
use md5::{Digest, Md5};

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    /// Lowercase hex MD5 digest, sent as-is.
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn for_date(date: NaiveDate) -> Self {
        let username = format!("tesprogrammer{}C10", date.format("%d%m%y"));
        let plain = format!("bisacoding-{}", date.format("%d-%m-%y"));
        let password = format!("{:x}", Md5::digest(plain.as_bytes()));
        Self { username, password }
    }

    /// Credentials for today in the host's local time zone.
    #[must_use]
    pub fn current() -> Self {
        Self::for_date(Local::now().date_naive())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}
