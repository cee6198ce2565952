pub mod accounts;
pub mod messages;

pub use accounts::{AccountDraft, AccountService};
pub use messages::{MessageDraft, MessageService};

pub const MIN_PASSWORD_LEN: usize = 4;
pub const MAX_MESSAGE_LEN: usize = 255;

/// Strips ASCII control characters and spaces from both ends. Unicode
/// spacing such as U+3000 counts as content.
pub(crate) fn trim_blank(s: &str) -> &str {
    s.trim_matches(|c: char| c <= ' ')
}
