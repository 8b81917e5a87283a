//! htoprc - settings persistence for htop-compatible process viewers
//!
//! This crate owns the user-tunable configuration of an interactive
//! process viewer: displayed fields, sort order, display toggles, and the
//! two-column meter layout. It resolves the active file among the
//! `HTOPRC` override, the XDG config directory and the legacy `~/.htoprc`
//! dotfile (migrating the latter), parses and rewrites the classic
//! `key=value` format, and performs every file access with effective
//! privilege dropped to the real user.
//!
//! The main entry point is [`Settings::new`], which runs the whole
//! resolve/parse/default chain; [`Settings::write`] persists the current
//! state back atomically.

mod codec;
mod fields;
mod meters;
mod paths;
mod privilege;
mod settings;

pub use codec::{decode_field_id, encode_field_id, LEGACY_FIELD_OFFSET};
pub use fields::*;
pub use meters::*;
pub use paths::*;
pub use privilege::*;
pub use settings::*;
