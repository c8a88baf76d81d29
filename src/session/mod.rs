//! Session, token storage and user-interaction seams.
//!
//! The gateway never owns login state. It reads the current token from a
//! [`TokenStore`], the current workspace from a [`SessionStore`], and talks to
//! the user through [`Notifier`], [`Confirmer`] and [`Reloader`].

mod store;
mod token_store;
mod ui;

pub use store::{LocalSession, SessionError, SessionStore};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
pub use ui::{
    ConfirmOptions, Confirmer, DialogKind, Dismissed, LoggingReloader, Notifier, Reloader,
    TerminalConfirmer, TracingNotifier,
};
