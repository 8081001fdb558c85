//! Session command handlers.

mod delete_account;
mod logout;

pub use delete_account::{DeleteAccountCommand, DeleteAccountError, DeleteAccountHandler, DeleteAccountResult};
pub use logout::{LogoutHandler, LogoutResult};
