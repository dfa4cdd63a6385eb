//! HTTP rendering surface for the comparison engine. Handlers only read
//! derived state and call the manager's operations; the manager remains
//! the sole writer of storage and the URL channel.

mod handlers;
mod server;

pub use server::{start, AppState, ServerConfig, ServerHandle};
