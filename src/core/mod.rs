//! Process lifecycle shared between `main` and the server.

mod state;

pub use state::{is_shutdown, register_server, register_watch, setup_shutdown_handler};
