//! Chat message handling - records history and answers mentions.

mod handler;

pub use handler::handle_message;
