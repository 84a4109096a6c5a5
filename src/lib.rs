pub mod bot;
pub mod chatbot;
pub mod config;
pub mod error;
pub mod gemini;
pub mod history;
pub mod presence;
pub mod prompt;

pub use bot::run;
