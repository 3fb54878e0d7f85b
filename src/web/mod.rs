//! Browser-facing surface: page templates and the HTTP server

pub mod server;
pub mod templates;

pub use server::{router, start_server, FlashcardServer, ServerState};
pub use templates::{include, render_index, HtmlOutput, TemplateError};
