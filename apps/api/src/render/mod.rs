//! Template rendering: fills a stored template with resume data and, for the
//! editor route, wraps the result in the editor shell.

pub mod fill;
pub mod handlers;
pub mod shell;
