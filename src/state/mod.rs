/// State management module
///
/// This module holds all application state:
/// - The tunebook document and its file backing (tunebook.rs)
/// - Persisted preferences (settings.rs)
/// - The unsaved-changes confirmation flow (close_gate.rs)
/// - The log panel contents (log.rs)

pub mod close_gate;
pub mod log;
pub mod settings;
pub mod tunebook;
