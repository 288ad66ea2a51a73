/// User interface pieces
///
/// - ABC syntax highlighting for the editor (highlight.rs)
/// - Modal dialogs: save changes, alerts, about (dialogs.rs)
/// - Native file choosers (file_dialogs.rs)
/// - Side panels: log and preferences (log_view.rs, prefs.rs)

pub mod dialogs;
pub mod file_dialogs;
pub mod highlight;
pub mod log_view;
pub mod prefs;
