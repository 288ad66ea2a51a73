/// Named window and application actions with their keyboard accelerators
///
/// Buttons, menus and key presses all resolve to a `WinAction`, which the
/// application dispatches through `ActionHandler::activate`.

use iced::keyboard::{Key, Modifiers};
use iced::Task;

use crate::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WinAction {
    Quit,
    About,
    New,
    Open,
    Append,
    Save,
    SaveAs,
    Engrave,
    Play,
    ExportMidi,
    ShowLog,
    Preferences,
}

impl WinAction {
    /// Registered action name
    pub fn name(self) -> &'static str {
        match self {
            WinAction::Quit => "app.quit",
            WinAction::About => "app.about",
            WinAction::New => "win.new",
            WinAction::Open => "win.open",
            WinAction::Append => "win.append",
            WinAction::Save => "win.save",
            WinAction::SaveAs => "win.save-as",
            WinAction::Engrave => "win.engrave",
            WinAction::Play => "win.play",
            WinAction::ExportMidi => "win.export-midi",
            WinAction::ShowLog => "win.show-log",
            WinAction::Preferences => "win.preferences",
        }
    }

    /// Button / menu label
    pub fn label(self) -> &'static str {
        match self {
            WinAction::Quit => "Quit",
            WinAction::About => "About",
            WinAction::New => "New",
            WinAction::Open => "Open",
            WinAction::Append => "Append",
            WinAction::Save => "Save",
            WinAction::SaveAs => "Save As",
            WinAction::Engrave => "Engrave",
            WinAction::Play => "Play",
            WinAction::ExportMidi => "Export MIDI",
            WinAction::ShowLog => "Log",
            WinAction::Preferences => "Preferences",
        }
    }

    /// Human-readable accelerator, for tooltips
    pub fn accelerator(self) -> Option<String> {
        ACCELERATORS
            .iter()
            .find(|(action, _)| *action == self)
            .map(|(_, accel)| {
                let shift = if accel.shift { "Shift+" } else { "" };
                format!("Ctrl+{}{}", shift, accel.key.to_ascii_uppercase())
            })
    }
}

/// Ctrl (Cmd on macOS) plus a letter, optionally with Shift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Accel {
    key: char,
    shift: bool,
}

const fn ctrl(key: char) -> Accel {
    Accel { key, shift: false }
}

const fn ctrl_shift(key: char) -> Accel {
    Accel { key, shift: true }
}

const ACCELERATORS: &[(WinAction, Accel)] = &[
    (WinAction::Quit, ctrl('q')),
    (WinAction::New, ctrl('n')),
    (WinAction::Open, ctrl('o')),
    (WinAction::Save, ctrl('s')),
    (WinAction::SaveAs, ctrl_shift('s')),
    (WinAction::Engrave, ctrl('e')),
    (WinAction::Play, ctrl('p')),
    (WinAction::ShowLog, ctrl('l')),
];

/// Resolve a key press to the action bound to it
pub fn on_key(key: &Key, modifiers: Modifiers) -> Option<WinAction> {
    if !modifiers.command() {
        return None;
    }
    let Key::Character(c) = key else {
        return None;
    };
    let mut chars = c.chars();
    let pressed = chars.next()?.to_ascii_lowercase();
    if chars.next().is_some() {
        return None;
    }

    ACCELERATORS
        .iter()
        .find(|(_, accel)| accel.key == pressed && accel.shift == modifiers.shift())
        .map(|(action, _)| *action)
}

/// Something that can carry out window actions
pub trait ActionHandler {
    fn activate(&mut self, action: WinAction) -> Task<Message>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: &str) -> Key {
        Key::Character(c.into())
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(on_key(&key("o"), Modifiers::COMMAND), Some(WinAction::Open));
        assert_eq!(on_key(&key("e"), Modifiers::COMMAND), Some(WinAction::Engrave));
        assert_eq!(on_key(&key("p"), Modifiers::COMMAND), Some(WinAction::Play));
        assert_eq!(
            on_key(&key("S"), Modifiers::COMMAND | Modifiers::SHIFT),
            Some(WinAction::SaveAs)
        );
        assert_eq!(on_key(&key("s"), Modifiers::COMMAND), Some(WinAction::Save));
    }

    #[test]
    fn test_plain_typing_is_not_a_shortcut() {
        assert_eq!(on_key(&key("o"), Modifiers::empty()), None);
        assert_eq!(on_key(&key("z"), Modifiers::COMMAND), None);
    }

    #[test]
    fn test_accelerator_labels() {
        assert_eq!(WinAction::Engrave.accelerator().as_deref(), Some("Ctrl+E"));
        assert_eq!(WinAction::SaveAs.accelerator().as_deref(), Some("Ctrl+Shift+S"));
        assert_eq!(WinAction::ExportMidi.accelerator(), None);
    }
}
