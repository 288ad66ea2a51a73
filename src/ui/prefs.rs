use iced::widget::{button, checkbox, column, container, pick_list, row, scrollable, text, text_input};
use iced::{Alignment, Element, Length};

use crate::state::settings::{BarflyMode, MidiProgramChoice, PageNumbering, Settings};
use crate::Message;

/// One edit made in the preferences panel
#[derive(Debug, Clone, PartialEq)]
pub enum PrefChange {
    DarkTheme(bool),
    ShowErrors(bool),
    PageNumbering(PageNumbering),
    FmtFile(Option<String>),
    Abcm2psPath(String),
    BarflyMode(BarflyMode),
    MidiProgram(MidiProgramChoice),
    Abc2midiPath(String),
    AlwaysAsk(bool),
}

impl PrefChange {
    /// Typing in a path field. Drafts are kept in memory and only
    /// written out when the field is submitted or the panel closes.
    pub fn is_draft(&self) -> bool {
        matches!(self, PrefChange::Abcm2psPath(_) | PrefChange::Abc2midiPath(_))
    }

    pub fn apply(self, settings: &mut Settings) {
        match self {
            PrefChange::DarkTheme(on) => settings.dark_theme = on,
            PrefChange::ShowErrors(on) => settings.abcm2ps_show_errors = on,
            PrefChange::PageNumbering(mode) => settings.abcm2ps_page_numbering = mode,
            PrefChange::FmtFile(path) => settings.abcm2ps_fmt_file_path = path.unwrap_or_default(),
            PrefChange::Abcm2psPath(path) => settings.abcm2ps_path = path,
            PrefChange::BarflyMode(mode) => settings.abc2midi_barfly_mode = mode,
            PrefChange::MidiProgram(choice) => settings.abc2midi_midi_program = choice.0,
            PrefChange::Abc2midiPath(path) => settings.abc2midi_path = path,
            PrefChange::AlwaysAsk(on) => settings.file_launcher_always_ask = on,
        }
    }
}

fn pref(change: PrefChange) -> Message {
    Message::Preference(change)
}

fn section<'a>(title: &'a str, rows: Vec<Element<'a, Message>>) -> Element<'a, Message> {
    column![text(title).size(16), column(rows).spacing(10)]
        .spacing(8)
        .into()
}

fn labelled<'a>(label: &'a str, control: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    row![text(label).width(Length::Fixed(140.0)), control.into()]
        .spacing(10)
        .align_y(Alignment::Center)
        .into()
}

/// Preferences panel bound to `settings`
pub fn view(settings: &Settings) -> Element<'_, Message> {
    let general = section(
        "General",
        vec![
            checkbox("Dark theme", settings.dark_theme)
                .on_toggle(|on| pref(PrefChange::DarkTheme(on)))
                .into(),
            checkbox("Always ask which application opens results", settings.file_launcher_always_ask)
                .on_toggle(|on| pref(PrefChange::AlwaysAsk(on)))
                .into(),
        ],
    );

    let fmt_label = if settings.abcm2ps_fmt_file_path.is_empty() {
        "None"
    } else {
        settings.abcm2ps_fmt_file_path.as_str()
    };

    let abcm2ps = section(
        "Engraving (abcm2ps)",
        vec![
            checkbox("Mark errors in the score", settings.abcm2ps_show_errors)
                .on_toggle(|on| pref(PrefChange::ShowErrors(on)))
                .into(),
            labelled(
                "Page numbers",
                pick_list(
                    &PageNumbering::ALL[..],
                    Some(settings.abcm2ps_page_numbering),
                    |mode| pref(PrefChange::PageNumbering(mode)),
                ),
            ),
            labelled(
                "Format file",
                row![
                    text(fmt_label).width(Length::Fill),
                    button("Choose").on_press(Message::ChooseFmtFile),
                    button("Clear")
                        .style(button::secondary)
                        .on_press(pref(PrefChange::FmtFile(None))),
                ]
                .spacing(6)
                .align_y(Alignment::Center),
            ),
            labelled(
                "Executable",
                text_input("abcm2ps", &settings.abcm2ps_path)
                    .on_input(|path| pref(PrefChange::Abcm2psPath(path)))
                    .on_submit(Message::CommitPreferences),
            ),
        ],
    );

    let abc2midi = section(
        "Playback (abc2midi)",
        vec![
            labelled(
                "Barfly mode",
                pick_list(
                    &BarflyMode::ALL[..],
                    Some(settings.abc2midi_barfly_mode),
                    |mode| pref(PrefChange::BarflyMode(mode)),
                ),
            ),
            labelled(
                "MIDI program",
                pick_list(
                    MidiProgramChoice::all(),
                    Some(MidiProgramChoice(settings.abc2midi_midi_program)),
                    |choice| pref(PrefChange::MidiProgram(choice)),
                ),
            ),
            labelled(
                "Executable",
                text_input("abc2midi", &settings.abc2midi_path)
                    .on_input(|path| pref(PrefChange::Abc2midiPath(path)))
                    .on_submit(Message::CommitPreferences),
            ),
        ],
    );

    container(scrollable(
        column![text("Preferences").size(18), general, abcm2ps, abc2midi]
            .spacing(20)
            .padding(4),
    ))
    .padding(12)
    .width(Length::Fixed(380.0))
    .height(Length::Fill)
    .style(container::bordered_box)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_changes() {
        let mut settings = Settings::default();

        PrefChange::MidiProgram(MidiProgramChoice(19)).apply(&mut settings);
        assert_eq!(settings.midi_program(), Some(19));

        PrefChange::FmtFile(Some("session.fmt".into())).apply(&mut settings);
        assert_eq!(settings.abcm2ps_fmt_file_path, "session.fmt");
        PrefChange::FmtFile(None).apply(&mut settings);
        assert_eq!(settings.fmt_file(), None);

        PrefChange::BarflyMode(BarflyMode::Mode1).apply(&mut settings);
        assert_eq!(settings.abc2midi_barfly_mode.as_arg(), Some("1"));

        PrefChange::Abc2midiPath("/opt/abc/bin/abc2midi".into()).apply(&mut settings);
        assert_eq!(settings.abc2midi_path, "/opt/abc/bin/abc2midi");
    }

    #[test]
    fn test_only_path_typing_is_a_draft() {
        assert!(PrefChange::Abcm2psPath("abcm2ps".into()).is_draft());
        assert!(PrefChange::Abc2midiPath("abc2midi".into()).is_draft());
        assert!(!PrefChange::DarkTheme(true).is_draft());
        assert!(!PrefChange::FmtFile(None).is_draft());
        assert!(!PrefChange::MidiProgram(MidiProgramChoice(0)).is_draft());
    }

    #[test]
    fn test_midi_program_labels() {
        assert_eq!(MidiProgramChoice(0).to_string(), "0");
        assert_eq!(MidiProgramChoice(128).to_string(), "None");
        assert_eq!(MidiProgramChoice::all().len(), 129);
    }
}
