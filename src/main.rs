use iced::widget::{button, column, container, horizontal_space, row, text, text_editor, tooltip};
use iced::{event, keyboard, window, Alignment, Element, Event, Font, Length, Subscription, Task, Theme};
use std::path::PathBuf;

mod actions;
mod error;
mod export;
mod state;
mod ui;

use actions::{ActionHandler, WinAction};
use error::Error;
use export::launcher::{self, Launched};
use export::{scratch, Engraved, ExportJob, Rendered};
use state::close_gate::{CloseGate, Outcome, Pending, Response};
use state::log::LogSink;
use state::settings::{JsonSettingsStore, Settings, SettingsStore};
use state::tunebook::{self, Revision, Tunebook};
use ui::dialogs::{self, Alert};
use ui::highlight::AbcHighlighter;
use ui::prefs::PrefChange;

/// Side panel next to the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    None,
    Log,
    Preferences,
}

/// Main application state
struct Gabc {
    /// The document being edited
    tunebook: Tunebook,
    /// Where preferences live; exports read a fresh snapshot from it
    store: JsonSettingsStore,
    /// Copy of the settings shown in the preferences panel
    settings: Settings,
    /// Unsaved-changes confirmation flow
    gate: CloseGate,
    /// Renderer output and errors for the log panel
    log: LogSink,
    panel: Panel,
    alert: Option<Alert>,
    show_about: bool,
    /// Status line text
    status: String,
    /// Path-field edits not yet written to the store
    settings_draft: bool,
    /// Last engraving or MIDI file handed to the launcher
    last_output: Option<PathBuf>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Typing, cursor movement, selection in the editor
    Edit(text_editor::Action),
    /// Button, shortcut or menu activation
    Action(WinAction),
    /// Window close button (or Quit) for this window
    CloseRequested(window::Id),
    /// Answer from the "Save Changes?" dialog
    SaveChanges(Response),
    OpenPicked(Option<PathBuf>),
    AppendPicked(Option<PathBuf>),
    FileOpened(Result<(PathBuf, String), Error>),
    FileAppended(Result<(PathBuf, String), Error>),
    /// A save of the tunebook as of `Revision` finished; `None` if the
    /// user cancelled the chooser
    Saved(Result<Option<PathBuf>, Error>, Revision),
    Engraved(Result<Engraved, Error>),
    Played(Result<Rendered, Error>),
    MidiDestinationPicked(Option<PathBuf>),
    MidiExported(Result<Rendered, Error>),
    Launched(Result<Launched, Error>),
    /// Open the last result again
    Relaunch,
    Preference(PrefChange),
    /// Write drafted preferences out (path field submitted)
    CommitPreferences,
    ChooseFmtFile,
    FmtFilePicked(Option<PathBuf>),
    ClearLog,
    DismissAlert,
    DismissAbout,
}

impl Gabc {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let app = Gabc::with_store(JsonSettingsStore::new());
        tracing::info!("🎻 gabc started, settings at {}", app.store.path().display());

        // A file named on the command line is opened straight away
        let startup = match std::env::args_os().nth(1) {
            Some(path) => Task::perform(tunebook::load_file(PathBuf::from(path)), Message::FileOpened),
            None => Task::none(),
        };

        (app, startup)
    }

    fn with_store(store: JsonSettingsStore) -> Self {
        let settings = store.load();
        Gabc {
            tunebook: Tunebook::new(),
            store,
            settings,
            gate: CloseGate::new(),
            log: LogSink::new(),
            panel: Panel::None,
            alert: None,
            show_about: false,
            status: "Ready.".to_string(),
            settings_draft: false,
            last_output: None,
        }
    }

    fn title(&self) -> String {
        self.tunebook.title()
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Edit(action) => {
                self.tunebook.perform(action);
                Task::none()
            }
            Message::Action(action) => self.activate(action),
            Message::CloseRequested(id) => self.guard(Pending::Close(id)),
            Message::SaveChanges(response) => {
                let outcome = self.gate.respond(response);
                self.follow(outcome)
            }
            Message::OpenPicked(Some(path)) => {
                Task::perform(tunebook::load_file(path), Message::FileOpened)
            }
            Message::AppendPicked(Some(path)) => {
                Task::perform(tunebook::load_file(path), Message::FileAppended)
            }
            Message::OpenPicked(None) | Message::AppendPicked(None) => Task::none(),
            Message::FileOpened(result) => {
                match result {
                    Ok((path, contents)) => {
                        self.status = format!("Opened {}", tunebook::display_path(&path, dirs::home_dir().as_deref()));
                        self.tunebook.load(path, &contents);
                    }
                    Err(err) => self.log.error(err.to_string()),
                }
                Task::none()
            }
            Message::FileAppended(result) => {
                match result {
                    Ok((path, contents)) => {
                        self.tunebook.append(&contents);
                        self.log.info(format!("Appended {}", path.display()));
                    }
                    Err(err) => self.log.error(err.to_string()),
                }
                Task::none()
            }
            Message::Saved(result, revision) => {
                let saved = match result {
                    Ok(Some(path)) => {
                        self.status = format!("Saved {}", tunebook::display_path(&path, dirs::home_dir().as_deref()));
                        // Edits made while the write ran keep the tunebook dirty
                        self.tunebook.mark_saved(path, revision)
                    }
                    Ok(None) => false,
                    Err(err) => {
                        self.log.error(err.to_string());
                        false
                    }
                };

                if self.gate.is_saving() {
                    let outcome = self.gate.save_finished(saved);
                    return self.follow(outcome);
                }
                Task::none()
            }
            Message::Engraved(result) => match result {
                Ok(engraved) => {
                    self.log.info(engraved.output.transcript());
                    self.status = "Engraved.".to_string();
                    self.launch(engraved.postscript)
                }
                Err(err) => {
                    self.render_failed("Engraving Failed", &err, err.to_string());
                    Task::none()
                }
            },
            Message::Played(result) => match result {
                Ok(rendered) => {
                    self.log.info(rendered.output.transcript());
                    self.status = "Playing.".to_string();
                    self.launch(rendered.midi)
                }
                Err(err) => {
                    self.render_failed("MIDI Rendering Failed", &err, format!("{err}; see log for details."));
                    Task::none()
                }
            },
            Message::MidiDestinationPicked(Some(destination)) => match self.snapshot() {
                Some(job) => Task::perform(export::export_midi(job, destination), Message::MidiExported),
                None => Task::none(),
            },
            Message::MidiDestinationPicked(None) => Task::none(),
            Message::MidiExported(result) => {
                match result {
                    Ok(rendered) => {
                        self.log.info(rendered.output.transcript());
                        self.log.info(format!("Exported {}", rendered.midi.display()));
                        self.status = format!("Exported {}", rendered.midi.display());
                    }
                    Err(err) => {
                        self.render_failed("MIDI Export Failed", &err, format!("{err}; see log for details."));
                    }
                }
                Task::none()
            }
            Message::Launched(result) => {
                match result {
                    Ok(Launched::Cancelled) => {}
                    Ok(Launched::Default(path)) => self.log.info(format!("Opened {}", path.display())),
                    Ok(Launched::With { file, app }) => {
                        self.log.info(format!("Opened {} with {}", file.display(), app.display()))
                    }
                    Err(err) => self.log.error(err.to_string()),
                }
                Task::none()
            }
            Message::Relaunch => match self.last_output.clone() {
                Some(path) => self.launch(path),
                None => Task::none(),
            },
            Message::Preference(change) => {
                let draft = change.is_draft();
                change.apply(&mut self.settings);
                if draft {
                    self.settings_draft = true;
                } else {
                    self.persist_settings();
                }
                Task::none()
            }
            Message::CommitPreferences => {
                self.commit_settings();
                Task::none()
            }
            Message::ChooseFmtFile => {
                Task::perform(ui::file_dialogs::pick_fmt_file(), Message::FmtFilePicked)
            }
            Message::FmtFilePicked(Some(path)) => {
                let change = PrefChange::FmtFile(Some(path.to_string_lossy().into_owned()));
                change.apply(&mut self.settings);
                self.persist_settings();
                Task::none()
            }
            Message::FmtFilePicked(None) => Task::none(),
            Message::ClearLog => {
                self.log.clear();
                Task::none()
            }
            Message::DismissAlert => {
                self.alert = None;
                Task::none()
            }
            Message::DismissAbout => {
                self.show_about = false;
                Task::none()
            }
        }
    }

    /// Run `pending` through the unsaved-changes gate
    fn guard(&mut self, pending: Pending) -> Task<Message> {
        let outcome = self.gate.request(pending, self.tunebook.is_modified());
        self.follow(outcome)
    }

    fn follow(&mut self, outcome: Outcome) -> Task<Message> {
        match outcome {
            Outcome::Proceed(Pending::Close(id)) => {
                self.commit_settings();
                tracing::info!("closing window");
                window::close(id)
            }
            Outcome::Proceed(Pending::Open) => Task::perform(
                ui::file_dialogs::pick_abc("Open abc File"),
                Message::OpenPicked,
            ),
            Outcome::Proceed(Pending::New) => {
                self.tunebook.clear();
                self.status = "New tunebook.".to_string();
                Task::none()
            }
            Outcome::Save => self.save(false),
            Outcome::Confirm | Outcome::Stay => Task::none(),
        }
    }

    /// Save to the backing file, or ask for one first
    fn save(&self, choose_location: bool) -> Task<Message> {
        let text = self.tunebook.text();
        let revision = self.tunebook.revision();
        match self.tunebook.location() {
            Some(path) if !choose_location => Task::perform(
                tunebook::save_file(path.to_path_buf(), text),
                move |result| Message::Saved(result.map(Some), revision),
            ),
            location => {
                let file_name = location
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "untitled.abc".to_string());
                Task::perform(ui::file_dialogs::save_as(text, file_name), move |result| {
                    Message::Saved(result, revision)
                })
            }
        }
    }

    /// Capture the tunebook and a fresh settings snapshot for an export
    fn snapshot(&mut self) -> Option<ExportJob> {
        match ExportJob::snapshot(&self.tunebook, self.store.load()) {
            Ok(job) => Some(job),
            Err(err) => {
                self.render_failed("Export Failed", &err, err.to_string());
                None
            }
        }
    }

    fn launch(&mut self, path: PathBuf) -> Task<Message> {
        let always_ask = self.store.load().file_launcher_always_ask;
        self.last_output = Some(path.clone());
        Task::perform(launcher::launch(path, always_ask), Message::Launched)
    }

    /// Log a failed render with whatever the tool printed, then alert
    fn render_failed(&mut self, title: &str, err: &Error, body: String) {
        match err {
            Error::ToolFailed { output, .. } | Error::ToolReportedError { output, .. } => {
                self.log.info(output.clone())
            }
            _ => {}
        }
        self.log.error(err.to_string());
        self.status = title.to_string();
        self.alert = Some(Alert::new(title, body));
    }

    fn persist_settings(&mut self) {
        self.settings_draft = false;
        if let Err(err) = self.store.save(&self.settings) {
            self.log.error(err.to_string());
        }
    }

    fn commit_settings(&mut self) {
        if self.settings_draft {
            self.persist_settings();
        }
    }

    fn toggle_panel(&mut self, panel: Panel) {
        if self.panel == Panel::Preferences {
            self.commit_settings();
        }
        self.panel = if self.panel == panel { Panel::None } else { panel };
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            window::close_requests().map(Message::CloseRequested),
            event::listen_with(|event, _status, _window| match event {
                Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) => {
                    actions::on_key(&key, modifiers).map(Message::Action)
                }
                _ => None,
            }),
        ])
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let toolbar = row![
            action_button(WinAction::New),
            action_button(WinAction::Open),
            action_button(WinAction::Append),
            action_button(WinAction::Save),
            action_button(WinAction::SaveAs),
            horizontal_space(),
            action_button(WinAction::Engrave),
            action_button(WinAction::Play),
            action_button(WinAction::ExportMidi),
            horizontal_space(),
            action_button(WinAction::ShowLog),
            action_button(WinAction::Preferences),
            action_button(WinAction::About),
        ]
        .spacing(6)
        .align_y(Alignment::Center);

        let editor = text_editor(self.tunebook.content())
            .placeholder("X:1\nT:\nK:C\n")
            .on_action(Message::Edit)
            .font(Font::MONOSPACE)
            .height(Length::Fill)
            .highlight_with::<AbcHighlighter>((), ui::highlight::to_format);

        let side: Option<Element<Message>> = match self.panel {
            Panel::None => None,
            Panel::Log => Some(ui::log_view::view(&self.log)),
            Panel::Preferences => Some(ui::prefs::view(&self.settings)),
        };

        let body = row![editor].push_maybe(side).spacing(10).height(Length::Fill);

        let status = row![text(&self.status).size(13), horizontal_space()]
            .push_maybe(self.last_output.as_ref().map(|_| {
                button(text("Open Last Result").size(13))
                    .style(button::text)
                    .padding(0)
                    .on_press(Message::Relaunch)
            }))
            .align_y(Alignment::Center);

        let base = container(column![toolbar, body, status].spacing(10))
            .padding(10)
            .width(Length::Fill)
            .height(Length::Fill);

        if self.gate.is_confirming() {
            dialogs::modal(base, dialogs::save_changes(), Message::SaveChanges(Response::Cancel))
        } else if let Some(alert) = &self.alert {
            dialogs::modal(base, dialogs::alert(alert), Message::DismissAlert)
        } else if self.show_about {
            dialogs::modal(base, dialogs::about(), Message::DismissAbout)
        } else {
            base.into()
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        if self.settings.dark_theme {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

impl ActionHandler for Gabc {
    fn activate(&mut self, action: WinAction) -> Task<Message> {
        tracing::debug!("activate {}", action.name());
        match action {
            WinAction::Quit => {
                window::get_latest().and_then(|id| Task::done(Message::CloseRequested(id)))
            }
            WinAction::About => {
                self.show_about = true;
                Task::none()
            }
            WinAction::New => self.guard(Pending::New),
            WinAction::Open => self.guard(Pending::Open),
            WinAction::Append => Task::perform(
                ui::file_dialogs::pick_abc("Append abc File"),
                Message::AppendPicked,
            ),
            WinAction::Save => self.save(false),
            WinAction::SaveAs => self.save(true),
            WinAction::Engrave => match self.snapshot() {
                Some(job) => {
                    self.status = "Engraving…".to_string();
                    Task::perform(export::engrave(job), Message::Engraved)
                }
                None => Task::none(),
            },
            WinAction::Play => match self.snapshot() {
                Some(job) => {
                    self.status = "Rendering MIDI…".to_string();
                    Task::perform(export::play(job), Message::Played)
                }
                None => Task::none(),
            },
            WinAction::ExportMidi => {
                let file_name = self
                    .tunebook
                    .location()
                    .and_then(|p| p.file_name())
                    .map(|n| scratch::swap_extension(n.as_ref(), "mid"))
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "untitled.mid".to_string());
                Task::perform(
                    ui::file_dialogs::pick_midi_destination(file_name),
                    Message::MidiDestinationPicked,
                )
            }
            WinAction::ShowLog => {
                self.toggle_panel(Panel::Log);
                Task::none()
            }
            WinAction::Preferences => {
                self.toggle_panel(Panel::Preferences);
                Task::none()
            }
        }
    }
}

fn action_button(action: WinAction) -> Element<'static, Message> {
    let button = button(text(action.label()).size(14))
        .padding([4, 10])
        .on_press(Message::Action(action));

    match action.accelerator() {
        Some(accel) => tooltip(button, text(accel).size(12), tooltip::Position::Bottom)
            .style(container::rounded_box)
            .into(),
        None => button.into(),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,gabc=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> iced::Result {
    init_tracing();

    iced::application(Gabc::title, Gabc::update, Gabc::view)
        .subscription(Gabc::subscription)
        .theme(Gabc::theme)
        .exit_on_close_request(false)
        .centered()
        .run_with(Gabc::new)
}
