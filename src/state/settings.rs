/// User preferences for the editor and the external renderers
///
/// Settings are stored as JSON, one key per option. Key names match the
/// schema the desktop build has always used (`abcm2ps-show-errors`, ...).
/// Export operations never hold on to a `Settings` value: they ask the
/// `SettingsStore` for a fresh snapshot each time they run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// `abc2midi-midi-program` value meaning "no %%MIDI program directive"
pub const MIDI_PROGRAM_NONE: u8 = 128;

/// abcm2ps `-N` page numbering modes
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageNumbering {
    #[default]
    #[serde(rename = "0")]
    Off,
    #[serde(rename = "1")]
    Left,
    #[serde(rename = "2")]
    Right,
    #[serde(rename = "3")]
    EvenLeftOddRight,
    #[serde(rename = "4")]
    EvenRightOddLeft,
}

impl PageNumbering {
    pub const ALL: [PageNumbering; 5] = [
        PageNumbering::Off,
        PageNumbering::Left,
        PageNumbering::Right,
        PageNumbering::EvenLeftOddRight,
        PageNumbering::EvenRightOddLeft,
    ];

    /// Value passed to `abcm2ps -N`
    pub fn as_arg(self) -> &'static str {
        match self {
            PageNumbering::Off => "0",
            PageNumbering::Left => "1",
            PageNumbering::Right => "2",
            PageNumbering::EvenLeftOddRight => "3",
            PageNumbering::EvenRightOddLeft => "4",
        }
    }
}

impl fmt::Display for PageNumbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PageNumbering::Off => "None",
            PageNumbering::Left => "Left",
            PageNumbering::Right => "Right",
            PageNumbering::EvenLeftOddRight => "Even left, odd right",
            PageNumbering::EvenRightOddLeft => "Even right, odd left",
        };
        f.write_str(label)
    }
}

/// abc2midi barfly compatibility mode
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum BarflyMode {
    #[default]
    Off,
    Mode1,
    Mode2,
}

impl BarflyMode {
    pub const ALL: [BarflyMode; 3] = [BarflyMode::Off, BarflyMode::Mode1, BarflyMode::Mode2];

    /// Value for `abc2midi -BF`, if the flag should be passed at all
    pub fn as_arg(self) -> Option<&'static str> {
        match self {
            BarflyMode::Off => None,
            BarflyMode::Mode1 => Some("1"),
            BarflyMode::Mode2 => Some("2"),
        }
    }
}

impl TryFrom<u8> for BarflyMode {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(BarflyMode::Off),
            1 => Ok(BarflyMode::Mode1),
            2 => Ok(BarflyMode::Mode2),
            other => Err(format!("barfly mode must be 0, 1 or 2, got {other}")),
        }
    }
}

impl From<BarflyMode> for u8 {
    fn from(mode: BarflyMode) -> u8 {
        match mode {
            BarflyMode::Off => 0,
            BarflyMode::Mode1 => 1,
            BarflyMode::Mode2 => 2,
        }
    }
}

impl fmt::Display for BarflyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BarflyMode::Off => f.write_str("Off"),
            BarflyMode::Mode1 => f.write_str("Barfly mode 1"),
            BarflyMode::Mode2 => f.write_str("Barfly mode 2"),
        }
    }
}

/// Entry in the MIDI program pick list (0-127, or 128 for none)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiProgramChoice(pub u8);

impl MidiProgramChoice {
    pub fn all() -> Vec<MidiProgramChoice> {
        (0..=MIDI_PROGRAM_NONE).map(MidiProgramChoice).collect()
    }
}

impl fmt::Display for MidiProgramChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= MIDI_PROGRAM_NONE {
            f.write_str("None")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// All persisted preferences
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Use the dark application theme
    pub dark_theme: bool,

    // ========== abcm2ps ==========
    /// Pass `-i` so abcm2ps marks errors in the output
    pub abcm2ps_show_errors: bool,
    /// Page numbering mode (`-N`)
    pub abcm2ps_page_numbering: PageNumbering,
    /// Format file passed with `-F`; empty means none
    pub abcm2ps_fmt_file_path: String,
    /// Executable to run for engraving
    pub abcm2ps_path: String,

    // ========== abc2midi ==========
    pub abc2midi_barfly_mode: BarflyMode,
    /// Program inserted after each `K:` line; 128 means none
    pub abc2midi_midi_program: u8,
    /// Executable to run for MIDI rendering
    pub abc2midi_path: String,

    /// Always show an application chooser when opening results
    pub file_launcher_always_ask: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_theme: false,
            abcm2ps_show_errors: false,
            abcm2ps_page_numbering: PageNumbering::Off,
            abcm2ps_fmt_file_path: String::new(),
            abcm2ps_path: "abcm2ps".to_string(),
            abc2midi_barfly_mode: BarflyMode::Off,
            abc2midi_midi_program: MIDI_PROGRAM_NONE,
            abc2midi_path: "abc2midi".to_string(),
            file_launcher_always_ask: false,
        }
    }
}

impl Settings {
    /// Convert to JSON string for storage
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// MIDI program to inject, if one is configured
    pub fn midi_program(&self) -> Option<u8> {
        (self.abc2midi_midi_program < MIDI_PROGRAM_NONE).then_some(self.abc2midi_midi_program)
    }

    /// Format file for abcm2ps, if one is configured
    pub fn fmt_file(&self) -> Option<PathBuf> {
        let trimmed = self.abcm2ps_fmt_file_path.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }
}

/// Source of settings snapshots
pub trait SettingsStore {
    /// Read the current settings; unreadable storage yields defaults
    fn load(&self) -> Settings;

    /// Persist the given settings
    fn save(&self, settings: &Settings) -> Result<()>;
}

/// Settings stored as a JSON file in the user's config directory
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    /// Store at the default location:
    /// - Linux: ~/.config/gabc/settings.json
    /// - macOS: ~/Library/Application Support/gabc/settings.json
    /// - Windows: %APPDATA%\gabc\settings.json
    pub fn new() -> Self {
        Self::at(Self::default_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_path() -> PathBuf {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(std::env::temp_dir);

        path.push("gabc");
        path.push("settings.json");
        path
    }
}

impl Default for JsonSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Settings {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
            Err(err) => {
                tracing::warn!("cannot read {}: {}", self.path.display(), err);
                return Settings::default();
            }
        };

        Settings::from_json(&json).unwrap_or_else(|err| {
            tracing::warn!("ignoring {}: {}", self.path.display(), err);
            Settings::default()
        })
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let json = settings.to_json()?;
        std::fs::write(&self.path, json).map_err(|e| Error::io(&self.path, e))?;
        tracing::debug!("settings saved to {}", self.path.display());
        Ok(())
    }
}
