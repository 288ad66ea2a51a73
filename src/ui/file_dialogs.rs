/// Native file choosers
///
/// All choosers are async; a closed dialog comes back as `None`, which
/// callers treat as a no-op.

use rfd::AsyncFileDialog;
use std::path::PathBuf;

use crate::error::Result;
use crate::state::tunebook::save_file;

const ABC_FILTER: (&str, &[&str]) = ("ABC notation", &["abc"]);
const MIDI_FILTER: (&str, &[&str]) = ("MIDI", &["mid", "midi"]);
const FMT_FILTER: (&str, &[&str]) = ("abcm2ps format", &["fmt"]);

fn dialog(title: &str, filter: (&str, &[&str])) -> AsyncFileDialog {
    AsyncFileDialog::new()
        .set_title(title)
        .add_filter(filter.0, filter.1)
}

pub async fn pick_abc(title: &'static str) -> Option<PathBuf> {
    dialog(title, ABC_FILTER)
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

pub async fn pick_fmt_file() -> Option<PathBuf> {
    dialog("Choose abcm2ps Format File", FMT_FILTER)
        .pick_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

pub async fn pick_midi_destination(file_name: String) -> Option<PathBuf> {
    dialog("Export MIDI", MIDI_FILTER)
        .set_file_name(file_name)
        .save_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}

/// Ask where to save, then write `text` there.
/// `Ok(None)` means the user cancelled.
pub async fn save_as(text: String, file_name: String) -> Result<Option<PathBuf>> {
    let Some(handle) = dialog("Save abc File", ABC_FILTER)
        .set_file_name(file_name)
        .save_file()
        .await
    else {
        return Ok(None);
    };

    save_file(handle.path().to_path_buf(), text).await.map(Some)
}
