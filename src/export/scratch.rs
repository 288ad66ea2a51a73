/// Scratch copies of the tunebook for the external renderers
///
/// Renderers never read the user's file directly. The buffer is written,
/// exactly as it is at the moment of the request, to a fixed file in the
/// cache directory, optionally with a `%%MIDI program` directive after
/// every `K:` header line.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{Error, Result};

/// Name of the scratch copy inside the cache directory
pub const SCRATCH_FILE_NAME: &str = "gabc-scratch.abc";

/// Get the scratch/output cache directory
/// Returns ~/.cache/gabc on Linux (honours XDG_CACHE_HOME)
pub fn cache_dir() -> Result<PathBuf> {
    let mut path = dirs::cache_dir().ok_or(Error::NoCacheDir)?;
    path.push("gabc");

    fs::create_dir_all(&path).map_err(|e| Error::io(&path, e))?;
    Ok(path)
}

fn key_line() -> &'static Regex {
    static KEY_LINE: OnceLock<Regex> = OnceLock::new();
    // CRLF mode keeps a trailing `\r` out of the match
    KEY_LINE.get_or_init(|| Regex::new(r"(?mR)^K:.*$").expect("static regex"))
}

/// Insert `%%MIDI program N` after every `K:` line, using the text's own
/// line ending. `None` returns the text untouched.
pub fn inject_midi_program(text: &str, program: Option<u8>) -> Cow<'_, str> {
    let eol = if text.contains("\r\n") { "\r\n" } else { "\n" };
    match program {
        Some(program) => key_line().replace_all(text, |caps: &Captures| {
            format!("{}{}%%MIDI program {}", &caps[0], eol, program)
        }),
        None => Cow::Borrowed(text),
    }
}

/// Same directory and stem, new extension.
/// Only the final extension is replaced: `a.b.abc` becomes `a.b.ps`.
pub fn swap_extension(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}

/// Write `text` to the scratch file in `dir`
pub async fn write_scratch(dir: &Path, text: &str, midi_program: Option<u8>) -> Result<PathBuf> {
    let path = dir.join(SCRATCH_FILE_NAME);
    let contents = inject_midi_program(text, midi_program);

    tokio::fs::write(&path, contents.as_bytes())
        .await
        .map_err(|e| Error::io(&path, e))?;

    tracing::debug!("scratch file written: {}", path.display());
    Ok(path)
}
