/// MIDI rendering with abc2midi
///
/// Command line:
///     abc2midi <input.abc> -o <output.mid> [-BF 1|2]
///
/// abc2midi can exit with status 0 after printing an error, so a run
/// only counts as successful when the exit status is 0 and no stdout
/// line starts with "Error".

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::process::{self, ToolOutput};
use crate::error::{Error, Result};
use crate::state::settings::{BarflyMode, Settings};

/// abc2midi options for one render
#[derive(Debug, Clone, PartialEq)]
pub struct MidiOptions {
    pub program: String,
    pub barfly: BarflyMode,
}

impl From<&Settings> for MidiOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            program: settings.abc2midi_path.clone(),
            barfly: settings.abc2midi_barfly_mode,
        }
    }
}

/// Build the abc2midi argument list (program name excluded)
pub fn build_args(options: &MidiOptions, input_name: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![input_name.into(), "-o".into(), output.into()];

    if let Some(mode) = options.barfly.as_arg() {
        args.push("-BF".into());
        args.push(mode.into());
    }

    args
}

/// True when stdout carries an error report despite a clean exit
pub fn reports_error(stdout: &str) -> bool {
    stdout.lines().any(|line| line.trim_start().starts_with("Error"))
}

/// A finished MIDI render
#[derive(Debug, Clone)]
pub struct Rendered {
    pub midi: PathBuf,
    pub output: ToolOutput,
}

/// Render `input` to `midi`, running in the input's directory
pub async fn render(input: PathBuf, midi: PathBuf, options: MidiOptions) -> Result<Rendered> {
    let working_dir = input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let input_name = input.file_name().map(Path::new).unwrap_or(&input);
    let args = build_args(&options, input_name, &midi);

    let output = process::run(&options.program, &args, &working_dir).await?;

    if !output.success {
        return Err(Error::ToolFailed {
            tool: options.program,
            status: output.status.clone(),
            output: output.transcript(),
        });
    }
    if reports_error(&output.stdout) {
        tracing::warn!("{} exited cleanly but reported an error", options.program);
        return Err(Error::ToolReportedError {
            tool: options.program,
            output: output.transcript(),
        });
    }

    tracing::info!("🎹 rendered {}", midi.display());
    Ok(Rendered { midi, output })
}
