/// Engraving: ABC to PostScript with abcm2ps
///
/// Command line:
///     abcm2ps [-i] [-F <fmt-file>] -N <mode> -O <output.ps> <input.abc>
///
/// The working directory is the folder of the saved tunebook when there
/// is one, so a relative format file resolves next to the user's tunes.
/// Success means exit status 0.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::process::{self, ToolOutput};
use super::scratch::swap_extension;
use crate::error::{Error, Result};
use crate::state::settings::{PageNumbering, Settings};

/// abcm2ps options for one engrave run
#[derive(Debug, Clone, PartialEq)]
pub struct EngraveOptions {
    pub program: String,
    pub show_errors: bool,
    pub fmt_file: Option<PathBuf>,
    pub page_numbering: PageNumbering,
}

impl From<&Settings> for EngraveOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            program: settings.abcm2ps_path.clone(),
            show_errors: settings.abcm2ps_show_errors,
            fmt_file: settings.fmt_file(),
            page_numbering: settings.abcm2ps_page_numbering,
        }
    }
}

/// Build the abcm2ps argument list (program name excluded)
pub fn build_args(options: &EngraveOptions, input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();

    if options.show_errors {
        args.push("-i".into());
    }
    if let Some(fmt) = &options.fmt_file {
        args.push("-F".into());
        args.push(fmt.into());
    }
    args.push("-N".into());
    args.push(options.page_numbering.as_arg().into());
    args.push("-O".into());
    args.push(output.into());
    args.push(input.into());

    args
}

/// A finished engrave
#[derive(Debug, Clone)]
pub struct Engraved {
    pub postscript: PathBuf,
    pub output: ToolOutput,
}

/// Engrave `input` into a `.ps` file next to it
pub async fn engrave(input: PathBuf, working_dir: PathBuf, options: EngraveOptions) -> Result<Engraved> {
    let postscript = swap_extension(&input, "ps");
    let args = build_args(&options, &input, &postscript);

    let output = process::run(&options.program, &args, &working_dir).await?;

    if !output.success {
        return Err(Error::ToolFailed {
            tool: options.program,
            status: output.status.clone(),
            output: output.transcript(),
        });
    }

    tracing::info!("🎼 engraved {}", postscript.display());
    Ok(Engraved { postscript, output })
}
