use rfd::AsyncFileDialog;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::error::{Error, Result};

/// How a launch request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launched {
    /// Handed to the platform's default application
    Default(PathBuf),
    /// Opened with an application the user picked
    With { file: PathBuf, app: PathBuf },
    /// The user closed the application chooser
    Cancelled,
}

/// The platform opener for `path`: program and arguments
pub fn opener_command(path: &Path) -> (&'static str, Vec<String>) {
    let file = path.to_string_lossy().into_owned();
    if cfg!(target_os = "macos") {
        ("open", vec![file])
    } else if cfg!(target_os = "windows") {
        ("cmd", vec!["/C".into(), "start".into(), String::new(), file])
    } else {
        ("xdg-open", vec![file])
    }
}

/// Open a rendered file with the desktop's default viewer or player.
/// With `always_ask` the user picks the application first.
pub async fn launch(path: PathBuf, always_ask: bool) -> Result<Launched> {
    if always_ask {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let Some(app) = AsyncFileDialog::new()
            .set_title(format!("Choose an application to open {name}"))
            .pick_file()
            .await
        else {
            return Ok(Launched::Cancelled);
        };
        let app = app.path().to_path_buf();

        Command::new(&app)
            .arg(&path)
            .spawn()
            .map_err(|e| Error::Launch {
                path: path.clone(),
                reason: format!("{}: {}", app.display(), e),
            })?;

        tracing::info!("▶️  opened {} with {}", path.display(), app.display());
        return Ok(Launched::With { file: path, app });
    }

    let (program, args) = opener_command(&path);
    let status = Command::new(program)
        .args(&args)
        .status()
        .await
        .map_err(|e| Error::Launch {
            path: path.clone(),
            reason: format!("{program}: {e}"),
        })?;

    if !status.success() {
        return Err(Error::Launch {
            path,
            reason: format!("{program} exited with {status}"),
        });
    }

    tracing::info!("▶️  opened {}", path.display());
    Ok(Launched::Default(path))
}
