/// Export pipeline
///
/// Each engrave/play/export request works on an `ExportJob`, a snapshot of
/// the tunebook text, its location and the settings at that moment:
/// - Write the scratch copy (scratch.rs)
/// - Run the renderer (abcm2ps.rs, abc2midi.rs via process.rs)
/// - Hand the result to a viewer or player (launcher.rs)

pub mod abc2midi;
pub mod abcm2ps;
pub mod launcher;
pub mod process;
pub mod scratch;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::state::settings::Settings;
use crate::state::tunebook::Tunebook;

pub use abc2midi::Rendered;
pub use abcm2ps::Engraved;

/// Everything one export needs, captured when it was requested
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub text: String,
    pub location: Option<PathBuf>,
    pub settings: Settings,
    pub cache_dir: PathBuf,
}

impl ExportJob {
    /// Snapshot the tunebook with the current settings
    pub fn snapshot(tunebook: &Tunebook, settings: Settings) -> Result<Self> {
        Ok(Self::capture(tunebook, settings, scratch::cache_dir()?))
    }

    /// Snapshot using `cache_dir` for the scratch file and outputs
    pub fn capture(tunebook: &Tunebook, settings: Settings, cache_dir: PathBuf) -> Self {
        Self {
            text: tunebook.text(),
            location: tunebook.location().map(Path::to_path_buf),
            settings,
            cache_dir,
        }
    }

    /// Folder abcm2ps runs in: next to the saved tunebook, else the cache
    pub fn engrave_dir(&self) -> PathBuf {
        self.location
            .as_deref()
            .and_then(Path::parent)
            .filter(|dir| dir.is_dir())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cache_dir.clone())
    }

    async fn write_scratch(&self) -> Result<PathBuf> {
        scratch::write_scratch(&self.cache_dir, &self.text, self.settings.midi_program()).await
    }
}

/// Engrave the tunebook to PostScript
pub async fn engrave(job: ExportJob) -> Result<Engraved> {
    let input = job.write_scratch().await?;
    abcm2ps::engrave(input, job.engrave_dir(), (&job.settings).into()).await
}

/// Render the tunebook to a MIDI file in the cache for playback
pub async fn play(job: ExportJob) -> Result<Rendered> {
    let input = job.write_scratch().await?;
    let midi = scratch::swap_extension(&input, "mid");
    abc2midi::render(input, midi, (&job.settings).into()).await
}

/// Render the tunebook to a MIDI file chosen by the user
pub async fn export_midi(job: ExportJob, destination: PathBuf) -> Result<Rendered> {
    let input = job.write_scratch().await?;
    abc2midi::render(input, destination, (&job.settings).into()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(cache_dir: &Path, location: Option<PathBuf>) -> ExportJob {
        ExportJob {
            text: "X:1\nT:Test\nK:C\nCDEF|".into(),
            location,
            settings: Settings::default(),
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    #[test]
    fn test_engrave_dir_prefers_document_folder() {
        let cache = tempfile::tempdir().unwrap();
        let tunes = tempfile::tempdir().unwrap();

        let saved = job(cache.path(), Some(tunes.path().join("jigs.abc")));
        assert_eq!(saved.engrave_dir(), tunes.path());

        let untitled = job(cache.path(), None);
        assert_eq!(untitled.engrave_dir(), cache.path());

        let vanished = job(cache.path(), Some(PathBuf::from("/no/such/dir/jigs.abc")));
        assert_eq!(vanished.engrave_dir(), cache.path());
    }

    #[cfg(unix)]
    mod pipeline {
        use super::*;
        use crate::error::Error;
        use crate::export::process::fake;

        #[tokio::test]
        async fn test_engrave_minimal_tune() {
            let cache = tempfile::tempdir().unwrap();
            let bin = tempfile::tempdir().unwrap();
            let tool = fake::tool(
                bin.path(),
                "abcm2ps",
                "while [ \"$1\" != \"-O\" ]; do shift; done\ncp \"$3\" \"$2\"",
            );

            let mut job = job(cache.path(), None);
            job.settings.abcm2ps_path = tool.to_string_lossy().into_owned();

            let engraved = engrave(job).await.unwrap();
            assert!(!engraved.postscript.as_os_str().is_empty());
            assert_eq!(engraved.postscript, cache.path().join("gabc-scratch.ps"));
            // The fake copies its input, so this is what abcm2ps was given
            assert_eq!(
                std::fs::read_to_string(&engraved.postscript).unwrap(),
                "X:1\nT:Test\nK:C\nCDEF|"
            );
        }

        #[tokio::test]
        async fn test_play_injects_program_and_renders_in_cache() {
            let cache = tempfile::tempdir().unwrap();
            let bin = tempfile::tempdir().unwrap();
            let tool = fake::tool(bin.path(), "abc2midi", "cat \"$1\"; touch \"$3\"");

            let mut job = job(cache.path(), None);
            job.settings.abc2midi_path = tool.to_string_lossy().into_owned();
            job.settings.abc2midi_midi_program = 73;

            let rendered = play(job).await.unwrap();
            assert_eq!(rendered.midi, cache.path().join("gabc-scratch.mid"));
            assert!(rendered.midi.exists());
            assert!(rendered.output.stdout.contains("K:C\n%%MIDI program 73\nCDEF|"));
        }

        #[tokio::test]
        async fn test_scratch_is_the_loaded_buffer() {
            let cache = tempfile::tempdir().unwrap();
            let bin = tempfile::tempdir().unwrap();
            let tool = fake::tool(bin.path(), "abc2midi", "touch \"$3\"");

            let mut tunebook = Tunebook::new();
            tunebook.load(PathBuf::from("/tunes/dos.abc"), "X:1\r\nT:Test\r\nK:C\r\nCDEF|");

            let mut settings = Settings::default();
            settings.abc2midi_path = tool.to_string_lossy().into_owned();
            let job = ExportJob::capture(&tunebook, settings.clone(), cache.path().to_path_buf());
            play(job).await.unwrap();
            let scratch = cache.path().join(scratch::SCRATCH_FILE_NAME);
            assert_eq!(std::fs::read_to_string(&scratch).unwrap(), "X:1\r\nT:Test\r\nK:C\r\nCDEF|");

            settings.abc2midi_midi_program = 5;
            let job = ExportJob::capture(&tunebook, settings, cache.path().to_path_buf());
            play(job).await.unwrap();
            assert_eq!(
                std::fs::read_to_string(&scratch).unwrap(),
                "X:1\r\nT:Test\r\nK:C\r\n%%MIDI program 5\r\nCDEF|"
            );
            assert!(!tunebook.is_modified());
        }

        #[tokio::test]
        async fn test_export_reports_stdout_error() {
            let cache = tempfile::tempdir().unwrap();
            let bin = tempfile::tempdir().unwrap();
            let tool = fake::tool(bin.path(), "abc2midi", "echo 'Error in line-char 4-1 : Bad bar'");

            let mut job = job(cache.path(), None);
            job.settings.abc2midi_path = tool.to_string_lossy().into_owned();

            let err = export_midi(job, bin.path().join("out.mid")).await.unwrap_err();
            assert!(matches!(err, Error::ToolReportedError { .. }));
        }
    }
}
