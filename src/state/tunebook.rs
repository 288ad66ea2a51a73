use iced::widget::text_editor::{Action, Content};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Line terminator of the file backing a tunebook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// CRLF if the text uses it anywhere, LF otherwise
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }
}

/// Point in a tunebook's history, taken when a save starts.
///
/// A save only cleans the tunebook if nothing was edited, loaded or
/// cleared between taking the revision and the write finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revision {
    document: u64,
    edits: u64,
}

/// The editable ABC document plus its file backing.
///
/// The modified flag is only cleared by loading or by saving to the
/// backing location; writing a scratch copy for export leaves it alone.
/// `text()` gives the buffer back in the form it was loaded in, with the
/// same line ending and the same final newline (or lack of one).
pub struct Tunebook {
    content: Content,
    location: Option<PathBuf>,
    modified: bool,
    line_ending: LineEnding,
    final_newline: bool,
    /// Bumped whenever the document is replaced
    document: u64,
    /// Bumped on every edit of the current document
    edits: u64,
}

impl Default for Tunebook {
    fn default() -> Self {
        Self::new()
    }
}

impl Tunebook {
    /// Create an empty, untitled tunebook
    pub fn new() -> Self {
        Self {
            content: Content::new(),
            location: None,
            modified: false,
            line_ending: LineEnding::Lf,
            final_newline: true,
            document: 0,
            edits: 0,
        }
    }

    /// Editor content, for the text editor widget
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Editor lines joined with LF. The editor keeps no empty line after
    /// a final line ending, so a terminated last line comes back bare.
    fn body(&self) -> String {
        let mut body = String::new();
        for (i, line) in self.content.lines().enumerate() {
            if i > 0 {
                body.push('\n');
            }
            body.push_str(line.trim_end_matches('\r'));
        }
        body
    }

    /// Full text of the buffer, in the line ending it was loaded with
    pub fn text(&self) -> String {
        let mut text = self.body();
        if self.final_newline && !text.is_empty() {
            text.push('\n');
        }
        match self.line_ending {
            LineEnding::Lf => text,
            LineEnding::CrLf => text.replace('\n', "\r\n"),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Current revision, to hand back to `mark_saved`
    pub fn revision(&self) -> Revision {
        Revision {
            document: self.document,
            edits: self.edits,
        }
    }

    /// Apply an editor action; edits mark the tunebook modified
    pub fn perform(&mut self, action: Action) {
        let is_edit = action.is_edit();
        self.content.perform(action);
        if is_edit {
            self.touch();
        }
    }

    /// Replace everything with a freshly loaded file
    pub fn load(&mut self, location: PathBuf, text: &str) {
        // Content::with_text leaves the cursor at the start
        self.content = Content::with_text(text);
        self.location = Some(location);
        self.modified = false;
        self.line_ending = LineEnding::detect(text);
        self.final_newline = text.is_empty() || text.ends_with('\n');
        self.document += 1;
        self.edits = 0;
    }

    /// Append another file's tunes to the end of the buffer
    pub fn append(&mut self, text: &str) {
        let mut combined = self.body();
        if combined.trim().is_empty() {
            combined.clear();
        } else {
            while !combined.ends_with("\n\n") {
                combined.push('\n');
            }
        }
        combined.push_str(&text.replace("\r\n", "\n"));

        self.content = Content::with_text(&combined);
        self.final_newline = text.ends_with('\n');
        self.touch();
    }

    /// Forget the document and start over untitled
    pub fn clear(&mut self) {
        let document = self.document + 1;
        *self = Self::new();
        self.document = document;
    }

    /// Record that the text as of `revision` was written to `location`.
    ///
    /// The tunebook only becomes clean if it has not changed since.
    /// Returns whether it is clean now.
    pub fn mark_saved(&mut self, location: PathBuf, revision: Revision) -> bool {
        if revision.document != self.document {
            tracing::debug!("save of a replaced document finished, ignoring");
            return !self.modified;
        }
        self.location = Some(location);
        if revision.edits == self.edits {
            self.modified = false;
        }
        !self.modified
    }

    fn touch(&mut self) {
        self.modified = true;
        self.edits += 1;
    }

    /// Name for the window title: `~`-relative path or "Untitled"
    pub fn display_name(&self) -> String {
        match &self.location {
            Some(path) => display_path(path, dirs::home_dir().as_deref()),
            None => "Untitled".to_string(),
        }
    }

    /// Window title, with a trailing `*` while there are unsaved changes
    pub fn title(&self) -> String {
        let marker = if self.modified { "*" } else { "" };
        format!("gabc - {}{}", self.display_name(), marker)
    }
}

/// Replace a leading home directory with `~`
pub fn display_path(path: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home {
        if let Ok(rest) = path.strip_prefix(home) {
            return Path::new("~").join(rest).display().to_string();
        }
    }
    path.display().to_string()
}

/// Read an ABC file, rejecting anything that is not UTF-8
pub async fn load_file(path: PathBuf) -> Result<(PathBuf, String)> {
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| Error::io(&path, e))?;

    let text = String::from_utf8(bytes).map_err(|_| Error::NotUtf8 { path: path.clone() })?;

    tracing::info!("📂 loaded {} ({} bytes)", path.display(), text.len());
    Ok((path, text))
}

/// Write the buffer text to `path`
pub async fn save_file(path: PathBuf, text: String) -> Result<PathBuf> {
    tokio::fs::write(&path, text.as_bytes())
        .await
        .map_err(|e| Error::io(&path, e))?;

    tracing::info!("💾 saved {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::widget::text_editor::{Edit, Motion};
    use std::sync::Arc;

    #[test]
    fn test_new_is_clean_and_untitled() {
        let tunebook = Tunebook::new();
        assert!(!tunebook.is_modified());
        assert!(tunebook.location().is_none());
        assert_eq!(tunebook.title(), "gabc - Untitled");
    }

    #[test]
    fn test_edit_marks_modified() {
        let mut tunebook = Tunebook::new();
        tunebook.perform(Action::Edit(Edit::Insert('X')));
        assert!(tunebook.is_modified());
        assert!(tunebook.title().ends_with('*'));
    }

    #[test]
    fn test_load_replaces_and_cleans() {
        let mut tunebook = Tunebook::new();
        tunebook.perform(Action::Edit(Edit::Paste(Arc::new("junk".into()))));

        tunebook.load(PathBuf::from("/tunes/reel.abc"), "X:1\nT:Reel\nK:D\n");
        assert!(!tunebook.is_modified());
        assert_eq!(tunebook.location(), Some(Path::new("/tunes/reel.abc")));
        assert!(tunebook.text().starts_with("X:1\nT:Reel"));
    }

    #[test]
    fn test_text_keeps_missing_final_newline() {
        let mut tunebook = Tunebook::new();
        tunebook.load(PathBuf::from("/tunes/a.abc"), "X:1\nT:Test\nK:C\nCDEF|");
        assert_eq!(tunebook.text(), "X:1\nT:Test\nK:C\nCDEF|");

        tunebook.load(PathBuf::from("/tunes/b.abc"), "X:1\nK:C\nCDEF|\n\n");
        assert_eq!(tunebook.text(), "X:1\nK:C\nCDEF|\n\n");
    }

    #[test]
    fn test_text_keeps_crlf() {
        let mut tunebook = Tunebook::new();
        tunebook.load(PathBuf::from("/tunes/dos.abc"), "X:1\r\nK:C\r\nCDEF|\r\n");
        assert_eq!(tunebook.text(), "X:1\r\nK:C\r\nCDEF|\r\n");

        tunebook.perform(Action::Move(Motion::DocumentEnd));
        tunebook.perform(Action::Edit(Edit::Enter));
        tunebook.perform(Action::Edit(Edit::Paste(Arc::new("GABc|".into()))));
        assert_eq!(tunebook.text(), "X:1\r\nK:C\r\nCDEF|\r\nGABc|\r\n");
    }

    #[test]
    fn test_empty_tunebook_text_is_empty() {
        assert_eq!(Tunebook::new().text(), "");
    }

    #[test]
    fn test_append_separates_tunes() {
        let mut tunebook = Tunebook::new();
        tunebook.load(PathBuf::from("/tunes/a.abc"), "X:1\nK:C\nCDEF|");
        tunebook.append("X:2\nK:G\nGABc|");

        assert_eq!(tunebook.text(), "X:1\nK:C\nCDEF|\n\nX:2\nK:G\nGABc|");
        assert!(tunebook.is_modified());
        assert_eq!(tunebook.location(), Some(Path::new("/tunes/a.abc")));
    }

    #[test]
    fn test_append_to_empty_tunebook_adds_no_blank_lines() {
        let mut tunebook = Tunebook::new();
        tunebook.append("X:2\nK:G\nGABc|\n");

        assert_eq!(tunebook.text(), "X:2\nK:G\nGABc|\n");
        assert!(tunebook.is_modified());
    }

    #[test]
    fn test_save_clears_modified() {
        let mut tunebook = Tunebook::new();
        tunebook.perform(Action::Edit(Edit::Insert('K')));
        let revision = tunebook.revision();

        assert!(tunebook.mark_saved(PathBuf::from("/tunes/new.abc"), revision));
        assert!(!tunebook.is_modified());
        assert_eq!(tunebook.location(), Some(Path::new("/tunes/new.abc")));
    }

    #[test]
    fn test_edit_during_save_stays_modified() {
        let mut tunebook = Tunebook::new();
        tunebook.load(PathBuf::from("/tunes/a.abc"), "X:1\nK:C\n");
        tunebook.perform(Action::Edit(Edit::Insert('A')));
        let revision = tunebook.revision();
        let written = tunebook.text();

        // Typed while the write was still running
        tunebook.perform(Action::Edit(Edit::Insert('B')));

        assert!(!tunebook.mark_saved(PathBuf::from("/tunes/a.abc"), revision));
        assert!(tunebook.is_modified());
        assert_ne!(tunebook.text(), written);
    }

    #[test]
    fn test_save_of_replaced_document_is_ignored() {
        let mut tunebook = Tunebook::new();
        tunebook.perform(Action::Edit(Edit::Insert('A')));
        let revision = tunebook.revision();

        tunebook.load(PathBuf::from("/tunes/other.abc"), "X:9\n");
        tunebook.perform(Action::Edit(Edit::Insert('B')));

        assert!(!tunebook.mark_saved(PathBuf::from("/tunes/untitled.abc"), revision));
        assert_eq!(tunebook.location(), Some(Path::new("/tunes/other.abc")));
    }

    #[test]
    fn test_display_path_relative_to_home() {
        let home = Path::new("/home/fiddler");
        assert_eq!(
            display_path(Path::new("/home/fiddler/tunes/jig.abc"), Some(home)),
            "~/tunes/jig.abc"
        );
        assert_eq!(
            display_path(Path::new("/srv/jig.abc"), Some(home)),
            "/srv/jig.abc"
        );
    }

    #[tokio::test]
    async fn test_load_rejects_non_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.abc");
        std::fs::write(&path, [b'T', b':', 0xE9, 0xFF]).unwrap();

        let err = load_file(path).await.unwrap_err();
        assert!(matches!(err, Error::NotUtf8 { .. }));
    }

    #[tokio::test]
    async fn test_save_twice_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tune.abc");
        let mut tunebook = Tunebook::new();
        tunebook.load(path.clone(), "X:1\r\nK:C\r\nCDEF|");

        for _ in 0..2 {
            let revision = tunebook.revision();
            let saved = save_file(path.clone(), tunebook.text()).await.unwrap();
            assert!(tunebook.mark_saved(saved, revision));
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "X:1\r\nK:C\r\nCDEF|");
    }
}
