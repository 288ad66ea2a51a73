/// Unsaved-changes gate
///
/// Actions that would throw away the tunebook (closing the window,
/// opening another file, starting a new one) pass through this gate.
/// A clean tunebook lets them proceed immediately. A dirty one asks the
/// user first, and the answer decides what happens:
///
/// - Discard: proceed without saving
/// - Save: save first, proceed only if the save succeeds
/// - Cancel: stay put, nothing changes
///
/// The gate only tracks the conversation; the application performs the
/// dialog, the save and the destructive action itself.

use iced::window;

/// The destructive action waiting on the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Close(window::Id),
    Open,
    New,
}

/// Answer from the "Save Changes?" dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Cancel,
    Discard,
    Save,
}

/// What the application should do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Carry out the pending action now
    Proceed(Pending),
    /// Show the confirmation dialog
    Confirm,
    /// Save the tunebook, then report back with `save_finished`
    Save,
    /// Leave everything as it is
    Stay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Confirming(Pending),
    Saving(Pending),
}

#[derive(Debug, Default)]
pub struct CloseGate {
    phase: Phase,
}

impl CloseGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the confirmation dialog should be visible
    pub fn is_confirming(&self) -> bool {
        matches!(self.phase, Phase::Confirming(_))
    }

    /// True while a save started from the dialog is in flight
    pub fn is_saving(&self) -> bool {
        matches!(self.phase, Phase::Saving(_))
    }

    /// Ask to perform `pending` on a tunebook that is `dirty` or not
    pub fn request(&mut self, pending: Pending, dirty: bool) -> Outcome {
        match self.phase {
            // A dialog or save is already running; ignore repeats
            Phase::Confirming(_) | Phase::Saving(_) => Outcome::Stay,
            Phase::Idle if !dirty => Outcome::Proceed(pending),
            Phase::Idle => {
                self.phase = Phase::Confirming(pending);
                Outcome::Confirm
            }
        }
    }

    /// Feed the user's dialog answer
    pub fn respond(&mut self, response: Response) -> Outcome {
        let Phase::Confirming(pending) = self.phase else {
            return Outcome::Stay;
        };

        match response {
            Response::Cancel => {
                self.phase = Phase::Idle;
                Outcome::Stay
            }
            Response::Discard => {
                self.phase = Phase::Idle;
                Outcome::Proceed(pending)
            }
            Response::Save => {
                self.phase = Phase::Saving(pending);
                Outcome::Save
            }
        }
    }

    /// Report how the save requested by `Outcome::Save` went.
    /// A cancelled save-as dialog counts as a failure.
    pub fn save_finished(&mut self, saved: bool) -> Outcome {
        let Phase::Saving(pending) = self.phase else {
            return Outcome::Stay;
        };

        self.phase = Phase::Idle;
        if saved {
            Outcome::Proceed(pending)
        } else {
            Outcome::Stay
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close() -> Pending {
        Pending::Close(window::Id::unique())
    }

    #[test]
    fn test_clean_close_proceeds() {
        let mut gate = CloseGate::new();
        let pending = close();
        assert_eq!(gate.request(pending, false), Outcome::Proceed(pending));
        assert!(!gate.is_confirming());
    }

    #[test]
    fn test_dirty_close_discard_skips_save() {
        let mut gate = CloseGate::new();
        let pending = close();

        assert_eq!(gate.request(pending, true), Outcome::Confirm);
        assert!(gate.is_confirming());

        assert_eq!(gate.respond(Response::Discard), Outcome::Proceed(pending));
        assert!(!gate.is_confirming());
        assert!(!gate.is_saving());
    }

    #[test]
    fn test_dirty_close_save_success_proceeds() {
        let mut gate = CloseGate::new();
        let pending = close();

        gate.request(pending, true);
        assert_eq!(gate.respond(Response::Save), Outcome::Save);
        assert!(gate.is_saving());
        assert_eq!(gate.save_finished(true), Outcome::Proceed(pending));
    }

    #[test]
    fn test_dirty_close_save_failure_stays() {
        let mut gate = CloseGate::new();
        gate.request(close(), true);
        gate.respond(Response::Save);

        assert_eq!(gate.save_finished(false), Outcome::Stay);
        assert!(!gate.is_saving());

        // The next request asks again
        assert_eq!(gate.request(Pending::Open, true), Outcome::Confirm);
    }

    #[test]
    fn test_cancel_leaves_everything() {
        let mut gate = CloseGate::new();
        gate.request(Pending::New, true);
        assert_eq!(gate.respond(Response::Cancel), Outcome::Stay);
        assert!(!gate.is_confirming());
    }

    #[test]
    fn test_repeated_request_while_confirming_is_ignored() {
        let mut gate = CloseGate::new();
        gate.request(Pending::Open, true);
        assert_eq!(gate.request(close(), true), Outcome::Stay);
        assert_eq!(gate.respond(Response::Discard), Outcome::Proceed(Pending::Open));
    }

    #[test]
    fn test_stray_answers_are_ignored() {
        let mut gate = CloseGate::new();
        assert_eq!(gate.respond(Response::Save), Outcome::Stay);
        assert_eq!(gate.save_finished(true), Outcome::Stay);
    }
}
