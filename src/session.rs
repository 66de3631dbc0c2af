use tracing::{debug, info};

use crate::passage::Passage;
use crate::score::{score, Score, SessionTimer};

/// A single discrete input, already stripped of terminal details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    Quit,
    /// Nothing arrived; the host should poll again.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Typing,
    Complete,
    Cancelled,
}

/// Owns the passage for the life of a run and is the only thing that moves
/// its cursor.
#[derive(Debug)]
pub struct TypingSession {
    passage: Passage,
    timer: SessionTimer,
    phase: Phase,
}

impl TypingSession {
    pub fn new(passage: Passage) -> Self {
        Self {
            passage,
            timer: SessionTimer::default(),
            phase: Phase::NotStarted,
        }
    }

    pub fn passage(&self) -> &Passage {
        &self.passage
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn has_started(&self) -> bool {
        self.timer.started()
    }

    /// True once the session is over, either finished or abandoned.
    pub fn has_finished(&self) -> bool {
        matches!(self.phase, Phase::Complete | Phase::Cancelled)
    }

    pub fn apply(&mut self, input: KeyInput) -> Phase {
        match input {
            KeyInput::Char(c) => self.write(c),
            KeyInput::Backspace => self.backspace(),
            KeyInput::Quit => self.cancel(),
            KeyInput::Idle => {}
        }
        self.phase
    }

    pub fn write(&mut self, c: char) {
        if self.has_finished() {
            return;
        }

        if self.phase == Phase::NotStarted {
            self.phase = Phase::Typing;
            self.timer.start();
            debug!("first keystroke, timer started");
        }

        let passage = &mut self.passage;
        let idx = passage.cursor;
        if passage.text[idx] != c {
            passage.mark_wrong(idx);
        }
        passage.cursor += 1;

        while passage.cursor < passage.text.len() && passage.text[passage.cursor] == '\n' {
            passage.cursor += 1;
        }

        if passage.is_complete() {
            self.timer.stop();
            self.phase = Phase::Complete;
            info!(
                chars = passage.len(),
                mistakes = passage.wrong_positions.len(),
                "passage complete"
            );
        }
    }

    pub fn backspace(&mut self) {
        if self.phase != Phase::Typing {
            return;
        }

        let passage = &mut self.passage;
        if passage.cursor == 0 {
            return;
        }

        passage.cursor -= 1;
        while passage.cursor > 0 && passage.text[passage.cursor] == '\n' {
            passage.cursor -= 1;
        }

        let cursor = passage.cursor;
        passage.unmark_trailing(cursor);
    }

    pub fn cancel(&mut self) {
        if self.has_finished() {
            return;
        }
        info!(cursor = self.passage.cursor, "session cancelled");
        self.phase = Phase::Cancelled;
    }

    /// The final score, once the passage has been typed through.
    pub fn score(&self) -> Option<Score> {
        if self.phase != Phase::Complete {
            return None;
        }
        let elapsed = self.timer.elapsed()?;
        Some(score(&self.passage, elapsed.as_nanos()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(text: &str) -> TypingSession {
        TypingSession::new(Passage::new(text).unwrap())
    }

    #[test]
    fn test_session_new() {
        let session = session("test");

        assert_eq!(session.phase(), Phase::NotStarted);
        assert_eq!(session.passage().cursor(), 0);
        assert!(!session.has_started());
        assert!(!session.has_finished());
        assert_eq!(session.score(), None);
    }

    #[test]
    fn test_write_correct_char() {
        let mut session = session("test");

        session.write('t');

        assert_eq!(session.phase(), Phase::Typing);
        assert_eq!(session.passage().cursor(), 1);
        assert!(session.passage().wrong_positions().is_empty());
        assert!(session.has_started());
    }

    #[test]
    fn test_write_incorrect_char() {
        let mut session = session("test");

        session.write('x');

        assert_eq!(session.passage().cursor(), 1);
        assert_eq!(session.passage().wrong_positions(), &[0]);
    }

    #[test]
    fn test_newline_skipped_on_advance() {
        let mut session = session("ab\n\ncd");

        session.write('a');
        session.write('b');

        assert_eq!(session.passage().cursor(), 4);
    }

    #[test]
    fn test_newline_skipped_on_backspace() {
        let mut session = session("ab\n\ncd");

        session.write('a');
        session.write('x');
        assert_eq!(session.passage().cursor(), 4);

        session.backspace();
        assert_eq!(session.passage().cursor(), 1);
        assert!(session.passage().wrong_positions().is_empty());
    }

    #[test]
    fn test_trailing_newlines_complete_the_passage() {
        let mut session = session("ab\n\n");

        session.write('a');
        session.write('b');

        assert_eq!(session.passage().cursor(), 4);
        assert_eq!(session.phase(), Phase::Complete);
    }

    #[test]
    fn test_backspace_does_not_start_timer() {
        let mut session = session("test");

        session.apply(KeyInput::Backspace);

        assert_eq!(session.phase(), Phase::NotStarted);
        assert!(!session.has_started());
    }

    #[test]
    fn test_backspace_at_start() {
        let mut session = session("test");
        session.write('t');
        session.backspace();

        assert_eq!(session.passage().cursor(), 0);

        session.backspace();
        assert_eq!(session.passage().cursor(), 0);
        assert_eq!(session.phase(), Phase::Typing);
    }

    #[test]
    fn test_backspace_keeps_earlier_mistakes() {
        let mut session = session("abcd");
        session.write('x');
        session.write('b');
        session.write('c');

        session.backspace();

        assert_eq!(session.passage().cursor(), 2);
        assert_eq!(session.passage().wrong_positions(), &[0]);
    }

    #[test]
    fn test_retype_after_backspace() {
        let mut session = session("ab");
        session.write('x');
        session.backspace();
        session.write('a');

        assert!(session.passage().wrong_positions().is_empty());
        assert_eq!(session.passage().cursor(), 1);
    }

    #[test]
    fn test_complete_and_score() {
        let mut session = session("hi");

        session.write('h');
        assert!(!session.has_finished());
        session.write('i');

        assert_eq!(session.phase(), Phase::Complete);
        assert!(session.has_finished());

        let score = session.score().unwrap();
        assert_eq!(score.accuracy, 100.0);
        assert!(score.wpm > 0.0);
    }

    #[test]
    fn test_input_after_complete_ignored() {
        let mut session = session("a");
        session.write('a');

        session.write('b');
        session.backspace();

        assert_eq!(session.passage().cursor(), 1);
        assert_eq!(session.phase(), Phase::Complete);
    }

    #[test]
    fn test_quit_before_typing_has_no_score() {
        let mut session = session("test");

        assert_eq!(session.apply(KeyInput::Quit), Phase::Cancelled);
        assert!(session.has_finished());
        assert!(!session.has_started());
        assert_eq!(session.score(), None);
    }

    #[test]
    fn test_quit_mid_session_has_no_score() {
        let mut session = session("test");
        session.write('t');
        session.apply(KeyInput::Quit);

        assert_eq!(session.phase(), Phase::Cancelled);
        assert_eq!(session.score(), None);

        session.write('e');
        assert_eq!(session.passage().cursor(), 1);
    }

    #[test]
    fn test_idle_changes_nothing() {
        let mut session = session("test");

        assert_eq!(session.apply(KeyInput::Idle), Phase::NotStarted);
        assert_eq!(session.passage().cursor(), 0);
    }
}
