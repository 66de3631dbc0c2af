use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PassageError {
    #[error("passage has no typeable characters")]
    EmptyText,
}

/// The text being typed, plus where the user is in it and what they got wrong.
///
/// Text is stored as a flat character buffer. Lines are never materialized;
/// a line is just `index / cols` for whatever width the renderer uses.
#[derive(Debug, Clone)]
pub struct Passage {
    pub(crate) text: Vec<char>,
    pub(crate) cursor: usize,
    pub(crate) word_count: usize,
    pub(crate) wrong_positions: Vec<usize>,
}

impl Passage {
    pub fn new(text: &str) -> Result<Self, PassageError> {
        // leading newlines are padding with nothing above them
        let text: Vec<char> = text.trim_start_matches('\n').chars().collect();
        if text.is_empty() {
            return Err(PassageError::EmptyText);
        }

        let word_count = text.iter().filter(|&&c| c == ' ').count() + 1;

        Ok(Self {
            text,
            cursor: 0,
            word_count,
            wrong_positions: vec![],
        })
    }

    pub fn is_complete(&self) -> bool {
        self.cursor == self.text.len()
    }

    pub fn text(&self) -> &[char] {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Always false for a constructed passage; here for clippy's sake.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.text.get(idx).copied()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Positions currently counted as mistyped, ascending.
    pub fn wrong_positions(&self) -> &[usize] {
        &self.wrong_positions
    }

    pub fn is_wrong(&self, idx: usize) -> bool {
        self.wrong_positions.binary_search(&idx).is_ok()
    }

    pub(crate) fn mark_wrong(&mut self, idx: usize) {
        if let Err(pos) = self.wrong_positions.binary_search(&idx) {
            self.wrong_positions.insert(pos, idx);
        }
    }

    /// Drops marks sitting at `idx` from the tail of the list.
    pub(crate) fn unmark_trailing(&mut self, idx: usize) {
        while self.wrong_positions.last() == Some(&idx) {
            self.wrong_positions.pop();
        }
    }
}
