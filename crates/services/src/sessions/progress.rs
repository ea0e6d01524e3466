/// Running tally for the current session, reset on every start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionProgress {
    pub answered: u32,
    pub correct: u32,
    pub timed_out: u32,
}

impl SessionProgress {
    pub(crate) fn count(&mut self, was_correct: bool, timed_out: bool) {
        self.answered = self.answered.saturating_add(1);
        if was_correct {
            self.correct = self.correct.saturating_add(1);
        }
        if timed_out {
            self.timed_out = self.timed_out.saturating_add(1);
        }
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.answered - self.correct
    }
}
