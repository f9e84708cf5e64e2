use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use teloxide::types::MessageId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    AwaitingStart,
    /// `message` is the chat message carrying the question's buttons, once it has been sent.
    ShowingQuestion {
        current: usize,
        message: Option<MessageId>,
    },
    AnswerRevealed {
        current: usize,
        message: Option<MessageId>,
    },
}

/// Per-chat quiz progress, kept in the dialogue storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pending: VecDeque<usize>,
    phase: Phase,
    round: u32,
}

/// Outcome of popping the next question off the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Draw {
    pub(crate) index: usize,
    /// How many questions of the round have been shown, this one included.
    pub(crate) position: usize,
    pub(crate) round: u32,
    pub(crate) new_round: bool,
}

impl Session {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current(&self) -> Option<usize> {
        match self.phase {
            Phase::ShowingQuestion { current, .. } | Phase::AnswerRevealed { current, .. } => {
                Some(current)
            }
            Phase::Idle | Phase::AwaitingStart => None,
        }
    }

    pub fn shown_on(&self) -> Option<MessageId> {
        match self.phase {
            Phase::ShowingQuestion { message, .. } | Phase::AnswerRevealed { message, .. } => {
                message
            }
            Phase::Idle | Phase::AwaitingStart => None,
        }
    }

    /// Whether a button pressed on `origin` belongs to the question on screen.
    pub fn is_shown_on(&self, origin: Option<MessageId>) -> bool {
        origin.is_some() && self.shown_on() == origin
    }

    pub fn pending(&self) -> &VecDeque<usize> {
        &self.pending
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub(crate) fn welcome(&mut self) {
        self.phase = Phase::AwaitingStart;
    }

    pub(crate) fn reveal(&mut self) {
        if let Phase::ShowingQuestion { current, message } = self.phase {
            self.phase = Phase::AnswerRevealed { current, message };
        }
    }

    /// Records the message the current question was sent in.
    pub(crate) fn bind_message(&mut self, id: MessageId) {
        if let Phase::ShowingQuestion { message, .. } = &mut self.phase {
            *message = Some(id);
        }
    }

    /// Pops the next question, reshuffling all `total` questions into a new round
    /// when the queue has run dry.
    pub(crate) fn draw<R: Rng + ?Sized>(&mut self, total: usize, rng: &mut R) -> Option<Draw> {
        if total == 0 {
            return None;
        }

        let mut new_round = false;
        if self.pending.is_empty() {
            let mut order: Vec<usize> = (0..total).collect();
            order.shuffle(rng);
            self.pending = order.into();
            self.round += 1;
            // the first round starts silently
            new_round = self.round > 1;
        }

        let index = self.pending.pop_front()?;
        self.phase = Phase::ShowingQuestion {
            current: index,
            message: None,
        };

        Some(Draw {
            index,
            position: total - self.pending.len(),
            round: self.round,
            new_round,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn every_question_is_drawn_once_per_round() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut session = Session::default();

        for round in 1..=3 {
            let mut seen = HashSet::new();
            for position in 1..=5 {
                let draw = session.draw(5, &mut rng).unwrap();
                assert_eq!(draw.position, position);
                assert_eq!(draw.round, round);
                assert_eq!(draw.new_round, round > 1 && position == 1);
                assert!(seen.insert(draw.index), "{} drawn twice", draw.index);
            }
            assert_eq!(seen, (0..5).collect::<HashSet<_>>());
            assert!(session.pending().is_empty());
        }
    }

    #[test]
    fn draw_tracks_current_question() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = Session::default();
        assert_eq!(session.current(), None);

        let draw = session.draw(3, &mut rng).unwrap();
        assert_eq!(
            session.phase(),
            Phase::ShowingQuestion {
                current: draw.index,
                message: None
            }
        );
        assert_eq!(session.pending().len(), 2);
        assert!(!session.pending().contains(&draw.index));
    }

    #[test]
    fn reveal_only_applies_to_a_shown_question() {
        let mut session = Session::default();
        session.welcome();
        session.reveal();
        assert_eq!(session.phase(), Phase::AwaitingStart);

        session.draw(1, &mut StdRng::seed_from_u64(0)).unwrap();
        session.bind_message(MessageId(7));
        session.reveal();
        assert_eq!(
            session.phase(),
            Phase::AnswerRevealed {
                current: 0,
                message: Some(MessageId(7))
            }
        );
        assert_eq!(session.current(), Some(0));
    }

    #[test]
    fn buttons_belong_to_the_bound_message_only() {
        let mut session = Session::default();
        session.draw(2, &mut StdRng::seed_from_u64(0)).unwrap();
        assert!(!session.is_shown_on(Some(MessageId(1))));
        assert!(!session.is_shown_on(None));

        session.bind_message(MessageId(1));
        assert!(session.is_shown_on(Some(MessageId(1))));
        assert!(!session.is_shown_on(Some(MessageId(2))));
        assert!(!session.is_shown_on(None));

        session.draw(2, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(session.shown_on(), None);
    }

    #[test]
    fn nothing_to_draw_from_an_empty_set() {
        let mut session = Session::default();
        assert_eq!(session.draw(0, &mut StdRng::seed_from_u64(0)), None);
        assert_eq!(session, Session::default());
    }
}
