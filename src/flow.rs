//! The quiz itself: what to show next and how to react to a button press.
//!
//! [`QuizMaster`] never talks to Telegram. It mutates a chat's [`Session`] and
//! returns the [`Outbound`] actions the transport layer has to perform.

use rand::Rng;
use teloxide::types::MessageId;
use teloxide::utils::html;
use tracing::{debug, info, warn};

use crate::error::SelectionError;
use crate::keyboard::Action;
use crate::question::{Question, QuestionKind, QuestionStore};
use crate::state::{Phase, Session};

pub const WELCOME: &str = "🍷 Welcome to the quiz!";
pub const NOT_CONFIGURED: &str = "⚠️ The quiz is not configured yet. Please try again later.";
pub const CORRECT: &str = "✅ Correct!";
pub const ANSWER_FAILED: &str = "Could not process the answer.";
pub const STALE: &str = "This question is no longer active. Send /start to continue.";
pub const NOT_A_REVEAL: &str = "This question has no hidden answer, pick an option.";
pub const NOT_A_CHOICE: &str = "This question has no options, use the buttons below it.";
pub const UNKNOWN_ACTION: &str = "Unknown action.";

/// Buttons attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Buttons {
    None,
    Begin,
    ShowAnswer,
    Next,
    /// One button per option, in order.
    Options(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Send { text: String, buttons: Buttons },
    /// Like `Send`, but the sent message becomes the one the session's buttons answer to.
    Question { text: String, buttons: Buttons },
    /// Replace the text of the message the user pressed a button on.
    EditText { text: String, buttons: Buttons },
    /// Remove the buttons from the message the user pressed a button on.
    ClearButtons,
    /// A callback answer; shown as a toast, or as a dialog when `alert` is set.
    Notify { text: String, alert: bool },
}

fn notify(text: impl Into<String>, alert: bool) -> Outbound {
    Outbound::Notify {
        text: text.into(),
        alert,
    }
}

#[derive(Debug, Clone)]
pub struct QuizMaster {
    store: Option<QuestionStore>,
}

impl QuizMaster {
    pub fn new(store: QuestionStore) -> Self {
        Self { store: Some(store) }
    }

    /// A quiz master without questions; every entry point answers with [`NOT_CONFIGURED`].
    pub fn disabled() -> Self {
        Self { store: None }
    }

    pub fn start(&self, session: &mut Session) -> Vec<Outbound> {
        if self.store.is_none() {
            return vec![Outbound::Send {
                text: NOT_CONFIGURED.to_owned(),
                buttons: Buttons::None,
            }];
        }

        session.welcome();
        vec![Outbound::Send {
            text: WELCOME.to_owned(),
            buttons: Buttons::Begin,
        }]
    }

    /// Reacts to a button pressed on the message `origin` (`None` when Telegram
    /// no longer gives access to it).
    pub fn handle<R: Rng + ?Sized>(
        &self,
        session: &mut Session,
        action: Action,
        origin: Option<MessageId>,
        rng: &mut R,
    ) -> Vec<Outbound> {
        let Some(store) = &self.store else {
            return vec![notify(NOT_CONFIGURED, true)];
        };

        if action != Action::Begin && !session.is_shown_on(origin) {
            debug!(?origin, shown_on = ?session.shown_on(), "Button of an inactive question");
            return vec![notify(STALE, false)];
        }

        match action {
            Action::Begin => match session.phase() {
                Phase::Idle | Phase::AwaitingStart => ask_question(store, session, rng),
                Phase::ShowingQuestion { .. } | Phase::AnswerRevealed { .. } => {
                    vec![notify(STALE, false)]
                }
            },
            Action::Reveal => reveal_answer(store, session),
            Action::Next => match session.phase() {
                Phase::AnswerRevealed { .. } => {
                    let mut actions = vec![Outbound::ClearButtons];
                    actions.extend(ask_question(store, session, rng));
                    actions
                }
                _ => vec![notify(STALE, false)],
            },
            Action::Answer(raw) => select_answer(store, session, &raw, rng),
        }
    }
}

fn ask_question<R: Rng + ?Sized>(
    store: &QuestionStore,
    session: &mut Session,
    rng: &mut R,
) -> Vec<Outbound> {
    let Some(draw) = session.draw(store.len(), rng) else {
        return vec![notify(NOT_CONFIGURED, true)];
    };
    let Some(question) = store.get(draw.index) else {
        warn!(index = draw.index, "Drawn question is missing from the store");
        return vec![notify(STALE, false)];
    };
    debug!(
        index = draw.index,
        position = draw.position,
        round = draw.round,
        "Asking {}",
        question
    );

    let mut actions = Vec::with_capacity(2);
    if draw.new_round {
        actions.push(Outbound::Send {
            text: format!("🔁 Round {}!", draw.round),
            buttons: Buttons::None,
        });
    }
    actions.push(render_question(question, draw.position, store.len()));
    actions
}

fn render_question(question: &Question, position: usize, total: usize) -> Outbound {
    let text = format!("[{position}/{total}] ❓ {}", html::escape(question.text()));
    let buttons = match question.kind() {
        QuestionKind::Reveal { .. } => Buttons::ShowAnswer,
        QuestionKind::Choice { options, .. } => Buttons::Options(options.clone()),
    };
    Outbound::Question { text, buttons }
}

fn reveal_answer(store: &QuestionStore, session: &mut Session) -> Vec<Outbound> {
    let Phase::ShowingQuestion { current, .. } = session.phase() else {
        return vec![notify(STALE, false)];
    };
    let Some(question) = store.get(current) else {
        return vec![notify(STALE, false)];
    };
    let QuestionKind::Reveal { answer } = question.kind() else {
        return vec![notify(NOT_A_REVEAL, false)];
    };

    session.reveal();
    vec![Outbound::EditText {
        text: format!(
            "❓ {}\n\nAnswer: <tg-spoiler>{}</tg-spoiler>",
            html::escape(question.text()),
            html::escape(answer)
        ),
        buttons: Buttons::Next,
    }]
}

fn select_answer<R: Rng + ?Sized>(
    store: &QuestionStore,
    session: &mut Session,
    raw: &str,
    rng: &mut R,
) -> Vec<Outbound> {
    let Phase::ShowingQuestion { current, .. } = session.phase() else {
        return vec![notify(STALE, false)];
    };
    let Some(question) = store.get(current) else {
        return vec![notify(STALE, false)];
    };
    let QuestionKind::Choice {
        options,
        correct_index,
    } = question.kind()
    else {
        return vec![notify(NOT_A_CHOICE, false)];
    };

    let selected = match parse_selection(raw, options.len()) {
        Ok(selected) => selected,
        Err(e) => {
            warn!(error = %e, "Could not process answer to '{}'", question.text());
            return vec![notify(ANSWER_FAILED, true)];
        }
    };
    let Some(correct) = options.get(*correct_index) else {
        warn!(correct_index, "Correct index points past the options of '{}'", question.text());
        return vec![notify(ANSWER_FAILED, true)];
    };

    let is_correct = selected == *correct_index;
    info!(selected, is_correct, "Answer to '{}'", question.text());
    let verdict = if is_correct {
        CORRECT.to_owned()
    } else {
        format!("❌ Incorrect! Correct answer: {correct}")
    };

    let mut actions = vec![notify(verdict, true), Outbound::ClearButtons];
    actions.extend(ask_question(store, session, rng));
    actions
}

pub(crate) fn parse_selection(raw: &str, len: usize) -> Result<usize, SelectionError> {
    let index = raw
        .parse::<usize>()
        .map_err(|source| SelectionError::NotANumber {
            raw: raw.to_owned(),
            source,
        })?;
    if index >= len {
        return Err(SelectionError::OutOfRange { index, len });
    }
    Ok(index)
}
