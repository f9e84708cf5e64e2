use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::flow::Buttons;

const START_QUIZ: &str = "start_quiz";
const REVEAL_ANSWER: &str = "reveal_answer";
const NEXT_QUESTION: &str = "next_question";
const ANSWER_PREFIX: &str = "answer_";

/// A button press, decoded from its callback data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Begin,
    Reveal,
    Next,
    /// Raw text after `answer_`; it is only checked against the question on screen.
    Answer(String),
}

impl Action {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            START_QUIZ => Some(Self::Begin),
            REVEAL_ANSWER => Some(Self::Reveal),
            NEXT_QUESTION => Some(Self::Next),
            other => other
                .strip_prefix(ANSWER_PREFIX)
                .map(|raw| Self::Answer(raw.to_owned())),
        }
    }

    pub fn tag(&self) -> String {
        match self {
            Self::Begin => START_QUIZ.to_owned(),
            Self::Reveal => REVEAL_ANSWER.to_owned(),
            Self::Next => NEXT_QUESTION.to_owned(),
            Self::Answer(raw) => format!("{ANSWER_PREFIX}{raw}"),
        }
    }
}

fn single(text: &str, action: Action) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(text, action.tag())]])
}

pub(crate) fn options_keyboard(options: &[String]) -> InlineKeyboardMarkup {
    let keyboard: Vec<Vec<InlineKeyboardButton>> = options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            vec![InlineKeyboardButton::callback(
                option,
                Action::Answer(i.to_string()).tag(),
            )]
        })
        .collect();

    InlineKeyboardMarkup::new(keyboard)
}

pub(crate) fn markup(buttons: &Buttons) -> Option<InlineKeyboardMarkup> {
    match buttons {
        Buttons::None => None,
        Buttons::Begin => Some(single("Begin", Action::Begin)),
        Buttons::ShowAnswer => Some(single("Show answer 👀", Action::Reveal)),
        Buttons::Next => Some(single("Next ➡️", Action::Next)),
        Buttons::Options(options) => Some(options_keyboard(options)),
    }
}
