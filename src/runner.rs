use std::sync::Arc;

use teloxide::{
    dispatching::dialogue::GetChatId,
    payloads::{AnswerCallbackQuerySetters, EditMessageTextSetters, SendMessageSetters},
    prelude::Requester,
    types::{CallbackQuery, ChatId, MessageId, ParseMode},
    utils::html,
    Bot, RequestError,
};
use tracing::{debug, instrument, warn};

use crate::{
    flow::{Buttons, Outbound, QuizMaster, UNKNOWN_ACTION},
    keyboard::{markup, Action},
    state::Session,
    HandlerResult, UserDialogue,
};

#[instrument(level = "info", skip_all, fields(data = ?q.data))]
pub(crate) async fn take_action(
    bot: Bot,
    dialogue: UserDialogue,
    q: CallbackQuery,
    mut session: Session,
    master: Arc<QuizMaster>,
) -> HandlerResult {
    let Some(chat_id) = q.chat_id() else {
        warn!("Callback query without a chat");
        bot.answer_callback_query(&q.id).await?;
        return Ok(());
    };
    let message_id = q.message.as_ref().map(|message| message.id());

    let actions = match q.data.as_deref().and_then(Action::parse) {
        Some(action) => {
            let mut rng = rand::thread_rng();
            master.handle(&mut session, action, message_id, &mut rng)
        }
        None => {
            warn!("Unknown callback data");
            vec![Outbound::Notify {
                text: UNKNOWN_ACTION.to_owned(),
                alert: false,
            }]
        }
    };

    let requests = plan(message_id, true, actions);
    let performed = perform(&bot, chat_id, Some(q.id.as_str()), requests).await;
    if let Ok(Some(question)) = &performed {
        session.bind_message(*question);
    }
    // saved even when a request failed, the queue has already moved on
    dialogue.update(session).await?;
    performed?;
    Ok(())
}

/// One Bot API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Request {
    Send {
        text: String,
        buttons: Buttons,
        /// The sent message carries the question the session is waiting on.
        question: bool,
    },
    EditText {
        message_id: MessageId,
        text: String,
        buttons: Buttons,
    },
    ClearButtons {
        message_id: MessageId,
    },
    AnswerCallback {
        text: Option<String>,
        alert: bool,
    },
}

impl Request {
    /// A failure of this request leaves nothing for the user to miss.
    pub(crate) fn is_cosmetic(&self) -> bool {
        matches!(self, Self::ClearButtons { .. })
    }
}

/// Turns the actions of one interaction into Bot API calls. When the interaction
/// is a callback query it is answered exactly once: by the first notification,
/// or plainly at the end. Later notifications become messages.
pub(crate) fn plan(
    message_id: Option<MessageId>,
    callback: bool,
    actions: Vec<Outbound>,
) -> Vec<Request> {
    let mut requests = Vec::with_capacity(actions.len() + 1);
    let mut answered = false;

    for action in actions {
        match action {
            Outbound::Send { text, buttons } => requests.push(Request::Send {
                text,
                buttons,
                question: false,
            }),
            Outbound::Question { text, buttons } => requests.push(Request::Send {
                text,
                buttons,
                question: true,
            }),
            Outbound::EditText { text, buttons } => match message_id {
                Some(message_id) => requests.push(Request::EditText {
                    message_id,
                    text,
                    buttons,
                }),
                None => {
                    debug!("Message is no longer accessible, sending instead of editing");
                    requests.push(Request::Send {
                        text,
                        buttons,
                        question: false,
                    })
                }
            },
            Outbound::ClearButtons => match message_id {
                Some(message_id) => requests.push(Request::ClearButtons { message_id }),
                None => debug!("Message is no longer accessible, buttons stay"),
            },
            Outbound::Notify { text, alert } if callback && !answered => {
                answered = true;
                requests.push(Request::AnswerCallback {
                    text: Some(text),
                    alert,
                });
            }
            Outbound::Notify { text, .. } => requests.push(Request::Send {
                text: html::escape(&text),
                buttons: Buttons::None,
                question: false,
            }),
        }
    }

    if callback && !answered {
        requests.push(Request::AnswerCallback {
            text: None,
            alert: false,
        });
    }

    requests
}

/// Carries out `requests` in order. Returns the id of the sent question message, if any.
pub(crate) async fn perform(
    bot: &Bot,
    chat_id: ChatId,
    callback_id: Option<&str>,
    requests: Vec<Request>,
) -> Result<Option<MessageId>, RequestError> {
    let mut question_id = None;

    for request in requests {
        let cosmetic = request.is_cosmetic();
        let result = match request {
            Request::Send {
                text,
                buttons,
                question,
            } => {
                let send = bot.send_message(chat_id, text).parse_mode(ParseMode::Html);
                let sent = match markup(&buttons) {
                    Some(keyboard) => send.reply_markup(keyboard).await,
                    None => send.await,
                };
                sent.map(|message| {
                    if question {
                        question_id = Some(message.id);
                    }
                })
            }
            Request::EditText {
                message_id,
                text,
                buttons,
            } => {
                let edit = bot
                    .edit_message_text(chat_id, message_id, text)
                    .parse_mode(ParseMode::Html);
                match markup(&buttons) {
                    Some(keyboard) => edit.reply_markup(keyboard).await.map(drop),
                    None => edit.await.map(drop),
                }
            }
            Request::ClearButtons { message_id } => bot
                .edit_message_reply_markup(chat_id, message_id)
                .await
                .map(drop),
            Request::AnswerCallback { text, alert } => match callback_id {
                Some(id) => {
                    let answer = bot.answer_callback_query(id).show_alert(alert);
                    match text {
                        Some(text) => answer.text(text).await.map(drop),
                        None => answer.await.map(drop),
                    }
                }
                None => Ok(()),
            },
        };

        match result {
            Err(e) if cosmetic => warn!(error = %e, "Failed to clear buttons"),
            other => other?,
        }
    }

    Ok(question_id)
}
