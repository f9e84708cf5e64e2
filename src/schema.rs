use teloxide::{
    dispatching::{
        dialogue::{self, InMemStorage},
        UpdateFilterExt, UpdateHandler,
    },
    dptree,
    prelude::Requester,
    types::{Message, Update},
    Bot,
};
use tracing::{info, instrument};

use crate::{
    commands::{help, start, Command},
    runner,
    state::Session,
    HandlerResult,
};

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Help].endpoint(help))
        .branch(case![Command::Start].endpoint(start));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .endpoint(invalid_state);

    let callback_handler = Update::filter_callback_query().endpoint(runner::take_action);

    dialogue::enter::<Update, InMemStorage<Session>, Session, _>()
        .branch(message_handler)
        .branch(callback_handler)
}

#[instrument(level = "info", skip_all, fields(chat = %msg.chat.id))]
async fn invalid_state(bot: Bot, msg: Message) -> HandlerResult {
    info!("Invalid input '{:?}'", msg.text());
    bot.send_message(
        msg.chat.id,
        "Unable to handle the message. Enter /help to see usages.",
    )
    .await?;
    Ok(())
}
