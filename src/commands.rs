use std::sync::Arc;

use teloxide::{prelude::Requester, types::Message, utils::command::BotCommands, Bot};
use tracing::instrument;

use crate::{
    flow::QuizMaster,
    runner::{perform, plan},
    state::Session,
    HandlerResult, UserDialogue,
};

#[derive(Debug, Clone, BotCommands)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "display this text.")]
    Help,
    #[command(description = "start the quiz.")]
    Start,
}

pub(crate) async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

#[instrument(level = "info", skip_all, fields(chat = %msg.chat.id))]
pub(crate) async fn start(
    bot: Bot,
    msg: Message,
    dialogue: UserDialogue,
    mut session: Session,
    master: Arc<QuizMaster>,
) -> HandlerResult {
    let actions = master.start(&mut session);
    dialogue.update(session).await?;
    perform(&bot, msg.chat.id, None, plan(None, false, actions)).await?;
    Ok(())
}
