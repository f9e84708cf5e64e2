use std::sync::Arc;

use dotenvy::dotenv;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use winequizbot::commands::Command;
use winequizbot::config::{Config, DEFAULT_LOG_LEVEL};
use winequizbot::flow::QuizMaster;
use winequizbot::liveness;
use winequizbot::question::QuestionStore;
use winequizbot::schema::schema;
use winequizbot::state::Session;

#[tokio::main]
async fn main() {
    dotenv().ok();
    let config = Config::from_env();
    init_tracing(
        config
            .as_ref()
            .map_or(DEFAULT_LOG_LEVEL, |config| config.log_level.as_str()),
    );

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };
    for problem in &config.ignored {
        warn!(error = %problem, "Ignoring a configuration value, the default is used");
    }
    info!(?config, "Starting bot...");

    let master = match QuestionStore::load(&config.questions_path) {
        Ok(store) => {
            info!(count = store.len(), "Loaded questions");
            QuizMaster::new(store)
        }
        Err(e) => {
            error!(
                error = %e,
                path = %config.questions_path.display(),
                "Failed to load questions, the quiz is disabled"
            );
            QuizMaster::disabled()
        }
    };

    match liveness::bind(config.port).await {
        Ok(listener) => {
            info!(port = config.port, "Liveness endpoint is listening");
            tokio::spawn(async move {
                if let Err(e) = liveness::serve(listener).await {
                    error!(error = %e, "Liveness endpoint stopped");
                }
            });
        }
        Err(e) => error!(error = %e, port = config.port, "Failed to bind the liveness endpoint"),
    }

    let bot = Bot::new(config.token.clone());
    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![
            InMemStorage::<Session>::new(),
            Arc::new(master)
        ])
        .enable_ctrlc_handler()
        .build();

    match config.webhook {
        Some(webhook) => {
            info!(url = %webhook.url, address = %webhook.address, "Receiving updates through a webhook");
            match webhooks::axum(bot, Options::new(webhook.address, webhook.url)).await {
                Ok(listener) => {
                    dispatcher
                        .dispatch_with_listener(
                            listener,
                            LoggingErrorHandler::with_custom_text("An error from the update listener"),
                        )
                        .await
                }
                Err(e) => error!(error = %e, "Failed to build a webhook listener"),
            }
        }
        None => dispatcher.dispatch().await,
    }
}

/// JSON lines on stdout; `log` records from teloxide are forwarded into the same subscriber.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|e| {
        eprintln!("LOG_LEVEL `{level}` is invalid ({e}), using `{DEFAULT_LOG_LEVEL}`");
        EnvFilter::new(DEFAULT_LOG_LEVEL)
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_line_number(true)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install the tracing subscriber: {e}");
    }
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to forward log records: {e}");
    }
}
