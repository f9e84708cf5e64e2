use state::Session;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::Dialogue};

pub mod commands;
pub mod config;
pub mod error;
pub mod flow;
pub mod keyboard;
pub mod liveness;
pub mod question;
pub mod runner;
pub mod schema;
pub mod state;

type UserDialogue = Dialogue<Session, InMemStorage<Session>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
