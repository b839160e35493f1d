use std::sync::Arc;

use tracing::info;

use crate::database::Database;
use crate::error::BotError;
use crate::file_logger::FileLogger;
use crate::markov::TextModel;
use crate::normalize;

/// Fewest stored messages a user needs before simulation is attempted.
pub const MIN_MESSAGES: usize = 25;

/// Generation attempts before giving up on a sentence.
pub const TRIES: usize = 1000;

/// Outcome of a simulation request. The first two are user-facing results,
/// not errors.
#[derive(Debug, PartialEq, Eq)]
pub enum Simulation {
    Sentence(String),
    InsufficientData,
    Exhausted,
}

pub struct SimulatorService {
    database: Arc<Database>,
    logger: Arc<FileLogger>,
}

impl SimulatorService {
    pub fn new(database: Arc<Database>, logger: Arc<FileLogger>) -> Self {
        Self { database, logger }
    }

    pub fn logger(&self) -> &FileLogger {
        &self.logger
    }

    /// Record one inbound non-command message, gated on the author's
    /// consent. Best effort: a storage failure fails only this message.
    pub fn ingest(&self, author_id: u64, content: &str) -> Result<(), BotError> {
        if !self.database.permission(author_id)? {
            return Ok(());
        }
        if content.trim().is_empty() {
            return Ok(());
        }

        let parsed = normalize::demojize(content);
        if self.database.append_message(author_id, &parsed)? {
            self.logger.log_message_stored(author_id, &parsed);
        }
        Ok(())
    }

    /// Flip the invoking user's consent flag; returns the new value.
    pub fn toggle_permission(&self, user_id: u64) -> Result<bool, BotError> {
        let granted = self.database.toggle_permission(user_id)?;
        self.logger.log_permission(user_id, granted);
        Ok(granted)
    }

    /// Delete everything stored for the invoking user.
    pub fn purge(&self, user_id: u64) -> Result<(), BotError> {
        let removed = self.database.purge(user_id)?;
        self.logger.log_purge(user_id, removed);
        Ok(())
    }

    /// Build a text model from the target's stored messages and attempt to
    /// sample one sentence within the retry budget.
    pub fn simulate(&self, requester_id: u64, target_id: u64) -> Result<Simulation, BotError> {
        let messages = self.database.messages(target_id)?;
        if messages.len() < MIN_MESSAGES {
            info!(
                target_id,
                stored = messages.len(),
                "not enough data to simulate"
            );
            return Ok(Simulation::InsufficientData);
        }

        let corpus = messages.join("\n");
        let model = TextModel::new(&corpus);
        let result = model.make_sentence(TRIES);

        self.logger.log_simulation(
            requester_id,
            target_id,
            result.as_deref().unwrap_or("<no sentence>"),
        );

        Ok(match result {
            Some(sentence) => Simulation::Sentence(sentence),
            None => Simulation::Exhausted,
        })
    }
}
