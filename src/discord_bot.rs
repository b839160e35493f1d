use std::sync::Arc;

use serenity::all::{Context, EventHandler, Message, Ready};
use serenity::async_trait;
use tracing::{error, info, warn};

use crate::service::{Simulation, SimulatorService, MIN_MESSAGES};

const PERMISSION_GRANTED: &str =
    "All your messages will be saved to be analyzed from now on. Run this command again to toggle it.";
const PERMISSION_REVOKED: &str =
    "Your messages will no longer be saved. Run this command again to toggle it.";
const PURGED: &str = "All your messages have been purged from our database.";
const NO_SENTENCE: &str = "Unable to make a sentence.";

pub struct BotHandler {
    service: Arc<SimulatorService>,
    prefix: char,
}

impl BotHandler {
    pub fn new(service: Arc<SimulatorService>, prefix: char) -> Self {
        Self { service, prefix }
    }

    async fn dispatch(&self, ctx: &Context, msg: &Message, input: &str) {
        let mut parts = input.split_whitespace();
        match parts.next() {
            Some("permission") => self.handle_permission(ctx, msg).await,
            Some("purge") => self.handle_purge(ctx, msg).await,
            Some("simulate") => {
                let target = match parts.next() {
                    None => msg.author.id.get(),
                    Some(arg) => match arg.parse() {
                        Ok(id) => id,
                        Err(_) => {
                            warn!(argument = arg, "simulate target is not a user id");
                            return;
                        }
                    },
                };
                self.handle_simulate(ctx, msg, target).await;
            }
            _ => {}
        }
    }

    async fn handle_permission(&self, ctx: &Context, msg: &Message) {
        match self.service.toggle_permission(msg.author.id.get()) {
            Ok(true) => self.reply(ctx, msg, PERMISSION_GRANTED).await,
            Ok(false) => self.reply(ctx, msg, PERMISSION_REVOKED).await,
            Err(e) => self.report(&e),
        }
    }

    async fn handle_purge(&self, ctx: &Context, msg: &Message) {
        match self.service.purge(msg.author.id.get()) {
            Ok(()) => self.reply(ctx, msg, PURGED).await,
            Err(e) => self.report(&e),
        }
    }

    async fn handle_simulate(&self, ctx: &Context, msg: &Message, target: u64) {
        match self.service.simulate(msg.author.id.get(), target) {
            Ok(Simulation::Sentence(sentence)) => self.reply(ctx, msg, &sentence).await,
            Ok(Simulation::InsufficientData) => {
                let text = format!(
                    "I don't have enough data to simulate this user. I need at least {MIN_MESSAGES} messages."
                );
                self.reply(ctx, msg, &text).await;
            }
            Ok(Simulation::Exhausted) => self.reply(ctx, msg, NO_SENTENCE).await,
            Err(e) => self.report(&e),
        }
    }

    async fn reply(&self, ctx: &Context, msg: &Message, content: &str) {
        if let Err(e) = msg.reply(&ctx.http, content).await {
            error!("Failed to send reply: {}", e);
        }
    }

    /// A storage failure aborts only the in-flight command; the gateway
    /// loop keeps serving.
    fn report(&self, error: &crate::error::BotError) {
        error!("{}", error);
        self.service.logger().log_error(&error.to_string());
    }
}

#[async_trait]
impl EventHandler for BotHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected", ready.user.name);
        self.service.logger().log_ready();
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        if let Some(rest) = msg.content.strip_prefix(self.prefix) {
            self.dispatch(&ctx, &msg, rest).await;
            return;
        }

        if let Err(e) = self.service.ingest(msg.author.id.get(), &msg.content) {
            self.report(&e);
        }
    }
}
