//! Reactions on one message.

use super::{
    GatewayBus,
    model::{GatewayEvent, GatewayEventKind, Message, Reaction, ScopeEnd, container_end},
};
use gleaner_core::{ConfigError, Route, Scope};
use gleaner_std::{CollectorOptions, ScopedCollector};

/// Scope of a [`ReactionCollector`]: reactions added to one message.
///
/// Removing a reaction disposes it and removing all of the message's
/// reactions empties the collector. Deleting the message, alone or in bulk,
/// stops it with [`ScopeEnd::MessageDelete`]. So does deleting its channel,
/// parent category, thread or guild, with the matching reason.
#[derive(Debug, Clone)]
pub struct ReactionScope {
    message: Message,
}

impl ReactionScope {
    /// Watch `message`.
    pub fn new(message: Message) -> Self {
        Self { message }
    }

    /// The watched message.
    pub fn message(&self) -> &Message {
        &self.message
    }

    fn on_message(&self, reaction: &Reaction) -> Option<Reaction> {
        (reaction.message_id == self.message.id).then(|| reaction.clone())
    }
}

impl Scope for ReactionScope {
    type Event = GatewayEvent;
    type Item = Reaction;
    type Reason = ScopeEnd;

    fn routes(&self) -> Vec<Route<GatewayEventKind>> {
        vec![
            Route::Collect(GatewayEventKind::ReactionAdd),
            Route::Dispose(GatewayEventKind::ReactionRemove),
            Route::Empty(GatewayEventKind::ReactionRemoveAll),
            Route::Invalidate(GatewayEventKind::MessageDelete),
            Route::Invalidate(GatewayEventKind::MessageDeleteBulk),
            Route::Invalidate(GatewayEventKind::ChannelDelete),
            Route::Invalidate(GatewayEventKind::ThreadDelete),
            Route::Invalidate(GatewayEventKind::GuildDelete),
        ]
    }

    fn collectible(&self, event: &GatewayEvent) -> Option<Reaction> {
        match event {
            GatewayEvent::ReactionAdd(reaction) => self.on_message(reaction),
            _ => None,
        }
    }

    fn disposed(&self, event: &GatewayEvent) -> Option<Reaction> {
        match event {
            GatewayEvent::ReactionRemove(reaction) => self.on_message(reaction),
            _ => None,
        }
    }

    fn clears(&self, event: &GatewayEvent) -> bool {
        matches!(
            event,
            GatewayEvent::ReactionRemoveAll { message_id, .. } if *message_id == self.message.id
        )
    }

    fn invalidated(&self, event: &GatewayEvent) -> Option<ScopeEnd> {
        match event {
            GatewayEvent::MessageDelete(deleted) if deleted.id() == self.message.id => {
                Some(ScopeEnd::MessageDelete)
            }
            GatewayEvent::MessageDeleteBulk(deleted)
                if deleted.iter().any(|message| message.id() == self.message.id) =>
            {
                Some(ScopeEnd::MessageDelete)
            }
            _ => container_end(&self.message.channel, event),
        }
    }
}

/// Collects reactions on one message.
pub type ReactionCollector = ScopedCollector<ReactionScope>;

/// Collect reactions on `message` until the collector ends, then return
/// them.
pub async fn await_reactions(
    bus: &GatewayBus,
    message: Message,
    options: CollectorOptions<Reaction>,
) -> Result<Vec<Reaction>, ConfigError> {
    let collector = ReactionCollector::attach(bus, ReactionScope::new(message), options)?;
    let (reactions, _) = collector.finished().await;
    Ok(reactions)
}
