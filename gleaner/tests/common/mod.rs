#![allow(dead_code)]

use gleaner::{
    PublishReport,
    gateway::{
        Channel, ComponentKind, DeletedMessage, Emoji, GatewayBus, GatewayEvent, Interaction,
        Message, Reaction,
    },
};

// ============================================================================
// Fixtures
// ============================================================================

pub const GUILD: u64 = 1;
pub const CATEGORY: u64 = 2;
pub const GENERAL: u64 = 10;
pub const RANDOM: u64 = 11;

/// `#general`, inside a category of the test guild.
pub fn general() -> Channel {
    Channel::in_guild(GENERAL, GUILD).with_parent(CATEGORY)
}

/// `#random`, directly in the test guild.
pub fn random() -> Channel {
    Channel::in_guild(RANDOM, GUILD)
}

pub fn post(id: u64, channel: Channel, content: &str) -> GatewayEvent {
    GatewayEvent::MessageCreate(Message::new(id, channel, 100, content))
}

pub fn delete(message: &Message) -> GatewayEvent {
    GatewayEvent::MessageDelete(DeletedMessage::Cached(message.clone()))
}

pub fn react(message: &Message, emoji: &str, user: u64) -> Reaction {
    Reaction::new(message, Emoji::unicode(emoji), user)
}

pub fn press(id: u64, message: &Message, user: u64) -> GatewayEvent {
    GatewayEvent::InteractionCreate(Interaction::component(
        id,
        message,
        ComponentKind::Button,
        user,
        "confirm",
    ))
}

// ============================================================================
// Helpers
// ============================================================================

/// Publish `events` in order, asserting every listener succeeded.
pub async fn publish_all(bus: &GatewayBus, events: impl IntoIterator<Item = GatewayEvent>) {
    for event in events {
        let report: PublishReport = bus.publish(&event).await;
        assert!(report.is_ok(), "listener failed for {event:?}: {report:?}");
    }
}
