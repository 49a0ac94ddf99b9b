//! Messages posted in one channel.

use super::{
    GatewayBus,
    model::{Channel, GatewayEvent, GatewayEventKind, Message, ScopeEnd, container_end},
};
use gleaner_core::{ConfigError, Route, Scope};
use gleaner_std::{CollectorOptions, ScopedCollector};

/// Scope of a [`MessageCollector`]: messages created in one channel.
///
/// Deleted messages are disposed, one by one for bulk deletions. The
/// collector stops when the channel, its parent category, the thread or the
/// guild is deleted.
#[derive(Debug, Clone)]
pub struct MessageScope {
    channel: Channel,
}

impl MessageScope {
    /// Watch `channel`.
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }

    /// The watched channel.
    pub fn channel(&self) -> &Channel {
        &self.channel
    }
}

impl Scope for MessageScope {
    type Event = GatewayEvent;
    type Item = Message;
    type Reason = ScopeEnd;

    fn routes(&self) -> Vec<Route<GatewayEventKind>> {
        vec![
            Route::Collect(GatewayEventKind::MessageCreate),
            Route::Dispose(GatewayEventKind::MessageDelete),
            Route::DisposeEach(GatewayEventKind::MessageDeleteBulk),
            Route::Invalidate(GatewayEventKind::ChannelDelete),
            Route::Invalidate(GatewayEventKind::ThreadDelete),
            Route::Invalidate(GatewayEventKind::GuildDelete),
        ]
    }

    fn collectible(&self, event: &GatewayEvent) -> Option<Message> {
        match event {
            GatewayEvent::MessageCreate(message) if message.channel.id == self.channel.id => {
                Some(message.clone())
            }
            _ => None,
        }
    }

    fn disposed(&self, event: &GatewayEvent) -> Option<Message> {
        match event {
            GatewayEvent::MessageDelete(deleted) if deleted.channel_id() == self.channel.id => {
                Some(deleted.clone().into_message())
            }
            _ => None,
        }
    }

    fn invalidated(&self, event: &GatewayEvent) -> Option<ScopeEnd> {
        container_end(&self.channel, event)
    }

    fn unbundle(&self, event: &GatewayEvent) -> Vec<GatewayEvent> {
        match event {
            GatewayEvent::MessageDeleteBulk(messages) => messages
                .iter()
                .cloned()
                .map(GatewayEvent::MessageDelete)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Collects messages posted in one channel.
pub type MessageCollector = ScopedCollector<MessageScope>;

/// Collect messages from `channel` until the collector ends, then return
/// them.
pub async fn await_messages(
    bus: &GatewayBus,
    channel: Channel,
    options: CollectorOptions<Message>,
) -> Result<Vec<Message>, ConfigError> {
    let collector = MessageCollector::attach(bus, MessageScope::new(channel), options)?;
    let (messages, _) = collector.finished().await;
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::model::{DeletedMessage, GuildId, MessageId};

    fn scope() -> MessageScope {
        MessageScope::new(Channel::in_guild(10, 1).with_parent(2))
    }

    #[test]
    fn test_collects_own_channel_only() {
        let scope = scope();
        let here = Message::new(1, Channel::in_guild(10, 1), 5, "a");
        let elsewhere = Message::new(2, Channel::in_guild(11, 1), 5, "b");

        assert_eq!(
            scope.collectible(&GatewayEvent::MessageCreate(here.clone())),
            Some(here)
        );
        assert_eq!(scope.collectible(&GatewayEvent::MessageCreate(elsewhere)), None);
    }

    #[test]
    fn test_bulk_deletion_unbundles() {
        let scope = scope();
        let bulk = GatewayEvent::MessageDeleteBulk(vec![
            DeletedMessage::Uncached {
                id: MessageId(1),
                channel_id: scope.channel().id,
            },
            DeletedMessage::Uncached {
                id: MessageId(2),
                channel_id: scope.channel().id,
            },
        ]);

        let parts = scope.unbundle(&bulk);
        assert_eq!(parts.len(), 2);
        assert_eq!(scope.disposed(&parts[1]).map(|m| m.id), Some(MessageId(2)));
    }

    #[test]
    fn test_invalidation_reasons() {
        let scope = scope();
        assert_eq!(
            scope.invalidated(&GatewayEvent::ChannelDelete(Channel::in_guild(2, 1))),
            Some(ScopeEnd::ChannelDelete)
        );
        assert_eq!(
            scope.invalidated(&GatewayEvent::GuildDelete(GuildId(1))),
            Some(ScopeEnd::GuildDelete)
        );
        assert_eq!(
            scope.invalidated(&GatewayEvent::GuildDelete(GuildId(7))),
            None
        );
    }
}
