//! # Gateway collectors
//!
//! Collectors scoped to a chat gateway: messages posted in a channel,
//! reactions on a message, and component or modal interactions.
//!
//! Each collector is a [`ScopedCollector`](gleaner_std::ScopedCollector)
//! listening on an [`EventBus`](gleaner_std::EventBus) of [`GatewayEvent`]s.
//! It stops with a [`ScopeEnd`] reason when its channel, the channel's
//! parent, its thread, its guild or its watched message is deleted.

mod interaction;
mod message;
mod model;
mod reaction;

pub use interaction::{
    InteractionCollector, InteractionOptions, InteractionScope, await_component_interaction,
    await_modal_submit,
};
pub use message::{MessageCollector, MessageScope, await_messages};
pub use model::{
    Channel, ChannelId, ComponentKind, DeletedMessage, Emoji, GatewayEvent, GatewayEventKind,
    GuildId, Interaction, InteractionData, InteractionId, InteractionKind, InteractionMessage,
    Message, MessageId, Reaction, ScopeEnd, Signals, UserId,
};
pub use reaction::{ReactionCollector, ReactionScope, await_reactions};

use gleaner_std::EventBus;

/// The bus gateway collectors attach to.
pub type GatewayBus = EventBus<GatewayEvent>;
