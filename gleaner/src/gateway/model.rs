//! Gateway entities and the events published about them.

use bitflags::bitflags;
use gleaner_core::BusEvent;
use std::fmt;

macro_rules! snowflake {
    ($($(#[$meta:meta])* $name:ident;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub u64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<u64> for $name {
                fn from(id: u64) -> Self {
                    Self(id)
                }
            }
        )+
    };
}

snowflake! {
    /// Identifies a channel or thread.
    ChannelId;
    /// Identifies a guild.
    GuildId;
    /// Identifies a message.
    MessageId;
    /// Identifies a user.
    UserId;
    /// Identifies an interaction.
    InteractionId;
}

/// A text channel or thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// The channel's id.
    pub id: ChannelId,
    /// The owning guild. `None` for direct messages.
    pub guild_id: Option<GuildId>,
    /// The parent category, or the parent channel of a thread.
    pub parent_id: Option<ChannelId>,
}

impl Channel {
    /// A channel outside any guild.
    pub fn direct(id: u64) -> Self {
        Self {
            id: ChannelId(id),
            guild_id: None,
            parent_id: None,
        }
    }

    /// A channel of `guild`.
    pub fn in_guild(id: u64, guild: u64) -> Self {
        Self {
            id: ChannelId(id),
            guild_id: Some(GuildId(guild)),
            parent_id: None,
        }
    }

    /// Set the parent category or thread parent.
    pub fn with_parent(mut self, parent: u64) -> Self {
        self.parent_id = Some(ChannelId(parent));
        self
    }

    /// Whether deleting `deleted` takes this channel with it.
    pub fn is_removed_with(&self, deleted: &Channel) -> bool {
        deleted.id == self.id || Some(deleted.id) == self.parent_id
    }
}

/// A message. Two messages are equal when their ids are.
#[derive(Debug, Clone)]
pub struct Message {
    /// The message's id.
    pub id: MessageId,
    /// Where it was posted.
    pub channel: Channel,
    /// Who posted it.
    pub author_id: UserId,
    /// Its text.
    pub content: String,
    /// The interaction this message answers, if any.
    pub interaction_id: Option<InteractionId>,
}

impl Message {
    /// A message without an originating interaction.
    pub fn new(id: u64, channel: Channel, author: u64, content: impl Into<String>) -> Self {
        Self {
            id: MessageId(id),
            channel,
            author_id: UserId(author),
            content: content.into(),
            interaction_id: None,
        }
    }

    /// Mark the message as the response to `interaction`.
    pub fn answering(mut self, interaction: u64) -> Self {
        self.interaction_id = Some(InteractionId(interaction));
        self
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Message {}

/// A deleted message, as much of it as the gateway still knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletedMessage {
    /// The full message was cached.
    Cached(Message),
    /// Only the ids are known.
    Uncached {
        /// The message's id.
        id: MessageId,
        /// Where it was posted.
        channel_id: ChannelId,
    },
}

impl DeletedMessage {
    /// The deleted message's id.
    pub fn id(&self) -> MessageId {
        match self {
            DeletedMessage::Cached(message) => message.id,
            DeletedMessage::Uncached { id, .. } => *id,
        }
    }

    /// The channel the message was posted in.
    pub fn channel_id(&self) -> ChannelId {
        match self {
            DeletedMessage::Cached(message) => message.channel.id,
            DeletedMessage::Uncached { channel_id, .. } => *channel_id,
        }
    }

    /// The interaction the message answered, if known.
    pub fn interaction_id(&self) -> Option<InteractionId> {
        match self {
            DeletedMessage::Cached(message) => message.interaction_id,
            DeletedMessage::Uncached { .. } => None,
        }
    }

    /// The message itself, or a stand-in carrying only the ids.
    pub fn into_message(self) -> Message {
        match self {
            DeletedMessage::Cached(message) => message,
            DeletedMessage::Uncached { id, channel_id } => Message {
                id,
                channel: Channel::direct(channel_id.0),
                author_id: UserId(0),
                content: String::new(),
                interaction_id: None,
            },
        }
    }
}

/// A reaction emoji. Custom emojis carry an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Emoji {
    /// Set for custom emojis.
    pub id: Option<u64>,
    /// The unicode emoji, or the custom emoji's name.
    pub name: String,
}

impl Emoji {
    /// A unicode emoji.
    pub fn unicode(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// A custom guild emoji.
    pub fn custom(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }
}

/// One user's reaction on one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    /// The reacted-to message.
    pub message_id: MessageId,
    /// The message's channel.
    pub channel_id: ChannelId,
    /// The message's guild, if any.
    pub guild_id: Option<GuildId>,
    /// The emoji used.
    pub emoji: Emoji,
    /// Who reacted.
    pub user_id: UserId,
}

impl Reaction {
    /// `user` reacting to `message` with `emoji`.
    pub fn new(message: &Message, emoji: Emoji, user: u64) -> Self {
        Self {
            message_id: message.id,
            channel_id: message.channel.id,
            guild_id: message.channel.guild_id,
            emoji,
            user_id: UserId(user),
        }
    }
}

/// The interaction kinds a collector can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// A button press or select menu choice.
    MessageComponent,
    /// A submitted modal.
    ModalSubmit,
}

/// The component kinds an interaction can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// A button.
    Button,
    /// A select menu.
    SelectMenu,
    /// A modal text input.
    TextInput,
}

/// Payload of an interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionData {
    /// The developer-defined id of the component or modal.
    pub custom_id: String,
    /// Set for message component interactions.
    pub component_kind: Option<ComponentKind>,
    /// Selected values or submitted text.
    pub values: Vec<String>,
}

/// The message a component interaction was triggered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionMessage {
    /// That message's id.
    pub id: MessageId,
    /// The interaction that message answered, if any.
    pub interaction_id: Option<InteractionId>,
}

/// A component or modal interaction. Two interactions are equal when their
/// ids are.
#[derive(Debug, Clone)]
pub struct Interaction {
    /// The interaction's id.
    pub id: InteractionId,
    /// What kind of interaction this is.
    pub kind: InteractionKind,
    /// Where it happened.
    pub channel: Channel,
    /// The guild it happened in, if any.
    pub guild_id: Option<GuildId>,
    /// Who triggered it.
    pub user_id: UserId,
    /// Its payload.
    pub data: InteractionData,
    /// The source message of a component interaction.
    pub message: Option<InteractionMessage>,
}

impl Interaction {
    /// A `component` interaction on `message`.
    pub fn component(
        id: u64,
        message: &Message,
        component: ComponentKind,
        user: u64,
        custom_id: impl Into<String>,
    ) -> Self {
        Self {
            id: InteractionId(id),
            kind: InteractionKind::MessageComponent,
            channel: message.channel.clone(),
            guild_id: message.channel.guild_id,
            user_id: UserId(user),
            data: InteractionData {
                custom_id: custom_id.into(),
                component_kind: Some(component),
                values: Vec::new(),
            },
            message: Some(InteractionMessage {
                id: message.id,
                interaction_id: message.interaction_id,
            }),
        }
    }

    /// A modal submitted in `channel`.
    pub fn modal_submit(
        id: u64,
        channel: Channel,
        user: u64,
        custom_id: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        Self {
            id: InteractionId(id),
            kind: InteractionKind::ModalSubmit,
            guild_id: channel.guild_id,
            channel,
            user_id: UserId(user),
            data: InteractionData {
                custom_id: custom_id.into(),
                component_kind: None,
                values,
            },
            message: None,
        }
    }
}

impl PartialEq for Interaction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Interaction {}

/// Events published on the gateway bus.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// A message was posted.
    MessageCreate(Message),
    /// A message was deleted.
    MessageDelete(DeletedMessage),
    /// Several messages of one channel were deleted at once.
    MessageDeleteBulk(Vec<DeletedMessage>),
    /// A reaction was added.
    ReactionAdd(Reaction),
    /// A reaction was removed.
    ReactionRemove(Reaction),
    /// Every reaction was removed from a message.
    ReactionRemoveAll {
        /// The cleared message.
        message_id: MessageId,
        /// Its channel.
        channel_id: ChannelId,
    },
    /// An interaction was received.
    InteractionCreate(Interaction),
    /// A channel or category was deleted.
    ChannelDelete(Channel),
    /// A thread was deleted.
    ThreadDelete(Channel),
    /// A guild became unavailable or was left.
    GuildDelete(GuildId),
}

/// The names [`GatewayEvent`]s are published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayEventKind {
    /// [`GatewayEvent::MessageCreate`]
    MessageCreate,
    /// [`GatewayEvent::MessageDelete`]
    MessageDelete,
    /// [`GatewayEvent::MessageDeleteBulk`]
    MessageDeleteBulk,
    /// [`GatewayEvent::ReactionAdd`]
    ReactionAdd,
    /// [`GatewayEvent::ReactionRemove`]
    ReactionRemove,
    /// [`GatewayEvent::ReactionRemoveAll`]
    ReactionRemoveAll,
    /// [`GatewayEvent::InteractionCreate`]
    InteractionCreate,
    /// [`GatewayEvent::ChannelDelete`]
    ChannelDelete,
    /// [`GatewayEvent::ThreadDelete`]
    ThreadDelete,
    /// [`GatewayEvent::GuildDelete`]
    GuildDelete,
}

impl BusEvent for GatewayEvent {
    type Kind = GatewayEventKind;

    fn kind(&self) -> GatewayEventKind {
        match self {
            GatewayEvent::MessageCreate(_) => GatewayEventKind::MessageCreate,
            GatewayEvent::MessageDelete(_) => GatewayEventKind::MessageDelete,
            GatewayEvent::MessageDeleteBulk(_) => GatewayEventKind::MessageDeleteBulk,
            GatewayEvent::ReactionAdd(_) => GatewayEventKind::ReactionAdd,
            GatewayEvent::ReactionRemove(_) => GatewayEventKind::ReactionRemove,
            GatewayEvent::ReactionRemoveAll { .. } => GatewayEventKind::ReactionRemoveAll,
            GatewayEvent::InteractionCreate(_) => GatewayEventKind::InteractionCreate,
            GatewayEvent::ChannelDelete(_) => GatewayEventKind::ChannelDelete,
            GatewayEvent::ThreadDelete(_) => GatewayEventKind::ThreadDelete,
            GatewayEvent::GuildDelete(_) => GatewayEventKind::GuildDelete,
        }
    }
}

/// Why a gateway collector's scope went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeEnd {
    /// The guild was deleted.
    GuildDelete,
    /// The channel or its parent category was deleted.
    ChannelDelete,
    /// The thread was deleted.
    ThreadDelete,
    /// The watched message was deleted.
    MessageDelete,
}

impl fmt::Display for ScopeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScopeEnd::GuildDelete => "guildDelete",
            ScopeEnd::ChannelDelete => "channelDelete",
            ScopeEnd::ThreadDelete => "threadDelete",
            ScopeEnd::MessageDelete => "messageDelete",
        })
    }
}

bitflags! {
    /// Deletion signals a collector stops on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Signals: u8 {
        /// Deletion of the watched message.
        const MESSAGE = 1 << 0;
        /// Deletion of the channel, its parent, or the thread.
        const CHANNEL = 1 << 1;
        /// Deletion of the guild.
        const GUILD = 1 << 2;
    }
}

impl Signals {
    /// The invalidation routes these signals subscribe to.
    pub(crate) fn kinds(self) -> Vec<GatewayEventKind> {
        let mut kinds = Vec::new();
        if self.contains(Signals::MESSAGE) {
            kinds.extend([
                GatewayEventKind::MessageDelete,
                GatewayEventKind::MessageDeleteBulk,
            ]);
        }
        if self.contains(Signals::CHANNEL) {
            kinds.extend([GatewayEventKind::ChannelDelete, GatewayEventKind::ThreadDelete]);
        }
        if self.contains(Signals::GUILD) {
            kinds.push(GatewayEventKind::GuildDelete);
        }
        kinds
    }
}

/// Stop reason for a collector living in `channel`, if `event` deletes the
/// channel, its parent, the thread or the guild.
pub(crate) fn container_end(channel: &Channel, event: &GatewayEvent) -> Option<ScopeEnd> {
    match event {
        GatewayEvent::ChannelDelete(deleted) if channel.is_removed_with(deleted) => {
            Some(ScopeEnd::ChannelDelete)
        }
        GatewayEvent::ThreadDelete(deleted) if deleted.id == channel.id => {
            Some(ScopeEnd::ThreadDelete)
        }
        GatewayEvent::GuildDelete(guild) if channel.guild_id == Some(*guild) => {
            Some(ScopeEnd::GuildDelete)
        }
        _ => None,
    }
}
