//! Component and modal interactions.

use super::{
    GatewayBus,
    model::{
        Channel, ComponentKind, DeletedMessage, GatewayEvent, GatewayEventKind, GuildId,
        Interaction, InteractionId, InteractionKind, Message, MessageId, ScopeEnd, Signals,
        container_end,
    },
};
use gleaner_core::{ConfigError, Route, Scope};
use gleaner_std::{CollectorOptions, ScopedCollector};

/// Where an [`InteractionCollector`] looks for interactions.
///
/// Every field is optional; unset fields do not restrict anything. The
/// channel and guild fall back to those of the interaction, then of the
/// message, when not given explicitly.
#[derive(Debug, Clone, Default)]
pub struct InteractionOptions {
    /// Only interactions in this channel.
    pub channel: Option<Channel>,
    /// Only interactions in this guild.
    pub guild_id: Option<GuildId>,
    /// Only component interactions on this message.
    pub message: Option<Message>,
    /// Only component interactions on the response to this interaction.
    pub interaction: Option<Interaction>,
    /// Only interactions of this kind.
    pub interaction_kind: Option<InteractionKind>,
    /// Only component interactions from this kind of component.
    pub component_kind: Option<ComponentKind>,
}

impl InteractionOptions {
    /// Unrestricted options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to `channel`.
    pub fn channel(mut self, channel: Channel) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Restrict to `guild`.
    pub fn guild(mut self, guild: GuildId) -> Self {
        self.guild_id = Some(guild);
        self
    }

    /// Restrict to components on `message`.
    pub fn message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }

    /// Restrict to components on the response to `interaction`.
    pub fn interaction(mut self, interaction: Interaction) -> Self {
        self.interaction = Some(interaction);
        self
    }

    /// Restrict to one interaction kind.
    pub fn interaction_kind(mut self, kind: InteractionKind) -> Self {
        self.interaction_kind = Some(kind);
        self
    }

    /// Restrict to one component kind.
    pub fn component_kind(mut self, kind: ComponentKind) -> Self {
        self.component_kind = Some(kind);
        self
    }
}

/// Scope of an [`InteractionCollector`], resolved from
/// [`InteractionOptions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionScope {
    message_id: Option<MessageId>,
    interaction_id: Option<InteractionId>,
    channel: Option<Channel>,
    guild_id: Option<GuildId>,
    interaction_kind: Option<InteractionKind>,
    component_kind: Option<ComponentKind>,
}

impl InteractionScope {
    /// Resolve `options` into a scope.
    pub fn new(options: InteractionOptions) -> Self {
        let InteractionOptions {
            channel,
            guild_id,
            message,
            interaction,
            interaction_kind,
            component_kind,
        } = options;

        let guild_id = interaction
            .as_ref()
            .and_then(|interaction| interaction.guild_id)
            .or_else(|| message.as_ref().and_then(|message| message.channel.guild_id))
            .or(guild_id)
            .or_else(|| channel.as_ref().and_then(|channel| channel.guild_id));
        let message_id = message.as_ref().map(|message| message.id);
        let interaction_id = interaction.as_ref().map(|interaction| interaction.id);
        let channel = interaction
            .map(|interaction| interaction.channel)
            .or_else(|| message.map(|message| message.channel))
            .or(channel);

        Self {
            message_id,
            interaction_id,
            channel,
            guild_id,
            interaction_kind,
            component_kind,
        }
    }

    /// The deletion signals this scope stops on.
    pub fn signals(&self) -> Signals {
        let mut signals = Signals::empty();
        signals.set(
            Signals::MESSAGE,
            self.message_id.is_some() || self.interaction_id.is_some(),
        );
        signals.set(Signals::CHANNEL, self.channel.is_some());
        signals.set(Signals::GUILD, self.guild_id.is_some());
        signals
    }

    /// The resolved channel, if any.
    pub fn channel(&self) -> Option<&Channel> {
        self.channel.as_ref()
    }

    /// The resolved guild, if any.
    pub fn guild_id(&self) -> Option<GuildId> {
        self.guild_id
    }

    fn matches(&self, interaction: &Interaction) -> bool {
        if self
            .interaction_kind
            .is_some_and(|kind| kind != interaction.kind)
        {
            return false;
        }
        if interaction.kind == InteractionKind::MessageComponent {
            let source = interaction.message.as_ref();
            if self
                .component_kind
                .is_some_and(|kind| interaction.data.component_kind != Some(kind))
            {
                return false;
            }
            if self
                .message_id
                .is_some_and(|id| source.map(|message| message.id) != Some(id))
            {
                return false;
            }
            if self.interaction_id.is_some_and(|id| {
                source.and_then(|message| message.interaction_id) != Some(id)
            }) {
                return false;
            }
        }
        if self
            .channel
            .as_ref()
            .is_some_and(|channel| channel.id != interaction.channel.id)
        {
            return false;
        }
        if self
            .guild_id
            .is_some_and(|guild| interaction.guild_id != Some(guild))
        {
            return false;
        }
        true
    }

    fn deletes_watched(&self, deleted: &DeletedMessage) -> bool {
        self.message_id == Some(deleted.id())
            || (self.interaction_id.is_some() && self.interaction_id == deleted.interaction_id())
    }

    fn candidate(&self, event: &GatewayEvent) -> Option<Interaction> {
        match event {
            GatewayEvent::InteractionCreate(interaction) if self.matches(interaction) => {
                Some(interaction.clone())
            }
            _ => None,
        }
    }
}

impl Scope for InteractionScope {
    type Event = GatewayEvent;
    type Item = Interaction;
    type Reason = ScopeEnd;

    fn routes(&self) -> Vec<Route<GatewayEventKind>> {
        let mut routes = vec![Route::Collect(GatewayEventKind::InteractionCreate)];
        routes.extend(self.signals().kinds().into_iter().map(Route::Invalidate));
        routes
    }

    fn collectible(&self, event: &GatewayEvent) -> Option<Interaction> {
        self.candidate(event)
    }

    fn disposed(&self, event: &GatewayEvent) -> Option<Interaction> {
        self.candidate(event)
    }

    fn invalidated(&self, event: &GatewayEvent) -> Option<ScopeEnd> {
        match event {
            GatewayEvent::MessageDelete(deleted) if self.deletes_watched(deleted) => {
                Some(ScopeEnd::MessageDelete)
            }
            GatewayEvent::MessageDeleteBulk(deleted)
                if deleted.iter().any(|message| self.deletes_watched(message)) =>
            {
                Some(ScopeEnd::MessageDelete)
            }
            GatewayEvent::GuildDelete(guild) if self.guild_id == Some(*guild) => {
                Some(ScopeEnd::GuildDelete)
            }
            _ => self
                .channel
                .as_ref()
                .and_then(|channel| container_end(channel, event)),
        }
    }
}

/// Collects component or modal interactions.
pub type InteractionCollector = ScopedCollector<InteractionScope>;

async fn await_single(
    bus: &GatewayBus,
    scope: InteractionOptions,
    kind: InteractionKind,
    options: CollectorOptions<Interaction>,
) -> Result<Option<Interaction>, ConfigError> {
    let scope = InteractionScope::new(scope.interaction_kind(kind));
    let collector = InteractionCollector::attach(bus, scope, options.max(1))?;
    let (interactions, _) = collector.finished().await;
    Ok(interactions.into_iter().next())
}

/// Wait for one component interaction within `scope`.
///
/// Resolves with `None` if the collector ends before one arrives.
pub async fn await_component_interaction(
    bus: &GatewayBus,
    scope: InteractionOptions,
    options: CollectorOptions<Interaction>,
) -> Result<Option<Interaction>, ConfigError> {
    await_single(bus, scope, InteractionKind::MessageComponent, options).await
}

/// Wait for one modal submission within `scope`.
///
/// Resolves with `None` if the collector ends before one arrives.
pub async fn await_modal_submit(
    bus: &GatewayBus,
    scope: InteractionOptions,
    options: CollectorOptions<Interaction>,
) -> Result<Option<Interaction>, ConfigError> {
    await_single(bus, scope, InteractionKind::ModalSubmit, options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> Message {
        Message::new(50, Channel::in_guild(10, 1), 3, "pick one")
    }

    #[test]
    fn test_resolution_prefers_interaction_then_message() {
        let origin = Interaction::modal_submit(9, Channel::in_guild(20, 2), 4, "form", vec![]);
        let scope = InteractionScope::new(
            InteractionOptions::new()
                .message(prompt())
                .interaction(origin)
                .channel(Channel::in_guild(30, 3)),
        );
        assert_eq!(scope.channel().map(|channel| channel.id.0), Some(20));
        assert_eq!(scope.guild_id(), Some(GuildId(2)));

        let scope = InteractionScope::new(InteractionOptions::new().message(prompt()));
        assert_eq!(scope.channel().map(|channel| channel.id.0), Some(10));
        assert_eq!(scope.guild_id(), Some(GuildId(1)));
    }

    #[test]
    fn test_signals_follow_configured_fields() {
        assert_eq!(InteractionScope::new(InteractionOptions::new()).signals(), Signals::empty());
        assert_eq!(
            InteractionScope::new(InteractionOptions::new().channel(Channel::direct(4))).signals(),
            Signals::CHANNEL
        );
        assert_eq!(
            InteractionScope::new(InteractionOptions::new().message(prompt())).signals(),
            Signals::all()
        );
        assert_eq!(
            InteractionScope::new(InteractionOptions::new()).routes(),
            vec![Route::Collect(GatewayEventKind::InteractionCreate)]
        );
    }

    #[test]
    fn test_component_filters() {
        let scope = InteractionScope::new(
            InteractionOptions::new()
                .message(prompt())
                .component_kind(ComponentKind::Button),
        );
        let press = Interaction::component(1, &prompt(), ComponentKind::Button, 7, "yes");
        let select = Interaction::component(2, &prompt(), ComponentKind::SelectMenu, 7, "menu");
        let other_message = Message::new(51, Channel::in_guild(10, 1), 3, "other");
        let stray = Interaction::component(3, &other_message, ComponentKind::Button, 7, "yes");

        assert!(scope.matches(&press));
        assert!(!scope.matches(&select));
        assert!(!scope.matches(&stray));
    }

    #[test]
    fn test_message_filters_skip_modals() {
        let scope = InteractionScope::new(InteractionOptions::new().message(prompt()));
        let modal = Interaction::modal_submit(4, Channel::in_guild(10, 1), 7, "form", vec![]);
        assert!(scope.matches(&modal));

        let kind_scope = InteractionScope::new(
            InteractionOptions::new().interaction_kind(InteractionKind::MessageComponent),
        );
        assert!(!kind_scope.matches(&modal));
    }

    #[test]
    fn test_deletion_by_originating_interaction() {
        let origin = Interaction::modal_submit(9, Channel::in_guild(10, 1), 4, "form", vec![]);
        let scope = InteractionScope::new(InteractionOptions::new().interaction(origin));
        let response = Message::new(60, Channel::in_guild(10, 1), 3, "thanks").answering(9);

        assert_eq!(
            scope.invalidated(&GatewayEvent::MessageDelete(DeletedMessage::Cached(response))),
            Some(ScopeEnd::MessageDelete)
        );
        assert_eq!(
            scope.invalidated(&GatewayEvent::MessageDelete(DeletedMessage::Uncached {
                id: MessageId(61),
                channel_id: Channel::in_guild(10, 1).id,
            })),
            None
        );
    }
}
