use gleaner::{
    CollectorOptions, EndReason, EventKind,
    gateway::{
        Channel, DeletedMessage, GatewayBus, GatewayEvent, GuildId, Message, MessageCollector,
        MessageId, MessageScope, ScopeEnd, await_messages,
    },
    testing::RecordingObserver,
};
use std::time::Duration;

mod common;
use common::{CATEGORY, GENERAL, GUILD, general, post, publish_all, random};

fn contents(collector: &MessageCollector) -> Vec<String> {
    collector
        .collected()
        .into_iter()
        .map(|message| message.content)
        .collect()
}

#[tokio::test]
async fn test_collects_channel_messages_in_order() {
    let bus = GatewayBus::new();
    let collector =
        MessageCollector::attach(&bus, MessageScope::new(general()), CollectorOptions::new())
            .unwrap();

    publish_all(
        &bus,
        [
            post(1, general(), "first"),
            post(2, random(), "elsewhere"),
            post(3, general(), "second"),
        ],
    )
    .await;

    assert_eq!(contents(&collector), vec!["first", "second"]);
}

#[tokio::test]
async fn test_filter_and_limit() {
    let bus = GatewayBus::new();
    let collector = MessageCollector::attach(
        &bus,
        MessageScope::new(general()),
        CollectorOptions::new()
            .filter(|message: &Message| !message.content.starts_with('!'))
            .max(2),
    )
    .unwrap();
    let observer = RecordingObserver::attach(&collector);

    publish_all(
        &bus,
        [
            post(1, general(), "!command"),
            post(2, general(), "a"),
            post(3, general(), "b"),
            post(4, general(), "c"),
        ],
    )
    .await;

    assert_eq!(contents(&collector), vec!["a", "b"]);
    assert_eq!(observer.count(EventKind::Ignore), 1);
    assert_eq!(collector.end_reason(), Some(EndReason::Limit));
    assert_eq!(bus.total_listeners(), 0);
}

#[tokio::test]
async fn test_deletions_dispose_messages() {
    let bus = GatewayBus::new();
    let collector = MessageCollector::attach(
        &bus,
        MessageScope::new(general()),
        CollectorOptions::new().dispose(true),
    )
    .unwrap();
    let observer = RecordingObserver::attach(&collector);

    publish_all(&bus, (1..=4).map(|id| post(id, general(), "spam"))).await;
    publish_all(
        &bus,
        [
            GatewayEvent::MessageDelete(DeletedMessage::Uncached {
                id: MessageId(1),
                channel_id: general().id,
            }),
            GatewayEvent::MessageDeleteBulk(vec![
                DeletedMessage::Uncached {
                    id: MessageId(2),
                    channel_id: general().id,
                },
                DeletedMessage::Uncached {
                    id: MessageId(3),
                    channel_id: general().id,
                },
            ]),
        ],
    )
    .await;

    let remaining: Vec<MessageId> = collector.collected().iter().map(|m| m.id).collect();
    assert_eq!(remaining, vec![MessageId(4)]);
    // Disposal reports the collected message, not the stand-in.
    assert!(observer.disposed().iter().all(|m| m.content == "spam"));
    assert_eq!(observer.disposed().len(), 3);
}

#[tokio::test]
async fn test_deletion_in_other_channel_is_ignored() {
    let bus = GatewayBus::new();
    let collector = MessageCollector::attach(
        &bus,
        MessageScope::new(general()),
        CollectorOptions::new().dispose(true),
    )
    .unwrap();

    publish_all(
        &bus,
        [
            post(1, general(), "keep"),
            GatewayEvent::MessageDelete(DeletedMessage::Uncached {
                id: MessageId(1),
                channel_id: random().id,
            }),
        ],
    )
    .await;

    assert_eq!(contents(&collector), vec!["keep"]);
}

#[tokio::test]
async fn test_parent_category_deletion_stops() {
    let bus = GatewayBus::new();
    let collector =
        MessageCollector::attach(&bus, MessageScope::new(general()), CollectorOptions::new())
            .unwrap();

    publish_all(
        &bus,
        [
            post(1, general(), "before"),
            GatewayEvent::ChannelDelete(Channel::in_guild(CATEGORY, GUILD)),
            post(2, general(), "after"),
        ],
    )
    .await;

    assert_eq!(collector.end_reason(), Some(EndReason::Scope(ScopeEnd::ChannelDelete)));
    assert_eq!(contents(&collector), vec!["before"]);
    assert!(!collector.is_attached());
}

#[tokio::test]
async fn test_thread_and_guild_deletion() {
    let bus = GatewayBus::new();
    let thread = Channel::in_guild(40, GUILD).with_parent(GENERAL);
    let in_thread =
        MessageCollector::attach(&bus, MessageScope::new(thread.clone()), CollectorOptions::new())
            .unwrap();
    let in_random =
        MessageCollector::attach(&bus, MessageScope::new(random()), CollectorOptions::new())
            .unwrap();

    bus.publish(&GatewayEvent::ThreadDelete(thread)).await;
    assert_eq!(in_thread.end_reason(), Some(EndReason::Scope(ScopeEnd::ThreadDelete)));
    assert!(!in_random.is_ended());

    bus.publish(&GatewayEvent::GuildDelete(GuildId(GUILD))).await;
    assert_eq!(in_random.end_reason(), Some(EndReason::Scope(ScopeEnd::GuildDelete)));
    assert_eq!(bus.total_listeners(), 0);
}

#[tokio::test]
async fn test_direct_channel_ignores_guild_deletion() {
    let bus = GatewayBus::new();
    let collector = MessageCollector::attach(
        &bus,
        MessageScope::new(Channel::direct(77)),
        CollectorOptions::new(),
    )
    .unwrap();

    bus.publish(&GatewayEvent::GuildDelete(GuildId(GUILD))).await;
    assert!(!collector.is_ended());
}

#[tokio::test(start_paused = true)]
async fn test_await_messages_resolves_on_idle() {
    let bus = GatewayBus::new();
    let waiting = tokio::spawn({
        let bus = bus.clone();
        async move {
            await_messages(
                &bus,
                general(),
                CollectorOptions::new().idle(Duration::from_millis(30)),
            )
            .await
        }
    });
    tokio::task::yield_now().await;

    publish_all(&bus, [post(1, general(), "hi"), post(2, general(), "there")]).await;

    let messages = waiting.await.unwrap().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(bus.total_listeners(), 0);
}

#[tokio::test]
async fn test_await_messages_rejects_bad_options() {
    let bus = GatewayBus::new();
    let result = await_messages(&bus, general(), CollectorOptions::new().max(0)).await;
    assert!(result.is_err());
}
