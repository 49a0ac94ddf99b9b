use gleaner::{
    CollectorOptions, EndReason,
    gateway::{
        Channel, ChannelId, DeletedMessage, GatewayBus, GatewayEvent, Message, MessageId,
        Reaction, ReactionCollector, ReactionScope, ScopeEnd, await_reactions,
    },
    testing::RecordingObserver,
};

mod common;
use common::{CATEGORY, GUILD, delete, general, publish_all, react};

fn poll() -> Message {
    Message::new(500, general(), 1, "lunch?")
}

fn watch(bus: &GatewayBus, options: CollectorOptions<Reaction>) -> ReactionCollector {
    ReactionCollector::attach(bus, ReactionScope::new(poll()), options).unwrap()
}

#[tokio::test]
async fn test_add_and_remove() {
    let bus = GatewayBus::new();
    let collector = watch(&bus, CollectorOptions::new().dispose(true));
    let other = Message::new(501, general(), 1, "unrelated");

    publish_all(
        &bus,
        [
            GatewayEvent::ReactionAdd(react(&poll(), "🍕", 7)),
            GatewayEvent::ReactionAdd(react(&poll(), "🍣", 8)),
            GatewayEvent::ReactionAdd(react(&other, "🍕", 7)),
            GatewayEvent::ReactionRemove(react(&poll(), "🍕", 7)),
        ],
    )
    .await;

    assert_eq!(collector.collected(), vec![react(&poll(), "🍣", 8)]);
}

#[tokio::test]
async fn test_remove_all_empties_watched_message() {
    let bus = GatewayBus::new();
    let collector = watch(&bus, CollectorOptions::new());

    publish_all(
        &bus,
        [
            GatewayEvent::ReactionAdd(react(&poll(), "👍", 7)),
            GatewayEvent::ReactionRemoveAll {
                message_id: MessageId(501),
                channel_id: general().id,
            },
        ],
    )
    .await;
    assert_eq!(collector.collected().len(), 1);

    bus.publish(&GatewayEvent::ReactionRemoveAll {
        message_id: MessageId(500),
        channel_id: general().id,
    })
    .await;
    assert!(collector.collected().is_empty());
    assert!(!collector.is_ended());
}

#[tokio::test]
async fn test_message_deletion_stops() {
    let bus = GatewayBus::new();
    let collector = watch(&bus, CollectorOptions::new());
    let observer = RecordingObserver::attach(&collector);

    publish_all(
        &bus,
        [
            GatewayEvent::ReactionAdd(react(&poll(), "👍", 7)),
            delete(&Message::new(499, general(), 1, "older")),
            delete(&poll()),
        ],
    )
    .await;

    assert_eq!(
        observer.ends(),
        vec![(
            vec![react(&poll(), "👍", 7)],
            EndReason::Scope(ScopeEnd::MessageDelete)
        )]
    );
    assert_eq!(bus.total_listeners(), 0);
}

#[tokio::test]
async fn test_bulk_deletion_containing_message_stops() {
    let bus = GatewayBus::new();
    let collector = watch(&bus, CollectorOptions::new());

    bus.publish(&GatewayEvent::MessageDeleteBulk(vec![
        DeletedMessage::Uncached {
            id: MessageId(498),
            channel_id: ChannelId(10),
        },
        DeletedMessage::Uncached {
            id: MessageId(500),
            channel_id: ChannelId(10),
        },
    ]))
    .await;

    assert_eq!(
        collector.end_reason(),
        Some(EndReason::Scope(ScopeEnd::MessageDelete))
    );
}

#[tokio::test]
async fn test_category_deletion_stops() {
    let bus = GatewayBus::new();
    let collector = watch(&bus, CollectorOptions::new());

    bus.publish(&GatewayEvent::ChannelDelete(Channel::in_guild(CATEGORY, GUILD)))
        .await;

    assert_eq!(
        collector.end_reason(),
        Some(EndReason::Scope(ScopeEnd::ChannelDelete))
    );
}

#[tokio::test]
async fn test_await_reactions_until_limit() {
    let bus = GatewayBus::new();
    let waiting = tokio::spawn({
        let bus = bus.clone();
        async move { await_reactions(&bus, poll(), CollectorOptions::new().max(2)).await }
    });
    tokio::task::yield_now().await;

    publish_all(
        &bus,
        [
            GatewayEvent::ReactionAdd(react(&poll(), "1️⃣", 7)),
            GatewayEvent::ReactionAdd(react(&poll(), "2️⃣", 8)),
        ],
    )
    .await;

    let reactions = waiting.await.unwrap().unwrap();
    assert_eq!(reactions.len(), 2);
}
