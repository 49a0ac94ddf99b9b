//! Message trait for event types.

/// A marker trait for events and collected items within the system.
///
/// Messages must be `Send + Sync + 'static` to be safe for async use. Every
/// such type is a message through the blanket implementation below.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone)]
/// struct MyEvent { id: u64 }
///
/// fn assert_message<T: Message>() {}
/// assert_message::<MyEvent>();
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Message",
    label = "must be `Send + Sync + 'static`",
    note = "All events in Gleaner must be thread-safe and static."
)]
pub trait Message: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Message for T {}
