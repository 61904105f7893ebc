//! Listener-to-task event channel.

use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use std::sync::{Arc, OnceLock};

/// Sending half of an unbounded event stream.
///
/// DOM listeners hold clones of the relay; the form task owns the receiver
/// and starts a concurrent pass per event. Passes may overlap while they
/// wait on lookups, and per-node request sequences decide which result
/// lands.
///
/// ```rust
/// let (field_changed_relay, mut field_changed_stream) = relay::<FieldEvent>();
/// field_changed_relay.send(FieldEvent::SelectorChanged(".js-hrmis-district".into()));
/// while let Some(event) = field_changed_stream.next().await { /* ... */ }
/// ```
#[derive(Clone, Debug)]
pub struct Relay<T>
where
    T: Clone + 'static,
{
    sender: UnboundedSender<T>,
    #[cfg(debug_assertions)]
    emit_location: Arc<OnceLock<&'static std::panic::Location<'static>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelayError {
    /// The receiving task is gone (form torn down).
    ChannelClosed,
    /// Debug builds only: the relay was sent from two different call sites.
    #[cfg(debug_assertions)]
    MultipleEmitters {
        previous: &'static std::panic::Location<'static>,
        current: &'static std::panic::Location<'static>,
    },
}

impl<T> Relay<T>
where
    T: Clone + 'static,
{
    pub fn new() -> (Self, UnboundedReceiver<T>) {
        let (sender, receiver) = unbounded();
        (
            Relay {
                sender,
                #[cfg(debug_assertions)]
                emit_location: Arc::new(OnceLock::new()),
            },
            receiver,
        )
    }

    // Every relay gets exactly one emitting call site; listeners funnel
    // through a shared helper instead of calling `send` directly.
    #[cfg(debug_assertions)]
    #[track_caller]
    fn check_single_source(&self) -> Result<(), RelayError> {
        let caller = std::panic::Location::caller();
        match self.emit_location.set(caller) {
            Ok(()) => Ok(()),
            Err(previous) if previous == caller => Ok(()),
            Err(previous) => Err(RelayError::MultipleEmitters {
                previous,
                current: caller,
            }),
        }
    }

    /// Sends an event; it is dropped silently when the receiver is gone.
    #[track_caller]
    pub fn send(&self, value: T) {
        if let Err(error) = self.try_send(value) {
            match error {
                RelayError::ChannelClosed => {
                    log::debug!("relay receiver dropped, event discarded");
                }
                #[cfg(debug_assertions)]
                multiple @ RelayError::MultipleEmitters { .. } => panic!("{:?}", multiple),
            }
        }
    }

    #[track_caller]
    pub fn try_send(&self, value: T) -> Result<(), RelayError> {
        #[cfg(debug_assertions)]
        self.check_single_source()?;

        self.sender
            .unbounded_send(value)
            .map_err(|_| RelayError::ChannelClosed)
    }
}

pub fn relay<T>() -> (Relay<T>, UnboundedReceiver<T>)
where
    T: Clone + 'static,
{
    Relay::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[derive(Clone, Debug, PartialEq)]
    enum FieldEvent {
        SelectorChanged(String),
        PageRestored,
    }

    fn emit(relay: &Relay<FieldEvent>, event: FieldEvent) {
        relay.send(event);
    }

    #[tokio::test]
    async fn events_arrive_in_send_order() {
        let (field_changed_relay, mut stream) = relay();

        emit(&field_changed_relay, FieldEvent::SelectorChanged("#district".into()));
        emit(&field_changed_relay, FieldEvent::PageRestored);

        assert_eq!(
            stream.next().await,
            Some(FieldEvent::SelectorChanged("#district".into()))
        );
        assert_eq!(stream.next().await, Some(FieldEvent::PageRestored));
    }

    #[tokio::test]
    async fn closed_receiver_is_reported_by_try_send() {
        let (page_restored_relay, stream) = relay::<FieldEvent>();
        drop(stream);

        assert_eq!(
            page_restored_relay.try_send(FieldEvent::PageRestored),
            Err(RelayError::ChannelClosed)
        );
    }

    #[cfg(debug_assertions)]
    #[test]
    fn second_call_site_is_rejected_in_debug_builds() {
        let (field_changed_relay, _stream) = relay::<FieldEvent>();
        assert!(field_changed_relay.try_send(FieldEvent::PageRestored).is_ok());
        let second = field_changed_relay.try_send(FieldEvent::PageRestored);
        assert!(matches!(second, Err(RelayError::MultipleEmitters { .. })));
    }
}
