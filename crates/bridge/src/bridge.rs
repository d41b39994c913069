//! One notification cycle: resolve, send, then optionally wait for a reply.
//!
//! ```text
//! Idle -> Sent -> Polling -> Replied | TimedOut | Cancelled
//!           \-> Delivered
//! ```
//!
//! [`ReplyBridge::deliver`] covers `Idle -> Sent` and yields a [`Delivery`].
//! A delivery is consumed by exactly one of [`Delivery::finish`] or
//! [`Delivery::await_reply`], so every cycle ends in a single
//! [`BridgeOutcome`]. A timed-out poll is not retried.

use std::time::Duration;

use {
    hookrelay_channels::{
        BindingSink, CancelCheck, ChannelAdapter, Destination, DestinationResolver, MessageChunk,
        Result, SentMessageRef,
    },
    tracing::info,
};

/// Terminal state of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// Sent; no reply was requested.
    Delivered,
    Replied(String),
    TimedOut,
    /// The caller's cancel predicate fired while polling.
    Cancelled,
}

impl BridgeOutcome {
    pub fn reply(&self) -> Option<&str> {
        match self {
            Self::Replied(text) => Some(text),
            _ => None,
        }
    }
}

pub struct ReplyBridge<'a> {
    adapter: &'a dyn ChannelAdapter,
    resolver: &'a dyn DestinationResolver,
    sink: &'a dyn BindingSink,
}

impl<'a> ReplyBridge<'a> {
    pub fn new(
        adapter: &'a dyn ChannelAdapter,
        resolver: &'a dyn DestinationResolver,
        sink: &'a dyn BindingSink,
    ) -> Self {
        Self {
            adapter,
            resolver,
            sink,
        }
    }

    /// Resolve the project's destination and send `chunks` to it.
    ///
    /// Resolution and send failures end the cycle with an error.
    pub async fn deliver(
        &self,
        project_label: &str,
        existing: Option<&Destination>,
        chunks: &[MessageChunk],
    ) -> Result<Delivery<'a>> {
        let destination = self
            .resolver
            .resolve(project_label, existing, self.sink)
            .await?;
        let sent = self.adapter.send(&destination, chunks).await?;
        info!(
            channel = %self.adapter.kind(),
            %destination,
            chunks = chunks.len(),
            "notification delivered"
        );
        Ok(Delivery {
            adapter: self.adapter,
            destination,
            sent,
        })
    }
}

/// A sent notification that has not reached its outcome yet.
pub struct Delivery<'a> {
    adapter: &'a dyn ChannelAdapter,
    destination: Destination,
    sent: SentMessageRef,
}

impl Delivery<'_> {
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn finish(self) -> BridgeOutcome {
        BridgeOutcome::Delivered
    }

    pub async fn await_reply(self, timeout: Duration, cancel: &dyn CancelCheck) -> BridgeOutcome {
        match self.adapter.poll_reply(&self.sent, timeout, cancel).await {
            Some(text) => BridgeOutcome::Replied(text),
            None if cancel.is_cancelled() => BridgeOutcome::Cancelled,
            None => BridgeOutcome::TimedOut,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        async_trait::async_trait,
        hookrelay_channels::{Error, NeverCancel, adapter::fast_path},
        hookrelay_config::ChannelKind,
        std::sync::{
            Mutex,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
    };

    /// Scripted adapter recording what it was asked to do.
    #[derive(Default)]
    struct ScriptedAdapter {
        fail_send: bool,
        reply: Option<String>,
        sent: Mutex<Vec<(Destination, Vec<String>)>>,
        polls: AtomicUsize,
    }

    #[async_trait]
    impl ChannelAdapter for ScriptedAdapter {
        fn kind(&self) -> ChannelKind {
            ChannelKind::Slack
        }

        async fn send(
            &self,
            destination: &Destination,
            chunks: &[MessageChunk],
        ) -> Result<SentMessageRef> {
            if self.fail_send {
                return Err(Error::send(0, "rejected"));
            }
            self.sent.lock().unwrap().push((
                destination.clone(),
                chunks.iter().map(|c| c.to_string()).collect(),
            ));
            Ok(SentMessageRef::Slack {
                channel: "C1".into(),
                ts: "1.0".into(),
            })
        }

        async fn poll_reply(
            &self,
            _sent: &SentMessageRef,
            _timeout: Duration,
            _cancel: &dyn CancelCheck,
        ) -> Option<String> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    /// Creates `C1` unless a binding exists.
    #[derive(Default)]
    struct CountingResolver {
        creations: AtomicUsize,
    }

    #[async_trait]
    impl DestinationResolver for CountingResolver {
        async fn resolve(
            &self,
            _project_label: &str,
            existing: Option<&Destination>,
            sink: &dyn BindingSink,
        ) -> Result<Destination> {
            if let Some(destination) = fast_path(existing) {
                return Ok(destination);
            }
            self.creations.fetch_add(1, Ordering::SeqCst);
            let destination = Destination::Slack {
                channel_id: "C1".into(),
            };
            sink.persist(&destination)?;
            Ok(destination)
        }
    }

    struct FailingResolver;

    #[async_trait]
    impl DestinationResolver for FailingResolver {
        async fn resolve(
            &self,
            _project_label: &str,
            _existing: Option<&Destination>,
            _sink: &dyn BindingSink,
        ) -> Result<Destination> {
            Err(Error::destination("restricted_action", "not allowed"))
        }
    }

    fn discard(_: &Destination) -> Result<()> {
        Ok(())
    }

    fn chunks() -> Vec<MessageChunk> {
        vec![MessageChunk::new("hello")]
    }

    /// Full cycle the way the hook drives it.
    async fn run(
        bridge: &ReplyBridge<'_>,
        reply: Option<(Duration, &dyn CancelCheck)>,
    ) -> Result<BridgeOutcome> {
        let delivery = bridge.deliver("app", None, &chunks()).await?;
        Ok(match reply {
            Some((timeout, cancel)) => delivery.await_reply(timeout, cancel).await,
            None => delivery.finish(),
        })
    }

    #[tokio::test]
    async fn without_reply_request_the_cycle_ends_delivered() {
        let adapter = ScriptedAdapter {
            reply: Some("ignored".into()),
            ..Default::default()
        };
        let resolver = CountingResolver::default();
        let bridge = ReplyBridge::new(&adapter, &resolver, &discard);

        let outcome = run(&bridge, None).await.unwrap();

        assert_eq!(outcome, BridgeOutcome::Delivered);
        assert_eq!(adapter.polls.load(Ordering::SeqCst), 0);
        assert_eq!(adapter.sent.lock().unwrap()[0].1, vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn reply_is_returned() {
        let adapter = ScriptedAdapter {
            reply: Some("go on".into()),
            ..Default::default()
        };
        let resolver = CountingResolver::default();
        let bridge = ReplyBridge::new(&adapter, &resolver, &discard);

        let outcome = run(&bridge, Some((Duration::from_secs(5), &NeverCancel)))
            .await
            .unwrap();

        assert_eq!(outcome.reply(), Some("go on"));
        assert_eq!(adapter.polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_poll_is_timed_out_or_cancelled_by_predicate_state() {
        let adapter = ScriptedAdapter::default();
        let resolver = CountingResolver::default();
        let bridge = ReplyBridge::new(&adapter, &resolver, &discard);

        let timed_out = run(&bridge, Some((Duration::from_secs(1), &NeverCancel)))
            .await
            .unwrap();
        assert_eq!(timed_out, BridgeOutcome::TimedOut);

        let fired = AtomicBool::new(true);
        let cancel = || fired.load(Ordering::SeqCst);
        let delivery = bridge.deliver("app", None, &chunks()).await.unwrap();
        let cancelled = delivery.await_reply(Duration::from_secs(1), &cancel).await;
        assert_eq!(cancelled, BridgeOutcome::Cancelled);

        // One poll per cycle, never retried.
        assert_eq!(adapter.polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn bound_destination_is_reused_and_new_one_persisted_once() {
        let adapter = ScriptedAdapter::default();
        let resolver = CountingResolver::default();
        let persisted = Mutex::new(Vec::new());
        let sink = |d: &Destination| -> Result<()> {
            persisted.lock().unwrap().push(d.clone());
            Ok(())
        };
        let bridge = ReplyBridge::new(&adapter, &resolver, &sink);

        let first = bridge.deliver("app", None, &chunks()).await.unwrap();
        let bound = first.destination().clone();
        assert_eq!(first.finish(), BridgeOutcome::Delivered);

        let second = bridge.deliver("app", Some(&bound), &chunks()).await.unwrap();
        assert_eq!(second.destination(), &bound);

        assert_eq!(resolver.creations.load(Ordering::SeqCst), 1);
        assert_eq!(persisted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn resolution_failure_aborts_before_sending() {
        let adapter = ScriptedAdapter::default();
        let bridge = ReplyBridge::new(&adapter, &FailingResolver, &discard);

        let err = run(&bridge, None).await.unwrap_err();

        assert_eq!(err.kind(), "destination_error");
        assert!(adapter.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_failure_aborts_without_polling() {
        let adapter = ScriptedAdapter {
            fail_send: true,
            reply: Some("never seen".into()),
            ..Default::default()
        };
        let resolver = CountingResolver::default();
        let bridge = ReplyBridge::new(&adapter, &resolver, &discard);

        let err = run(&bridge, Some((Duration::from_secs(1), &NeverCancel)))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "send_error");
        assert_eq!(adapter.polls.load(Ordering::SeqCst), 0);
    }
}
