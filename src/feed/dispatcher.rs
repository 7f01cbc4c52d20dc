//! Market-data stream dispatcher.
//!
//! One [`MarketFeed`] owns one duplex stream. Subscriptions are recorded in a
//! [`TopicRouter`] whether or not the stream is open; control frames go out
//! while it is open and every recorded topic is replayed on `connect`. A
//! single background task reads inbound frames, answers server pings, sends
//! client heartbeats and invokes handlers in arrival order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use super::channel::{Callbacks, Channel, ChannelHandler};
use super::protocol::{ControlFrame, FeedProtocol, Inbound};
use super::router::{RouteOutcome, TopicHandler, TopicRouter};
use super::state::{ConnectionState, FeedEvent};
use crate::domain::{Candle, Depth, Trade};
use crate::error::Result;
use crate::port::{DuplexStream, Frame, StreamConnector};

const EVENT_CAPACITY: usize = 16;

enum Outbound {
    Frame(Frame),
    Close,
}

struct Link {
    id: u64,
    tx: mpsc::UnboundedSender<Outbound>,
}

impl Link {
    fn send(&self, frame: ControlFrame) {
        // A closed receiver means the task is finishing; the topic stays
        // recorded and is replayed on the next connect.
        let _ = self.tx.send(Outbound::Frame(frame.into_frame()));
    }
}

struct Shared {
    url: String,
    protocol: Arc<dyn FeedProtocol>,
    connector: Arc<dyn StreamConnector>,
    router: TopicRouter,
    callbacks: Arc<Callbacks>,
    link: Mutex<Option<Link>>,
    task: Mutex<Option<JoinHandle<()>>>,
    next_link: AtomicU64,
    state: watch::Sender<ConnectionState>,
    events: broadcast::Sender<FeedEvent>,
}

/// Subscription manager and dispatcher for one exchange stream.
pub struct MarketFeed {
    shared: Arc<Shared>,
}

impl MarketFeed {
    pub fn new(
        url: impl Into<String>,
        protocol: Arc<dyn FeedProtocol>,
        connector: Arc<dyn StreamConnector>,
    ) -> Self {
        let router = TopicRouter::new(protocol.layout());
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                url: url.into(),
                protocol,
                connector,
                router,
                callbacks: Arc::new(Callbacks::default()),
                link: Mutex::new(None),
                task: Mutex::new(None),
                next_link: AtomicU64::new(1),
                state,
                events,
            }),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.shared.url
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.borrow()
    }

    /// Observe state changes.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    /// Observe connect, disconnect and close events.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<FeedEvent> {
        self.shared.events.subscribe()
    }

    /// Currently recorded topics, sorted.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        self.shared.router.topics()
    }

    /// Native topic for a channel and symbol on this exchange.
    #[must_use]
    pub fn topic(&self, channel: &Channel, symbol: &str) -> String {
        self.shared.protocol.topic(channel, symbol)
    }

    /// Open the stream and replay recorded subscriptions.
    ///
    /// No-op when already open or connecting.
    ///
    /// # Errors
    ///
    /// Returns the connector's transport error; the state goes back to
    /// `Disconnected` and subscriptions are kept.
    pub async fn connect(&self) -> Result<()> {
        let exchange = self.shared.protocol.exchange_name();
        {
            let _link = self.shared.link.lock();
            let current = *self.shared.state.borrow();
            if matches!(current, ConnectionState::Open | ConnectionState::Connecting) {
                debug!(exchange, state = ?current, "Feed already connected");
                return Ok(());
            }
            self.shared.state.send_replace(ConnectionState::Connecting);
        }

        info!(exchange, url = %self.shared.url, "Connecting market feed");
        let stream = match self.shared.connector.open(&self.shared.url).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(exchange, error = %e, "Market feed connection failed");
                self.shared.state.send_replace(ConnectionState::Disconnected);
                return Err(e);
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.shared.next_link.fetch_add(1, Ordering::Relaxed);
        let replayed = {
            let mut link = self.shared.link.lock();
            let new_link = Link { id, tx };
            let topics = self.shared.router.topics();
            for topic in &topics {
                new_link.send(self.shared.protocol.subscribe_frame(topic));
            }
            *link = Some(new_link);
            self.shared.state.send_replace(ConnectionState::Open);
            topics.len()
        };
        info!(exchange, replayed, "Market feed connected");
        let _ = self.shared.events.send(FeedEvent::Connected);

        let task = tokio::spawn(run(Arc::clone(&self.shared), id, stream, rx));
        *self.shared.task.lock() = Some(task);
        Ok(())
    }

    /// Close the stream, wait for the dispatcher task and forget every
    /// subscription.
    pub async fn close(&self) {
        let task = {
            let link = self.shared.link.lock();
            if let Some(link) = link.as_ref() {
                self.shared.state.send_replace(ConnectionState::Closing);
                let _ = link.tx.send(Outbound::Close);
            }
            self.shared.task.lock().take()
        };
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Market feed task ended abnormally");
            }
        }
        self.shared.router.clear();
    }

    /// Record a topic and bind `handler` to its channel. Sends the subscribe
    /// frame at once when open; otherwise it goes out on the next `connect`.
    /// Subscribing an already recorded topic only rebinds the handler.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the topic does not fit the exchange's
    /// topic layout.
    pub fn subscribe(&self, topic: &str, handler: Arc<dyn TopicHandler>) -> Result<()> {
        let link = self.shared.link.lock();
        let added = self.shared.router.register(topic, handler)?;
        if added {
            debug!(
                exchange = self.shared.protocol.exchange_name(),
                topic,
                connected = link.is_some(),
                "Subscribed"
            );
            if let Some(link) = link.as_ref() {
                link.send(self.shared.protocol.subscribe_frame(topic));
            }
        }
        Ok(())
    }

    /// Forget a topic. Unknown topics are ignored.
    pub fn unsubscribe(&self, topic: &str) {
        let link = self.shared.link.lock();
        if !self.shared.router.remove(topic) {
            return;
        }
        debug!(
            exchange = self.shared.protocol.exchange_name(),
            topic, "Unsubscribed"
        );
        if let (Some(link), Some(frame)) =
            (link.as_ref(), self.shared.protocol.unsubscribe_frame(topic))
        {
            link.send(frame);
        }
    }

    /// Subscribe a canonical channel for each symbol. Payloads are decoded
    /// and delivered to the matching `on_*` callback.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a symbol that yields an invalid topic.
    /// Symbols before it stay subscribed.
    pub fn subscribe_channel(&self, channel: &Channel, symbols: &[&str]) -> Result<()> {
        let handler: Arc<dyn TopicHandler> = Arc::new(ChannelHandler::new(
            channel,
            Arc::clone(&self.shared.protocol),
            Arc::clone(&self.shared.callbacks),
        ));
        for symbol in symbols {
            let topic = self.shared.protocol.topic(channel, symbol);
            self.subscribe(&topic, Arc::clone(&handler))?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Never fails today; kept fallible to mirror `subscribe_channel`.
    pub fn unsubscribe_channel(&self, channel: &Channel, symbols: &[&str]) -> Result<()> {
        for symbol in symbols {
            self.unsubscribe(&self.shared.protocol.topic(channel, symbol));
        }
        Ok(())
    }

    pub fn on_depth<F>(&self, callback: F)
    where
        F: Fn(&str, Depth) + Send + Sync + 'static,
    {
        *self.shared.callbacks.depth.write() = Some(Arc::new(callback));
    }

    pub fn on_trades<F>(&self, callback: F)
    where
        F: Fn(&str, Vec<Trade>) + Send + Sync + 'static,
    {
        *self.shared.callbacks.trades.write() = Some(Arc::new(callback));
    }

    /// The callback also receives the native period, so several candle
    /// subscriptions on one symbol stay distinguishable.
    pub fn on_candles<F>(&self, callback: F)
    where
        F: Fn(&str, &str, Candle) + Send + Sync + 'static,
    {
        *self.shared.callbacks.candles.write() = Some(Arc::new(callback));
    }
}

impl Drop for MarketFeed {
    fn drop(&mut self) {
        if let Some(link) = self.shared.link.lock().as_ref() {
            let _ = link.tx.send(Outbound::Close);
        }
    }
}

impl Shared {
    async fn dispatch(&self, stream: &mut dyn DuplexStream, frame: Frame) -> Result<()> {
        let exchange = self.protocol.exchange_name();
        let messages = match self.protocol.decode(frame) {
            Ok(messages) => messages,
            Err(e) => {
                warn!(exchange, error = %e, "Dropping undecodable frame");
                return Ok(());
            }
        };

        for message in messages {
            match message {
                Inbound::Data { topic, payload } => match self.router.route(&topic, &payload) {
                    RouteOutcome::Delivered => {}
                    RouteOutcome::Unrouted => trace!(exchange, topic = %topic, "Unrouted message"),
                    RouteOutcome::Failed(e) => {
                        warn!(exchange, topic = %topic, error = %e, "Topic handler failed");
                    }
                },
                Inbound::Reply(reply) => {
                    trace!(exchange, "Answering server ping");
                    stream.send(reply.into_frame()).await?;
                }
                Inbound::Ack { topic } => debug!(exchange, ?topic, "Subscription acknowledged"),
                Inbound::Rejected { code, message } => {
                    warn!(exchange, code = %code, message = %message, "Exchange rejected request");
                }
                Inbound::Ignored => {}
            }
        }
        Ok(())
    }

    fn finish(&self, id: u64, fault: Option<String>) {
        let exchange = self.protocol.exchange_name();
        let mut link = self.link.lock();
        if link.as_ref().map(|l| l.id) != Some(id) {
            return;
        }
        *link = None;
        match fault {
            Some(reason) => {
                warn!(exchange, reason = %reason, "Market feed disconnected");
                self.state.send_replace(ConnectionState::Faulted);
                let _ = self.events.send(FeedEvent::Disconnected { reason });
            }
            None => {
                info!(exchange, "Market feed closed");
                let _ = self.events.send(FeedEvent::Closed);
            }
        }
        self.state.send_replace(ConnectionState::Disconnected);
    }
}

async fn run(
    shared: Arc<Shared>,
    id: u64,
    mut stream: Box<dyn DuplexStream>,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
) {
    let mut heartbeat = shared.protocol.heartbeat_interval().map(|period| {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });

    let fault = loop {
        tokio::select! {
            inbound = stream.recv() => match inbound {
                Some(Ok(frame)) => {
                    if let Err(e) = shared.dispatch(stream.as_mut(), frame).await {
                        break Some(e.to_string());
                    }
                }
                Some(Err(e)) => break Some(e.to_string()),
                None => break Some("stream closed by remote".to_string()),
            },
            command = outbound.recv() => match command {
                Some(Outbound::Frame(frame)) => {
                    if let Err(e) = stream.send(frame).await {
                        break Some(e.to_string());
                    }
                }
                Some(Outbound::Close) | None => {
                    if let Err(e) = stream.close().await {
                        debug!(error = %e, "Error while closing stream");
                    }
                    break None;
                }
            },
            () = next_tick(&mut heartbeat) => {
                if let Some(frame) = shared.protocol.heartbeat(Utc::now().timestamp_millis()) {
                    if let Err(e) = stream.send(frame.into_frame()).await {
                        break Some(e.to_string());
                    }
                }
            }
        }
    };

    shared.finish(id, fault);
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::feed::topic::{SymbolPosition, TopicLayout};
    use crate::testkit::stream::ScriptedConnector;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::time::timeout;

    /// `{"topic": .., "data": ..}` data frames, `"ping"` server pings.
    struct EchoProtocol;

    impl FeedProtocol for EchoProtocol {
        fn exchange_name(&self) -> &'static str {
            "echo"
        }

        fn layout(&self) -> TopicLayout {
            TopicLayout::new('.', SymbolPosition::Segments { start: 1, len: 1 })
        }

        fn topic(&self, channel: &Channel, symbol: &str) -> String {
            match channel {
                Channel::Depth => format!("market.{symbol}.depth"),
                Channel::Trades => format!("market.{symbol}.trades"),
                Channel::Candles { period } => format!("market.{symbol}.kline.{period}"),
            }
        }

        fn subscribe_frame(&self, topic: &str) -> ControlFrame {
            ControlFrame::Structured(json!({ "sub": topic }))
        }

        fn unsubscribe_frame(&self, topic: &str) -> Option<ControlFrame> {
            Some(ControlFrame::Structured(json!({ "unsub": topic })))
        }

        fn decode(&self, frame: Frame) -> Result<Vec<Inbound>> {
            let Frame::Text(text) = frame else {
                return Ok(vec![Inbound::Ignored]);
            };
            if text == "ping" {
                return Ok(vec![Inbound::Reply(ControlFrame::Topic("pong".into()))]);
            }
            let value: Value = serde_json::from_str(&text).map_err(|e| Error::decode("frame", e))?;
            Ok(vec![Inbound::Data {
                topic: value["topic"].as_str().unwrap_or_default().to_string(),
                payload: value["data"].clone(),
            }])
        }

        fn decode_depth(&self, payload: &Value) -> Result<Depth> {
            let bid = payload["bid"]
                .as_str()
                .ok_or_else(|| Error::decode("depth", "missing bid"))?;
            Ok(Depth {
                bids: vec![crate::domain::PriceLevel::new(
                    bid.parse().map_err(|e| Error::decode("depth", e))?,
                    dec!(1),
                )],
                asks: Vec::new(),
                timestamp: None,
            })
        }

        fn decode_trades(&self, _payload: &Value) -> Result<Vec<Trade>> {
            Ok(Vec::new())
        }

        fn decode_candle(&self, _payload: &Value) -> Result<Candle> {
            Err(Error::decode("candle", "unsupported"))
        }
    }

    fn feed() -> (MarketFeed, Arc<ScriptedConnector>) {
        let connector = Arc::new(ScriptedConnector::new());
        let feed = MarketFeed::new("wss://echo.test/ws", Arc::new(EchoProtocol), connector.clone());
        (feed, connector)
    }

    fn forward() -> (Arc<dyn TopicHandler>, mpsc::UnboundedReceiver<(String, Value)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handler: Arc<dyn TopicHandler> = Arc::new(move |symbol: &str, payload: &Value| -> Result<()> {
            let _ = tx.send((symbol.to_string(), payload.clone()));
            Ok(())
        });
        (handler, rx)
    }

    async fn wait_for_state(feed: &MarketFeed, wanted: ConnectionState) {
        let mut rx = feed.watch_state();
        timeout(Duration::from_secs(2), rx.wait_for(|s| *s == wanted))
            .await
            .expect("state change timed out")
            .expect("state channel closed");
    }

    #[tokio::test]
    async fn subscriptions_before_connect_are_replayed() {
        let (feed, connector) = feed();
        let (handler, _rx) = forward();
        feed.subscribe("market.btcusdt.depth", handler).unwrap();
        assert_eq!(feed.state(), ConnectionState::Disconnected);

        feed.connect().await.unwrap();
        let mut remote = connector.remote().unwrap();
        assert_eq!(
            remote.next_text().await.unwrap(),
            r#"{"sub":"market.btcusdt.depth"}"#
        );
        assert_eq!(feed.state(), ConnectionState::Open);
    }

    #[tokio::test]
    async fn data_reaches_handler_with_symbol_once() {
        let (feed, connector) = feed();
        let (handler, mut rx) = forward();
        feed.connect().await.unwrap();
        feed.subscribe("market.btcusdt.depth", handler).unwrap();
        let remote = connector.remote().unwrap();

        remote.push_text(r#"{"topic":"market.ethusdt.depth","data":{"n":0}}"#);
        remote.push_text(r#"{"topic":"market.btcusdt.depth","data":{"n":1}}"#);

        let (symbol, payload) = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(symbol, "btcusdt");
        assert_eq!(payload, json!({"n": 1}));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn server_ping_is_answered() {
        let (feed, connector) = feed();
        feed.connect().await.unwrap();
        let mut remote = connector.remote().unwrap();
        remote.push_text("ping");
        assert_eq!(remote.next_text().await.unwrap(), "pong");
    }

    #[tokio::test]
    async fn handler_failure_does_not_stop_dispatch() {
        let (feed, connector) = feed();
        let (tx, mut rx) = mpsc::unbounded_channel();
        feed.on_depth(move |symbol, depth| {
            let _ = tx.send((symbol.to_string(), depth));
        });
        feed.subscribe_channel(&Channel::Depth, &["btcusdt"]).unwrap();
        feed.connect().await.unwrap();
        let remote = connector.remote().unwrap();

        remote.push_text(r#"{"topic":"market.btcusdt.depth","data":{"oops":true}}"#);
        remote.push_text("not json");
        remote.push_text(r#"{"topic":"market.btcusdt.depth","data":{"bid":"6500.5"}}"#);

        let (symbol, depth) = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(symbol, "btcusdt");
        assert_eq!(depth.best_bid().unwrap().price, dec!(6500.5));
        assert_eq!(feed.state(), ConnectionState::Open);
    }

    #[tokio::test]
    async fn remote_hangup_faults_and_keeps_subscriptions() {
        let (feed, connector) = feed();
        let mut events = feed.events();
        let (handler, _rx) = forward();
        feed.subscribe("market.btcusdt.depth", handler).unwrap();
        feed.connect().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), FeedEvent::Connected);

        connector.remote().unwrap().hang_up();
        let event = timeout(Duration::from_secs(2), events.recv()).await.unwrap().unwrap();
        assert!(matches!(event, FeedEvent::Disconnected { .. }));
        wait_for_state(&feed, ConnectionState::Disconnected).await;
        assert_eq!(feed.subscriptions(), vec!["market.btcusdt.depth".to_string()]);

        feed.connect().await.unwrap();
        let mut remote = connector.remote().unwrap();
        assert_eq!(
            remote.next_text().await.unwrap(),
            r#"{"sub":"market.btcusdt.depth"}"#
        );
        assert_eq!(connector.opened(), 2);
    }

    #[tokio::test]
    async fn close_clears_subscriptions() {
        let (feed, connector) = feed();
        let (handler, _rx) = forward();
        feed.subscribe("market.btcusdt.depth", handler).unwrap();
        feed.connect().await.unwrap();
        let remote = connector.remote().unwrap();

        feed.close().await;
        assert_eq!(feed.state(), ConnectionState::Disconnected);
        assert!(feed.subscriptions().is_empty());
        assert!(remote.was_closed());
    }

    #[tokio::test]
    async fn connect_failure_leaves_feed_disconnected() {
        let (feed, connector) = feed();
        connector.fail_next();
        let err = feed.connect().await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(feed.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn unsubscribe_sends_frame_and_stops_delivery() {
        let (feed, connector) = feed();
        let (handler, mut rx) = forward();
        feed.connect().await.unwrap();
        let mut remote = connector.remote().unwrap();
        feed.subscribe("market.btcusdt.depth", handler).unwrap();
        assert_eq!(remote.next_text().await.unwrap(), r#"{"sub":"market.btcusdt.depth"}"#);

        feed.unsubscribe("market.btcusdt.depth");
        assert_eq!(remote.next_text().await.unwrap(), r#"{"unsub":"market.btcusdt.depth"}"#);

        remote.push_text(r#"{"topic":"market.btcusdt.depth","data":{}}"#);
        remote.push_text("ping");
        assert_eq!(remote.next_text().await.unwrap(), "pong");
        assert!(rx.try_recv().is_err());
    }
}
