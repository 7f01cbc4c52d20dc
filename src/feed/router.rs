//! Topic-to-handler routing table.
//!
//! Handlers are registered per channel key (topic with the symbol replaced by
//! `*`) and receive the symbol extracted from each topic. A message is routed
//! only when its exact topic is currently subscribed.

use std::sync::Arc;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::topic::{ParsedTopic, TopicLayout};
use crate::error::{Error, Result};

/// Receives payloads for one channel across all of its symbols.
///
/// Invoked on the dispatcher task, one message at a time. An error is logged
/// by the dispatcher and does not stop the stream.
pub trait TopicHandler: Send + Sync {
    fn handle(&self, symbol: &str, payload: &Value) -> Result<()>;
}

impl<F> TopicHandler for F
where
    F: Fn(&str, &Value) -> Result<()> + Send + Sync,
{
    fn handle(&self, symbol: &str, payload: &Value) -> Result<()> {
        self(symbol, payload)
    }
}

/// Wrap a callback taking a typed payload. Payloads that do not deserialize
/// into `T` surface as decode errors.
pub fn typed<T, F>(callback: F) -> Arc<dyn TopicHandler>
where
    T: DeserializeOwned + 'static,
    F: Fn(&str, T) + Send + Sync + 'static,
{
    Arc::new(move |symbol: &str, payload: &Value| -> Result<()> {
        let decoded = T::deserialize(payload).map_err(|e| Error::decode("feed payload", e))?;
        callback(symbol, decoded);
        Ok(())
    })
}

/// Outcome of routing one message.
#[derive(Debug)]
pub enum RouteOutcome {
    Delivered,
    /// No subscription for this topic, or no handler for its channel.
    Unrouted,
    Failed(Error),
}

pub struct TopicRouter {
    layout: TopicLayout,
    handlers: DashMap<String, Arc<dyn TopicHandler>>,
    topics: DashMap<String, ParsedTopic>,
}

impl TopicRouter {
    #[must_use]
    pub fn new(layout: TopicLayout) -> Self {
        Self {
            layout,
            handlers: DashMap::new(),
            topics: DashMap::new(),
        }
    }

    #[must_use]
    pub fn layout(&self) -> TopicLayout {
        self.layout
    }

    /// Record a subscription and (re)bind its channel's handler. The latest
    /// handler for a channel serves every symbol of it.
    ///
    /// Returns `true` if the topic was not subscribed before.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the topic does not fit the layout.
    pub fn register(&self, topic: &str, handler: Arc<dyn TopicHandler>) -> Result<bool> {
        let parsed = self.layout.parse(topic)?;
        self.handlers.insert(parsed.channel_key.clone(), handler);
        Ok(self.topics.insert(topic.to_string(), parsed).is_none())
    }

    /// Drop a subscription, and its channel handler once no topic uses it.
    ///
    /// Returns `true` if the topic was subscribed.
    pub fn remove(&self, topic: &str) -> bool {
        let Some((_, parsed)) = self.topics.remove(topic) else {
            return false;
        };
        let still_used = self
            .topics
            .iter()
            .any(|entry| entry.value().channel_key == parsed.channel_key);
        if !still_used {
            self.handlers.remove(&parsed.channel_key);
        }
        true
    }

    #[must_use]
    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.topics.contains_key(topic)
    }

    /// Subscribed topics, sorted.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.topics.iter().map(|e| e.key().clone()).collect();
        topics.sort();
        topics
    }

    pub fn clear(&self) {
        self.topics.clear();
        self.handlers.clear();
    }

    /// Deliver a payload to the handler bound to the topic's channel.
    pub fn route(&self, topic: &str, payload: &Value) -> RouteOutcome {
        let Some((symbol, handler)) = self.lookup(topic) else {
            return RouteOutcome::Unrouted;
        };
        match handler.handle(&symbol, payload) {
            Ok(()) => RouteOutcome::Delivered,
            Err(e) => RouteOutcome::Failed(e),
        }
    }

    // Map guards are released before the handler runs, so handlers may
    // subscribe or unsubscribe.
    fn lookup(&self, topic: &str) -> Option<(String, Arc<dyn TopicHandler>)> {
        let (symbol, key) = {
            let parsed = self.topics.get(topic)?;
            (parsed.symbol.clone(), parsed.channel_key.clone())
        };
        let handler = self.handlers.get(&key).map(|h| Arc::clone(h.value()))?;
        Some((symbol, handler))
    }
}
