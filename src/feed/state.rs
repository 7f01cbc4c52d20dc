/// Connection state of a [`MarketFeed`](super::MarketFeed).
///
/// `Disconnected -> Connecting -> Open -> (Closing | Faulted) -> Disconnected`.
/// Control frames are sent and inbound frames dispatched only while `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closing,
    Faulted,
}

impl ConnectionState {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

/// Connectivity events broadcast to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// The stream opened and queued subscriptions were replayed.
    Connected,
    /// The transport failed or the remote closed the stream. Subscriptions
    /// are kept and replayed by the next `connect`; nothing reconnects on its
    /// own.
    Disconnected { reason: String },
    /// The stream was closed locally.
    Closed,
}
