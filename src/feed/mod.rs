//! Streaming market data: subscription bookkeeping, topic routing and the
//! per-exchange protocol seam.

pub mod channel;
pub mod dispatcher;
pub mod protocol;
pub mod router;
pub mod state;
pub mod topic;

pub use channel::{CandleCallback, Channel, DepthCallback, TradeCallback};
pub use dispatcher::MarketFeed;
pub use protocol::{ControlFrame, FeedProtocol, Inbound};
pub use router::{typed, RouteOutcome, TopicHandler, TopicRouter};
pub use state::{ConnectionState, FeedEvent};
pub use topic::{ParsedTopic, SymbolPosition, TopicLayout};
