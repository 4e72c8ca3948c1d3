pub mod channel;
pub mod error;
pub mod event;
pub mod feed;
pub mod postgres;

pub use channel::{ChannelFeed, FeedPublisher};
pub use common::{Meow, MeowId};
pub use error::{FeedError, Result};
pub use event::{ChangeEvent, ChangeNotice, EventKind};
pub use feed::{EventFeed, EventStream};
pub use postgres::PgNotifyFeed;
