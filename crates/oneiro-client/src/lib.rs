//! Headless client core for Oneiro: feed paging, optimistic likes, session
//! state, debounced explore search and local settings. A UI shell drives
//! these types and renders their state.

pub mod backend;
pub mod error;
pub mod feed;
pub mod http;
pub mod search;
pub mod session;
pub mod settings;

pub use backend::FeedBackend;
pub use error::ClientError;
pub use feed::{FeedController, FeedNotice, FeedState, FeedStatus};
pub use http::HttpBackend;
pub use search::{ExploreSearch, ExploreState};
pub use session::{AuthState, Session, SessionUser};
pub use settings::{AppSettings, SettingsError, SettingsStore, SleepTime, Theme};
