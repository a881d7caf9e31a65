pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{storage::LocalStorage, CliArgs, Settings};
pub use self::core::{
    engine::InactivityEngine, feed_client::HttpFeedClient, pipeline::FeedPipeline,
};
pub use utils::error::{QuietusError, Result};
