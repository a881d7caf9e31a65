pub mod encoding;
pub mod engine;
pub mod entities;
pub mod evaluator;
pub mod feed_client;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod resolver;

pub use crate::domain::model::{Evaluation, FeedDocument, FeedItem, InactivityResult, Organization};
pub use crate::domain::ports::{ConfigProvider, FeedSource, Pipeline, Storage};
pub use crate::utils::error::Result;
