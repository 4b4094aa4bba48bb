pub mod api;
pub mod metrics;
pub mod output;
pub mod post_processor;
pub mod rewriter;
pub mod storage;
