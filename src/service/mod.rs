// Service layer: what the CLI and the poller call.
//
// TweetService owns acquisition and tweet reads, TopicService owns the
// extraction cache, and the Poller ties both together on a timer.

pub mod poller;
pub mod topics;
pub mod tweets;

pub use poller::Poller;
pub use topics::TopicService;
pub use tweets::TweetService;
