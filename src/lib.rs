// Topic Cloud: trending topics from short social-media posts
//
// This is the library root. `topics` is the extraction core; the rest
// acquires posts, stores them, and schedules extraction around it.

pub mod config;
pub mod db;
pub mod output;
pub mod service;
pub mod sources;
pub mod status;
pub mod topics;
