//! Presentational views over the message store and audio session.
//!
//! Views hold only transient state (the draft, mounted players) and render
//! to plain text lines.

mod composer;
mod format;
mod message_list;
mod player;
mod recorder;

pub use composer::Composer;
pub use format::{format_time, progress_bar};
pub use message_list::MessageListView;
pub use player::PlayerView;
pub use recorder::{RecorderControl, RecorderEvent};
