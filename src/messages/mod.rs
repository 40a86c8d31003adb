mod store;
mod types;

pub use store::MessageStore;
pub use types::{DraftMessage, Message, MessageId};
