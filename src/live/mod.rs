mod channel;
mod event;
mod sync;

pub use channel::{Delivery, EventSource, LiveChannel, Subscription};
pub use event::{FrameError, LiveEvent};
pub use sync::{reservation_status_message, table_status_notice, LiveSync};
