pub mod clock;
pub mod config;
pub mod input;
pub mod interaction;
pub mod notify;
pub mod session;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EditorConfig;
pub use input::{InputEvent, PointerButton, PointerTarget};
pub use interaction::{Effect, Gesture, InteractionState};
pub use notify::{LogNotifier, Notification, Notifier, NotifyLevel, RecordingNotifier};
pub use session::Session;
pub use storage::{MemoryStore, Persistence, SnapshotStore, StorageError};
