mod frames;
mod notifier;

pub use frames::{EventKind, NoteRef, NotificationFrame};
pub use notifier::{EventNotifier, NotifierSettings};
