pub mod identity;
pub mod notify;

pub use identity::{Principal, Role};
pub use notify::{DeliveryNotice, LogNotifier, NoticeKind, Notifier};
