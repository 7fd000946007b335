//! Domain services: the notification sink and the moderation state engine.

pub mod moderation;
pub mod notify;

pub use moderation::ModerationService;
pub use notify::Notifier;
