/// Command and message handlers
pub mod handlers;
/// Telegram implementation of the outbound chat surface
pub mod surface;

pub use surface::TelegramSurface;
