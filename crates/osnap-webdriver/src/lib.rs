//! Production collaborators for the osnap interaction core: a fantoccini
//! WebDriver-backed [`osnap_core::Driver`], chromedriver process management,
//! a Discord-style webhook notifier, and a stdin code prompt.

pub mod chromedriver;
pub mod input;
pub mod notifier;
pub mod session;

pub use input::StdinCodeInput;
pub use notifier::DiscordNotifier;
pub use session::WebDriverSession;
