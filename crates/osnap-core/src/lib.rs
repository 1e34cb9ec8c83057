pub mod actuator;
pub mod descriptor;
pub mod driver;
pub mod error;
pub mod locator;
pub mod mfa;
pub mod notify;
pub mod selectors;
pub mod session;

pub use actuator::{act, try_act, ActOptions, Action};
pub use descriptor::{CandidateSet, Descriptor};
pub use driver::{Driver, DriverError, ElementHandle};
pub use error::FlowError;
pub use locator::{resolve, resolve_interactable, ResolveOptions};
pub use mfa::{run_sms_challenge, MfaOptions, MfaOutcome};
pub use notify::{CodeInput, InputError, Notifier, NotifyError, Snapshotter};
pub use session::{run_session, Credentials, SessionConfig};
