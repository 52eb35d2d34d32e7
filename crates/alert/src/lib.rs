//! Alert emission for below-threshold balances.
//!
//! - [`gate::AlertGate`] suppresses repeated alerts inside a time window
//! - [`message::MessageComposer`] renders breaches into text plus link annotations
//! - [`notifier::Notifier`] delivers the rendered message

pub mod gate;
pub mod message;
pub mod notifier;

pub use gate::{AlertGate, GateDecision, GateState};
pub use message::{AlertMessage, LinkAnnotation, MessageComposer, MessageStyle};
pub use notifier::{Notifier, NotifyError, TelegramNotifier};
