pub mod config;
pub mod correlation;
pub mod document;
pub mod error;
pub mod kernel;
pub mod ledger;
pub mod math;
pub mod operations;
pub mod reconcile;
pub mod session;

pub use config::SessionConfig;
pub use error::{BridgeError, Result};
pub use session::{Session, SessionEvent};
