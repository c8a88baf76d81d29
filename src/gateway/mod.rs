//! Request gateway: the single entry point for JSON API calls.
//!
//! Each call is fingerprinted, registered as pending (superseding an identical
//! call still in flight), decorated with credentials and the workspace scope,
//! dispatched, and its result normalized against the response envelope.

mod client;
mod dialog_lock;
mod error;
mod fingerprint;
mod identity;
mod registry;

pub use client::{Collaborators, GatewayResponse, RequestGateway};
pub use dialog_lock::{DialogLockGuard, ErrorDialogLock};
pub use error::GatewayError;
pub use fingerprint::Fingerprint;
pub use identity::RequestIdentity;
pub use registry::{PendingGuard, PendingRegistry};
