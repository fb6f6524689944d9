// ABOUTME: Session module — in-memory transcript state for one chat run.
// ABOUTME: Nothing here touches disk; the session ends with the process.

pub mod message;
pub mod store;

pub use message::{Message, Role};
pub use store::{ContextHandle, Session, SessionSlot};
