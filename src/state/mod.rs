//! Client State
//!
//! In-memory containers mirroring the remote collections, and the store
//! that owns them.

mod list_state;
mod session_state;
mod store;

pub use list_state::{ListStatus, RecordListState, RequestTicket, Settled};
pub use session_state::{AuthMode, SessionState, SessionStatus};
pub use store::{AppState, AppStore, StoreSlice};
