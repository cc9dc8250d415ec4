pub mod candidates;
pub mod lifecycle;
pub mod models;

pub use candidates::{rank_candidates, Candidate};
pub use lifecycle::{advance_order, advance_relocation, cancel_relocation, TransitionError};
pub use models::{Driver, Order, OrderStatus, RelocationRequest, RelocationStatus};
