//! Pure data structures for the apple lifecycle.
//!
//! [`AppleRecord`] is the record the ledger (or the remote backend) owns. The reading
//! types are the payloads the stage runners submit, and [`Stage`] / [`Route`] describe
//! where an apple is in its lifecycle.

pub mod apple;
pub mod reading;
pub mod stage;

pub use apple::*;
pub use reading::*;
pub use stage::*;
