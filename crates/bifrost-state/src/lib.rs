#[macro_use]
extern crate tracing;

mod store;
pub use store::{StateReadExt, StateWriteExt, Store, Substore};

mod state;
pub use state::{ActiveValidator, State, sidetx};
