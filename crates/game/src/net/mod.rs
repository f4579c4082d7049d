pub mod connection;
pub mod dispatcher;
pub mod input;
pub mod protocol;
pub mod snapshot;

pub use connection::{ConnectError, Connection};
pub use dispatcher::{Dispatcher, LineAssembler};
pub use input::{Axes, InputSampler, KEEPALIVE_TICKS};
pub use protocol::{ClientMessage, DEFAULT_PORT, ParseError, ServerMessage};
pub use snapshot::{RENDER_DELAY, SNAPSHOT_CAPACITY, Snapshot, SnapshotBuffer};
