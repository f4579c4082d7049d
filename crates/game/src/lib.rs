pub mod config;
pub mod events;
pub mod maze;
pub mod net;
pub mod session;

pub use config::ClientConfig;
pub use events::{GameEvent, Outcome};
pub use maze::{Diamond, MazeModel};
pub use net::{
    Axes, ClientMessage, ConnectError, Connection, DEFAULT_PORT, Dispatcher, InputSampler,
    LineAssembler, ParseError, RENDER_DELAY, SNAPSHOT_CAPACITY, ServerMessage, Snapshot,
    SnapshotBuffer,
};
pub use session::{Session, SessionState};
