use glam::Vec2;
use log::{debug, info, warn};

use crate::config::ClientConfig;
use crate::events::{GameEvent, Outcome};
use crate::maze::MazeModel;
use crate::net::protocol::ServerMessage;
use crate::net::snapshot::{Snapshot, SnapshotBuffer};

/// Explicit session lifecycle. Illegal transitions (STATE before SETUP,
/// records after GAMEOVER) are checkable instead of silently tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unidentified,
    Configured,
    Active,
    Finished,
    Terminated,
}

/// Client-side view of the authoritative game state, fed by parsed records
/// in arrival order. Emits one-shot [`GameEvent`]s for the presentation
/// layer and answers interpolation queries against the snapshot history.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    local_id: Option<u8>,
    maze: Option<MazeModel>,
    snapshots: SnapshotBuffer,
    scores: [u32; 2],
    last_score_sum: u32,
    sim_time: f32,
    outcome: Option<Outcome>,
    events: Vec<GameEvent>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_snapshots(SnapshotBuffer::default())
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_snapshots(SnapshotBuffer::new(
            config.snapshot_capacity,
            config.render_delay,
        ))
    }

    fn with_snapshots(snapshots: SnapshotBuffer) -> Self {
        Self {
            state: SessionState::Unidentified,
            local_id: None,
            maze: None,
            snapshots,
            scores: [0, 0],
            last_score_sum: 0,
            sim_time: 0.0,
            outcome: None,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// This client's player slot, set once by the first SETUP record.
    pub fn local_id(&self) -> Option<u8> {
        self.local_id
    }

    pub fn maze(&self) -> Option<&MazeModel> {
        self.maze.as_ref()
    }

    pub fn scores(&self) -> [u32; 2] {
        self.scores
    }

    /// Set once the session reaches [`SessionState::Finished`].
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Latest server simulation time seen in a STATE record.
    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    pub fn snapshots(&self) -> &SnapshotBuffer {
        &self.snapshots
    }

    /// Interpolated positions for both players at the local clock `now`,
    /// rendered slightly in the past. None until two snapshots exist.
    pub fn interpolated(&self, now: f32) -> Option<(Vec2, Vec2)> {
        self.snapshots.sample(now)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, SessionState::Finished | SessionState::Terminated)
    }

    /// Drains the pending one-shot events, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Called when the transport dies underneath the session.
    pub fn mark_disconnected(&mut self) {
        if !self.is_terminal() {
            info!("connection lost, terminating session");
            self.state = SessionState::Terminated;
        }
    }

    /// Applies one parsed record. `now` is the local clock in seconds, used
    /// to stamp snapshots.
    pub fn apply(&mut self, message: ServerMessage, now: f32) {
        if self.is_terminal() {
            debug!("session over, ignoring {:?}", message);
            return;
        }

        match message {
            ServerMessage::Setup {
                player_id,
                width,
                height,
                wall_grid,
                diamonds,
            } => self.apply_setup(player_id, width, height, &wall_grid, diamonds),
            ServerMessage::State {
                sim_time,
                p0_pos,
                p0_score,
                p1_pos,
                p1_score,
                diamond_bits,
            } => self.apply_state(
                sim_time,
                [p0_pos, p1_pos],
                [p0_score, p1_score],
                &diamond_bits,
                now,
            ),
            ServerMessage::GameOver { outcome, scores } => {
                info!("game over: {:?} ({} - {})", outcome, scores[0], scores[1]);
                self.scores = scores;
                self.outcome = Some(outcome);
                self.state = SessionState::Finished;
                self.events.push(GameEvent::GameOver { outcome, scores });
            }
            ServerMessage::Shutdown => {
                info!("server requested shutdown");
                self.state = SessionState::Terminated;
                self.events.push(GameEvent::ShutdownRequested);
            }
        }
    }

    fn apply_setup(
        &mut self,
        player_id: u8,
        width: usize,
        height: usize,
        wall_grid: &str,
        diamonds: Vec<Vec2>,
    ) {
        // The maze is built at most once per session.
        if self.maze.is_some() {
            debug!("ignoring repeated SETUP");
            return;
        }

        info!(
            "assigned player slot {}, maze {}x{} with {} diamonds",
            player_id,
            width,
            height,
            diamonds.len()
        );

        self.local_id = Some(player_id);
        self.maze = Some(MazeModel::new(width, height, wall_grid, diamonds));
        self.state = SessionState::Configured;
        self.events.push(GameEvent::MazeReady);
    }

    fn apply_state(
        &mut self,
        sim_time: f32,
        positions: [Vec2; 2],
        scores: [u32; 2],
        diamond_bits: &str,
        now: f32,
    ) {
        let Some(maze) = self.maze.as_mut() else {
            warn!("STATE before SETUP, dropping record");
            return;
        };

        if maze.apply_active_bits(diamond_bits) > 0 {
            self.events.push(GameEvent::DiamondsChanged);
        }

        if scores != self.scores {
            self.scores = scores;
            self.events.push(GameEvent::ScoreChanged { scores });
        }

        let sum = scores[0] + scores[1];
        if sum > self.last_score_sum {
            self.events.push(GameEvent::PickupCue);
            self.last_score_sum = sum;
        } else if sum < self.last_score_sum {
            warn!(
                "score sum went backwards ({} -> {})",
                self.last_score_sum, sum
            );
        }

        self.sim_time = sim_time;
        self.snapshots.push(Snapshot {
            time: now,
            p0: positions[0],
            p1: positions[1],
        });
        self.state = SessionState::Active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Outcome;

    fn setup_record() -> ServerMessage {
        ServerMessage::parse("SETUP 0 2 2 1001 3 1.0 1.0 2.0 2.0 3.0 3.0").unwrap()
    }

    fn state_record(time: f32, s0: u32, s1: u32, bits: &str) -> ServerMessage {
        ServerMessage::State {
            sim_time: time,
            p0_pos: Vec2::new(1.0, 1.0),
            p0_score: s0,
            p1_pos: Vec2::new(2.0, 2.0),
            p1_score: s1,
            diamond_bits: bits.to_string(),
        }
    }

    #[test]
    fn test_first_setup_configures_session() {
        let mut session = Session::new();
        session.apply(setup_record(), 0.0);

        assert_eq!(session.state(), SessionState::Configured);
        assert_eq!(session.local_id(), Some(0));
        assert_eq!(session.maze().unwrap().diamond_count(), 3);
        assert_eq!(session.drain_events(), vec![GameEvent::MazeReady]);
    }

    #[test]
    fn test_repeated_setup_is_ignored() {
        let mut session = Session::new();
        session.apply(setup_record(), 0.0);
        session.drain_events();

        let second = ServerMessage::parse("SETUP 1 2 2 1111 0").unwrap();
        session.apply(second, 0.1);

        assert_eq!(session.local_id(), Some(0));
        assert_eq!(session.maze().unwrap().diamond_count(), 3);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_state_before_setup_is_rejected() {
        let mut session = Session::new();
        session.apply(state_record(1.0, 0, 0, "111"), 0.0);

        assert_eq!(session.state(), SessionState::Unidentified);
        assert!(session.snapshots().is_empty());
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_state_appends_snapshot_and_activates() {
        let mut session = Session::new();
        session.apply(setup_record(), 0.0);
        session.apply(state_record(1.0, 0, 0, "111"), 0.5);

        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.snapshots().len(), 1);
        assert_eq!(session.sim_time(), 1.0);
        assert_eq!(session.snapshots().latest().unwrap().time, 0.5);
    }

    #[test]
    fn test_diamond_bits_toggle_model() {
        let mut session = Session::new();
        session.apply(setup_record(), 0.0);
        session.drain_events();
        session.apply(state_record(1.0, 0, 0, "101"), 0.1);

        let active: Vec<bool> = session
            .maze()
            .unwrap()
            .diamonds()
            .iter()
            .map(|d| d.active)
            .collect();
        assert_eq!(active, vec![true, false, true]);
        assert!(
            session
                .drain_events()
                .contains(&GameEvent::DiamondsChanged)
        );
    }

    #[test]
    fn test_pickup_cue_fires_once_per_sum_increase() {
        let mut session = Session::new();
        session.apply(setup_record(), 0.0);
        session.drain_events();

        session.apply(state_record(1.0, 3, 4, "111"), 0.1);
        let cues = session
            .drain_events()
            .iter()
            .filter(|e| **e == GameEvent::PickupCue)
            .count();
        assert_eq!(cues, 1);

        session.apply(state_record(2.0, 4, 5, "111"), 0.2);
        let cues = session
            .drain_events()
            .iter()
            .filter(|e| **e == GameEvent::PickupCue)
            .count();
        assert_eq!(cues, 1);

        session.apply(state_record(3.0, 4, 5, "111"), 0.3);
        assert!(!session.drain_events().contains(&GameEvent::PickupCue));
    }

    #[test]
    fn test_gameover_finishes_session_and_blocks_further_records() {
        let mut session = Session::new();
        session.apply(setup_record(), 0.0);
        session.drain_events();

        session.apply(ServerMessage::parse("GAMEOVER -1 5 5").unwrap(), 1.0);
        assert_eq!(session.state(), SessionState::Finished);
        assert_eq!(
            session.drain_events(),
            vec![GameEvent::GameOver {
                outcome: Outcome::Draw,
                scores: [5, 5],
            }]
        );

        session.apply(state_record(9.0, 9, 9, "000"), 1.1);
        assert!(session.snapshots().is_empty());
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_shutdown_terminates_session() {
        let mut session = Session::new();
        session.apply(ServerMessage::Shutdown, 0.0);

        assert_eq!(session.state(), SessionState::Terminated);
        assert_eq!(session.drain_events(), vec![GameEvent::ShutdownRequested]);
    }

    #[test]
    fn test_mark_disconnected_terminates_once() {
        let mut session = Session::new();
        session.apply(setup_record(), 0.0);
        session.mark_disconnected();
        assert_eq!(session.state(), SessionState::Terminated);

        // Already finished sessions keep their state.
        let mut finished = Session::new();
        finished.apply(ServerMessage::parse("GAMEOVER 0 7 3").unwrap(), 0.0);
        finished.mark_disconnected();
        assert_eq!(finished.state(), SessionState::Finished);
    }
}
