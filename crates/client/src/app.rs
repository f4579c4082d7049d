use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use duet::{
    ClientConfig, ClientMessage, Connection, Dispatcher, GameEvent, InputSampler, Session,
    SessionState,
};
use log::info;

use crate::input;
use crate::view::View;

/// The main sequential tick loop: sample input, pump the dispatcher, query
/// interpolation, redraw. Never blocks on network I/O.
pub struct App {
    connection: Connection,
    dispatcher: Dispatcher,
    session: Session,
    sampler: InputSampler,
    tick_interval: Duration,
    start: Instant,
}

impl App {
    pub fn connect(host: &str, port: u16, autopilot: bool) -> anyhow::Result<Self> {
        let config = ClientConfig::default();
        let connection = Connection::connect(host, port)?;

        let mut sampler = InputSampler::from_config(&config);
        if autopilot {
            sampler.toggle_autopilot();
        }

        Ok(Self {
            connection,
            dispatcher: Dispatcher::new(),
            session: Session::from_config(&config),
            sampler,
            tick_interval: config.tick_interval(),
            start: Instant::now(),
        })
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut view = View::new().context("failed to set up terminal")?;

        loop {
            let tick_start = Instant::now();
            let now = self.start.elapsed().as_secs_f32();

            let polled = input::poll(self.session.local_id())?;
            if polled.exit {
                info!("exit requested");
                self.connection.send(&ClientMessage::Exit.encode());
                break;
            }
            if polled.toggle_autopilot {
                self.sampler.toggle_autopilot();
            }

            // Input is only worth sending once the server has told us who we
            // are and while the game is still running.
            if self.session.local_id().is_some() && !self.session.is_terminal() {
                if let Some(message) = self.sampler.sample(polled.axes, now) {
                    self.connection.send(&message.encode());
                }
            }

            self.dispatcher.pump(&self.connection, &mut self.session, now);

            for event in self.session.drain_events() {
                match event {
                    GameEvent::PickupCue => view.ring_bell()?,
                    // The game is decided; nothing further from the server
                    // matters, so wind the receive thread down while the
                    // banner stays up.
                    GameEvent::GameOver { .. } => self.connection.stop_receiving(),
                    _ => {}
                }
            }

            if self.connection.is_disconnected() {
                self.session.mark_disconnected();
            }

            view.draw(&self.session, now, self.sampler.autopilot())?;

            if self.session.state() == SessionState::Terminated {
                break;
            }

            if let Some(rest) = self.tick_interval.checked_sub(tick_start.elapsed()) {
                thread::sleep(rest);
            }
        }

        drop(view);
        self.connection.close();
        Ok(())
    }
}
