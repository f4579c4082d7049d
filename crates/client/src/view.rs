use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use duet::{MazeModel, Outcome, Session, SessionState};
use glam::Vec2;

/// Players closer than this get the proximity notice.
const PROXIMITY_RANGE: f32 = 0.9;

const PLAYER_NAMES: [&str; 2] = ["BLUE", "GREEN"];

/// ASCII renderer for the session state. Enables raw mode for its lifetime.
pub struct View {
    stdout: Stdout,
}

impl View {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        queue!(stdout, Hide, Clear(ClearType::All))?;
        stdout.flush()?;
        Ok(Self { stdout })
    }

    pub fn ring_bell(&mut self) -> io::Result<()> {
        queue!(self.stdout, Print('\x07'))?;
        self.stdout.flush()
    }

    pub fn draw(&mut self, session: &Session, now: f32, autopilot: bool) -> io::Result<()> {
        queue!(self.stdout, Clear(ClearType::All), MoveTo(0, 0))?;

        match session.maze() {
            Some(_) => self.draw_game(session, now, autopilot)?,
            None => queue!(self.stdout, Print("waiting for server..."))?,
        }

        self.stdout.flush()
    }

    fn draw_game(&mut self, session: &Session, now: f32, autopilot: bool) -> io::Result<()> {
        let Some(maze) = session.maze() else {
            return Ok(());
        };

        for y in 0..maze.height() {
            let mut row = String::with_capacity(maze.width());
            for x in 0..maze.width() {
                row.push(if maze.is_wall(x, y) { '#' } else { ' ' });
            }
            queue!(self.stdout, MoveTo(0, y as u16), Print(row))?;
        }

        for diamond in maze.diamonds() {
            if diamond.active {
                self.put_cell(maze, diamond.position, '*')?;
            }
        }

        let mut in_contact = false;
        if let Some((p0, p1)) = session.interpolated(now) {
            self.put_cell(maze, p0, '0')?;
            self.put_cell(maze, p1, '1')?;
            in_contact = p0.distance(p1) < PROXIMITY_RANGE;
        }

        let scores = session.scores();
        let mut status = format!(
            "{}: {}  |  {}: {}",
            PLAYER_NAMES[0], scores[0], PLAYER_NAMES[1], scores[1]
        );
        if let Some(id) = session.local_id() {
            status.push_str(&format!("   (you are {})", PLAYER_NAMES[id as usize % 2]));
        }
        if autopilot {
            status.push_str("   [autopilot]");
        }
        if in_contact {
            status.push_str("   [contact!]");
        }
        queue!(
            self.stdout,
            MoveTo(0, maze.height() as u16 + 1),
            Print(status)
        )?;

        if session.state() == SessionState::Finished {
            self.draw_banner(session, maze.height() as u16 + 3)?;
        }

        Ok(())
    }

    fn draw_banner(&mut self, session: &Session, row: u16) -> io::Result<()> {
        let scores = session.scores();
        let headline = match session.outcome() {
            Some(Outcome::Draw) => "IT'S A DRAW!".to_string(),
            Some(Outcome::Winner(id)) => {
                format!("{} WINS!", PLAYER_NAMES[id as usize % 2])
            }
            None => return Ok(()),
        };

        queue!(
            self.stdout,
            MoveTo(0, row),
            Print(headline),
            MoveTo(0, row + 1),
            Print(format!(
                "Final score: {} {} - {} {}   (q to exit)",
                PLAYER_NAMES[0], scores[0], PLAYER_NAMES[1], scores[1]
            ))
        )
    }

    fn put_cell(&mut self, maze: &MazeModel, position: Vec2, glyph: char) -> io::Result<()> {
        let x = position.x.round();
        let y = position.y.round();
        if x < 0.0 || y < 0.0 || x >= maze.width() as f32 || y >= maze.height() as f32 {
            return Ok(());
        }
        queue!(self.stdout, MoveTo(x as u16, y as u16), Print(glyph))
    }
}

impl Drop for View {
    fn drop(&mut self) {
        let _ = queue!(self.stdout, Show, MoveTo(0, 0), Clear(ClearType::All));
        let _ = self.stdout.flush();
        let _ = terminal::disable_raw_mode();
    }
}
