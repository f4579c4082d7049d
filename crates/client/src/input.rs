use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use duet::Axes;

/// Everything the operator did since the last tick.
#[derive(Debug, Default)]
pub struct PolledInput {
    pub axes: Axes,
    pub toggle_autopilot: bool,
    pub exit: bool,
}

/// Drains all pending terminal events for this tick. Movement bindings
/// depend on the assigned player slot: slot 0 steers with WASD, slot 1 with
/// the arrow keys. Slot 1's axes are inverted because that player views the
/// maze from the opposite side.
pub fn poll(local_id: Option<u8>) -> io::Result<PolledInput> {
    let mut polled = PolledInput::default();

    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Release {
                apply_key(&mut polled, key, local_id);
            }
        }
    }

    Ok(polled)
}

fn apply_key(polled: &mut PolledInput, key: KeyEvent, local_id: Option<u8>) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            polled.exit = true;
            return;
        }
        KeyCode::Char('p') => {
            polled.toggle_autopilot = true;
            return;
        }
        _ => {}
    }

    let mut x = polled.axes.x;
    let mut y = polled.axes.y;

    match local_id {
        Some(0) => match key.code {
            KeyCode::Char('w') => y = 1,
            KeyCode::Char('s') => y = -1,
            KeyCode::Char('a') => x = -1,
            KeyCode::Char('d') => x = 1,
            _ => {}
        },
        Some(1) => match key.code {
            KeyCode::Up => y = -1,
            KeyCode::Down => y = 1,
            KeyCode::Left => x = 1,
            KeyCode::Right => x = -1,
            _ => {}
        },
        _ => {}
    }

    polled.axes = Axes::new(x, y);
}
