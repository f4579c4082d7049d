use glam::Vec2;
use thiserror::Error;

use crate::events::Outcome;

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty record")]
    Empty,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: String },
    #[error("wall grid has {got} cells, expected {expected}")]
    WallGridLength { got: usize, expected: usize },
    #[error("unexpected trailing fields")]
    TrailingFields,
}

/// One inbound record, decoded from its line-protocol form.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Setup {
        player_id: u8,
        width: usize,
        height: usize,
        wall_grid: String,
        diamonds: Vec<Vec2>,
    },
    State {
        sim_time: f32,
        p0_pos: Vec2,
        p0_score: u32,
        p1_pos: Vec2,
        p1_score: u32,
        diamond_bits: String,
    },
    GameOver {
        outcome: Outcome,
        scores: [u32; 2],
    },
    Shutdown,
}

impl ServerMessage {
    /// Parses one newline-delimited record. Fields are positional and
    /// space-separated; any arity or numeric mismatch fails the whole record.
    pub fn parse(record: &str) -> Result<Self, ParseError> {
        let mut fields = record.split_ascii_whitespace();
        let command = fields.next().ok_or(ParseError::Empty)?;

        let message = match command {
            "SETUP" => parse_setup(&mut fields)?,
            "STATE" => parse_state(&mut fields)?,
            "GAMEOVER" => parse_gameover(&mut fields)?,
            "SHUTDOWN" => ServerMessage::Shutdown,
            other => return Err(ParseError::UnknownCommand(other.to_string())),
        };

        if fields.next().is_some() {
            return Err(ParseError::TrailingFields);
        }

        Ok(message)
    }
}

/// One outbound record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
    Input { x: i8, y: i8 },
    Exit,
}

impl ClientMessage {
    pub fn encode(&self) -> String {
        match self {
            ClientMessage::Input { x, y } => format!("INPUT {} {}\n", x, y),
            ClientMessage::Exit => "EXIT\n".to_string(),
        }
    }
}

fn next_field<'a, I: Iterator<Item = &'a str>>(
    fields: &mut I,
    name: &'static str,
) -> Result<&'a str, ParseError> {
    fields.next().ok_or(ParseError::MissingField(name))
}

fn parse_number<'a, T, I>(fields: &mut I, name: &'static str) -> Result<T, ParseError>
where
    T: std::str::FromStr,
    I: Iterator<Item = &'a str>,
{
    let raw = next_field(fields, name)?;
    raw.parse().map_err(|_| ParseError::InvalidField {
        field: name,
        value: raw.to_string(),
    })
}

fn parse_setup<'a, I: Iterator<Item = &'a str>>(
    fields: &mut I,
) -> Result<ServerMessage, ParseError> {
    let player_id: u8 = parse_number(fields, "player id")?;
    let width: usize = parse_number(fields, "width")?;
    let height: usize = parse_number(fields, "height")?;

    let wall_grid = next_field(fields, "wall grid")?.to_string();
    if wall_grid.len() != width * height {
        return Err(ParseError::WallGridLength {
            got: wall_grid.len(),
            expected: width * height,
        });
    }

    let diamond_count: usize = parse_number(fields, "diamond count")?;
    let mut diamonds = Vec::with_capacity(diamond_count);
    for _ in 0..diamond_count {
        let x: f32 = parse_number(fields, "diamond x")?;
        let y: f32 = parse_number(fields, "diamond y")?;
        diamonds.push(Vec2::new(x, y));
    }

    Ok(ServerMessage::Setup {
        player_id,
        width,
        height,
        wall_grid,
        diamonds,
    })
}

fn parse_state<'a, I: Iterator<Item = &'a str>>(
    fields: &mut I,
) -> Result<ServerMessage, ParseError> {
    let sim_time: f32 = parse_number(fields, "sim time")?;
    let p0x: f32 = parse_number(fields, "player 0 x")?;
    let p0y: f32 = parse_number(fields, "player 0 y")?;
    let p0_score: u32 = parse_number(fields, "player 0 score")?;
    let p1x: f32 = parse_number(fields, "player 1 x")?;
    let p1y: f32 = parse_number(fields, "player 1 y")?;
    let p1_score: u32 = parse_number(fields, "player 1 score")?;
    let diamond_bits = next_field(fields, "diamond bits")?.to_string();

    Ok(ServerMessage::State {
        sim_time,
        p0_pos: Vec2::new(p0x, p0y),
        p0_score,
        p1_pos: Vec2::new(p1x, p1y),
        p1_score,
        diamond_bits,
    })
}

fn parse_gameover<'a, I: Iterator<Item = &'a str>>(
    fields: &mut I,
) -> Result<ServerMessage, ParseError> {
    let winner_id: i8 = parse_number(fields, "winner id")?;
    let outcome = Outcome::from_winner_id(winner_id).ok_or(ParseError::InvalidField {
        field: "winner id",
        value: winner_id.to_string(),
    })?;
    let score0: u32 = parse_number(fields, "score 0")?;
    let score1: u32 = parse_number(fields, "score 1")?;

    Ok(ServerMessage::GameOver {
        outcome,
        scores: [score0, score1],
    })
}
