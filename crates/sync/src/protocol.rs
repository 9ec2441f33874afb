//! Text line protocol spoken with the piece authority
//!
//! One message per newline-terminated line, space separated tokens.
//!
//! | Direction | Line | Meaning |
//! |---|---|---|
//! | client -> server | `PIECE` | request a catalog index |
//! | client -> server | `BOARD v0 v1 ...` | grid values, row-major |
//! | client -> server | `SCORE n` | score changed |
//! | client -> server | `LIVES n` | lives changed |
//! | client -> server | `DIE` | lives fell below zero |
//! | server -> client | `PIECE n` | assigned catalog index |
//!
//! Servers may interleave other lines (lobby chat and the like); clients
//! ignore them.

use std::fmt;

use thiserror::Error;

use gridfall_core::PieceCatalog;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("empty line")]
    Empty,
    #[error("unknown message {0:?}")]
    UnknownVerb(String),
    #[error("{verb} is missing its argument")]
    MissingArgument { verb: &'static str },
    #[error("{verb} has an invalid argument {value:?}")]
    InvalidArgument { verb: &'static str, value: String },
    #[error("piece index {index} is outside the catalog (0..{count})")]
    IndexOutOfRange { index: u8, count: u8 },
    #[error("{verb} has trailing tokens")]
    TrailingTokens { verb: &'static str },
}

/// Lines sent by the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    RequestPiece,
    Board(Vec<u8>),
    Score(u32),
    Lives(i32),
    Die,
}

/// Lines sent by the authority
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// A validated catalog index
    Piece(u8),
    /// Anything else; carries the verb for logging
    Other(String),
}

fn parse_arg<T: std::str::FromStr>(
    verb: &'static str,
    token: Option<&str>,
) -> Result<T, ProtocolError> {
    let value = token.ok_or(ProtocolError::MissingArgument { verb })?;
    value.parse().map_err(|_| ProtocolError::InvalidArgument {
        verb,
        value: value.to_string(),
    })
}

fn finish<'a>(
    verb: &'static str,
    mut rest: impl Iterator<Item = &'a str>,
) -> Result<(), ProtocolError> {
    match rest.next() {
        Some(_) => Err(ProtocolError::TrailingTokens { verb }),
        None => Ok(()),
    }
}

impl ClientMessage {
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let mut tokens = line.split_whitespace();
        let verb = tokens.next().ok_or(ProtocolError::Empty)?;
        let message = match verb {
            "PIECE" => ClientMessage::RequestPiece,
            "BOARD" => {
                let mut values = Vec::new();
                for token in tokens.by_ref() {
                    values.push(parse_arg("BOARD", Some(token))?);
                }
                ClientMessage::Board(values)
            }
            "SCORE" => ClientMessage::Score(parse_arg("SCORE", tokens.next())?),
            "LIVES" => ClientMessage::Lives(parse_arg("LIVES", tokens.next())?),
            "DIE" => ClientMessage::Die,
            other => return Err(ProtocolError::UnknownVerb(other.to_string())),
        };
        finish(message.verb(), tokens)?;
        Ok(message)
    }

    pub fn verb(&self) -> &'static str {
        match self {
            ClientMessage::RequestPiece => "PIECE",
            ClientMessage::Board(_) => "BOARD",
            ClientMessage::Score(_) => "SCORE",
            ClientMessage::Lives(_) => "LIVES",
            ClientMessage::Die => "DIE",
        }
    }

    /// Wire form without the trailing newline
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ClientMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientMessage::Board(values) => {
                f.write_str("BOARD")?;
                for value in values {
                    write!(f, " {value}")?;
                }
                Ok(())
            }
            ClientMessage::Score(score) => write!(f, "SCORE {score}"),
            ClientMessage::Lives(lives) => write!(f, "LIVES {lives}"),
            ClientMessage::RequestPiece | ClientMessage::Die => f.write_str(self.verb()),
        }
    }
}

impl ServerMessage {
    /// Parse one line from the authority. Indices are checked against the
    /// catalog; a bad `PIECE` line is a desync, other verbs pass through.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let mut tokens = line.split_whitespace();
        let verb = tokens.next().ok_or(ProtocolError::Empty)?;
        if verb != "PIECE" {
            return Ok(ServerMessage::Other(verb.to_string()));
        }

        let index: u8 = parse_arg("PIECE", tokens.next())?;
        finish("PIECE", tokens)?;
        let count = PieceCatalog::len();
        if index >= count {
            return Err(ProtocolError::IndexOutOfRange { index, count });
        }
        Ok(ServerMessage::Piece(index))
    }

    pub fn encode(&self) -> String {
        match self {
            ServerMessage::Piece(index) => format!("PIECE {index}"),
            ServerMessage::Other(line) => line.clone(),
        }
    }
}
