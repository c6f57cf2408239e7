use std::path::PathBuf;

use shakmaty::fen::ParseFenError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid FEN: {0}")]
    InvalidFen(#[from] ParseFenError),

    #[error("illegal position: {0}")]
    IllegalPosition(String),

    #[error("illegal move `{0}` in current position")]
    IllegalMove(String),

    #[error("no legal moves: side to move is mated or stalemated")]
    NoLegalMoves,

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
