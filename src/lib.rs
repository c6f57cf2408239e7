pub mod config;
pub mod error;
pub mod evaluation;
pub mod movegen;
pub mod position;
pub mod pst;
pub mod search;
pub mod time;
pub mod tt;
pub mod types;
pub mod uci;

pub use config::{EngineConfig, TtLifetime};
pub use error::EngineError;
pub use evaluation::evaluate;
pub use position::Position;
pub use search::Engine;
pub use types::{Score, SearchLimits, SearchResult, SearchStats};
