use std::io::{self, BufRead, Write};

use shakmaty::{Color, Position as _};
use tracing::warn;

use crate::error::EngineError;
use crate::position::{Position, uci_string};
use crate::search::{Engine, format_pv, format_score};
use crate::types::{DEFAULT_DEPTH, SearchLimits, SearchResult};

/// Runs the UCI loop over stdin/stdout until `quit` or end of input.
pub fn run(engine: &mut Engine) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with(engine, stdin.lock(), stdout.lock())
}

/// Searches run synchronously on the reading thread, so `stop` is not honoured.
pub fn run_with<R: BufRead, W: Write>(engine: &mut Engine, input: R, mut out: W) -> io::Result<()> {
    let mut pos = Position::default();

    for line in input.lines() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = tokens.first() else {
            continue;
        };

        match command {
            "uci" => {
                writeln!(out, "id name pawnstorm {}", env!("CARGO_PKG_VERSION"))?;
                writeln!(out, "id author the pawnstorm developers")?;
                writeln!(
                    out,
                    "option name Hash type spin default {} min 1 max 4096",
                    engine.config().hash_mb
                )?;
                writeln!(out, "uciok")?;
            }
            "isready" => writeln!(out, "readyok")?,
            "ucinewgame" => {
                engine.new_game();
                pos = Position::default();
            }
            "position" => match parse_position(&tokens) {
                Ok(p) => pos = p,
                Err(e) => warn!(%line, error = %e, "ignoring position command"),
            },
            "go" => {
                let go = parse_go(&tokens);
                let outcome = match go.clock(pos.side_to_move()) {
                    Some((remaining, inc)) if go.depth.is_none() && go.movetime.is_none() => {
                        engine.think_on_clock(&mut pos, remaining, inc)
                    }
                    _ => engine.think(&mut pos, go.limits()),
                };
                match outcome {
                    Ok(result) => report(&mut out, &result)?,
                    Err(EngineError::NoLegalMoves) => writeln!(out, "bestmove 0000")?,
                    Err(e) => {
                        warn!(error = %e, "search failed");
                        writeln!(out, "bestmove 0000")?;
                    }
                }
            }
            "setoption" => parse_setoption(&tokens, engine),
            "d" | "print" => {
                writeln!(out, "{:?}", pos.chess().board())?;
                writeln!(out, "fen {}", pos.to_fen())?;
                writeln!(out, "key {:016x}", pos.key())?;
            }
            "quit" => break,
            "stop" => {}
            _ => warn!(%line, "unknown command"),
        }
        out.flush()?;
    }

    Ok(())
}

fn report<W: Write>(out: &mut W, result: &SearchResult) -> io::Result<()> {
    let nodes = result.stats.nodes + result.stats.qnodes;
    let nps = nodes * 1000 / result.elapsed_ms.max(1);
    writeln!(
        out,
        "info depth {} {} nodes {} time {} nps {} pv {}",
        result.depth,
        format_score(result.score),
        nodes,
        result.elapsed_ms,
        nps,
        format_pv(&result.pv)
    )?;
    writeln!(out, "bestmove {}", uci_string(&result.best_move))
}

/// Parsed `go` command parameters.
#[derive(Debug, Default)]
struct GoParams {
    depth: Option<u8>,
    movetime: Option<u64>,
    wtime: Option<u64>,
    btime: Option<u64>,
    winc: Option<u64>,
    binc: Option<u64>,
}

impl GoParams {
    /// Remaining time and increment for `side`, if a clock was given.
    fn clock(&self, side: Color) -> Option<(u64, u64)> {
        let (time, inc) = match side {
            Color::White => (self.wtime, self.winc),
            Color::Black => (self.btime, self.binc),
        };
        time.map(|t| (t, inc.unwrap_or(0)))
    }

    /// `go` without limits (including `go infinite`) searches to the default depth.
    fn limits(&self) -> SearchLimits {
        match (self.depth, self.movetime) {
            (None, None) => SearchLimits::depth(DEFAULT_DEPTH),
            (None, Some(ms)) => SearchLimits::movetime(ms),
            (depth, movetime) => SearchLimits { max_depth: depth, budget_ms: movetime },
        }
    }
}

fn parse_go(tokens: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut iter = tokens.iter().skip(1);

    while let Some(&token) = iter.next() {
        match token {
            "depth" => params.depth = iter.next().and_then(|v| v.parse().ok()),
            "movetime" => params.movetime = iter.next().and_then(|v| v.parse().ok()),
            "wtime" => params.wtime = iter.next().and_then(|v| v.parse().ok()),
            "btime" => params.btime = iter.next().and_then(|v| v.parse().ok()),
            "winc" => params.winc = iter.next().and_then(|v| v.parse().ok()),
            "binc" => params.binc = iter.next().and_then(|v| v.parse().ok()),
            _ => {}
        }
    }

    params
}

fn parse_position(tokens: &[&str]) -> Result<Position, EngineError> {
    let moves_idx = tokens.iter().position(|&t| t == "moves").unwrap_or(tokens.len());

    let mut pos = match tokens.get(1) {
        Some(&"startpos") => Position::default(),
        Some(&"fen") => Position::from_fen(&tokens[2..moves_idx].join(" "))?,
        _ => return Err(EngineError::IllegalPosition("expected startpos or fen".to_string())),
    };

    for &mv in tokens.iter().skip(moves_idx + 1) {
        pos.play_uci(mv)?;
    }

    Ok(pos)
}

fn parse_setoption(tokens: &[&str], engine: &mut Engine) {
    let name_idx = tokens.iter().position(|&t| t == "name");
    let value_idx = tokens.iter().position(|&t| t == "value");

    if let (Some(ni), Some(vi)) = (name_idx, value_idx) {
        let name: String = tokens[ni + 1..vi].join(" ");
        let value: String = tokens[vi + 1..].join(" ");

        match name.to_lowercase().as_str() {
            "hash" => match value.parse::<usize>() {
                Ok(mb) => engine.resize_tt(mb.clamp(1, 4096)),
                Err(_) => warn!(%value, "invalid Hash value"),
            },
            _ => warn!(%name, "unsupported option"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(input: &str) -> String {
        let mut engine = Engine::default();
        let mut out = Vec::new();
        run_with(&mut engine, input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_uci_handshake() {
        let out = session("uci\nisready\nquit\n");
        assert!(out.contains("id name pawnstorm"));
        assert!(out.contains("uciok"));
        assert!(out.contains("readyok"));
    }

    #[test]
    fn test_go_depth_reports_bestmove() {
        let out = session("position startpos moves e2e4\ngo depth 2\n");
        assert!(out.contains("info depth 2"));
        let best = out.lines().find(|l| l.starts_with("bestmove")).unwrap();
        let mv = best.trim_start_matches("bestmove ");
        let mut pos = Position::default();
        pos.play_uci("e2e4").unwrap();
        assert!(pos.play_uci(mv).is_ok(), "{} should be legal for black", mv);
    }

    #[test]
    fn test_go_on_clock() {
        let out = session("position startpos\ngo wtime 1000 btime 1000 winc 0 binc 0\n");
        assert!(out.lines().any(|l| l.starts_with("bestmove ") && l != "bestmove 0000"));
    }

    #[test]
    fn test_go_when_mated() {
        let out = session(
            "position fen rnbqkbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3\ngo depth 3\n",
        );
        assert!(out.contains("bestmove 0000"));
    }

    #[test]
    fn test_parse_position_startpos_with_moves() {
        let pos = parse_position(&["position", "startpos", "moves", "e2e4", "e7e5"]).unwrap();
        assert_eq!(pos.side_to_move(), Color::White);
        assert_eq!(pos.game_ply(), 2);
    }

    #[test]
    fn test_parse_position_fen() {
        let tokens = [
            "position", "fen", "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR", "b", "KQkq", "e3", "0", "1",
        ];
        let pos = parse_position(&tokens).unwrap();
        assert_eq!(pos.side_to_move(), Color::Black);
    }

    #[test]
    fn test_parse_position_rejects_illegal_move() {
        let err = parse_position(&["position", "startpos", "moves", "e2e5"]).unwrap_err();
        assert!(matches!(err, EngineError::IllegalMove(_)));
    }

    #[test]
    fn test_position_history_tracking() {
        let tokens = ["position", "startpos", "moves", "g1f3", "g8f6", "f3g1", "f6g8"];
        let pos = parse_position(&tokens).unwrap();
        assert!(pos.is_repetition(), "Nf3 Nf6 Ng1 Ng8 repeats the start position");
    }

    #[test]
    fn test_parse_go() {
        let go = parse_go(&["go", "wtime", "60000", "btime", "50000", "winc", "1000", "binc", "500"]);
        assert_eq!(go.clock(Color::White), Some((60000, 1000)));
        assert_eq!(go.clock(Color::Black), Some((50000, 500)));

        let go = parse_go(&["go", "depth", "6"]);
        assert_eq!(go.depth, Some(6));
        assert_eq!(go.clock(Color::White), None);
        assert_eq!(go.limits().max_depth, Some(6));

        let go = parse_go(&["go", "movetime", "250"]);
        assert_eq!(go.limits().budget_ms, Some(250));
        assert_eq!(go.limits().max_depth, None);
    }

    #[test]
    fn test_parse_setoption_hash() {
        let mut engine = Engine::default();
        parse_setoption(&["setoption", "name", "Hash", "value", "8"], &mut engine);
        assert_eq!(engine.config().hash_mb, 8);
    }
}
