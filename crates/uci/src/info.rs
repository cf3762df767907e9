//! Parsing of `info` lines emitted during a search.

/// Score in centipawns or mate distance, from the side to move's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawn score (100 = 1 pawn advantage).
    Cp(i32),
    /// Mate in N moves (positive = side to move mates, negative = gets mated).
    Mate(i32),
}

/// Marks a score reported from a fail-high or fail-low re-search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
}

/// Search information from engine.
///
/// Every field is optional: engines emit many partial lines (for example
/// `info depth 14 currmove g1f3 currmovenumber 2`) and a field that was not on
/// the line stays `None`, never a zero default.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineInfo {
    /// Search depth in plies.
    pub depth: Option<u32>,
    /// Selective search depth.
    pub seldepth: Option<u32>,
    /// Index of the line when the engine runs with MultiPV.
    pub multipv: Option<u32>,
    /// Score evaluation.
    pub score: Option<Score>,
    /// Set when the score is only a bound.
    pub bound: Option<Bound>,
    /// Nodes searched.
    pub nodes: Option<u64>,
    /// Nodes per second.
    pub nps: Option<u64>,
    /// Time spent in milliseconds.
    pub time: Option<u64>,
    /// Hash table usage (per mille).
    pub hashfull: Option<u32>,
    /// Current move being searched.
    pub currmove: Option<String>,
    /// Current move number.
    pub currmovenumber: Option<u32>,
    /// Principal variation, `None` when the line carried no `pv` token.
    pub pv: Option<Vec<String>>,
    /// Free-form text after `string`.
    pub string: Option<String>,
}

impl EngineInfo {
    /// Parse a UCI info line. Returns `None` if the line is not an info line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().peekable();
        if parts.next() != Some("info") {
            return None;
        }

        let mut info = EngineInfo::default();

        while let Some(keyword) = parts.next() {
            match keyword {
                "depth" => info.depth = parts.next().and_then(|v| v.parse().ok()),
                "seldepth" => info.seldepth = parts.next().and_then(|v| v.parse().ok()),
                "multipv" => info.multipv = parts.next().and_then(|v| v.parse().ok()),
                "nodes" => info.nodes = parts.next().and_then(|v| v.parse().ok()),
                "nps" => info.nps = parts.next().and_then(|v| v.parse().ok()),
                "time" => info.time = parts.next().and_then(|v| v.parse().ok()),
                "hashfull" => info.hashfull = parts.next().and_then(|v| v.parse().ok()),
                "currmove" => info.currmove = parts.next().map(str::to_string),
                "currmovenumber" => {
                    info.currmovenumber = parts.next().and_then(|v| v.parse().ok())
                }
                "score" => {
                    let kind = parts.next();
                    let value = parts.next().and_then(|v| v.parse().ok());
                    info.score = match (kind, value) {
                        (Some("cp"), Some(cp)) => Some(Score::Cp(cp)),
                        (Some("mate"), Some(m)) => Some(Score::Mate(m)),
                        _ => None,
                    };
                    info.bound = match parts.peek() {
                        Some(&"lowerbound") => Some(Bound::Lower),
                        Some(&"upperbound") => Some(Bound::Upper),
                        _ => None,
                    };
                    if info.bound.is_some() {
                        parts.next();
                    }
                }
                "pv" => {
                    let mut pv = Vec::new();
                    while let Some(mv) = parts.next_if(|p| !is_info_keyword(p)) {
                        pv.push(mv.to_string());
                    }
                    info.pv = Some(pv);
                }
                "string" => {
                    info.string = Some(parts.by_ref().collect::<Vec<_>>().join(" "));
                }
                _ => {}
            }
        }

        Some(info)
    }
}

fn is_info_keyword(s: &str) -> bool {
    matches!(
        s,
        "depth"
            | "seldepth"
            | "multipv"
            | "score"
            | "nodes"
            | "nps"
            | "time"
            | "hashfull"
            | "pv"
            | "currmove"
            | "currmovenumber"
            | "string"
            | "tbhits"
            | "cpuload"
            | "refutation"
            | "currline"
    )
}
