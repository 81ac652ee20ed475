use serde::{Deserialize, Serialize};

/// Palette applied to ranked positions, in order.
const RANK_COLORS: [&str; 6] = [
    "#28a745", // green
    "#007bff", // blue
    "#fd7e14", // orange
    "#6f42c1", // purple
    "#e83e8c", // pink
    "#20c997", // teal
];

/// Positions past the palette render neutral gray.
const FALLBACK_COLOR: &str = "#6c757d";

/// Human-readable ordinal annotation for one display position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankBadge {
    pub label: String,
    pub color: String,
}

impl RankBadge {
    /// Badge for a zero-based display position.
    pub fn for_position(position: usize) -> Self {
        let label = match position {
            0 => "BEST".to_string(),
            1 => "2ND BEST".to_string(),
            2 => "3RD BEST".to_string(),
            n => format!("{}TH BEST", n + 1),
        };
        let color = RANK_COLORS
            .get(position)
            .copied()
            .unwrap_or(FALLBACK_COLOR)
            .to_string();

        Self { label, color }
    }
}

/// Candidate kinds the ranking engine can annotate.
pub trait Rankable {
    fn badge(&self) -> Option<&RankBadge>;

    /// Copy-on-annotate: consumes the candidate and returns it badged.
    fn with_badge(self, badge: RankBadge) -> Self;
}

/// A candidate list tagged with whether it has been through the ranking
/// engine.
///
/// Input order already reflects desirability; the upstream scorer owns that
/// comparison. A set stays `Unranked` until this engine labels the
/// positions, and ranking a `Ranked` set is a no-op, so a list is only ever
/// labeled once.
#[derive(Debug, Clone)]
pub enum CandidateSet<C> {
    Unranked(Vec<C>),
    Ranked(Vec<C>),
}

impl<C: Rankable> CandidateSet<C> {
    /// Classify a raw list: any badge present means a previous pass already
    /// labeled it.
    pub fn from_candidates(candidates: Vec<C>) -> Self {
        if candidates.iter().any(|c| c.badge().is_some()) {
            CandidateSet::Ranked(candidates)
        } else {
            CandidateSet::Unranked(candidates)
        }
    }

    pub fn candidates(&self) -> &[C] {
        match self {
            CandidateSet::Unranked(candidates) | CandidateSet::Ranked(candidates) => candidates,
        }
    }

    pub fn into_inner(self) -> Vec<C> {
        match self {
            CandidateSet::Unranked(candidates) | CandidateSet::Ranked(candidates) => candidates,
        }
    }
}

/// Label positional rank onto an unranked candidate set.
///
/// Position 0 becomes "BEST", 1 "2ND BEST", 2 "3RD BEST", then "{n+1}TH
/// BEST". An already-ranked set passes through untouched.
pub fn rank<C: Rankable>(set: CandidateSet<C>) -> CandidateSet<C> {
    match set {
        CandidateSet::Unranked(candidates) => CandidateSet::Ranked(
            candidates
                .into_iter()
                .enumerate()
                .map(|(position, candidate)| candidate.with_badge(RankBadge::for_position(position)))
                .collect(),
        ),
        ranked @ CandidateSet::Ranked(_) => ranked,
    }
}
