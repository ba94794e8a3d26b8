//! Matching engine: profile normalization, pairwise scoring, ranking, and narrative rules.
//!
//! Everything here is pure; I/O lives in the storage, provider, and service crates.

pub mod basis;
pub mod narrative;
pub mod profile;
pub mod ranking;
pub mod scoring;
pub mod text;

mod error;

pub use basis::{Basis, BasisSet};
pub use error::{Error, Result};
pub use narrative::MatchPanels;
pub use profile::{FunctionArea, LabelSet, ProfileData, RawProfile};
pub use ranking::{RankOptions, ScoredMatch, apply_bump_rule, has_changed, rank, rank_with};
pub use scoring::{AcceptancePolicy, PairScore, ScoringLimits, Weights, score};
