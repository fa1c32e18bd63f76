//! Interface compatibility matching and scoring.
//!
//! Pure functions: given a source interface and candidate interfaces from
//! other components, decide which candidates can connect and how well. The
//! connectivity rule is hard (an export only connects to an import and vice
//! versa); scoring ranks the survivors by structural overlap.

use serde::{Deserialize, Serialize};

use crate::element::ElementId;
use crate::wit::WitInterface;

/// Outcome of checking one source/candidate interface pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityResult {
    /// Whether a connection is allowed.
    pub is_valid: bool,
    /// Structural compatibility, 0-100.
    pub score: u8,
    /// Human-readable reasons for rejections and partial matches.
    pub issues: Vec<String>,
}

/// A candidate interface drawn from another component in the diagram.
#[derive(Debug, Clone)]
pub struct InterfaceCandidate {
    /// Component element owning the interface.
    pub component_id: ElementId,
    /// The candidate interface.
    pub interface: WitInterface,
}

/// A scored, connectable candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceMatch {
    /// Component element owning the matched interface.
    pub component_id: ElementId,
    /// Name of the matched interface.
    pub interface_name: String,
    /// The compatibility assessment.
    pub result: CompatibilityResult,
}

/// Pluggable scoring strategy.
///
/// The weighting of name vs. signature overlap is a product decision, so it
/// sits behind a trait; [`SignatureOverlap`] is the default.
pub trait ScoringStrategy: Send + Sync {
    /// Score a source/candidate pair. Must enforce the connectivity rule.
    fn score(&self, source: &WitInterface, candidate: &WitInterface) -> CompatibilityResult;
}

/// Default scoring: 30 points for an equal interface name, 70 points for
/// function overlap. A signature-identical function counts full, a name-only
/// match half, measured against the larger function count. Interfaces with
/// no functions on either side take full function credit.
#[derive(Debug, Clone, Copy)]
pub struct SignatureOverlap {
    /// Minimum score for a candidate to be considered valid.
    pub min_valid_score: u8,
}

impl Default for SignatureOverlap {
    fn default() -> Self {
        Self { min_valid_score: 50 }
    }
}

const NAME_POINTS: f64 = 30.0;
const FUNCTION_POINTS: f64 = 70.0;

impl ScoringStrategy for SignatureOverlap {
    fn score(&self, source: &WitInterface, candidate: &WitInterface) -> CompatibilityResult {
        let mut issues = Vec::new();

        // Connectivity rule: opposite directions required, always checked
        // before any scoring.
        if source.direction == candidate.direction {
            issues.push(format!(
                "both interfaces are {}s; an {} can only connect to an {}",
                source.direction,
                source.direction,
                source.direction.opposite()
            ));
            return CompatibilityResult {
                is_valid: false,
                score: 0,
                issues,
            };
        }

        let name_points = if source.name == candidate.name {
            NAME_POINTS
        } else {
            issues.push(format!(
                "interface names differ: `{}` vs `{}`",
                source.name, candidate.name
            ));
            0.0
        };

        let denominator = source.functions.len().max(candidate.functions.len());
        let function_points = if denominator == 0 {
            FUNCTION_POINTS
        } else {
            let mut credit = 0.0;
            for function in &source.functions {
                match candidate.functions.iter().find(|f| f.name == function.name) {
                    Some(counterpart) if function.signature_matches(counterpart) => credit += 1.0,
                    Some(_) => {
                        credit += 0.5;
                        issues.push(format!(
                            "function `{}` matches by name but not signature",
                            function.name
                        ));
                    }
                    None => issues.push(format!(
                        "no counterpart for function `{}`",
                        function.name
                    )),
                }
            }
            #[allow(clippy::cast_precision_loss)]
            {
                FUNCTION_POINTS * credit / denominator as f64
            }
        };

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let score = (name_points + function_points).round().min(100.0) as u8;
        let is_valid = score >= self.min_valid_score;
        if !is_valid {
            issues.push(format!(
                "score {score} is below the compatibility threshold {}",
                self.min_valid_score
            ));
        }

        CompatibilityResult {
            is_valid,
            score,
            issues,
        }
    }
}

/// Find all valid candidates for a source interface, sorted by descending
/// score. Ties keep candidate (diagram) order; the sort is stable.
///
/// An empty result means no compatible interfaces exist; it is not an error.
#[must_use]
pub fn find_compatible(
    source: &WitInterface,
    candidates: &[InterfaceCandidate],
    strategy: &dyn ScoringStrategy,
) -> Vec<InterfaceMatch> {
    let mut matches: Vec<InterfaceMatch> = candidates
        .iter()
        .map(|candidate| InterfaceMatch {
            component_id: candidate.component_id,
            interface_name: candidate.interface.name.clone(),
            result: strategy.score(source, &candidate.interface),
        })
        .filter(|m| m.result.is_valid)
        .collect();
    matches.sort_by(|a, b| b.result.score.cmp(&a.result.score));
    matches
}

/// Re-check one pair immediately before committing a connection.
///
/// The diagram may have changed between matching and confirmation, so the
/// same connectivity and scoring rules run again.
#[must_use]
pub fn check_connection(
    source: &WitInterface,
    target: &WitInterface,
    strategy: &dyn ScoringStrategy,
) -> CompatibilityResult {
    strategy.score(source, target)
}
