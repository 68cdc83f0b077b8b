//! Completeness check for Room auto-migration chains

use std::fmt;

/// One declared schema transition, `@AutoMigration(from, to)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MigrationEdge {
    pub from: i64,
    pub to: i64,
}

impl MigrationEdge {
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for MigrationEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// First point where a migration chain breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathDefect {
    /// Edge found where `expected_from -> expected_from + 1` was required
    UnexpectedEdge {
        expected_from: i64,
        edge: MigrationEdge,
    },
    /// Every edge chained but the chain stops before the target
    EndsEarly { reached: i64, target: i64 },
    /// The chain runs past the target version
    Overshoots { reached: i64, target: i64 },
}

impl fmt::Display for PathDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathDefect::UnexpectedEdge {
                expected_from,
                edge,
            } => write!(
                f,
                "expected a migration {} -> {} but found {}",
                expected_from,
                expected_from + 1,
                edge
            ),
            PathDefect::EndsEarly { reached, target } => write!(
                f,
                "migrations stop at version {}; missing {} -> {}",
                reached,
                reached,
                (reached + 1).min(*target)
            ),
            PathDefect::Overshoots { reached, target } => write!(
                f,
                "migrations reach version {} past the declared version {}",
                reached, target
            ),
        }
    }
}

/// Check that `edges` are exactly `1 -> 2, 2 -> 3, ..., (target - 1) -> target`
/// in any order
pub fn check(edges: &[MigrationEdge], target: i64) -> Result<(), PathDefect> {
    let mut sorted = edges.to_vec();
    sorted.sort_by_key(|e| e.from);

    let mut counter = 1;
    for edge in sorted {
        if edge.from != counter || edge.to != counter + 1 {
            return Err(PathDefect::UnexpectedEdge {
                expected_from: counter,
                edge,
            });
        }
        counter += 1;
    }

    if counter < target {
        Err(PathDefect::EndsEarly {
            reached: counter,
            target,
        })
    } else if counter > target {
        Err(PathDefect::Overshoots {
            reached: counter,
            target,
        })
    } else {
        Ok(())
    }
}

pub fn validate(edges: &[MigrationEdge], target: i64) -> bool {
    check(edges, target).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(i64, i64)]) -> Vec<MigrationEdge> {
        pairs.iter().map(|&(f, t)| MigrationEdge::new(f, t)).collect()
    }

    #[test]
    fn test_version_one_needs_no_edges() {
        assert!(validate(&[], 1));
    }

    #[test]
    fn test_complete_chains() {
        assert!(validate(&edges(&[(1, 2)]), 2));
        assert!(validate(&edges(&[(1, 2), (2, 3)]), 3));
    }

    #[test]
    fn test_order_does_not_matter() {
        assert!(validate(&edges(&[(2, 3), (1, 2)]), 3));
        assert!(validate(&edges(&[(3, 4), (1, 2), (2, 3)]), 4));
    }

    #[test]
    fn test_short_chain() {
        assert!(!validate(&edges(&[(1, 2), (2, 3)]), 4));
        assert_eq!(
            check(&edges(&[(1, 2), (2, 3)]), 4),
            Err(PathDefect::EndsEarly {
                reached: 3,
                target: 4
            })
        );
        assert!(!validate(&[], 2));
    }

    #[test]
    fn test_duplicates_fail() {
        assert_eq!(
            check(&edges(&[(1, 2), (1, 2)]), 3),
            Err(PathDefect::UnexpectedEdge {
                expected_from: 2,
                edge: MigrationEdge::new(1, 2)
            })
        );
    }

    #[test]
    fn test_skipping_edges_fail() {
        assert!(!validate(&edges(&[(1, 3)]), 3));
        assert!(!validate(&edges(&[(1, 2), (3, 4)]), 4));
    }

    #[test]
    fn test_descending_edge_fails() {
        assert!(!validate(&edges(&[(1, 2), (2, 1)]), 2));
    }

    #[test]
    fn test_edges_beyond_target_fail() {
        assert_eq!(
            check(&edges(&[(1, 2)]), 1),
            Err(PathDefect::Overshoots {
                reached: 2,
                target: 1
            })
        );
    }

    #[test]
    fn test_defect_messages() {
        let defect = check(&edges(&[(1, 3)]), 3).unwrap_err();
        assert_eq!(defect.to_string(), "expected a migration 1 -> 2 but found 1 -> 3");

        let defect = check(&edges(&[(1, 2)]), 3).unwrap_err();
        assert_eq!(defect.to_string(), "migrations stop at version 2; missing 2 -> 3");
    }
}
