//! Expansion state machine for gap rows
//!
//! A gap row carries a [`HunkDirection`] describing which expansion controls
//! it offers. Expanding a gap is a request (also a `HunkDirection`, minus
//! `In`) and the row's next state is a pure function of what remains of the
//! gap afterwards, see [`next_direction`].

use serde::{Deserialize, Serialize};

/// Expansion state of a gap row, or an expansion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HunkDirection {
    /// Page upwards from the hunk below
    Up,
    /// Page downwards from the hunk above
    Down,
    /// Reveal the whole gap at once
    Out,
    /// Both edges of an internal gap can expand (state only)
    In,
    /// Internal gap, paging upwards from its lower edge
    InUp,
    /// Internal gap, paging downwards from its upper edge
    InDown,
}

/// Edge of a gap that has been expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Lines revealed directly below the hunk above
    Top,
    /// Lines revealed directly above the hunk below
    Bottom,
}

/// Where a gap sits relative to the hunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    /// Above the first hunk
    Leading,
    /// Between two hunks
    Internal,
    /// Below the last hunk
    Trailing,
}

/// How gaps at the start and end of a file are expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeGaps {
    /// One click reveals everything up to the file boundary
    #[default]
    RevealAll,
    /// Page through edge gaps larger than one page with `up`/`down`
    Paged,
}

impl HunkDirection {
    pub const REQUESTS: [HunkDirection; 5] = [
        HunkDirection::Up,
        HunkDirection::Down,
        HunkDirection::Out,
        HunkDirection::InUp,
        HunkDirection::InDown,
    ];

    pub const STATES: [HunkDirection; 6] = [
        HunkDirection::Up,
        HunkDirection::Down,
        HunkDirection::Out,
        HunkDirection::In,
        HunkDirection::InUp,
        HunkDirection::InDown,
    ];

    /// Whether this value can be used to ask for lines
    pub fn is_request(self) -> bool {
        !matches!(self, HunkDirection::In)
    }

    /// Edge a request expands, `None` for `Out` (and the `In` state)
    pub fn request_edge(self) -> Option<Edge> {
        match self {
            HunkDirection::Down | HunkDirection::InDown => Some(Edge::Top),
            HunkDirection::Up | HunkDirection::InUp => Some(Edge::Bottom),
            HunkDirection::Out | HunkDirection::In => None,
        }
    }

    /// Edge a row state has recorded as already expanded
    pub fn expanded_edge(self) -> Option<Edge> {
        match self {
            HunkDirection::InDown => Some(Edge::Top),
            HunkDirection::InUp => Some(Edge::Bottom),
            HunkDirection::Up
            | HunkDirection::Down
            | HunkDirection::Out
            | HunkDirection::In => None,
        }
    }

    /// Requests a row in this state advertises
    pub fn offered(self) -> &'static [HunkDirection] {
        match self {
            HunkDirection::Out => &[HunkDirection::Out],
            HunkDirection::In => &[HunkDirection::InUp, HunkDirection::InDown],
            HunkDirection::InUp => &[HunkDirection::InUp],
            HunkDirection::InDown => &[HunkDirection::InDown],
            HunkDirection::Up => &[HunkDirection::Up],
            HunkDirection::Down => &[HunkDirection::Down],
        }
    }

    pub fn offers(self, request: HunkDirection) -> bool {
        self.offered().contains(&request)
    }
}

/// Remaining shape of a gap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapShape {
    pub kind: GapKind,
    /// Unrevealed lines; `None` when the end of the file is unknown
    pub remaining: Option<u32>,
}

/// Direction for a gap, or `None` once nothing remains to reveal
pub fn direction_for(
    shape: GapShape,
    page_size: u32,
    edge_gaps: EdgeGaps,
    expanded: Option<Edge>,
) -> Option<HunkDirection> {
    let page_size = page_size.max(1);
    let remaining = match shape.remaining {
        Some(0) => return None,
        Some(n) => n,
        // Only a trailing gap can be open-ended
        None => return Some(HunkDirection::Down),
    };
    let fits = remaining <= page_size;

    let direction = match (shape.kind, edge_gaps) {
        (GapKind::Internal, _) if fits => HunkDirection::Out,
        (GapKind::Internal, _) => match expanded {
            None => HunkDirection::In,
            Some(Edge::Top) => HunkDirection::InDown,
            Some(Edge::Bottom) => HunkDirection::InUp,
        },
        (GapKind::Leading | GapKind::Trailing, EdgeGaps::RevealAll) => HunkDirection::Out,
        (_, EdgeGaps::Paged) if fits => HunkDirection::Out,
        (GapKind::Leading, EdgeGaps::Paged) => HunkDirection::Up,
        (GapKind::Trailing, EdgeGaps::Paged) => HunkDirection::Down,
    };
    Some(direction)
}

/// State of a gap row after `request` was applied to a row in state `current`
pub fn next_direction(
    current: HunkDirection,
    request: HunkDirection,
    after: GapShape,
    page_size: u32,
    edge_gaps: EdgeGaps,
) -> Option<HunkDirection> {
    let expanded = request.request_edge().or(current.expanded_edge());
    direction_for(after, page_size, edge_gaps, expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use HunkDirection::*;

    const PAGE: u32 = 10;

    fn internal(remaining: u32) -> GapShape {
        GapShape {
            kind: GapKind::Internal,
            remaining: Some(remaining),
        }
    }

    #[test]
    fn test_initial_directions() {
        let edges = EdgeGaps::RevealAll;
        assert_eq!(direction_for(internal(5), PAGE, edges, None), Some(Out));
        assert_eq!(direction_for(internal(10), PAGE, edges, None), Some(Out));
        assert_eq!(direction_for(internal(11), PAGE, edges, None), Some(In));
        assert_eq!(direction_for(internal(0), PAGE, edges, None), None);

        let leading = GapShape {
            kind: GapKind::Leading,
            remaining: Some(500),
        };
        assert_eq!(direction_for(leading, PAGE, edges, None), Some(Out));
        assert_eq!(direction_for(leading, PAGE, EdgeGaps::Paged, None), Some(Up));

        let trailing = GapShape {
            kind: GapKind::Trailing,
            remaining: Some(500),
        };
        assert_eq!(direction_for(trailing, PAGE, edges, None), Some(Out));
        assert_eq!(
            direction_for(trailing, PAGE, EdgeGaps::Paged, None),
            Some(Down)
        );

        let open = GapShape {
            kind: GapKind::Trailing,
            remaining: None,
        };
        assert_eq!(direction_for(open, PAGE, edges, None), Some(Down));
    }

    #[test]
    fn test_paged_edges_fall_back_to_out_when_small() {
        for kind in [GapKind::Leading, GapKind::Trailing] {
            let shape = GapShape {
                kind,
                remaining: Some(PAGE),
            };
            assert_eq!(
                direction_for(shape, PAGE, EdgeGaps::Paged, None),
                Some(Out)
            );
        }
    }

    #[test]
    fn test_internal_transition_table() {
        // (current, request, remaining after) -> next
        let table = [
            (In, InDown, 20, Some(InDown)),
            (In, InUp, 20, Some(InUp)),
            (In, InDown, 10, Some(Out)),
            (In, InUp, 3, Some(Out)),
            (In, InDown, 0, None),
            (InDown, InDown, 15, Some(InDown)),
            (InDown, InDown, 5, Some(Out)),
            (InDown, InDown, 0, None),
            (InUp, InUp, 15, Some(InUp)),
            (InUp, InUp, 5, Some(Out)),
            (InUp, InUp, 0, None),
            (Out, Out, 0, None),
            // Out keeps whatever edge the row already recorded
            (InDown, Out, 30, Some(InDown)),
            (InUp, Out, 30, Some(InUp)),
            (In, Out, 30, Some(In)),
            (Out, Out, 30, Some(In)),
            // Plain paging requests count as edge expansions
            (In, Down, 30, Some(InDown)),
            (In, Up, 30, Some(InUp)),
            (Out, Down, 2, Some(Out)),
            (Out, Up, 0, None),
        ];
        for (current, request, remaining, expected) in table {
            assert_eq!(
                next_direction(current, request, internal(remaining), PAGE, EdgeGaps::RevealAll),
                expected,
                "{:?} + {:?} with {} remaining",
                current,
                request,
                remaining
            );
        }
    }

    #[test]
    fn test_edge_transition_table() {
        let leading = |remaining| GapShape {
            kind: GapKind::Leading,
            remaining: Some(remaining),
        };
        let trailing = |remaining| GapShape {
            kind: GapKind::Trailing,
            remaining,
        };
        let paged = EdgeGaps::Paged;
        let all = EdgeGaps::RevealAll;

        assert_eq!(next_direction(Up, Up, leading(40), PAGE, paged), Some(Up));
        assert_eq!(next_direction(Up, Up, leading(4), PAGE, paged), Some(Out));
        assert_eq!(next_direction(Up, Up, leading(0), PAGE, paged), None);
        assert_eq!(next_direction(Out, Out, leading(0), PAGE, all), None);
        assert_eq!(next_direction(Down, Down, trailing(Some(40)), PAGE, paged), Some(Down));
        assert_eq!(next_direction(Down, Down, trailing(Some(9)), PAGE, paged), Some(Out));
        assert_eq!(next_direction(Down, Down, trailing(None), PAGE, all), Some(Down));
        assert_eq!(next_direction(Down, Down, trailing(Some(0)), PAGE, all), None);
    }

    #[test]
    fn test_every_state_offers_only_requests() {
        for state in HunkDirection::STATES {
            assert!(!state.offered().is_empty());
            for request in state.offered() {
                assert!(request.is_request(), "{:?} offers {:?}", state, request);
                assert!(state.offers(*request));
            }
        }
        assert!(!In.offers(In));
        assert!(!InDown.offers(InUp));
        assert!(!Out.offers(Down));
    }

    #[test]
    fn test_every_request_pair_is_total() {
        // No (state, request) pair panics and remaining == 0 always removes the row
        for state in HunkDirection::STATES {
            for request in HunkDirection::REQUESTS {
                for kind in [GapKind::Leading, GapKind::Internal, GapKind::Trailing] {
                    let gone = GapShape {
                        kind,
                        remaining: Some(0),
                    };
                    assert_eq!(
                        next_direction(state, request, gone, PAGE, EdgeGaps::Paged),
                        None
                    );
                    let left = GapShape {
                        kind,
                        remaining: Some(PAGE * 3),
                    };
                    assert!(
                        next_direction(state, request, left, PAGE, EdgeGaps::Paged).is_some()
                    );
                }
            }
        }
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        assert_eq!(
            direction_for(internal(1), 0, EdgeGaps::RevealAll, None),
            Some(Out)
        );
        assert_eq!(
            direction_for(internal(2), 0, EdgeGaps::RevealAll, None),
            Some(In)
        );
    }
}
