//! Stitching raw segments into connected polylines.
//!
//! # Algorithm
//!
//! Segments are folded into polylines in one greedy online pass over the
//! input order. Each segment either extends an existing polyline whose
//! extremity coincides with one of its endpoints (within tolerance), or
//! starts a new polyline. When an extension brings two polylines'
//! extremities together, they are spliced into one; a segment triggers at
//! most one splice. Degenerate segments shorter than the tolerance are
//! dropped up front.
//!
//! The pass is a pure fold, so for equal input order the output is
//! identical. Layer generation emits segments in deterministic traversal
//! order, which makes whole layers reproducible.
//!
//! # BambuStudio Reference
//!
//! - `src/libslic3r/Fill/FillAdaptive.cpp` - the chaining pass of
//!   `FillAdaptive::fill_surface_by_lines`. The reference connects lines
//!   through hook segments clipped against the boundary; here plain
//!   endpoint coincidence decides. Chords that touch are chained, the
//!   rest stay individual travel moves.

use crate::geometry::{Line, Lines, Point, Polyline, Polylines};
use crate::{scale, Coord, CoordF};

/// Default endpoint tolerance for stitching, in millimeters.
///
/// 0.05 mm is far above floating-point rounding noise and far below any
/// usable line spacing, so touching chords are joined without gluing
/// unrelated lines.
pub const STITCH_TOLERANCE: CoordF = 0.05;

/// Stitch raw layer segments into polylines with the default tolerance.
pub fn connect(segments: &Lines) -> Polylines {
    connect_with_tolerance(segments, STITCH_TOLERANCE)
}

/// Stitch raw layer segments into polylines.
///
/// Segments are consumed in input order; each extends a polyline whose
/// extremity matches one of its endpoints within `tolerance_mm`, splicing
/// two polylines when an extension closes the gap between them, or starts
/// a new polyline. Segments shorter than the tolerance are dropped.
pub fn connect_with_tolerance(segments: &Lines, tolerance_mm: CoordF) -> Polylines {
    let tolerance = scale(tolerance_mm);
    let mut polylines = Polylines::new();
    for segment in segments {
        if segment.is_degenerate(tolerance) {
            continue;
        }
        attach_segment(&mut polylines, *segment, tolerance);
    }
    polylines
}

/// Where a point touched a polyline.
#[derive(Clone, Copy, PartialEq, Eq)]
enum End {
    Front,
    Back,
}

fn touched_end(polyline: &Polyline, point: &Point, tolerance: Coord) -> Option<End> {
    if polyline.last_point().coincides_with(point, tolerance) {
        Some(End::Back)
    } else if polyline.first_point().coincides_with(point, tolerance) {
        Some(End::Front)
    } else {
        None
    }
}

fn attach_segment(polylines: &mut Polylines, segment: Line, tolerance: Coord) {
    // First polyline extremity matching either endpoint of the segment
    // wins; the matched endpoint is absorbed into the joint and the far
    // endpoint extends the polyline.
    let mut host = None;
    'search: for (idx, polyline) in polylines.iter().enumerate() {
        for (endpoint, far) in [(segment.a, segment.b), (segment.b, segment.a)] {
            if let Some(end) = touched_end(polyline, &endpoint, tolerance) {
                host = Some((idx, end, far));
                break 'search;
            }
        }
    }

    let Some((host_idx, host_end, far)) = host else {
        polylines.push(Polyline::from_line(&segment));
        return;
    };

    match host_end {
        End::Back => polylines[host_idx].push(far),
        End::Front => polylines[host_idx].prepend(far),
    }

    // The freshly added endpoint may bridge to a second polyline; splice
    // the two together, once.
    let other = polylines.iter().enumerate().find_map(|(idx, polyline)| {
        (idx != host_idx)
            .then(|| touched_end(polyline, &far, tolerance).map(|end| (idx, end)))
            .flatten()
    });
    if let Some((other_idx, other_end)) = other {
        splice(polylines, host_idx, host_end, other_idx, other_end);
    }
}

/// Merge `other_idx` into `host_idx` across the joint at the host's
/// `host_end` extremity.
fn splice(
    polylines: &mut Polylines,
    host_idx: usize,
    host_end: End,
    other_idx: usize,
    other_end: End,
) {
    let removed = polylines.swap_remove(other_idx);
    // swap_remove may relocate the host when it was the last polyline.
    let host_idx = if host_idx == polylines.len() {
        other_idx
    } else {
        host_idx
    };

    // Orient the removed polyline joint-first, then drop its copy of the
    // joint point so the joint appears exactly once in the result.
    let oriented = match other_end {
        End::Back => removed.reversed(),
        End::Front => removed,
    };
    let mut tail: Vec<Point> = oriented.into_points();
    tail.remove(0);

    match host_end {
        End::Back => polylines[host_idx].append(Polyline::from_points(tail)),
        End::Front => {
            tail.reverse();
            tail.extend(polylines[host_idx].points().iter().copied());
            polylines[host_idx] = Polyline::from_points(tail);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_segment(ax: CoordF, ay: CoordF, bx: CoordF, by: CoordF) -> Line {
        Line::from_coords_scale(ax, ay, bx, by)
    }

    #[test]
    fn test_chain_merges_into_one_polyline() {
        let segments = vec![
            make_segment(0.0, 0.0, 1.0, 0.0),
            make_segment(1.0, 0.0, 2.0, 1.0),
            make_segment(2.0, 1.0, 3.0, 1.0),
        ];

        let polylines = connect(&segments);
        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0].len(), 4);
        assert_eq!(polylines[0][0], Point::new_scale(0.0, 0.0));
        assert_eq!(polylines[0][3], Point::new_scale(3.0, 1.0));
    }

    #[test]
    fn test_reversed_segment_still_chains() {
        let segments = vec![
            make_segment(0.0, 0.0, 1.0, 0.0),
            // Far endpoint listed first.
            make_segment(2.0, 0.0, 1.0, 0.0),
        ];

        let polylines = connect(&segments);
        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0].len(), 3);
    }

    #[test]
    fn test_prepending_extends_the_front() {
        let segments = vec![
            make_segment(1.0, 0.0, 2.0, 0.0),
            make_segment(1.0, 0.0, 0.0, 0.0),
        ];

        let polylines = connect(&segments);
        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0][0], Point::new_scale(0.0, 0.0));
        assert_eq!(polylines[0][2], Point::new_scale(2.0, 0.0));
    }

    #[test]
    fn test_bridging_segment_splices_two_polylines() {
        let segments = vec![
            make_segment(0.0, 0.0, 1.0, 0.0),
            make_segment(2.0, 0.0, 3.0, 0.0),
            // Touches the first polyline's back and the second's front.
            make_segment(1.0, 0.0, 2.0, 0.0),
        ];

        let polylines = connect(&segments);
        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0].len(), 4);
        assert_eq!(polylines[0][0], Point::new_scale(0.0, 0.0));
        assert_eq!(polylines[0][3], Point::new_scale(3.0, 0.0));
    }

    #[test]
    fn test_splice_across_front_joint() {
        let segments = vec![
            make_segment(2.0, 0.0, 3.0, 0.0),
            make_segment(0.0, 0.0, 1.0, 0.0),
            // Extends the first polyline at its front, bridging to the
            // second polyline's back.
            make_segment(2.0, 0.0, 1.0, 0.0),
        ];

        let polylines = connect(&segments);
        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0].len(), 4);
        let first = polylines[0][0];
        let last = polylines[0][3];
        // Runs the full span in one direction or the other.
        assert!(
            (first, last) == (Point::new_scale(0.0, 0.0), Point::new_scale(3.0, 0.0))
                || (first, last) == (Point::new_scale(3.0, 0.0), Point::new_scale(0.0, 0.0))
        );
    }

    #[test]
    fn test_islands_stay_separate() {
        let segments = vec![
            make_segment(0.0, 0.0, 1.0, 0.0),
            make_segment(5.0, 5.0, 6.0, 5.0),
        ];

        let polylines = connect(&segments);
        assert_eq!(polylines.len(), 2);
        assert_eq!(polylines[0][0], Point::new_scale(0.0, 0.0));
        assert_eq!(polylines[1][0], Point::new_scale(5.0, 5.0));
    }

    #[test]
    fn test_tolerance_controls_stitching() {
        let segments = vec![
            make_segment(0.0, 0.0, 1.0, 0.0),
            // 0.03 mm gap to the previous endpoint.
            make_segment(1.03, 0.0, 2.0, 0.0),
        ];

        assert_eq!(connect_with_tolerance(&segments, 0.05).len(), 1);
        assert_eq!(connect_with_tolerance(&segments, 0.01).len(), 2);
    }

    #[test]
    fn test_degenerate_segments_are_dropped() {
        let segments = vec![
            make_segment(0.0, 0.0, 0.0, 0.0),
            make_segment(4.0, 4.0, 4.0, 4.04),
        ];

        assert!(connect(&segments).is_empty());
    }

    #[test]
    fn test_interior_joints_come_from_two_segments() {
        let segments = vec![
            make_segment(0.0, 0.0, 1.0, 0.0),
            make_segment(1.0, 0.0, 2.0, 1.0),
            make_segment(2.0, 1.0, 3.0, 1.0),
            make_segment(8.0, 8.0, 9.0, 8.0),
        ];

        let polylines = connect(&segments);
        let tolerance = crate::scale(STITCH_TOLERANCE);
        for polyline in &polylines {
            for joint in &polyline.points()[1..polyline.len() - 1] {
                let sharing = segments
                    .iter()
                    .flat_map(|segment| [segment.a, segment.b])
                    .filter(|endpoint| endpoint.coincides_with(joint, tolerance))
                    .count();
                assert_eq!(sharing, 2);
            }
        }
    }

    #[test]
    fn test_every_surviving_segment_lands_in_one_polyline() {
        let segments = vec![
            make_segment(0.0, 0.0, 1.0, 0.0),
            make_segment(1.0, 0.0, 2.0, 1.0),
            make_segment(5.0, 5.0, 6.0, 5.0),
            // Dropped as degenerate.
            make_segment(9.0, 9.0, 9.0, 9.01),
        ];

        let tolerance = crate::scale(STITCH_TOLERANCE);
        let kept = segments
            .iter()
            .filter(|segment| !segment.is_degenerate(tolerance))
            .count();

        let polylines = connect(&segments);
        let edges: usize = polylines.iter().map(Polyline::edge_count).sum();
        assert_eq!(edges, kept);
    }

    #[test]
    fn test_stitching_is_deterministic() {
        let segments = vec![
            make_segment(0.0, 0.0, 1.0, 1.0),
            make_segment(3.0, 0.0, 2.0, 1.0),
            make_segment(1.0, 1.0, 2.0, 1.0),
            make_segment(-1.0, 0.0, 0.0, 0.0),
        ];

        let first = connect(&segments);
        let second = connect(&segments);
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(connect(&Lines::new()).is_empty());
    }
}
