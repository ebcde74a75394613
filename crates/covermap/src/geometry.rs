//! Pure conversion of declarative map shapes into path data.
//!
//! Paths are kept as a small command list so the same value can be written out
//! as SVG path data or flattened into points for the immediate-mode painter.

use std::fmt;

use crate::zone::Point;

/// Upper bound on the angle covered by one flattened arc segment, in degrees.
const ARC_STEP_DEGREES: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Circular arc from the current point to `to`. `center`, `start_deg` and
    /// `sweep_deg` describe the same arc for flattening; SVG output only needs
    /// the radius, flags and end point.
    Arc {
        center: Point,
        radius: f32,
        start_deg: f32,
        sweep_deg: f32,
        large_arc: bool,
        to: Point,
    },
    Close,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapPath {
    commands: Vec<PathCommand>,
}

impl MapPath {
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn first(&self) -> Option<&PathCommand> {
        self.commands.first()
    }

    /// Number of straight line segments (`L` commands).
    pub fn line_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PathCommand::LineTo(_)))
            .count()
    }

    pub fn arc_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, PathCommand::Arc { .. }))
            .count()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.commands.last(), Some(PathCommand::Close))
    }

    /// Large-arc flag of the first arc in the path, if any.
    pub fn large_arc(&self) -> Option<bool> {
        self.commands.iter().find_map(|c| match c {
            PathCommand::Arc { large_arc, .. } => Some(*large_arc),
            _ => None,
        })
    }

    /// Flatten into a point list. Arcs are sampled so that no segment covers
    /// more than `ARC_STEP_DEGREES`; `Close` does not repeat the first point.
    pub fn flatten(&self) -> Vec<Point> {
        let mut points = Vec::new();
        for cmd in &self.commands {
            match *cmd {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => points.push(p),
                PathCommand::Arc {
                    center,
                    radius,
                    start_deg,
                    sweep_deg,
                    to,
                    ..
                } => {
                    let steps = (sweep_deg.abs() / ARC_STEP_DEGREES).ceil().max(1.0) as usize;
                    for i in 1..steps {
                        let angle = start_deg + sweep_deg * i as f32 / steps as f32;
                        points.push(polar_to_cartesian(center, radius, angle));
                    }
                    points.push(to);
                }
                PathCommand::Close => {}
            }
        }
        points
    }
}

impl fmt::Display for MapPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(self.commands.len());
        for cmd in &self.commands {
            parts.push(match *cmd {
                PathCommand::MoveTo(p) => format!("M {} {}", fmt_num(p.x), fmt_num(p.y)),
                PathCommand::LineTo(p) => format!("L {} {}", fmt_num(p.x), fmt_num(p.y)),
                PathCommand::Arc {
                    radius,
                    large_arc,
                    to,
                    ..
                } => {
                    let r = fmt_num(radius.abs());
                    format!(
                        "A {r} {r} 0 {} 1 {} {}",
                        u8::from(large_arc),
                        fmt_num(to.x),
                        fmt_num(to.y)
                    )
                }
                PathCommand::Close => "Z".to_string(),
            });
        }
        write!(f, "{}", parts.join(" "))
    }
}

/// Format a coordinate for path data: integers without decimals, everything
/// else with at most three decimals.
pub fn fmt_num(v: f32) -> String {
    if v.fract() == 0.0 {
        // Avoid "-0"
        format!("{}", v as i64)
    } else {
        let s = format!("{v:.3}");
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s == "-0" { "0".to_string() } else { s.to_string() }
    }
}

pub fn polar_to_cartesian(center: Point, radius: f32, angle_deg: f32) -> Point {
    let theta = angle_deg.to_radians();
    Point::new(
        center.x + radius * theta.cos(),
        center.y + radius * theta.sin(),
    )
}

/// Pie slice for a camera field of view: move to the center, line to the
/// start endpoint, clockwise arc to the end endpoint, close.
///
/// The large-arc flag is set when `|end - start| > 180`, so a span of exactly
/// 180 degrees uses the small arc. Equal angles degenerate to a line through
/// the center; a zero or negative radius yields a zero-area or mirrored slice.
///
/// When `end < start` the two renderers disagree: the SVG arc keeps the
/// absolute-span flag, while the sampled sweep used by the painter and
/// hit-testing goes clockwise the short way round (300 to 10 is 70 degrees).
pub fn arc_slice_path(center: Point, radius: f32, start_deg: f32, end_deg: f32) -> MapPath {
    let from = polar_to_cartesian(center, radius, start_deg);
    let to = polar_to_cartesian(center, radius, end_deg);
    let large_arc = (end_deg - start_deg).abs() > 180.0;

    MapPath {
        commands: vec![
            PathCommand::MoveTo(center),
            PathCommand::LineTo(from),
            PathCommand::Arc {
                center,
                radius,
                start_deg,
                sweep_deg: clockwise_sweep(start_deg, end_deg),
                large_arc,
                to,
            },
            PathCommand::Close,
        ],
    }
}

/// Connected path through `waypoints`. Never closes the path itself; a loop is
/// drawn only when the data repeats the first point at the end.
pub fn polyline_path(waypoints: &[Point]) -> MapPath {
    let Some((first, rest)) = waypoints.split_first() else {
        return MapPath::default();
    };

    let mut commands = Vec::with_capacity(waypoints.len());
    commands.push(PathCommand::MoveTo(*first));
    commands.extend(rest.iter().map(|p| PathCommand::LineTo(*p)));
    MapPath { commands }
}

/// Degrees swept clockwise from `start` to reach `end`. An `end` past `start`
/// by a full turn or more keeps its span so a 0..360 camera is a full disc.
pub fn clockwise_sweep(start_deg: f32, end_deg: f32) -> f32 {
    let span = end_deg - start_deg;
    if span >= 0.0 {
        span.min(360.0)
    } else {
        span.rem_euclid(360.0)
    }
}

/// Whether `p` falls inside the field-of-view slice described by the arguments.
pub fn point_in_slice(p: Point, center: Point, radius: f32, start_deg: f32, end_deg: f32) -> bool {
    let r = radius.abs();
    let dist = p.distance(center);
    if dist > r || r == 0.0 {
        return false;
    }
    if dist == 0.0 {
        return true;
    }

    // A negative radius mirrors the slice through its center.
    let start = if radius < 0.0 { start_deg + 180.0 } else { start_deg };
    let angle = (p.y - center.y).atan2(p.x - center.x).to_degrees();
    let offset = (angle - start).rem_euclid(360.0);
    let sweep = clockwise_sweep(start_deg, end_deg);
    sweep >= 360.0 || offset <= sweep
}

pub fn point_in_circle(p: Point, center: Point, radius: f32) -> bool {
    p.distance(center) <= radius.abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const CENTER: Point = Point::new(100.0, 100.0);

    #[test]
    fn test_small_arc_for_narrow_span() {
        let path = arc_slice_path(CENTER, 50.0, 10.0, 60.0);
        assert_eq!(path.large_arc(), Some(false));
    }

    #[test]
    fn test_large_arc_for_wide_span() {
        let path = arc_slice_path(CENTER, 50.0, 10.0, 300.0);
        assert_eq!(path.large_arc(), Some(true));
    }

    #[test]
    fn test_exact_half_turn_uses_small_arc() {
        let path = arc_slice_path(CENTER, 50.0, 0.0, 180.0);
        assert_eq!(path.large_arc(), Some(false));
        let path = arc_slice_path(CENTER, 50.0, 0.0, 180.5);
        assert_eq!(path.large_arc(), Some(true));
    }

    #[test]
    fn test_large_arc_uses_absolute_span() {
        let path = arc_slice_path(CENTER, 50.0, 300.0, 10.0);
        assert_eq!(path.large_arc(), Some(true));
    }

    #[test]
    fn test_reversed_angles_svg_flag_differs_from_sweep() {
        let path = arc_slice_path(CENTER, 50.0, 300.0, 10.0);
        assert_eq!(path.large_arc(), Some(true));
        assert_abs_diff_eq!(clockwise_sweep(300.0, 10.0), 70.0);

        // The painter's flattened outline covers the 70 degree slice only.
        let points = path.flatten();
        let behind = polar_to_cartesian(CENTER, 25.0, 180.0);
        let within = polar_to_cartesian(CENTER, 25.0, 340.0);
        assert!(!point_in_slice(behind, CENTER, 50.0, 300.0, 10.0));
        assert!(point_in_slice(within, CENTER, 50.0, 300.0, 10.0));
        assert!(points.iter().all(|p| p.distance(CENTER) <= 50.0 + 1e-3));
    }

    #[test]
    fn test_slice_starts_at_exact_center() {
        for (start, end) in [(10.0, 60.0), (10.0, 300.0), (200.0, 255.0), (0.0, 0.0)] {
            let path = arc_slice_path(CENTER, 50.0, start, end);
            assert_eq!(path.first(), Some(&PathCommand::MoveTo(CENTER)));
            assert!(path.is_closed());
        }
    }

    #[test]
    fn test_slice_endpoints() {
        let path = arc_slice_path(CENTER, 50.0, 0.0, 90.0);
        let PathCommand::LineTo(from) = path.commands()[1] else {
            panic!("expected line to first endpoint");
        };
        assert_abs_diff_eq!(from.x, 150.0, epsilon = 1e-3);
        assert_abs_diff_eq!(from.y, 100.0, epsilon = 1e-3);
        let PathCommand::Arc { to, .. } = path.commands()[2] else {
            panic!("expected arc");
        };
        assert_abs_diff_eq!(to.x, 100.0, epsilon = 1e-3);
        assert_abs_diff_eq!(to.y, 150.0, epsilon = 1e-3);
    }

    #[test]
    fn test_slice_svg_data() {
        let path = arc_slice_path(CENTER, 50.0, 0.0, 90.0);
        assert_eq!(path.to_string(), "M 100 100 L 150 100 A 50 50 0 0 1 100 150 Z");
    }

    #[test]
    fn test_degenerate_equal_angles() {
        let path = arc_slice_path(CENTER, 50.0, 45.0, 45.0);
        assert_eq!(path.large_arc(), Some(false));
        let points = path.flatten();
        // Center, endpoint, endpoint again: a line through the center.
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], points[2]);
    }

    #[test]
    fn test_zero_radius_collapses_to_center() {
        let path = arc_slice_path(CENTER, 0.0, 10.0, 60.0);
        assert!(path.flatten().iter().all(|p| *p == CENTER));
    }

    #[test]
    fn test_negative_radius_does_not_panic() {
        let path = arc_slice_path(CENTER, -50.0, 10.0, 60.0);
        assert_eq!(path.first(), Some(&PathCommand::MoveTo(CENTER)));
        assert!(path.to_string().contains("A 50 50"));
        assert!(path.flatten().iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn test_flatten_samples_wide_arcs() {
        let path = arc_slice_path(CENTER, 50.0, 10.0, 300.0);
        let points = path.flatten();
        // center + start + ceil(290 / 5) arc samples
        assert_eq!(points.len(), 2 + 58);
        for p in &points[1..] {
            assert_abs_diff_eq!(p.distance(CENTER), 50.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_polyline_empty() {
        let path = polyline_path(&[]);
        assert!(path.is_empty());
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_polyline_single_point_is_move_only() {
        let path = polyline_path(&[Point::new(1.0, 1.0)]);
        assert_eq!(path.commands(), &[PathCommand::MoveTo(Point::new(1.0, 1.0))]);
        assert_eq!(path.line_count(), 0);
    }

    #[test]
    fn test_polyline_three_points() {
        let path = polyline_path(&[
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]);
        assert_eq!(path.first(), Some(&PathCommand::MoveTo(Point::new(0.0, 0.0))));
        assert_eq!(path.line_count(), 2);
        assert_eq!(path.to_string(), "M 0 0 L 10 0 L 10 10");
    }

    #[test]
    fn test_polyline_never_closes_itself() {
        let loop_points = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 0.0),
        ];
        let path = polyline_path(&loop_points);
        assert!(!path.is_closed());
        assert_eq!(path.line_count(), 2);
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(140.0), "140");
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(1.5), "1.5");
        assert_eq!(fmt_num(2.123456), "2.123");
        assert_eq!(fmt_num(-0.0001), "0");
    }

    #[test]
    fn test_clockwise_sweep() {
        assert_eq!(clockwise_sweep(10.0, 60.0), 50.0);
        assert_eq!(clockwise_sweep(310.0, 20.0), 70.0);
        assert_eq!(clockwise_sweep(0.0, 360.0), 360.0);
        assert_eq!(clockwise_sweep(45.0, 45.0), 0.0);
    }

    #[test]
    fn test_point_in_slice() {
        // Slice covering the lower-right quadrant (y down).
        assert!(point_in_slice(Point::new(120.0, 120.0), CENTER, 50.0, 0.0, 90.0));
        assert!(!point_in_slice(Point::new(80.0, 120.0), CENTER, 50.0, 0.0, 90.0));
        assert!(!point_in_slice(Point::new(80.0, 80.0), CENTER, 50.0, 0.0, 90.0));
        assert!(!point_in_slice(Point::new(200.0, 200.0), CENTER, 50.0, 0.0, 90.0));
        // Wrap-around slice 310..20 contains angle 0.
        assert!(point_in_slice(Point::new(130.0, 100.0), CENTER, 50.0, 310.0, 20.0));
        assert!(!point_in_slice(Point::new(120.0, 120.0), CENTER, 0.0, 0.0, 90.0));
    }

    #[test]
    fn test_point_in_slice_negative_radius_is_mirrored() {
        assert!(point_in_slice(Point::new(80.0, 80.0), CENTER, -50.0, 0.0, 90.0));
        assert!(!point_in_slice(Point::new(120.0, 120.0), CENTER, -50.0, 0.0, 90.0));
    }
}
