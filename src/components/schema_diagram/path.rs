//! SVG path data helpers for Graphviz edges and re-routed connectors.

use svgtypes::{PointsParser, SimplePathSegment, SimplifyingPathParser};

use super::geometry::{BBox, Extent, Point, fmt_num};

/// Absolute segments of a path, stopping at the first parse error.
fn segments(d: &str) -> impl Iterator<Item = SimplePathSegment> + '_ {
	SimplifyingPathParser::from(d).map_while(Result::ok)
}

/// First and last drawn point of a path.
pub fn endpoints(d: &str) -> Option<(Point, Point)> {
	let mut start = None;
	let mut end = None;
	for seg in segments(d) {
		let p = match seg {
			SimplePathSegment::MoveTo { x, y }
			| SimplePathSegment::LineTo { x, y }
			| SimplePathSegment::CurveTo { x, y, .. }
			| SimplePathSegment::Quadratic { x, y, .. } => Point::new(x, y),
			SimplePathSegment::ClosePath => continue,
		};
		start.get_or_insert(p);
		end = Some(p);
	}
	Some((start?, end?))
}

/// Bounds of every point and control point in the path.
///
/// A Bézier curve stays inside the hull of its control points, so this is a
/// cheap, slightly generous bounding box.
pub fn control_bounds(d: &str) -> Option<BBox> {
	let mut extent = Extent::default();
	for seg in segments(d) {
		match seg {
			SimplePathSegment::MoveTo { x, y } | SimplePathSegment::LineTo { x, y } => {
				extent.include_point(Point::new(x, y));
			}
			SimplePathSegment::CurveTo {
				x1,
				y1,
				x2,
				y2,
				x,
				y,
			} => {
				extent.include_point(Point::new(x1, y1));
				extent.include_point(Point::new(x2, y2));
				extent.include_point(Point::new(x, y));
			}
			SimplePathSegment::Quadratic { x1, y1, x, y } => {
				extent.include_point(Point::new(x1, y1));
				extent.include_point(Point::new(x, y));
			}
			SimplePathSegment::ClosePath => {}
		}
	}
	extent.finish()
}

/// Parse a `points` attribute of a polygon or polyline.
pub fn polygon_points(points: &str) -> Vec<Point> {
	PointsParser::from(points)
		.map(|(x, y)| Point::new(x, y))
		.collect()
}

/// Mean of the distinct vertices; a closing vertex equal to the first is ignored.
pub fn centroid(points: &[Point]) -> Option<Point> {
	let vertices = match points {
		[first, .., last] if points.len() > 1 && first == last => &points[..points.len() - 1],
		_ => points,
	};
	if vertices.is_empty() {
		return None;
	}
	let n = vertices.len() as f64;
	let (sx, sy) = vertices
		.iter()
		.fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
	Some(Point::new(sx / n, sy / n))
}

/// Uniform cubic B-spline through `points`, emitted as SVG path data.
///
/// Starts at the first point and ends at the last, pulled towards the inner
/// points without passing through them (the usual `curveBasis` shape).
pub fn basis_spline(points: &[Point]) -> String {
	let mut out = String::new();
	match points {
		[] => return out,
		[p] => {
			push_cmd(&mut out, 'M', &[*p]);
			return out;
		}
		[p0, p1] => {
			push_cmd(&mut out, 'M', &[*p0]);
			push_cmd(&mut out, 'L', &[*p1]);
			return out;
		}
		_ => {}
	}

	let mut x0 = points[0];
	let mut x1 = points[1];
	push_cmd(&mut out, 'M', &[x0]);
	push_cmd(
		&mut out,
		'L',
		&[Point::new((5.0 * x0.x + x1.x) / 6.0, (5.0 * x0.y + x1.y) / 6.0)],
	);
	for &p in &points[2..] {
		push_basis(&mut out, x0, x1, p);
		x0 = x1;
		x1 = p;
	}
	push_basis(&mut out, x0, x1, x1);
	push_cmd(&mut out, 'L', &[x1]);
	out
}

fn push_basis(out: &mut String, x0: Point, x1: Point, p: Point) {
	push_cmd(
		out,
		'C',
		&[
			Point::new((2.0 * x0.x + x1.x) / 3.0, (2.0 * x0.y + x1.y) / 3.0),
			Point::new((x0.x + 2.0 * x1.x) / 3.0, (x0.y + 2.0 * x1.y) / 3.0),
			Point::new((x0.x + 4.0 * x1.x + p.x) / 6.0, (x0.y + 4.0 * x1.y + p.y) / 6.0),
		],
	);
}

fn push_cmd(out: &mut String, cmd: char, points: &[Point]) {
	out.push(cmd);
	for (i, p) in points.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}
		out.push_str(&fmt_num(p.x));
		out.push(',');
		out.push_str(&fmt_num(p.y));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const GRAPHVIZ_EDGE: &str = "M72,-68C117.5,-68 133.5,-12 173.86,-12";

	#[test]
	fn endpoints_of_graphviz_edge() {
		let (start, end) = endpoints(GRAPHVIZ_EDGE).unwrap();
		assert_eq!(start, Point::new(72.0, -68.0));
		assert_eq!(end, Point::new(173.86, -12.0));
	}

	#[test]
	fn endpoints_resolve_relative_commands() {
		let (start, end) = endpoints("m10,10 l5,5 h10").unwrap();
		assert_eq!(start, Point::new(10.0, 10.0));
		assert_eq!(end, Point::new(25.0, 15.0));
		assert_eq!(endpoints(""), None);
	}

	#[test]
	fn control_bounds_cover_control_points() {
		let b = control_bounds(GRAPHVIZ_EDGE).unwrap();
		assert_eq!(b.x, 72.0);
		assert!((b.right() - 173.86).abs() < 1e-9);
		assert_eq!(b.y, -68.0);
		assert!((b.bottom() + 12.0).abs() < 1e-9);
	}

	#[test]
	fn centroid_ignores_closing_vertex() {
		let arrow = polygon_points("173.86,-15.5 183.86,-12 173.86,-8.5 173.86,-15.5");
		assert_eq!(arrow.len(), 4);
		let c = centroid(&arrow).unwrap();
		assert!((c.x - 177.193).abs() < 1e-3);
		assert!((c.y + 12.0).abs() < 1e-9);
		assert_eq!(centroid(&[]), None);
	}

	#[test]
	fn basis_spline_of_four_points() {
		let d = basis_spline(&[
			Point::new(0.0, 0.0),
			Point::new(6.0, 0.0),
			Point::new(12.0, 6.0),
			Point::new(18.0, 6.0),
		]);
		assert_eq!(d, "M0,0L1,0C2,0,4,0,6,1C8,2,10,4,12,5C14,6,16,6,17,6L18,6");
		let (start, end) = endpoints(&d).unwrap();
		assert_eq!(start, Point::new(0.0, 0.0));
		assert_eq!(end, Point::new(18.0, 6.0));
	}

	#[test]
	fn basis_spline_degenerate_inputs() {
		assert_eq!(basis_spline(&[]), "");
		assert_eq!(basis_spline(&[Point::new(1.0, 2.0)]), "M1,2");
		assert_eq!(
			basis_spline(&[Point::new(1.0, 2.0), Point::new(3.0, 4.0)]),
			"M1,2L3,4"
		);
	}
}
