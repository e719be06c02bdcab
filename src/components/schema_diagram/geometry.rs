//! Geometry helpers: points, boxes, transforms and the viewBox-to-screen mapping.
//!
//! Three coordinate spaces meet here (see [`super::config`]): node-local units
//! inside Graphviz's graph group, SVG user units of the viewBox, and screen
//! pixels. [`ViewportMapping`] is the only place that converts between them.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// A point in whichever coordinate space the caller is working in.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}
}

/// Axis-aligned box, `y` growing downwards as in SVG.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BBox {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl BBox {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	pub fn bottom(&self) -> f64 {
		self.y + self.height
	}

	pub fn translated(self, t: Translate) -> BBox {
		BBox {
			x: self.x + t.dx,
			y: self.y + t.dy,
			..self
		}
	}

	pub fn padded(self, pad: f64) -> BBox {
		BBox::new(
			self.x - pad,
			self.y - pad,
			self.width + 2.0 * pad,
			self.height + 2.0 * pad,
		)
	}

	/// Clamp a vertical coordinate into the box.
	pub fn clamp_y(&self, y: f64) -> f64 {
		y.max(self.y).min(self.bottom())
	}

	pub fn corners(&self) -> [Point; 4] {
		[
			Point::new(self.x, self.y),
			Point::new(self.right(), self.y),
			Point::new(self.right(), self.bottom()),
			Point::new(self.x, self.bottom()),
		]
	}
}

/// Running min/max accumulator used to build boxes from loose points.
#[derive(Clone, Copy, Debug)]
pub struct Extent {
	min_x: f64,
	min_y: f64,
	max_x: f64,
	max_y: f64,
}

impl Default for Extent {
	fn default() -> Self {
		Self {
			min_x: f64::INFINITY,
			min_y: f64::INFINITY,
			max_x: f64::NEG_INFINITY,
			max_y: f64::NEG_INFINITY,
		}
	}
}

impl Extent {
	pub fn include_point(&mut self, p: Point) {
		if !p.x.is_finite() || !p.y.is_finite() {
			return;
		}
		self.min_x = self.min_x.min(p.x);
		self.min_y = self.min_y.min(p.y);
		self.max_x = self.max_x.max(p.x);
		self.max_y = self.max_y.max(p.y);
	}

	pub fn include_box(&mut self, b: BBox) {
		self.include_point(Point::new(b.x, b.y));
		self.include_point(Point::new(b.right(), b.bottom()));
	}

	/// `None` until at least one finite point was included.
	pub fn finish(self) -> Option<BBox> {
		if self.min_x > self.max_x || self.min_y > self.max_y {
			return None;
		}
		Some(BBox::new(
			self.min_x,
			self.min_y,
			self.max_x - self.min_x,
			self.max_y - self.min_y,
		))
	}
}

/// A node's drag offset: the `translate(dx,dy)` micro-syntax of its `transform` attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Translate {
	pub dx: f64,
	pub dy: f64,
}

impl Translate {
	pub const IDENTITY: Translate = Translate { dx: 0.0, dy: 0.0 };

	pub const fn new(dx: f64, dy: f64) -> Self {
		Self { dx, dy }
	}

	/// Read `translate(x,y)` / `translate(x y)` / `translate(x)`.
	///
	/// An absent attribute, anything that is not a translate, or non-finite numbers all
	/// yield the identity. This never fails.
	pub fn parse(attr: Option<&str>) -> Translate {
		attr.and_then(Self::parse_translate)
			.unwrap_or(Translate::IDENTITY)
	}

	fn parse_translate(text: &str) -> Option<Translate> {
		let rest = text.trim_start().strip_prefix("translate")?;
		let rest = rest.trim_start().strip_prefix('(')?;
		let inner = &rest[..rest.find(')')?];
		let mut numbers = inner
			.split(|c: char| c == ',' || c.is_whitespace())
			.filter(|s| !s.is_empty())
			.map(f64::from_str);
		let dx = numbers.next()?.ok()?;
		let dy = match numbers.next() {
			Some(parsed) => parsed.ok()?,
			None => 0.0,
		};
		(dx.is_finite() && dy.is_finite()).then_some(Translate { dx, dy })
	}

	pub fn offset(self, dx: f64, dy: f64) -> Translate {
		Translate {
			dx: self.dx + dx,
			dy: self.dy + dy,
		}
	}

	pub fn apply(self, p: Point) -> Point {
		Point::new(p.x + self.dx, p.y + self.dy)
	}
}

impl fmt::Display for Translate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "translate({},{})", fmt_num(self.dx), fmt_num(self.dy))
	}
}

/// Affine transform of Graphviz's graph group (`scale(..) rotate(..) translate(..)`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupTransform {
	a: f64,
	b: f64,
	c: f64,
	d: f64,
	e: f64,
	f: f64,
}

impl Default for GroupTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl GroupTransform {
	pub const IDENTITY: GroupTransform = GroupTransform {
		a: 1.0,
		b: 0.0,
		c: 0.0,
		d: 1.0,
		e: 0.0,
		f: 0.0,
	};

	/// Absent or malformed transform lists are treated as identity.
	pub fn parse(attr: Option<&str>) -> GroupTransform {
		let Some(text) = attr else {
			return Self::IDENTITY;
		};
		match svgtypes::Transform::from_str(text) {
			Ok(ts) => GroupTransform {
				a: ts.a,
				b: ts.b,
				c: ts.c,
				d: ts.d,
				e: ts.e,
				f: ts.f,
			},
			Err(err) => {
				log::warn!("schema-viz: ignoring malformed group transform `{text}`: {err}");
				Self::IDENTITY
			}
		}
	}

	pub fn apply(&self, p: Point) -> Point {
		Point::new(
			self.a * p.x + self.c * p.y + self.e,
			self.b * p.x + self.d * p.y + self.f,
		)
	}

	/// Per-axis scale factors; these differ only when the group is scaled non-uniformly.
	pub fn scale(&self) -> (f64, f64) {
		(self.a.hypot(self.b), self.c.hypot(self.d))
	}

	pub fn apply_box(&self, b: BBox) -> BBox {
		let mut extent = Extent::default();
		for corner in b.corners() {
			extent.include_point(self.apply(corner));
		}
		extent.finish().unwrap_or(b)
	}
}

/// Visible region of the diagram in user units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBox {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl ViewBox {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	pub fn parse(attr: Option<&str>) -> Option<ViewBox> {
		let vb = svgtypes::ViewBox::from_str(attr?).ok()?;
		Some(ViewBox::new(vb.x, vb.y, vb.w, vb.h))
	}

	pub fn from_box(b: BBox) -> ViewBox {
		ViewBox::new(b.x, b.y, b.width, b.height)
	}

	/// Shrink (factor > 1) or grow (factor < 1) the box while keeping `anchor` fixed.
	pub fn zoomed_about(self, anchor: Point, factor: f64) -> ViewBox {
		if !(factor.is_finite() && factor > 0.0) {
			return self;
		}
		ViewBox {
			x: anchor.x - (anchor.x - self.x) / factor,
			y: anchor.y - (anchor.y - self.y) / factor,
			width: self.width / factor,
			height: self.height / factor,
		}
	}

	pub fn panned(self, dx: f64, dy: f64) -> ViewBox {
		ViewBox {
			x: self.x + dx,
			y: self.y + dy,
			..self
		}
	}
}

impl fmt::Display for ViewBox {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} {} {} {}",
			fmt_num(self.x),
			fmt_num(self.y),
			fmt_num(self.width),
			fmt_num(self.height)
		)
	}
}

/// A rectangle in page or client pixels, as reported to the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ScreenBox {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl ScreenBox {
	pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}
}

/// Everything needed to go from node-local units to page pixels.
///
/// The `<svg>` element is assumed to use the default `xMidYMid meet` aspect
/// handling: the viewBox is scaled uniformly to fit the element and centered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportMapping {
	pub view_box: ViewBox,
	pub group: GroupTransform,
	/// The `<svg>` element's client rectangle.
	pub client: ScreenBox,
	/// Page scroll offset added to client coordinates for absolute positions.
	pub scroll: Point,
}

impl ViewportMapping {
	/// Screen pixels per user unit.
	fn fit(&self) -> f64 {
		let vb = self.view_box;
		if vb.width <= 0.0 || vb.height <= 0.0 {
			return 1.0;
		}
		let fit = (self.client.width / vb.width).min(self.client.height / vb.height);
		if fit.is_finite() && fit > 0.0 { fit } else { 1.0 }
	}

	/// Offset of the scaled viewBox inside the element (letterboxing).
	fn letterbox(&self) -> Point {
		let fit = self.fit();
		Point::new(
			(self.client.width - self.view_box.width * fit) / 2.0,
			(self.client.height - self.view_box.height * fit) / 2.0,
		)
	}

	/// Screen pixels per node-local unit on each axis.
	pub fn screen_scale_factor(&self) -> (f64, f64) {
		let fit = self.fit();
		let (gx, gy) = self.group.scale();
		let guard = |v: f64| if v.is_finite() && v > 0.0 { v } else { 1.0 };
		(guard(fit * gx), guard(fit * gy))
	}

	/// Screen pixels per user unit; used for panning, which moves the viewBox.
	pub fn user_scale_factor(&self) -> f64 {
		self.fit()
	}

	pub fn user_to_client(&self, p: Point) -> Point {
		let fit = self.fit();
		let lb = self.letterbox();
		Point::new(
			self.client.x + lb.x + (p.x - self.view_box.x) * fit,
			self.client.y + lb.y + (p.y - self.view_box.y) * fit,
		)
	}

	pub fn client_to_user(&self, p: Point) -> Point {
		let fit = self.fit();
		let lb = self.letterbox();
		Point::new(
			self.view_box.x + (p.x - self.client.x - lb.x) / fit,
			self.view_box.y + (p.y - self.client.y - lb.y) / fit,
		)
	}

	/// Convert a pointer movement in screen pixels into node-local units.
	pub fn screen_delta_to_local(&self, dx: f64, dy: f64) -> (f64, f64) {
		let (sx, sy) = self.screen_scale_factor();
		(dx / sx, dy / sy)
	}

	/// Page-pixel rectangle of a local box after applying a node translation.
	pub fn absolute_position(&self, bbox: BBox, translate: Translate) -> ScreenBox {
		let local = bbox.translated(translate);
		let top_left = self.user_to_client(self.group.apply(Point::new(local.x, local.y)));
		let (sx, sy) = self.screen_scale_factor();
		ScreenBox {
			x: top_left.x + self.scroll.x,
			y: top_left.y + self.scroll.y,
			width: local.width * sx,
			height: local.height * sy,
		}
	}
}

/// Format a coordinate for SVG attributes: at most three decimals, no trailing zeros.
pub(crate) fn fmt_num(v: f64) -> String {
	let rounded = (v * 1000.0).round() / 1000.0;
	let rounded = if rounded == 0.0 { 0.0 } else { rounded };
	let mut out = format!("{rounded:.3}");
	while out.ends_with('0') {
		out.pop();
	}
	if out.ends_with('.') {
		out.pop();
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn translate_absent_attribute_is_identity() {
		assert_eq!(Translate::parse(None), Translate::IDENTITY);
	}

	#[test]
	fn translate_parses_comma_and_space_forms() {
		assert_eq!(
			Translate::parse(Some("translate(12.5,-3)")),
			Translate::new(12.5, -3.0)
		);
		assert_eq!(
			Translate::parse(Some("  translate( 4 116 )")),
			Translate::new(4.0, 116.0)
		);
		assert_eq!(Translate::parse(Some("translate(7)")), Translate::new(7.0, 0.0));
	}

	#[test]
	fn translate_malformed_input_is_identity() {
		for text in [
			"",
			"scale(2)",
			"translate",
			"translate(1,2",
			"translate(a,b)",
			"translate(1,NaN)",
			"translate(inf,0)",
		] {
			assert_eq!(Translate::parse(Some(text)), Translate::IDENTITY, "{text}");
		}
	}

	#[test]
	fn translate_serializes_back_to_attribute_syntax() {
		let t = Translate::new(50.0, -0.25);
		assert_eq!(t.to_string(), "translate(50,-0.25)");
		assert_eq!(Translate::parse(Some(&t.to_string())), t);
	}

	#[test]
	fn group_transform_parses_graphviz_lists() {
		let g = GroupTransform::parse(Some("scale(1 1) rotate(0) translate(4 116)"));
		assert_eq!(g.apply(Point::new(0.0, -112.0)), Point::new(4.0, 4.0));
		assert_eq!(g.scale(), (1.0, 1.0));

		let scaled = GroupTransform::parse(Some("scale(2 0.5)"));
		assert_eq!(scaled.scale(), (2.0, 0.5));

		assert_eq!(GroupTransform::parse(Some("bogus(")), GroupTransform::IDENTITY);
		assert_eq!(GroupTransform::parse(None), GroupTransform::IDENTITY);
	}

	#[test]
	fn viewbox_zoom_keeps_anchor_fixed() {
		let vb = ViewBox::new(0.0, 0.0, 200.0, 100.0);
		let anchor = Point::new(50.0, 25.0);
		let zoomed = vb.zoomed_about(anchor, 1.25);
		assert_eq!(zoomed.width, 160.0);
		let rel_before = (anchor.x - vb.x) / vb.width;
		let rel_after = (anchor.x - zoomed.x) / zoomed.width;
		assert!((rel_before - rel_after).abs() < 1e-12);
		assert_eq!(vb.zoomed_about(anchor, 0.0), vb);
	}

	fn mapping(client: ScreenBox) -> ViewportMapping {
		ViewportMapping {
			view_box: ViewBox::new(-16.0, -16.0, 296.0, 152.0),
			group: GroupTransform::parse(Some("translate(4 116)")),
			client,
			scroll: Point::new(5.0, 7.0),
		}
	}

	#[test]
	fn absolute_position_follows_translation_group_viewbox_and_scroll() {
		let m = mapping(ScreenBox::new(10.0, 20.0, 592.0, 304.0));
		let node = BBox::new(0.0, -112.0, 72.0, 56.0);
		let pos = m.absolute_position(node, Translate::IDENTITY);
		assert_eq!(pos, ScreenBox::new(55.0, 67.0, 144.0, 112.0));

		let moved = m.absolute_position(node, Translate::new(10.0, 0.0));
		assert_eq!(moved.x, 75.0);
		assert_eq!(moved.width, 144.0);
	}

	#[test]
	fn letterboxing_centers_the_viewbox() {
		let m = mapping(ScreenBox::new(0.0, 0.0, 400.0, 152.0));
		assert_eq!(m.screen_scale_factor(), (1.0, 1.0));
		let corner = m.user_to_client(Point::new(-16.0, -16.0));
		assert_eq!(corner, Point::new(52.0, 0.0));
		assert_eq!(m.client_to_user(corner), Point::new(-16.0, -16.0));
	}

	#[test]
	fn non_uniform_group_scale_gives_independent_axis_factors() {
		let mut m = mapping(ScreenBox::new(0.0, 0.0, 296.0, 152.0));
		m.group = GroupTransform::parse(Some("scale(2 1)"));
		assert_eq!(m.screen_scale_factor(), (2.0, 1.0));
		assert_eq!(m.screen_delta_to_local(10.0, 10.0), (5.0, 10.0));
	}

	#[test]
	fn degenerate_viewbox_falls_back_to_unit_scale() {
		let mut m = mapping(ScreenBox::new(0.0, 0.0, 0.0, 0.0));
		assert_eq!(m.screen_scale_factor(), (1.0, 1.0));
		m.view_box = ViewBox::new(0.0, 0.0, 0.0, 10.0);
		assert_eq!(m.user_scale_factor(), 1.0);
	}

	#[test]
	fn numbers_are_formatted_compactly() {
		assert_eq!(fmt_num(72.0), "72");
		assert_eq!(fmt_num(-13.2), "-13.2");
		assert_eq!(fmt_num(1.23456), "1.235");
		assert_eq!(fmt_num(-0.0001), "0");
	}
}
