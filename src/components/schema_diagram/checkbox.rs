//! Checkbox glyphs embedded in node labels.
//!
//! A text element whose entire content is one of the glyphs below acts as a
//! clickable checkbox. Clicking cycles it through a small color palette.

/// Glyphs that read as an empty box.
pub const UNCHECKED: [&str; 3] = ["⬜", "🔲", "☐"];

/// Glyphs that read as a ticked or colored box.
pub const CHECKED: [&str; 8] = ["✅", "\u{2611}\u{fe0f}", "☑", "🗹", "🟨", "🟩", "🟥", "🟦"];

/// Toggle order; the first entry is the unchecked state.
pub const PALETTE: [&str; 4] = ["⬜", "🟩", "🟥", "🟨"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphState {
	Unchecked,
	Checked,
}

impl GlyphState {
	/// Value of the `class` attribute for a glyph in this state.
	pub fn class(self) -> &'static str {
		match self {
			GlyphState::Unchecked => "checkbox checkbox-unchecked",
			GlyphState::Checked => "checkbox checkbox-checked",
		}
	}

	pub fn is_checked(self) -> bool {
		self == GlyphState::Checked
	}
}

/// `None` when the text is not a checkbox glyph at all.
pub fn classify(text: &str) -> Option<GlyphState> {
	if UNCHECKED.contains(&text) {
		Some(GlyphState::Unchecked)
	} else if CHECKED.contains(&text) {
		Some(GlyphState::Checked)
	} else {
		None
	}
}

/// The glyph shown after one click.
pub fn next_glyph(current: &str) -> &'static str {
	if UNCHECKED.contains(&current) {
		return PALETTE[1];
	}
	match PALETTE.iter().position(|g| *g == current) {
		Some(i) if i + 1 < PALETTE.len() => PALETTE[i + 1],
		_ => PALETTE[0],
	}
}
