//! Download of the live diagram as a standalone SVG file.

use js_sys::Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, Element, HtmlAnchorElement, Url, XmlSerializer};

use super::error::DiagramError;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#;
const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Make a host-supplied name safe for use in a file name.
///
/// Path separators, characters reserved on common file systems and control
/// characters are removed and runs of whitespace collapse to one space. An
/// empty result falls back to `default`.
pub fn sanitize_document_name(name: &str, default: &str) -> String {
	let cleaned: String = name
		.chars()
		.filter(|c| !c.is_control() && !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
		.collect();
	let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
	if collapsed.is_empty() {
		default.to_string()
	} else {
		collapsed
	}
}

/// `2025-02-03T10:20:30.123Z` becomes `2025-02-03_102030`.
pub fn timestamp_from_iso(iso: &str) -> String {
	let whole_seconds = iso.split('.').next().unwrap_or(iso);
	whole_seconds
		.trim_end_matches('Z')
		.replacen('T', "_", 1)
		.replace(':', "")
}

pub fn export_filename(document_name: &str, timestamp: &str) -> String {
	format!("{document_name} viz {timestamp}.svg")
}

/// Turn serialized `<svg>` markup into a file that opens on its own.
pub fn standalone_svg(markup: &str) -> String {
	let body = markup.trim_start();
	let body = match body.strip_prefix("<?xml") {
		Some(_) => body.to_string(),
		None => format!("{XML_DECLARATION}\n{body}"),
	};
	let Some(tag_start) = body.find("<svg") else {
		return body;
	};
	let tag_end = body[tag_start..]
		.find('>')
		.map_or(body.len(), |i| tag_start + i);
	let open_tag = &body[tag_start..tag_end];
	let mut extra = String::new();
	if !open_tag.contains("xmlns=") {
		extra.push_str(&format!(r#" xmlns="{SVG_NS}""#));
	}
	if !open_tag.contains("xmlns:xlink=") && body.contains("xlink:") {
		extra.push_str(&format!(r#" xmlns:xlink="{XLINK_NS}""#));
	}
	if extra.is_empty() {
		return body;
	}
	let insert_at = tag_start + "<svg".len();
	format!("{}{}{}", &body[..insert_at], extra, &body[insert_at..])
}

/// Serialize `svg` and hand it to the browser as a download. Returns the file name used.
///
/// The object URL is revoked `revoke_delay_ms` after the click, once the
/// browser has picked the download up.
pub fn download_svg(
	svg: &Element,
	document_name: &str,
	revoke_delay_ms: i32,
) -> Result<String, DiagramError> {
	let markup = XmlSerializer::new()?.serialize_to_string(svg)?;
	let text = standalone_svg(&markup);

	let bag = BlobPropertyBag::new();
	bag.set_type("image/svg+xml;charset=utf-8");
	let parts = Array::of1(&JsValue::from_str(&text));
	let blob = Blob::new_with_str_sequence_and_options(&parts, &bag)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let timestamp = timestamp_from_iso(&String::from(js_sys::Date::new_0().to_iso_string()));
	let filename = export_filename(document_name, &timestamp);

	let document = svg
		.owner_document()
		.ok_or_else(|| DiagramError::Dom("diagram is not attached to a document".into()))?;
	let anchor: HtmlAnchorElement = document
		.create_element("a")?
		.dyn_into()
		.map_err(|_| DiagramError::Dom("created element is not an anchor".into()))?;
	anchor.set_href(&url);
	anchor.set_download(&filename);
	if let Some(body) = document.body() {
		body.append_child(&anchor)?;
		anchor.click();
		body.remove_child(&anchor)?;
	} else {
		anchor.click();
	}
	schedule_revoke(url, revoke_delay_ms)?;
	log::info!("schema-viz: exported {filename}");
	Ok(filename)
}

fn schedule_revoke(url: String, delay_ms: i32) -> Result<(), DiagramError> {
	let window = web_sys::window().ok_or_else(|| DiagramError::Dom("no window".into()))?;
	let revoke = Closure::once_into_js(move || {
		if let Err(e) = Url::revoke_object_url(&url) {
			log::warn!("schema-viz: could not revoke export url: {e:?}");
		}
	});
	window.set_timeout_with_callback_and_timeout_and_arguments_0(revoke.unchecked_ref(), delay_ms)?;
	Ok(())
}
