use crate::error::MinifyError;
use mime::Mime;

/// Supported minifiers.
///
/// The set is closed: minification support is decided at build time, not
/// extensible from request data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Minifier {
    /// HTML minification.
    #[cfg(feature = "html")]
    Html,
    /// JSON minification. Removes inter-token whitespace only; numeric
    /// literals and object key order are reproduced exactly.
    #[cfg(feature = "json")]
    Json,
    /// SVG minification. Drops comments and inter-element whitespace.
    #[cfg(feature = "svg")]
    Svg,
}

impl Minifier {
    /// Minifies `input`, appending the transformed bytes to `output`.
    ///
    /// The transform is deterministic and local; a failure means the body
    /// does not parse as the type it claimed, and retrying cannot help.
    /// `media_type` carries the parameters parsed from the response's
    /// `Content-Type` (e.g. a charset); none of the built-in minifiers
    /// currently consult them.
    pub fn minify(
        &self,
        input: &[u8],
        output: &mut Vec<u8>,
        media_type: &Mime,
    ) -> Result<(), MinifyError> {
        let _ = media_type;
        match self {
            #[cfg(feature = "html")]
            Minifier::Html => minify_html(input, output),
            #[cfg(feature = "json")]
            Minifier::Json => minify_json(input, output),
            #[cfg(feature = "svg")]
            Minifier::Svg => minify_svg(input, output),
        }
    }
}

#[cfg(feature = "html")]
fn minify_html(input: &[u8], output: &mut Vec<u8>) -> Result<(), MinifyError> {
    let mut cfg = minify_html::Cfg::new();
    // Stay within what every HTML parser accepts: keep the document
    // structure intact and only strip comments and redundant whitespace.
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;

    output.extend_from_slice(&minify_html::minify(input, &cfg));
    Ok(())
}

#[cfg(feature = "json")]
fn minify_json(input: &[u8], output: &mut Vec<u8>) -> Result<(), MinifyError> {
    // With `arbitrary_precision` enabled, numbers round-trip as their source
    // literal, so `1.50` stays `1.50`; `preserve_order` keeps object keys in
    // document order. Compact serialization drops all other whitespace.
    let value: serde_json::Value = serde_json::from_slice(input)?;
    serde_json::to_writer(&mut *output, &value)?;
    Ok(())
}

#[cfg(feature = "svg")]
fn minify_svg(input: &[u8], output: &mut Vec<u8>) -> Result<(), MinifyError> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_reader(input);
    reader.config_mut().trim_text(true);
    let mut writer = quick_xml::Writer::new(&mut *output);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Comment(_) => {}
            event => writer.write_event(event)?,
        }
        buf.clear();
    }
    Ok(())
}
