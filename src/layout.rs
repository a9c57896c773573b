//! Offscreen layout – materializes parsed markup into a flat paint list at a
//! fixed logical width.
//!
//! The export pipeline treats the document as pixels, so the layout is
//! draft-quality on purpose: every wrapped line of text becomes a row of
//! greeked word boxes with correct advances and line heights, and inline
//! images are decoded and placed at their intrinsic aspect ratio. What matters
//! for pagination is that the measured content height and the vertical rhythm
//! are faithful; glyph shapes are not.

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use image::RgbaImage;

use crate::dom::{Element, Node, Tag};
use crate::fonts::TextMetrics;

/// One paintable item, in logical px with origin at the surface's top-left.
pub enum PaintItem {
    /// A greeked word box, filled with the host foreground color.
    Box {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    /// A decoded inline image.
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        pixels: RgbaImage,
    },
}

/// The laid-out offscreen surface.
pub struct Surface {
    /// Full logical width, padding included.
    pub width: f32,
    /// Measured content height. Zero when nothing rendered – the rasterizer
    /// turns that into an error rather than an empty PDF.
    pub content_height: f32,
    /// Full logical height, padding included (zero for an empty surface).
    pub height: f32,
    pub items: Vec<PaintItem>,
}

/// Horizontal alignment of a text block.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

/// A flattened block ready for line layout.
struct Block {
    text: String,
    font_size: f32,
    bold: bool,
    align: Align,
    indent: f32,
    /// Draw a list marker box to the left of the first line.
    marker: bool,
    image: Option<RgbaImage>,
}

/// Lay out markup nodes into a [`Surface`].
pub fn lay_out(
    nodes: &[Node],
    width: f32,
    padding: f32,
    line_height: f32,
    metrics: &TextMetrics,
) -> Surface {
    let content_width = (width - 2.0 * padding).max(0.0);
    let mut blocks = Vec::new();
    collect_blocks(nodes, &mut blocks);

    let mut items = Vec::new();
    let mut cursor_y = padding;
    let mut painted_any = false;

    for block in &blocks {
        if let Some(pixels) = &block.image {
            let (w, h) = place_image(pixels, content_width);
            items.push(PaintItem::Image {
                x: padding,
                y: cursor_y,
                width: w,
                height: h,
                pixels: pixels.clone(),
            });
            cursor_y += h + block.font_size * 0.4;
            painted_any = true;
            continue;
        }

        let lines = block_lines(block, content_width, metrics);
        if lines.is_empty() {
            continue;
        }
        let line_px = metrics.line_height_px(block.font_size, line_height);
        let ascender = metrics.ascender_px(block.font_size);
        let avail = content_width - block.indent;

        for (li, line) in lines.iter().enumerate() {
            let line_width = metrics.text_width(line, block.font_size, block.bold);
            let x0 = padding
                + block.indent
                + match block.align {
                    Align::Left => 0.0,
                    Align::Center => ((avail - line_width) / 2.0).max(0.0),
                    Align::Right => (avail - line_width).max(0.0),
                };

            // Word boxes sit on the baseline with an x-height-ish body.
            let box_height = block.font_size * 0.62;
            let baseline = cursor_y + ascender;
            let box_y = baseline - box_height;

            if block.marker && li == 0 {
                items.push(PaintItem::Box {
                    x: (x0 - 16.0).max(padding),
                    y: box_y,
                    width: block.font_size * 0.4,
                    height: box_height,
                });
                painted_any = true;
            }

            let mut x = x0;
            for word in line.split_whitespace() {
                let word_width = metrics.text_width(word, block.font_size, block.bold);
                items.push(PaintItem::Box {
                    x,
                    y: box_y,
                    width: word_width,
                    height: box_height,
                });
                painted_any = true;
                x += word_width + metrics.text_width(" ", block.font_size, block.bold);
            }

            cursor_y += line_px;
        }
        // Block spacing below, scaled to the block's type size.
        cursor_y += block.font_size * 0.4;
    }

    let content_height = if painted_any || cursor_y > padding {
        cursor_y - padding
    } else {
        0.0
    };
    let height = if content_height > 0.0 {
        content_height + 2.0 * padding
    } else {
        0.0
    };

    Surface {
        width,
        content_height,
        height,
        items,
    }
}

/// Lines for a text block. Blank blocks contribute their explicit `<br>`
/// breaks and nothing else, matching how the editor represents empty lines.
fn block_lines(block: &Block, content_width: f32, metrics: &TextMetrics) -> Vec<String> {
    if block.text.trim().is_empty() {
        let breaks = block.text.matches('\n').count();
        return vec![String::new(); breaks];
    }
    let avail = (content_width - block.indent).max(1.0);
    metrics.wrap(&block.text, block.font_size, block.bold, avail)
}

/// Fit an image to the content width, preserving its aspect ratio. Intrinsic
/// size maps 1 px = 1 logical unit, like an unstyled `<img>`.
fn place_image(pixels: &RgbaImage, content_width: f32) -> (f32, f32) {
    let (iw, ih) = (pixels.width() as f32, pixels.height() as f32);
    if iw <= content_width {
        (iw, ih)
    } else {
        (content_width, ih * content_width / iw)
    }
}

fn collect_blocks(nodes: &[Node], out: &mut Vec<Block>) {
    for node in nodes {
        let Node::Element(elem) = node else {
            // Bare text at block level – treat as a paragraph.
            if let Node::Text(t) = node {
                if !t.trim().is_empty() {
                    out.push(text_block(t.clone(), 16.0, false, Align::Left, 0.0, false));
                }
            }
            continue;
        };

        match &elem.tag {
            Tag::H1 => out.push(heading(elem, 32.0)),
            Tag::H2 => out.push(heading(elem, 24.0)),
            Tag::H3 => out.push(heading(elem, 19.0)),
            Tag::P => out.push(text_block(
                elem.text_content(),
                16.0,
                false,
                block_align(elem),
                0.0,
                false,
            )),
            Tag::Pre => out.push(text_block(
                elem.text_content(),
                14.0,
                false,
                Align::Left,
                0.0,
                false,
            )),
            Tag::Blockquote => out.push(text_block(
                elem.text_content(),
                16.0,
                false,
                block_align(elem),
                24.0,
                false,
            )),
            Tag::Ul | Tag::Ol => {
                for child in &elem.children {
                    if let Node::Element(li) = child {
                        if li.tag == Tag::Li {
                            out.push(text_block(
                                li.text_content(),
                                16.0,
                                false,
                                Align::Left,
                                24.0,
                                true,
                            ));
                        }
                    }
                }
            }
            Tag::Img => {
                if let Some(pixels) = decode_image(elem) {
                    out.push(Block {
                        text: String::new(),
                        font_size: 16.0,
                        bold: false,
                        align: Align::Left,
                        indent: 0.0,
                        marker: false,
                        image: Some(pixels),
                    });
                }
            }
            // Containers: recurse so nested structure flattens in order.
            _ => collect_blocks(&elem.children, out),
        }
    }
}

fn heading(elem: &Element, font_size: f32) -> Block {
    text_block(elem.text_content(), font_size, true, block_align(elem), 0.0, false)
}

fn text_block(
    text: String,
    font_size: f32,
    bold: bool,
    align: Align,
    indent: f32,
    marker: bool,
) -> Block {
    Block {
        text,
        font_size,
        bold,
        align,
        indent,
        marker,
        image: None,
    }
}

fn block_align(elem: &Element) -> Align {
    match elem.style_value("text-align").as_deref() {
        Some("center") => Align::Center,
        Some("right") => Align::Right,
        _ => Align::Left,
    }
}

/// Decode an `<img>` with a base64 data-URI source. Anything else is skipped
/// with a warning – the editor only embeds data URIs.
fn decode_image(elem: &Element) -> Option<RgbaImage> {
    let src = elem.src()?;
    let bytes = match parse_data_uri(src) {
        Ok(b) => b,
        Err(e) => {
            log::warn!("skipping image: {e}");
            return None;
        }
    };
    match image::load_from_memory(&bytes) {
        Ok(img) => Some(img.to_rgba8()),
        Err(e) => {
            log::warn!("skipping image: decode error: {e}");
            None
        }
    }
}

/// Parse a `data:<mime>;base64,<data>` URI into raw bytes.
fn parse_data_uri(src: &str) -> Result<Vec<u8>, String> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| format!("image src is not a data URI: {:.60}", src))?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| "invalid data URI: missing `,` separator".to_string())?;
    if !header.contains(";base64") {
        return Err("only base64 data URIs are supported".to_string());
    }
    BASE64_STD
        .decode(data.trim())
        .map_err(|e| format!("base64 decode error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_markup;

    fn metrics() -> TextMetrics {
        TextMetrics::heuristic()
    }

    #[test]
    fn empty_markup_has_zero_height() {
        let surface = lay_out(&parse_markup(""), 800.0, 30.0, 1.6, &metrics());
        assert_eq!(surface.height, 0.0);
        assert!(surface.items.is_empty());
    }

    #[test]
    fn single_paragraph_measures_nonzero() {
        let surface = lay_out(
            &parse_markup("<p>Some body text</p>"),
            800.0,
            30.0,
            1.6,
            &metrics(),
        );
        assert!(surface.content_height > 0.0);
        assert!(surface.height >= surface.content_height + 60.0);
        assert!(!surface.items.is_empty());
    }

    #[test]
    fn longer_content_is_taller() {
        let short = lay_out(&parse_markup("<p>one</p>"), 800.0, 30.0, 1.6, &metrics());
        let mut long_markup = String::new();
        for i in 0..40 {
            long_markup.push_str(&format!("<p>Paragraph number {i} with several words</p>"));
        }
        let long = lay_out(&parse_markup(&long_markup), 800.0, 30.0, 1.6, &metrics());
        assert!(long.height > short.height * 10.0);
    }

    #[test]
    fn centered_heading_is_offset() {
        let surface = lay_out(
            &parse_markup(r#"<h2 style="text-align:center;">T</h2>"#),
            800.0,
            30.0,
            1.6,
            &metrics(),
        );
        let PaintItem::Box { x, .. } = &surface.items[0] else {
            panic!("expected a word box");
        };
        assert!(*x > 100.0, "centered box should sit past the left edge, got {x}");
    }

    #[test]
    fn list_items_get_markers() {
        let surface = lay_out(
            &parse_markup("<ul><li>a</li><li>b</li></ul>"),
            800.0,
            30.0,
            1.6,
            &metrics(),
        );
        // Two markers + two word boxes.
        assert_eq!(surface.items.len(), 4);
    }

    #[test]
    fn non_data_uri_image_is_skipped() {
        let surface = lay_out(
            &parse_markup(r#"<img src="https://example.com/x.png" />"#),
            800.0,
            30.0,
            1.6,
            &metrics(),
        );
        assert_eq!(surface.height, 0.0);
    }
}
