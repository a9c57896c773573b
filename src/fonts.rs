//! Text measurement using `ttf-parser`.
//!
//! The offscreen layout only needs metrics – word advance widths, line
//! heights, ascender – never glyph outlines: the pipeline ships rasters of
//! greeked line boxes, not embedded text. When a real TTF/OTF is loaded its
//! glyph advances are used; otherwise a Helvetica-like heuristic keeps the
//! layout deterministic.

/// Measures text for the offscreen layout.
pub struct TextMetrics {
    /// Raw font bytes, kept alive for ttf-parser's zero-copy API. Empty when
    /// running on heuristic metrics.
    bytes: Vec<u8>,
    units_per_em: f32,
    ascender: f32,
}

impl TextMetrics {
    /// Heuristic metrics (no font file): Helvetica-like proportions.
    pub fn heuristic() -> Self {
        Self {
            bytes: Vec::new(),
            units_per_em: 1000.0,
            ascender: 750.0,
        }
    }

    /// Load a TTF/OTF face for accurate advances.
    pub fn from_font_bytes(bytes: Vec<u8>) -> Result<Self, String> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|e| format!("failed to parse font: {e}"))?;
        let units_per_em = face.units_per_em() as f32;
        let ascender = face.ascender() as f32;
        Ok(Self {
            bytes,
            units_per_em,
            ascender,
        })
    }

    /// Width of `text` in px at `font_size`.
    ///
    /// With real font bytes we sum glyph horizontal advances; otherwise an
    /// average character width of 0.5 × font_size (0.55 for bold) is used.
    pub fn text_width(&self, text: &str, font_size: f32, bold: bool) -> f32 {
        if self.bytes.is_empty() {
            let avg = if bold { 0.55 } else { 0.5 };
            return text.chars().count() as f32 * font_size * avg;
        }

        match ttf_parser::Face::parse(&self.bytes, 0) {
            Ok(face) => {
                let scale = font_size / self.units_per_em;
                let mut width = 0.0f32;
                for ch in text.chars() {
                    match face.glyph_index(ch) {
                        Some(gid) => {
                            width += face.glyph_hor_advance(gid).unwrap_or(0) as f32 * scale;
                        }
                        None => width += font_size * 0.5,
                    }
                }
                width
            }
            Err(_) => text.chars().count() as f32 * font_size * 0.5,
        }
    }

    /// Line height in px for a font size and line-height multiplier.
    pub fn line_height_px(&self, font_size: f32, factor: f32) -> f32 {
        font_size * factor
    }

    /// Ascender in px – distance from baseline to the top of the line box.
    pub fn ascender_px(&self, font_size: f32) -> f32 {
        self.ascender * font_size / self.units_per_em
    }

    /// Word-wrap `text` to fit within `max_width` px. Existing newlines are
    /// preserved as hard breaks.
    pub fn wrap(&self, text: &str, font_size: f32, bold: bool, max_width: f32) -> Vec<String> {
        if max_width <= 0.0 || text.is_empty() {
            return vec![text.to_string()];
        }

        let mut lines: Vec<String> = Vec::new();
        for paragraph in text.split('\n') {
            let words: Vec<&str> = paragraph.split_whitespace().collect();
            if words.is_empty() {
                lines.push(String::new());
                continue;
            }

            let mut current = String::new();
            for word in &words {
                let candidate = if current.is_empty() {
                    (*word).to_string()
                } else {
                    format!("{current} {word}")
                };
                if self.text_width(&candidate, font_size, bold) > max_width && !current.is_empty() {
                    lines.push(std::mem::replace(&mut current, (*word).to_string()));
                } else {
                    current = candidate;
                }
            }
            if !current.is_empty() {
                lines.push(current);
            }
        }

        if lines.is_empty() {
            lines.push(String::new());
        }
        lines
    }
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self::heuristic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_width() {
        let metrics = TextMetrics::heuristic();
        let w = metrics.text_width("Hello", 16.0, false);
        // 5 chars × 16 × 0.5 = 40
        assert!((w - 40.0).abs() < 0.1);
    }

    #[test]
    fn bold_is_wider() {
        let metrics = TextMetrics::heuristic();
        assert!(metrics.text_width("abc", 16.0, true) > metrics.text_width("abc", 16.0, false));
    }

    #[test]
    fn garbage_font_bytes_are_rejected() {
        let err = TextMetrics::from_font_bytes(vec![0u8; 64]).err();
        assert!(err.is_some_and(|e| e.contains("failed to parse font")));
    }

    #[test]
    fn wrap_breaks_long_text() {
        let metrics = TextMetrics::heuristic();
        let lines = metrics.wrap("one two three four", 16.0, false, 60.0);
        assert!(lines.len() >= 2, "expected wrapping, got {lines:?}");
    }

    #[test]
    fn wrap_preserves_hard_breaks() {
        let metrics = TextMetrics::heuristic();
        let lines = metrics.wrap("a\nb", 16.0, false, 500.0);
        assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);
    }
}
