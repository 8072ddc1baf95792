use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::{Face, GlyphId};

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

/// Capability used by the layout engine to measure rendered text, injectable
/// so layout stays testable without a font database.
pub trait MeasureText {
    /// Width in pixels of `text` at `font_size`, or `None` when no face for
    /// `font_family` can be resolved.
    fn text_width(&self, text: &str, font_size: f32, font_family: &str) -> Option<f32>;
}

/// Production metrics provider backed by the process-wide font database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMetrics;

impl MeasureText for SystemMetrics {
    fn text_width(&self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        measure_text_width(text, font_size, font_family)
    }
}

pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

/// Registers an uploaded font binary with the measurement database and
/// returns the family name it was registered under, taken from the font's
/// name table. Returns `None` when the binary yields no usable face.
pub fn register_font_bytes(bytes: Vec<u8>) -> Option<String> {
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.register(bytes)
}

/// Runs `f` against the parsed face resolved for `font_family`, loading it on
/// demand. Used by the raster exporter to outline glyphs.
pub fn with_face<T>(font_family: &str, f: impl FnOnce(&Face<'_>, u16) -> T) -> Option<T> {
    let mut guard = TEXT_MEASURER.lock().ok()?;
    let font = guard.face_for(font_family)?;
    let units_per_em = font.units_per_em;
    font.face.as_ref().map(|face| f(face, units_per_em))
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let normalized = text.replace('\t', "    ");
        let face = self.face_for(font_family)?;
        face.measure_width(&normalized, font_size)
    }

    fn register(&mut self, bytes: Vec<u8>) -> Option<String> {
        let family = {
            let face = Face::parse(&bytes, 0).ok()?;
            face_family(&face)?
        };
        self.db.load_font_data(bytes);
        // Negative lookups cached before this registration are now stale.
        self.cache.retain(|_, face| face.is_some());
        Some(family)
    }

    fn face_for(&mut self, font_family: &str) -> Option<&mut FontFace> {
        let key = normalize_family_key(font_family);
        if !self.cache.contains_key(&key) {
            let face = self.load_face(font_family);
            self.cache.insert(key.clone(), face);
        }
        self.cache.get_mut(&key).and_then(|face| face.as_mut())
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        #[derive(Clone, Copy)]
        enum FamilyToken {
            Generic(fontdb::Family<'static>),
            Name(usize),
        }

        let mut names: Vec<String> = Vec::new();
        let mut order: Vec<FamilyToken> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => order.push(FamilyToken::Generic(Family::Serif)),
                "sans-serif" => order.push(FamilyToken::Generic(Family::SansSerif)),
                "monospace" => order.push(FamilyToken::Generic(Family::Monospace)),
                "cursive" => order.push(FamilyToken::Generic(Family::Cursive)),
                "fantasy" => order.push(FamilyToken::Generic(Family::Fantasy)),
                "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    order.push(FamilyToken::Generic(Family::SansSerif))
                }
                "ui-monospace" => order.push(FamilyToken::Generic(Family::Monospace)),
                _ => {
                    let idx = names.len();
                    names.push(raw.to_string());
                    order.push(FamilyToken::Name(idx));
                }
            }
        }
        if order.is_empty() {
            order.push(FamilyToken::Generic(Family::SansSerif));
        }

        let mut families: Vec<Family<'_>> = Vec::with_capacity(order.len());
        for token in order {
            match token {
                FamilyToken::Generic(family) => families.push(family),
                FamilyToken::Name(idx) => families.push(Family::Name(names[idx].as_str())),
            }
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded: Option<FontFace> = None;
        self.db.with_face_data(id, |data, index| {
            let bytes = data.to_vec();
            if Face::parse(&bytes, index).is_ok() {
                loaded = Some(FontFace::new(bytes, index));
            }
        });
        loaded
    }
}

struct FontFace {
    _data: Vec<u8>,
    units_per_em: u16,
    face: Option<Face<'static>>,
    ascii_advances: Option<[u16; 128]>,
    glyph_cache: HashMap<char, Option<u16>>,
    advance_cache: HashMap<u16, u16>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Self {
        // The face borrows `data`, which lives and dies with this struct.
        let face = Face::parse(&data, index)
            .ok()
            .map(|parsed| unsafe { std::mem::transmute::<Face<'_>, Face<'static>>(parsed) });
        let units_per_em = face.as_ref().map(|f| f.units_per_em().max(1)).unwrap_or(1);
        let ascii_advances = face.as_ref().map(|parsed| {
            let mut advances = [0u16; 128];
            for byte in 0u8..=127 {
                if let Some(glyph_id) = parsed.glyph_index(byte as char) {
                    advances[byte as usize] = parsed.glyph_hor_advance(glyph_id).unwrap_or(0);
                }
            }
            advances
        });
        Self {
            _data: data,
            units_per_em,
            face,
            ascii_advances,
            glyph_cache: HashMap::new(),
            advance_cache: HashMap::new(),
        }
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em as f32;
        let missing = font_size * 0.56;

        if text.is_ascii()
            && let Some(advances) = &self.ascii_advances
        {
            let mut width = 0.0f32;
            for byte in text.as_bytes() {
                if *byte == b'\n' {
                    continue;
                }
                let advance = advances[*byte as usize];
                if advance == 0 {
                    width += missing;
                } else {
                    width += advance as f32 * scale;
                }
            }
            return Some(width.max(0.0));
        }

        let face = self.face.as_ref()?;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let glyph = if let Some(cached) = self.glyph_cache.get(&ch) {
                *cached
            } else {
                let glyph = face.glyph_index(ch).map(|id| id.0);
                self.glyph_cache.insert(ch, glyph);
                glyph
            };
            let Some(glyph_id) = glyph else {
                width += missing;
                continue;
            };
            let advance = if let Some(value) = self.advance_cache.get(&glyph_id) {
                *value
            } else {
                let value = face.glyph_hor_advance(GlyphId(glyph_id)).unwrap_or(0);
                self.advance_cache.insert(glyph_id, value);
                value
            };
            width += advance as f32 * scale;
        }
        Some(width.max(0.0))
    }
}

// Same precedence the font database applies: typographic family first,
// then the plain family name.
fn face_family(face: &Face<'_>) -> Option<String> {
    for id in [
        ttf_parser::name_id::TYPOGRAPHIC_FAMILY,
        ttf_parser::name_id::FAMILY,
    ] {
        let name = face
            .names()
            .into_iter()
            .find(|name| name.name_id == id && name.is_unicode())
            .and_then(|name| name.to_string());
        if name.is_some() {
            return name;
        }
    }
    None
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
