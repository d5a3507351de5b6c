//! Font handling for card rendering

use crate::{CardError, Result};
use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use std::collections::HashMap;

/// Numeric weight of a regular face
pub const REGULAR_WEIGHT: u16 = 400;

/// Numeric weight of a bold face
pub const BOLD_WEIGHT: u16 = 700;

/// Font style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl FontStyle {
    /// Interpret a free-form style label such as `"Regular"`, `"Bold Italic"`
    /// or `"oblique"`
    pub fn from_label(label: &str) -> Self {
        let label = label.to_ascii_lowercase();
        if label.contains("italic") || label.contains("oblique") {
            FontStyle::Italic
        } else {
            FontStyle::Normal
        }
    }
}

/// A font request: family, weight, style and pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
    /// Em size in pixels, as in CSS `font-size: 32px`
    pub size: f32,
}

impl FontSpec {
    pub fn new(family: &str, size: f32) -> Self {
        Self {
            family: family.to_string(),
            weight: REGULAR_WEIGHT,
            style: FontStyle::Normal,
            size,
        }
    }

    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }
}

/// Metrics needed to lay out and draw text
pub trait FontMetrics {
    /// Advance width of `text` in pixels
    fn measure(&self, text: &str) -> f32;

    /// Height of the capital `M` above the baseline
    fn ascent(&self) -> f32;
}

#[derive(Debug, Clone)]
struct FontFace {
    weight: u16,
    style: FontStyle,
    font: FontArc,
}

/// Font family with weight/style variants
#[derive(Debug, Clone, Default)]
pub struct FontFamily {
    faces: Vec<FontFace>,
}

impl FontFamily {
    /// Add a face, replacing any face with the same weight and style
    pub fn add_face(&mut self, weight: u16, style: FontStyle, font: FontArc) {
        self.faces
            .retain(|face| !(face.weight == weight && face.style == style));
        self.faces.push(FontFace {
            weight,
            style,
            font,
        });
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Get the face closest to the requested weight and style
    ///
    /// Faces with the requested style win over weight. Among those, the
    /// nearest weight wins; on a tie, heavier faces are preferred for
    /// weights of 400 and above, lighter ones below.
    pub fn get_variant(&self, weight: u16, style: FontStyle) -> Option<&FontArc> {
        let same_style = self.faces.iter().any(|face| face.style == style);
        let prefer_heavier = weight >= REGULAR_WEIGHT;

        self.faces
            .iter()
            .filter(|face| !same_style || face.style == style)
            .min_by_key(|face| {
                let distance = face.weight.abs_diff(weight);
                let wrong_side = if prefer_heavier {
                    face.weight < weight
                } else {
                    face.weight > weight
                };
                (distance, wrong_side)
            })
            .map(|face| &face.font)
    }

    /// Check if the family has an exact face for weight and style
    pub fn has_variant(&self, weight: u16, style: FontStyle) -> bool {
        self.faces
            .iter()
            .any(|face| face.weight == weight && face.style == style)
    }
}

/// Builder for registering font families
#[derive(Default)]
pub struct FontFamilyBuilder {
    faces: Vec<(u16, FontStyle, Vec<u8>)>,
}

impl FontFamilyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regular(self, ttf_data: Vec<u8>) -> Self {
        self.face(REGULAR_WEIGHT, FontStyle::Normal, ttf_data)
    }

    pub fn bold(self, ttf_data: Vec<u8>) -> Self {
        self.face(BOLD_WEIGHT, FontStyle::Normal, ttf_data)
    }

    pub fn italic(self, ttf_data: Vec<u8>) -> Self {
        self.face(REGULAR_WEIGHT, FontStyle::Italic, ttf_data)
    }

    pub fn bold_italic(self, ttf_data: Vec<u8>) -> Self {
        self.face(BOLD_WEIGHT, FontStyle::Italic, ttf_data)
    }

    /// Add a face with an arbitrary numeric weight (100 - 900)
    pub fn face(mut self, weight: u16, style: FontStyle, ttf_data: Vec<u8>) -> Self {
        self.faces.push((weight, style, ttf_data));
        self
    }

    /// Build the FontFamily from the provided TTF data
    pub fn build(self, family_name: &str) -> Result<FontFamily> {
        if self.faces.is_empty() {
            return Err(CardError::FontParseError(format!(
                "Font family '{family_name}' has no faces"
            )));
        }

        let mut family = FontFamily::default();
        for (weight, style, data) in self.faces {
            let font = FontArc::try_from_vec(data)
                .map_err(|e| CardError::FontParseError(format!("{family_name}: {e}")))?;
            family.add_face(weight, style, font);
        }
        Ok(family)
    }
}

/// Naming and classification read from a font file's own tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceInfo {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
}

/// Read family name, weight and style from TTF/OTF data
pub fn read_face_info(ttf_data: &[u8]) -> Result<FaceInfo> {
    use ttf_parser::name_id;

    let face = ttf_parser::Face::parse(ttf_data, 0)
        .map_err(|e| CardError::FontParseError(format!("{e:?}")))?;

    let find_name = |id: u16| {
        face.names()
            .into_iter()
            .filter(|name| name.name_id == id && name.is_unicode())
            .find_map(|name| name.to_string())
    };

    let family = find_name(name_id::TYPOGRAPHIC_FAMILY)
        .or_else(|| find_name(name_id::FAMILY))
        .ok_or_else(|| CardError::FontParseError("Font has no family name".to_string()))?;

    let style = if face.is_italic() || face.is_oblique() {
        FontStyle::Italic
    } else {
        FontStyle::Normal
    };

    Ok(FaceInfo {
        family,
        weight: face.weight().to_number(),
        style,
    })
}

/// Registered font families, looked up by name
#[derive(Debug, Clone, Default)]
pub struct FontLibrary {
    families: HashMap<String, FontFamily>,
    /// Family used when a requested family is not registered
    default_family: Option<String>,
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a font family under `name`
    ///
    /// The first family registered becomes the default.
    pub fn register_family(&mut self, name: &str, builder: FontFamilyBuilder) -> Result<()> {
        let family = builder.build(name)?;
        self.families.insert(name.to_string(), family);
        if self.default_family.is_none() {
            self.default_family = Some(name.to_string());
        }
        Ok(())
    }

    /// Register one font file, filed under the family name it declares
    pub fn register_font(&mut self, ttf_data: Vec<u8>) -> Result<FaceInfo> {
        let info = read_face_info(&ttf_data)?;
        self.register_face(&info.family, info.weight, info.style, ttf_data)?;
        Ok(info)
    }

    /// Register one font file under an explicit family, weight and style
    pub fn register_face(
        &mut self,
        family: &str,
        weight: u16,
        style: FontStyle,
        ttf_data: Vec<u8>,
    ) -> Result<()> {
        let font = FontArc::try_from_vec(ttf_data)
            .map_err(|e| CardError::FontParseError(format!("{family}: {e}")))?;
        self.families
            .entry(family.to_string())
            .or_default()
            .add_face(weight, style, font);
        if self.default_family.is_none() {
            self.default_family = Some(family.to_string());
        }
        Ok(())
    }

    /// Choose the family used for unknown names
    pub fn set_default_family(&mut self, name: &str) -> Result<()> {
        if !self.families.contains_key(name) {
            return Err(CardError::FontNotFound(name.to_string()));
        }
        self.default_family = Some(name.to_string());
        Ok(())
    }

    pub fn default_family(&self) -> Option<&str> {
        self.default_family.as_deref()
    }

    pub fn contains(&self, family: &str) -> bool {
        self.families.contains_key(family)
    }

    /// Registered family names, sorted
    pub fn families(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.families.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn family(&self, name: &str) -> Option<&FontFamily> {
        self.families.get(name).or_else(|| {
            self.families
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, family)| family)
        })
    }

    /// Resolve a request to a concrete scaled font
    ///
    /// Unknown families fall back to the default family, the way a browser
    /// falls back to its default font.
    pub fn resolve(&self, spec: &FontSpec) -> Result<ScaledFont> {
        let family = match self.family(&spec.family) {
            Some(family) => family,
            None => {
                let fallback = self
                    .default_family
                    .as_deref()
                    .and_then(|name| self.families.get(name))
                    .ok_or_else(|| CardError::FontNotFound(spec.family.clone()))?;
                log::debug!(
                    "font family {:?} not registered, using {:?}",
                    spec.family,
                    self.default_family
                );
                fallback
            }
        };

        let font = family
            .get_variant(spec.weight, spec.style)
            .ok_or_else(|| CardError::FontNotFound(spec.family.clone()))?;

        Ok(ScaledFont::new(font.clone(), spec.size))
    }
}

/// A font at a concrete pixel size
#[derive(Debug, Clone)]
pub struct ScaledFont {
    font: FontArc,
    size: f32,
}

impl ScaledFont {
    pub fn new(font: FontArc, size: f32) -> Self {
        Self { font, size }
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    /// Em size in pixels
    pub fn size(&self) -> f32 {
        self.size
    }

    /// `ab_glyph` scale for this em size
    ///
    /// `PxScale` is the height of ascent-to-descent, not the em, so the em
    /// size is converted through the font's own proportions.
    pub fn px_scale(&self) -> PxScale {
        let units_per_em = self.font.units_per_em().unwrap_or(1000.0);
        PxScale::from(self.size * self.font.height_unscaled() / units_per_em)
    }
}

impl FontMetrics for ScaledFont {
    fn measure(&self, text: &str) -> f32 {
        let scaled = self.font.as_scaled(self.px_scale());
        let mut width = 0.0f32;
        let mut previous = None;
        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            let glyph_id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                width += scaled.kern(prev, glyph_id);
            }
            width += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);
        }
        width.max(0.0)
    }

    fn ascent(&self) -> f32 {
        let scaled = self.font.as_scaled(self.px_scale());
        self.font
            .outline(self.font.glyph_id('M'))
            // Outline bounds are y-up: `min.y` holds the glyph's top
            .map(|outline| outline.bounds.min.y * scaled.v_scale_factor())
            .filter(|ascent| *ascent > 0.0)
            .unwrap_or(self.size * 0.8)
    }
}
