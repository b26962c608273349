//! MTL material library parsing
//!
//! A material library maps material names to the handful of properties the
//! renderer cares about: a diffuse color, a specular color, and optionally
//! the path of a diffuse texture image. Everything else in the format
//! (illumination models, transparency, ambient terms) is skipped.

use std::collections::HashMap;

/// Per-channel fallback used when a face references a material with no
/// entry in the library: mid-gray diffuse and specular, full alpha.
pub const FALLBACK_CHANNEL: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

/// Materials accumulated from one or more `parse` calls.
///
/// The library is keyed by material name. Re-declaring a name overwrites
/// the previously stored colors; last write wins.
#[derive(Debug, Default)]
pub struct MaterialLibrary {
    diffuse: HashMap<String, [f32; 4]>,
    specular: HashMap<String, [f32; 4]>,
    diffuse_texture: Option<String>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses MTL text into the library, returning the name of the last
    /// `newmtl` record seen so the caller can carry it forward as the
    /// active material for geometry that never issues `usemtl`.
    pub fn parse(&mut self, source: &str, mut current: Option<String>) -> Option<String> {
        for line in source.lines() {
            let mut fields = line.split_whitespace();
            match fields.next() {
                Some("newmtl") => {
                    if let Some(name) = fields.next() {
                        current = Some(name.to_string());
                    }
                }
                Some("Kd") => {
                    if let (Some(name), Some(color)) = (&current, parse_color(fields)) {
                        self.diffuse.insert(name.clone(), color);
                    }
                }
                Some("Ks") => {
                    if let (Some(name), Some(color)) = (&current, parse_color(fields)) {
                        self.specular.insert(name.clone(), color);
                    }
                }
                Some("map_Kd") => {
                    if let Some(path) = fields.next() {
                        self.diffuse_texture = Some(path.to_string());
                    }
                }
                _ => {}
            }
        }
        current
    }

    /// Looks up the diffuse color for `name`, falling back to mid-gray
    /// with a warning when the material is unknown. The two color channels
    /// fall back independently, so a material that only declares `Ks`
    /// still gets its specular color.
    pub fn diffuse(&self, name: Option<&str>) -> [f32; 4] {
        self.lookup(&self.diffuse, name, "diffuse")
    }

    /// Specular counterpart of [`MaterialLibrary::diffuse`].
    pub fn specular(&self, name: Option<&str>) -> [f32; 4] {
        self.lookup(&self.specular, name, "specular")
    }

    fn lookup(
        &self,
        colors: &HashMap<String, [f32; 4]>,
        name: Option<&str>,
        channel: &str,
    ) -> [f32; 4] {
        match name.and_then(|n| colors.get(n)) {
            Some(color) => *color,
            None => {
                log::warn!(
                    "no {} color for material {:?}, substituting gray",
                    channel,
                    name.unwrap_or("<none>")
                );
                FALLBACK_CHANNEL
            }
        }
    }

    /// Path of the diffuse texture image, if any `map_Kd` record was seen.
    pub fn diffuse_texture(&self) -> Option<&str> {
        self.diffuse_texture.as_deref()
    }
}

/// Reads up to four floats, padding alpha to 1.0 when only RGB is given.
fn parse_color<'a>(fields: impl Iterator<Item = &'a str>) -> Option<[f32; 4]> {
    let values: Vec<f32> = fields.filter_map(|f| f.parse().ok()).collect();
    match values.len() {
        3 => Some([values[0], values[1], values[2], 1.0]),
        n if n >= 4 => Some([values[0], values[1], values[2], values[3]]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_MATERIALS: &str = "\
# comment line
newmtl body
Kd 1.0 0.0 0.0
Ks 0.9 0.9 0.9
newmtl trim
Kd 0.0 0.0 1.0
";

    #[test]
    fn parses_named_materials() {
        let mut lib = MaterialLibrary::new();
        let current = lib.parse(TWO_MATERIALS, None);

        assert_eq!(current.as_deref(), Some("trim"));
        assert_eq!(lib.diffuse(Some("body")), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(lib.specular(Some("body")), [0.9, 0.9, 0.9, 1.0]);
        assert_eq!(lib.diffuse(Some("trim")), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn channels_fall_back_independently() {
        let mut lib = MaterialLibrary::new();
        lib.parse("newmtl shiny\nKs 0.2 0.4 0.6\n", None);

        // Only Ks was declared: diffuse goes gray, specular keeps its value.
        assert_eq!(lib.diffuse(Some("shiny")), FALLBACK_CHANNEL);
        assert_eq!(lib.specular(Some("shiny")), [0.2, 0.4, 0.6, 1.0]);
    }

    #[test]
    fn unknown_material_goes_gray() {
        let lib = MaterialLibrary::new();
        assert_eq!(lib.diffuse(Some("missing")), FALLBACK_CHANNEL);
        assert_eq!(lib.diffuse(None), FALLBACK_CHANNEL);
    }

    #[test]
    fn redeclaration_overwrites() {
        let mut lib = MaterialLibrary::new();
        lib.parse("newmtl paint\nKd 1 0 0\nnewmtl paint\nKd 0 1 0\n", None);
        assert_eq!(lib.diffuse(Some("paint")), [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn records_diffuse_texture_path() {
        let mut lib = MaterialLibrary::new();
        lib.parse("newmtl sign\nKd 1 1 1\nmap_Kd sign.png\n", None);
        assert_eq!(lib.diffuse_texture(), Some("sign.png"));
    }

    #[test]
    fn skips_unknown_and_short_records() {
        let mut lib = MaterialLibrary::new();
        lib.parse("newmtl x\nKa 1 1 1\nillum 2\nKd 0.5\nNs 250\n", None);
        // The truncated Kd was ignored, so the channel falls back.
        assert_eq!(lib.diffuse(Some("x")), FALLBACK_CHANNEL);
    }
}
