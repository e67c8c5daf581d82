//! Colour coding of previews by file naming convention.
//!
//! Print files follow a naming convention where `[a]` marks an accent part
//! and `[c]` marks a clear/neutral part. Everything else is printed in the
//! main colour. The whole mesh surface gets one colour.
//!
//! # Examples
//! ```
//! use printcheck::color::ColorClass;
//!
//! assert_eq!(ColorClass::from_file_name("Lid[A].stl"), ColorClass::Flagged);
//! assert_eq!(ColorClass::from_file_name("window[c].stl"), ColorClass::Neutral);
//! assert_eq!(ColorClass::from_file_name("body.stl"), ColorClass::Standard);
//! ```

/// Name marker for flagged (accent) parts.
pub const FLAGGED_MARKER: &str = "[a]";
/// Name marker for neutral (clear) parts.
pub const NEUTRAL_MARKER: &str = "[c]";

/// The colour class of a model, derived from its file name only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorClass {
    /// Name contains `[a]`; rendered strong red.
    Flagged,
    /// Name contains `[c]` but not `[a]`; rendered white.
    Neutral,
    /// Any other name; rendered dark gray.
    Standard,
}

impl ColorClass {
    /// Classifies a file name. Matching is case-insensitive and `[a]` wins
    /// over `[c]` when both are present.
    ///
    /// # Examples
    /// ```
    /// use printcheck::color::ColorClass;
    ///
    /// assert_eq!(ColorClass::from_file_name("both[c][a].stl"), ColorClass::Flagged);
    /// ```
    pub fn from_file_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains(FLAGGED_MARKER) {
            ColorClass::Flagged
        } else if lower.contains(NEUTRAL_MARKER) {
            ColorClass::Neutral
        } else {
            ColorClass::Standard
        }
    }

    /// Returns the RGBA face colour used to paint the mesh.
    ///
    /// # Examples
    /// ```
    /// use printcheck::color::ColorClass;
    ///
    /// assert_eq!(ColorClass::Neutral.face_color(), [255, 255, 255, 255]);
    /// ```
    pub const fn face_color(self) -> [u8; 4] {
        match self {
            ColorClass::Flagged => [180, 0, 0, 255],
            ColorClass::Neutral => [255, 255, 255, 255],
            ColorClass::Standard => [50, 50, 50, 255],
        }
    }
}
