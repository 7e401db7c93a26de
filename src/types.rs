use std::fmt;

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};

/// Sheet size used when the host does not supply one.
pub const DEFAULT_SHEET: Rect = Rect::new(96, 48);

/// Axis-aligned extent. `length` runs along x, `width` along y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub length: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
}

impl Rect {
    pub const fn new(length: u32, width: u32) -> Self {
        Self { length, width }
    }

    pub fn area(&self) -> u64 {
        self.length as u64 * self.width as u64
    }

    pub fn rotated(&self) -> Self {
        Self {
            length: self.width,
            width: self.length,
        }
    }

    pub fn fits_in(&self, other: &Rect) -> bool {
        self.length <= other.length && self.width <= other.width
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0 || self.width == 0
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.length, self.width)
    }
}

/// Which way round a piece sits on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Piece length along the sheet length.
    Natural,
    /// Length and width swapped (rotated 90°).
    Swapped,
}

impl Orientation {
    pub fn apply(self, rect: Rect) -> Rect {
        match self {
            Orientation::Natural => rect,
            Orientation::Swapped => rect.rotated(),
        }
    }

    pub fn is_rotated(self) -> bool {
        self == Orientation::Swapped
    }
}

fn default_true() -> bool {
    true
}

/// One board type in a cut list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceSpec {
    pub id: String,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub length: u32,
    #[serde(deserialize_with = "deserialize_u32_from_number")]
    pub width: u32,
    /// Board thickness. Carried through for display, never packed on.
    #[serde(default, deserialize_with = "deserialize_u32_from_number")]
    pub depth: u32,
    #[serde(deserialize_with = "deserialize_i32_from_number")]
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub allow_rotate: bool,
}

impl PieceSpec {
    pub fn new(id: impl Into<String>, length: u32, width: u32, quantity: i32) -> Self {
        Self {
            id: id.into(),
            length,
            width,
            depth: 0,
            quantity,
            name: None,
            allow_rotate: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_rotation(mut self, allow_rotate: bool) -> Self {
        self.allow_rotate = allow_rotate;
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.length, self.width)
    }

    pub fn area(&self) -> u64 {
        self.rect().area()
    }

    /// Number of physical copies to place; non-positive quantities count as none.
    pub fn units(&self) -> usize {
        self.quantity.max(0) as usize
    }

    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A piece committed to a sheet.
#[derive(Debug, Clone, Copy)]
pub struct PlacedPiece<'a> {
    pub spec: &'a PieceSpec,
    pub x: u32,
    pub y: u32,
    pub orientation: Orientation,
}

impl PlacedPiece<'_> {
    /// Extent actually occupied, after rotation.
    pub fn rect(&self) -> Rect {
        self.orientation.apply(self.spec.rect())
    }

    pub fn rotated(&self) -> bool {
        self.orientation.is_rotated()
    }
}

#[derive(Debug, Clone)]
pub struct SheetResult<'a> {
    pub placements: Vec<PlacedPiece<'a>>,
    pub waste_area: u64,
}

impl SheetResult<'_> {
    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }
}

#[derive(Debug, Clone)]
pub struct OptimizationOutcome<'a> {
    pub sheet: Rect,
    /// Index is the sheet number, in the order sheets were opened.
    pub sheets: Vec<SheetResult<'a>>,
    pub total_placed: usize,
    pub total_waste: u64,
    pub placed_per_sheet: Vec<usize>,
    /// Specs that fit on no empty sheet, once each, in first-failure order.
    pub unplaceable: Vec<&'a PieceSpec>,
}

impl OptimizationOutcome<'_> {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn used_area(&self) -> u64 {
        self.sheets
            .iter()
            .flat_map(|s| &s.placements)
            .map(|p| p.rect().area())
            .sum()
    }

    pub fn waste_percent(&self) -> f64 {
        if self.sheets.is_empty() {
            return 0.0;
        }
        let total_sheet_area = self.sheet.area() as f64 * self.sheets.len() as f64;
        self.total_waste as f64 / total_sheet_area * 100.0
    }
}

/// Accepts whole JSON numbers in integer or float form (`48` or `48.0`).
pub fn deserialize_u32_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative whole number")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
            u32::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
            u32::try_from(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u32, E> {
            if v.fract() == 0.0 && v >= 0.0 && v <= u32::MAX as f64 {
                Ok(v as u32)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

/// Signed variant of [`deserialize_u32_from_number`], for quantities.
pub fn deserialize_i32_from_number<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    struct I32Visitor;

    impl<'de> Visitor<'de> for I32Visitor {
        type Value = i32;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a whole number")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i32, E> {
            i32::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i32, E> {
            i32::try_from(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i32, E> {
            if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
                Ok(v as i32)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_any(I32Visitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_swaps_extent() {
        let r = Rect::new(40, 60);
        assert_eq!(Orientation::Natural.apply(r), r);
        assert_eq!(Orientation::Swapped.apply(r), Rect::new(60, 40));
        assert!(!Orientation::Natural.is_rotated());
        assert!(Orientation::Swapped.is_rotated());
    }

    #[test]
    fn test_spec_defaults_from_json() {
        let spec: PieceSpec =
            serde_json::from_str(r#"{"id":"shelf","length":30.0,"width":12,"quantity":3}"#)
                .unwrap();
        assert_eq!(spec.rect(), Rect::new(30, 12));
        assert_eq!(spec.depth, 0);
        assert!(spec.allow_rotate);
        assert_eq!(spec.label(), "shelf");
        assert_eq!(spec.units(), 3);
    }

    #[test]
    fn test_quantity_accepts_whole_floats() {
        let spec: PieceSpec =
            serde_json::from_str(r#"{"id":"a","length":10,"width":5,"quantity":2.0}"#).unwrap();
        assert_eq!(spec.quantity, 2);
        let spec: PieceSpec =
            serde_json::from_str(r#"{"id":"a","length":10,"width":5,"quantity":-1}"#).unwrap();
        assert_eq!(spec.units(), 0);
        let res: Result<PieceSpec, _> =
            serde_json::from_str(r#"{"id":"a","length":10,"width":5,"quantity":1.5}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_rejects_fractional_dimension() {
        let res: Result<Rect, _> = serde_json::from_str(r#"{"length":30.5,"width":12}"#);
        assert!(res.is_err());
        let res: Result<Rect, _> = serde_json::from_str(r#"{"length":-4,"width":12}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_non_positive_quantity_has_no_units() {
        assert_eq!(PieceSpec::new("a", 10, 10, 0).units(), 0);
        assert_eq!(PieceSpec::new("a", 10, 10, -3).units(), 0);
    }

    #[test]
    fn test_label_prefers_name() {
        let spec = PieceSpec::new("b7", 10, 10, 1).with_name("Door");
        assert_eq!(spec.label(), "Door");
    }

    #[test]
    fn test_waste_percent_without_sheets() {
        let outcome = OptimizationOutcome {
            sheet: DEFAULT_SHEET,
            sheets: vec![],
            total_placed: 0,
            total_waste: 0,
            placed_per_sheet: vec![],
            unplaceable: vec![],
        };
        assert_eq!(outcome.waste_percent(), 0.0);
        assert_eq!(outcome.used_area(), 0);
    }
}
