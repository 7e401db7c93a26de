//! JSON request and response shapes shared by the CLI and HTTP server.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::planner::Planner;
use crate::types::{DEFAULT_SHEET, OptimizationOutcome, PieceSpec, PlacedPiece, Rect, SheetResult};

fn default_sheet() -> Rect {
    DEFAULT_SHEET
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OptimizeRequest {
    #[serde(default = "default_sheet")]
    pub sheet: Rect,
    pub boards: Vec<PieceSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeResponse {
    pub sheet: Rect,
    pub sheets: Vec<SheetResponse>,
    pub sheet_count: usize,
    pub total_placed: usize,
    pub total_waste: u64,
    pub placed_per_sheet: Vec<usize>,
    pub waste_percent: f64,
    pub unplaceable: Vec<PieceSpec>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SheetResponse {
    pub placements: Vec<PlacementResponse>,
    pub waste_area: u64,
}

/// `length` and `width` are the extents as laid on the sheet.
#[derive(Debug, Clone, Serialize)]
pub struct PlacementResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: u32,
    pub y: u32,
    pub length: u32,
    pub width: u32,
    pub rotated: bool,
}

impl From<&PlacedPiece<'_>> for PlacementResponse {
    fn from(p: &PlacedPiece<'_>) -> Self {
        let rect = p.rect();
        Self {
            id: p.spec.id.clone(),
            name: p.spec.name.clone(),
            x: p.x,
            y: p.y,
            length: rect.length,
            width: rect.width,
            rotated: p.rotated(),
        }
    }
}

impl From<&SheetResult<'_>> for SheetResponse {
    fn from(s: &SheetResult<'_>) -> Self {
        Self {
            placements: s.placements.iter().map(PlacementResponse::from).collect(),
            waste_area: s.waste_area,
        }
    }
}

impl From<&OptimizationOutcome<'_>> for OptimizeResponse {
    fn from(outcome: &OptimizationOutcome<'_>) -> Self {
        Self {
            sheet: outcome.sheet,
            sheets: outcome.sheets.iter().map(SheetResponse::from).collect(),
            sheet_count: outcome.sheet_count(),
            total_placed: outcome.total_placed,
            total_waste: outcome.total_waste,
            placed_per_sheet: outcome.placed_per_sheet.clone(),
            waste_percent: outcome.waste_percent(),
            unplaceable: outcome.unplaceable.iter().map(|&s| s.clone()).collect(),
        }
    }
}

pub fn optimize(req: &OptimizeRequest) -> Result<OptimizeResponse> {
    let planner = Planner::new(req.sheet)?;
    let outcome = planner.plan(&req.boards)?;
    Ok(OptimizeResponse::from(&outcome))
}
