use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::sheet::Sheet;
use crate::types::{OptimizationOutcome, PieceSpec, PlacedPiece, Rect, SheetResult};

/// One physical copy of a spec, alive only for a single planning run.
#[derive(Debug, Clone, Copy)]
pub struct PlacementUnit<'a> {
    pub spec: &'a PieceSpec,
}

/// Lays boards onto as many sheets of one size as needed.
#[derive(Debug, Clone, Copy)]
pub struct Planner {
    sheet: Rect,
}

impl Planner {
    pub fn new(sheet: Rect) -> Result<Self> {
        if sheet.is_empty() {
            return Err(Error::InvalidSheet {
                length: sheet.length,
                width: sheet.width,
            });
        }
        Ok(Self { sheet })
    }

    pub fn plan<'a>(&self, specs: &'a [PieceSpec]) -> Result<OptimizationOutcome<'a>> {
        validate_specs(specs)?;

        let units = expand_units(specs);
        let mut run = Run::new(self.sheet);
        for unit in &units {
            run.place(unit);
        }

        let outcome = run.finish();
        info!(
            sheets = outcome.sheet_count(),
            placed = outcome.total_placed,
            unplaceable = outcome.unplaceable.len(),
            waste = outcome.total_waste,
            "plan complete"
        );
        Ok(outcome)
    }
}

/// Plans `specs` onto sheets of `sheet_length` x `sheet_width`.
pub fn plan(
    specs: &[PieceSpec],
    sheet_length: u32,
    sheet_width: u32,
) -> Result<OptimizationOutcome<'_>> {
    Planner::new(Rect::new(sheet_length, sheet_width))?.plan(specs)
}

fn validate_specs(specs: &[PieceSpec]) -> Result<()> {
    match specs.iter().find(|s| s.rect().is_empty()) {
        Some(bad) => Err(Error::InvalidPiece {
            id: bad.id.clone(),
            length: bad.length,
            width: bad.width,
        }),
        None => Ok(()),
    }
}

/// One unit per copy, largest area first. The sort is stable, so equal
/// areas keep input order.
fn expand_units(specs: &[PieceSpec]) -> Vec<PlacementUnit<'_>> {
    let mut units: Vec<PlacementUnit<'_>> = specs
        .iter()
        .flat_map(|spec| std::iter::repeat_n(PlacementUnit { spec }, spec.units()))
        .collect();
    units.sort_by(|a, b| b.spec.area().cmp(&a.spec.area()));
    units
}

struct Run<'a> {
    current: Sheet,
    in_progress: Vec<PlacedPiece<'a>>,
    closed: Vec<SheetResult<'a>>,
    unplaceable: Vec<&'a PieceSpec>,
}

impl<'a> Run<'a> {
    fn new(extent: Rect) -> Self {
        Self {
            current: Sheet::new(extent),
            in_progress: Vec::new(),
            closed: Vec::new(),
            unplaceable: Vec::new(),
        }
    }

    fn place(&mut self, unit: &PlacementUnit<'a>) {
        if self.try_current(unit) {
            return;
        }

        if !self.in_progress.is_empty() {
            self.close_current();
            debug!(sheet = self.closed.len(), "opened new sheet");
            if self.try_current(unit) {
                return;
            }
        }

        // Failed on an empty sheet: no sheet of this size can take it.
        self.record_unplaceable(unit.spec);
    }

    fn try_current(&mut self, unit: &PlacementUnit<'a>) -> bool {
        let spec = unit.spec;
        match self.current.try_place(spec.rect(), spec.allow_rotate) {
            Some(pos) => {
                self.in_progress.push(PlacedPiece {
                    spec,
                    x: pos.x,
                    y: pos.y,
                    orientation: pos.orientation,
                });
                true
            }
            None => false,
        }
    }

    fn close_current(&mut self) {
        let fresh = Sheet::new(self.current.extent());
        let sheet = std::mem::replace(&mut self.current, fresh);
        let placements = std::mem::take(&mut self.in_progress);
        let waste_area = sheet.compute_waste();
        debug!(
            sheet = self.closed.len(),
            placed = placements.len(),
            waste_area,
            "closed sheet"
        );
        self.closed.push(SheetResult {
            placements,
            waste_area,
        });
    }

    fn record_unplaceable(&mut self, spec: &'a PieceSpec) {
        if self.unplaceable.iter().any(|s| std::ptr::eq(*s, spec)) {
            return;
        }
        warn!(
            id = %spec.id,
            size = %spec.rect(),
            sheet = %self.current.extent(),
            allow_rotate = spec.allow_rotate,
            "board does not fit on an empty sheet"
        );
        self.unplaceable.push(spec);
    }

    fn finish(mut self) -> OptimizationOutcome<'a> {
        if !self.in_progress.is_empty() {
            self.close_current();
        }

        let placed_per_sheet: Vec<usize> = self.closed.iter().map(|s| s.placed_count()).collect();
        OptimizationOutcome {
            sheet: self.current.extent(),
            total_placed: placed_per_sheet.iter().sum(),
            total_waste: self.closed.iter().map(|s| s.waste_area).sum(),
            placed_per_sheet,
            sheets: self.closed,
            unplaceable: self.unplaceable,
        }
    }
}
