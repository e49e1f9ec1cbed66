//! Engine session without a renderer.
//!
//! Reads the partial-charge categories written by the charge backend into
//! mmCIF files and answers the same metadata queries a rendering engine
//! would. Cosmetic calls are validated and recorded so the resulting view
//! can be inspected.

use std::cell::{Cell, RefCell};
use std::io::BufReader;

use pdbtbx::{Format, ReadOptions, Residue, StrictnessLevel, PDB};

use super::cif::CifBlock;
use super::{EngineError, ViewerHandle};
use crate::backend::{StructureId, StructurePayload};
use crate::control::{ColoringMode, RenderStyle};

const CHARGE_META: &str = "sb_ncbr_partial_atomic_charges_meta";
const CHARGES: &str = "sb_ncbr_partial_atomic_charges";

/// What the engine is currently showing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    /// Active coloring.
    pub coloring: ColoringMode,
    /// Scale bound of absolute coloring, when active.
    pub absolute_max: Option<f64>,
    /// Active representation.
    pub style: RenderStyle,
    /// Active charge set (1-based).
    pub charge_set: usize,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            coloring: ColoringMode::Structure,
            absolute_max: None,
            style: RenderStyle::BallsAndSticks,
            charge_set: 1,
        }
    }
}

#[derive(Debug, Clone)]
struct LoadedStructure {
    structure_id: StructureId,
    method_names: Vec<String>,
    max_charge: f64,
    polymer: bool,
}

impl LoadedStructure {
    fn from_payload(payload: &StructurePayload) -> Result<Self, EngineError> {
        if !payload.format.eq_ignore_ascii_case("mmcif") {
            return Err(EngineError::InvalidPayload(format!(
                "unsupported format '{}'",
                payload.format
            )));
        }
        let text = std::str::from_utf8(&payload.data)
            .map_err(|e| EngineError::InvalidPayload(e.to_string()))?;
        let (pdb, warnings) = ReadOptions::default()
            .set_format(Format::Mmcif)
            .set_level(StrictnessLevel::Loose)
            .read_raw(BufReader::new(payload.data.as_slice()))
            .map_err(|errors| {
                let first = errors.first().map_or_else(
                    || "unreadable mmCIF".to_owned(),
                    ToString::to_string,
                );
                EngineError::InvalidPayload(first)
            })?;
        if !warnings.is_empty() {
            log::debug!(
                "{}: {} mmCIF warning(s)",
                payload.structure_id,
                warnings.len()
            );
        }
        if pdb.atom_count() == 0 {
            return Err(EngineError::InvalidPayload(
                "no atom_site records".to_owned(),
            ));
        }

        let block = CifBlock::parse(text);
        Ok(Self {
            structure_id: payload.structure_id.clone(),
            method_names: method_names(&block),
            max_charge: max_abs_charge(&block),
            polymer: is_polymer(&block) || has_polymer_chain(&pdb),
        })
    }
}

/// Method names ordered by charge-set id.
fn method_names(block: &CifBlock) -> Vec<String> {
    let Some(meta) = block.table(CHARGE_META) else {
        return Vec::new();
    };
    let (Some(ids), Some(methods)) = (meta.column("id"), meta.column("method"))
    else {
        return Vec::new();
    };
    let mut named: Vec<(u32, String)> = ids
        .zip(methods)
        .filter_map(|(id, method)| Some((id.parse().ok()?, method.to_owned())))
        .collect();
    named.sort_by_key(|(id, _)| *id);
    named.into_iter().map(|(_, method)| method).collect()
}

fn max_abs_charge(block: &CifBlock) -> f64 {
    block
        .table(CHARGES)
        .and_then(|t| t.column("charge"))
        .into_iter()
        .flatten()
        .filter_map(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .fold(0.0, |max, v| max.max(v.abs()))
}

/// Cartoon needs at least one polymer entity or secondary structure.
fn is_polymer(block: &CifBlock) -> bool {
    if block.has("entity_poly")
        || block.has("struct_conf")
        || block.has("struct_sheet_range")
    {
        return true;
    }
    block
        .table("entity")
        .and_then(|t| t.column("type"))
        .is_some_and(|mut types| {
            types.any(|t| t.eq_ignore_ascii_case("polymer"))
        })
}

/// Files without entity records still count as polymers when a chain holds
/// two or more backbone-bearing residues.
fn has_polymer_chain(pdb: &PDB) -> bool {
    pdb.chains().any(|chain| {
        chain.residues().filter(|r| has_backbone(r)).nth(1).is_some()
    })
}

/// Peptide (N, CA, C) or nucleotide (P, C4') backbone atoms.
fn has_backbone(residue: &Residue) -> bool {
    let has = |name: &str| residue.atoms().any(|a| a.name() == name);
    (has("N") && has("CA") && has("C")) || (has("P") && has("C4'"))
}

/// [`ViewerHandle`] backed by mmCIF parsing instead of a GPU renderer.
#[derive(Debug, Default)]
pub struct HeadlessViewer {
    loaded: RefCell<Option<LoadedStructure>>,
    appearance: Cell<Appearance>,
}

impl HeadlessViewer {
    /// Create a viewer with nothing loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current appearance of the loaded structure.
    #[must_use]
    pub fn appearance(&self) -> Appearance {
        self.appearance.get()
    }

    /// Structure currently loaded.
    #[must_use]
    pub fn loaded_structure(&self) -> Option<StructureId> {
        self.loaded.borrow().as_ref().map(|s| s.structure_id.clone())
    }

    fn require_loaded(&self) -> Result<(), EngineError> {
        if self.loaded.borrow().is_some() {
            Ok(())
        } else {
            Err(EngineError::NotLoaded)
        }
    }

    fn update(&self, f: impl FnOnce(&mut Appearance)) {
        let mut appearance = self.appearance.get();
        f(&mut appearance);
        self.appearance.set(appearance);
    }
}

impl ViewerHandle for HeadlessViewer {
    async fn load(
        &self,
        payload: &StructurePayload,
    ) -> Result<(), EngineError> {
        let structure = LoadedStructure::from_payload(payload)?;
        log::debug!(
            "headless load of {}: {} charge sets, max charge {:.4}",
            structure.structure_id,
            structure.method_names.len(),
            structure.max_charge
        );
        *self.loaded.borrow_mut() = Some(structure);
        self.appearance.set(Appearance::default());
        Ok(())
    }

    fn select_charge_set(&self, index: usize) -> Result<(), EngineError> {
        let count = self
            .loaded
            .borrow()
            .as_ref()
            .map(|s| s.method_names.len())
            .ok_or(EngineError::NotLoaded)?;
        if index == 0 || index > count {
            return Err(EngineError::OutOfRange(format!(
                "charge set {index} of {count}"
            )));
        }
        self.update(|a| a.charge_set = index);
        Ok(())
    }

    async fn color_default(&self) -> Result<(), EngineError> {
        self.require_loaded()?;
        self.update(|a| {
            a.coloring = ColoringMode::Structure;
            a.absolute_max = None;
        });
        Ok(())
    }

    async fn color_relative(&self) -> Result<(), EngineError> {
        self.require_loaded()?;
        self.update(|a| {
            a.coloring = ColoringMode::ChargesRelative;
            a.absolute_max = None;
        });
        Ok(())
    }

    async fn color_absolute(&self, max_value: f64) -> Result<(), EngineError> {
        self.require_loaded()?;
        if !max_value.is_finite() || max_value < 0.0 {
            return Err(EngineError::OutOfRange(format!(
                "max value {max_value}"
            )));
        }
        self.update(|a| {
            a.coloring = ColoringMode::ChargesAbsolute;
            a.absolute_max = Some(max_value);
        });
        Ok(())
    }

    async fn set_style_ball_and_stick(&self) -> Result<(), EngineError> {
        self.require_loaded()?;
        self.update(|a| a.style = RenderStyle::BallsAndSticks);
        Ok(())
    }

    async fn set_style_surface(&self) -> Result<(), EngineError> {
        self.require_loaded()?;
        self.update(|a| a.style = RenderStyle::Surface);
        Ok(())
    }

    async fn set_style_default(&self) -> Result<(), EngineError> {
        if !self.is_default_style_applicable() {
            return Err(EngineError::Unsupported("cartoon representation"));
        }
        self.update(|a| a.style = RenderStyle::Cartoon);
        Ok(())
    }

    fn is_default_style_applicable(&self) -> bool {
        self.loaded.borrow().as_ref().is_some_and(|s| s.polymer)
    }

    fn max_charge(&self) -> f64 {
        self.loaded.borrow().as_ref().map_or(0.0, |s| s.max_charge)
    }

    fn method_names(&self) -> Vec<String> {
        self.loaded
            .borrow()
            .as_ref()
            .map(|s| s.method_names.clone())
            .unwrap_or_default()
    }
}
