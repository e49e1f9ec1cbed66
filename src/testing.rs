//! In-memory backend and viewer with controllable resolution order.
//!
//! Each fake call can be held on a `oneshot` gate so tests decide exactly
//! when a response lands.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt::Write;

use rustc_hash::FxHashMap;
use tokio::sync::oneshot;

use crate::backend::{
    BackendError, ChargeConfig, ComputationId, ComputationService,
    ComputationSettings, StructureId, StructurePayload,
};
use crate::control::{ColoringMode, RenderStyle};
use crate::viewer::{EngineError, ViewerHandle};

type Gates<K> = RefCell<FxHashMap<K, VecDeque<oneshot::Receiver<()>>>>;

fn add_gate<K: std::hash::Hash + Eq>(
    gates: &Gates<K>,
    key: K,
) -> oneshot::Sender<()> {
    let (tx, rx) = oneshot::channel();
    gates.borrow_mut().entry(key).or_default().push_back(rx);
    tx
}

async fn pass_gate<K: std::hash::Hash + Eq>(gates: &Gates<K>, key: &K) {
    let gate = gates.borrow_mut().get_mut(key).and_then(VecDeque::pop_front);
    if let Some(rx) = gate {
        // A dropped sender opens the gate too.
        let _ = rx.await;
    }
}

// ── mmCIF ────────────────────────────────────────────────────────────────

const ATOM_SITE_FIELDS: [&str; 19] = [
    "group_PDB",
    "id",
    "type_symbol",
    "label_atom_id",
    "label_alt_id",
    "label_comp_id",
    "label_asym_id",
    "label_entity_id",
    "label_seq_id",
    "pdbx_PDB_ins_code",
    "Cartn_x",
    "Cartn_y",
    "Cartn_z",
    "occupancy",
    "B_iso_or_equiv",
    "pdbx_formal_charge",
    "auth_seq_id",
    "auth_asym_id",
    "pdbx_PDB_model_num",
];

/// One water molecule.
pub(crate) const WATER: &[(&str, &str, &str, u32)] = &[
    ("HETATM", "O", "HOH", 1),
    ("HETATM", "H1", "HOH", 1),
    ("HETATM", "H2", "HOH", 1),
];

/// `atom_site` loop of chain A; atoms are `(group, name, residue, seq)`.
pub(crate) fn atom_site(atoms: &[(&str, &str, &str, u32)]) -> String {
    let mut text = String::from("loop_\n");
    for field in ATOM_SITE_FIELDS {
        let _ = writeln!(text, "_atom_site.{field}");
    }
    for (serial, &(group, name, residue, seq)) in atoms.iter().enumerate() {
        let element = &name[..1];
        let id = serial + 1;
        let _ = writeln!(
            text,
            "{group} {id} {element} {name} . {residue} A 1 {seq} ? \
             {serial}.000 0.000 0.000 1.00 0.00 ? {seq} A 1"
        );
    }
    text
}

// ── Backend ──────────────────────────────────────────────────────────────

/// Computation service serving empty mmCIF payloads for known ids.
#[derive(Default)]
pub(crate) struct FakeBackend {
    molecules: RefCell<Vec<StructureId>>,
    listing_error: RefCell<Option<BackendError>>,
    structure_errors: RefCell<FxHashMap<StructureId, BackendError>>,
    payloads: RefCell<FxHashMap<StructureId, Vec<u8>>>,
    gates: Gates<StructureId>,
    fetched: RefCell<Vec<StructureId>>,
}

impl FakeBackend {
    pub(crate) fn with_structures(ids: &[&str]) -> Self {
        let backend = Self::default();
        *backend.molecules.borrow_mut() =
            ids.iter().map(|&id| StructureId::from(id)).collect();
        backend
    }

    /// Hold the next fetch of `id` until the returned sender fires.
    pub(crate) fn gate(&self, id: &str) -> oneshot::Sender<()> {
        add_gate(&self.gates, StructureId::from(id))
    }

    /// Serve `mmcif` as the structure data of `id`.
    pub(crate) fn set_payload(&self, id: &str, mmcif: &str) {
        let _ = self
            .payloads
            .borrow_mut()
            .insert(StructureId::from(id), mmcif.as_bytes().to_vec());
    }

    pub(crate) fn fail_listing(&self, error: Option<BackendError>) {
        *self.listing_error.borrow_mut() = error;
    }

    pub(crate) fn fail_structure(&self, id: &str, error: Option<BackendError>) {
        let id = StructureId::from(id);
        let mut errors = self.structure_errors.borrow_mut();
        match error {
            Some(error) => {
                let _ = errors.insert(id, error);
            }
            None => {
                let _ = errors.remove(&id);
            }
        }
    }

    pub(crate) fn fetched(&self) -> Vec<StructureId> {
        self.fetched.borrow().clone()
    }
}

impl ComputationService for FakeBackend {
    async fn create_computation(
        &self,
        _file_refs: &[String],
        _configs: &[ChargeConfig],
        _settings: &ComputationSettings,
    ) -> Result<ComputationId, BackendError> {
        Ok(ComputationId::from("fake-computation"))
    }

    async fn list_molecules(
        &self,
        _computation: &ComputationId,
    ) -> Result<Vec<StructureId>, BackendError> {
        if let Some(error) = self.listing_error.borrow().clone() {
            return Err(error);
        }
        Ok(self.molecules.borrow().clone())
    }

    async fn get_structure(
        &self,
        _computation: &ComputationId,
        structure: &StructureId,
    ) -> Result<StructurePayload, BackendError> {
        self.fetched.borrow_mut().push(structure.clone());
        pass_gate(&self.gates, structure).await;
        if let Some(error) = self.structure_errors.borrow().get(structure) {
            return Err(error.clone());
        }
        if !self.molecules.borrow().contains(structure) {
            return Err(BackendError::Status(404));
        }
        let data = self
            .payloads
            .borrow()
            .get(structure)
            .cloned()
            .unwrap_or_default();
        Ok(StructurePayload::mmcif(structure.clone(), data))
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// Engine operations, for gating and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Op {
    Load,
    ChargeSet,
    ColorDefault,
    ColorRelative,
    ColorAbsolute,
    BallAndStick,
    Surface,
    DefaultStyle,
}

/// Recorded engine call, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Load(StructureId),
    SelectChargeSet(usize),
    ColorDefault,
    ColorRelative,
    ColorAbsolute(f64),
    BallAndStick,
    Surface,
    DefaultStyle,
}

/// Metadata a fake structure reports once loaded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FakeStructure {
    pub(crate) methods: Vec<String>,
    pub(crate) max_charge: f64,
    pub(crate) cartoon: bool,
}

impl FakeStructure {
    pub(crate) fn new(
        methods: &[&str],
        max_charge: f64,
        cartoon: bool,
    ) -> Self {
        Self {
            methods: methods.iter().map(|&m| m.to_owned()).collect(),
            max_charge,
            cartoon,
        }
    }
}

/// Engine session that records calls and tracks what it displays.
#[derive(Default)]
pub(crate) struct FakeViewer {
    structures: RefCell<FxHashMap<StructureId, FakeStructure>>,
    loaded: RefCell<Option<StructureId>>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<FxHashMap<Op, EngineError>>,
    gates: Gates<Op>,
    coloring: Cell<ColoringMode>,
    absolute_max: Cell<Option<f64>>,
    style: Cell<RenderStyle>,
}

impl FakeViewer {
    pub(crate) fn new() -> Self {
        let viewer = Self::default();
        viewer.coloring.set(ColoringMode::Structure);
        viewer
    }

    pub(crate) fn add_structure(&self, id: &str, structure: FakeStructure) {
        let _ = self
            .structures
            .borrow_mut()
            .insert(StructureId::from(id), structure);
    }

    pub(crate) fn fail(&self, op: Op, error: Option<EngineError>) {
        let mut failures = self.failures.borrow_mut();
        match error {
            Some(error) => {
                let _ = failures.insert(op, error);
            }
            None => {
                let _ = failures.remove(&op);
            }
        }
    }

    /// Hold the next call of `op` until the returned sender fires.
    pub(crate) fn gate(&self, op: Op) -> oneshot::Sender<()> {
        add_gate(&self.gates, op)
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub(crate) fn loaded(&self) -> Option<StructureId> {
        self.loaded.borrow().clone()
    }

    /// Coloring, absolute scale and style currently displayed.
    pub(crate) fn displayed(&self) -> (ColoringMode, Option<f64>, RenderStyle) {
        (self.coloring.get(), self.absolute_max.get(), self.style.get())
    }

    async fn run(&self, op: Op, call: Call) -> Result<(), EngineError> {
        self.calls.borrow_mut().push(call);
        pass_gate(&self.gates, &op).await;
        if let Some(error) = self.failures.borrow().get(&op) {
            return Err(error.clone());
        }
        if op != Op::Load && self.loaded.borrow().is_none() {
            return Err(EngineError::NotLoaded);
        }
        Ok(())
    }

    fn loaded_structure(&self) -> Option<FakeStructure> {
        let loaded = self.loaded.borrow();
        self.structures.borrow().get(loaded.as_ref()?).cloned()
    }

    fn show_coloring(&self, coloring: ColoringMode, absolute_max: Option<f64>) {
        self.coloring.set(coloring);
        self.absolute_max.set(absolute_max);
    }
}

impl ViewerHandle for FakeViewer {
    async fn load(
        &self,
        payload: &StructurePayload,
    ) -> Result<(), EngineError> {
        let id = payload.structure_id.clone();
        self.run(Op::Load, Call::Load(id.clone())).await?;
        if !self.structures.borrow().contains_key(&id) {
            return Err(EngineError::InvalidPayload(format!("unknown {id}")));
        }
        *self.loaded.borrow_mut() = Some(id);
        self.show_coloring(ColoringMode::Structure, None);
        self.style.set(RenderStyle::BallsAndSticks);
        Ok(())
    }

    fn select_charge_set(&self, index: usize) -> Result<(), EngineError> {
        self.calls.borrow_mut().push(Call::SelectChargeSet(index));
        if let Some(error) = self.failures.borrow().get(&Op::ChargeSet) {
            return Err(error.clone());
        }
        Ok(())
    }

    async fn color_default(&self) -> Result<(), EngineError> {
        self.run(Op::ColorDefault, Call::ColorDefault).await?;
        self.show_coloring(ColoringMode::Structure, None);
        Ok(())
    }

    async fn color_relative(&self) -> Result<(), EngineError> {
        self.run(Op::ColorRelative, Call::ColorRelative).await?;
        self.show_coloring(ColoringMode::ChargesRelative, None);
        Ok(())
    }

    async fn color_absolute(&self, max_value: f64) -> Result<(), EngineError> {
        self.run(Op::ColorAbsolute, Call::ColorAbsolute(max_value)).await?;
        self.show_coloring(ColoringMode::ChargesAbsolute, Some(max_value));
        Ok(())
    }

    async fn set_style_ball_and_stick(&self) -> Result<(), EngineError> {
        self.run(Op::BallAndStick, Call::BallAndStick).await?;
        self.style.set(RenderStyle::BallsAndSticks);
        Ok(())
    }

    async fn set_style_surface(&self) -> Result<(), EngineError> {
        self.run(Op::Surface, Call::Surface).await?;
        self.style.set(RenderStyle::Surface);
        Ok(())
    }

    async fn set_style_default(&self) -> Result<(), EngineError> {
        self.run(Op::DefaultStyle, Call::DefaultStyle).await?;
        if !self.is_default_style_applicable() {
            return Err(EngineError::Unsupported("cartoon representation"));
        }
        self.style.set(RenderStyle::Cartoon);
        Ok(())
    }

    fn is_default_style_applicable(&self) -> bool {
        self.loaded_structure().is_some_and(|s| s.cartoon)
    }

    fn max_charge(&self) -> f64 {
        self.loaded_structure().map_or(0.0, |s| s.max_charge)
    }

    fn method_names(&self) -> Vec<String> {
        self.loaded_structure().map(|s| s.methods).unwrap_or_default()
    }
}
