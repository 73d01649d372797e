#![deny(warnings)]

//! Recompute session tying the engines to the niche store.
//!
//! The presentation layer mutates [`Inputs`] and reads back an [`Evaluation`];
//! results are recomputed only when the inputs actually changed.

pub mod ranking;

use niche_core::{
    validate_ebook, validate_global, validate_name, validate_paperback, Assumptions, EbookData,
    GlobalData, PaperbackData, ValidationError,
};
use niche_econ::{
    ebook_results_with, paperback_results_with, positioning_with, EbookResults, PaperbackResults,
    PositioningResults,
};
use niche_score::{active_metrics, score, ActiveMetrics, ScoreBreakdown};
use persistence::{
    load_collapsed_sections, KeyValueStore, NicheSnapshot, NicheStore, SavedNiche,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Everything the user can enter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Inputs {
    pub global: GlobalData,
    pub ebook: EbookData,
    pub paperback: PaperbackData,
}

impl Inputs {
    /// Check every input group.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_global(&self.global)?;
        validate_ebook(&self.ebook)?;
        validate_paperback(&self.paperback)
    }
}

/// Derived results for one set of inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// `None` until ebook inputs are complete.
    pub ebook: Option<EbookResults>,
    pub paperback: Option<PaperbackResults>,
    pub positioning: Option<PositioningResults>,
    /// Figures of the selected format.
    pub active: Option<ActiveMetrics>,
    pub score: Option<ScoreBreakdown>,
}

/// Run every engine over `inputs`.
pub fn evaluate(a: &Assumptions, inputs: &Inputs) -> Evaluation {
    let ebook = ebook_results_with(a, &inputs.global, &inputs.ebook);
    let paperback = paperback_results_with(a, &inputs.global, &inputs.paperback);
    let positioning = positioning_with(a, &inputs.global, ebook.as_ref(), paperback.as_ref());
    let active = active_metrics(&inputs.global, ebook.as_ref(), paperback.as_ref());
    let score = score(active.as_ref());
    Evaluation {
        ebook,
        paperback,
        positioning,
        active,
        score,
    }
}

/// Current inputs plus a memoized evaluation of them.
#[derive(Debug, Default)]
pub struct Calculator {
    assumptions: Assumptions,
    inputs: Inputs,
    cache: Option<(Inputs, Evaluation)>,
    recomputations: u64,
}

impl Calculator {
    pub fn new(assumptions: Assumptions) -> Self {
        Self {
            assumptions,
            ..Default::default()
        }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    /// Mutable access to inputs; the next evaluation notices any change.
    pub fn inputs_mut(&mut self) -> &mut Inputs {
        &mut self.inputs
    }

    pub fn set_inputs(&mut self, inputs: Inputs) {
        self.inputs = inputs;
    }

    /// Number of times the engines actually ran.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Evaluation of the current inputs, recomputed only if they changed.
    pub fn evaluation(&mut self) -> &Evaluation {
        if matches!(&self.cache, Some((cached, _)) if *cached != self.inputs) {
            self.cache = None;
        }
        let (assumptions, inputs, recomputations) =
            (&self.assumptions, &self.inputs, &mut self.recomputations);
        let (_, eval) = self.cache.get_or_insert_with(|| {
            *recomputations += 1;
            let eval = evaluate(assumptions, inputs);
            debug!(
                recomputations = *recomputations,
                score = ?eval.score.as_ref().map(|s| s.total_score),
                "inputs changed, results recomputed"
            );
            (inputs.clone(), eval)
        });
        eval
    }

    /// Capture inputs and derived results for saving.
    pub fn snapshot(&mut self) -> NicheSnapshot {
        let inputs = self.inputs.clone();
        let eval = self.evaluation().clone();
        let active = eval.active.as_ref();
        NicheSnapshot {
            ebook: (inputs.ebook != EbookData::default()).then_some(inputs.ebook),
            paperback: (inputs.paperback != PaperbackData::default()).then_some(inputs.paperback),
            global: inputs.global,
            max_clicks_per_sale: active.map(|m| m.max_clicks_per_sale),
            bacos: active.map(|m| m.margin_pct),
            daily_investment: eval.positioning.as_ref().map(|p| p.daily_investment),
            list_price: active.and_then(|m| m.list_price),
            min_recommended_price: active.and_then(|m| m.min_price),
            royalty: active.map(|m| m.royalty),
            score: eval.score,
        }
    }

    /// Replace the inputs with those recorded in a snapshot.
    pub fn load_snapshot(&mut self, snapshot: &NicheSnapshot) {
        self.inputs = Inputs {
            global: snapshot.global.clone(),
            ebook: snapshot.ebook.clone().unwrap_or_default(),
            paperback: snapshot.paperback.clone().unwrap_or_default(),
        };
    }
}

/// Presentation state owned by the caller and passed in read-only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiContext {
    /// Niche currently open for editing.
    pub loaded_niche_id: Option<Uuid>,
    /// Section id to collapsed flag; absent means expanded.
    pub collapsed_sections: BTreeMap<String, bool>,
}

impl UiContext {
    /// Start a context with the section state persisted in `backend`.
    pub fn restore<S: KeyValueStore>(backend: &S) -> Self {
        Self {
            loaded_niche_id: None,
            collapsed_sections: load_collapsed_sections(backend),
        }
    }

    pub fn is_collapsed(&self, section: &str) -> bool {
        self.collapsed_sections.get(section).copied().unwrap_or(false)
    }
}

/// Calculator plus store: the operations a form-driven shell invokes.
pub struct Session<S: KeyValueStore> {
    pub calculator: Calculator,
    pub store: NicheStore<S>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(assumptions: Assumptions, backend: S) -> Self {
        Self {
            calculator: Calculator::new(assumptions),
            store: NicheStore::load(backend),
        }
    }

    /// Save the current state as a new niche.
    pub fn save_as_new(&mut self, name: &str) -> Result<SavedNiche, ValidationError> {
        validate_name(name)?;
        self.calculator.inputs().validate()?;
        let snapshot = self.calculator.snapshot();
        Ok(self.store.save(name, snapshot))
    }

    /// Append the current state as a new version of `id`.
    pub fn save_changes(
        &mut self,
        id: Uuid,
        note: Option<String>,
    ) -> Result<Option<SavedNiche>, ValidationError> {
        self.calculator.inputs().validate()?;
        let snapshot = self.calculator.snapshot();
        Ok(self.store.update(id, snapshot, note))
    }

    /// Load a saved niche's current inputs into the calculator.
    pub fn open(&mut self, id: Uuid) -> Option<&SavedNiche> {
        let niche = self.store.get(id)?;
        self.calculator.load_snapshot(&niche.snapshot);
        info!(%id, "niche opened");
        Some(niche)
    }

    /// Restore a past version and load it into the calculator.
    pub fn restore(&mut self, niche_id: Uuid, version_id: Uuid) -> Option<SavedNiche> {
        let restored = self.store.restore_version(niche_id, version_id)?;
        self.calculator.load_snapshot(&restored.snapshot);
        Some(restored)
    }
}
