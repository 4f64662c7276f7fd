use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::forms::candidate::Generation;
use crate::forms::form_model::{CandidateElement, LinkedFieldGroup};

/// One candidate as recorded in a trace line.
#[derive(Debug, Serialize)]
pub struct CandidateSummary {
    pub marker: String,
    pub filled: Vec<String>,
}

impl From<&CandidateElement> for CandidateSummary {
    fn from(candidate: &CandidateElement) -> Self {
        Self {
            marker: candidate.marker.clone(),
            filled: candidate.form_inputs.iter().map(|i| i.name.clone()).collect(),
        }
    }
}

/// One generation call, serialized as a JSON line.
#[derive(Debug, Serialize)]
pub struct GenerationEvent {
    pub timestamp_ms: u128,
    pub group_id: String,
    pub anchor: String,

    pub snapshot: Option<String>,
    pub max_values: usize,

    pub candidates: Vec<CandidateSummary>,
    pub omitted_fields: Vec<String>,
}

impl GenerationEvent {
    pub fn now(group: &LinkedFieldGroup, anchor: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            group_id: group.id.clone(),
            anchor: anchor.to_string(),
            snapshot: None,
            max_values: 0,
            candidates: vec![],
            omitted_fields: vec![],
        }
    }

    pub fn with_generation(mut self, generation: &Generation) -> Self {
        self.snapshot = generation.snapshot_fingerprint.clone();
        self.max_values = generation.max_values;
        self.candidates = generation.candidates.iter().map(CandidateSummary::from).collect();
        self.omitted_fields = generation.omitted_fields.clone();
        self
    }
}
