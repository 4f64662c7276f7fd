use rand::Rng;
use tracing::{debug, error, warn};

use super::error::FormError;
use super::form_model::{CandidateElement, FormInput, LinkedFieldGroup};
use super::input::FormInputResolver;
use super::random::RandomValueGenerator;
use super::registry::FieldRegistry;
use crate::browser::dom::{Document, NodeId};
use crate::browser::driver::BrowserDriver;

/// Attribute carrying the candidate marker on each anchor clone.
pub const MARKER_ATTRIBUTE: &str = "data-candidate-marker";

/// Result of one generation call, with what a trace needs to explain it.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    pub candidates: Vec<CandidateElement>,
    /// Largest value count among the group's fields
    pub max_values: usize,
    /// Fingerprint of the snapshot the candidates were built from
    pub snapshot_fingerprint: Option<String>,
    /// Group fields with no control in the snapshot
    pub omitted_fields: Vec<String>,
}

// ============================================================================
// CandidateGenerator
// ============================================================================

/// Produces one candidate per value combination for a linked-field group.
#[derive(Debug, Clone, Copy)]
pub struct CandidateGenerator<'a> {
    registry: &'a FieldRegistry,
    inputs: FormInputResolver<'a>,
    exclude_iframes: bool,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(registry: &'a FieldRegistry, random: RandomValueGenerator) -> Self {
        Self {
            registry,
            inputs: FormInputResolver::new(registry, random),
            exclude_iframes: true,
        }
    }

    /// Keep frame subtrees in the snapshot.
    pub fn include_iframes(mut self, include: bool) -> Self {
        self.exclude_iframes = !include;
        self
    }

    /// Largest configured value count over the group's fields; unresolved
    /// fields count as zero.
    pub fn max_values(&self, group: &LinkedFieldGroup) -> usize {
        let resolver = self.inputs.resolver();
        group
            .fields
            .iter()
            .filter_map(|name| resolver.field_id_for(name))
            .map(|id| self.registry.value_count(id))
            .max()
            .unwrap_or(0)
    }

    /// Candidates for the anchor at `anchor_locator`, ordered by index.
    pub fn generate<D, R>(
        &self,
        driver: &mut D,
        group: &LinkedFieldGroup,
        anchor_locator: &str,
        rng: &mut R,
    ) -> Vec<CandidateElement>
    where
        D: BrowserDriver + ?Sized,
        R: Rng + ?Sized,
    {
        self.generate_traced(driver, group, anchor_locator, rng).candidates
    }

    /// `generate`, also returning the facts behind the result.
    pub fn generate_traced<D, R>(
        &self,
        driver: &mut D,
        group: &LinkedFieldGroup,
        anchor_locator: &str,
        rng: &mut R,
    ) -> Generation
    where
        D: BrowserDriver + ?Sized,
        R: Rng + ?Sized,
    {
        let max_values = self.max_values(group);
        if max_values == 0 {
            warn!(
                "No input values found for group '{}' (anchor {})",
                group.id, anchor_locator
            );
            return Generation::default();
        }

        let document = match driver.current_document(self.exclude_iframes) {
            Ok(doc) => doc,
            Err(e) => {
                error!("Generation for {} aborted: {}", anchor_locator, e);
                return Generation {
                    max_values,
                    ..Generation::default()
                };
            }
        };
        let fingerprint = document.fingerprint();

        let Some(anchor) = document.find_node(anchor_locator) else {
            let missing = FormError::ElementNotFound {
                element: anchor_locator.to_string(),
                context: format!("anchor of group '{}'", group.id),
            };
            warn!("{}", missing);
            return Generation {
                max_values,
                snapshot_fingerprint: Some(fingerprint),
                ..Generation::default()
            };
        };

        let (controls, omitted_fields) = self.locate_controls(&document, group);
        let locator = document.locator_of(anchor);

        let candidates = (0..max_values)
            .map(|index| {
                let form_inputs: Vec<FormInput> = controls
                    .iter()
                    .filter_map(|(field_id, node)| {
                        self.inputs.form_input_for_field(
                            driver,
                            &document,
                            *node,
                            field_id,
                            index as i64,
                            rng,
                        )
                    })
                    .collect();

                let marker = group.marker(index);
                let mut element = document.clone_element(anchor);
                element
                    .attributes
                    .insert(MARKER_ATTRIBUTE.to_string(), marker.clone());

                CandidateElement {
                    marker,
                    element,
                    locator: locator.clone(),
                    form_inputs,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "Generated {} candidates for group '{}' at {}",
            candidates.len(),
            group.id,
            locator
        );

        Generation {
            candidates,
            max_values,
            snapshot_fingerprint: Some(fingerprint),
            omitted_fields,
        }
    }

    /// First control whose `name` or `id` equals `alias` or fully matches
    /// its compiled pattern.
    fn find_by_alias(&self, document: &Document, alias: &str) -> Option<NodeId> {
        match self.registry.pattern_for(alias) {
            Some(pattern) => document.find_by_identity(|value| pattern.matches(value)),
            None => document.find_by_name_or_id(alias),
        }
    }

    /// Live control for each group field, in group order. Fields with no
    /// matching control are returned separately.
    fn locate_controls(
        &self,
        document: &Document,
        group: &LinkedFieldGroup,
    ) -> (Vec<(&'a str, NodeId)>, Vec<String>) {
        let resolver = self.inputs.resolver();
        let mut located = Vec::new();
        let mut omitted = Vec::new();

        for name in &group.fields {
            let node = resolver.field_id_for(name).and_then(|field_id| {
                self.registry
                    .aliases(field_id)?
                    .iter()
                    .find_map(|alias| self.find_by_alias(document, alias))
                    .map(|node| (field_id, node))
            });

            match node {
                Some(found) => located.push(found),
                None => {
                    let missing = FormError::ElementNotFound {
                        element: name.clone(),
                        context: "no control matches its aliases".into(),
                    };
                    warn!("{}", missing);
                    omitted.push(name.clone());
                }
            }
        }

        (located, omitted)
    }
}
