use rand::Rng;
use tracing::debug;

use super::form_model::FormInput;
use super::random::RandomValueGenerator;
use super::registry::FieldRegistry;
use super::resolver::FieldResolver;
use super::selector::ValueSelector;
use crate::browser::dom::{Document, NodeId};
use crate::browser::driver::BrowserDriver;

/// Resolves the `FormInput` for one control of a document snapshot:
/// configured value first, random fallback second.
#[derive(Debug, Clone, Copy)]
pub struct FormInputResolver<'a> {
    resolver: FieldResolver<'a>,
    selector: ValueSelector<'a>,
    random: RandomValueGenerator,
}

impl<'a> FormInputResolver<'a> {
    pub fn new(registry: &'a FieldRegistry, random: RandomValueGenerator) -> Self {
        Self {
            resolver: FieldResolver::new(registry),
            selector: ValueSelector::new(registry),
            random,
        }
    }

    pub fn resolver(&self) -> FieldResolver<'a> {
        self.resolver
    }

    /// Input for an arbitrary control, its field found through its own id or
    /// name. `None` when the control has neither, or nothing can fill it.
    pub fn form_input<D, R>(
        &self,
        driver: &mut D,
        document: &Document,
        node: NodeId,
        index: i64,
        rng: &mut R,
    ) -> Option<FormInput>
    where
        D: BrowserDriver + ?Sized,
        R: Rng + ?Sized,
    {
        let name = document.identifying_name(node)?;
        let field_id = self.resolver.resolve(name);
        self.build(driver, document, node, name, field_id, index, rng)
    }

    /// `form_input` with the default (first) configured value.
    pub fn default_form_input<D, R>(
        &self,
        driver: &mut D,
        document: &Document,
        node: NodeId,
        rng: &mut R,
    ) -> Option<FormInput>
    where
        D: BrowserDriver + ?Sized,
        R: Rng + ?Sized,
    {
        self.form_input(driver, document, node, 0, rng)
    }

    /// Input for a control already known to belong to `field_id`.
    pub fn form_input_for_field<D, R>(
        &self,
        driver: &mut D,
        document: &Document,
        node: NodeId,
        field_id: &str,
        index: i64,
        rng: &mut R,
    ) -> Option<FormInput>
    where
        D: BrowserDriver + ?Sized,
        R: Rng + ?Sized,
    {
        let name = document.identifying_name(node)?;
        self.build(driver, document, node, name, Some(field_id), index, rng)
    }

    #[allow(clippy::too_many_arguments)]
    fn build<D, R>(
        &self,
        driver: &mut D,
        document: &Document,
        node: NodeId,
        name: &str,
        field_id: Option<&str>,
        index: i64,
        rng: &mut R,
    ) -> Option<FormInput>
    where
        D: BrowserDriver + ?Sized,
        R: Rng + ?Sized,
    {
        let input_type = document.input_type(node);

        let configured = field_id.and_then(|id| self.selector.select(id, index, &input_type, rng));
        if let Some(value) = configured {
            return Some(FormInput::new(name, input_type, vec![value]));
        }

        let locator = document.locator_of(node);
        let values = self.random.random_values(driver, &locator, &input_type, rng);
        if values.is_empty() {
            debug!("No value for control '{}' ({})", name, input_type);
            return None;
        }
        Some(FormInput::new(name, input_type, values))
    }
}
