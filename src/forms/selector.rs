use rand::Rng;

use super::form_model::{ControlValue, InputType};
use super::registry::FieldRegistry;

/// Picks the configured value for a field and combination index.
#[derive(Debug, Clone, Copy)]
pub struct ValueSelector<'a> {
    registry: &'a FieldRegistry,
}

impl<'a> ValueSelector<'a> {
    pub fn new(registry: &'a FieldRegistry) -> Self {
        Self { registry }
    }

    /// Configured value for `field_id` at `index`.
    ///
    /// - index 0, a single value, or an index past the end: the first value
    /// - `0 < index < N`: the value at `index`
    /// - negative index: uniform pick from all but the last value, which
    ///   is reserved and never drawn at random
    ///
    /// `None` when the field is unknown or has no values; the caller then
    /// falls back to a random value.
    pub fn select_value<R: Rng + ?Sized>(
        &self,
        field_id: &str,
        index: i64,
        rng: &mut R,
    ) -> Option<&'a str> {
        let values = self.registry.values(field_id)?;
        let count = values.len();
        if count == 0 {
            return None;
        }

        let value = if index == 0 || count == 1 || index >= count as i64 {
            &values[0]
        } else if index > 0 {
            &values[index as usize]
        } else {
            &values[rng.gen_range(0..count - 1)]
        };
        Some(value.as_str())
    }

    /// `select_value` with the selection semantics of `input_type` applied.
    pub fn select<R: Rng + ?Sized>(
        &self,
        field_id: &str,
        index: i64,
        input_type: &InputType,
        rng: &mut R,
    ) -> Option<ControlValue> {
        self.select_value(field_id, index, rng)
            .map(|value| ControlValue::for_type(value, input_type))
    }
}
