use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use super::form_model::{ControlValue, InputType};
use crate::browser::driver::BrowserDriver;

pub const RANDOM_STRING_LENGTH: usize = 8;

/// Random alphanumeric string of `len` characters.
pub fn random_string<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

// ============================================================================
// RandomValueGenerator — fallback for controls no field definition matches
// ============================================================================

/// Invents a plausible value for an unmatched, visible control.
///
/// Returns no values when random filling is disabled, the control is hidden
/// or unreachable, or its type cannot be filled automatically. The caller
/// skips the control in all of those cases.
#[derive(Debug, Clone, Copy)]
pub struct RandomValueGenerator {
    enabled: bool,
}

impl RandomValueGenerator {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn random_values<D, R>(
        &self,
        driver: &mut D,
        locator: &str,
        input_type: &InputType,
        rng: &mut R,
    ) -> Vec<ControlValue>
    where
        D: BrowserDriver + ?Sized,
        R: Rng + ?Sized,
    {
        if !self.enabled {
            return Vec::new();
        }

        match driver.is_visible(locator) {
            Ok(true) => {}
            Ok(false) => {
                debug!("Skipping hidden control {}", locator);
                return Vec::new();
            }
            Err(e) => {
                warn!("{}", e);
                return Vec::new();
            }
        }

        match input_type {
            t if t.is_text_like() => {
                vec![ControlValue::new(random_string(rng, RANDOM_STRING_LENGTH), true)]
            }
            InputType::Checkbox => vec![random_check(rng)],
            InputType::Radio => match driver.is_selected(locator) {
                Ok(false) => vec![random_check(rng)],
                Ok(true) => Vec::new(),
                Err(e) => {
                    warn!("{}", e);
                    Vec::new()
                }
            },
            InputType::Select => match driver.list_options(locator) {
                Ok(options) => options
                    .choose(rng)
                    .map(|option| vec![ControlValue::new(option.text.clone(), true)])
                    .unwrap_or_default(),
                Err(e) => {
                    warn!("{}", e);
                    Vec::new()
                }
            },
            other => {
                debug!("Cannot invent a value for {} control {}", other, locator);
                Vec::new()
            }
        }
    }
}

fn random_check<R: Rng + ?Sized>(rng: &mut R) -> ControlValue {
    if rng.gen_bool(0.5) {
        ControlValue::new("1", true)
    } else {
        ControlValue::new("0", false)
    }
}
