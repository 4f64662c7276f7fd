pub mod candidate;
pub mod error;
pub mod form_model;
pub mod input;
pub mod random;
pub mod registry;
pub mod resolver;
pub mod selector;
