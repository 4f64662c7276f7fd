use super::registry::FieldRegistry;

/// Matches a live control's name or id against registered alias patterns.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'a> {
    registry: &'a FieldRegistry,
}

impl<'a> FieldResolver<'a> {
    pub fn new(registry: &'a FieldRegistry) -> Self {
        Self { registry }
    }

    /// Id of the field owning the first alias pattern that fully matches
    /// `name` (case-insensitive), in registration order.
    pub fn resolve(&self, name: &str) -> Option<&'a str> {
        self.registry
            .patterns()
            .iter()
            .find(|p| p.full_match(name))
            .map(|p| p.field_id.as_str())
    }

    /// Field id for a linked-field name: the name itself if it is a
    /// registered id, else whatever its aliases resolve it to.
    pub fn field_id_for(&self, name: &str) -> Option<&'a str> {
        self.registry
            .registered_id(name)
            .or_else(|| self.resolve(name))
    }
}
