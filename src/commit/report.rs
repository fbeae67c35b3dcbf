use super::IdMap;

/// What a commit sent, phase by phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub variants_deleted: usize,
    pub products_deleted: usize,
    pub products_created: usize,
    pub variants_created: usize,
    pub products_updated: usize,
    pub variants_updated: usize,
    pub defaults_resolved: usize,
    /// Temporary ids and the server ids they became.
    pub ids: IdMap,
}

impl CommitReport {
    pub fn write_count(&self) -> usize {
        self.variants_deleted
            + self.products_deleted
            + self.products_created
            + self.variants_created
            + self.products_updated
            + self.variants_updated
            + self.defaults_resolved
    }
}
