use crate::models::ExpenseRecord;

/// Confirmed expenses for the session, most recent first. Records are never
/// updated or removed; id uniqueness is left to whoever builds the record.
#[derive(Debug, Default)]
pub struct ExpenseStore {
    records: Vec<ExpenseRecord>,
}

impl ExpenseStore {
    pub fn new() -> Self {
        ExpenseStore::default()
    }

    pub fn append(&mut self, record: ExpenseRecord) {
        tracing::debug!(id = %record.id, total = self.records.len() + 1, "Expense stored");
        self.records.insert(0, record);
    }

    pub fn all(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&ExpenseRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
