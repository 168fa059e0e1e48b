use std::collections::BTreeSet;

use dashmap::DashMap;

use crate::edits::record::EditRecord;

/// Edits accumulated across translation units.
///
/// Headers shared by several units produce the same record more than once;
/// each distinct record is kept once.
#[derive(Debug, Default)]
pub struct EditCollector {
    by_file: DashMap<String, BTreeSet<EditRecord>>,
}

impl EditCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the record was already present.
    pub fn insert(
        &self,
        record: EditRecord,
    ) -> bool {
        self.by_file.entry(record.file.clone()).or_default().insert(record)
    }

    pub fn extend(
        &self,
        records: impl IntoIterator<Item = EditRecord>,
    ) {
        for record in records {
            self.insert(record);
        }
    }

    pub fn len(&self) -> usize {
        self.by_file.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn file_count(&self) -> usize {
        self.by_file.len()
    }

    /// All records, files in path order and edits in offset order.
    pub fn sorted_records(&self) -> Vec<EditRecord> {
        let mut files: Vec<String> = self.by_file.iter().map(|entry| entry.key().clone()).collect();
        files.sort();

        let mut records = Vec::with_capacity(self.len());
        for file in files {
            if let Some(set) = self.by_file.get(&file) {
                records.extend(set.iter().cloned());
            }
        }
        records
    }
}

#[cfg(test)]
#[path = "../../tests/src/edits/collector_tests.rs"]
mod tests;
