use super::{SearchManager, Searchable};
use fuglelitt_common::db::models::Journal;
use uuid::Uuid;

/// Journals carry no date, so digit queries only match text
impl Searchable for Journal {
    fn key(&self) -> Uuid {
        self.id
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.desc.as_str()]
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JournalManager;

impl SearchManager for JournalManager {
    type Record = Journal;

    fn name(&self) -> &'static str {
        "journal"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::journal;

    #[test]
    fn test_journal_name_and_desc() {
        let mut described = journal("Vår Fuglefauna");
        described.desc = "Norsk Ornitologisk Forening".to_string();
        let records = vec![described, journal("Ornis Norvegica"), journal("Fauna")];

        assert_eq!(JournalManager.search(records.clone(), Some("orni")).len(), 2);
        assert_eq!(JournalManager.search(records.clone(), Some("fauna")).len(), 2);
        assert!(JournalManager.search(records, Some("2004")).is_empty());
    }
}
