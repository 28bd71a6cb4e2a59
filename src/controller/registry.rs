use std::collections::HashMap;

use crate::common::{HelperId, RegistryError};

/*
    The registry is the controller's private record of every helper it has
    been told about. Records are never erased: a removed helper stays behind
    as an inert entry (not accepted, not online), which keeps its id reserved.

    Counters are never adjusted in place. Every successful mutation is
    followed by a full scan, and the scan result is what the caller gets back.
*/

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct HelperRecord {
    pub id: HelperId,
    /// Position in creation order.
    pub index: usize,
    pub accepted: bool,
    pub online: bool,
}

/// Counters derived from a full scan of the registry.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Tally {
    pub accepted: usize,
    pub online: usize,
}

#[derive(Debug, Default)]
pub struct HelperRegistry {
    helpers: HashMap<HelperId, HelperRecord>,
    tally: Tally,
}

impl HelperRegistry {
    pub fn new() -> Self {
        HelperRegistry {
            helpers: HashMap::new(),
            tally: Tally::default(),
        }
    }

    pub fn accepted_count(&self) -> usize {
        self.tally.accepted
    }

    pub fn online_count(&self) -> usize {
        self.tally.online
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn len(&self) -> usize {
        self.helpers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.helpers.is_empty()
    }

    pub fn get(&self, id: &HelperId) -> Option<&HelperRecord> {
        self.helpers.get(id)
    }

    /// All records in creation order.
    pub fn records(&self) -> Vec<HelperRecord> {
        let mut records: Vec<HelperRecord> = self.helpers.values().cloned().collect();
        records.sort_by_key(|record| record.index);
        records
    }

    pub fn check_create(&self, raw: &str) -> Result<HelperId, RegistryError> {
        let id = HelperId::parse(raw)?;
        if self.helpers.contains_key(&id) {
            return Err(RegistryError::AlreadyExists(id));
        }
        Ok(id)
    }

    /// The helper exists and is not yet accepted.
    pub fn check_accept(&self, raw: &str) -> Result<HelperId, RegistryError> {
        let record = self.lookup(raw)?;
        if record.accepted {
            return Err(RegistryError::AlreadyAccepted(record.id.clone()));
        }
        Ok(record.id.clone())
    }

    /// The helper exists and is accepted.
    pub fn check_remove(&self, raw: &str) -> Result<HelperId, RegistryError> {
        let record = self.lookup(raw)?;
        if !record.accepted {
            return Err(RegistryError::NotAccepted(record.id.clone()));
        }
        Ok(record.id.clone())
    }

    /// The helper is accepted and currently offline.
    pub fn check_online(&self, raw: &str) -> Result<HelperId, RegistryError> {
        let record = self.lookup(raw)?;
        if !record.accepted {
            return Err(RegistryError::NotAccepted(record.id.clone()));
        }
        if record.online {
            return Err(RegistryError::AlreadyOnline(record.id.clone()));
        }
        Ok(record.id.clone())
    }

    /// The helper is accepted and currently online.
    pub fn check_offline(&self, raw: &str) -> Result<HelperId, RegistryError> {
        let record = self.lookup(raw)?;
        if !record.accepted {
            return Err(RegistryError::NotAccepted(record.id.clone()));
        }
        if !record.online {
            return Err(RegistryError::NotOnline(record.id.clone()));
        }
        Ok(record.id.clone())
    }

    pub fn create(&mut self, raw: &str) -> Result<HelperId, RegistryError> {
        let id = self.check_create(raw)?;
        let record = HelperRecord {
            id: id.clone(),
            index: self.helpers.len(),
            accepted: false,
            online: false,
        };
        self.helpers.insert(id.clone(), record);
        self.recount();
        Ok(id)
    }

    pub fn accept(&mut self, id: &HelperId) -> Result<Tally, RegistryError> {
        self.check_accept(id.as_str())?;
        self.update(id, |record| record.accepted = true);
        Ok(self.recount())
    }

    pub fn remove(&mut self, id: &HelperId) -> Result<Tally, RegistryError> {
        self.check_remove(id.as_str())?;
        self.update(id, |record| {
            record.accepted = false;
            record.online = false;
        });
        Ok(self.recount())
    }

    pub fn mark_online(&mut self, id: &HelperId) -> Result<Tally, RegistryError> {
        self.check_online(id.as_str())?;
        self.update(id, |record| record.online = true);
        Ok(self.recount())
    }

    pub fn mark_offline(&mut self, id: &HelperId) -> Result<Tally, RegistryError> {
        self.check_offline(id.as_str())?;
        self.update(id, |record| record.online = false);
        Ok(self.recount())
    }

    fn lookup(&self, raw: &str) -> Result<&HelperRecord, RegistryError> {
        let id = HelperId::parse(raw).map_err(|_| RegistryError::UnknownHelper(raw.to_string()))?;
        self.helpers
            .get(&id)
            .ok_or_else(|| RegistryError::UnknownHelper(raw.to_string()))
    }

    fn update(&mut self, id: &HelperId, apply: impl FnOnce(&mut HelperRecord)) {
        if let Some(record) = self.helpers.get_mut(id) {
            apply(record);
        }
    }

    fn recount(&mut self) -> Tally {
        let accepted = self.helpers.values().filter(|h| h.accepted).count();
        let online = self.helpers.values().filter(|h| h.accepted && h.online).count();
        self.tally = Tally { accepted, online };
        self.tally
    }
}
