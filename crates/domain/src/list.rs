use std::collections::{BTreeSet, HashMap};

use crate::{DomainError, PhotoField, PhotoId, PhotoRecord};

/// Records dropped from the list by a single removal, in the order they must be
/// deleted from the store (a cascaded copy comes before its original), plus the
/// indices of surviving records whose stored fields changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Removal {
    pub removed: Vec<PhotoRecord>,
    pub updated: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reorder {
    Unchanged,
    Moved { updated: Vec<usize> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalization {
    pub removed: Vec<PhotoRecord>,
    pub updated: Vec<usize>,
}

impl Normalization {
    pub fn is_clean(&self) -> bool {
        self.removed.is_empty() && self.updated.is_empty()
    }
}

/// Photo records in display order. Each copy sits directly after its original
/// and originals are numbered 1..=N without gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoList {
    records: Vec<PhotoRecord>,
}

impl PhotoList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders records by order number with every copy placed right behind its
    /// original. Depends only on `order_number`, `id` and `copy_of`.
    pub fn from_records(records: Vec<PhotoRecord>) -> Self {
        let numbers: HashMap<PhotoId, u32> = records
            .iter()
            .filter(|record| !record.is_copy())
            .filter_map(|record| record.id.map(|id| (id, record.order_number)))
            .collect();

        let mut records = records;
        records.sort_by_key(|record| match record.copy_of {
            Some(original) => (
                numbers
                    .get(&original)
                    .copied()
                    .unwrap_or(record.order_number),
                Some(original),
                1_u8,
            ),
            None => (record.order_number, record.id, 0_u8),
        });
        Self { records }
    }

    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PhotoRecord> {
        self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhotoRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PhotoRecord> {
        self.records.get(index)
    }

    pub fn position(&self, id: PhotoId) -> Option<usize> {
        self.records.iter().position(|record| record.id == Some(id))
    }

    pub fn find(&self, id: PhotoId) -> Result<&PhotoRecord, DomainError> {
        self.records
            .iter()
            .find(|record| record.id == Some(id))
            .ok_or(DomainError::PhotoNotFound(id))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn next_order_number(&self) -> u32 {
        self.records
            .iter()
            .filter(|record| !record.is_copy())
            .map(|record| record.order_number)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn push_original(&mut self, record: PhotoRecord) -> Result<usize, DomainError> {
        if record.is_copy() || record.has_copy.is_some() {
            return Err(DomainError::BrokenInvariant(
                "only unpaired originals can be appended".to_string(),
            ));
        }
        let expected = self.next_order_number();
        if record.order_number != expected {
            return Err(DomainError::BrokenInvariant(format!(
                "appended photo must be numbered {expected}, got {}",
                record.order_number
            )));
        }
        self.records.push(record);
        Ok(self.records.len() - 1)
    }

    /// Places a persisted copy right after its original and links the original
    /// to it. Returns the original's index.
    pub fn insert_copy(&mut self, copy: PhotoRecord) -> Result<usize, DomainError> {
        let copy_id = copy.id.ok_or_else(|| {
            DomainError::BrokenInvariant("copy must be persisted before insertion".to_string())
        })?;
        let original_id = copy.copy_of.ok_or_else(|| {
            DomainError::BrokenInvariant(format!("photo {copy_id} is not a copy"))
        })?;
        let original_index = self
            .position(original_id)
            .ok_or(DomainError::PhotoNotFound(original_id))?;

        let original = &mut self.records[original_index];
        if original.is_copy() {
            return Err(DomainError::CopyOfCopy(original_id));
        }
        if let Some(existing) = original.has_copy.filter(|existing| *existing != copy_id) {
            return Err(DomainError::AlreadyHasCopy {
                original: original_id,
                copy: existing,
            });
        }
        original.has_copy = Some(copy_id);

        let mut copy = copy;
        copy.order_number = original.order_number;
        self.records.insert(original_index + 1, copy);
        Ok(original_index)
    }

    /// Sets a descriptive field. A new photo number is mirrored onto the pair
    /// partner so original and copy always share it. Returns changed indices.
    pub fn update_field(
        &mut self,
        id: PhotoId,
        field: PhotoField,
        value: &str,
    ) -> Result<Vec<usize>, DomainError> {
        let index = self.position(id).ok_or(DomainError::PhotoNotFound(id))?;
        let mut changed = Vec::new();
        if self.records[index].set_field(field, value)? {
            changed.push(index);
        }

        if field == PhotoField::UidSuffix {
            let record = &self.records[index];
            let partner = record.copy_of.or(record.has_copy);
            if let Some(partner_index) = partner.and_then(|partner| self.position(partner)) {
                if self.records[partner_index].set_field(field, value)? {
                    changed.push(partner_index);
                }
            }
        }

        changed.sort_unstable();
        Ok(changed)
    }

    /// Removes a photo. An original takes its copy with it and the numbering
    /// gap is closed; removing a copy only unlinks its original.
    pub fn remove(&mut self, id: PhotoId) -> Result<Removal, DomainError> {
        let mut index = self.position(id).ok_or(DomainError::PhotoNotFound(id))?;

        if let Some(original_id) = self.records[index].copy_of {
            let removed = self.records.remove(index);
            let mut updated = Vec::new();
            if let Some(original_index) = self.position(original_id) {
                let original = &mut self.records[original_index];
                if original.has_copy == Some(id) {
                    original.has_copy = None;
                    updated.push(original_index);
                }
            }
            return Ok(Removal {
                removed: vec![removed],
                updated,
            });
        }

        let mut removed = Vec::with_capacity(2);
        if let Some(copy_index) = self.records[index]
            .has_copy
            .and_then(|copy_id| self.position(copy_id))
        {
            removed.push(self.records.remove(copy_index));
            if copy_index < index {
                index -= 1;
            }
        }
        removed.push(self.records.remove(index));

        let updated = self.renumber_range(index, self.records.len());
        Ok(Removal { removed, updated })
    }

    /// Moves the pair (or single photo) under `drag_index` onto the slot of the
    /// pair under `hover_index`. Pairs travel as one block and never land
    /// between an original and its copy.
    pub fn move_block(
        &mut self,
        drag_index: usize,
        hover_index: usize,
    ) -> Result<Reorder, DomainError> {
        let len = self.records.len();
        for index in [drag_index, hover_index] {
            if index >= len {
                return Err(DomainError::IndexOutOfBounds { index, len });
            }
        }
        if drag_index == hover_index
            || self.records[drag_index].order_number == self.records[hover_index].order_number
        {
            return Ok(Reorder::Unchanged);
        }

        let (source_start, source_len) = self.block_bounds(drag_index);
        let (target_start, target_len) = self.block_bounds(hover_index);
        if source_start == target_start {
            return Ok(Reorder::Unchanged);
        }

        let block: Vec<PhotoRecord> = self
            .records
            .drain(source_start..source_start + source_len)
            .collect();
        let insert_at = if target_start > source_start {
            target_start + target_len - source_len
        } else {
            target_start
        };
        self.records.splice(insert_at..insert_at, block);

        let start = source_start.min(target_start);
        let end = (source_start + source_len).max(target_start + target_len);
        Ok(Reorder::Moved {
            updated: self.renumber_range(start, end),
        })
    }

    /// Reassigns order numbers over `start..end`, continuing from the record
    /// before `start`. A copy right behind its original takes the original's
    /// number. Returns the indices whose number changed.
    pub fn renumber_range(&mut self, start: usize, end: usize) -> Vec<usize> {
        let end = end.min(self.records.len());
        let mut changed = Vec::new();
        if start >= end {
            return changed;
        }

        let mut counter = if start == 0 {
            0
        } else {
            self.records[start - 1].order_number
        };
        let mut was_copy = false;

        for index in start..end {
            let follows_original = !was_copy
                && index > 0
                && self.records[index].copy_of.is_some()
                && self.records[index].copy_of == self.records[index - 1].id;

            let number = if follows_original {
                was_copy = true;
                self.records[index - 1].order_number
            } else {
                was_copy = false;
                counter += 1;
                counter
            };

            let record = &mut self.records[index];
            if record.order_number != number {
                record.update_order_number(number);
                changed.push(index);
            }
        }
        changed
    }

    /// Repairs a list read back from a store that may hold a partially applied
    /// mutation: stray copies are dropped, pair links are rebuilt and the whole
    /// list is renumbered.
    pub fn normalize(&mut self) -> Normalization {
        let index_of: HashMap<PhotoId, usize> = self
            .records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| record.id.map(|id| (id, index)))
            .collect();
        let original_at = |id: PhotoId| {
            index_of
                .get(&id)
                .map(|&index| &self.records[index])
                .filter(|record| !record.is_copy())
        };

        // Links recorded on both sides win over one-sided ones.
        let mut claimed: HashMap<PhotoId, PhotoId> = HashMap::new();
        for record in &self.records {
            let (Some(id), Some(original_id)) = (record.id, record.copy_of) else {
                continue;
            };
            if original_at(original_id).is_some_and(|original| original.has_copy == Some(id)) {
                claimed.insert(original_id, id);
            }
        }

        let mut stray: BTreeSet<usize> = BTreeSet::new();
        for (index, record) in self.records.iter().enumerate() {
            let (Some(id), Some(original_id)) = (record.id, record.copy_of) else {
                continue;
            };
            match claimed.get(&original_id) {
                Some(&owner) if owner == id => {}
                Some(_) => {
                    stray.insert(index);
                }
                None if original_at(original_id).is_some() => {
                    claimed.insert(original_id, id);
                }
                None => {
                    stray.insert(index);
                }
            }
        }

        let mut relinked: BTreeSet<PhotoId> = BTreeSet::new();
        for record in &mut self.records {
            let Some(id) = record.id else {
                continue;
            };
            let wanted = if record.is_copy() {
                None
            } else {
                claimed.get(&id).copied()
            };
            if record.has_copy != wanted {
                record.has_copy = wanted;
                relinked.insert(id);
            }
        }

        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.records.len());
        for (index, record) in std::mem::take(&mut self.records).into_iter().enumerate() {
            if stray.contains(&index) {
                removed.push(record);
            } else {
                kept.push(record);
            }
        }

        *self = Self::from_records(kept);
        let len = self.records.len();
        let mut updated: BTreeSet<usize> = self.renumber_range(0, len).into_iter().collect();
        updated.extend(
            self.records
                .iter()
                .enumerate()
                .filter(|(_, record)| record.id.is_some_and(|id| relinked.contains(&id)))
                .map(|(index, _)| index),
        );

        Normalization {
            removed,
            updated: updated.into_iter().collect(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen: BTreeSet<PhotoId> = BTreeSet::new();
        let mut expected = 0_u32;

        for (index, record) in self.records.iter().enumerate() {
            if let Some(id) = record.id {
                if !seen.insert(id) {
                    return Err(broken(format!("duplicate id {id}")));
                }
            }

            match record.copy_of {
                Some(original_id) => {
                    let original = index
                        .checked_sub(1)
                        .map(|previous| &self.records[previous])
                        .filter(|previous| previous.id == Some(original_id))
                        .ok_or_else(|| {
                            broken(format!("copy at {index} does not follow its original"))
                        })?;
                    if original.has_copy != record.id {
                        return Err(broken(format!(
                            "original {original_id} does not link its copy"
                        )));
                    }
                    if record.has_copy.is_some() {
                        return Err(broken(format!("copy at {index} has a copy")));
                    }
                    if record.order_number != original.order_number {
                        return Err(broken(format!(
                            "copy at {index} is numbered {} but its original is {}",
                            record.order_number, original.order_number
                        )));
                    }
                }
                None => {
                    expected += 1;
                    if record.order_number != expected {
                        return Err(broken(format!(
                            "photo at {index} is numbered {} but should be {expected}",
                            record.order_number
                        )));
                    }
                    if record.has_copy.is_some() {
                        let next = self.records.get(index + 1);
                        if next.map(|next| next.id) != Some(record.has_copy) {
                            return Err(broken(format!(
                                "copy of photo at {index} is not next to it"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn block_bounds(&self, index: usize) -> (usize, usize) {
        let record = &self.records[index];
        if record.copy_of.is_some()
            && index > 0
            && self.records[index - 1].id == record.copy_of
        {
            return (index - 1, 2);
        }
        if record.has_copy.is_some()
            && self
                .records
                .get(index + 1)
                .is_some_and(|next| next.id == record.has_copy)
        {
            return (index, 2);
        }
        (index, 1)
    }
}

fn broken(message: String) -> DomainError {
    DomainError::BrokenInvariant(message)
}
