//! Design document mutations.
//!
//! Every operation validates before it touches the map, so a failed call
//! leaves the document exactly as it was.

use super::error::DocumentError;
use super::types::{DesignDocument, DesignEntry, LineItem, DEFAULT_DESIGN};

impl DesignDocument {
    /// Add a new named design. The name is trimmed; an existing key is a conflict.
    pub fn create_design(
        &mut self,
        name: &str,
        initial_items: Option<Vec<LineItem>>,
    ) -> Result<String, DocumentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DocumentError::InvalidDesignName);
        }
        if self.designs.contains_key(name) {
            return Err(DocumentError::DuplicateDesign(name.to_string()));
        }

        self.designs.insert(
            name.to_string(),
            DesignEntry::Items(initial_items.unwrap_or_default()),
        );
        Ok(name.to_string())
    }

    /// Move a design's entry to a new (trimmed) name
    pub fn rename_design(&mut self, old_name: &str, new_name: &str) -> Result<(), DocumentError> {
        let new_name = new_name.trim();
        if old_name.is_empty() || new_name.is_empty() {
            return Err(DocumentError::InvalidRename(
                "both designName and newDesignName are required".to_string(),
            ));
        }
        if old_name == new_name {
            return Err(DocumentError::InvalidRename(format!(
                "new name '{}' is the same as the current name",
                new_name
            )));
        }
        if self.designs.contains_key(new_name) {
            return Err(DocumentError::DuplicateDesign(new_name.to_string()));
        }

        let entry = self
            .designs
            .remove(old_name)
            .ok_or_else(|| DocumentError::DesignNotFound(old_name.to_string()))?;
        self.designs.insert(new_name.to_string(), entry);
        Ok(())
    }

    pub fn delete_design(&mut self, name: &str) -> Result<DesignEntry, DocumentError> {
        self.designs
            .remove(name)
            .ok_or_else(|| DocumentError::DesignNotFound(name.to_string()))
    }

    /// Append a line item, or replace the one at `edit_index`.
    ///
    /// The design (default `"default"`) is created on demand. Returns the
    /// design's items after the change.
    pub fn upsert_line_item(
        &mut self,
        design: Option<&str>,
        item: LineItem,
        edit_index: Option<i64>,
    ) -> Result<&[LineItem], DocumentError> {
        let design = design_key(design);
        let len = match self.designs.get(design) {
            Some(DesignEntry::Items(items)) => items.len(),
            Some(DesignEntry::Opaque(_)) => {
                return Err(DocumentError::NotItemList(design.to_string()))
            }
            None => 0,
        };

        let slot = match edit_index {
            Some(index) => {
                Some(checked_index(index, len).ok_or_else(|| DocumentError::InvalidIndex {
                    design: design.to_string(),
                    index,
                    len,
                })?)
            }
            None => None,
        };

        let entry = self
            .designs
            .entry(design.to_string())
            .or_insert_with(|| DesignEntry::Items(Vec::new()));
        let DesignEntry::Items(items) = entry else {
            return Err(DocumentError::NotItemList(design.to_string()));
        };
        match slot {
            Some(i) => items[i] = item,
            None => items.push(item),
        }
        Ok(items.as_slice())
    }

    /// Remove the item at `index`, shifting later items left. Returns the
    /// number of items left in the design.
    pub fn delete_line_item(
        &mut self,
        design: Option<&str>,
        index: i64,
    ) -> Result<usize, DocumentError> {
        let design = design_key(design);
        let not_found = || DocumentError::ItemNotFound {
            design: design.to_string(),
            index,
        };

        let items = match self.designs.get_mut(design) {
            Some(DesignEntry::Items(items)) => items,
            Some(DesignEntry::Opaque(_)) => {
                return Err(DocumentError::NotItemList(design.to_string()))
            }
            None => return Err(not_found()),
        };
        let i = checked_index(index, items.len()).ok_or_else(not_found)?;
        items.remove(i);
        Ok(items.len())
    }

    /// Drop every design; returns how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.designs.len();
        self.designs.clear();
        count
    }
}

fn design_key(design: Option<&str>) -> &str {
    match design {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_DESIGN,
    }
}

fn checked_index(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|i| *i < len)
}
