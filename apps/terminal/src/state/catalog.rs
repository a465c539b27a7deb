//! # Catalog State
//!
//! The shop's item list as the terminal currently shows it.
//!
//! Catalog writes are optimistic: the change is applied here first, then
//! written through `replace_items`. If the write fails the previous
//! snapshot is put back exactly.

use std::sync::{Arc, Mutex};

use tally_core::Item;

#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    items: Arc<Mutex<Vec<Item>>>,
}

impl CatalogState {
    pub fn new() -> Self {
        CatalogState::default()
    }

    pub fn with_items<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[Item]) -> R,
    {
        let items = self.items.lock().expect("Catalog mutex poisoned");
        f(&items)
    }

    pub fn with_items_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Vec<Item>) -> R,
    {
        let mut items = self.items.lock().expect("Catalog mutex poisoned");
        f(&mut items)
    }

    /// Copy of the current list.
    pub fn snapshot(&self) -> Vec<Item> {
        self.with_items(<[Item]>::to_vec)
    }

    /// Replaces the whole list (after a load, or to roll back).
    pub fn restore(&self, items: Vec<Item>) {
        self.with_items_mut(|current| *current = items);
    }

    pub fn find(&self, id: &str) -> Option<Item> {
        self.with_items(|items| items.iter().find(|i| i.id == id).cloned())
    }

    pub fn len(&self) -> usize {
        self.with_items(<[Item]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
