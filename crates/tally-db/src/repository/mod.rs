//! # Repository Module
//!
//! Database repository implementations for Tally POS.
//!
//! ## Storage Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Operations by repository                             │
//! │                                                                         │
//! │  ItemRepository                                                        │
//! │  ├── load_items(shop)             catalog in display order             │
//! │  └── replace_items(shop, items)   delete-all + insert-all, one tx      │
//! │                                                                         │
//! │  TransactionRepository                                                 │
//! │  ├── load(shop)                   every transaction, any order         │
//! │  ├── get_by_id(shop, id)                                               │
//! │  ├── insert(shop, tx)             fails on duplicate id                │
//! │  └── update(shop, tx)             replaces by id, fails if absent      │
//! │                                                                         │
//! │  CounterRepository                                                     │
//! │  └── next_daily_number(shop, day) atomic upsert-increment              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each operation is atomic on its own. Callers sequence them; nothing here
//! retries.

pub mod counter;
pub mod item;
pub mod transaction;
