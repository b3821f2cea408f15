//! End-to-end scenarios over realistic raws trees.

mod creature_raws;
mod item_raws;
