//! Domain types shared across Edemy crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod id;
pub mod pagination;
pub mod price;
pub mod slug;
pub mod user;
