//! # The Backend Contract
//!
//! The traits every storage backend implements, and the handle traits its
//! operations hand back.
//!
//! ## Contract Pieces
//!
//! | Trait | Role | Produced by |
//! |-------|------|-------------|
//! | [`FileSystem`] | One rooted namespace: create/open/copy/move/remove over backend-local paths | mounted via [`Volume`](crate::Volume) or built directly |
//! | [`Entity`] | Handle to one node (file or directory) with a children snapshot | [`FileSystem::open`] / [`FileSystem::create`] |
//! | [`File`] | Byte-level operations on a file entity | [`Entity::as_file`] |
//!
//! ## Files and Directories
//!
//! Backends return every handle as `Box<dyn Entity>`. An entity is tagged by
//! [`Entity::is_dir`]; the byte-level [`File`] surface is reached through the
//! fallible [`Entity::as_file`] accessor, which returns `None` for
//! directories. There is no panicking downcast anywhere in the contract.
//!
//! ```rust
//! use volumefs::{Entity, File};
//!
//! fn read_first_byte(entity: &mut dyn Entity) -> Option<u8> {
//!     let file = entity.as_file()?;
//!     let mut byte = [0u8; 1];
//!     match file.read(&mut byte, 0) {
//!         Ok(1) => Some(byte[0]),
//!         _ => None,
//!     }
//! }
//! ```
//!
//! ## Streaming Copy
//!
//! [`File::copy_from`] is a provided method: it moves content between any two
//! file entities in chunks of at most [`COPY_CHUNK_SIZE`] bytes, using only
//! `read` and `write` at explicit offsets. Backends get cross-backend copy
//! support without knowing anything about each other's storage medium.
//!
//! ## Thread Safety
//!
//! [`FileSystem`] implementations are `Send + Sync`: the router shares them
//! behind `Arc` and may call in from any thread (its critical section ensures
//! the calls never overlap). Entities are `Send` but not `Sync` — a handle is
//! owned by one caller and mutated through `&mut self`.
//!
//! ## Object Safety
//!
//! All three traits are object-safe: the router stores `Arc<dyn FileSystem>`
//! and returns `Box<dyn Entity>`.

mod entity;
mod filesystem;

pub use entity::{COPY_CHUNK_SIZE, Entity, File};
pub use filesystem::FileSystem;
