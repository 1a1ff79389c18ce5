//! Use-case services over the note store.

pub mod note_service;
