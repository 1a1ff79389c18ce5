//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `jotter_core` linkage.
//! - Keep output deterministic for quick local sanity checks.
//!
//! The real interactive front end lives outside this repository and talks
//! to the engine through `NoteService`.

fn main() {
    println!("jotter_core version={}", jotter_core::core_version());
}
