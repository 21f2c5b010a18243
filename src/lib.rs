//! Chess rules engine for boards of up to 8x8 squares: movement rules built
//! from a small combinator language, move validation with check detection,
//! algebraic notation and a reversible per-ply history.
//!
//! The [`chess`] module is the library surface, [`Engine`] drives it through a
//! line-based text protocol.

// Rustdoc lints.
#![warn(
    rustdoc::missing_crate_level_docs,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::bare_urls
)]
// Performance is extremely important.
#![deny(clippy::perf)]

pub mod chess;

mod engine;
pub use engine::Engine;
use shadow_rs::shadow;

shadow!(build);

/// Returns the full engine version that can be used to identify how it was
/// built in the first place.
fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints information about the engine version and author on startup.
pub fn print_engine_info() {
    println!("Gambit chess rules engine {}", engine_version());
    println!("Authors: {}", env!("CARGO_PKG_AUTHORS"));
}

/// Prints the build type and whether the build is clean on startup.
pub fn print_binary_info() {
    println!("Release build: {}", !shadow_rs::is_debug());
    if !shadow_rs::git_clean() {
        println!("Warning: built with uncommitted changes");
    }
    println!();
}
