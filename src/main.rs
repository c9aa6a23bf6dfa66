//! Mockito call-chain converter.
//!
//! Binary crate entry point. All CLI logic is in the `cli` module.

// mimalloc as global allocator: many short-lived parse trees and snapshots per run.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod cli;

fn main() {
    cli::run();
}
