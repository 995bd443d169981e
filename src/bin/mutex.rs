//! `mutex` variant: the shared list sits behind one global mutex that every
//! operation holds exclusively.
//!
//! ```bash
//! cargo run --release --bin mutex -- n m mMember mInsert mDelete num_threads [seed] case_id
//! ```
//!
//! Prints one CSV row per trial: `case_id,mutex,num_threads,trial,elapsed_us,seed`.

use std::process::ExitCode;

use clap::Parser;
use rwlist::MutexList;
use rwlist::cli::{ConcurrentArgs, run_concurrent};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    rwlist::init_tracing();
    run_concurrent::<MutexList>(&ConcurrentArgs::parse())
}
