//! `rwlock` variant: the shared list sits behind one global reader-writer
//! lock. Lookups take it in shared mode, inserts and deletes exclusively.
//!
//! ```bash
//! cargo run --release --bin rwlock -- n m mMember mInsert mDelete num_threads [seed] case_id
//! ```
//!
//! Prints one CSV row per trial: `case_id,rwlock,num_threads,trial,elapsed_us,seed`.

use std::process::ExitCode;

use clap::Parser;
use rwlist::RwLockList;
use rwlist::cli::{ConcurrentArgs, run_concurrent};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    rwlist::init_tracing();
    run_concurrent::<RwLockList>(&ConcurrentArgs::parse())
}
