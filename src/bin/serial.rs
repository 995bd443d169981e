//! `serial` baseline: one thread, no lock, operations in workload order.
//!
//! ```bash
//! cargo run --release --bin serial -- n m mMember mInsert mDelete [seed] case_id
//! ```
//!
//! Prints one CSV row per trial: `case_id,serial,1,trial,elapsed_us,seed`.

use std::process::ExitCode;

use clap::Parser;
use rwlist::cli::{SerialArgs, run_serial};

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> ExitCode {
    rwlist::init_tracing();
    run_serial(&SerialArgs::parse())
}
