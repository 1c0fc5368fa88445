#![deny(unsafe_code)]

use mimalloc::MiMalloc;

/// High-performance memory allocator for improved allocation throughput.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::{env, io, process};

fn main() -> process::ExitCode {
    let status = {
        let mut stdout = io::stdout().lock();
        let mut stderr = io::stderr().lock();
        cli::run(env::args_os(), &mut stdout, &mut stderr)
    };

    if status == cli::ExitCode::LockIntegrity.as_i32() {
        eprintln!("goanysync: lock integrity fault, aborting");
        process::abort();
    }
    cli::exit_code_from(status)
}
