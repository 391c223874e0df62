//! Verify, dump, and sign PDF digital signatures.
//!
//! Usage:
//!   pdfsig [options] <PDF-file> [<output-file>]
//!
//! Set `RUST_LOG=debug` for diagnostics.

use pdfsig::cli::{parse_args, usage_text, version_text, Invocation};
use pdfsig::dispatch::SigningDispatcher;
use pdfsig::error::Error;
use pdfsig::request::OperationRequest;
use pdfsig::scanner::ScanOpener;
use pdfsig::store::DirectoryStore;
use std::io::{self, Write};
use std::process;

fn main() {
    env_logger::init();

    let code = match parse_args(std::env::args().skip(1)) {
        Ok(Invocation::Version) => {
            eprint!("{}", version_text());
            0
        },
        Ok(Invocation::Help) => {
            eprint!("{}", usage_text());
            0
        },
        Ok(Invocation::Run(request)) => run(&request),
        Err(e) => report(&e),
    };
    process::exit(code);
}

fn run(request: &OperationRequest) -> i32 {
    let opener = ScanOpener;
    let mut store = DirectoryStore::new(request.config.store.directory.as_deref());
    log::debug!("Using credential store {}", store.directory().display());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = SigningDispatcher::new(&opener, &mut store).run(request, &mut out);
    let _ = out.flush();
    match result {
        Ok(()) => 0,
        Err(e) => report(&e),
    }
}

/// Print `e` once and return its exit code.
fn report(e: &Error) -> i32 {
    log::debug!("Exiting with {:?}", e);
    match e {
        Error::MissingOutputPath => eprintln!("{}", e),
        // Precondition and operation failures go with the regular output
        _ if matches!(e.exit_code(), 2 | 3) => println!("{}", e),
        _ => eprintln!("{}", e),
    }
    if e.wants_usage() {
        eprint!("{}", usage_text());
    }
    e.exit_code()
}
