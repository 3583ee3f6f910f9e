//! User-facing progress output for `--verbose`. Diagnostics go through `log`.

pub fn print_verbose(verbose: bool, msg: &str) {
    if verbose {
        eprintln!("Verbose: {}", msg);
    }
}
