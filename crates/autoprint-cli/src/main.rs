mod cli;

fn main() {
    // Parse CLI, set up logging, and run the pipeline. Exit only after every
    // resource of the run (temp output dir included) has been released.
    let code = cli::run_from_args();
    std::process::exit(code);
}
