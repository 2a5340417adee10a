mod cli;
mod terminal;

fn main() {
    if let Err(e) = cli::run() {
        // Flow failures have already been shown as a notice.
        if e.downcast_ref::<cli::FlowFailed>().is_none() {
            eprintln!("{e:#}"); // pretty anyhow chain
        }
        std::process::exit(1);
    }
}
