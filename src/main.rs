mod cli;

fn main() {
    if let Err(err) = cli::run() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}
