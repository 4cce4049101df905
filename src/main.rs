fn main() {
    if let Err(err) = explab_cli::run_cli() {
        eprintln!("explab: {err}");
        std::process::exit(1);
    }
}
