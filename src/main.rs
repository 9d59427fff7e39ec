fn main() {
    if let Err(e) = local_reason::cli::main() {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
