fn main() {
    if let Err(err) = vault_canvas::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
