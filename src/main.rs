fn main() {
    if let Err(err) = wastekit::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
