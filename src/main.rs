fn main() {
    if let Err(err) = tidewell_lib::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
