fn main() {
    if let Err(err) = menu_metrics::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
