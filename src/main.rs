fn main() {
    if let Err(err) = font_specimen_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
