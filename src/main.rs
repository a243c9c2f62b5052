fn main() -> Result<(), eframe::Error> {
    // Configure with RUST_LOG, e.g. RUST_LOG=whiteboard_canvas=debug
    env_logger::init();

    whiteboard_canvas::run_app()
}
