fn main() -> std::process::ExitCode {
    fraudfinder::run()
}
