fn main() {
    if let Err(err) = dynappend::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
