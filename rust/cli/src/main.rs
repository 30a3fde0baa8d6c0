use std::io;

fn main() {
    tablelog_cli::logging::init_logging();
    let code = tablelog_cli::run(std::env::args(), &mut io::stdout(), &mut io::stderr());
    std::process::exit(code);
}
