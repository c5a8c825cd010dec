use std::process::exit;

use colored::Colorize;

/// Exit code for command line misuse, `EX_USAGE` from `sysexits`.
const EX_USAGE: i32 = 64;

fn main() {
    // The compiler takes no positional arguments.
    if std::env::args_os().nth(1).is_some() {
        eprintln!("{} too many arguments", "error:".red().bold());
        eprintln!("Usage: wave-compiler");
        exit(EX_USAGE);
    }

    println!("Wave compiler, version {}", wave::VERSION);
}
