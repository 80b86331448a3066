//! ijm: run image-analysis macros headlessly.

use ijmc::commands::{compile_file, dump_file, exit, lex_file, run_files};
use ijmc::options::{parse_run_options, RunOptions};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    let code = match command.as_str() {
        "run" => run(&args[2..]),
        "compile" => {
            if args.len() < 3 {
                eprintln!("Usage: ijm compile <file.ijm> [-o <file.ijmc>]");
                std::process::exit(exit::USAGE);
            }

            let mut output = None;
            let mut i = 3;
            while i < args.len() {
                if args[i] == "-o" && i + 1 < args.len() {
                    output = Some(args[i + 1].as_str());
                    i += 2;
                } else {
                    eprintln!("error: unexpected argument '{}'", args[i]);
                    std::process::exit(exit::USAGE);
                }
            }
            compile_file(&args[2], output)
        }
        "dump" => {
            if args.len() < 3 {
                eprintln!("Usage: ijm dump <file>");
                std::process::exit(exit::USAGE);
            }
            dump_file(&args[2])
        }
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: ijm lex <file>");
                std::process::exit(exit::USAGE);
            }
            lex_file(&args[2])
        }
        "help" | "--help" | "-h" => {
            print_usage();
            exit::OK
        }
        "version" | "--version" | "-V" => {
            println!("ijm {}", env!("CARGO_PKG_VERSION"));
            exit::OK
        }
        _ => {
            // A bare macro file runs with default options.
            let path = std::path::Path::new(command);
            if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("ijm") || ext.eq_ignore_ascii_case("ijmc"))
            {
                run(&args[1..])
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                exit::USAGE
            }
        }
    };

    std::process::exit(code);
}

fn run(args: &[String]) -> i32 {
    let options: RunOptions = match parse_run_options(args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("Usage: ijm run <files...> [options]");
            return exit::USAGE;
        }
    };
    ijmc::init_tracing(options.trace);
    run_files(&options)
}

fn print_usage() {
    println!("ijm: headless macro interpreter");
    println!();
    println!("Usage: ijm <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <files...>       Run macro files (.ijm source or .ijmc compiled)");
    println!("  compile <file.ijm>   Tokenize once and save a .ijmc file");
    println!("  dump <file>          Show the symbol table and token stream");
    println!("  lex <file>           Show one token per row");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Run options:");
    println!("  --macro=<name>       Run the named macro instead of the top level");
    println!("  --arg=<text>         Value returned by getArgument()");
    println!("  --stack=<n>          Value stack capacity (default 1000)");
    println!("  --max-args=<n>       Most arguments a user function takes (default 32)");
    println!("  --loose              Accept a missing ';' at the end of a line");
    println!("  --expandable-arrays  Grow arrays on out-of-range assignment");
    println!("  --trace              Log each executed line (RUST_LOG overrides)");
    println!("  --parallel, -j       Run several files concurrently");
    println!();
    println!("Compile options:");
    println!("  -o <path>            Output file (default: <file>.ijmc)");
    println!();
    println!("Exit codes:");
    println!("  0    finished, or the macro called exit");
    println!("  1    a diagnostic was reported");
    println!("  2    bad arguments, unreadable file or unknown macro");
    println!("  130  a dialog was canceled or the run was aborted");
    println!();
    println!("Examples:");
    println!("  ijm run analyze.ijm --arg=input.tif");
    println!("  ijm run tools.ijm --macro=\"Measure All\"");
    println!("  ijm run a.ijm b.ijm c.ijm -j");
    println!("  ijm compile analyze.ijm && ijm analyze.ijmc");
    println!("  IJM_LOG_TREE=1 ijm run slow.ijm --trace");
}
