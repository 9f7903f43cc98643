use std::{env, fs, io, path::Path};

use ape::bytecode::disasm::{print_bc, print_bc_stats};
use ape::bytecode::{Bytecode, Compiler};
use ape::frontend::lexer::Lexer;
use ape::frontend::token_dumper::TokenDumper;
use ape::pipeline::{self, PipelineError};
use ape::repl;
use ape::runtime::VmConfig;

struct Options {
    tokens_only: bool,
    no_color: bool,
    pretty: bool,
    ast: bool,
    bytecode: bool,
    stats: bool,
    emit: bool,
}

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let has = |flag: &str| args.iter().any(|a| a == flag);

    if has("--help") || has("-h") {
        print_usage();
        return;
    }

    let opts = Options {
        tokens_only: has("--tokens"),
        no_color: has("--no-color"),
        pretty: has("--pretty"),
        ast: has("--ast"),
        bytecode: has("--bc") || has("--bytecode"),
        stats: has("--stats"),
        emit: has("--emit"),
    };

    // first non-flag argument is the filename
    let filename = args.iter().skip(1).find(|a| !a.starts_with('-'));

    match filename {
        Some(filename) => run_file(filename, &opts),
        None => {
            if args.len() == 1 {
                start_repl();
            } else {
                print_usage();
                std::process::exit(1);
            }
        }
    }
}

/// Log level comes from `APE_LOG` (e.g. `APE_LOG=debug`), default `warn`.
fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_env("APE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn start_repl() {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if let Err(e) = repl::start(stdin.lock(), &mut stdout, &VmConfig::default()) {
        eprintln!("I/O error: {}", e);
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("APE - a small expression language with a bytecode VM");
    println!();
    println!("Usage:");
    println!("  ape                        Start interactive REPL");
    println!("  ape <file.ape>             Compile and run a program");
    println!("  ape <file.apec>            Run a compiled bytecode file");
    println!("  ape --tokens <file.ape>    Show tokens only (--no-color, --pretty)");
    println!("  ape --ast <file.ape>       Print the parsed program");
    println!("  ape --bc <file>            Print bytecode and constants, then run");
    println!("  ape --stats <file>         Print bytecode statistics, then run");
    println!("  ape --emit <file.ape>      Write <file>.apec instead of running");
    println!("  ape --help, -h             Show this help");
    println!();
    println!("Set APE_LOG=debug (or trace) for VM and compiler logging.");
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

fn run_file(filename: &str, opts: &Options) {
    let path = Path::new(filename);
    match path.extension().and_then(|e| e.to_str()) {
        Some("ape") => {
            let source = fs::read_to_string(path)
                .unwrap_or_else(|e| fail(format!("Failed to read '{}': {}", filename, e)));
            run_source_file(&source, path, opts);
        }
        Some("apec") => {
            let bytes =
                fs::read(path).unwrap_or_else(|e| fail(format!("Failed to read '{}': {}", filename, e)));
            let bytecode = Bytecode::from_bytes(&bytes)
                .unwrap_or_else(|e| fail(format!("Invalid bytecode file '{}': {}", filename, e)));
            run_bytecode(&bytecode, opts);
        }
        _ => fail(format!("Error: expected a .ape or .apec file, got {}", filename)),
    }
}

fn dump_tokens(source: &str, no_color: bool, pretty: bool) {
    let tokens = Lexer::new(source).tokenize();
    let mut dumper = TokenDumper::new();

    if no_color {
        dumper = dumper.no_color();
    }
    if pretty {
        dumper = dumper.pretty();
    }

    dumper.dump(&tokens);
}

fn run_source_file(source: &str, path: &Path, opts: &Options) {
    if opts.tokens_only {
        dump_tokens(source, opts.no_color, opts.pretty);
        return;
    }

    let program = match pipeline::parse(source) {
        Ok(program) => program,
        Err(PipelineError::Parse(errors)) => {
            eprintln!("parser errors:");
            for err in errors {
                eprintln!("\t{}", err);
            }
            std::process::exit(1);
        }
        Err(e) => fail(e),
    };

    if opts.ast {
        println!("{}", program);
        return;
    }

    let mut compiler = Compiler::new();
    if let Err(e) = compiler.compile(&program) {
        fail(PipelineError::from(e));
    }
    let bytecode = compiler.into_bytecode();

    if opts.emit {
        let out = path.with_extension("apec");
        let bytes = bytecode
            .to_bytes()
            .unwrap_or_else(|e| fail(format!("Failed to encode bytecode: {}", e)));
        if let Err(e) = fs::write(&out, bytes) {
            fail(format!("Failed to write '{}': {}", out.display(), e));
        }
        println!("wrote {}", out.display());
        return;
    }

    run_bytecode(&bytecode, opts);
}

fn run_bytecode(bytecode: &Bytecode, opts: &Options) {
    if opts.bytecode {
        print_bc(bytecode);
    }
    if opts.stats {
        print_bc_stats(bytecode);
    }

    match pipeline::run_bytecode(bytecode, &VmConfig::default()) {
        Ok(Some(value)) => println!("{}", value),
        Ok(None) => {}
        Err(e) => fail(e),
    }
}
