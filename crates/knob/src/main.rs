//! Knob CLI
//!
//! Builds the demo configuration and either prints it or calls one of its
//! functions.

use std::io::{self, Write};

use knob::demo::{build_demo, Demo};
use knob::driver::{assign, call_path};
use knob::DEFAULT_COMMENT_COLUMN;

fn main() {
    knob::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "example" => {
            let mut column = DEFAULT_COMMENT_COLUMN;
            let mut assignments = Vec::new();
            let mut i = 2;
            while i < args.len() {
                match args[i].as_str() {
                    "--column" if i + 1 < args.len() => {
                        let Ok(n) = args[i + 1].parse() else {
                            eprintln!("error: --column expects a number, found '{}'", args[i + 1]);
                            std::process::exit(1);
                        };
                        column = n;
                        i += 2;
                    }
                    "--set" if i + 1 < args.len() => {
                        assignments.push(args[i + 1].as_str());
                        i += 2;
                    }
                    other => {
                        eprintln!("error: unexpected argument '{other}'");
                        eprintln!("Usage: knob example [--column N] [--set path=value]...");
                        std::process::exit(1);
                    }
                }
            }
            run_example(column, &assignments);
        }
        "call" => {
            if args.len() < 3 {
                eprintln!("Usage: knob call <path> [args...]");
                std::process::exit(1);
            }
            let literals: Vec<&str> = args[3..].iter().map(String::as_str).collect();
            run_call(&args[2], &literals);
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("error: unknown command '{other}'");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn demo() -> Demo {
    match build_demo() {
        Ok(demo) => demo,
        Err(err) => {
            eprintln!("error: failed to build demo configuration: {err}");
            std::process::exit(1);
        }
    }
}

fn run_example(column: usize, assignments: &[&str]) {
    let mut demo = demo();
    let root = demo.table.root();
    for assignment in assignments {
        if let Err(err) = assign(&mut demo.table, root, assignment) {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
    // show assigned values rather than the registration defaults
    demo.table.update_default(root);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = demo
        .table
        .write_contents(root, &mut out, "", column)
        .and_then(|()| out.flush())
    {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    for id in demo.table.validate(root) {
        let value = demo.table.as_string(id).unwrap_or_default();
        eprintln!(
            "warning: {} = {value} is outside its allowed range",
            demo.table.path_of(id)
        );
    }
}

fn run_call(path: &str, literals: &[&str]) {
    let mut demo = demo();
    // call errors are printed below, not by the table
    demo.table.set_error_channel(knob::silent_channel());
    let root = demo.table.root();
    match call_path(&mut demo.table, root, path, literals) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Knob - configuration symbol tables");
    println!();
    println!("Usage: knob <command> [options]");
    println!();
    println!("Commands:");
    println!("  example [--column N] [--set path=value]...");
    println!("                         Print the demo configuration");
    println!("  call <path> [args...]  Call a demo function, e.g. `knob call world.pop.grow 5`");
    println!("  help                   Show this message");
    println!();
    println!("Set RUST_LOG=knob_symbols=debug to trace registration and calls.");
}
