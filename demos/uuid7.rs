//! Simple command that prints one or '-n count' UUIDv7 (or, with '-4', UUIDv4) strings

use std::{env, io, io::Write, process::ExitCode};

struct Options {
    count: usize,
    v4: bool,
}

fn main() -> io::Result<ExitCode> {
    let opts = {
        let mut args = env::args();
        let program = args.next();
        match parse_args(args) {
            Ok(opts) => opts,
            Err(message) => {
                eprintln!("Error: {message}");
                eprintln!(
                    "Usage: {} [-4] [-n count]",
                    program.as_deref().unwrap_or("uuid7")
                );
                return Ok(ExitCode::FAILURE);
            }
        }
    };

    let mut buf = io::BufWriter::new(io::stdout());
    for _ in 0..opts.count {
        let generated = if opts.v4 {
            uuid_pool::uuid4()
        } else {
            uuid_pool::uuid7()
        };
        match generated {
            Ok(uuid) => writeln!(buf, "{uuid}")?,
            Err(err) => {
                buf.flush()?;
                eprintln!("Error: {err}");
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut count = None;
    let mut v4 = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-4" => v4 = true,
            "-n" => {
                if count.is_some() {
                    return Err("option 'n' given more than once".to_owned());
                }
                let Some(n_arg) = args.next() else {
                    return Err("argument to option 'n' missing".to_owned());
                };
                let Ok(c) = n_arg.parse() else {
                    return Err(format!("invalid argument to option 'n': '{n_arg}'"));
                };
                count.replace(c);
            }
            _ => return Err(format!("unrecognized argument '{arg}'")),
        }
    }
    Ok(Options {
        count: count.unwrap_or(1),
        v4,
    })
}
