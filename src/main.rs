use std::io::{self, Write};
use std::path::PathBuf;
use std::{fs, process};

use anyhow::{bail, Context, Error};
use clap::ArgMatches;
use minijinja::{context, Environment, Error as MError, Value};

use crate::config::Config;
use crate::data::STDIN_STDOUT;
use crate::output::Output;

mod cli;
mod config;
mod data;
mod output;
mod repl;
mod sample;

fn assemble_context(config: &Config, file_ctx: Option<Value>) -> Value {
    // earlier spreads win: defines override the data file, which in turn
    // overrides the built-in sample context.
    let base = match (file_ctx, config.sample()) {
        (Some(file), true) => context!(..file, ..sample::context()),
        (Some(file), false) => file,
        (None, true) => sample::context(),
        (None, false) => context! {},
    };
    context!(..config.defines(), ..base)
}

fn template_source(matches: &ArgMatches, stdin_used: bool) -> Result<(String, String), Error> {
    if let Some(source) = matches.get_one::<String>("template") {
        return Ok(("<string>".to_string(), source.clone()));
    }
    // mode dispatch sends invocations without --template and without the
    // positional to the REPL, so the positional is present here
    let path = matches.get_one::<String>("template_file").unwrap();
    if path == STDIN_STDOUT {
        if stdin_used {
            bail!("cannot load template from stdin when data is from stdin");
        }
        let source = io::read_to_string(io::stdin()).context("failed to read template from stdin")?;
        Ok(("<stdin>".to_string(), source))
    } else {
        let source = fs::read_to_string(path)
            .with_context(|| format!("unable to read template '{}'", path))?;
        Ok((path.clone(), source))
    }
}

fn execute() -> Result<i32, Error> {
    let matches = cli::make_command().get_matches();

    let mut config = Config::default();
    config.update_from_env()?;
    config.update_from_matches(&matches)?;

    let (file_ctx, stdin_used) = match matches.get_one::<PathBuf>("data") {
        Some(path) => {
            let (value, stdin_used) = data::load_file(path)?;
            (Some(value), stdin_used)
        }
        None => (None, false),
    };
    let ctx = assemble_context(&config, file_ctx);

    let expr = matches.get_one::<String>("expr");
    let want_repl = matches.get_flag("repl")
        || (expr.is_none()
            && matches.get_one::<String>("template").is_none()
            && matches.get_one::<String>("template_file").is_none());
    if want_repl {
        if stdin_used {
            bail!("cannot start the console when data is read from stdin");
        }
        let mut env = Environment::new();
        config.apply_to_env(&mut env);
        repl::run(env, ctx)?;
        return Ok(0);
    }

    // resolved before the environment so that the environment (which
    // borrows the template source) drops first.
    let template = match expr {
        Some(_) => None,
        None => Some(template_source(&matches, stdin_used)?),
    };

    let mut output = Output::new(matches.get_one::<PathBuf>("output").unwrap())?;
    let mut env = Environment::new();
    config.apply_to_env(&mut env);

    match (expr, &template) {
        (Some(expr), _) => {
            let rv = env.compile_expression(expr)?.eval(ctx)?;
            match config.expr_out() {
                "print" => writeln!(&mut output, "{}", rv)?,
                "json" => writeln!(&mut output, "{}", serde_json::to_string(&rv)?)?,
                "json-pretty" => writeln!(&mut output, "{}", serde_json::to_string_pretty(&rv)?)?,
                _ => unreachable!(),
            }
        }
        (None, Some((name, source))) => {
            env.add_template(name, source)?;
            let result = env.get_template(name)?.render(ctx)?;
            if config.newline() {
                writeln!(&mut output, "{result}")?;
            } else {
                write!(&mut output, "{result}")?;
            }
        }
        (None, None) => unreachable!(),
    }

    output.commit()?;
    Ok(0)
}

pub fn print_error(err: &Error) {
    eprintln!("error: {err}");
    if let Some(err) = err.downcast_ref::<MError>() {
        if err.name().is_some() {
            eprintln!("{}", err.display_debug_info());
        }
    }
    let mut source_opt = err.source();
    while let Some(source) = source_opt {
        eprintln!();
        eprintln!("caused by: {source}");
        if let Some(source) = source.downcast_ref::<MError>() {
            if source.name().is_some() {
                eprintln!("{}", source.display_debug_info());
            }
        }
        source_opt = source.source();
    }
}

fn main() {
    match execute() {
        Ok(code) => process::exit(code),
        Err(err) => {
            print_error(&err);
            process::exit(1);
        }
    }
}
