use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use lanes::{
    CompilationOptions, CompiledProgram, Error, ExecutionOptions, NativeRegistry, Outcome, Value,
    Vm, render_error,
};
use miette::{Diagnostic, Result};
use thiserror::Error;
use tracing::debug;

/// Lanes - compile and run lane/card programs
#[derive(Parser, Debug)]
#[command(name = "lanes")]
#[command(about = "Compile and run Lanes programs", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a program description or a compiled artifact
    Run {
        file: PathBuf,

        /// Lane to start from (defaults to `main`, then the first lane)
        #[arg(long)]
        entry: Option<String>,

        #[arg(long)]
        max_instructions: Option<u64>,

        #[arg(long)]
        max_call_depth: Option<usize>,

        /// Print the operand stack left behind by the run
        #[arg(long)]
        print_stack: bool,
    },
    /// Compile a program description into an artifact
    Compile {
        file: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(long)]
        entry: Option<String>,
    },
    /// Print the instruction listing of a program
    Disasm { file: PathBuf },
}

#[derive(Debug, Error, Diagnostic)]
enum CliError {
    #[error("failed to read `{}`", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write `{}`", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{}` is not valid UTF-8", .path.display())]
    NotUtf8 { path: PathBuf },

    #[error("compilation failed")]
    #[diagnostic(help("see the report above"))]
    Compile,

    #[error(transparent)]
    Lanes(#[from] Error),

    #[error("program aborted")]
    Aborted,
}

/// Compiled artifacts are binary; descriptions are JSON objects.
fn is_description(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|byte| !byte.is_ascii_whitespace())
        .is_some_and(|&byte| byte == b'{')
}

fn load(path: &Path, options: &CompilationOptions) -> Result<CompiledProgram, CliError> {
    let bytes = std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })?;

    if !is_description(&bytes) {
        debug!(path = %path.display(), "Loading compiled artifact");
        return Ok(CompiledProgram::from_bytes(&bytes).map_err(Error::from)?);
    }

    let source = std::str::from_utf8(&bytes).map_err(|_| CliError::NotUtf8 {
        path: path.to_owned(),
    })?;
    lanes::compile(&bytes, options).map_err(|err| {
        render_error(&err.into(), source);
        CliError::Compile
    })
}

fn host_functions<'f>() -> NativeRegistry<'f> {
    let mut natives = NativeRegistry::new();
    natives.register("console_log", 1, |args: &[Value]| {
        println!("{}", args[0]);
        Ok(None)
    });
    natives
}

fn run(
    file: &Path,
    compilation: CompilationOptions,
    execution: ExecutionOptions,
    print_stack: bool,
) -> Result<(), CliError> {
    let program = load(file, &compilation)?;
    let natives = host_functions();
    let mut vm = Vm::with_options(&natives, execution);

    let outcome = vm.run(&program).map_err(Error::from)?;
    debug!(?outcome, executed = vm.instructions_executed(), "Done");

    if print_stack {
        for value in vm.stack() {
            println!("{:?}", value);
        }
    }
    match outcome {
        Outcome::Finished => Ok(()),
        Outcome::Aborted => Err(CliError::Aborted),
    }
}

fn compile(file: &Path, output: &Path, options: CompilationOptions) -> Result<(), CliError> {
    let program = load(file, &options)?;
    let bytes = program.to_bytes().map_err(Error::from)?;
    std::fs::write(output, bytes).map_err(|source| CliError::Write {
        path: output.to_owned(),
        source,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG to control the log level, defaulting to WARN
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let compilation = |entry: Option<String>| CompilationOptions { entry_lane: entry };

    match args.command {
        Command::Run {
            file,
            entry,
            max_instructions,
            max_call_depth,
            print_stack,
        } => {
            let defaults = ExecutionOptions::default();
            let execution = ExecutionOptions {
                max_instructions: max_instructions.or(defaults.max_instructions),
                max_call_depth: max_call_depth.unwrap_or(defaults.max_call_depth),
                ..defaults
            };
            run(&file, compilation(entry), execution, print_stack)?;
        }
        Command::Compile {
            file,
            output,
            entry,
        } => compile(&file, &output, compilation(entry))?,
        Command::Disasm { file } => {
            let program = load(&file, &CompilationOptions::default())?;
            println!("{:?}", program);
        }
    }

    Ok(())
}
