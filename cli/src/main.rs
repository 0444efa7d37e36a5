use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};

use arena_json::{EscapePolicy, Indent, ParseOptions, PrintOptions, Region, RegionOptions};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ajson", version, about = "Parse and pretty-print JSON through a reusable region")]
struct Args {
    /// Input files. Omit or use '-' to read from stdin.
    inputs: Vec<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Indentation: 'tab' or a number of spaces.
    #[arg(long, value_name = "N|tab", value_parser = parse_indent, default_value = "tab")]
    indent: Indent,

    /// Capacity of each region block in bytes.
    #[arg(long, value_name = "bytes", default_value_t = arena_json::constants::DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Keep escaped strings as raw views instead of decoding them.
    #[arg(long)]
    raw_escapes: bool,

    /// Maximum container nesting depth.
    #[arg(long, value_name = "number", default_value_t = arena_json::constants::MAX_DEPTH)]
    max_depth: usize,

    /// Re-parse the printed output and fail if the trees differ.
    #[arg(long)]
    check: bool,

    /// Report region statistics on stderr after each document.
    #[arg(long)]
    stats: bool,
}

#[derive(Debug)]
enum InputSource {
    Stdin,
    File(String),
}

impl InputSource {
    fn from_arg(input: &str) -> Self {
        match input {
            "-" => InputSource::Stdin,
            path => InputSource::File(path.to_string()),
        }
    }

    fn label(&self) -> &str {
        match self {
            InputSource::Stdin => "stdin",
            InputSource::File(path) => path,
        }
    }
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let sources: Vec<InputSource> = if args.inputs.is_empty() {
        vec![InputSource::Stdin]
    } else {
        args.inputs.iter().map(|arg| InputSource::from_arg(arg)).collect()
    };

    let parse_options = ParseOptions::new()
        .with_escapes(if args.raw_escapes {
            EscapePolicy::Raw
        } else {
            EscapePolicy::Decode
        })
        .with_max_depth(args.max_depth);
    let print_options = PrintOptions::new().with_indent(args.indent);
    let mut region = Region::with_options(&RegionOptions::new().with_block_size(args.block_size));

    with_output_writer(args.output.as_deref(), |writer| {
        for source in &sources {
            let input = read_input(source)?;
            process_document(
                writer,
                source,
                &input,
                &region,
                &parse_options,
                &print_options,
                &args,
            )?;
            if args.stats {
                report_stats(source, &region)?;
            }
            region.reset();
        }
        writer.flush()?;
        Ok(())
    })
}

fn process_document(
    writer: &mut dyn Write,
    source: &InputSource,
    input: &str,
    region: &Region,
    parse_options: &ParseOptions,
    print_options: &PrintOptions,
    args: &Args,
) -> Result<(), Box<dyn Error>> {
    let value = arena_json::parse_with_options(input, region, parse_options)
        .map_err(|err| format!("{}: {err}", source.label()))?;
    let printed = arena_json::to_string_with_options(&value, print_options);

    if args.check {
        let reparsed = arena_json::parse_with_options(&printed, region, parse_options)
            .map_err(|err| format!("{}: printed output failed to re-parse: {err}", source.label()))?;
        if reparsed != value {
            return Err(format!("{}: round-trip mismatch", source.label()).into());
        }
        debug!(input = source.label(), "round-trip check passed");
    }

    writer.write_all(printed.as_bytes())?;
    writer.write_all(b"\n")?;
    info!(
        input = source.label(),
        input_bytes = input.len(),
        output_bytes = printed.len() + 1,
        "document printed"
    );
    Ok(())
}

fn report_stats(source: &InputSource, region: &Region) -> Result<(), Box<dyn Error>> {
    let stats = serde_json::to_string(&region.stats())?;
    eprintln!("ℹ {} region {stats}", source.label());
    Ok(())
}

fn read_input(source: &InputSource) -> Result<String, Box<dyn Error>> {
    match source {
        InputSource::Stdin => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        InputSource::File(path) => {
            let bytes = fs::read(path).map_err(|err| format!("{path}: {err}"))?;
            String::from_utf8(bytes).map_err(|err| {
                format!(
                    "{path}: invalid utf-8 at offset {}",
                    err.utf8_error().valid_up_to()
                )
                .into()
            })
        }
    }
}

fn parse_indent(raw: &str) -> Result<Indent, String> {
    if raw.eq_ignore_ascii_case("tab") {
        return Ok(Indent::Tab);
    }
    raw.parse::<usize>()
        .map(Indent::Spaces)
        .map_err(|_| format!("Invalid indent \"{raw}\". Use 'tab' or a number of spaces"))
}

fn with_output_writer<F>(path: Option<&str>, f: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Box<dyn Error>>,
{
    match path {
        Some(path) if path != "-" => {
            let mut file = io::BufWriter::new(fs::File::create(path)?);
            f(&mut file)
        }
        _ => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            f(&mut handle)
        }
    }
}
