use std::fs::File;
use std::io::{BufRead, BufReader, Write as _};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bencodec::{DEFAULT_MAX_DEPTH, Decoder, Value, decoding::Chunker, encoding::Encoder};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Parser)]
#[command(version, about="bencode-canon\n\n\
    Rewrites bencode provided either through stdin or as a list of file paths into its\n\
    canonical form: dictionary keys sorted, duplicate keys collapsed. Every value in the\n\
    input is rewritten in order.")]
struct Args {
    /// Only check that the input is already canonical and print nothing.
    /// Default: false
    #[arg(short, long)]
    check: bool,

    /// Deepest nesting of lists and dictionaries to accept.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log more; repeat for even more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// List of file paths to read bencode from.
    /// Listens to stdin if no file paths are provided.
    file_paths: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.file_paths.is_empty() {
        let stdin = std::io::stdin().lock();
        canonicalize(stdin, &args, "stdin")?;
    } else {
        for p in &args.file_paths {
            let file = File::open(p).context(format!("Could not read file from path: {:?}", p))?;
            canonicalize(
                BufReader::new(file),
                &args,
                p.display().to_string().as_str(),
            )?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn canonicalize<R: BufRead>(input: R, args: &Args, source: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    let chunker = Chunker::new(input).with_max_depth(args.max_depth);

    for (index, chunk) in chunker.enumerate() {
        let chunk = chunk.context(format!("Could not split {:?} into bencode values", source))?;

        let mut value = Value::default();
        Decoder::new(&chunk[..])
            .with_max_depth(args.max_depth)
            .decode(&mut value)
            .context(format!("Could not parse value {} of {:?} as bencode", index, source))?;
        let canonical = reencode(&value, args.max_depth)
            .context(format!("Could not re-encode value {} of {:?}", index, source))?;
        tracing::debug!(source, index, len = chunk.len(), "rewrote value");

        if args.check {
            if canonical != chunk {
                bail!("Value {} of {:?} is not canonical bencode", index, source);
            }
        } else {
            stdout.write_all(&canonical)?;
        }
    }

    stdout.flush()?;
    tracing::info!(source, "done");
    Ok(())
}

fn reencode(value: &Value, max_depth: usize) -> Result<Vec<u8>, bencodec::EncodeError> {
    let mut encoder = Encoder::new().with_max_depth(max_depth);
    encoder.emit(value)?;
    encoder.finish()
}
