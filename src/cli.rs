use anyhow::{anyhow, bail, Context, Result};
use std::path::PathBuf;

use crate::models::Market;
use crate::pipeline::SourceFilter;

pub const USAGE: &str = "\
Usage: glove-market <command> [options]

Commands:
  stats                         counts, averages and breakdowns per market
  products [--source S]         merged product list (S: all, auction, cafe)
  latest                        newest live snapshot per market
  import <auction|cafe> <FILE>  store a scraped JSON array as a new snapshot

Options:
  --data-dir DIR   snapshot directory (default: data)
  --config FILE    JSON config file (or GLOVE_MARKET_CONFIG)
  --out FILE       also write the JSON result to FILE
  -h, --help       show this help
";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Stats,
    Products(SourceFilter),
    Latest,
    Import { market: Market, input: PathBuf },
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cli {
    pub command: Command,
    pub data_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub out: Option<PathBuf>,
}

/// Parse arguments, program name excluded.
pub fn parse_args<I>(args: I) -> Result<Cli>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut positional = Vec::new();
    let mut source = SourceFilter::All;
    let mut cli = Cli {
        command: Command::Help,
        data_dir: None,
        config: None,
        out: None,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => cli.data_dir = Some(value(&mut args, "--data-dir")?.into()),
            "--config" => cli.config = Some(value(&mut args, "--config")?.into()),
            "--out" | "-o" => cli.out = Some(value(&mut args, "--out")?.into()),
            "--source" | "-s" => {
                source = value(&mut args, "--source")?
                    .parse::<SourceFilter>()
                    .map_err(|e| anyhow!(e))?;
            }
            "-h" | "--help" => return Ok(cli),
            flag if flag.starts_with('-') => bail!("unknown option: {}", flag),
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    cli.command = match positional.next().as_deref() {
        None | Some("help") => Command::Help,
        Some("stats") => Command::Stats,
        Some("products") => Command::Products(source),
        Some("latest") => Command::Latest,
        Some("import") => {
            let market = positional
                .next()
                .context("import needs a market (auction or cafe)")?
                .parse::<Market>()
                .map_err(|e| anyhow!(e))?;
            let input = positional.next().context("import needs an input file")?;
            Command::Import {
                market,
                input: input.into(),
            }
        }
        Some(other) => bail!("unknown command: {}", other),
    };

    if let Some(extra) = positional.next() {
        bail!("unexpected argument: {}", extra);
    }

    Ok(cli)
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .with_context(|| format!("missing value for {}", flag))
}
