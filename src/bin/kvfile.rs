use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use kvfile::{Error, Format, KeyValueFile};
use log::debug;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kvfile", author, version, about, long_about = None)]
struct Options {
    #[arg(short, long, default_value = "kvfile", help = "PATH (extension is added if missing)")]
    file: PathBuf,
    #[arg(short = 'F', long, value_enum, default_value_t = FormatArg::Json)]
    format: FormatArg,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum FormatArg {
    Json,
    Msgpack,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Format::json(),
            FormatArg::Msgpack => Format::msgpack(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set the value of a key
    Set(Set),
    /// Print the value of a key as JSON
    Get(Get),
    /// Print all keys, sorted
    Keys,
    /// Print the whole mapping as JSON
    Dump,
    /// Remove a given key
    Rm(Remove),
    /// Delete the data file
    Truncate,
}

#[derive(Args, Debug)]
struct Set {
    key: String,
    value: String,
    /// Parse VALUE as JSON instead of storing it as a string
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct Get {
    key: String,
}

#[derive(Args, Debug)]
struct Remove {
    key: String,
}

fn main() -> anyhow::Result<()> {
    // log init
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(record.level()),
                record.module_path().unwrap_or("<unnamed>"),
                &record.args()
            )
        })
        .init();

    let options = Options::parse();
    debug!("{:?}", options);

    let store = KeyValueFile::open(&options.file, options.format.into());

    match options.command {
        Commands::Set(Set { key, value, json }) => {
            if json {
                let value: serde_json::Value =
                    serde_json::from_str(&value).context("VALUE is not valid JSON")?;
                store.set(key, value)?;
            } else {
                store.set(key, value)?;
            }
        }
        Commands::Get(Get { key }) => match store.get(key) {
            Ok(value) => println!("{}", value),
            Err(Error::NotFound { .. }) => {
                print!("Key not found");
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
        Commands::Keys => {
            for key in store.keys()? {
                println!("{}", key);
            }
        }
        Commands::Dump => {
            println!("{}", serde_json::to_string_pretty(&store.read()?)?);
        }
        Commands::Rm(Remove { key }) => match store.remove(key) {
            Ok(()) => {}
            Err(Error::NotFound { .. }) => {
                print!("Key not found");
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
        Commands::Truncate => store.truncate()?,
    }
    Ok(())
}
