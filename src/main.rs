/*!
# native-store

Command-line access to the sealing applied to encrypted members, mainly for
inspecting persisted values by hand.

## Usage

```
native-store [OPTIONS] <COMMAND>

Commands:
  seal    Seals TEXT and prints the sealed value
  unseal  Opens a sealed TEXT and prints the plain text

Options:
  -k, --key <KEY>                Encryption key
      --log-format <LOG_FORMAT>  Log output format [default: text] [possible values: text, json]
      --log-level <LOG_LEVEL>    Log level filter, overridden by RUST_LOG [default: warn]
  -h, --help                     Print help
  -V, --version                  Print version
```

## Configuration

- `NATIVE_STORE_ENCRYPTION_KEY`: default key when `--key` is not given
- `RUST_LOG`: log filter, takes precedence over `--log-level`
*/

use native_store::cli::{CliArgs, Command};
use native_store::constants::{PLACEHOLDER_CIPHER_WARNING, TRACING_ROOT_SPAN_NAME, TRACING_SERVICE_NAME};
use native_store::errors::StoreResult;
use native_store::logging::{self, LogFormat};
use native_store::StoreResolver;
use tracing::{debug, info, info_span};

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}

fn run() -> StoreResult<()> {
    let args = CliArgs::parse();

    logging::init_tracing(LogFormat::parse(&args.log_format)?, &args.log_level)?;

    let root_span = info_span!(TRACING_ROOT_SPAN_NAME, service_name = TRACING_SERVICE_NAME);
    let _guard = root_span.enter();

    info!("Starting native-store");
    debug!(command = ?args.command, key_given = args.key.is_some(), "Parsed CLI arguments");

    eprintln!("{}", PLACEHOLDER_CIPHER_WARNING);

    let resolver = StoreResolver::new(args.key.as_deref())?;
    let output = match &args.command {
        Command::Seal { text } => resolver.seal(text)?,
        Command::Unseal { text } => resolver.unseal(text)?,
    };
    println!("{}", output);

    info!("Done");
    Ok(())
}
