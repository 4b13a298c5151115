use anyhow::Result;
use env_logger::Env;
use std::path::PathBuf;
use vault_grant::apply::apply;
use vault_grant::cli::{parse, Command};
use vault_grant::config::Config;
use vault_grant::gen::gen;
use vault_grant::inspect::inspect;
use vault_grant::validate::validate_target;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = parse();

    match args.cmd {
        Command::Gen { file } => gen(&file)?,

        Command::Apply { file, dryrun } => apply(&file, dryrun)?,

        Command::Validate { file } => {
            // Validate the current directory if no file is given
            let target = file.unwrap_or_else(|| PathBuf::from("."));
            validate_target(&target)?
        }

        Command::Inspect { file } => {
            let config = Config::new(&file)?;
            inspect(&config)?
        }
    }

    Ok(())
}
