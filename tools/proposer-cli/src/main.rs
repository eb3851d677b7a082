use std::path::Path;

use alloy_primitives::U256;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use safe_proposer::{
    chain::{ensure_chain_id, safe_nonce, ChainClient, ChainReader},
    config::Config,
    keystore::{load_signer, KeystoreSigner},
    relay::{SafeTransactionService, TransactionService},
    secret::resolve_secret,
    submit, ProposalBuilder, ProposalSigner, Submission,
};

mod commands;
mod logging;

use commands::Command;

/// Build, sign and propose a Safe multisig transaction.
///
/// Configuration comes from the environment (and `.env` in the working directory or its
/// parent): CHAIN_ID, SAFE_ADDRESS, RPC_URL, ETH_KEYSTORE_PATH, SAFE_TX_SERVICE_API_KEY,
/// optionally ETH_PASSWORD, SAFE_TX_SERVICE_URL and MULTISEND_ADDRESS.
#[derive(Parser, Debug)]
#[command(name = "propose", author, version, about)]
struct Cli {
    /// Use this Safe nonce instead of the current on-chain one (e.g. to queue behind a pending proposal).
    #[arg(long, global = true)]
    nonce: Option<u64>,

    /// Build and hash the proposal, then stop before unlocking the keystore.
    #[arg(long, global = true)]
    dry_run: bool,

    /// More logging on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();
    logging::init(cli.verbose);
    run(cli).await
}

/// `.env` in the working directory first, then its parent. Already-set variables win.
fn load_dotenv() {
    let _ = dotenv::from_path(Path::new(".env"));
    let _ = dotenv::from_path(Path::new("..").join(".env"));
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    tracing::debug!(?config, "loaded configuration");

    let chain = ChainClient::connect(&config.rpc_url)?;
    let relay = SafeTransactionService::from_config(&config);
    let unlock = || -> Result<KeystoreSigner> {
        let password = resolve_secret(
            config.env_password.as_deref().map(String::as_str),
            "Keystore password: ",
        )
        .context("failed reading keystore password")?;
        Ok(load_signer(&config.keystore_path, password, &config.rpc_url)?)
    };

    execute(&cli, &config, &chain, unlock, &relay).await?;
    Ok(())
}

/// Check the chain, build the proposal, then (unless dry-run) unlock a signer and submit.
///
/// The endpoint must serve `config.chain_id` before anything else is read from it, and
/// `unlock` only runs once the proposal is fully built and sequenced.
async fn execute<C, S, T, U>(cli: &Cli, config: &Config, chain: &C, unlock: U, relay: &T) -> Result<Option<Submission>>
where
    C: ChainReader + ?Sized,
    S: ProposalSigner,
    T: TransactionService + ?Sized,
    U: FnOnce() -> Result<S>,
{
    ensure_chain_id(chain, config.chain_id).await?;
    let plan = cli.command.plan(chain).await?;

    let proposal = ProposalBuilder::new(config.safe_address, config.chain_id)
        .multisend(config.multisend)
        .calls(plan.calls)
        .build()?;
    let nonce = match cli.nonce {
        Some(nonce) => U256::from(nonce),
        None => safe_nonce(chain, config.safe_address)
            .await
            .context("failed reading Safe nonce")?,
    };
    let proposal = proposal.with_nonce(nonce);

    println!("Prepared transactions:");
    for line in &plan.summary {
        println!("- {line}");
    }

    if cli.dry_run {
        println!("Safe {} nonce {}", config.safe_address, nonce);
        println!("Tx hash: {}", proposal.hash());
        return Ok(None);
    }

    let signer = unlock()?;
    let submission = submit(&proposal, &signer, relay).await?;

    println!("Proposed from Safe {} (nonce {})", config.safe_address, nonce);
    println!("Sender: {}", submission.sender);
    println!("Tx hash: {}", submission.proposal_hash);
    Ok(Some(submission))
}
