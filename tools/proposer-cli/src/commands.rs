//! Governance commands. Each one turns its arguments into an ordered list of calls.

use std::{fs, path::PathBuf, str::FromStr};

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use safe_proposer::{
    abi::{keeper_role, IERC4626, IEVault, IEulerRouter, IPegStabilityModule, ISynth},
    chain::{read_call, ChainReader},
    parse_address, CallRequest,
};
use serde::Deserialize;

const MAX_LTV_BPS: i64 = 10_000;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Set the interest rate model of an EVault.
    Irm {
        /// EVault to reconfigure.
        vault: String,
        /// New interest rate model.
        irm: String,
    },

    /// Set borrow/liquidation LTV for a collateral on the nUSD vault.
    Ltv {
        collateral: String,
        #[arg(value_parser = clap::value_parser!(u16).range(0..=MAX_LTV_BPS))]
        borrow_ltv: u16,
        #[arg(value_parser = clap::value_parser!(u16).range(0..=MAX_LTV_BPS))]
        liquidation_ltv: u16,
        /// Seconds over which the liquidation LTV ramps down.
        ramp_duration: u32,
        #[arg(long, env = "NUSD_VAULT_ADDRESS")]
        vault: String,
    },

    /// Set the swap fees of a peg stability module.
    PsmFees {
        psm: String,
        #[arg(value_parser = parse_u256)]
        underlying_fee: U256,
        #[arg(value_parser = parse_u256)]
        synth_fee: U256,
    },

    /// Point the synth at a savings rate module (defaults to SAVINGS_RATE_ADDRESS).
    SetDsrVault {
        module: Option<String>,
        #[arg(long, env = "SYNTH_ADDRESS")]
        synth: String,
        #[arg(long, env = "SAVINGS_RATE_ADDRESS")]
        savings_rate: Option<String>,
    },

    /// Grant KEEPER_ROLE on the synth.
    SynthKeeper {
        keeper: String,
        #[arg(long, env = "SYNTH_ADDRESS")]
        synth: String,
    },

    /// Onboard a collateral on the synth vault: LTV, oracle route and resolved vault, in that order.
    SynthCollateral {
        collateral: String,
        /// Price oracle for the collateral's asset.
        oracle: String,
        #[arg(value_parser = clap::value_parser!(u16).range(0..=MAX_LTV_BPS))]
        borrow_ltv: u16,
        #[arg(value_parser = clap::value_parser!(u16).range(0..=MAX_LTV_BPS))]
        liquidation_ltv: u16,
        ramp_duration: u32,
        #[arg(long, env = "SYNTH_VAULT_ADDRESS")]
        synth_vault: Option<String>,
        #[arg(long, env = "NUSD_VAULT_ADDRESS", hide = true)]
        nusd_vault: Option<String>,
    },

    /// Propose arbitrary calls from a JSON file: `[{ "to", "data", "value"? }, ...]`.
    Batch { file: PathBuf },
}

/// Calls to propose plus one human-readable line per call.
#[derive(Debug)]
pub struct Plan {
    pub calls: Vec<CallRequest>,
    pub summary: Vec<String>,
}

impl Plan {
    fn new() -> Self {
        Self {
            calls: Vec::new(),
            summary: Vec::new(),
        }
    }

    fn push(&mut self, target: Address, call: impl SolCall, summary: String) {
        self.calls.push(CallRequest::new(target.to_string(), call.abi_encode()));
        self.summary.push(summary);
    }
}

#[derive(Debug, Deserialize)]
struct BatchEntry {
    to: String,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

fn parse_u256(raw: &str) -> Result<U256, String> {
    U256::from_str(raw.trim()).map_err(|e| format!("not a non-negative integer: {e}"))
}

fn parse_nonzero(raw: &str, label: &str) -> Result<Address> {
    let address = parse_address(raw).with_context(|| format!("invalid {label}"))?;
    if address == Address::ZERO {
        bail!("invalid {label}: zero address");
    }
    Ok(address)
}

impl Command {
    /// Resolve the command into calls. Arguments are validated before any chain read.
    pub async fn plan<R: ChainReader + ?Sized>(&self, chain: &R) -> Result<Plan> {
        let mut plan = Plan::new();
        match self {
            Command::Irm { vault, irm } => {
                let vault = parse_address(vault).context("invalid vault address")?;
                let irm = parse_address(irm).context("invalid IRM address")?;
                plan.push(
                    vault,
                    IEVault::setInterestRateModelCall { newModel: irm },
                    format!("setInterestRateModel({irm}) on vault {vault}"),
                );
            }
            Command::Ltv {
                collateral,
                borrow_ltv,
                liquidation_ltv,
                ramp_duration,
                vault,
            } => {
                let vault = parse_address(vault).context("invalid nUSD vault address")?;
                let collateral = parse_address(collateral).context("invalid collateral vault address")?;
                plan.push(
                    vault,
                    IEVault::setLTVCall {
                        collateral,
                        borrowLTV: *borrow_ltv,
                        liquidationLTV: *liquidation_ltv,
                        rampDuration: *ramp_duration,
                    },
                    format!("setLTV({collateral}, {borrow_ltv}, {liquidation_ltv}, {ramp_duration}) on nUSD vault {vault}"),
                );
            }
            Command::PsmFees {
                psm,
                underlying_fee,
                synth_fee,
            } => {
                let psm = parse_address(psm).context("invalid PSM module address")?;
                plan.push(
                    psm,
                    IPegStabilityModule::setFeesCall {
                        toUnderlyingFeeBPS: *underlying_fee,
                        toSynthFeeBPS: *synth_fee,
                    },
                    format!("setFees({underlying_fee}, {synth_fee}) on {psm}"),
                );
            }
            Command::SetDsrVault {
                module,
                synth,
                savings_rate,
            } => {
                let synth = parse_nonzero(synth, "SYNTH_ADDRESS")?;
                let module = match (module, savings_rate) {
                    (Some(raw), _) => parse_nonzero(raw, "savings rate module address")?,
                    (None, Some(raw)) => parse_nonzero(raw, "SAVINGS_RATE_ADDRESS")?,
                    (None, None) => bail!("missing savings rate module: pass it or set SAVINGS_RATE_ADDRESS"),
                };
                plan.push(
                    synth,
                    ISynth::setDsrVaultCall { dsrVault: module },
                    format!("setDsrVault({module}) on synth {synth}"),
                );
            }
            Command::SynthKeeper { keeper, synth } => {
                let synth = parse_nonzero(synth, "SYNTH_ADDRESS")?;
                let keeper = parse_nonzero(keeper, "keeper address")?;
                plan.push(
                    synth,
                    ISynth::grantRoleCall {
                        role: keeper_role(),
                        account: keeper,
                    },
                    format!("grantRole(KEEPER_ROLE, {keeper}) on synth {synth}"),
                );
            }
            Command::SynthCollateral {
                collateral,
                oracle,
                borrow_ltv,
                liquidation_ltv,
                ramp_duration,
                synth_vault,
                nusd_vault,
            } => {
                let synth_vault = synth_vault
                    .as_deref()
                    .or(nusd_vault.as_deref())
                    .context("missing synth vault: set SYNTH_VAULT_ADDRESS (fallback NUSD_VAULT_ADDRESS)")?;
                let synth_vault = parse_address(synth_vault).context("invalid synth vault address")?;
                let collateral = parse_address(collateral).context("invalid collateral vault address")?;
                let oracle = parse_address(oracle).context("invalid oracle address")?;

                let router = read_call(chain, synth_vault, &IEVault::oracleCall {}).await?._0;
                let unit_of_account = read_call(chain, synth_vault, &IEVault::unitOfAccountCall {}).await?._0;
                let asset = read_call(chain, collateral, &IERC4626::assetCall {}).await?._0;
                tracing::debug!(%router, %unit_of_account, %asset, "read synth vault configuration");

                plan.push(
                    synth_vault,
                    IEVault::setLTVCall {
                        collateral,
                        borrowLTV: *borrow_ltv,
                        liquidationLTV: *liquidation_ltv,
                        rampDuration: *ramp_duration,
                    },
                    format!("setLTV({collateral}, {borrow_ltv}, {liquidation_ltv}, {ramp_duration}) on synth vault {synth_vault}"),
                );
                plan.push(
                    router,
                    IEulerRouter::govSetConfigCall {
                        base: asset,
                        quote: unit_of_account,
                        oracle,
                    },
                    format!("govSetConfig({asset}, {unit_of_account}, {oracle}) on router {router}"),
                );
                plan.push(
                    router,
                    IEulerRouter::govSetResolvedVaultCall {
                        vault: collateral,
                        set: true,
                    },
                    format!("govSetResolvedVault({collateral}, true) on router {router}"),
                );
            }
            Command::Batch { file } => {
                let raw = fs::read_to_string(file)
                    .with_context(|| format!("failed reading {}", file.display()))?;
                let entries: Vec<BatchEntry> = serde_json::from_str(&raw)
                    .with_context(|| format!("failed parsing JSON in {}", file.display()))?;
                for (i, entry) in entries.into_iter().enumerate() {
                    let data = match entry.data.as_deref() {
                        Some(hex) => Bytes::from_str(hex)
                            .with_context(|| format!("call {i}: invalid data"))?,
                        None => Bytes::new(),
                    };
                    let mut call = CallRequest::new(entry.to.clone(), data);
                    if let Some(value) = entry.value.as_deref() {
                        let value = parse_u256(value)
                            .map_err(anyhow::Error::msg)
                            .with_context(|| format!("call {i}: invalid value"))?;
                        call = call.with_value(value);
                    }
                    plan.summary.push(format!("call {} ({} bytes) to {}", i, call.data.len(), entry.to));
                    plan.calls.push(call);
                }
            }
        }
        Ok(plan)
    }
}
