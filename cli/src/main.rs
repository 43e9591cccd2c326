// Copyright (c) 2026 Sarcophagus Contributors. MIT License.
// See LICENSE for details.

//! # Sarcophagus CLI
//!
//! Entry point for the `sarcophagus` binary. Plays the wallet/session role
//! around the vault engine for local use: it supplies the logical clock,
//! loads and stores vault snapshots in a sled database, and prints each
//! result as JSON on stdout.
//!
//! ```text
//! sarcophagus create 0xowner --verified-identity -b 0xheir:10000
//! sarcophagus deposit 0xowner VET 1000
//! sarcophagus --now 1950000000 claim 0xowner
//! sarcophagus policy 0xowner
//! ```

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::Path;

use sarcophagus_protocol::lifecycle::{evaluate, format_countdown, WithdrawalTier};
use sarcophagus_protocol::{
    DeathCertificate, EngineResult, TokenSymbol, VaultAccount, VaultStore,
};

use cli::{Commands, SarcophagusCli};
use logging::DEFAULT_DIRECTIVES;

fn main() -> Result<()> {
    let cli = SarcophagusCli::parse();
    logging::init_logging(DEFAULT_DIRECTIVES, cli.global.log_format);

    let output = match cli.command {
        Commands::Version => version_info(),
        command => {
            let now = resolve_now(cli.global.now)?;
            let store = open_store(&cli.global.data_dir)?;
            run(&store, command, now)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// `--now` when pinned, otherwise the wall clock.
fn resolve_now(pinned: Option<u64>) -> Result<u64> {
    match pinned {
        Some(now) => Ok(now),
        None => u64::try_from(chrono::Utc::now().timestamp())
            .context("system clock is set before the Unix epoch"),
    }
}

fn open_store(data_dir: &Path) -> Result<VaultStore> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;
    let db_path = data_dir.join("vaults");
    let store = VaultStore::open(&db_path)
        .with_context(|| format!("failed to open vault database at {}", db_path.display()))?;
    tracing::debug!(path = %db_path.display(), vaults = store.len(), "vault database opened");
    Ok(store)
}

/// Executes one subcommand against `store` at logical time `now`.
fn run(store: &VaultStore, command: Commands, now: u64) -> Result<Value> {
    match command {
        Commands::Create(args) => {
            let mut vault =
                VaultAccount::create(&args.owner, args.verified_identity, args.beneficiaries, now)?;
            if let Some(claim) = args.grandfather_claim {
                vault = vault.with_grandfather_claim(claim);
            }
            store.insert_new(&vault)?;
            Ok(snapshot(&vault, ()))
        }

        Commands::Deposit(args) => commit(store, &args.owner, |v| {
            v.deposit(args.token, args.amount, now).map(|next| (next, ()))
        }),

        Commands::LockObol(args) => commit(store, &args.owner, |v| {
            v.lock_for_inheritance(args.amount, now).map(|next| (next, ()))
        }),

        Commands::Claim(args) => commit(store, &args.owner, |v| v.claim(now)),

        Commands::Withdraw(args) => {
            let kind = args.kind();
            commit(store, &args.owner, |v| v.request_withdrawal(kind, now))
        }

        Commands::WithdrawObol(args) => {
            commit(store, &args.owner, |v| v.withdraw_obol(args.amount))
        }

        Commands::AddBeneficiary(args) => commit(store, &args.owner, |v| {
            v.add_beneficiary(args.beneficiary.clone()).map(|next| (next, ()))
        }),

        Commands::RemoveBeneficiary(args) => commit(store, &args.owner, |v| {
            v.remove_beneficiary(&args.address).map(|next| (next, ()))
        }),

        Commands::Policy(args) => {
            let vault = store.load(&args.owner)?;
            let status = evaluate(now, vault.created_at());
            let countdown: serde_json::Map<String, Value> = WithdrawalTier::ALL
                .into_iter()
                .map(|tier| {
                    let remaining = format_countdown(status.seconds_until(tier));
                    (tier.to_string(), Value::String(remaining))
                })
                .collect();
            Ok(json!({
                "owner": vault.owner(),
                "now": now,
                "status": status,
                "countdown": countdown,
            }))
        }

        Commands::Accrual(args) => {
            let vault = store.load(&args.owner)?;
            let report = vault.preview_accrual(now)?;
            Ok(json!({
                "owner": vault.owner(),
                "report": report,
                "stake": vault.obol_stake(),
                "grandfathered": vault.is_grandfathered(),
            }))
        }

        Commands::Settle(args) => {
            let certificate = DeathCertificate {
                verified: args.verified,
                death_timestamp: args.death_timestamp.unwrap_or(now),
                actual_age_at_death: args.age,
                life_expectancy: args.life_expectancy,
                annual_footprint: args.annual_footprint,
            };
            commit(store, &args.owner, |v| v.settle(&certificate))
        }

        Commands::Show(args) => match args.owner {
            Some(owner) => Ok(snapshot(&store.load(&owner)?, ())),
            None => {
                let summaries = store
                    .list()?
                    .iter()
                    .map(|vault| {
                        Ok(json!({
                            "owner": vault.owner(),
                            "deceased": vault.is_deceased(),
                            "vet_equivalent": vault.basket().vet_equivalent()?,
                            "locked_obol": vault.basket().balance(TokenSymbol::Obol),
                            "digest": vault.state_digest(),
                        }))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::Array(summaries))
            }
        },

        Commands::Version => Ok(version_info()),
    }
}

/// Applies `op` through the store and renders the committed snapshot with
/// the operation's receipt.
fn commit<T, F>(store: &VaultStore, owner: &str, op: F) -> Result<Value>
where
    T: Serialize,
    F: Fn(&VaultAccount) -> EngineResult<(VaultAccount, T)>,
{
    let receipt = store.apply(owner, op)?;
    let vault = store.load(owner)?;
    tracing::info!(owner, digest = %vault.state_digest(), "vault updated");
    Ok(snapshot(&vault, receipt))
}

fn snapshot<T: Serialize>(vault: &VaultAccount, receipt: T) -> Value {
    json!({
        "receipt": receipt,
        "vault": vault,
        "digest": vault.state_digest(),
    })
}

fn version_info() -> Value {
    json!({
        "sarcophagus": env!("CARGO_PKG_VERSION"),
        "rustc": option_env!("RUSTC_VERSION").unwrap_or("unknown"),
    })
}
