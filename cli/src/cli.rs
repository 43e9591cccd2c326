//! # CLI Interface
//!
//! Command-line argument structure for `sarcophagus`, using `clap` derive.
//! Every vault operation is a subcommand. The global flags choose where
//! snapshots are stored, how logs look, and which logical time the
//! operation runs at.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use sarcophagus_protocol::{Beneficiary, FixedPoint, GrandfatherClaim, TokenSymbol, WithdrawalKind};

use crate::logging::LogFormat;

/// Sarcophagus vault engine.
///
/// Creates and operates inheritance vaults stored in a local database.
/// Results are printed to stdout as JSON; logs go to stderr.
#[derive(Parser, Debug)]
#[command(
    name = "sarcophagus",
    about = "Sarcophagus digital-inheritance vault engine",
    version,
    propagate_version = true
)]
pub struct SarcophagusCli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Directory holding the vault database. Created on first use.
    #[arg(
        long,
        short = 'd',
        global = true,
        env = "SARCOPHAGUS_DATA_DIR",
        default_value = ".sarcophagus"
    )]
    pub data_dir: PathBuf,

    /// Log output format.
    #[arg(
        long,
        global = true,
        env = "SARCOPHAGUS_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// Logical time of the operation, in Unix seconds.
    ///
    /// Defaults to the wall clock. Pin it to replay an operation log
    /// deterministically.
    #[arg(long, global = true, env = "SARCOPHAGUS_NOW")]
    pub now: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Open a new vault.
    Create(CreateArgs),
    /// Deposit a token into a vault's basket.
    Deposit(AmountArgs),
    /// Move free OBOL into the basket so it is inherited.
    LockObol(ObolArgs),
    /// Claim accrued OBOL rewards.
    Claim(OwnerArgs),
    /// Withdraw from the basket under a time-lock tier.
    Withdraw(WithdrawArgs),
    /// Withdraw free OBOL to the owner's wallet (0.5% fee).
    WithdrawObol(ObolArgs),
    /// Add a beneficiary.
    AddBeneficiary(AddBeneficiaryArgs),
    /// Remove a beneficiary.
    RemoveBeneficiary(RemoveBeneficiaryArgs),
    /// Show which withdrawal tiers are open and when the rest open.
    Policy(OwnerArgs),
    /// Preview reward accrual up to now without committing it.
    Accrual(OwnerArgs),
    /// Settle the estate after a verified death.
    Settle(SettleArgs),
    /// Print a vault snapshot and its state digest, or list all vaults.
    Show(ShowArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Args, Debug)]
pub struct OwnerArgs {
    /// Vault owner address.
    pub owner: String,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    pub owner: String,

    /// Confirms the owner's identity has been verified.
    #[arg(long)]
    pub verified_identity: bool,

    /// Beneficiary as `ADDRESS:BPS[:AGE[:GUARDIAN]]`. Repeatable.
    #[arg(long = "beneficiary", short = 'b', value_parser = parse_beneficiary)]
    pub beneficiaries: Vec<Beneficiary>,

    /// Inherited grandfathering claim as `DECEASED_OWNER:ELIGIBLE_AT`.
    #[arg(long, value_parser = parse_grandfather_claim)]
    pub grandfather_claim: Option<GrandfatherClaim>,
}

#[derive(Args, Debug)]
pub struct AmountArgs {
    pub owner: String,
    /// VET, VTHO, B3TR or GLO.
    pub token: TokenSymbol,
    /// Decimal amount, e.g. `1000` or `0.25`.
    pub amount: FixedPoint,
}

#[derive(Args, Debug)]
pub struct ObolArgs {
    pub owner: String,
    /// OBOL amount.
    pub amount: FixedPoint,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TierArg {
    Emergency,
    Partial,
    Full,
}

#[derive(Args, Debug)]
pub struct WithdrawArgs {
    pub owner: String,

    #[arg(value_enum)]
    pub tier: TierArg,

    /// Fraction of each token to take, in basis points (partial only).
    #[arg(long, required_if_eq("tier", "partial"))]
    pub fraction_bps: Option<u32>,
}

impl WithdrawArgs {
    pub fn kind(&self) -> WithdrawalKind {
        match self.tier {
            TierArg::Emergency => WithdrawalKind::Emergency,
            TierArg::Partial => WithdrawalKind::Partial {
                fraction_bps: self.fraction_bps.unwrap_or_default(),
            },
            TierArg::Full => WithdrawalKind::Full,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddBeneficiaryArgs {
    pub owner: String,
    /// `ADDRESS:BPS[:AGE[:GUARDIAN]]`
    #[arg(value_parser = parse_beneficiary)]
    pub beneficiary: Beneficiary,
}

#[derive(Args, Debug)]
pub struct RemoveBeneficiaryArgs {
    pub owner: String,
    pub address: String,
}

#[derive(Args, Debug)]
pub struct SettleArgs {
    pub owner: String,

    /// Confirms the death has been verified by the oracle.
    #[arg(long)]
    pub verified: bool,

    /// Time of death in Unix seconds. Defaults to `--now`.
    #[arg(long)]
    pub death_timestamp: Option<u64>,

    /// Age at death, whole years.
    #[arg(long)]
    pub age: u32,

    /// Life expectancy, whole years.
    #[arg(long)]
    pub life_expectancy: u32,

    /// Annual carbon footprint in B3TR.
    #[arg(long, default_value = "0")]
    pub annual_footprint: FixedPoint,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Owner to show. Omit to list every vault.
    pub owner: Option<String>,
}

// ---------------------------------------------------------------------------
// Value parsers
// ---------------------------------------------------------------------------

/// Parses `ADDRESS:BPS[:AGE[:GUARDIAN]]`.
pub fn parse_beneficiary(s: &str) -> Result<Beneficiary, String> {
    let mut parts = s.split(':');
    let address = parts
        .next()
        .filter(|a| !a.is_empty())
        .ok_or_else(|| format!("missing address in {s:?}"))?;
    let bps = parts
        .next()
        .ok_or_else(|| format!("missing basis points in {s:?}"))?
        .parse::<u32>()
        .map_err(|e| format!("bad basis points in {s:?}: {e}"))?;

    let mut beneficiary = Beneficiary::new(address, bps);
    if let Some(age) = parts.next() {
        let age = age
            .parse::<u32>()
            .map_err(|e| format!("bad age in {s:?}: {e}"))?;
        beneficiary = beneficiary.with_age(age);
    }
    if let Some(guardian) = parts.next() {
        beneficiary = beneficiary.with_guardian(guardian);
    }
    if parts.next().is_some() {
        return Err(format!("too many fields in {s:?}"));
    }
    Ok(beneficiary)
}

/// Parses `DECEASED_OWNER:ELIGIBLE_AT`.
pub fn parse_grandfather_claim(s: &str) -> Result<GrandfatherClaim, String> {
    let (owner, at) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected OWNER:ELIGIBLE_AT, got {s:?}"))?;
    let eligible_at = at
        .parse::<u64>()
        .map_err(|e| format!("bad timestamp in {s:?}: {e}"))?;
    Ok(GrandfatherClaim {
        deceased_owner: owner.to_string(),
        eligible_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        SarcophagusCli::command().debug_assert();
    }

    #[test]
    fn beneficiary_forms() {
        let adult = parse_beneficiary("0xa:6000").unwrap();
        assert_eq!(adult, Beneficiary::new("0xa", 6_000));

        let minor = parse_beneficiary("0xkid:4000:12:0xaunt").unwrap();
        assert_eq!(minor.age, Some(12));
        assert_eq!(minor.guardian.as_deref(), Some("0xaunt"));

        assert!(parse_beneficiary("0xa").is_err());
        assert!(parse_beneficiary(":100").is_err());
        assert!(parse_beneficiary("0xa:1:2:3:4").is_err());
    }

    #[test]
    fn grandfather_claim_form() {
        let claim = parse_grandfather_claim("0xparent:1700000000").unwrap();
        assert_eq!(claim.deceased_owner, "0xparent");
        assert_eq!(claim.eligible_at, 1_700_000_000);
        assert!(parse_grandfather_claim("0xparent").is_err());
    }

    #[test]
    fn parses_deposit_with_globals() {
        let cli = SarcophagusCli::try_parse_from([
            "sarcophagus",
            "--now",
            "42",
            "deposit",
            "0xowner",
            "vet",
            "1000.5",
        ])
        .unwrap();
        assert_eq!(cli.global.now, Some(42));
        match cli.command {
            Commands::Deposit(args) => {
                assert_eq!(args.token, TokenSymbol::Vet);
                assert_eq!(args.amount.to_string(), "1000.5");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn partial_withdrawal_requires_fraction() {
        let missing = SarcophagusCli::try_parse_from(["sarcophagus", "withdraw", "0xo", "partial"]);
        assert!(missing.is_err());

        let cli = SarcophagusCli::try_parse_from([
            "sarcophagus",
            "withdraw",
            "0xo",
            "partial",
            "--fraction-bps",
            "2500",
        ])
        .unwrap();
        match cli.command {
            Commands::Withdraw(args) => {
                assert_eq!(args.kind(), WithdrawalKind::Partial { fraction_bps: 2_500 })
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
