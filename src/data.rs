use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub type AccountNumber = String;

pub const ACCOUNT_NUMBER_DIGITS: usize = 8;
pub const SIGNIFICANT_DIGITS: u32 = 2;

/// True for exactly eight ASCII digits, the only shape of account number we hand out
/// or accept from the store.
pub fn is_account_number(candidate: &str) -> bool {
    candidate.len() == ACCOUNT_NUMBER_DIGITS && candidate.bytes().all(|b| b.is_ascii_digit())
}

/// Amounts moved in or out of an account are positive and whole cents.
fn check_amount(amount: Decimal) -> Result<(), Error> {
    if amount <= Decimal::ZERO || amount.normalize().scale() > SIGNIFICANT_DIGITS {
        return Err(Error::InvalidAmount(amount));
    }
    Ok(())
}

/// One holder's account. The balance is kept private so the only way to move it is
/// through `deposit` and `withdraw`, which between them keep it from ever going negative.
///
/// On disk an account goes through `AccountRecord`, see below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub account_number: AccountNumber,
    pub name: String,
    balance: Decimal,
}

impl Account {
    /// A fresh account always starts empty.
    pub fn new(account_number: AccountNumber, name: String) -> Self {
        Self {
            account_number,
            name,
            balance: Decimal::ZERO,
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn deposit(&mut self, amount: Decimal) -> Result<(), Error> {
        check_amount(amount)?;
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(Error::BalanceOverflow {
                balance: self.balance,
                amount,
            })?;
        Ok(())
    }

    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), Error> {
        check_amount(amount)?;
        if amount > self.balance {
            return Err(Error::InsufficientFunds {
                asked: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    pub fn to_record(&self) -> AccountRecord {
        AccountRecord::from(self.clone())
    }

    pub fn from_record(record: AccountRecord) -> Result<Self, Error> {
        Self::try_from(record)
    }
}

/// Wire shape of an account inside the store's JSON array. Balances are JSON numbers written
/// with the exact digits of the decimal, never through `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_number: AccountNumber,
    pub name: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub balance: Decimal,
}

impl From<Account> for AccountRecord {
    fn from(account: Account) -> Self {
        Self {
            account_number: account.account_number,
            name: account.name,
            balance: account.balance,
        }
    }
}

impl TryFrom<AccountRecord> for Account {
    type Error = Error;

    fn try_from(record: AccountRecord) -> Result<Self, Self::Error> {
        if !is_account_number(&record.account_number) {
            return Err(Error::MalformedRecord(format!(
                "account number {:?} is not {ACCOUNT_NUMBER_DIGITS} digits",
                record.account_number
            )));
        }
        if record.name.trim().is_empty() {
            return Err(Error::MalformedRecord(format!(
                "account {} has an empty holder name",
                record.account_number
            )));
        }
        if record.balance.is_sign_negative() && !record.balance.is_zero() {
            return Err(Error::MalformedRecord(format!(
                "account {} has a negative balance {}",
                record.account_number, record.balance
            )));
        }
        Ok(Self {
            account_number: record.account_number,
            name: record.name,
            balance: record.balance,
        })
    }
}

/// Everything a ledger operation can fail with. None of these are fatal: the console
/// reports them and goes back to the menu.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Amount must be positive and in whole cents (got {0})")]
    InvalidAmount(Decimal),
    #[error("Balance {balance} cannot take {amount} more")]
    BalanceOverflow { balance: Decimal, amount: Decimal },
    #[error("Insufficient funds (asked {asked} while {available} available)")]
    InsufficientFunds { asked: Decimal, available: Decimal },
    #[error("Account {0} not found")]
    AccountNotFound(AccountNumber),
    #[error("Account holder name cannot be empty")]
    InvalidName,
    #[error("Malformed account record: {0}")]
    MalformedRecord(String),
    #[error("Could not find a free account number after {0} attempts")]
    GenerationExhausted(u32),
    #[error("Store {} unavailable: {reason}", .path.display())]
    Persistence { path: PathBuf, reason: String },
}
