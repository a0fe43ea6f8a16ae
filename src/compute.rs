use crate::{
    config::{Config, FlushPolicy},
    data::{Account, AccountNumber, Error},
    read::load_store,
    write::save_store,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, info, warn};

const LOWEST_ACCOUNT_NUMBER: u32 = 10_000_000;
const HIGHEST_ACCOUNT_NUMBER: u32 = 99_999_999;

/// What `Ledger::load` found in the store.
#[derive(Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No store yet, the ledger starts empty.
    Fresh,
    /// This many accounts were read back.
    Loaded(usize),
    /// The store exists but could not be decoded. Its content is dropped and the ledger
    /// starts empty; the next save overwrites the file.
    Discarded(Error),
}

/// This is where accounts are stored, keyed by their number. Single-threaded by design
/// of the program so no protections for MT. The random source is a type parameter so tests
/// can drive account number generation.
#[derive(Debug)]
pub struct Ledger<R = StdRng> {
    accounts: HashMap<AccountNumber, Account>,
    config: Config,
    rng: R,
    dirty: bool,
}

impl Ledger<StdRng> {
    pub fn open(config: Config) -> Result<(Self, LoadOutcome), Error> {
        Self::open_with_rng(config, StdRng::from_entropy())
    }
}

impl<R: Rng> Ledger<R> {
    /// Builds a ledger on top of the configured store and loads it right away.
    pub fn open_with_rng(config: Config, rng: R) -> Result<(Self, LoadOutcome), Error> {
        let mut ledger = Self {
            accounts: HashMap::new(),
            config,
            rng,
            dirty: false,
        };
        let outcome = ledger.load()?;
        Ok((ledger, outcome))
    }

    /// Replaces the in-memory accounts with the content of the store. Only a store we
    /// can't read at all is an error; one we can read but not decode is reported through
    /// `LoadOutcome::Discarded`.
    pub fn load(&mut self) -> Result<LoadOutcome, Error> {
        self.accounts.clear();
        self.dirty = false;
        let path = &self.config.store_path;
        match load_store(path) {
            Ok(None) => {
                info!(store = %path.display(), "no account store found, starting a new one");
                Ok(LoadOutcome::Fresh)
            }
            Ok(Some(accounts)) => {
                for account in accounts {
                    let number = account.account_number.clone();
                    if self.accounts.insert(number.clone(), account).is_some() {
                        warn!(account = %number, "account listed twice in store, keeping the last one");
                    }
                }
                info!(store = %path.display(), accounts = self.accounts.len(), "account store loaded");
                Ok(LoadOutcome::Loaded(self.accounts.len()))
            }
            Err(e @ Error::MalformedRecord(_)) => {
                warn!(store = %path.display(), error = %e, "account store unreadable, starting with no accounts");
                Ok(LoadOutcome::Discarded(e))
            }
            Err(e) => Err(e),
        }
    }

    /// Unconditionally rewrites the whole store from memory.
    pub fn save(&mut self) -> Result<(), Error> {
        save_store(
            &self.config.store_path,
            self.accounts.values(),
            self.config.atomic_writes,
        )?;
        self.dirty = false;
        debug!(store = %self.config.store_path.display(), accounts = self.accounts.len(), "account store saved");
        Ok(())
    }

    /// Writes pending mutations out, if any. Only does something under
    /// `FlushPolicy::OnExit`, every other policy keeps the store current already.
    pub fn flush(&mut self) -> Result<(), Error> {
        if self.dirty {
            self.save()?;
        }
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn persist(&mut self) -> Result<(), Error> {
        match self.config.flush {
            FlushPolicy::EveryMutation => self.save(),
            FlushPolicy::OnExit => {
                self.dirty = true;
                Ok(())
            }
        }
    }

    /// Picks random eight digit numbers until one is free, giving up after the configured
    /// number of attempts.
    pub fn generate_account_number(&mut self) -> Result<AccountNumber, Error> {
        let attempts = self.config.max_generation_attempts;
        for _ in 0..attempts {
            let candidate = self
                .rng
                .gen_range(LOWEST_ACCOUNT_NUMBER..=HIGHEST_ACCOUNT_NUMBER)
                .to_string();
            if !self.accounts.contains_key(&candidate) {
                return Ok(candidate);
            }
            debug!(account = %candidate, "account number already taken, retrying");
        }
        Err(Error::GenerationExhausted(attempts))
    }

    pub fn create_account(&mut self, name: &str) -> Result<&Account, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidName);
        }
        let number = self.generate_account_number()?;
        self.accounts
            .insert(number.clone(), Account::new(number.clone(), name.to_string()));
        if let Err(e) = self.persist() {
            self.accounts.remove(&number);
            return Err(e);
        }
        info!(account = %number, "account created");
        Ok(&self.accounts[&number])
    }

    pub fn find_account(&self, account_number: &str) -> Option<&Account> {
        self.accounts.get(account_number)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns the new balance.
    pub fn deposit(&mut self, account_number: &str, amount: Decimal) -> Result<Decimal, Error> {
        let balance = self.apply(account_number, |account| account.deposit(amount))?;
        info!(account = %account_number, %amount, "deposit applied");
        Ok(balance)
    }

    /// Returns the new balance.
    pub fn withdraw(&mut self, account_number: &str, amount: Decimal) -> Result<Decimal, Error> {
        let balance = self.apply(account_number, |account| account.withdraw(amount))?;
        info!(account = %account_number, %amount, "withdrawal applied");
        Ok(balance)
    }

    pub fn check_balance(&self, account_number: &str) -> Result<Decimal, Error> {
        self.find_account(account_number)
            .map(Account::balance)
            .ok_or_else(|| Error::AccountNotFound(account_number.to_string()))
    }

    /// Runs `operation` on one account and persists the result. If persisting fails the
    /// account is put back the way it was, so memory never gets ahead of the store.
    fn apply<F>(&mut self, account_number: &str, operation: F) -> Result<Decimal, Error>
    where
        F: FnOnce(&mut Account) -> Result<(), Error>,
    {
        let account = self
            .accounts
            .get_mut(account_number)
            .ok_or_else(|| Error::AccountNotFound(account_number.to_string()))?;
        let previous = account.clone();
        operation(&mut *account)?;
        let balance = account.balance();
        if let Err(e) = self.persist() {
            self.accounts.insert(account_number.to_string(), previous);
            return Err(e);
        }
        Ok(balance)
    }
}
