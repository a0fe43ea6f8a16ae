use crate::{
    compute::{Ledger, LoadOutcome},
    data::SIGNIFICANT_DIGITS,
};
use rand::Rng;
use rust_decimal::Decimal;
use std::{
    io::{BufRead, Write},
    str::FromStr,
    time::Duration,
};
use thiserror::Error;

const RULE_WIDTH: usize = 40;

/// Problems with what was typed, caught before anything reaches the ledger.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("Invalid amount. Please enter a number.")]
    NotANumber,
    #[error("Invalid amount. Use at most {0} decimal places.")]
    TooPrecise(u32),
}

pub fn parse_amount(input: &str) -> Result<Decimal, InputError> {
    let amount = Decimal::from_str(input.trim()).map_err(|_| InputError::NotANumber)?;
    if amount.normalize().scale() > SIGNIFICANT_DIGITS {
        return Err(InputError::TooPrecise(SIGNIFICANT_DIGITS));
    }
    Ok(amount)
}

/// The menu loop. It owns no state besides its streams: everything it shows comes from
/// `Result`s returned by the ledger, and every failure is printed and forgotten.
pub struct Console<'a, G, R, W> {
    ledger: &'a mut Ledger<G>,
    input: R,
    output: W,
    exit_pause: Duration,
}

impl<'a, G: Rng, R: BufRead, W: Write> Console<'a, G, R, W> {
    pub fn new(ledger: &'a mut Ledger<G>, input: R, output: W, exit_pause: Duration) -> Self {
        Self {
            ledger,
            input,
            output,
            exit_pause,
        }
    }

    pub fn greet(&mut self, outcome: &LoadOutcome) -> Result<(), anyhow::Error> {
        match outcome {
            LoadOutcome::Fresh => writeln!(
                self.output,
                "No existing account data file found. Starting a new session."
            )?,
            LoadOutcome::Loaded(count) => writeln!(
                self.output,
                "Account data loaded successfully ({count} accounts)."
            )?,
            LoadOutcome::Discarded(e) => writeln!(
                self.output,
                "Error loading data: {e}. Starting with no accounts."
            )?,
        }
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(
            self.output,
            "\n{rule}\n{:^width$}\n{rule}",
            "Console Banking System",
            width = RULE_WIDTH
        )?;
        Ok(())
    }

    /// Runs until the user picks Exit or input runs out, then writes out anything the
    /// ledger still holds back.
    pub fn run(&mut self) -> Result<(), anyhow::Error> {
        loop {
            writeln!(
                self.output,
                "\nMain Menu:\n\
                 1. Create New Account\n\
                 2. Deposit Funds\n\
                 3. Withdraw Funds\n\
                 4. Check Balance\n\
                 5. Exit"
            )?;
            let Some(choice) = self.prompt("Enter your choice (1-5): ")? else {
                break;
            };
            match choice.as_str() {
                "1" => self.create_account()?,
                "2" => self.transfer(Transfer::Deposit)?,
                "3" => self.transfer(Transfer::Withdraw)?,
                "4" => self.check_balance()?,
                "5" => {
                    writeln!(self.output, "Thank you for using the banking system. Goodbye!")?;
                    self.output.flush()?;
                    std::thread::sleep(self.exit_pause);
                    break;
                }
                _ => writeln!(
                    self.output,
                    "Invalid choice. Please select a number from 1 to 5."
                )?,
            }
        }
        if self.ledger.is_dirty() {
            if let Err(e) = self.ledger.flush() {
                writeln!(self.output, "Error: {e}")?;
            }
        }
        Ok(())
    }

    /// Prints `text` and reads one trimmed line; `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>, anyhow::Error> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn create_account(&mut self) -> Result<(), anyhow::Error> {
        let Some(name) = self.prompt("Enter account holder's name: ")? else {
            return Ok(());
        };
        match self.ledger.create_account(&name) {
            Ok(account) => {
                let (name, number) = (account.name.clone(), account.account_number.clone());
                writeln!(
                    self.output,
                    "\nAccount created successfully for {name}!\nYour new account number is: {number}"
                )?;
            }
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(())
    }

    fn transfer(&mut self, kind: Transfer) -> Result<(), anyhow::Error> {
        let Some(number) = self.prompt("Enter account number: ")? else {
            return Ok(());
        };
        let Some(amount) = self.prompt(kind.prompt())? else {
            return Ok(());
        };
        let amount = match parse_amount(&amount) {
            Ok(amount) => amount,
            Err(e) => {
                writeln!(self.output, "Error: {e}")?;
                return Ok(());
            }
        };
        let result = match kind {
            Transfer::Deposit => self.ledger.deposit(&number, amount),
            Transfer::Withdraw => self.ledger.withdraw(&number, amount),
        };
        match result {
            Ok(balance) => writeln!(
                self.output,
                "Successfully {} ${amount:.2} {} account {number}. New balance: ${balance:.2}",
                kind.verb(),
                kind.preposition(),
            )?,
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(())
    }

    fn check_balance(&mut self) -> Result<(), anyhow::Error> {
        let Some(number) = self.prompt("Enter account number: ")? else {
            return Ok(());
        };
        match self.ledger.check_balance(&number) {
            Ok(balance) => {
                let name = self
                    .ledger
                    .find_account(&number)
                    .map(|account| account.name.as_str())
                    .unwrap_or_default();
                writeln!(
                    self.output,
                    "\nAccount Number: {number}\nHolder Name: {name}\nCurrent Balance: ${balance:.2}"
                )?;
            }
            Err(e) => writeln!(self.output, "Error: {e}")?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Transfer {
    Deposit,
    Withdraw,
}

impl Transfer {
    fn prompt(self) -> &'static str {
        match self {
            Transfer::Deposit => "Enter amount to deposit: ",
            Transfer::Withdraw => "Enter amount to withdraw: ",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Transfer::Deposit => "deposited",
            Transfer::Withdraw => "withdrew",
        }
    }

    fn preposition(self) -> &'static str {
        match self {
            Transfer::Deposit => "to",
            Transfer::Withdraw => "from",
        }
    }
}
