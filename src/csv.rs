use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::{Amount, Command, Tick};

/// Errors that can occur when parsing csv rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized operation '{op}'")]
    UnrecognizedOp { line: usize, op: String },

    #[error("line {line}: {op} missing amount")]
    MissingAmount { line: usize, op: String },

    #[error("line {line}: transfer missing counterparty")]
    MissingCounterparty { line: usize },
}

#[derive(Debug, Deserialize)]
struct InputRow {
    op: String,
    ts: Tick,
    account: String,
    to: Option<String>,
    amount: Option<u64>,
}

#[derive(Debug, Serialize)]
struct OutputRow {
    account: String,
    balance: String,
    outgoing: String,
}

fn require_amount(row: &InputRow, line: usize) -> Result<Amount, CsvError> {
    row.amount.map(Amount::new).ok_or_else(|| CsvError::MissingAmount {
        line,
        op: row.op.clone(),
    })
}

/// Read commands from a csv file
pub fn read_commands(path: impl AsRef<Path>) -> impl Iterator<Item = Result<Command, CsvError>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .expect("failed to open csv file");

    reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            match row.op.as_str() {
                "create" => Ok(Command::Create {
                    ts: row.ts,
                    account: row.account,
                }),
                "deposit" => {
                    let amount = require_amount(&row, line)?;
                    Ok(Command::Deposit {
                        ts: row.ts,
                        account: row.account,
                        amount,
                    })
                }
                "pay" => {
                    let amount = require_amount(&row, line)?;
                    Ok(Command::Pay {
                        ts: row.ts,
                        account: row.account,
                        amount,
                    })
                }
                "transfer" => {
                    let amount = require_amount(&row, line)?;
                    let to = row
                        .to
                        .ok_or(CsvError::MissingCounterparty { line })?;
                    Ok(Command::Transfer {
                        ts: row.ts,
                        account: row.account,
                        to,
                        amount,
                    })
                }
                other => Err(CsvError::UnrecognizedOp {
                    line,
                    op: other.to_string(),
                }),
            }
        })
}

/// write accounts to stdout in csv format
pub fn write_accounts(accounts: impl IntoIterator<Item = (String, Amount, Amount)>) {
    let stdout = io::stdout();
    let mut writer = csv::Writer::from_writer(stdout.lock());

    for (account, balance, outgoing) in accounts {
        let row = OutputRow {
            account,
            balance: balance.to_string(),
            outgoing: outgoing.to_string(),
        };
        writer.serialize(&row).expect("failed to write csv row");
    }

    writer.flush().expect("failed to flush csv writer");
}
