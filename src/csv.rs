use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::Amount;
use crate::model::{Count, Denomination, ProductId};
use crate::session::{Command, Output};

/// Errors that can occur when reading command scripts or writing outputs
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized command type '{command}'")]
    UnrecognizedType { line: usize, command: String },

    #[error("line {line}: {command} missing {field}")]
    MissingField {
        line: usize,
        command: String,
        field: &'static str,
    },

    #[error("failed to write output: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush output: {0}")]
    Flush(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct InputRow {
    r#type: String,
    product: Option<ProductId>,
    denom: Option<Denomination>,
    count: Option<Count>,
    price: Option<Amount>,
    name: Option<String>,
    pin: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    event: &'a str,
    product: Option<ProductId>,
    name: Option<&'a str>,
    quantity: Option<Count>,
    coins: Option<String>,
    amount: Option<Amount>,
    reason: Option<&'a str>,
}

impl<'a> OutputRow<'a> {
    fn new(event: &'a str) -> Self {
        Self {
            event,
            product: None,
            name: None,
            quantity: None,
            coins: None,
            amount: None,
            reason: None,
        }
    }
}

/// Read commands from a csv file
pub fn read_commands(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Command, CsvError>>, CsvError> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            parse_row(line, row)
        }))
}

fn parse_row(line: usize, row: InputRow) -> Result<Command, CsvError> {
    let command = row.r#type.as_str();
    let missing = |field| CsvError::MissingField {
        line,
        command: command.to_string(),
        field,
    };
    let pin = || row.pin.clone().unwrap_or_default();

    match command {
        "insert" => Ok(Command::Insert {
            denomination: row.denom.ok_or_else(|| missing("denom"))?,
            count: row.count.ok_or_else(|| missing("count"))?,
        }),
        "purchase" => Ok(Command::Purchase {
            product: row.product.ok_or_else(|| missing("product"))?,
        }),
        "cancel" => Ok(Command::Cancel),
        "list" => Ok(Command::List),
        "add" => Ok(Command::AddProduct {
            pin: pin(),
            name: row.name.clone().ok_or_else(|| missing("name"))?,
            price: row.price.ok_or_else(|| missing("price"))?,
            quantity: row.count.ok_or_else(|| missing("count"))?,
        }),
        "restock" => Ok(Command::Restock {
            pin: pin(),
            product: row.product.ok_or_else(|| missing("product"))?,
            amount: row.count.ok_or_else(|| missing("count"))?,
        }),
        "reprice" => Ok(Command::Reprice {
            pin: pin(),
            product: row.product.ok_or_else(|| missing("product"))?,
            price: row.price.ok_or_else(|| missing("price"))?,
        }),
        "report" => Ok(Command::BankReport { pin: pin() }),
        "collect" => Ok(Command::CollectCash { pin: pin() }),
        other => Err(CsvError::UnrecognizedType {
            line,
            command: other.to_string(),
        }),
    }
}

/// Write session outputs in csv format
pub fn write_outputs<W: io::Write>(
    writer: W,
    outputs: impl IntoIterator<Item = Output>,
) -> Result<(), CsvError> {
    // header written by hand so an empty session still gets one
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record([
        "event", "product", "name", "quantity", "coins", "amount", "reason",
    ])?;

    for output in outputs {
        match &output {
            Output::Vended {
                product,
                name,
                remaining,
                change,
            } => writer.serialize(OutputRow {
                product: Some(*product),
                name: Some(name.as_str()),
                quantity: Some(*remaining),
                coins: Some(change.to_string()),
                amount: Some(change.total()),
                ..OutputRow::new("vend")
            })?,
            Output::Refunded { coins } => writer.serialize(OutputRow {
                coins: Some(coins.to_string()),
                amount: Some(coins.total()),
                ..OutputRow::new("refund")
            })?,
            Output::Products(products) => {
                for p in products {
                    writer.serialize(OutputRow {
                        product: Some(p.id),
                        name: Some(p.name.as_str()),
                        quantity: Some(p.quantity),
                        amount: Some(p.price),
                        ..OutputRow::new("product")
                    })?;
                }
            }
            Output::Added { product, name } => writer.serialize(OutputRow {
                product: Some(*product),
                name: Some(name.as_str()),
                ..OutputRow::new("added")
            })?,
            Output::Bank { holdings, total } => writer.serialize(OutputRow {
                coins: Some(holdings.to_string()),
                amount: Some(*total),
                ..OutputRow::new("bank")
            })?,
            Output::Collected { total } => writer.serialize(OutputRow {
                amount: Some(*total),
                ..OutputRow::new("collect")
            })?,
            Output::Rejected { command, reason } => writer.serialize(OutputRow {
                name: Some(*command),
                reason: Some(reason.as_str()),
                ..OutputRow::new("rejected")
            })?,
        }
    }

    writer.flush()?;
    Ok(())
}
