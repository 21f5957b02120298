use std::io::Read;

use crate::{command::CommandKind, processor::AccountId};
use csv::{StringRecord, StringRecordsIntoIter, Trim};
use rust_decimal::Decimal;
use serde::Deserialize;

/// One line of a ledger script: `op,account,amount,target,name`.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ScriptRow {
    pub op: CommandKind,
    pub account: AccountId,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub target: Option<AccountId>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Parses a ledger script in CSV format, yielding every row with its line number.
pub struct CsvScriptParser<R> {
    headers: StringRecord,
    records: StringRecordsIntoIter<R>,
}

impl<R> CsvScriptParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);
        let headers = reader.headers()?.clone();

        Ok(Self {
            headers,
            records: reader.into_records(),
        })
    }
}

impl<R> Iterator for CsvScriptParser<R>
where
    R: Read,
{
    type Item = (u64, Result<ScriptRow, csv::Error>);

    fn next(&mut self) -> Option<Self::Item> {
        let item = match self.records.next()? {
            Ok(record) => {
                let line = record.position().map_or(0, |pos| pos.line());
                (line, record.deserialize(Some(&self.headers)))
            }
            Err(err) => (err.position().map_or(0, |pos| pos.line()), Err(err)),
        };
        Some(item)
    }
}
