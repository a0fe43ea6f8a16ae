use crate::data::{Account, AccountRecord, Error};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

const INDENT: &[u8] = b"    ";

/// Basic JSON exporter for accounts: one array, four-space indentation, sorted by account
/// number so two saves of the same ledger produce the same bytes.
pub(crate) fn write_accounts<'a, W, I>(writer: W, accounts: I) -> Result<(), serde_json::Error>
where
    W: Write,
    I: IntoIterator<Item = &'a Account>,
{
    let mut records: Vec<AccountRecord> = accounts.into_iter().map(Account::to_record).collect();
    records.sort_by(|a, b| a.account_number.cmp(&b.account_number));
    let mut ser = Serializer::with_formatter(writer, PrettyFormatter::with_indent(INDENT));
    records.serialize(&mut ser)?;
    Ok(())
}

/// Overwrites the store at `path` with the full account set. With `atomic` the data goes
/// to a sibling temp file first and is renamed over the store once flushed, so a crash
/// mid-write leaves the previous store intact. A failed rename touches neither file.
pub(crate) fn save_store<'a, I>(path: &Path, accounts: I, atomic: bool) -> Result<(), Error>
where
    I: IntoIterator<Item = &'a Account>,
{
    let persistence = |e: &dyn std::fmt::Display| Error::Persistence {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    let target = if atomic { temp_path(path) } else { path.to_path_buf() };
    let result = (|| {
        let mut out = BufWriter::new(File::create(&target).map_err(|e| persistence(&e))?);
        write_accounts(&mut out, accounts).map_err(|e| persistence(&e))?;
        out.write_all(b"\n").map_err(|e| persistence(&e))?;
        let file = out.into_inner().map_err(|e| persistence(e.error()))?;
        file.sync_all().map_err(|e| persistence(&e))
    })();
    if let Err(e) = result {
        if atomic {
            let _ = fs::remove_file(&target);
        }
        return Err(e);
    }
    if atomic {
        fs::rename(&target, path).map_err(|e| Error::Persistence {
            path: path.to_path_buf(),
            reason: format!("{e} (new data left in {})", target.display()),
        })?;
    }
    Ok(())
}

/// Sibling of the store the atomic save writes to before renaming.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
