use crate::data::{Account, AccountRecord, Error};
use serde_json::error::Category;
use std::{fs::File, io::BufReader, path::Path};

/// Decodes a whole store: a JSON array of account objects. Every record then goes through
/// the schema check in `Account::from_record`, so anything that isn't exactly the expected
/// shape comes back as `MalformedRecord`. `origin` only names the source in
/// a `Persistence` error when the reader itself fails.
pub(crate) fn read_accounts<R: std::io::Read>(
    reader: R,
    origin: &Path,
) -> Result<Vec<Account>, Error> {
    let records: Vec<AccountRecord> = serde_json::from_reader(reader).map_err(|e| match e.classify() {
        Category::Io => Error::Persistence {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        },
        Category::Syntax | Category::Eof => Error::MalformedRecord(format!("invalid JSON: {e}")),
        Category::Data => Error::MalformedRecord(e.to_string()),
    })?;
    records.into_iter().map(Account::from_record).collect()
}

/// Reads the store at `path`. A missing file is `Ok(None)`: first run, nothing to load.
/// Any other failure to open it is a `Persistence` error, while a file we can open but not
/// decode is `MalformedRecord` and left for the caller to deal with.
pub(crate) fn load_store(path: &Path) -> Result<Option<Vec<Account>>, Error> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::Persistence {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };
    read_accounts(BufReader::new(file), path).map(Some)
}

#[cfg(test)]
mod tests {
    use crate::{
        data::{Account, Error},
        read::{load_store, read_accounts},
    };
    use rust_decimal_macros::dec;
    use std::path::Path;

    fn origin() -> &'static Path {
        Path::new("accounts.json")
    }

    #[test]
    fn read_store() {
        let store = br#"
[
    {
        "account_number": "12345678",
        "name": "Alice",
        "balance": 60.0
    },
    {
        "account_number": "87654321",
        "name": "Bob",
        "balance": 0
    }
]
"#;
        let accounts = read_accounts(&store[..], origin()).unwrap();
        let mut alice = Account::new("12345678".into(), "Alice".into());
        alice.deposit(dec!(60)).unwrap();
        assert_eq!(
            accounts,
            [alice, Account::new("87654321".into(), "Bob".into())]
        );
    }
    #[test]
    fn read_empty_store() {
        assert!(read_accounts(&b"[]"[..], origin()).unwrap().is_empty());
    }
    #[test]
    fn read_invalid_json() {
        assert!(matches!(
            read_accounts(&b"{not json"[..], origin()),
            Err(Error::MalformedRecord(_))
        ));
        assert!(matches!(
            read_accounts(&b""[..], origin()),
            Err(Error::MalformedRecord(_))
        ));
    }
    #[test]
    fn read_wrong_shape() {
        // an object instead of an array
        assert!(matches!(
            read_accounts(&br#"{"account_number": "12345678"}"#[..], origin()),
            Err(Error::MalformedRecord(_))
        ));
        // a record with the balance missing
        assert!(matches!(
            read_accounts(&br#"[{"account_number": "12345678", "name": "Alice"}]"#[..], origin()),
            Err(Error::MalformedRecord(_))
        ));
        // a record failing the schema check
        assert!(matches!(
            read_accounts(&br#"[{"account_number": "x", "name": "Alice", "balance": 1}]"#[..], origin()),
            Err(Error::MalformedRecord(_))
        ));
    }
    #[test]
    fn load_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_store(&dir.path().join("accounts.json")), Ok(None));
    }
    #[test]
    fn load_directory_instead_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_store(dir.path());
        assert!(matches!(result, Err(Error::Persistence { .. })));
    }
}
