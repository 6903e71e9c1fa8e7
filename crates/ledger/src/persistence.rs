// [crates/ledger/src/persistence.rs]
//! Temp-then-rename durability for the two ledger files (spec.md §4.6, §6):
//! `balances.json` and `processed-deposits.json` inside `DATA_DIR`. Writing
//! to a sibling temp file and renaming over the target keeps the directory
//! in a consistent state up to the last completed operation even if the
//! process is killed mid-write.

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use vanguard_models::UserBalance;

use crate::errors::LedgerError;

pub const BALANCES_FILE: &str = "balances.json";
pub const PROCESSED_DEPOSITS_FILE: &str = "processed-deposits.json";

pub async fn load_balances(data_dir: &Path) -> Result<HashMap<String, UserBalance>, LedgerError> {
    let path = data_dir.join(BALANCES_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(raw) => {
            let balances: Vec<UserBalance> = serde_json::from_str(&raw)?;
            Ok(balances.into_iter().map(|b| (b.wallet.clone(), b)).collect())
        }
        Err(fault) if fault.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
        Err(fault) => Err(fault.into()),
    }
}

pub async fn load_processed_deposits(data_dir: &Path) -> Result<HashSet<String>, LedgerError> {
    let path = data_dir.join(PROCESSED_DEPOSITS_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(fault) if fault.kind() == std::io::ErrorKind::NotFound => Ok(HashSet::new()),
        Err(fault) => Err(fault.into()),
    }
}

pub async fn persist_balances(
    data_dir: &Path,
    balances: &HashMap<String, UserBalance>,
) -> Result<(), LedgerError> {
    let values: Vec<&UserBalance> = balances.values().collect();
    let serialized = serde_json::to_string_pretty(&values)?;
    write_atomically(data_dir, BALANCES_FILE, &serialized).await
}

pub async fn persist_processed_deposits(
    data_dir: &Path,
    processed: &HashSet<String>,
) -> Result<(), LedgerError> {
    let serialized = serde_json::to_string_pretty(processed)?;
    write_atomically(data_dir, PROCESSED_DEPOSITS_FILE, &serialized).await
}

async fn write_atomically(data_dir: &Path, file_name: &str, contents: &str) -> Result<(), LedgerError> {
    tokio::fs::create_dir_all(data_dir).await?;

    let target_path = data_dir.join(file_name);
    let temp_path: PathBuf = data_dir.join(format!("{}.tmp-{}", file_name, uuid::Uuid::new_v4()));

    tokio::fs::write(&temp_path, contents.as_bytes()).await?;
    tokio::fs::rename(&temp_path, &target_path).await?;
    Ok(())
}
