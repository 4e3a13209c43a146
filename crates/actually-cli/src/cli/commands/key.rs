//! `actually key` handlers: manage the stored API key.

use std::sync::Arc;

use actually_core::storage::{CREDENTIAL_KEY, FileStore, KeyValueStore, Preferences};
use anyhow::{Context, Result};

/// Characters kept visible at each end of a masked key.
const MASK_KEEP: usize = 4;

pub fn save(key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("API key is empty");
    }
    let store = FileStore::open_default();
    store
        .set(CREDENTIAL_KEY, key)
        .with_context(|| format!("save API key to {}", store.path().display()))?;
    println!("Saved API key to {}", store.path().display());
    Ok(())
}

/// Prints the stored key, masked unless `reveal` or the stored
/// `show_api_key` preference says otherwise.
pub fn show(reveal: bool) -> Result<()> {
    let store = FileStore::open_default();
    let key = store
        .get(CREDENTIAL_KEY)
        .with_context(|| format!("read {}", store.path().display()))?
        .unwrap_or_default();
    if key.trim().is_empty() {
        anyhow::bail!("No API key saved. Run `actually key save <KEY>` first.");
    }

    if reveal || Preferences::new(Arc::new(store)).show_credential() {
        println!("{key}");
    } else {
        println!("{}", mask(&key));
    }
    Ok(())
}

pub fn clear() -> Result<()> {
    let store = FileStore::open_default();
    store
        .set(CREDENTIAL_KEY, "")
        .with_context(|| format!("clear API key in {}", store.path().display()))?;
    println!("Cleared saved API key");
    Ok(())
}

/// Keeps a short prefix and suffix so keys can be told apart.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= MASK_KEEP * 3 {
        return "•".repeat(chars.len());
    }
    let head: String = chars[..MASK_KEEP].iter().collect();
    let tail: String = chars[chars.len() - MASK_KEEP..].iter().collect();
    format!("{head}…{tail}")
}
