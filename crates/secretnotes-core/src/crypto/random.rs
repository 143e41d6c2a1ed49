//! OS randomness for salts and nonces.

use crate::error::{NotesError, Result};

/// Fill a fixed-size array from the operating system CSPRNG.
///
/// Failure is fatal for the current operation and is never retried.
pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| NotesError::RandomGeneration(e.to_string()))?;
    Ok(bytes)
}
