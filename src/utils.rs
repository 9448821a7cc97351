//! # Utility Functions Module
//!
//! Helper per costruire le argument list dei tool esterni senza
//! ripetere `.to_string()` ovunque.

/// Converts an iterable of string-like items to `Vec<String>`.
///
/// The external tool argument tables in the compressor mix string literals
/// with formatted values (quality levels, paths); this collects them into
/// the owned vector `tokio::process::Command::args` wants.
///
/// # Example
/// ```rust
/// use asset_optimizer::utils::to_string_vec;
///
/// let max = format!("--max={}", 80);
/// let args = to_string_vec([max.as_str(), "--stdout", "input.jpg"]);
/// assert_eq!(args, vec!["--max=80", "--stdout", "input.jpg"]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Builds an argument vector from items of mixed types, converting each
/// with `ToString`.
///
/// # Example
/// ```rust
/// use asset_optimizer::args;
///
/// let quality = 80;
/// let args = args!["-quality", quality, "-optimize"];
/// assert_eq!(args, vec!["-quality", "80", "-optimize"]);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        vec![$($item.to_string()),*]
    };
}
