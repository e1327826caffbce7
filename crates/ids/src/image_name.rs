use chrono::Utc;
use rand::Rng;
use std::fmt;

/// Upper bound (exclusive) of the random filename suffix.
const SUFFIX_BOUND: u32 = 1_000_000_000;

/// Longest extension kept on a generated filename.
const MAX_EXTENSION_LEN: usize = 10;

/// A generated filename for a stored image.
///
/// Format:
/// `<unix-millis>-<random><.ext>`
///
/// Example:
/// `1760520000123-482913377.png`
///
/// The extension is taken from the uploaded file's original name. It is lower-cased and kept
/// only when it is short ASCII alphanumeric; anything else is dropped so the generated name is
/// always a single, safe path component.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageFileName(String);

impl ImageFileName {
    /// Generates a new filename carrying `extension` (with or without the leading dot).
    pub fn generate(extension: Option<&str>) -> Self {
        let millis = Utc::now().timestamp_millis();
        let suffix = rand::thread_rng().gen_range(0..SUFFIX_BOUND);

        let name = match extension.and_then(sanitise_extension) {
            Some(ext) => format!("{}-{}.{}", millis, suffix, ext),
            None => format!("{}-{}", millis, suffix),
        };

        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn sanitise_extension(raw: &str) -> Option<String> {
    let ext = raw.strip_prefix('.').unwrap_or(raw);
    let ok = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.bytes().all(|b| b.is_ascii_alphanumeric());

    ok.then(|| ext.to_ascii_lowercase())
}
