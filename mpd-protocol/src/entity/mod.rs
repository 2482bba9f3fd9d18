//! Typed domain entities and record segmentation
//!
//! List responses arrive as one flat key/value stream with no explicit
//! record delimiter. A record is complete when the stream reaches a key
//! that starts the next record: either the record type's leading key
//! appears again, or a key would overwrite a field that is already set.
//! End-of-stream flushes the record in progress. [`Records`] implements
//! that rule once, for every entity type.

mod album;
mod listing;
mod output;
mod status;
mod track;

pub use album::{parse_albums, Album, Artist};
pub use listing::{parse_listing, Directory, Listing, Playlist};
pub use output::{Output, Partition};
pub use status::{PlayState, Statistics, Status};
pub use track::Track;

/// Outcome of feeding one key/value pair into a partially-built record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The field was set
    Set,
    /// The field was already set; the pair belongs to the next record
    Duplicate,
    /// The key is not part of this record type
    Ignored,
}

/// An entity assembled field-by-field from a key/value stream
pub trait Record: Default {
    /// Keys that always begin a new record of this type
    fn is_leading_key(key: &str) -> bool;

    /// Feed one pair into the record
    fn apply(&mut self, key: &str, value: &str) -> Applied;
}

/// Lazy iterator segmenting a key/value stream into completed records
pub struct Records<R, I> {
    pairs: I,
    current: R,
    started: bool,
}

impl<R, I> Records<R, I>
where
    R: Record,
    I: Iterator<Item = (String, String)>,
{
    pub fn new(pairs: I) -> Self {
        Self {
            pairs,
            current: R::default(),
            started: false,
        }
    }
}

impl<R, I> Iterator for Records<R, I>
where
    R: Record,
    I: Iterator<Item = (String, String)>,
{
    type Item = R;

    fn next(&mut self) -> Option<R> {
        loop {
            let Some((key, value)) = self.pairs.next() else {
                if self.started {
                    self.started = false;
                    return Some(std::mem::take(&mut self.current));
                }
                return None;
            };

            if self.started && R::is_leading_key(&key) {
                let done = std::mem::take(&mut self.current);
                self.current.apply(&key, &value);
                return Some(done);
            }

            match self.current.apply(&key, &value) {
                Applied::Set => self.started = true,
                Applied::Duplicate => {
                    let done = std::mem::take(&mut self.current);
                    self.current.apply(&key, &value);
                    return Some(done);
                }
                Applied::Ignored => {
                    tracing::trace!("unhandled response key {:?}", key);
                }
            }
        }
    }
}

/// Collect every record in a response body
pub fn collect_records<R: Record>(pairs: Vec<(String, String)>) -> Vec<R> {
    Records::new(pairs.into_iter()).collect()
}

/// Parse a numeric field, degrading to `None` on malformed input
///
/// Track and disc numbers may arrive as `N` or `N/total`; both forms yield
/// `N`. A value that parses as neither is an unknown, not an error: one
/// bad tag must not fail the whole response.
pub(crate) fn lenient_number<T: std::str::FromStr>(value: &str) -> Option<T> {
    let head = value.split('/').next().unwrap_or(value).trim();
    head.parse().ok()
}

#[cfg(test)]
pub(crate) fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
    raw.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
