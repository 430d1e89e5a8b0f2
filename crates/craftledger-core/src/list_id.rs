//! Crafting-list identifiers and their total order.
//!
//! List ids come from file stems like `HW3`, `SBa2`, or `ShBc1` and group a
//! shopping list under one expansion stage plus a sub-identifier. Anything
//! that does not carry a recognized expansion prefix is kept verbatim as a
//! generic id. The [`Ord`] impl defines the canonical output order: expansion
//! ids sort by (stage, numeric sub-id, letters, part number) with absent
//! components last, and generic ids sort after every expansion id.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

// ---------------------------------------------------------------------------
// Expansion stages
// ---------------------------------------------------------------------------

/// The four expansion stages, in release order. The discriminant order is
/// the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Expansion {
    Arr,
    Hw,
    Sb,
    Shb,
}

impl Expansion {
    pub const ALL: [Expansion; 4] = [Expansion::Arr, Expansion::Hw, Expansion::Sb, Expansion::Shb];

    /// The prefix token used in raw list ids.
    pub fn prefix(self) -> &'static str {
        match self {
            Expansion::Arr => "ARR",
            Expansion::Hw => "HW",
            Expansion::Sb => "SB",
            Expansion::Shb => "ShB",
        }
    }

    fn ordinal(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for Expansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

// ---------------------------------------------------------------------------
// Sub-identifiers
// ---------------------------------------------------------------------------

/// The part of a list id after the expansion prefix: either a plain number
/// (`HW3`) or a letter run with an optional part number (`SBa`, `SBa2`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListSubId {
    Numbered(u32),
    Lettered { letters: String, part: Option<u32> },
}

impl fmt::Display for ListSubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListSubId::Numbered(n) => write!(f, "{n}"),
            ListSubId::Lettered { letters, part } => {
                f.write_str(letters)?;
                if let Some(part) = part {
                    write!(f, "{part}")?;
                }
                Ok(())
            }
        }
    }
}

/// Errors from [`ListId::parse`]. Fatal for the record that carried the id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListIdError {
    /// An expansion prefix was recognized but the sub-identifier token after
    /// it is neither a digit run nor a letter run with an optional trailing
    /// number.
    #[error("malformed sub-identifier '{token}' after '{prefix}' in list id '{raw}'")]
    MalformedSubId {
        raw: String,
        prefix: &'static str,
        token: String,
    },
}

impl ListSubId {
    /// Scan a sub-id token at the start of `rest`.
    ///
    /// Returns `Ok(None)` when `rest` does not begin with a sub-id token at
    /// all (the caller keeps scanning for another prefix occurrence).
    ///
    /// A digit run parses as [`ListSubId::Numbered`]; trailing text after the
    /// digits is a part annotation and is ignored, so `SB1A` is list 1 of SB.
    /// A letter run with an optional digit run parses as
    /// [`ListSubId::Lettered`] and must consume the whole tail; anything
    /// alphanumeric after it is malformed.
    fn scan(rest: &str, raw: &str, prefix: &'static str) -> Result<Option<ListSubId>, ListIdError> {
        let malformed = || ListIdError::MalformedSubId {
            raw: raw.to_string(),
            prefix,
            token: rest.to_string(),
        };

        match rest.chars().next() {
            Some(c) if c.is_ascii_digit() => {
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                let number = digits.parse().map_err(|_| malformed())?;
                Ok(Some(ListSubId::Numbered(number)))
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let letters: String = rest.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
                let tail = &rest[letters.len()..];
                let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
                let after = &tail[digits.len()..];
                if after.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
                    return Err(malformed());
                }
                let part = if digits.is_empty() {
                    None
                } else {
                    Some(digits.parse().map_err(|_| malformed())?)
                };
                Ok(Some(ListSubId::Lettered { letters, part }))
            }
            _ => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// List ids
// ---------------------------------------------------------------------------

/// A totally-ordered list identifier: expansion-based or generic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListId {
    Expansion { expansion: Expansion, sub: ListSubId },
    Generic(String),
}

impl ListId {
    /// Parse a raw list id.
    ///
    /// Scans for an expansion prefix anywhere in the raw id (ids arrive
    /// embedded in file stems) immediately followed by a sub-id token. No
    /// recognized prefix anywhere yields [`ListId::Generic`] with the raw
    /// string unchanged. A recognized prefix followed by a malformed sub-id
    /// token is the only failure.
    pub fn parse(raw: &str) -> Result<ListId, ListIdError> {
        for (pos, _) in raw.char_indices() {
            for expansion in Expansion::ALL {
                let prefix = expansion.prefix();
                if !raw[pos..].starts_with(prefix) {
                    continue;
                }
                let rest = &raw[pos + prefix.len()..];
                if let Some(sub) = ListSubId::scan(rest, raw, prefix)? {
                    return Ok(ListId::Expansion { expansion, sub });
                }
            }
        }
        Ok(ListId::Generic(raw.to_string()))
    }

    fn order_key(&self) -> OrderKey<'_> {
        match self {
            ListId::Generic(id) => OrderKey {
                expansion: u32::MAX,
                number: u32::MAX,
                letters: OrLast::Absent,
                part: u32::MAX,
                generic: OrLast::Present(id),
            },
            ListId::Expansion { expansion, sub } => {
                let (number, letters, part) = match sub {
                    ListSubId::Numbered(n) => (*n, OrLast::Absent, u32::MAX),
                    ListSubId::Lettered { letters, part } => (
                        u32::MAX,
                        OrLast::Present(letters.as_str()),
                        part.unwrap_or(u32::MAX),
                    ),
                };
                OrderKey {
                    expansion: expansion.ordinal(),
                    number,
                    letters,
                    part,
                    generic: OrLast::Absent,
                }
            }
        }
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListId::Expansion { expansion, sub } => write!(f, "{expansion}{sub}"),
            ListId::Generic(id) => f.write_str(id),
        }
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// A component that sorts after every present value when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrLast<T> {
    Present(T),
    Absent,
}

impl<T: Ord> Ord for OrLast<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (OrLast::Present(a), OrLast::Present(b)) => a.cmp(b),
            (OrLast::Present(_), OrLast::Absent) => Ordering::Less,
            (OrLast::Absent, OrLast::Present(_)) => Ordering::Greater,
            (OrLast::Absent, OrLast::Absent) => Ordering::Equal,
        }
    }
}

impl<T: Ord> PartialOrd for OrLast<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Flattened ordering key: (expansion, numeric sub-id, letters, part,
/// generic id), each absent component sorting last.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OrderKey<'a> {
    expansion: u32,
    number: u32,
    letters: OrLast<&'a str>,
    part: u32,
    generic: OrLast<&'a str>,
}

impl Ord for ListId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl PartialOrd for ListId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
