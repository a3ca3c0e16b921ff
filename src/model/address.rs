//! Email addresses and the ordered address lists used for to/cc/bcc.
//!
//! An address field can be supplied in several shapes: a bare string, an
//! `(email, name)` pair, a list of either, or (in message files) a mapping of
//! email to name. All of them normalize into an [`AddressList`].

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// A single email address with an optional display name.
///
/// # Examples
/// - `"Juan García <juan@ejemplo.com>"` → `display_name = Some("Juan García")`, `address = "juan@ejemplo.com"`
/// - `"user@example.com"` → `display_name = None`, `address = "user@example.com"`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EmailAddress {
    /// The bare email address (`user@domain`).
    pub address: String,
    /// Human-readable display name.
    pub display_name: Option<String>,
}

impl EmailAddress {
    /// Create an address without a display name.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            display_name: None,
        }
    }

    /// Create an address with a display name. An empty name counts as no name.
    pub fn with_name(address: impl Into<String>, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        Self {
            address: address.into(),
            display_name: (!display_name.is_empty()).then_some(display_name),
        }
    }

    /// Parse a single email address from a string.
    ///
    /// Supported formats:
    /// - `"user@domain.com"`
    /// - `"<user@domain.com>"`
    /// - `"Display Name <user@domain.com>"`
    /// - `"\"Display, Name\" <user@domain.com>"`
    ///
    /// Anything else is stored as-is in `address`; no syntax validation is done.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let (Some(angle_start), Some(angle_end)) = (trimmed.rfind('<'), trimmed.rfind('>')) {
            if angle_end > angle_start {
                let addr = trimmed[angle_start + 1..angle_end].trim();
                let name = strip_quotes(&trimmed[..angle_start]);
                return Self::with_name(addr, name);
            }
        }

        Self::new(trimmed)
    }

    /// The display name, if one is set.
    pub fn name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Format for display: `"Display Name <address>"` or just `"address"`.
    pub fn display(&self) -> String {
        match &self.display_name {
            Some(name) => format!("{} <{}>", name, self.address),
            None => self.address.clone(),
        }
    }
}

/// Strip surrounding double-quotes and trim whitespace.
fn strip_quotes(s: &str) -> String {
    let trimmed = s.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for EmailAddress {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for EmailAddress {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&String> for EmailAddress {
    fn from(raw: &String) -> Self {
        Self::parse(raw)
    }
}

impl<E: Into<String>, N: Into<String>> From<(E, N)> for EmailAddress {
    fn from((address, name): (E, N)) -> Self {
        Self::with_name(address, name)
    }
}

/// Ordered mapping of email address to optional display name.
///
/// Inserting an address that is already present replaces its display name
/// and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AddressList(Vec<EmailAddress>);

impl AddressList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an address, replacing the name of an existing entry with the same email.
    pub fn insert(&mut self, address: impl Into<EmailAddress>) {
        let address = address.into();
        match self.0.iter_mut().find(|a| a.address == address.address) {
            Some(existing) => existing.display_name = address.display_name,
            None => self.0.push(address),
        }
    }

    /// First address in the list.
    pub fn first(&self) -> Option<&EmailAddress> {
        self.0.first()
    }

    /// Borrow the addresses as a slice.
    pub fn as_slice(&self) -> &[EmailAddress] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the list, returning the first address.
    pub fn into_first(self) -> Option<EmailAddress> {
        self.0.into_iter().next()
    }
}

impl<A: Into<EmailAddress>> FromIterator<A> for AddressList {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        let mut list = Self::new();
        for address in iter {
            list.insert(address);
        }
        list
    }
}

impl From<EmailAddress> for AddressList {
    fn from(address: EmailAddress) -> Self {
        Self(vec![address])
    }
}

impl From<&str> for AddressList {
    fn from(raw: &str) -> Self {
        EmailAddress::parse(raw).into()
    }
}

impl From<String> for AddressList {
    fn from(raw: String) -> Self {
        EmailAddress::parse(&raw).into()
    }
}

impl<E: Into<String>, N: Into<String>> From<(E, N)> for AddressList {
    fn from(pair: (E, N)) -> Self {
        EmailAddress::from(pair).into()
    }
}

impl<A: Into<EmailAddress>> From<Vec<A>> for AddressList {
    fn from(addresses: Vec<A>) -> Self {
        addresses.into_iter().collect()
    }
}

impl<A: Into<EmailAddress>, const N: usize> From<[A; N]> for AddressList {
    fn from(addresses: [A; N]) -> Self {
        addresses.into_iter().collect()
    }
}

/// Accepts `"a@b.com"`, `["a@b.com", "c@d.com"]` or `{ "a@b.com" = "Name", "c@d.com" = null }`.
impl<'de> Deserialize<'de> for AddressList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AddressListVisitor;

        impl<'de> Visitor<'de> for AddressListVisitor {
            type Value = AddressList;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an address string, a list of addresses, or a map of address to name")
            }

            fn visit_str<E>(self, value: &str) -> Result<AddressList, E>
            where
                E: de::Error,
            {
                Ok(AddressList::from(value))
            }

            fn visit_seq<V>(self, mut seq: V) -> Result<AddressList, V::Error>
            where
                V: SeqAccess<'de>,
            {
                let mut list = AddressList::new();
                while let Some(raw) = seq.next_element::<String>()? {
                    list.insert(raw);
                }
                Ok(list)
            }

            fn visit_map<V>(self, mut map: V) -> Result<AddressList, V::Error>
            where
                V: MapAccess<'de>,
            {
                let mut list = AddressList::new();
                while let Some((address, name)) = map.next_entry::<String, Option<String>>()? {
                    list.insert(match name {
                        Some(name) => EmailAddress::with_name(address, name),
                        None => EmailAddress::new(address),
                    });
                }
                Ok(list)
            }
        }

        deserializer.deserialize_any(AddressListVisitor)
    }
}
