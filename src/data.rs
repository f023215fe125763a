//! Response-shaped views over backend state, and the request shapes callers build.
//!
//! Field names on the wire follow the backend schema (`aindex`, `birth`, `ua`, ...); the
//! Rust names describe what the value is. Everything here is created per request and
//! dropped after use.

use std::fmt;
use std::ops::Add;

use rust_decimal::{prelude::ToPrimitive, Decimal};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Backend identifier of an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u32);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AccountId {
    fn from(id: u32) -> Self {
        AccountId(id)
    }
}

/// A value as reported by the backend. JSON numbers are read through `f64`, so a
/// fractional amount keeps at most the precision of a double; decimal strings are read
/// exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount(Decimal::from(value))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0.normalize();
        if value.scale() == 0 {
            if let Some(i) = value.to_i64() {
                return serializer.serialize_i64(i);
            }
        }
        match value.to_f64() {
            Some(f) => serializer.serialize_f64(f),
            None => serializer.serialize_str(&value.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <Decimal as Deserialize>::deserialize(deserializer).map(Amount)
    }
}

/// Either a unix timestamp or a backend-formatted date string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Unix(i64),
    Text(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "PoolRepr")]
pub enum Pool {
    Transparent,
    Sapling,
    Orchard,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PoolRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<PoolRepr> for Pool {
    type Error = String;

    fn try_from(repr: PoolRepr) -> Result<Self, Self::Error> {
        match repr {
            PoolRepr::Code(0) => Ok(Pool::Transparent),
            PoolRepr::Code(1) => Ok(Pool::Sapling),
            PoolRepr::Code(2) => Ok(Pool::Orchard),
            PoolRepr::Code(code) => Err(format!("Pool code not recognized: {code}")),
            PoolRepr::Name(name) => match name.to_ascii_lowercase().as_str() {
                "transparent" => Ok(Pool::Transparent),
                "sapling" => Ok(Pool::Sapling),
                "orchard" => Ok(Pool::Orchard),
                _ => Err(format!("Pool not recognized: {name}")),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    #[serde(rename = "aindex")]
    pub account_index: u32,
    #[serde(rename = "dindex")]
    pub diversifier_index: u32,
    #[serde(rename = "birth")]
    pub birth_height: u32,
    #[serde(rename = "height")]
    pub synced_height: u32,
    pub name: String,
    pub balance: Amount,
}

/// Seed (or viewing key) and passphrase of an account. Only ever returned by the
/// explicit reveal operation.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountSecret {
    #[serde(serialize_with = "expose_optional")]
    pub seed: Option<SecretString>,
    #[serde(serialize_with = "expose_optional")]
    pub passphrase: Option<SecretString>,
    #[serde(rename = "birth")]
    pub birth_height: u32,
    #[serde(rename = "aindex")]
    pub account_index: u32,
}

fn expose_optional<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "ua")]
    pub unified: Option<String>,
    pub orchard: Option<String>,
    pub sapling: Option<String>,
    pub transparent: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub transparent: Amount,
    pub sapling: Amount,
    pub orchard: Amount,
    pub total: Amount,
}

impl Balance {
    /// Sum of the per-pool amounts. `total` is always the backend's own figure.
    pub fn pool_sum(&self) -> Amount {
        self.transparent + self.sapling + self.orchard
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub txid: String,
    pub value: Amount,
    pub fee: Amount,
    #[serde(default)]
    pub time: Option<Timestamp>,
    /// `None` while unconfirmed.
    #[serde(default)]
    pub height: Option<u32>,
}

/// A note, output or spend of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEntry {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
    pub value: Amount,
    pub pool: Pool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diversifier: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub txid: String,
    pub value: Amount,
    pub fee: Amount,
    #[serde(default)]
    pub time: Option<Timestamp>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub notes: Vec<TxEntry>,
    #[serde(default)]
    pub outputs: Vec<TxEntry>,
    #[serde(default)]
    pub spends: Vec<TxEntry>,
}

/// Parameters of a new account.
///
/// An empty `key` asks the backend to generate a fresh seed; it is sent as `""` and never
/// dropped. Absent optional fields are left out of the request.
#[derive(Debug, Default)]
pub struct NewAccount {
    pub key: String,
    pub account_index: Option<u32>,
    pub birth: Option<u32>,
    pub name: Option<String>,
    pub passphrase: Option<SecretString>,
}

impl NewAccount {
    pub fn generated(name: impl Into<String>) -> Self {
        NewAccount {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn from_key(key: impl Into<String>, name: impl Into<String>) -> Self {
        NewAccount {
            key: key.into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// One payment of a send request. Unknown fields in caller input are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// One or more account ids. A bare id is accepted wherever a list is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct AccountIds(pub Vec<AccountId>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(AccountId),
    Many(Vec<AccountId>),
}

impl From<OneOrMany> for AccountIds {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(id) => AccountIds(vec![id]),
            OneOrMany::Many(ids) => AccountIds(ids),
        }
    }
}

impl From<AccountId> for AccountIds {
    fn from(id: AccountId) -> Self {
        AccountIds(vec![id])
    }
}

impl From<Vec<AccountId>> for AccountIds {
    fn from(ids: Vec<AccountId>) -> Self {
        AccountIds(ids)
    }
}
