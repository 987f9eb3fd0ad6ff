//! Value Objects for the supermarket domain

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("unknown category code {0}")]
    UnknownCategoryCode(i64),
    #[error("price must be positive")]
    NonPositivePrice,
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("stock cannot be negative")]
    NegativeStock,
    #[error("stock cannot exceed {max}")]
    StockOutOfRange { max: u32 },
    #[error("rating must be between 1 and 5")]
    RatingOutOfRange,
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("username exceeds {max} characters")]
    UsernameTooLong { max: usize },
    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

/// Money in minor units (kobo) of the store currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const CURRENCY: &'static str = "NGN";
    pub const ZERO: Money = Money(0);

    pub fn from_minor(amount: i64) -> Self { Self(amount) }
    pub fn from_major(naira: i64) -> Self { Self(naira.saturating_mul(100)) }
    pub fn minor(&self) -> i64 { self.0 }

    /// A catalog price: strictly positive.
    pub fn price(amount: i64) -> Result<Self, ValueError> {
        if amount <= 0 { return Err(ValueError::NonPositivePrice); }
        Ok(Self(amount))
    }

    pub fn checked_add(self, other: Money) -> Option<Money> { self.0.checked_add(other.0).map(Money) }
    pub fn checked_mul(self, qty: Quantity) -> Option<Money> { self.0.checked_mul(i64::from(qty.value())).map(Money) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let major = (abs / 100).to_string();
        let mut grouped = String::with_capacity(major.len() + major.len() / 3);
        for (i, ch) in major.chars().enumerate() {
            if i > 0 && (major.len() - i) % 3 == 0 { grouped.push(','); }
            grouped.push(ch);
        }
        write!(f, "{sign}₦{grouped}.{:02}", abs % 100)
    }
}

/// Positive item count for carts and order lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Result<Self, ValueError> {
        if value == 0 { return Err(ValueError::ZeroQuantity); }
        Ok(Self(value))
    }
    pub fn value(&self) -> u32 { self.0 }
    pub fn add(&self, other: Quantity) -> Self { Self(self.0.saturating_add(other.0)) }
}

impl TryFrom<u32> for Quantity {
    type Error = ValueError;
    fn try_from(value: u32) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self { q.0 }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Fixed product categories. Codes are stored next to the name and must never be renumbered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Foods,
    Groceries,
    Electronics,
    Clothes,
    Accessories,
    Pets,
    Drinks,
    Shoes,
    Other,
    Stuff,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Foods,
        Category::Groceries,
        Category::Electronics,
        Category::Clothes,
        Category::Accessories,
        Category::Pets,
        Category::Drinks,
        Category::Shoes,
        Category::Other,
        Category::Stuff,
    ];

    pub fn code(&self) -> i64 {
        match self {
            Self::Foods => 1,
            Self::Groceries => 2,
            Self::Electronics => 3,
            Self::Clothes => 4,
            Self::Accessories => 5,
            Self::Pets => 6,
            Self::Drinks => 7,
            Self::Shoes => 8,
            Self::Other => 9,
            Self::Stuff => 10,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, ValueError> {
        Self::ALL.into_iter().find(|c| c.code() == code).ok_or(ValueError::UnknownCategoryCode(code))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Foods => "foods",
            Self::Groceries => "groceries",
            Self::Electronics => "electronics",
            Self::Clothes => "clothes",
            Self::Accessories => "accessories",
            Self::Pets => "pets",
            Self::Drinks => "drinks",
            Self::Shoes => "shoes",
            Self::Other => "other",
            Self::Stuff => "stuff",
        }
    }
}

impl FromStr for Category {
    type Err = ValueError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.as_str() == wanted).ok_or_else(|| ValueError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Star rating, 1 through 5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if !(1..=5).contains(&value) { return Err(ValueError::RatingOutOfRange); }
        Ok(Self(value))
    }
    pub fn value(&self) -> u8 { self.0 }
}

impl TryFrom<u8> for Rating {
    type Error = ValueError;
    fn try_from(value: u8) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<Rating> for u8 {
    fn from(r: Rating) -> Self { r.0 }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    pub const MAX_LEN: usize = 64;

    pub fn new(value: impl Into<String>) -> Result<Self, ValueError> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(ValueError::EmptyUsername); }
        if value.chars().count() > Self::MAX_LEN { return Err(ValueError::UsernameTooLong { max: Self::MAX_LEN }); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Hex SHA-256 of a password.
///
/// Unsalted, matching the digests already stored by earlier deployments of the shop.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    pub fn of(password: &str) -> Self {
        Self(format!("{:x}", Sha256::digest(password.as_bytes())))
    }
    pub fn from_stored(hex: impl Into<String>) -> Self { Self(hex.into()) }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn matches(&self, password: &str) -> bool { *self == Self::of(password) }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("PasswordDigest(..)") }
}
