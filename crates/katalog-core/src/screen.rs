//! Per-item screening applied before a row is written.
//!
//! Screening covers everything that can be decided from the item alone.
//! Existence and reference checks need storage and live in the importer.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::payload::{NamedItem, ProdukItem};

/// `NUMERIC(10,2)` holds values strictly below this bound.
const PRICE_CEILING: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Why an item was counted as skipped instead of created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingField(&'static str),
    /// The id is present but negative.
    InvalidId(&'static str),
    InvalidPrice,
    NegativePrice,
    AlreadyExists,
    UnknownKategori,
    UnknownStatus,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing {field}"),
            Self::InvalidId(field) => write!(f, "negative {field}"),
            Self::InvalidPrice => write!(f, "price is not a decimal"),
            Self::NegativePrice => write!(f, "price is negative"),
            Self::AlreadyExists => write!(f, "id already exists"),
            Self::UnknownKategori => write!(f, "kategori does not exist"),
            Self::UnknownStatus => write!(f, "status does not exist"),
        }
    }
}

/// A category or status that passed screening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNamed {
    pub id: i64,
    pub name: String,
}

/// A product that passed screening. References are still unchecked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduk {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub category_id: i64,
    pub status_id: i64,
}

impl NamedItem {
    /// # Errors
    ///
    /// Returns [`SkipReason::MissingField`] when the id is absent or zero, or
    /// the name is absent or blank, and [`SkipReason::InvalidId`] for a
    /// negative id.
    pub fn screen(&self) -> Result<NewNamed, SkipReason> {
        let id = positive_id(self.id, "id")?;
        let name = non_blank(self.name.as_deref()).ok_or(SkipReason::MissingField("name"))?;
        Ok(NewNamed {
            id,
            name: name.to_string(),
        })
    }
}

impl ProdukItem {
    /// Checks required fields first, then the price.
    ///
    /// # Errors
    ///
    /// Returns the first [`SkipReason`] that applies.
    pub fn screen(&self) -> Result<NewProduk, SkipReason> {
        let id = positive_id(self.id, "id")?;
        let name = non_blank(self.name.as_deref()).ok_or(SkipReason::MissingField("name"))?;
        let raw_price = non_blank(self.price.as_deref()).ok_or(SkipReason::MissingField("price"))?;
        let category_id = positive_id(self.category_id, "kategori")?;
        let status_id = positive_id(self.status_id, "status")?;

        Ok(NewProduk {
            id,
            name: name.to_string(),
            price: parse_price(raw_price)?,
            category_id,
            status_id,
        })
    }
}

/// Parses a raw price token into a two-place decimal.
///
/// Accepts plain (`"12500"`, `"12500.50"`) and scientific (`"1.25e4"`)
/// notation. Values are rounded to cents.
///
/// # Errors
///
/// [`SkipReason::InvalidPrice`] for unparseable or out-of-range input,
/// [`SkipReason::NegativePrice`] for values below zero.
pub fn parse_price(raw: &str) -> Result<Decimal, SkipReason> {
    let trimmed = raw.trim();
    let price = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| SkipReason::InvalidPrice)?;

    if price.is_sign_negative() && !price.is_zero() {
        return Err(SkipReason::NegativePrice);
    }

    let price = price.round_dp(2);
    if price >= PRICE_CEILING {
        return Err(SkipReason::InvalidPrice);
    }
    Ok(price)
}

/// Zero is falsy and counts as missing.
fn positive_id(id: Option<i64>, field: &'static str) -> Result<i64, SkipReason> {
    match id {
        None | Some(0) => Err(SkipReason::MissingField(field)),
        Some(id) if id < 0 => Err(SkipReason::InvalidId(field)),
        Some(id) => Ok(id),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn produk(price: &str) -> ProdukItem {
        ProdukItem {
            id: Some(6),
            name: Some("  Kertas A4 ".to_string()),
            price: Some(price.to_string()),
            category_id: Some(1),
            status_id: Some(1),
        }
    }

    #[test]
    fn named_item_trims_name() {
        let item = NamedItem::new(3, "  ATK  ");
        assert_eq!(
            item.screen(),
            Ok(NewNamed {
                id: 3,
                name: "ATK".to_string()
            })
        );
    }

    #[test]
    fn named_item_rejects_blank_name_and_bad_id() {
        assert_eq!(
            NamedItem::new(3, "   ").screen(),
            Err(SkipReason::MissingField("name"))
        );
        assert_eq!(
            NamedItem::new(0, "ATK").screen(),
            Err(SkipReason::MissingField("id"))
        );
        assert_eq!(
            NamedItem::default().screen(),
            Err(SkipReason::MissingField("id"))
        );
    }

    #[test]
    fn negative_ids_are_invalid_not_missing() {
        assert_eq!(
            NamedItem::new(-3, "ATK").screen(),
            Err(SkipReason::InvalidId("id"))
        );

        let mut item = produk("12500");
        item.id = Some(-3);
        assert_eq!(item.screen(), Err(SkipReason::InvalidId("id")));

        let mut item = produk("12500");
        item.category_id = Some(-1);
        assert_eq!(item.screen(), Err(SkipReason::InvalidId("kategori")));

        let mut item = produk("12500");
        item.id = Some(0);
        assert_eq!(item.screen(), Err(SkipReason::MissingField("id")));
    }

    #[test]
    fn produk_screen_builds_decimal_price() {
        let screened = produk("12500").screen().expect("valid item");
        assert_eq!(screened.id, 6);
        assert_eq!(screened.name, "Kertas A4");
        assert_eq!(screened.price, Decimal::new(12500, 0));
    }

    #[test]
    fn produk_screen_reports_missing_fields_before_price() {
        let mut item = produk("abc");
        item.status_id = None;
        assert_eq!(item.screen(), Err(SkipReason::MissingField("status")));

        let mut item = produk("12500");
        item.price = Some(String::new());
        assert_eq!(item.screen(), Err(SkipReason::MissingField("price")));
    }

    #[test]
    fn produk_screen_rejects_unparseable_price() {
        assert_eq!(produk("abc").screen(), Err(SkipReason::InvalidPrice));
    }

    #[test]
    fn parse_price_accepts_zero_and_fractions() {
        assert_eq!(parse_price("0"), Ok(Decimal::ZERO));
        assert_eq!(parse_price(" 12500.50 "), Ok(Decimal::new(1_250_050, 2)));
        assert_eq!(parse_price("1.25e4"), Ok(Decimal::new(12500, 0)));
        assert_eq!(parse_price("9.999"), Ok(Decimal::new(1000, 2)));
    }

    #[test]
    fn parse_price_rejects_negative_and_out_of_range() {
        assert_eq!(parse_price("-1"), Err(SkipReason::NegativePrice));
        assert_eq!(parse_price("100000000"), Err(SkipReason::InvalidPrice));
        assert_eq!(parse_price(""), Err(SkipReason::InvalidPrice));
    }

    #[test]
    fn skip_reason_display() {
        assert_eq!(SkipReason::MissingField("price").to_string(), "missing price");
        assert_eq!(SkipReason::UnknownStatus.to_string(), "status does not exist");
        assert_eq!(SkipReason::InvalidId("id").to_string(), "negative id");
    }
}
