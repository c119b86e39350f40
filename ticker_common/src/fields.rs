//! Instrument column identifiers shared by the board and its consumers.
//!
//! `Field` names the five numeric columns that can change through an update and
//! therefore carry a flash marker. `SortKey` names every column a view can be
//! ordered by, including `symbol` and `exchangeTime`.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Numeric instrument field that is patched by updates and tracked for flashing.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum Field {
    /// Last traded price.
    Price,
    /// Traded volume over the statistics window.
    Volume,
    /// Highest price over the statistics window.
    High,
    /// Lowest price over the statistics window.
    Low,
    /// Signed price change over the statistics window, in percent.
    ChangePercent,
}

impl Field {
    /// All flashable fields in display order.
    pub const ALL: [Field; 5] = [
        Field::Price,
        Field::Volume,
        Field::High,
        Field::Low,
        Field::ChangePercent,
    ];

    /// Stable position of the field inside [`Field::ALL`].
    pub fn index(self) -> usize {
        match self {
            Field::Price => 0,
            Field::Volume => 1,
            Field::High => 2,
            Field::Low => 3,
            Field::ChangePercent => 4,
        }
    }
}

/// Column used to order a view.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    Display,
    EnumString,
    Hash,
    Eq,
    PartialEq,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum SortKey {
    /// Lexicographic order of the symbol.
    #[default]
    Symbol,
    /// Numeric order of the last price.
    Price,
    /// Numeric order of the volume.
    Volume,
    /// Numeric order of the high.
    High,
    /// Numeric order of the low.
    Low,
    /// Numeric order of the change percent.
    ChangePercent,
    /// Order of the exchange timestamp.
    ExchangeTime,
}

impl From<Field> for SortKey {
    fn from(field: Field) -> Self {
        match field {
            Field::Price => SortKey::Price,
            Field::Volume => SortKey::Volume,
            Field::High => SortKey::High,
            Field::Low => SortKey::Low,
            Field::ChangePercent => SortKey::ChangePercent,
        }
    }
}
