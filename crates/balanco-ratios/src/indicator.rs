//! The indicator vocabulary, sentinel-aware values and per-year indicator sets.

use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::ops::{Add, Mul, Sub};

/// Calculator family that produces an indicator.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Model {
    /// Liquidity, margins, returns, activity and capital structure
    #[display("ratios")]
    Ratios,
    /// Three-factor DuPont decomposition
    #[display("traditional_dupont")]
    TraditionalDupont,
    /// Economic (adjusted) DuPont decomposition
    #[display("adjusted_dupont")]
    AdjustedDupont,
}

impl Model {
    /// Every model.
    pub const ALL: [Self; 3] = [Self::Ratios, Self::TraditionalDupont, Self::AdjustedDupont];
}

/// Rounding class of an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Monetary amounts, 2 decimals
    Currency,
    /// Percentages, 1 decimal
    Percent,
    /// Plain ratios and multiples, 1 decimal
    Ratio,
    /// Day counts, no decimals
    Days,
}

impl Precision {
    /// Number of decimals kept.
    pub const fn decimals(&self) -> i32 {
        match self {
            Self::Currency => 2,
            Self::Percent | Self::Ratio => 1,
            Self::Days => 0,
        }
    }

    /// Round half away from zero to this precision.
    pub fn round(&self, value: f64) -> f64 {
        let scale = 10f64.powi(self.decimals());
        (value * scale).round() / scale
    }
}

macro_rules! indicators {
    ($($variant:ident => $name:literal, $model:ident, $precision:ident;)+) => {
        /// Every indicator the engine can produce.
        ///
        /// Declaration order is presentation order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Indicator {
            $(
                #[doc = concat!("`", $name, "`")]
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl Indicator {
            /// Every indicator, in presentation order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Machine name.
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }

            /// Model that produces the indicator.
            pub const fn model(&self) -> Model {
                match self {
                    $(Self::$variant => Model::$model,)+
                }
            }

            /// Rounding class.
            pub const fn precision(&self) -> Precision {
                match self {
                    $(Self::$variant => Precision::$precision,)+
                }
            }

            /// Look up an indicator by machine name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

indicators! {
    CurrentRatio => "current_ratio", Ratios, Ratio;
    CashRatio => "cash_ratio", Ratios, Ratio;
    QuickRatio => "quick_ratio", Ratios, Ratio;
    Ebit => "ebit", Ratios, Currency;
    Ebitda => "ebitda", Ratios, Currency;
    GrossMargin => "gross_margin", Ratios, Percent;
    EbitMargin => "ebit_margin", Ratios, Percent;
    NetMargin => "net_margin", Ratios, Percent;
    ReturnOnEquity => "roe", Ratios, Percent;
    DaysInventory => "days_inventory", Ratios, Days;
    DaysReceivables => "days_receivables", Ratios, Days;
    Purchases => "purchases", Ratios, Currency;
    DaysPayables => "days_payables", Ratios, Days;
    OperatingCycle => "operating_cycle", Ratios, Days;
    CashConversionCycle => "cash_conversion_cycle", Ratios, Days;
    EquityComposition => "equity_composition", Ratios, Percent;
    ThirdPartyComposition => "third_party_composition", Ratios, Percent;
    Equity => "equity", Ratios, Currency;
    ThirdPartyCapital => "third_party_capital", Ratios, Currency;
    NetDebtToEbitda => "net_debt_to_ebitda", Ratios, Ratio;
    InterestCoverage => "interest_coverage", Ratios, Ratio;
    Indebtedness => "indebtedness", Ratios, Percent;
    DebtProfile => "debt_profile", Ratios, Percent;
    TraditionalNetMargin => "traditional_net_margin", TraditionalDupont, Percent;
    AssetTurnover => "asset_turnover", TraditionalDupont, Ratio;
    NaiveReturnOnAssets => "naive_roa", TraditionalDupont, Percent;
    FinancialLeverage => "financial_leverage", TraditionalDupont, Ratio;
    TraditionalReturnOnEquity => "traditional_roe", TraditionalDupont, Percent;
    IncomeOnAssets => "income_on_assets", AdjustedDupont, Currency;
    NetAssets => "net_assets", AdjustedDupont, Currency;
    AfterTaxFinancialExpense => "after_tax_financial_expense", AdjustedDupont, Currency;
    AdjustedNetMargin => "adjusted_net_margin", AdjustedDupont, Percent;
    NetAssetTurnover => "net_asset_turnover", AdjustedDupont, Ratio;
    ReturnOnInvestedCapital => "roic", AdjustedDupont, Percent;
    CostOfDebt => "cost_of_debt", AdjustedDupont, Percent;
    Spread => "spread", AdjustedDupont, Percent;
    DebtLeverage => "debt_leverage", AdjustedDupont, Percent;
    LeverageContribution => "leverage_contribution", AdjustedDupont, Percent;
    AdjustedReturnOnEquity => "adjusted_roe", AdjustedDupont, Percent;
}

impl Indicator {
    /// Indicators produced by one model, in presentation order.
    pub fn for_model(model: Model) -> impl Iterator<Item = Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(move |indicator| indicator.model() == model)
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An indicator value, or the sentinel for a zero denominator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    /// A finite number
    Finite(f64),
    /// Undefined or infinite: some denominator was zero
    Unbounded,
}

impl IndicatorValue {
    /// Sentinel text used by exporters.
    pub const SENTINEL: &'static str = "inf";

    /// `numerator / denominator`, or [`Unbounded`](Self::Unbounded) when the
    /// denominator is zero.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            Self::Unbounded
        } else {
            Self::from(numerator / denominator)
        }
    }

    /// `amount / revenue * 100`, or 0 on zero revenue.
    ///
    /// Revenue-based margins are the one family where a zero denominator
    /// yields 0 instead of the sentinel.
    pub fn margin(amount: f64, revenue: f64) -> Self {
        if revenue == 0.0 {
            Self::Finite(0.0)
        } else {
            Self::ratio(amount, revenue) * 100.0
        }
    }

    /// Whether this is the sentinel.
    pub const fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// The finite value, if any.
    pub const fn finite(&self) -> Option<f64> {
        match self {
            Self::Finite(value) => Some(*value),
            Self::Unbounded => None,
        }
    }

    /// As a float; the sentinel becomes positive infinity.
    pub const fn as_f64(&self) -> f64 {
        match self {
            Self::Finite(value) => *value,
            Self::Unbounded => f64::INFINITY,
        }
    }

    /// Apply `f` to a finite value; the sentinel propagates.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Self::Finite(value) => Self::from(f(value)),
            Self::Unbounded => Self::Unbounded,
        }
    }

    /// Combine two values; the sentinel propagates from either side.
    pub fn zip_with(self, other: Self, f: impl FnOnce(f64, f64) -> f64) -> Self {
        match (self, other) {
            (Self::Finite(a), Self::Finite(b)) => Self::from(f(a, b)),
            _ => Self::Unbounded,
        }
    }

    /// Rounded to a precision class.
    pub fn rounded(self, precision: Precision) -> Self {
        self.map(|value| precision.round(value))
    }
}

impl From<f64> for IndicatorValue {
    fn from(value: f64) -> Self {
        if value == 0.0 {
            // no negative zero in output
            Self::Finite(0.0)
        } else if value.is_finite() {
            Self::Finite(value)
        } else {
            Self::Unbounded
        }
    }
}

impl Add for IndicatorValue {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl Sub for IndicatorValue {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl Mul for IndicatorValue {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a * b)
    }
}

impl Mul<f64> for IndicatorValue {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        self.map(|value| value * rhs)
    }
}

impl std::fmt::Display for IndicatorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Finite(value) => write!(f, "{}", value),
            Self::Unbounded => f.write_str(Self::SENTINEL),
        }
    }
}

impl Serialize for IndicatorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Finite(value) => serializer.serialize_f64(*value),
            Self::Unbounded => serializer.serialize_str(Self::SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for IndicatorValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Self::from(value)),
            Raw::Text(text) if text == Self::SENTINEL => Ok(Self::Unbounded),
            Raw::Text(text) => Err(serde::de::Error::custom(format!(
                "expected a number or \"{}\", got \"{}\"",
                Self::SENTINEL,
                text
            ))),
        }
    }
}

/// Indicator values for one fiscal year.
///
/// Values are rounded to their indicator's precision on insertion, and only
/// there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndicatorSet {
    values: BTreeMap<Indicator, IndicatorValue>,
}

impl IndicatorSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, rounding it to the indicator's precision.
    pub fn insert(&mut self, indicator: Indicator, value: impl Into<IndicatorValue>) {
        let value = value.into().rounded(indicator.precision());
        self.values.insert(indicator, value);
    }

    /// Value of an indicator.
    pub fn get(&self, indicator: Indicator) -> Option<IndicatorValue> {
        self.values.get(&indicator).copied()
    }

    /// Finite value of an indicator, if present and not the sentinel.
    pub fn finite(&self, indicator: Indicator) -> Option<f64> {
        self.get(indicator).and_then(|value| value.finite())
    }

    /// Iterate in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = (Indicator, IndicatorValue)> + '_ {
        self.values.iter().map(|(indicator, value)| (*indicator, *value))
    }

    /// Number of indicators present.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no indicator is present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
