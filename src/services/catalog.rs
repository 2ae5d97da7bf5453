// src/services/catalog.rs
use crate::models::{Instrument, ModeDefaults, ViewMode};

macro_rules! instrument {
    ($key:literal, $symbol:literal, $label:literal) => {
        Instrument {
            key: $key,
            symbol: $symbol,
            label: $label,
        }
    };
}

pub const EQUITIES: &[Instrument] = &[
    instrument!("apple", "AAPL", "Apple"),
    instrument!("microsoft", "MSFT", "Microsoft"),
    instrument!("amazon", "AMZN", "Amazon"),
    instrument!("google", "GOOGL", "Google"),
    instrument!("nvidia", "NVDA", "NVIDIA"),
    instrument!("meta", "META", "Meta"),
    instrument!("tesla", "TSLA", "Tesla"),
    instrument!("micron", "MU", "Micron"),
    instrument!("visa", "V", "Visa"),
    instrument!("exxonmobil", "XOM", "Exxon Mobil"),
    instrument!("disney", "DIS", "Disney"),
    instrument!("comcast", "CMCSA", "Comcast"),
    instrument!("bristolmyers", "BMY", "Bristol Myers Squibb"),
    instrument!("raytheon", "RTX", "RTX"),
];

pub const COMMODITIES: &[Instrument] = &[
    // Precious metals
    instrument!("gold", "GC=F", "Gold"),
    instrument!("silver", "SI=F", "Silver"),
    instrument!("platinum", "PL=F", "Platinum"),
    instrument!("palladium", "PA=F", "Palladium"),
    // Energy
    instrument!("crude_oil", "CL=F", "WTI Crude Oil"),
    instrument!("brent", "BZ=F", "Brent Crude"),
    instrument!("natural_gas", "NG=F", "Natural Gas"),
    instrument!("gasoline", "RB=F", "Gasoline"),
    instrument!("heating_oil", "HO=F", "Heating Oil"),
    // Grains
    instrument!("corn", "ZC=F", "Corn"),
    instrument!("wheat", "ZW=F", "Wheat"),
    instrument!("soybeans", "ZS=F", "Soybeans"),
    instrument!("soy_oil", "ZL=F", "Soybean Oil"),
    instrument!("soy_meal", "ZM=F", "Soybean Meal"),
    // Softs
    instrument!("coffee", "KC=F", "Coffee"),
    instrument!("sugar", "SB=F", "Sugar"),
    instrument!("cotton", "CT=F", "Cotton"),
    instrument!("cocoa", "CC=F", "Cocoa"),
];

/// Number of instruments preselected when the caller does not choose.
pub const DEFAULT_SELECTION_LEN: usize = 5;

/// Ordered catalog for a view mode.
pub fn resolve(mode: ViewMode) -> &'static [Instrument] {
    match mode {
        ViewMode::Equity => EQUITIES,
        ViewMode::Commodity => COMMODITIES,
    }
}

pub fn defaults(mode: ViewMode) -> ModeDefaults {
    match mode {
        ViewMode::Equity => ModeDefaults {
            days_min: 5,
            days_max: 180,
            days_default: 90,
            relative_default: false,
        },
        ViewMode::Commodity => ModeDefaults {
            days_min: 5,
            days_max: 900,
            days_default: 180,
            relative_default: true,
        },
    }
}

pub fn find(mode: ViewMode, key: &str) -> Option<&'static Instrument> {
    resolve(mode).iter().find(|i| i.key == key)
}

pub fn default_selection(mode: ViewMode) -> Vec<&'static Instrument> {
    resolve(mode).iter().take(DEFAULT_SELECTION_LEN).collect()
}

pub fn title(mode: ViewMode) -> &'static str {
    match mode {
        ViewMode::Equity => "US Stocks",
        ViewMode::Commodity => "Commodities",
    }
}
