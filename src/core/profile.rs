//! Portal versions.
//!
//! Each portal redesign changed the markup and the label wording. A version is
//! an immutable bundle of extraction rules, label tables and the bridge methods
//! that return its fragments. The tables need updating whenever the portal's
//! HTML changes.

use crate::core::extract::{ExtractionRule, FlagRule, Lookup};
use crate::core::labels::LabelEntry;
use crate::core::parsers::ValueParser::{Currency, DataCap, Date, Duration, Quantity};
use crate::error::{Play24Error, Result};

/// A remote method exposed by the portal's AJAX bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeMethod {
    pub script: &'static str,
    pub method: &'static str,
    /// Positional parameters, already in bridge notation (`string:...`).
    pub params: &'static [&'static str],
}

/// Everything needed to turn one portal version's fragments into a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalProfile {
    pub version: PortalVersion,
    pub balance_rule: ExtractionRule,
    pub balance_labels: &'static [LabelEntry],
    pub services_rule: ExtractionRule,
    pub service_labels: &'static [LabelEntry],
    pub balance_call: BridgeMethod,
    pub services_call: BridgeMethod,
}

impl PortalProfile {
    /// Canonical balance keys in table order, deduplicated.
    #[must_use]
    pub fn balance_keys(&self) -> Vec<&'static str> {
        unique_keys(self.balance_labels)
    }

    /// Canonical service keys in table order, deduplicated.
    #[must_use]
    pub fn service_keys(&self) -> Vec<&'static str> {
        unique_keys(self.service_labels)
    }
}

fn unique_keys(table: &[LabelEntry]) -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = Vec::with_capacity(table.len());
    for entry in table {
        if !keys.contains(&entry.key) {
            keys.push(entry.key);
        }
    }
    keys
}

/// Known portal versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortalVersion {
    /// Current portal: Bulma levels in the balance modal, image tiles for services.
    #[default]
    Tiles,
    /// Previous portal: balance table and a plain services list.
    Legacy,
}

impl PortalVersion {
    pub const ALL: &'static [Self] = &[Self::Tiles, Self::Legacy];

    /// Parse from a config or CLI value (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Play24Error::Config`] for an unknown version name.
    pub fn from_arg(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tiles" => Ok(Self::Tiles),
            "legacy" => Ok(Self::Legacy),
            other => Err(Play24Error::Config(format!(
                "Unknown portal version '{other}'. Valid versions: tiles, legacy"
            ))),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tiles => "tiles",
            Self::Legacy => "legacy",
        }
    }

    #[must_use]
    pub fn profile(self) -> &'static PortalProfile {
        match self {
            Self::Tiles => &TILES,
            Self::Legacy => &LEGACY,
        }
    }
}

impl std::fmt::Display for PortalVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Tiles
// =============================================================================

const TILES_BALANCE_LABELS: &[LabelEntry] = &[
    LabelEntry::plain("Konto", "balance_PLN", Currency),
    LabelEntry::plain(
        "Data wa\u{17c}no\u{15b}ci po\u{142}\u{105}cze\u{144} wychodz\u{105}cych",
        "outgoing_expiration_date",
        Date,
    ),
    LabelEntry::plain(
        "Data wa\u{17c}no\u{15b}ci po\u{142}\u{105}cze\u{144} przychodz\u{105}cych",
        "incoming_expiration_date",
        Date,
    ),
    LabelEntry::plain("Liczba promocyjnych GB", "free_data_GB", DataCap),
    LabelEntry::plain("Limit GB w roamingu UE", "cheaper_roaming_EU_data_GB", DataCap),
    LabelEntry::plain("SMS-y do wszystkich", "SMS_all_count", Quantity),
];

const TILES_SERVICE_LABELS: &[LabelEntry] = &[
    LabelEntry::tile("Noce bez limitu", false, "no_data_limit_nights"),
    LabelEntry::tile("Noce bez limitu", true, "no_data_limit_nights_recurring"),
    LabelEntry::tile(
        "Dzie\u{144} bez limitu w Play Internet na Kart\u{119}",
        false,
        "no_data_limit_day",
    ),
    LabelEntry::tile("Tydzie\u{144} bez limitu GB", false, "no_data_limit_week"),
    LabelEntry::tile("Miesi\u{105}c bez limitu GB", false, "no_data_limit_month"),
    LabelEntry::tile("Miesi\u{105}c bez limitu GB", true, "no_data_limit_month_recurring"),
    LabelEntry::tile(
        "Ta\u{144}sze po\u{142}\u{105}czenia i smsy na Ukrain\u{119}",
        true,
        "cheaper_UA",
    ),
    LabelEntry::tile("1000 minut na Ukrain\u{119}", false, "voice_bundle_1000min_UA"),
    LabelEntry::tile(
        "1000 minut na Ukrain\u{119} + 10 GB na Viber",
        false,
        "voice_bundle_1000min_UA_Viber_10GB",
    ),
    LabelEntry::tile(
        "Pakiet 1000 minut na Ukrain\u{119} i...",
        false,
        "voice_bundle_1000min_UA_unlimited_PL",
    ),
    LabelEntry::tile(
        "Pakiet 1000 minut na Ukrain\u{119} i...",
        true,
        "voice_bundle_1000min_UA_unlimited_PL_recurring",
    ),
    LabelEntry::tile("Roaming zagraniczny", false, "roaming"),
    LabelEntry::tile("500 MB do wykorzystania w UE", false, "roaming_EU_data_bundle_500MB"),
    LabelEntry::tile("1 GB do wykorzystania w UE", false, "roaming_EU_data_bundle_1GB"),
    LabelEntry::tile("3 GB do wykorzystania w UE", false, "roaming_EU_data_bundle_3GB"),
    LabelEntry::tile("Pakiet Internet Emiraty 150 MB", false, "roaming_AE_data_bundle_150MB"),
    LabelEntry::tile("Pakiet Internet \u{15a}wiat 1 GB", false, "roaming_data_bundle_1GB"),
    LabelEntry::tile("Pakiet Internet \u{15a}wiat 300 MB", false, "roaming_data_bundle_300MB"),
    LabelEntry::tile("29 gr za minut\u{119} do Bangladeszu", false, "voice_29_BD"),
    LabelEntry::tile("29 gr za minut\u{119} do Indii", false, "voice_29_IN"),
    LabelEntry::tile("70 gr za minut\u{119} do Nepalu", false, "voice_29_NP"),
    LabelEntry::tile("Taniej do Bangladeszu", false, "cheaper_BD"),
    LabelEntry::tile("Taniej do Indii", false, "cheaper_IN"),
    LabelEntry::tile("Taniej do Nepalu", false, "cheaper_NP"),
    LabelEntry::tile(
        "Przed\u{142}u\u{17c}enie wa\u{17c}no\u{15b}ci konta o 7 dni",
        false,
        "extend_7days",
    ),
    LabelEntry::tile(
        "Przed\u{142}u\u{17c}enie wa\u{17c}no\u{15b}ci konta o 31 dni",
        false,
        "extend_31days",
    ),
    LabelEntry::tile(
        "Przed\u{142}u\u{17c}enie wa\u{17c}no\u{15b}ci konta o 365 dni",
        false,
        "extend_365days",
    ),
];

static TILES: PortalProfile = PortalProfile {
    version: PortalVersion::Tiles,
    balance_rule: ExtractionRule {
        row: "div.border-apla > div[class='level']",
        label: Lookup::Child("div.level-left"),
        value: Lookup::Child("div.level-item"),
        flag: None,
        allow_empty: false,
    },
    balance_labels: TILES_BALANCE_LABELS,
    services_rule: ExtractionRule {
        row: "div.image-tile",
        label: Lookup::Descendant("p.tile-title"),
        value: Lookup::Descendant("div.active-label"),
        flag: Some(FlagRule {
            selector: "div.tile-actions > div",
            contains: Some("miesi\u{119}cznie"),
        }),
        allow_empty: true,
    },
    service_labels: TILES_SERVICE_LABELS,
    balance_call: BridgeMethod {
        script: "balanceRemoteService",
        method: "getBalances",
        params: &[],
    },
    services_call: BridgeMethod {
        script: "servicesRemoteService",
        method: "getComponentsList",
        params: &["string:PACKAGES"],
    },
};

// =============================================================================
// Legacy
// =============================================================================

const LEGACY_BALANCE_LABELS: &[LabelEntry] = &[
    LabelEntry::plain("Stan konta", "balance_PLN", Currency),
    LabelEntry::plain(
        "Wa\u{17c}no\u{15b}\u{107} konta dla po\u{142}\u{105}cze\u{144} wychodz\u{105}cych",
        "outgoing_expiration_date",
        Date,
    ),
    LabelEntry::plain(
        "Wa\u{17c}no\u{15b}\u{107} konta dla po\u{142}\u{105}cze\u{144} przychodz\u{105}cych",
        "incoming_expiration_date",
        Date,
    ),
    LabelEntry::plain("Pakiet internetowy", "free_data_GB", DataCap),
    LabelEntry::plain("Minuty do wszystkich sieci", "voice_minutes", Duration),
    LabelEntry::plain("SMS-y do wszystkich sieci", "SMS_all_count", Quantity),
];

const LEGACY_SERVICE_LABELS: &[LabelEntry] = &[
    LabelEntry::tile("Nielimitowane noce", false, "no_data_limit_nights"),
    LabelEntry::tile("Nielimitowane noce", true, "no_data_limit_nights_recurring"),
    LabelEntry::tile("Roaming", false, "roaming"),
    LabelEntry::tile("Internet w UE 1 GB", false, "roaming_EU_data_bundle_1GB"),
    LabelEntry::tile(
        "Wa\u{17c}no\u{15b}\u{107} konta +31 dni",
        false,
        "extend_31days",
    ),
];

static LEGACY: PortalProfile = PortalProfile {
    version: PortalVersion::Legacy,
    balance_rule: ExtractionRule {
        row: "table.balances tr",
        label: Lookup::Child("th"),
        value: Lookup::Child("td"),
        flag: None,
        allow_empty: false,
    },
    balance_labels: LEGACY_BALANCE_LABELS,
    services_rule: ExtractionRule {
        row: "ul.services > li.service",
        label: Lookup::Descendant("span.name"),
        value: Lookup::Descendant("span.state"),
        flag: Some(FlagRule {
            selector: "span.cycle",
            contains: None,
        }),
        allow_empty: true,
    },
    service_labels: LEGACY_SERVICE_LABELS,
    balance_call: BridgeMethod {
        script: "balanceRemoteService",
        method: "getBalances",
        params: &[],
    },
    services_call: BridgeMethod {
        script: "servicesRemoteService",
        method: "getComponentsList",
        params: &["string:SERVICES"],
    },
};
