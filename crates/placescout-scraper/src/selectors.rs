//! Structural locators for the map results surface.
//!
//! The class names are the obfuscated ones the search surface renders today.
//! They change without notice; when extraction starts coming back empty,
//! this table is the first place to look.

/// Scrollable results panel. Only the panel carries an `aria-label`.
pub const RESULTS_CONTAINER: &str = ".m6QErb[aria-label]";

/// One anchor per rendered result; its `href` carries the listing reference.
pub const RESULT_LINK: &str = "a.hfpxzc";

/// Present once the detail view for a place has rendered its header.
pub const DETAIL_READY: &str = ".DUwDvf";

/// "About" tab on the detail view.
pub const ABOUT_TAB: &str = "button.hh2c6[data-tab-index='2']";

/// Rows of the opening-hours table.
pub const HOURS_ROWS: &str = ".bJzME.Hu9e2e.tTVLSc .t39EBf.GUrTXd table.eK4R0e tbody tr";
pub const HOURS_DAY_CELL: &str = "td.ylH6lf > div";
pub const HOURS_VALUE_CELL: &str = "td.mxowUb ul li.G8aQO";

/// Service groups on the "About" tab.
pub const SERVICE_GROUPS: &str = ".m6QErb.DxyBCb.kA9KIf.dS8AEf .iP2t7d";
pub const SERVICE_GROUP_TITLE: &str = "h2";
pub const SERVICE_ITEM: &str = "ul li span";

/// Class fragment on `li` entries that are UI chrome rather than services.
pub const NON_SERVICE_CLASS: &str = "WeoVJe";

/// How a [`DetailField`] value is read from its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    Text,
    Attribute(&'static str),
}

/// Scalar fields read from the primary detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    Title,
    Rating,
    Reviews,
    Category,
    Address,
    Phone,
    Website,
}

impl DetailField {
    pub const ALL: [DetailField; 7] = [
        DetailField::Title,
        DetailField::Rating,
        DetailField::Reviews,
        DetailField::Category,
        DetailField::Address,
        DetailField::Phone,
        DetailField::Website,
    ];

    #[must_use]
    pub fn selector(self) -> &'static str {
        match self {
            DetailField::Title => ".iD2gKb.W1neJ",
            DetailField::Rating => ".F7nice > span:nth-child(1) > span:nth-child(1)",
            DetailField::Reviews => ".F7nice > span:nth-child(2) > span > span",
            DetailField::Category => ".skqShb .DkEaL",
            DetailField::Address => {
                ".bJzME.Hu9e2e.tTVLSc .CsEnBe[data-item-id='address'] > .AeaXub > .rogA2c"
            }
            DetailField::Phone => {
                ".bJzME.Hu9e2e.tTVLSc .CsEnBe[data-item-id^='phone'] > .AeaXub > .rogA2c"
            }
            DetailField::Website => ".bJzME.Hu9e2e.tTVLSc .CsEnBe[data-item-id='authority']",
        }
    }

    #[must_use]
    pub fn read_mode(self) -> ReadMode {
        match self {
            DetailField::Website => ReadMode::Attribute("href"),
            _ => ReadMode::Text,
        }
    }

    /// Field name used in logs and field issues.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DetailField::Title => "title",
            DetailField::Rating => "rating",
            DetailField::Reviews => "reviews",
            DetailField::Category => "type",
            DetailField::Address => "address",
            DetailField::Phone => "phone",
            DetailField::Website => "website",
        }
    }
}
