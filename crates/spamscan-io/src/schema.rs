//! The fixed Spambase column layout.

/// Column names in file order: 48 word frequencies, 6 character
/// frequencies, 3 capital-run statistics, then the label.
pub const SPAMBASE_COLUMNS: [&str; 58] = [
    "make",
    "address",
    "all",
    "3d",
    "our",
    "over",
    "remove",
    "internet",
    "order",
    "mail",
    "receive",
    "will",
    "people",
    "report",
    "addresses",
    "free",
    "business",
    "email",
    "you",
    "credit",
    "your",
    "font",
    "000",
    "money",
    "hp",
    "hpl",
    "george",
    "650",
    "lab",
    "labs",
    "telnet",
    "857",
    "data",
    "415",
    "85",
    "technology",
    "1999",
    "parts",
    "pm",
    "direct",
    "cs",
    "meeting",
    "original",
    "project",
    "re",
    "edu",
    "table",
    "conference",
    ";",
    "(",
    "[",
    "!",
    "$",
    "#",
    "capital_run_length_average",
    "capital_run_length_longest",
    "capital_run_length_total",
    "target",
];

/// Name of the label column.
pub const LABEL_COLUMN: &str = "target";

/// Number of feature columns (every column but the label).
pub const N_FEATURES: usize = SPAMBASE_COLUMNS.len() - 1;

/// Owned feature column names, label excluded.
#[must_use]
pub fn feature_names() -> Vec<String> {
    SPAMBASE_COLUMNS[..N_FEATURES]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}
