//! The canonical sales cleaning rules.
//!
//! Rules run in the order listed by [`canonical_rules`]. Numbers 11 and 12
//! are restatements of rules 5 and 4 and have no executable counterpart.

mod completeness;
mod duplicate;
mod format;
mod normalize;
mod range;

use std::sync::Arc;

use sales_model::{DropReason, fields};

pub use completeness::{DropWhenNull, NullPolicy};
pub use duplicate::DropDuplicates;
pub use format::{DropCoercionFailure, DropNonDigits};
pub use normalize::{
    DefaultWhenNull, RewriteValues, StripPictographs, TruncateText, strip_pictographs,
};
pub use range::{DropZero, NullNegative};

use crate::config::RuleSettings;
use crate::rule::Rule;

/// Rule numbers of the canonical set, in evaluation order.
pub const CANONICAL_RULE_IDS: &[u8] = &[
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 13, 14, 15, 16, 17, 18, 19, 20,
];

/// Prefix of line numbers entered as labels instead of numbers.
const LINE_LABEL_PREFIX: &str = "LINEA-";

/// Build the canonical rule set, tuned by `settings`, in evaluation order.
///
/// Disabled rules are still included; [`crate::RuleChain::from_config`]
/// filters them out.
pub fn canonical_rules(settings: &RuleSettings) -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(DropWhenNull::new(
            1,
            fields::QUANTITYORDERED,
            DropReason::MissingQuantity,
            NullPolicy::AnyNull,
            "Drop rows without a quantity",
        )),
        Arc::new(NullNegative::new(
            2,
            fields::PRICEEACH,
            "Clear negative unit prices",
        )),
        Arc::new(RewriteValues::new(
            3,
            fields::STATUS,
            settings.status_corrections.clone(),
            "Correct misspelled statuses",
        )),
        Arc::new(DropWhenNull::new(
            4,
            fields::ORDERDATE,
            DropReason::InvalidDate,
            NullPolicy::AnyNull,
            "Drop rows without a valid order date",
        )),
        Arc::new(DropWhenNull::new(
            5,
            fields::SALES,
            DropReason::NonNumericSales,
            NullPolicy::AnyNull,
            "Drop rows without numeric sales",
        )),
        Arc::new(DropDuplicates::new(6, "Drop exact duplicate rows")),
        Arc::new(TruncateText::new(
            7,
            fields::PRODUCTCODE,
            settings.product_code_max_len,
            "Truncate long product codes",
        )),
        Arc::new(DropWhenNull::new(
            8,
            fields::ORDERNUMBER,
            DropReason::MissingOrderNumber,
            NullPolicy::EmptyOnly,
            "Drop rows without an order number",
        )),
        Arc::new(DropWhenNull::new(
            9,
            fields::ORDERLINENUMBER,
            DropReason::MissingLineNumber,
            NullPolicy::EmptyOnly,
            "Drop rows without an order line number",
        )),
        Arc::new(DropZero::new(
            10,
            fields::QUANTITYORDERED,
            DropReason::ZeroQuantity,
            "Drop rows with zero quantity",
        )),
        Arc::new(TruncateText::new(
            13,
            fields::PRODUCTLINE,
            settings.product_line_max_len,
            "Truncate long product lines",
        )),
        Arc::new(DropWhenNull::new(
            14,
            fields::NUMERICCODE,
            DropReason::NonNumericCode,
            NullPolicy::AnyNull,
            "Drop rows without a numeric code",
        )),
        Arc::new(DefaultWhenNull::new(
            15,
            fields::STATUS,
            settings.status_default.as_str(),
            "Default missing statuses",
        )),
        Arc::new(DropCoercionFailure::new(
            16,
            fields::PRICEEACH,
            DropReason::NonNumericPrice,
            "Drop rows with non-numeric unit prices",
        )),
        Arc::new(DropNonDigits::new(
            17,
            fields::ORDERNUMBER,
            DropReason::NonNumericOrderNumber,
            "Drop rows whose order number has non-digits",
        )),
        Arc::new(
            DropNonDigits::new(
                18,
                fields::ORDERLINENUMBER,
                DropReason::InvalidLineNumber,
                "Drop rows with malformed order line numbers",
            )
            .with_rejected_prefix(LINE_LABEL_PREFIX),
        ),
        Arc::new(StripPictographs::new(
            19,
            fields::COUNTRY,
            "Strip emoji from country names",
        )),
        Arc::new(DefaultWhenNull::new(
            20,
            fields::CITY,
            settings.city_default.as_str(),
            "Default missing cities",
        )),
    ]
}
