//! FRA work-outcomes layout
//!
//! FRA files are comma-separated; each row is pre-split into a tuple row and
//! fields are addressed by column.

use super::transforms::decrypt;
use crate::app::services::fixed_width::{Field, FieldKind, Position, RecordShape, RowSchema};
use crate::app::services::validators::predicates;
use crate::constants::record_types::FRA_EXITER;

pub fn exiter() -> RowSchema {
    RowSchema::new(FRA_EXITER, RecordShape::Model(format!("FRA_{}", FRA_EXITER))).with_fields(vec![
        Field::new("1", "EXIT_DATE", "Exit Date", FieldKind::Numeric, Position::at(0))
            .with_validators(vec![predicates::year_month_is_valid()]),
        Field::new(
            "2",
            "SSN",
            "Social Security Number",
            FieldKind::Alphanumeric,
            Position::at(1),
        )
        .with_validators(vec![predicates::int_has_length(9), predicates::validate_ssn()])
        .with_transform(decrypt),
    ])
}
