//! Transform functions shared by catalog fields

use crate::app::models::{FieldValue, ParseContext};
use crate::app::services::fixed_width::{FieldTransform, TransformError};
use crate::constants::DECRYPTION_TABLE;

/// Reverse the digit substitution cipher when the file is encrypted
pub fn decrypt(value: FieldValue, context: &ParseContext) -> Result<FieldValue, TransformError> {
    if !context.is_encrypted {
        return Ok(value);
    }
    let decrypted = value
        .to_string()
        .chars()
        .map(|c| {
            DECRYPTION_TABLE
                .iter()
                .find(|(encrypted, _)| *encrypted == c)
                .map_or(c, |(_, plain)| *plain)
        })
        .collect::<String>();
    Ok(FieldValue::Text(decrypted))
}

/// YYYYMM of the `index`th month (0-2) of a YYYYQ calendar quarter
pub fn quarter_month(index: i64) -> impl FieldTransform {
    move |value: FieldValue, _context: &ParseContext| -> Result<FieldValue, TransformError> {
        let quarter_value = value
            .as_i64()
            .ok_or_else(|| TransformError::invalid(&value, "calendar quarter is not numeric"))?;
        let year = quarter_value / 10;
        let quarter = quarter_value % 10;
        if !(1..=4).contains(&quarter) {
            return Err(TransformError::invalid(
                &value,
                format!("quarter {} is not between 1 and 4", quarter),
            ));
        }
        let month = (quarter - 1) * 3 + 1 + index;
        Ok(FieldValue::Number(year * 100 + month))
    }
}
