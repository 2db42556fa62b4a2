//! Application constants for the TANF processor
//!
//! This module contains the layout constants, default values, code tables
//! and canonical messages used throughout the TANF processor.

// =============================================================================
// Record Types and Layout
// =============================================================================

/// Record-type tokens that are not program specific
pub mod record_types {
    /// Title of the header line that opens every fixed-width submission
    pub const HEADER: &str = "HEADER";

    /// Title of the trailer line that closes every fixed-width submission
    pub const TRAILER: &str = "TRAILER";

    /// FRA work-outcomes record carried on comma-separated tuple rows
    pub const FRA_EXITER: &str = "TE1";

    /// Width of the record-type token on fixed-width data lines
    pub const TOKEN_WIDTH: usize = 2;
}

/// Header and trailer layout
pub mod layout {
    /// Required length of the header line
    pub const HEADER_LENGTH: usize = 23;

    /// Required length of the trailer line
    pub const TRAILER_LENGTH: usize = 23;

    /// Header encryption indicator value marking encrypted identifiers
    pub const ENCRYPTED_INDICATOR: &str = "E";

    /// Byte range of RPT_MONTH_YEAR on every case-level data line
    pub const RPT_MONTH_YEAR_RANGE: (usize, usize) = (2, 8);

    /// Byte range of CASE_NUMBER on every case-level data line
    pub const CASE_NUMBER_RANGE: (usize, usize) = (8, 19);
}

// =============================================================================
// Processing Defaults
// =============================================================================

/// Number of lines parsed between record flushes
pub const DEFAULT_RECORD_BATCH_SIZE: usize = 10_000;

/// Number of buffered errors that triggers an error flush
pub const DEFAULT_ERROR_BATCH_SIZE: usize = 5_000;

/// Default log level for the CLI
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Application name used for the configuration directory
pub const APP_NAME: &str = "tanf-processor";

/// Configuration file name inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Extensions picked up when a directory is given as input
pub const INPUT_FILE_EXTENSIONS: &[&str] = &["txt", "dat", "csv", "ts"];

// =============================================================================
// Geography
// =============================================================================

/// FIPS codes of territories (Guam, Puerto Rico, U.S. Virgin Islands)
pub const TERRITORY_FIPS_CODES: &[i64] = &[66, 72, 78];

// =============================================================================
// Case Consistency Code Tables
// =============================================================================

/// Codes read by the cross-record case rules
pub mod case_codes {
    /// FAMILY_AFFILIATION value of a primary family member
    pub const PRIMARY_FAMILY_MEMBER: i64 = 1;

    /// CLOSURE_REASON for employment or excess earnings
    pub const CLOSURE_EMPLOYMENT: i64 = 1;

    /// CLOSURE_REASON for reaching the federal five year time limit
    pub const CLOSURE_FEDERAL_TIME_LIMIT: i64 = 3;

    /// EMPLOYMENT_STATUS meaning employed
    pub const EMPLOYED: i64 = 1;

    /// RELATIONSHIP_HOH codes for head of household and spouse
    pub const HEAD_OR_SPOUSE: &[i64] = &[1, 2];

    /// Countable months at which the federal time limit is reached
    pub const FEDERAL_TIME_LIMIT_MONTHS: i64 = 60;

    /// Age, in whole years at the reporting month, from which a person is an adult
    pub const ADULT_AGE: u32 = 19;

    /// Valid REC_AID_TOTALLY_DISABLED codes
    pub const AABD_VALID_CODES: &[i64] = &[1, 2];

    /// REC_AID_TOTALLY_DISABLED code that only territories may report
    pub const AABD_TERRITORY_ONLY: i64 = 1;

    /// REC_SSI code territories must report
    pub const SSI_TERRITORY_CODE: i64 = 2;

    /// Valid REC_SSI codes for states
    pub const SSI_VALID_CODES: &[i64] = &[1, 2];
}

// =============================================================================
// Encryption
// =============================================================================

/// Digit substitution table used for encrypted SSN and date-of-birth values
pub const DECRYPTION_TABLE: &[(char, char)] = &[
    ('@', '1'),
    ('9', '2'),
    ('Z', '3'),
    ('P', '4'),
    ('0', '5'),
    ('#', '6'),
    ('Y', '7'),
    ('B', '8'),
    ('W', '9'),
    ('T', '0'),
];

// =============================================================================
// Canonical Messages
// =============================================================================

/// Document level precheck messages
pub mod messages {
    pub const NO_RECORDS_CREATED: &str = "No records created.";
    pub const MULTIPLE_HEADERS: &str = "Multiple headers found.";
    pub const MULTIPLE_TRAILERS: &str = "Multiple trailers found.";
    pub const MISSING_TRAILER: &str = "Your file does not end with a TRAILER record.";
    pub const MISSING_RECORD_TYPE: &str = "Record Type is missing from record.";
    pub const UNKNOWN_RECORD_TYPE: &str = "Unknown Record_Type was found.";
    pub const NOT_ALL_RECORDS_CREATED: &str =
        "Not all parsed records could be saved; the submission was rolled back.";
}
