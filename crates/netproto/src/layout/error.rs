/// Errors raised when failing to decode a header from its wire format.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum DecodeError {
    /// The input ended before the full header.
    #[error("{layout} header requires {expected} bytes but only {actual} were provided")]
    HeaderTruncated {
        /// The name of the layout being decoded.
        layout: &'static str,
        /// The fixed length of the header in bytes.
        expected: usize,
        /// The number of bytes that were available.
        actual: usize,
    },
    /// A typed header read a field that its layout table describes differently.
    #[error("field {field} of the {layout} header does not match its layout")]
    FieldMismatch {
        /// The name of the layout being decoded.
        layout: &'static str,
        /// The name of the offending field.
        field: &'static str,
    },
}

/// Errors raised when failing to encode a header to its wire format.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum EncodeError {
    /// The buffer cannot hold the encoded header.
    #[error("the provided buffer did not have sufficient size")]
    InadequateBufferSize,
    /// The value supplied for a field is not of the kind its layout table describes.
    #[error("field {field} of the {layout} header does not match its layout")]
    FieldMismatch {
        /// The name of the layout being encoded.
        layout: &'static str,
        /// The name of the offending field, or `"*"` if the number of values is wrong.
        field: &'static str,
    },
    /// An integer does not fit the bit width of its field.
    #[error("value {value} does not fit in the {bits}-bit field {field} of the {layout} header")]
    ValueOutOfRange {
        /// The name of the layout being encoded.
        layout: &'static str,
        /// The name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: u32,
        /// The width of the field in bits.
        bits: u32,
    },
}
