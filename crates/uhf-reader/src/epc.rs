//! EPC write payloads.
//!
//! A host writes a new EPC as 24 hex characters (96 bits). The payload handed
//! to the SDK is that EPC followed by [`EPC_WRITE_PAD`].

use crate::error::{ReaderError, Result};

/// Hex characters in an EPC accepted for writing.
pub const EPC_HEX_LEN: usize = 24;

/// Suffix appended to the EPC before it is written.
pub const EPC_WRITE_PAD: &str = "00000000";

/// A validated EPC write payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpcPayload {
    data: String,
}

impl EpcPayload {
    /// Validate `epc` and build the padded payload.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::Write`] unless `epc` is exactly 24 hex
    /// characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use uhf_reader::epc::EpcPayload;
    ///
    /// let payload = EpcPayload::parse("ABCD1234ABCD1234ABCD1234").unwrap();
    /// assert_eq!(payload.as_str(), "ABCD1234ABCD1234ABCD123400000000");
    ///
    /// assert!(EpcPayload::parse("AB").is_err());
    /// ```
    pub fn parse(epc: &str) -> Result<Self> {
        if epc.len() != EPC_HEX_LEN {
            return Err(ReaderError::write(format!(
                "Invalid Data: EPC must be {} hex characters, got {}",
                EPC_HEX_LEN,
                epc.len()
            )));
        }
        if !epc.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ReaderError::write("Invalid Data: EPC must be hexadecimal"));
        }

        let mut data = String::with_capacity(EPC_HEX_LEN + EPC_WRITE_PAD.len());
        data.push_str(epc);
        data.push_str(EPC_WRITE_PAD);
        Ok(Self { data })
    }

    /// The EPC without padding.
    pub fn epc(&self) -> &str {
        &self.data[..EPC_HEX_LEN]
    }

    /// The padded payload handed to the SDK.
    pub fn as_str(&self) -> &str {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_payload_is_padded() {
        let payload = EpcPayload::parse("E2003412B802011526603FE2").unwrap();
        assert_eq!(payload.epc(), "E2003412B802011526603FE2");
        assert_eq!(payload.as_str(), "E2003412B802011526603FE200000000");
        assert_eq!(payload.as_str().len(), 32);
    }

    #[rstest]
    #[case("")]
    #[case("AB")]
    #[case("ABCD1234ABCD1234ABCD123")] // 23 chars
    #[case("ABCD1234ABCD1234ABCD12345")] // 25 chars
    #[case("ABCD1234ABCD1234ABCD123G")] // non-hex
    fn test_payload_rejects(#[case] epc: &str) {
        let err = EpcPayload::parse(epc).unwrap_err();
        assert!(matches!(err, ReaderError::Write(_)));
    }

    #[test]
    fn test_payload_accepts_lowercase() {
        assert!(EpcPayload::parse("abcd1234abcd1234abcd1234").is_ok());
    }
}
