//! Registry of recognized message type identifiers.

use crate::error::CodecError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    AuthorizationRequest,
    AuthorizationRequestResponse,
    AuthorizationAdvice,
    AuthorizationAdviceRepeat,
    AuthorizationAdviceResponse,
    FinancialRequest,
    FinancialRequestResponse,
    FinancialAdvice,
    FinancialAdviceRepeat,
    FinancialAdviceResponse,
    FileActionRequest,
    FileActionResponse,
    ReversalAdvice,
    ReversalAdviceRepeat,
    ReversalAdviceResponse,
    AdministrativeAdvice,
    AdministrativeAdviceResponse,
    NetworkManagementRequest,
    NetworkManagementRequestResponse,
}

impl MessageType {
    pub const ALL: [MessageType; 19] = [
        MessageType::AuthorizationRequest,
        MessageType::AuthorizationRequestResponse,
        MessageType::AuthorizationAdvice,
        MessageType::AuthorizationAdviceRepeat,
        MessageType::AuthorizationAdviceResponse,
        MessageType::FinancialRequest,
        MessageType::FinancialRequestResponse,
        MessageType::FinancialAdvice,
        MessageType::FinancialAdviceRepeat,
        MessageType::FinancialAdviceResponse,
        MessageType::FileActionRequest,
        MessageType::FileActionResponse,
        MessageType::ReversalAdvice,
        MessageType::ReversalAdviceRepeat,
        MessageType::ReversalAdviceResponse,
        MessageType::AdministrativeAdvice,
        MessageType::AdministrativeAdviceResponse,
        MessageType::NetworkManagementRequest,
        MessageType::NetworkManagementRequestResponse,
    ];

    /// The 4-digit wire code.
    pub fn code(self) -> &'static str {
        match self {
            MessageType::AuthorizationRequest => "1100",
            MessageType::AuthorizationRequestResponse => "1110",
            MessageType::AuthorizationAdvice => "1120",
            MessageType::AuthorizationAdviceRepeat => "1121",
            MessageType::AuthorizationAdviceResponse => "1130",
            MessageType::FinancialRequest => "1200",
            MessageType::FinancialRequestResponse => "1210",
            MessageType::FinancialAdvice => "1220",
            MessageType::FinancialAdviceRepeat => "1221",
            MessageType::FinancialAdviceResponse => "1230",
            MessageType::FileActionRequest => "1304",
            MessageType::FileActionResponse => "1314",
            MessageType::ReversalAdvice => "1420",
            MessageType::ReversalAdviceRepeat => "1421",
            MessageType::ReversalAdviceResponse => "1430",
            MessageType::AdministrativeAdvice => "1624",
            MessageType::AdministrativeAdviceResponse => "1634",
            MessageType::NetworkManagementRequest => "1804",
            MessageType::NetworkManagementRequestResponse => "1814",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MessageType::AuthorizationRequest => "Authorization request",
            MessageType::AuthorizationRequestResponse => "Authorization request response",
            MessageType::AuthorizationAdvice => "Authorization advice",
            MessageType::AuthorizationAdviceRepeat => "Authorization advice repeat",
            MessageType::AuthorizationAdviceResponse => "Authorization advice response",
            MessageType::FinancialRequest => "Financial request",
            MessageType::FinancialRequestResponse => "Financial request response",
            MessageType::FinancialAdvice => "Financial advice",
            MessageType::FinancialAdviceRepeat => "Financial advice repeat",
            MessageType::FinancialAdviceResponse => "Financial advice response",
            MessageType::FileActionRequest => "File action request",
            MessageType::FileActionResponse => "File action response",
            MessageType::ReversalAdvice => "Reversal advice",
            MessageType::ReversalAdviceRepeat => "Reversal advice repeat",
            MessageType::ReversalAdviceResponse => "Reversal advice response",
            MessageType::AdministrativeAdvice => "Administrative advice",
            MessageType::AdministrativeAdviceResponse => "Administrative advice response",
            MessageType::NetworkManagementRequest => "Network management request",
            MessageType::NetworkManagementRequestResponse => "Network management request response",
        }
    }

    pub fn from_code(code: &str) -> Option<MessageType> {
        MessageType::ALL.into_iter().find(|t| t.code() == code)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for MessageType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageType::from_code(s).ok_or_else(|| CodecError::UnknownMti(s.to_string()))
    }
}

/// Encode-time check: the MTI must be registered.
pub fn encode_mti(mti: &str) -> Result<&[u8], CodecError> {
    MessageType::from_code(mti)
        .map(|_| mti.as_bytes())
        .ok_or_else(|| CodecError::UnknownMti(mti.to_string()))
}

/// Decode-time check: 4 ASCII digits, registry membership not required.
pub fn decode_mti(bytes: &[u8]) -> Result<String, CodecError> {
    let head = bytes.get(..4).ok_or(CodecError::Truncated {
        needed: 4,
        available: bytes.len(),
    })?;
    if !head.iter().all(u8::is_ascii_digit) {
        return Err(CodecError::InvalidMti(String::from_utf8_lossy(head).into_owned()));
    }
    Ok(String::from_utf8_lossy(head).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_code_parses_back() {
        for t in MessageType::ALL {
            assert_eq!(t.code().parse::<MessageType>(), Ok(t));
        }
        assert_eq!(MessageType::from_code("0800"), None);
    }

    #[test]
    fn encode_requires_registry_membership() {
        assert_eq!(encode_mti("1804").unwrap(), b"1804");
        assert_eq!(encode_mti("0100"), Err(CodecError::UnknownMti("0100".into())));
    }

    #[test]
    fn decode_requires_four_digits_only() {
        assert_eq!(decode_mti(b"0100rest").unwrap(), "0100");
        assert!(matches!(decode_mti(b"11A0"), Err(CodecError::InvalidMti(_))));
        assert_eq!(
            decode_mti(b"110"),
            Err(CodecError::Truncated { needed: 4, available: 3 })
        );
    }
}
