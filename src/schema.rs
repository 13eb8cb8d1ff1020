//! Schema tables: which fields a message level defines and how each is encoded.
//!
//! A [`Schema`] is an array indexed by field number. Index 1 is never defined:
//! it is the slot of the secondary bitmap word, maintained by the assembler.
//! Tables are built once and shared read-only behind an `Arc`.
//!
//! Two built-in tables are provided: [`iso8583_1993`] for the top-level message
//! (fields 2..=128, field 125 carrying the embedded sub-message) and
//! [`private_sub_elements`] for that sub-message (sub-elements 2..=99).

use crate::bitmap::MAX_FIELD_INDEX;
use crate::field::FieldKind;
use crate::length::LengthFormat;
use crate::validator::Validator;
use std::sync::{Arc, LazyLock};

/// Schema-time description of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub index: u8,
    pub kind: FieldKind,
    /// Maximum (variable) or exact (fixed) length in characters; in bits for Binary64.
    pub max_length: usize,
    pub format: LengthFormat,
    pub validator: Option<Validator>,
    pub name: String,
}

impl FieldSpec {
    pub fn new(
        index: u8,
        kind: FieldKind,
        max_length: usize,
        format: LengthFormat,
        validator: Option<Validator>,
    ) -> Self {
        FieldSpec {
            index,
            kind,
            max_length,
            format,
            validator,
            name: String::new(),
        }
    }

    pub fn reserved(index: u8) -> Self {
        FieldSpec::new(index, FieldKind::Reserved, 0, LengthFormat::Fixed, None)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    prefix: String,
    max_index: u8,
    slots: Vec<Option<FieldSpec>>,
    sub_schema: Option<Arc<Schema>>,
}

impl Schema {
    /// Build and check a schema table.
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        max_index: u8,
        fields: Vec<FieldSpec>,
        sub_schema: Option<Arc<Schema>>,
    ) -> Result<Self, String> {
        let schema = Self::from_table(name, prefix, max_index, fields, sub_schema)?;
        schema.check()?;
        Ok(schema)
    }

    /// Place fields into their slots. Only out-of-range and duplicate indices are rejected here.
    fn from_table(
        name: impl Into<String>,
        prefix: impl Into<String>,
        max_index: u8,
        fields: Vec<FieldSpec>,
        sub_schema: Option<Arc<Schema>>,
    ) -> Result<Self, String> {
        let name = name.into();
        if max_index < 2 || max_index > MAX_FIELD_INDEX {
            return Err(format!("schema {}: max index {} not in 2..={}", name, max_index, MAX_FIELD_INDEX));
        }
        let mut slots = vec![None; usize::from(max_index) + 1];
        for spec in fields {
            let i = usize::from(spec.index);
            if spec.index < 2 || spec.index > max_index {
                return Err(format!("schema {}: field index {} not in 2..={}", name, spec.index, max_index));
            }
            if slots[i].is_some() {
                return Err(format!("schema {}: duplicate field index {}", name, spec.index));
            }
            slots[i] = Some(spec);
        }
        Ok(Schema {
            name,
            prefix: prefix.into(),
            max_index,
            slots,
            sub_schema,
        })
    }

    /// Check per-field invariants of the table.
    pub fn check(&self) -> Result<(), String> {
        let mut nested = 0;
        for spec in self.fields() {
            let label = self.label(spec.index);
            if !spec.kind.supports(spec.format) {
                return Err(format!("{} {}: {} has no {} form", self.name, label, spec.kind, spec.format));
            }
            match spec.kind {
                FieldKind::Reserved => continue,
                FieldKind::Binary64 if spec.max_length == 0 || spec.max_length % 4 != 0 => {
                    return Err(format!("{} {}: b64 length {} is not a positive multiple of 4 bits", self.name, label, spec.max_length));
                }
                // Never length-prefixed, so no prefix ceiling applies.
                FieldKind::Binary64 => continue,
                FieldKind::SubMessage => nested += 1,
                _ => {}
            }
            if spec.max_length == 0 {
                return Err(format!("{} {}: length must be positive", self.name, label));
            }
            if let Some(ceiling) = spec.format.max_representable() {
                if spec.max_length > ceiling {
                    return Err(format!("{} {}: length {} exceeds {} ceiling {}", self.name, label, spec.max_length, spec.format, ceiling));
                }
            }
        }
        if nested > 1 {
            return Err(format!("{}: more than one sub-message field", self.name));
        }
        if nested == 1 && self.sub_schema.is_none() {
            return Err(format!("{}: sub-message field without a sub-schema", self.name));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Label prefix of this level, e.g. `DE` or `SE`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn max_index(&self) -> u8 {
        self.max_index
    }

    pub fn spec(&self, index: u8) -> Option<&FieldSpec> {
        self.slots.get(usize::from(index)).and_then(Option::as_ref)
    }

    /// Defined fields in ascending index order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.slots.iter().flatten()
    }

    pub fn sub_schema(&self) -> Option<&Arc<Schema>> {
        self.sub_schema.as_ref()
    }

    /// Index of the field carrying the embedded sub-message, if any.
    pub fn sub_message_index(&self) -> Option<u8> {
        self.fields()
            .find(|s| s.kind == FieldKind::SubMessage)
            .map(|s| s.index)
    }

    pub fn label(&self, index: u8) -> String {
        format!("{}{}", self.prefix, index)
    }
}

type Row = (u8, FieldKind, usize, LengthFormat, Validator, &'static str);

fn build(name: &str, prefix: &str, max_index: u8, rows: &[Row], reserved: &[u8], sub: Option<Arc<Schema>>) -> Schema {
    let fields = rows
        .iter()
        .map(|&(index, kind, len, format, validator, label)| {
            FieldSpec::new(index, kind, len, format, Some(validator)).with_name(label)
        })
        .chain(reserved.iter().map(|&i| FieldSpec::reserved(i).with_name("Reserved")))
        .collect();
    // Rows are checked by the built_in_tables_pass_checks test.
    match Schema::from_table(name, prefix, max_index, fields, sub) {
        Ok(schema) => schema,
        Err(e) => unreachable!("built-in schema table: {}", e),
    }
}

use FieldKind::{
    AlphaNumeric as AN, AlphaNumericPadded as ANP, AlphaNumericSpecial as ANS, Binary64 as B64,
    BinaryVar as BN, Numeric as N, SubMessage as SUB, Track2 as Z,
};
use LengthFormat::{Fixed, LLLLLVar, LLLLVar, LLLVar, LLVar};

const ISO8583_1993: &[Row] = &[
    (2, N, 19, LLVar, Validator::Numeric, "Primary account number"),
    (3, N, 6, Fixed, Validator::Numeric, "Processing code"),
    (4, N, 12, Fixed, Validator::Numeric, "Amount, transaction"),
    (5, N, 12, Fixed, Validator::Numeric, "Amount, reconciliation"),
    (6, N, 12, Fixed, Validator::Numeric, "Amount, cardholder billing"),
    (7, N, 10, Fixed, Validator::Mmddhhmmss, "Date and time, transmission"),
    (9, N, 8, Fixed, Validator::Numeric, "Conversion rate, reconciliation"),
    (10, N, 8, Fixed, Validator::Numeric, "Conversion rate, cardholder billing"),
    (11, N, 6, Fixed, Validator::Numeric, "Systems trace audit number"),
    (12, N, 12, Fixed, Validator::Yymmddhhmmss, "Date and time, local transaction"),
    (14, N, 4, Fixed, Validator::Yymm, "Date, expiration"),
    (16, N, 4, Fixed, Validator::Mmdd, "Date, conversion"),
    (17, N, 4, Fixed, Validator::Mmdd, "Date, capture"),
    (18, N, 4, Fixed, Validator::Numeric, "Merchant type"),
    (19, N, 3, Fixed, Validator::Numeric, "Country code, acquiring institution"),
    (22, AN, 12, Fixed, Validator::AlphaNumeric, "Point of service data code"),
    (23, N, 3, Fixed, Validator::Numeric, "Card sequence number"),
    (24, N, 3, Fixed, Validator::Numeric, "Function code"),
    (25, N, 4, Fixed, Validator::Numeric, "Message reason code"),
    (26, N, 4, Fixed, Validator::Numeric, "Card acceptor business code"),
    (28, N, 6, Fixed, Validator::Yymmdd, "Date, reconciliation"),
    (30, N, 24, Fixed, Validator::Numeric, "Amounts, original"),
    (32, N, 11, LLVar, Validator::Numeric, "Acquiring institution identification code"),
    (33, N, 11, LLVar, Validator::Numeric, "Forwarding institution identification code"),
    (34, N, 28, LLVar, Validator::Numeric, "Primary account number, extended"),
    (35, Z, 37, LLVar, Validator::Track2, "Track 2 data"),
    (37, ANP, 12, Fixed, Validator::AlphaNumericPadded, "Retrieval reference number"),
    (38, ANP, 6, Fixed, Validator::AlphaNumericPadded, "Approval code"),
    (39, N, 3, Fixed, Validator::Numeric, "Action code"),
    (41, ANS, 8, Fixed, Validator::AlphaNumericSpecial, "Card acceptor terminal identification"),
    (42, ANS, 15, Fixed, Validator::AlphaNumericSpecial, "Card acceptor identification code"),
    (43, ANS, 99, LLVar, Validator::AlphaNumericSpecial, "Card acceptor name/location"),
    (46, ANS, 186, LLLVar, Validator::AlphaNumericSpecial, "Amounts, fees"),
    (47, ANS, 999, LLLVar, Validator::AlphaNumericSpecial, "Additional data, national"),
    (48, ANS, 999, LLLVar, Validator::AlphaNumericSpecial, "Additional data, private"),
    (49, N, 3, Fixed, Validator::Numeric, "Currency code, transaction"),
    (50, N, 3, Fixed, Validator::Numeric, "Currency code, reconciliation"),
    (51, N, 3, Fixed, Validator::Numeric, "Currency code, cardholder billing"),
    (52, B64, 64, Fixed, Validator::Binary64, "Personal identification number data"),
    (54, ANS, 120, LLLVar, Validator::AlphaNumericSpecial, "Amounts, additional"),
    (56, N, 35, LLVar, Validator::Numeric, "Original data elements"),
    (57, N, 3, Fixed, Validator::Numeric, "Authorization life cycle code"),
    (58, N, 11, LLVar, Validator::Numeric, "Authorizing agent institution identification code"),
    (59, ANS, 999, LLLVar, Validator::AlphaNumericSpecial, "Transport data"),
    (62, N, 6, Fixed, Validator::Numeric, "Reserved for private use"),
    (63, N, 4, Fixed, Validator::Mmdd, "Reserved for private use"),
    (66, ANS, 204, LLLVar, Validator::AlphaNumericSpecial, "Amounts, original fees"),
    (72, ANS, 999, LLLVar, Validator::AlphaNumericSpecial, "Data record"),
    (93, N, 11, LLVar, Validator::Numeric, "Transaction destination institution identification code"),
    (94, N, 11, LLVar, Validator::Numeric, "Transaction originator institution identification code"),
    (95, ANS, 9999, LLLLVar, Validator::AlphaNumericSpecial, "Card issuer reference data"),
    (96, ANS, 100, LLLVar, Validator::AlphaNumericSpecial, "Key management data"),
    (100, N, 11, LLVar, Validator::Numeric, "Receiving institution identification code"),
    (101, ANS, 17, LLVar, Validator::AlphaNumericSpecial, "File name"),
    (102, ANS, 28, LLVar, Validator::AlphaNumericSpecial, "Account identification 1"),
    (103, ANS, 28, LLVar, Validator::AlphaNumericSpecial, "Account identification 2"),
    (111, ANS, 9999, LLLLVar, Validator::AlphaNumericSpecial, "Reserved for ISO use"),
    (123, ANS, 999, LLLVar, Validator::AlphaNumericSpecial, "Reserved for private use"),
    (124, ANS, 999, LLLVar, Validator::AlphaNumericSpecial, "Reserved for private use"),
    (125, SUB, 999, LLLVar, Validator::AlphaNumericSpecial, "Private sub-elements"),
    (126, ANS, 999, LLLVar, Validator::AlphaNumericSpecial, "Reserved for private use"),
    (127, ANS, 9999, LLLLVar, Validator::AlphaNumericSpecial, "Reserved for private use"),
    (128, ANS, 99999, LLLLLVar, Validator::AlphaNumericSpecial, "Reserved for private use"),
];

const PRIVATE_SUB_ELEMENTS: &[Row] = &[
    (2, ANS, 29, Fixed, Validator::AlphaNumericSpecial, "Cardholder address"),
    (3, ANS, 5, Fixed, Validator::AlphaNumericSpecial, ""),
    (4, N, 10, Fixed, Validator::Numeric, ""),
    (7, ANS, 3, Fixed, Validator::AlphaNumericSpecial, ""),
    (8, ANS, 1, Fixed, Validator::AlphaNumericSpecial, ""),
    (9, AN, 3, Fixed, Validator::AlphaNumeric, ""),
    (11, AN, 1, Fixed, Validator::AlphaNumeric, ""),
    (15, ANS, 2, Fixed, Validator::AlphaNumericSpecial, ""),
    (16, ANS, 2, Fixed, Validator::AlphaNumericSpecial, ""),
    (18, ANS, 16, Fixed, Validator::AlphaNumericSpecial, ""),
    (19, ANS, 999, Fixed, Validator::AlphaNumericSpecial, ""),
    (20, ANS, 2, Fixed, Validator::AlphaNumericSpecial, ""),
    (21, ANS, 194, Fixed, Validator::AlphaNumericSpecial, ""),
    (22, ANS, 255, LLLVar, Validator::AlphaNumericSpecial, ""),
    (24, ANS, 99, LLVar, Validator::AlphaNumericSpecial, ""),
    (25, ANS, 99, LLVar, Validator::AlphaNumericSpecial, ""),
    (26, N, 3, Fixed, Validator::Numeric, ""),
    (27, ANS, 1, Fixed, Validator::AlphaNumericSpecial, ""),
    (29, ANS, 9, Fixed, Validator::AlphaNumericSpecial, ""),
    (30, N, 4, Fixed, Validator::Numeric, ""),
    (31, ANS, 255, LLLVar, Validator::AlphaNumericSpecial, ""),
    (34, N, 11, Fixed, Validator::Numeric, ""),
    (35, N, 11, Fixed, Validator::Numeric, ""),
    (36, ANS, 15, Fixed, Validator::AlphaNumericSpecial, ""),
    (37, AN, 7, Fixed, Validator::AlphaNumeric, ""),
    (38, ANP, 15, Fixed, Validator::AlphaNumericPadded, ""),
    (39, AN, 120, LLLVar, Validator::AlphaNumeric, ""),
    (40, N, 2, Fixed, Validator::Numeric, ""),
    (41, BN, 100, LLLVar, Validator::BinaryHex, ""),
    (42, N, 3, Fixed, Validator::Numeric, ""),
    (54, ANS, 6, Fixed, Validator::AlphaNumericSpecial, ""),
    (55, AN, 120, LLLVar, Validator::AlphaNumeric, ""),
    (56, N, 45, LLVar, Validator::Numeric, ""),
    (57, AN, 10, LLVar, Validator::AlphaNumeric, ""),
    (58, N, 30, LLVar, Validator::Numeric, ""),
    (59, AN, 10, LLVar, Validator::AlphaNumeric, ""),
    (60, N, 1, Fixed, Validator::Numeric, ""),
    (61, N, 4, Fixed, Validator::Numeric, ""),
    (62, N, 1, Fixed, Validator::Numeric, ""),
    (63, ANS, 94, Fixed, Validator::AlphaNumericSpecial, ""),
    (64, AN, 1, Fixed, Validator::AlphaNumeric, ""),
    (65, AN, 1, Fixed, Validator::AlphaNumeric, ""),
    (66, AN, 6, Fixed, Validator::AlphaNumeric, ""),
    (67, AN, 1, Fixed, Validator::AlphaNumeric, ""),
    (68, ANS, 40, Fixed, Validator::AlphaNumericSpecial, ""),
    (69, ANP, 6, Fixed, Validator::AlphaNumericPadded, ""),
    (70, ANS, 15, Fixed, Validator::AlphaNumericSpecial, ""),
    (71, ANS, 999, LLLVar, Validator::AlphaNumericSpecial, ""),
    (72, ANS, 999, LLLVar, Validator::AlphaNumericSpecial, ""),
    (73, ANS, 999, LLLVar, Validator::AlphaNumericSpecial, ""),
    (74, ANS, 999, LLLVar, Validator::AlphaNumericSpecial, ""),
    (75, ANS, 3, Fixed, Validator::AlphaNumericSpecial, ""),
    (76, ANS, 23, Fixed, Validator::AlphaNumericSpecial, ""),
    (77, ANS, 12, Fixed, Validator::AlphaNumericSpecial, ""),
    (78, ANS, 15, Fixed, Validator::AlphaNumericSpecial, ""),
    (79, ANS, 4, Fixed, Validator::AlphaNumericSpecial, ""),
    (80, ANS, 1, Fixed, Validator::AlphaNumericSpecial, ""),
    (81, ANS, 2, Fixed, Validator::AlphaNumericSpecial, ""),
    (82, ANS, 1, Fixed, Validator::AlphaNumericSpecial, ""),
    (83, AN, 1, Fixed, Validator::AlphaNumeric, ""),
    (84, ANS, 11, Fixed, Validator::AlphaNumericSpecial, ""),
    (85, BN, 256, LLLVar, Validator::BinaryHex, ""),
    (86, ANS, 1, Fixed, Validator::AlphaNumericSpecial, ""),
    (88, ANS, 1, Fixed, Validator::AlphaNumericSpecial, ""),
    (89, ANS, 15, Fixed, Validator::AlphaNumericSpecial, ""),
    (90, ANS, 6, Fixed, Validator::AlphaNumericSpecial, ""),
    (91, ANS, 255, LLLVar, Validator::AlphaNumericSpecial, ""),
    (93, N, 4, Fixed, Validator::Numeric, ""),
    (94, N, 19, LLVar, Validator::Numeric, ""),
    (95, AN, 2, Fixed, Validator::AlphaNumeric, ""),
    (96, N, 19, LLVar, Validator::Numeric, ""),
    (97, N, 11, Fixed, Validator::Numeric, ""),
    (98, AN, 1, Fixed, Validator::AlphaNumeric, ""),
    (99, AN, 99, LLVar, Validator::AlphaNumeric, ""),
];

const PRIVATE_RESERVED: &[u8] = &[
    5, 6, 10, 12, 13, 14, 17, 23, 28, 32, 33, 43, 44, 45, 46, 47, 48, 49, 50, 51, 52, 53, 87, 92,
];

static PRIVATE: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Arc::new(build("iso8583_private", "SE", 99, PRIVATE_SUB_ELEMENTS, PRIVATE_RESERVED, None))
});

static ISO8583: LazyLock<Arc<Schema>> = LazyLock::new(|| {
    Arc::new(build("iso8583_1993", "DE", 128, ISO8583_1993, &[], Some(private_sub_elements())))
});

/// Top-level ISO 8583:1993 field table (DE2..=DE128, DE125 nested).
pub fn iso8583_1993() -> Arc<Schema> {
    Arc::clone(&ISO8583)
}

/// Sub-element table of the embedded private-use message (SE2..=SE99).
pub fn private_sub_elements() -> Arc<Schema> {
    Arc::clone(&PRIVATE)
}
