//! # iso8583: ISO 8583 message codec
//!
//! Encodes and decodes ISO 8583 financial messages: an MTI, a presence bitmap
//! (primary, plus a secondary one for fields 65..=128) and self-delimiting fields
//! in strictly ascending index order.
//!
//! ## Wire layout
//!
//! ```text
//! MTI(4 digits) | primary bitmap (16 hex) | [secondary bitmap (16 hex)] | DE2 .. DE128
//! ```
//!
//! Field 125 of the built-in schema carries an embedded [`SubMessage`] with its own
//! bitmaps and sub-elements SE2..=SE99, wrapped as an ANS LLLVAR field.
//!
//! ## Field types
//!
//! - `n`: digits, left-padded with `0` when fixed
//! - `an`, `anp`, `ans`: right-padded with spaces when fixed, trimmed on decode
//! - `z`: track 2 data, variable only
//! - `b64`: 64-bit value as 16 hex characters, never length-prefixed
//! - `bn`: variable-length hex
//! - `reserved`: placeholder, always fails
//!
//! Variable fields use a 2..=5 digit decimal length prefix (LLVAR .. LLLLLVAR).
//!
//! ## Schemas
//!
//! The built-in tables are [`schema::iso8583_1993`] and [`schema::private_sub_elements`].
//! Custom tables can be written in the schema DSL:
//!
//! ```text
//! schema private {
//!   prefix SE;
//!   max 99;
//!   2: ans fixed 29 validate ANS "Cardholder address";
//!   5: reserved;
//! }
//!
//! schema network {
//!   2: n llvar 19 validate N "Primary account number";
//!   125: sub lllvar 999 validate ANS -> private;
//! }
//! ```
//!
//! ## Usage
//!
//! ```
//! use iso8583::{Message, SubMessage};
//!
//! let mut sub = SubMessage::new();
//! sub.set(2, "Test Address").unwrap();
//! assert_eq!(sub.encode().unwrap(), b"4000000000000000Test Address                 ");
//!
//! let decoded = Message::decode(b"1100700000000000000003123000011000000000012").unwrap();
//! assert_eq!(decoded.get_str(3), Some("000011"));
//! ```

pub mod assembler;
pub mod ast;
pub mod bitmap;
pub mod error;
pub mod field;
pub mod inspect;
pub mod json;
pub mod length;
pub mod message;
pub mod mti;
pub mod parser;
pub mod schema;
pub mod validator;
pub mod value;

pub use ast::{FieldDef, SchemaDef, SchemaSet};
pub use bitmap::Bitmaps;
pub use error::CodecError;
pub use field::{Encoding, FieldKind};
pub use json::{MessageSeed, SubMessageSeed};
pub use length::LengthFormat;
pub use message::{Message, SubMessage};
pub use mti::MessageType;
pub use parser::{load_schemas, parse_schemas};
pub use schema::{FieldSpec, Schema};
pub use validator::Validator;
pub use value::Value;
