//! An in-memory backend that records the codec's calls as [`Token`]s.
//!
//! Useful to inspect exactly what the codec emits, and as a reference for
//! backend authors. The reader checks node names, so a stream read back with
//! a different layout fails with [`Error::MalformedStream`].
//!
//! ```
//! use weft_codec::Serializer;
//! use weft_codec::format::Primitive;
//! use weft_codec::format::tokens::{Token, TokenReader, TokenWriter};
//! use weft_codec::registry::TypeRegistry;
//!
//! let serializer = Serializer::new(TypeRegistry::new());
//!
//! let mut writer = TokenWriter::new();
//! serializer.serialize(&mut writer, &42_i32).unwrap();
//! assert_eq!(writer.tokens()[1], Token::value("root", Primitive::I32(42)));
//!
//! let mut reader = TokenReader::new(writer.into_tokens());
//! assert_eq!(serializer.deserialize::<i32, _>(&mut reader).unwrap(), 42);
//! ```

use alloc::collections::VecDeque;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::format::{
    FormatReader, FormatWriter, Primitive, PrimitiveKind, ReadArrayResult, ReadObjectResult,
};
use crate::info::TypeDescriptor;
use crate::{Error, Result};

// -----------------------------------------------------------------------------
// Token

/// One recorded backend call.
///
/// With the `serde` feature a recorded stream can be stored in any serde
/// format and replayed later.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Token {
    Start { format_version: u32, data_version: i32 },
    Value { name: String, value: Primitive },
    Null { name: String },
    ArrayStart { name: String, count: usize, bounds: Vec<usize> },
    ArrayEnd,
    StructStart { name: String, type_name: String },
    StructEnd,
    ObjectStart { name: String, type_name: String, id: u32 },
    ObjectEnd,
    Reference { name: String, id: u32 },
}

impl Token {
    pub fn value(name: &str, value: Primitive) -> Self {
        Self::Value { name: name.to_string(), value }
    }

    pub fn null(name: &str) -> Self {
        Self::Null { name: name.to_string() }
    }

    pub fn object(name: &str, type_name: &str, id: u32) -> Self {
        Self::ObjectStart {
            name: name.to_string(),
            type_name: type_name.to_string(),
            id,
        }
    }

    pub fn reference(name: &str, id: u32) -> Self {
        Self::Reference { name: name.to_string(), id }
    }

    /// Node name, `None` for stream start and tails.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Value { name, .. }
            | Self::Null { name }
            | Self::ArrayStart { name, .. }
            | Self::StructStart { name, .. }
            | Self::ObjectStart { name, .. }
            | Self::Reference { name, .. } => Some(name),
            Self::Start { .. } | Self::ArrayEnd | Self::StructEnd | Self::ObjectEnd => None,
        }
    }

    fn depth_delta(&self) -> isize {
        match self {
            Self::ArrayStart { .. } | Self::StructStart { .. } | Self::ObjectStart { .. } => 1,
            Self::ArrayEnd | Self::StructEnd | Self::ObjectEnd => -1,
            _ => 0,
        }
    }
}

// -----------------------------------------------------------------------------
// TokenWriter

/// Records every call as a [`Token`].
#[derive(Debug, Default)]
pub struct TokenWriter {
    tokens: Vec<Token>,
    closed: bool,
}

impl TokenWriter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[inline]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn push(&mut self, token: Token) -> Result<()> {
        if self.closed {
            return Err(Error::backend("token writer is closed"));
        }
        self.tokens.push(token);
        Ok(())
    }
}

impl FormatWriter for TokenWriter {
    fn initialize(&mut self, format_version: u32, data_version: i32) -> Result<()> {
        self.closed = false;
        self.tokens.clear();
        self.push(Token::Start { format_version, data_version })
    }

    fn write_value(&mut self, name: &str, value: &Primitive) -> Result<()> {
        self.push(Token::value(name, value.clone()))
    }

    fn write_null(&mut self, name: &str) -> Result<()> {
        self.push(Token::null(name))
    }

    fn write_array_header(&mut self, name: &str, count: usize, bounds: &[usize]) -> Result<()> {
        self.push(Token::ArrayStart {
            name: name.to_string(),
            count,
            bounds: bounds.to_vec(),
        })
    }

    fn write_array_tail(&mut self) -> Result<()> {
        self.push(Token::ArrayEnd)
    }

    fn write_struct_header(&mut self, name: &str, ty: &TypeDescriptor) -> Result<()> {
        self.push(Token::StructStart {
            name: name.to_string(),
            type_name: ty.name().to_string(),
        })
    }

    fn write_struct_tail(&mut self) -> Result<()> {
        self.push(Token::StructEnd)
    }

    fn write_object_header(&mut self, name: &str, type_name: &str, id: u32) -> Result<()> {
        self.push(Token::object(name, type_name, id))
    }

    fn write_object_tail(&mut self) -> Result<()> {
        self.push(Token::ObjectEnd)
    }

    fn write_object_reference(&mut self, name: &str, id: u32) -> Result<()> {
        self.push(Token::reference(name, id))
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// TokenReader

/// Replays [`Token`]s, checking names and nesting.
#[derive(Debug)]
pub struct TokenReader {
    tokens: VecDeque<Token>,
    format_version: u32,
    data_version: i32,
}

impl TokenReader {
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
            format_version: 0,
            data_version: 0,
        }
    }

    /// Tokens not consumed yet.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.tokens.len()
    }

    fn next(&mut self, expected: &str) -> Result<Token> {
        self.tokens
            .pop_front()
            .ok_or_else(|| Error::malformed(format!("stream ended, expected {expected}")))
    }

    fn check_name(expected: &str, token: &Token) -> Result<()> {
        match token.name() {
            Some(name) if name == expected => Ok(()),
            Some(name) => Err(Error::malformed(format!("expected node `{expected}`, found `{name}`"))),
            None => Err(Error::malformed(format!("expected node `{expected}`, found {token:?}"))),
        }
    }

    fn unexpected(expected: &str, token: &Token) -> Error {
        Error::malformed(format!("expected {expected}, found {token:?}"))
    }

    fn expect_tail(&mut self, tail: Token) -> Result<()> {
        let token = self.next("a tail")?;
        if token == tail {
            Ok(())
        } else {
            Err(Self::unexpected(&format!("{tail:?}"), &token))
        }
    }
}

impl FormatReader for TokenReader {
    fn initialize(&mut self) -> Result<()> {
        match self.next("stream start")? {
            Token::Start { format_version, data_version } => {
                self.format_version = format_version;
                self.data_version = data_version;
                Ok(())
            }
            token => Err(Self::unexpected("stream start", &token)),
        }
    }

    #[inline]
    fn format_version(&self) -> u32 {
        self.format_version
    }

    #[inline]
    fn version(&self) -> i32 {
        self.data_version
    }

    fn read_value(&mut self, name: &str, _kind: PrimitiveKind) -> Result<Option<Primitive>> {
        let token = self.next(name)?;
        Self::check_name(name, &token)?;
        match token {
            Token::Value { value, .. } => Ok(Some(value)),
            Token::Null { .. } => Ok(None),
            token => Err(Self::unexpected("a value", &token)),
        }
    }

    fn read_array_header(&mut self, name: &str) -> Result<ReadArrayResult> {
        let token = self.next(name)?;
        Self::check_name(name, &token)?;
        match token {
            Token::ArrayStart { count, bounds, .. } => Ok(ReadArrayResult::Array { count, bounds }),
            Token::Null { .. } => Ok(ReadArrayResult::Null),
            token => Err(Self::unexpected("an array", &token)),
        }
    }

    fn read_array_tail(&mut self) -> Result<()> {
        self.expect_tail(Token::ArrayEnd)
    }

    fn read_struct_header(&mut self, name: &str, ty: &TypeDescriptor) -> Result<bool> {
        let token = self.next(name)?;
        Self::check_name(name, &token)?;
        match token {
            Token::StructStart { type_name, .. } if type_name == ty.name() => Ok(true),
            Token::StructStart { type_name, .. } => Err(Error::malformed(format!(
                "struct `{name}` is a `{type_name}`, expected `{}`",
                ty.name()
            ))),
            Token::Null { .. } => Ok(false),
            token => Err(Self::unexpected("a struct", &token)),
        }
    }

    fn read_struct_tail(&mut self) -> Result<()> {
        self.expect_tail(Token::StructEnd)
    }

    fn read_object_header(&mut self, name: &str) -> Result<ReadObjectResult> {
        let token = self.next(name)?;
        Self::check_name(name, &token)?;
        match token {
            Token::ObjectStart { type_name, id, .. } => Ok(ReadObjectResult::Object { type_name, id }),
            Token::Reference { id, .. } => Ok(ReadObjectResult::Reference(id)),
            Token::Null { .. } => Ok(ReadObjectResult::Null),
            token => Err(Self::unexpected("an object", &token)),
        }
    }

    fn read_object_tail(&mut self) -> Result<()> {
        self.expect_tail(Token::ObjectEnd)
    }

    fn skip(&mut self, name: &str) -> Result<()> {
        let token = self.next(name)?;
        Self::check_name(name, &token)?;
        let mut depth = token.depth_delta();
        while depth > 0 {
            depth += self.next("end of skipped node")?.depth_delta();
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        match self.tokens.len() {
            0 => Ok(()),
            n => Err(Error::malformed(format!("{n} unread tokens at end of stream"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Token, TokenReader};
    use crate::format::{FormatReader, Primitive, PrimitiveKind};
    use crate::Error;
    use alloc::vec;

    fn start() -> Token {
        Token::Start { format_version: crate::format::FORMAT_VERSION, data_version: 3 }
    }

    #[test]
    fn skip_consumes_nested_nodes() {
        let mut reader = TokenReader::new(vec![
            start(),
            Token::object("extra", "Node", 0),
            Token::value("name", Primitive::Str("a".into())),
            Token::ArrayStart { name: "items".into(), count: 0, bounds: vec![0] },
            Token::ArrayEnd,
            Token::ObjectEnd,
            Token::value("after", Primitive::U8(1)),
        ]);
        reader.initialize().unwrap();
        assert_eq!(reader.version(), 3);

        reader.skip("extra").unwrap();
        let after = reader.read_value("after", PrimitiveKind::U8).unwrap();
        assert_eq!(after, Some(Primitive::U8(1)));
        reader.close().unwrap();
    }

    #[test]
    fn names_are_checked() {
        let mut reader = TokenReader::new(vec![start(), Token::value("a", Primitive::Bool(true))]);
        reader.initialize().unwrap();
        let err = reader.read_value("b", PrimitiveKind::Bool).unwrap_err();
        assert!(matches!(err, Error::MalformedStream(_)));
    }

    #[test]
    fn trailing_tokens_fail_close() {
        let mut reader = TokenReader::new(vec![start(), Token::null("x")]);
        reader.initialize().unwrap();
        assert!(reader.close().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn recorded_streams_persist_through_serde() {
        use alloc::string::String;
        use alloc::vec::Vec;

        use super::TokenWriter;
        use crate::Serializer;
        use crate::registry::TypeRegistry;

        let serializer = Serializer::new(TypeRegistry::new());
        let value = vec![Some(String::from("a")), None, Some(String::from("\u{e9}"))];
        let mut writer = TokenWriter::new();
        serializer.serialize(&mut writer, &value).unwrap();
        let tokens = writer.into_tokens();

        let json = serde_json::to_string(&tokens).unwrap();
        let from_json: Vec<Token> = serde_json::from_str(&json).unwrap();
        assert_eq!(from_json, tokens);

        let ron = ron::to_string(&tokens).unwrap();
        let from_ron: Vec<Token> = ron::from_str(&ron).unwrap();
        assert_eq!(from_ron, tokens);

        let mut reader = TokenReader::new(from_ron);
        let back: Vec<Option<String>> = serializer.deserialize(&mut reader).unwrap();
        assert_eq!(back, value);
    }
}
