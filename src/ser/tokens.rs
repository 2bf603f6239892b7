// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use super::{CurrentValue, Result, Writer};

/// A single token recorded by [`TokenWriter`].
#[derive(Debug, Clone, PartialEq, enum_as_inner::EnumAsInner)]
#[allow(missing_docs)]
pub enum Token {
    StartArray(Option<usize>),
    EndArray,
    StartObject,
    EndObject,
    FieldName(String),
    String(String),
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Nil,
    /// A native type id.
    TypeId(String),
    /// A current value binding. Not output, but recorded so its position can be observed.
    CurrentValue(CurrentValue),
}

/// A writer that records tokens instead of encoding them.
///
/// Performs no structural validation, which makes it handy for checking exactly what a
/// serializer asked for.
#[derive(Debug, Clone)]
pub struct TokenWriter {
    /// Every token written so far.
    pub tokens: Vec<Token>,
    native_type_ids: bool,
    // one slot per open container, on top of the root slot
    current: Vec<Option<CurrentValue>>,
}

impl Default for TokenWriter {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            native_type_ids: false,
            current: vec![None],
        }
    }
}

impl TokenWriter {
    /// Creates a new writer.
    #[must_use]
    pub fn new() -> Self {
        TokenWriter::default()
    }

    /// Creates a writer that embeds type ids natively.
    #[must_use]
    pub fn with_native_type_ids() -> Self {
        Self {
            native_type_ids: true,
            ..Self::default()
        }
    }

    fn push(&mut self, token: Token) -> Result<()> {
        self.tokens.push(token);
        Ok(())
    }

    fn close(&mut self) {
        // the root slot is never popped
        if self.current.len() > 1 {
            self.current.pop();
        }
    }
}

impl Writer for TokenWriter {
    fn write_start_array(&mut self, len: Option<usize>) -> Result<()> {
        self.current.push(None);
        self.push(Token::StartArray(len))
    }

    fn write_end_array(&mut self) -> Result<()> {
        self.close();
        self.push(Token::EndArray)
    }

    fn write_start_object(&mut self) -> Result<()> {
        self.current.push(None);
        self.push(Token::StartObject)
    }

    fn write_end_object(&mut self) -> Result<()> {
        self.close();
        self.push(Token::EndObject)
    }

    fn write_field_name(&mut self, name: &str) -> Result<()> {
        self.push(Token::FieldName(name.to_string()))
    }

    fn write_string(&mut self, v: &str) -> Result<()> {
        self.push(Token::String(v.to_string()))
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.push(Token::Bool(v))
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        self.push(Token::I64(v))
    }

    fn write_u64(&mut self, v: u64) -> Result<()> {
        self.push(Token::U64(v))
    }

    fn write_f64(&mut self, v: f64) -> Result<()> {
        self.push(Token::F64(v))
    }

    fn write_nil(&mut self) -> Result<()> {
        self.push(Token::Nil)
    }

    fn assign_current_value(&mut self, value: CurrentValue) {
        self.tokens.push(Token::CurrentValue(value.clone()));
        if let Some(slot) = self.current.last_mut() {
            *slot = Some(value);
        }
    }

    fn current_value(&self) -> Option<&CurrentValue> {
        self.current.last().and_then(Option::as_ref)
    }

    fn can_write_type_id(&self) -> bool {
        self.native_type_ids
    }

    fn write_type_id(&mut self, id: &str) -> Result<()> {
        self.push(Token::TypeId(id.to_string()))
    }
}
