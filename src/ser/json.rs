// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use super::{CurrentValue, Error, Kind, Result, Writer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextKind {
    Root,
    Array,
    Object,
}

impl ContextKind {
    fn describe(self) -> &'static str {
        match self {
            ContextKind::Root => "the root context",
            ContextKind::Array => "an array",
            ContextKind::Object => "an object",
        }
    }
}

#[derive(Debug, Clone)]
struct Context {
    kind: ContextKind,
    entries: usize,
    // only meaningful for objects
    has_name: bool,
    current: Option<CurrentValue>,
}

impl Context {
    fn new(kind: ContextKind) -> Self {
        Self {
            kind,
            entries: 0,
            has_name: false,
            current: None,
        }
    }
}

/// A writer producing compact json.
///
/// Multiple root values are separated by a single space.
#[derive(Debug, Clone)]
pub struct JsonWriter {
    /// The underlying output of the writer.
    pub output: Vec<u8>,
    contexts: Vec<Context>,
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self {
            output: Vec::new(),
            contexts: vec![Context::new(ContextKind::Root)],
        }
    }
}

impl JsonWriter {
    /// Creates a new writer.
    ///
    /// Same as [`Default::default`].
    #[must_use]
    pub fn new() -> Self {
        JsonWriter::default()
    }

    /// Consume the writer, returning its output as a string.
    pub fn into_string(self) -> Result<String> {
        String::from_utf8(self.output).map_err(|e| Kind::Utf8(e).into())
    }

    fn context(&mut self) -> &mut Context {
        // the root context is never popped
        let last = self.contexts.len() - 1;
        &mut self.contexts[last]
    }

    // Writes whatever separator is needed before a value.
    fn before_value(&mut self) -> Result<()> {
        let ctx = self.context();
        let separator = match ctx.kind {
            ContextKind::Object => {
                if !ctx.has_name {
                    return Err(Error {
                        kind: Kind::ExpectedFieldName,
                    });
                }
                ctx.has_name = false;
                None
            }
            ContextKind::Array => (ctx.entries > 0).then_some(b','),
            ContextKind::Root => (ctx.entries > 0).then_some(b' '),
        };
        ctx.entries += 1;

        if let Some(b) = separator {
            self.output.push(b);
        }
        Ok(())
    }

    fn end(&mut self, kind: ContextKind, close: u8) -> Result<()> {
        let found = self.context();
        if found.kind != kind || (kind == ContextKind::Object && found.has_name) {
            return Err(Error {
                kind: Kind::MismatchedEnd {
                    expected: kind.describe(),
                    found: found.kind.describe(),
                },
            });
        }
        self.contexts.pop();
        self.output.push(close);
        Ok(())
    }

    fn write_json<T>(&mut self, value: &T) -> Result<()>
    where
        T: serde::Serialize + ?Sized,
    {
        serde_json::to_writer(&mut self.output, value).map_err(Kind::Json)?;
        Ok(())
    }
}

impl Writer for JsonWriter {
    fn write_start_array(&mut self, _len: Option<usize>) -> Result<()> {
        self.before_value()?;
        self.contexts.push(Context::new(ContextKind::Array));
        self.output.push(b'[');
        Ok(())
    }

    fn write_end_array(&mut self) -> Result<()> {
        self.end(ContextKind::Array, b']')
    }

    fn write_start_object(&mut self) -> Result<()> {
        self.before_value()?;
        self.contexts.push(Context::new(ContextKind::Object));
        self.output.push(b'{');
        Ok(())
    }

    fn write_end_object(&mut self) -> Result<()> {
        self.end(ContextKind::Object, b'}')
    }

    fn write_field_name(&mut self, name: &str) -> Result<()> {
        let ctx = self.context();
        if ctx.kind != ContextKind::Object || ctx.has_name {
            return Err(Error {
                kind: Kind::UnexpectedFieldName(name.to_string()),
            });
        }
        ctx.has_name = true;
        let comma = ctx.entries > 0;

        if comma {
            self.output.push(b',');
        }
        self.write_json(name)?;
        self.output.push(b':');
        Ok(())
    }

    fn write_string(&mut self, v: &str) -> Result<()> {
        self.before_value()?;
        self.write_json(v)
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.before_value()?;
        self.output
            .extend_from_slice(if v { b"true" } else { b"false" });
        Ok(())
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        self.before_value()?;
        self.write_json(&v)
    }

    fn write_u64(&mut self, v: u64) -> Result<()> {
        self.before_value()?;
        self.write_json(&v)
    }

    fn write_f64(&mut self, v: f64) -> Result<()> {
        self.before_value()?;
        // json has no representation for these, so they are quoted
        if v.is_nan() {
            self.write_json("NaN")
        } else if v.is_infinite() {
            self.write_json(if v > 0.0 { "Infinity" } else { "-Infinity" })
        } else {
            self.write_json(&v)
        }
    }

    fn write_nil(&mut self) -> Result<()> {
        self.before_value()?;
        self.output.extend_from_slice(b"null");
        Ok(())
    }

    fn assign_current_value(&mut self, value: CurrentValue) {
        self.context().current = Some(value);
    }

    fn current_value(&self) -> Option<&CurrentValue> {
        self.contexts.last().and_then(|c| c.current.as_ref())
    }
}
