//! Decoding attribute maps into typed props through serde.
//!
//! Every attribute value is a string; the target field type decides how it is read. A bare
//! boolean attribute (`<x disabled>`) has an empty value and decodes as `true`.

use crate::attributes::AttributeMap;
use serde::Deserialize;
use serde::de::value::{BorrowedStrDeserializer, MapDeserializer};
use serde::de::{self, IntoDeserializer, Visitor};
use std::fmt::Display;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{0}")]
    Custom(String),
    #[error("attribute `{name}`: cannot decode {value:?} as {expected}")]
    InvalidValue {
        name: String,
        value: String,
        expected: &'static str,
    },
}

impl de::Error for DecodeError {
    fn custom<T: Display>(msg: T) -> Self {
        DecodeError::Custom(msg.to_string())
    }
}

impl AttributeMap {
    /// Decode this map into `T`. Unknown attributes are ignored unless `T` denies them.
    pub fn decode<'a, T: Deserialize<'a>>(&'a self) -> Result<T, DecodeError> {
        let entries = self.iter().map(|(name, value)| {
            (
                name.as_str(),
                AttrValue {
                    name: name.as_str(),
                    value: value.as_str(),
                },
            )
        });
        T::deserialize(MapDeserializer::new(entries))
    }
}

#[derive(Clone, Copy)]
struct AttrValue<'de> {
    name: &'de str,
    value: &'de str,
}

impl AttrValue<'_> {
    fn invalid(&self, expected: &'static str) -> DecodeError {
        DecodeError::InvalidValue {
            name: self.name.to_string(),
            value: self.value.to_string(),
            expected,
        }
    }
}

impl<'de> IntoDeserializer<'de, DecodeError> for AttrValue<'de> {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

macro_rules! parse_scalar {
    ($($method:ident => $visit:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
                let parsed = self
                    .value
                    .trim()
                    .parse::<$ty>()
                    .map_err(|_| self.invalid(stringify!($ty)))?;
                visitor.$visit(parsed)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for AttrValue<'de> {
    type Error = DecodeError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_borrowed_str(self.value)
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        match self.value.trim() {
            "" | "true" => visitor.visit_bool(true),
            "false" => visitor.visit_bool(false),
            _ => Err(self.invalid("bool")),
        }
    }

    parse_scalar! {
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
        deserialize_f32 => visit_f32(f32),
        deserialize_f64 => visit_f64(f64),
        deserialize_char => visit_char(char),
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, DecodeError> {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, DecodeError> {
        visitor.visit_enum(BorrowedStrDeserializer::new(self.value))
    }

    serde::forward_to_deserialize_any! {
        i128 u128 str string bytes byte_buf unit unit_struct seq tuple tuple_struct map struct
        identifier ignored_any
    }
}
