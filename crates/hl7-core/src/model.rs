// Dweve HL7 - Streaming HL7 v2 Message Parser
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The message tree produced by parsing.
//!
//! ```text
//! Message
//! └── Segment        (split on CR / LF)
//!     └── Field      (split on the field delimiter)
//!         └── Repetition   (split on the repeat delimiter)
//!             └── Component      (split on the component delimiter)
//!                 └── Subcomponent     (split on the subcomponent delimiter; raw bytes)
//! ```
//!
//! Positions carry meaning, so an element between two adjacent delimiters is
//! present but empty. An empty [`Field`] has zero repetitions; an empty
//! [`Component`] has zero subcomponents.
//!
//! Trees are built by the tokenizer and only read afterwards; the mutating
//! methods are crate-private.

use std::borrow::Cow;
use std::fmt;

/// Nesting level of an element, innermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Subcomponent = 0,
    Component = 1,
    Repetition = 2,
    Field = 3,
    Segment = 4,
}

impl Level {
    /// Number of levels below [`Message`].
    pub const COUNT: usize = 5;

    /// All levels, innermost first.
    pub const ALL: [Level; Level::COUNT] = [
        Level::Subcomponent,
        Level::Component,
        Level::Repetition,
        Level::Field,
        Level::Segment,
    ];

    /// Index into a per-level array (0 = subcomponent, 4 = segment).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The level nested directly inside this one.
    #[inline]
    pub fn below(self) -> Option<Level> {
        match self.index() {
            0 => None,
            i => Some(Self::ALL[i - 1]),
        }
    }

    /// The level that directly contains this one, `None` for segments.
    #[inline]
    pub fn above(self) -> Option<Level> {
        Self::ALL.get(self.index() + 1).copied()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Subcomponent => "subcomponent",
            Self::Component => "component",
            Self::Repetition => "repetition",
            Self::Field => "field",
            Self::Segment => "segment",
        };
        f.write_str(name)
    }
}

/// Raw bytes at the innermost level. Never decomposed further.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Subcomponent(Vec<u8>);

impl Subcomponent {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text view, replacing invalid UTF-8 with U+FFFD.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Subcomponent {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Subcomponent {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for Subcomponent {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl AsRef<[u8]> for Subcomponent {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<[u8]> for Subcomponent {
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Subcomponent {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Display for Subcomponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Subcomponent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Subcomponent {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| Self(s.into_bytes()))
    }
}

/// Declares an ordered container level over `$child`.
macro_rules! sequence {
    ($(#[$meta:meta])* $name:ident => $child:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        pub struct $name(Vec<$child>);

        impl $name {
            pub fn new(items: Vec<$child>) -> Self {
                Self(items)
            }

            #[inline]
            pub fn len(&self) -> usize {
                self.0.len()
            }

            #[inline]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Element at a zero-based position.
            #[inline]
            pub fn get(&self, index: usize) -> Option<&$child> {
                self.0.get(index)
            }

            #[inline]
            pub fn iter(&self) -> std::slice::Iter<'_, $child> {
                self.0.iter()
            }

            #[inline]
            pub fn as_slice(&self) -> &[$child] {
                &self.0
            }

            pub fn into_inner(self) -> Vec<$child> {
                self.0
            }

            #[inline]
            pub(crate) fn push(&mut self, item: $child) {
                self.0.push(item);
            }
        }

        impl From<Vec<$child>> for $name {
            fn from(items: Vec<$child>) -> Self {
                Self(items)
            }
        }

        impl FromIterator<$child> for $name {
            fn from_iter<I: IntoIterator<Item = $child>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }

        impl IntoIterator for $name {
            type Item = $child;
            type IntoIter = std::vec::IntoIter<$child>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $child;
            type IntoIter = std::slice::Iter<'a, $child>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }
    };
}

sequence! {
    /// Ordered subcomponents. Empty when the component is a positional placeholder.
    Component => Subcomponent
}

sequence! {
    /// Ordered components of one field repetition.
    Repetition => Component
}

sequence! {
    /// Ordered repetitions. Zero repetitions means "present but empty".
    Field => Repetition
}

sequence! {
    /// Ordered fields. Field 0 holds the segment tag.
    Segment => Field
}

sequence! {
    /// Ordered segments in document order.
    Message => Segment
}

impl Component {
    /// Builds a component holding a single subcomponent.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(vec![Subcomponent::new(bytes)])
    }

    /// Bytes of the first subcomponent, if any.
    pub fn first_bytes(&self) -> Option<&[u8]> {
        self.0.first().map(Subcomponent::as_bytes)
    }
}

impl Field {
    /// Builds a field holding one repetition with one component with one
    /// subcomponent, the shape of the header's special-cased fields.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(vec![Repetition(vec![Component::from_bytes(bytes)])])
    }

    /// Bytes of the first subcomponent of the first component of the first
    /// repetition.
    pub fn first_bytes(&self) -> Option<&[u8]> {
        self.0
            .first()
            .and_then(|rep| rep.0.first())
            .and_then(Component::first_bytes)
    }
}

impl Segment {
    /// The segment identifier, read from its first field's first subcomponent.
    ///
    /// Empty when the first field is itself empty.
    pub fn tag(&self) -> &[u8] {
        self.0.first().and_then(Field::first_bytes).unwrap_or_default()
    }

    /// The segment identifier as text.
    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.tag())
    }
}

impl Message {
    /// The first segment, normally `MSH`.
    pub fn header(&self) -> Option<&Segment> {
        self.0.first()
    }

    /// All segments carrying the given tag, in document order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hl7_core::{Field, Message, Segment};
    ///
    /// let message: Message = ["MSH", "OBX", "OBX"]
    ///     .into_iter()
    ///     .map(|tag| Segment::new(vec![Field::from_bytes(tag)]))
    ///     .collect();
    /// assert_eq!(message.segments_named("OBX").count(), 2);
    /// ```
    pub fn segments_named<'a>(
        &'a self,
        tag: &'a str,
    ) -> impl Iterator<Item = &'a Segment> + 'a {
        self.0.iter().filter(move |s| s.tag() == tag.as_bytes())
    }

    /// Raw bytes at a fully qualified zero-based position.
    pub fn value(
        &self,
        segment: usize,
        field: usize,
        repetition: usize,
        component: usize,
        subcomponent: usize,
    ) -> Option<&[u8]> {
        self.0
            .get(segment)?
            .get(field)?
            .get(repetition)?
            .get(component)?
            .get(subcomponent)
            .map(Subcomponent::as_bytes)
    }
}
