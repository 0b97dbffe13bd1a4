use serde::{Deserialize, Serialize};
use std::fmt;

use super::codec::{CodecError, Key};

/// A single nucleotide.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Base {
    A,
    C,
    G,
    T,
}

impl Base {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Base::A),
            'C' => Some(Base::C),
            'G' => Some(Base::G),
            'T' => Some(Base::T),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::T => 'T',
        }
    }

    /// 2-bit code used by the packed key representation.
    pub fn bits(self) -> u128 {
        match self {
            Base::A => 0,
            Base::C => 1,
            Base::G => 2,
            Base::T => 3,
        }
    }

    pub fn from_bits(bits: u128) -> Self {
        match bits & 0b11 {
            0 => Base::A,
            1 => Base::C,
            2 => Base::G,
            _ => Base::T,
        }
    }
}

/// The neighbour of a k-mer on one side of the graph.
///
/// `Terminator` (written `F` in the input format) means there is no neighbour:
/// on the backward side it marks the start of a contig, on the forward side
/// its end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Extension {
    Base(Base),
    Terminator,
}

impl Extension {
    pub const TERMINATOR_CHAR: char = 'F';

    pub fn from_char(c: char) -> Result<Self, CodecError> {
        if c == Self::TERMINATOR_CHAR {
            return Ok(Extension::Terminator);
        }
        Base::from_char(c)
            .map(Extension::Base)
            .ok_or(CodecError::InvalidExtension(c))
    }

    pub fn to_char(self) -> char {
        match self {
            Extension::Base(base) => base.to_char(),
            Extension::Terminator => Self::TERMINATOR_CHAR,
        }
    }

    pub fn is_terminator(self) -> bool {
        self == Extension::Terminator
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A de Bruijn graph node: a k-mer plus its single successor and predecessor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Record {
    pub key: Key,
    pub forward: Extension,
    pub backward: Extension,
}

impl Record {
    /// Builds a record from its text pieces, e.g. `("AAAC", 'G', 'A')`.
    pub fn parse(kmer: &str, forward: char, backward: char) -> Result<Self, CodecError> {
        Ok(Self {
            key: Key::encode(kmer)?,
            forward: Extension::from_char(forward)?,
            backward: Extension::from_char(backward)?,
        })
    }

    /// Backward terminator: the traversal of a contig begins here.
    pub fn is_start(&self) -> bool {
        self.backward.is_terminator()
    }

    /// Forward terminator: the traversal of a contig ends here.
    pub fn is_end(&self) -> bool {
        self.forward.is_terminator()
    }

    /// Key of the successor node, or `None` at the end of a contig.
    pub fn next_key(&self) -> Option<Key> {
        match self.forward {
            Extension::Base(base) => Some(self.key.successor(base)),
            Extension::Terminator => None,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.key, self.backward, self.forward)
    }
}
