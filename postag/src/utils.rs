use std::hash::Hash;
use std::ops::{Deref, DerefMut};

use bincode::{
    de::{BorrowDecoder, Decoder},
    enc::Encoder,
    error::{DecodeError, EncodeError},
    BorrowDecode, Decode, Encode,
};
use hashbrown::HashMap;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SerializableHashMap<K, V>(pub HashMap<K, V>)
where
    K: Eq + Hash;

impl<K, V> Deref for SerializableHashMap<K, V>
where
    K: Eq + Hash,
{
    type Target = HashMap<K, V>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<K, V> DerefMut for SerializableHashMap<K, V>
where
    K: Eq + Hash,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<K, V> Decode for SerializableHashMap<K, V>
where
    K: Decode + Eq + Hash + 'static,
    V: Decode + 'static,
{
    fn decode<D: Decoder>(decoder: &mut D) -> Result<Self, DecodeError> {
        let raw: Vec<(K, V)> = Decode::decode(decoder)?;
        Ok(Self(raw.into_iter().collect()))
    }
}

impl<'de, K, V> BorrowDecode<'de> for SerializableHashMap<K, V>
where
    K: Decode + Eq + Hash + 'static,
    V: Decode + 'static,
{
    fn borrow_decode<D: BorrowDecoder<'de>>(decoder: &mut D) -> Result<Self, DecodeError> {
        Decode::decode(decoder)
    }
}

// Entries are written in key order so that equal maps encode to equal bytes.
impl<K, V> Encode for SerializableHashMap<K, V>
where
    K: Encode + Eq + Hash + Ord,
    V: Encode,
{
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        let mut raw: Vec<(&K, &V)> = self.0.iter().collect();
        raw.sort_unstable_by(|a, b| a.0.cmp(b.0));
        // Same wire format as `Vec<(K, V)>`: u64 length prefix, then each pair in order.
        (raw.len() as u64).encode(encoder)?;
        for (k, v) in raw {
            k.encode(encoder)?;
            v.encode(encoder)?;
        }
        Ok(())
    }
}

/// Returns `true` if `s` is usable as a word or a tag: non-empty and free of whitespace.
pub fn is_valid_token(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}
