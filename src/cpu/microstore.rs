//! Medusa control store.
//!
//! The microprogram lives in EEPROM, addressed by the 8-bit MPC, so the
//! store holds 256 words. Unprogrammed addresses stay empty.

use crate::cpu::microword::MicroWord;
use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

/// Number of micro-addresses.
pub const MICROSTORE_SIZE: usize = 256;

/// The control store.
///
/// Serializes as a plain list of 256 optional words; anything else fails to
/// deserialize.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<MicroWord>>", into = "Vec<Option<MicroWord>>")]
pub struct Microstore {
    words: Vec<Option<MicroWord>>,
}

impl Microstore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            words: vec![None; MICROSTORE_SIZE],
        }
    }

    #[inline]
    pub fn read(&self, addr: u8) -> Option<&MicroWord> {
        self.words[addr as usize].as_ref()
    }

    #[inline]
    pub fn write(&mut self, addr: u8, word: MicroWord) {
        self.words[addr as usize] = Some(word);
    }

    /// Erase every word.
    pub fn clear(&mut self) {
        for slot in &mut self.words {
            *slot = None;
        }
    }

    /// Load a microprogram.
    ///
    /// Words carrying an assigned address go there; the rest follow the
    /// previous word.
    pub fn load_program(&mut self, program: &[MicroWord]) -> Result<(), MicrostoreError> {
        let mut next = 0usize;
        for word in program {
            let addr = word.address.map_or(next, usize::from);
            if addr >= MICROSTORE_SIZE {
                return Err(MicrostoreError::ProgramTooLarge { size: program.len() });
            }
            self.words[addr] = Some(word.clone());
            next = addr + 1;
        }
        Ok(())
    }

    /// Programmed (address, word) pairs in address order.
    pub fn programmed(&self) -> impl Iterator<Item = (u8, &MicroWord)> + '_ {
        self.words
            .iter()
            .enumerate()
            .filter_map(|(i, w)| w.as_ref().map(|w| (i as u8, w)))
    }

    pub fn len(&self) -> usize {
        self.words.iter().filter(|w| w.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Microstore {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<Option<MicroWord>>> for Microstore {
    type Error = MicrostoreError;

    fn try_from(words: Vec<Option<MicroWord>>) -> Result<Self, Self::Error> {
        if words.len() != MICROSTORE_SIZE {
            return Err(MicrostoreError::WrongSize(words.len()));
        }
        Ok(Self { words })
    }
}

impl From<Microstore> for Vec<Option<MicroWord>> {
    fn from(store: Microstore) -> Self {
        store.words
    }
}

impl fmt::Debug for Microstore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Microstore")
            .field("programmed", &self.len())
            .field("total", &MICROSTORE_SIZE)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MicrostoreError {
    #[error("microprogram of {size} words runs past micro-address 0xFF")]
    ProgramTooLarge { size: usize },

    #[error("control store holds {} words, found {0}", MICROSTORE_SIZE)]
    WrongSize(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(read: u8) -> MicroWord {
        MicroWord::new(0, read, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_load_sequential() {
        let mut store = Microstore::new();
        store.load_program(&[word(1), word(2), word(3)]).unwrap();
        assert_eq!(store.read(2).unwrap().read(), 3);
        assert!(store.read(3).is_none());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_load_assigned_addresses() {
        let mut store = Microstore::new();
        store.load_program(&[word(1), word(2).at(0x40), word(3)]).unwrap();
        assert_eq!(store.read(0x40).unwrap().read(), 2);
        assert_eq!(store.read(0x41).unwrap().read(), 3);
        assert!(store.read(1).is_none());
    }

    #[test]
    fn test_program_too_large() {
        let mut store = Microstore::new();
        let err = store.load_program(&[word(1).at(0xFF), word(2)]).unwrap_err();
        assert_eq!(err, MicrostoreError::ProgramTooLarge { size: 2 });
    }

    #[test]
    fn test_short_store_is_rejected() {
        let err = serde_json::from_str::<Microstore>("[null, null]").unwrap_err();
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn test_serde_keeps_words() {
        let mut store = Microstore::new();
        store.write(0x40, word(5));
        let json = serde_json::to_string(&store).unwrap();
        let back: Microstore = serde_json::from_str(&json).unwrap();
        assert_eq!(back.read(0x40).unwrap().read(), 5);
        assert_eq!(back.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut store = Microstore::new();
        store.write(7, word(1));
        store.clear();
        assert!(store.is_empty());
    }
}
