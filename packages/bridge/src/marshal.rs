//! Decoding of entry point arguments out of the module's linear memory.
//!
//! Strings are UTF-8 byte ranges given as `(ptr, len)`. A string list is a
//! table of `count` entries at `list_ptr`, each entry two little-endian `u32`
//! values `(ptr, len)`.

use thiserror::Error;

const LIST_ENTRY_SIZE: u32 = 8;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarshalError {
    #[error("range {offset}+{len} is outside module memory of {size} bytes")]
    OutOfBounds { offset: u32, len: u32, size: u64 },

    #[error("string list of {count} entries at {offset} overflows the address space")]
    ListTooLarge { offset: u32, count: u32 },

    #[error("string at {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: u32 },

    #[error("module memory is unavailable: {0}")]
    Unavailable(String),
}

/// Byte range of a UTF-8 string in module memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrRef {
    pub ptr: u32,
    pub len: u32,
}

impl StrRef {
    pub fn new(ptr: u32, len: u32) -> Self {
        Self { ptr, len }
    }
}

/// Read access to the module's linear memory.
pub trait LinearMemory {
    fn read(&self, offset: u32, len: u32) -> Result<Vec<u8>, MarshalError>;
}

impl LinearMemory for [u8] {
    fn read(&self, offset: u32, len: u32) -> Result<Vec<u8>, MarshalError> {
        let out_of_bounds = || MarshalError::OutOfBounds {
            offset,
            len,
            size: self.len() as u64,
        };
        let start = offset as usize;
        let end = start.checked_add(len as usize).ok_or_else(out_of_bounds)?;
        self.get(start..end)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(out_of_bounds)
    }
}

impl LinearMemory for Vec<u8> {
    fn read(&self, offset: u32, len: u32) -> Result<Vec<u8>, MarshalError> {
        self.as_slice().read(offset, len)
    }
}

pub fn read_str<M: LinearMemory + ?Sized>(memory: &M, s: StrRef) -> Result<String, MarshalError> {
    let bytes = memory.read(s.ptr, s.len)?;
    String::from_utf8(bytes).map_err(|_| MarshalError::InvalidUtf8 { offset: s.ptr })
}

pub fn read_str_list<M: LinearMemory + ?Sized>(
    memory: &M,
    list_ptr: u32,
    count: u32,
) -> Result<Vec<String>, MarshalError> {
    let table_len = count
        .checked_mul(LIST_ENTRY_SIZE)
        .ok_or(MarshalError::ListTooLarge {
            offset: list_ptr,
            count,
        })?;
    let table = memory.read(list_ptr, table_len)?;

    table
        .chunks_exact(LIST_ENTRY_SIZE as usize)
        .map(|entry| {
            let ptr = u32::from_le_bytes([entry[0], entry[1], entry[2], entry[3]]);
            let len = u32::from_le_bytes([entry[4], entry[5], entry[6], entry[7]]);
            read_str(memory, StrRef::new(ptr, len))
        })
        .collect()
}

/// Builds a memory image the way a module would lay out its arguments.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct TestMemory {
    pub bytes: Vec<u8>,
}

#[cfg(test)]
impl TestMemory {
    pub fn push_str(&mut self, s: &str) -> StrRef {
        let ptr = self.bytes.len() as u32;
        self.bytes.extend_from_slice(s.as_bytes());
        StrRef::new(ptr, s.len() as u32)
    }

    /// Returns `(list_ptr, count)`.
    pub fn push_str_list(&mut self, items: &[&str]) -> (u32, u32) {
        let refs: Vec<StrRef> = items.iter().map(|item| self.push_str(item)).collect();
        let list_ptr = self.bytes.len() as u32;
        for r in &refs {
            self.bytes.extend_from_slice(&r.ptr.to_le_bytes());
            self.bytes.extend_from_slice(&r.len.to_le_bytes());
        }
        (list_ptr, refs.len() as u32)
    }
}
