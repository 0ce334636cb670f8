//! Bit-level I/O shared by the Gorilla and bit-packing codecs

/// MSB-first bit writer
#[derive(Debug)]
pub struct BitWriter {
    buffer: Vec<u8>,
    current_byte: u8,
    bit_position: u8,
}

impl BitWriter {
    /// Create a new BitWriter
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create with capacity hint
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            current_byte: 0,
            bit_position: 0,
        }
    }

    /// Write a single bit
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u64, 1);
    }

    /// Write the low `num_bits` bits of `value`, most significant first
    #[inline]
    pub fn write_bits(&mut self, value: u64, num_bits: usize) {
        debug_assert!(num_bits <= 64);

        let mut remaining = num_bits;
        while remaining > 0 {
            let free = 8 - self.bit_position as usize;
            let take = free.min(remaining);
            let chunk = ((value >> (remaining - take)) & ((1u64 << take) - 1)) as u8;

            self.current_byte |= chunk << (free - take);
            self.bit_position += take as u8;
            remaining -= take;

            if self.bit_position == 8 {
                self.buffer.push(self.current_byte);
                self.current_byte = 0;
                self.bit_position = 0;
            }
        }
    }

    /// Finish writing and return the buffer, zero-padded to a whole byte
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_position > 0 {
            self.buffer.push(self.current_byte);
        }
        self.buffer
    }

    /// Number of bits written so far
    pub fn bit_len(&self) -> usize {
        self.buffer.len() * 8 + self.bit_position as usize
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.bit_len() == 0
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// MSB-first bit reader
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    byte_position: usize,
    bit_position: u8,
}

impl<'a> BitReader<'a> {
    /// Create a new BitReader
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_position: 0,
            bit_position: 0,
        }
    }

    /// Read a single bit
    #[inline]
    pub fn read_bit(&mut self) -> Option<bool> {
        self.read_bits(1).map(|bit| bit == 1)
    }

    /// Read `num_bits` bits as a u64, or `None` past the end of the data
    #[inline]
    pub fn read_bits(&mut self, num_bits: usize) -> Option<u64> {
        debug_assert!(num_bits <= 64);
        if self.remaining() < num_bits {
            return None;
        }

        let mut value = 0u64;
        let mut remaining = num_bits;
        while remaining > 0 {
            let available = 8 - self.bit_position as usize;
            let take = available.min(remaining);
            let byte = self.data[self.byte_position];
            let chunk = (byte >> (available - take)) & ((1u16 << take) - 1) as u8;

            value = (value << take) | chunk as u64;
            self.bit_position += take as u8;
            remaining -= take;

            if self.bit_position == 8 {
                self.byte_position += 1;
                self.bit_position = 0;
            }
        }
        Some(value)
    }

    /// Bits left to read, padding included
    pub fn remaining(&self) -> usize {
        self.data.len() * 8 - self.position()
    }

    /// Get the current position in bits
    pub fn position(&self) -> usize {
        self.byte_position * 8 + self.bit_position as usize
    }
}
