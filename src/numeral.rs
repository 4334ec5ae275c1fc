//! Positional numeral codec for any base.
//!
//! Stroke data is packed as short runs of base-36 digits and modifier
//! parameters are plain base-10, so both go through [`Base`]. Signed values
//! use a two's-complement style mapping that works for any base:
//!
//! ```text
//! B=16, width 3:   000 7ff -> +0 +2047     800 fff -> -2048 -1
//! B=3,  width 4:   0000 1111 -> +0 +40     1112 2222 -> -40 -1
//! ```
//!
//! Odd bases give every negative a matching positive.

use thiserror::Error;

use crate::defaults;

/// Base-10 digits, for modifier parameters.
pub const BASE10: Base = Base::from_digits(defaults::BASE10_DIGITS);

/// Base-36 digits, for stroke data.
pub const BASE36: Base = Base::from_digits(defaults::BASE36_DIGITS);

/// Errors from decoding or encoding digit runs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumeralError {
    #[error("'{0}' is not a digit of this base")]
    ForeignDigit(char),

    #[error("a digit run of length {0} does not fit the expected width")]
    StringSize(usize),

    #[error("value does not fit the target integer or digit width")]
    IntegerSize,
}

/// Integer types the codec can decode into and encode from.
pub trait Numeral: Copy {
    /// Bit width of the type.
    const BITS: u32;
    /// Whether negative values use the two's-complement style mapping.
    const SIGNED: bool;

    fn from_i128(value: i128) -> Option<Self>;
    fn to_i128(self) -> i128;
}

macro_rules! impl_numeral {
    ($($t:ty),* $(,)?) => {
        $(
            impl Numeral for $t {
                const BITS: u32 = <$t>::BITS;
                const SIGNED: bool = <$t>::MIN != 0;

                #[inline]
                fn from_i128(value: i128) -> Option<Self> {
                    <$t>::try_from(value).ok()
                }

                #[inline]
                fn to_i128(self) -> i128 {
                    self as i128
                }
            }
        )*
    };
}

impl_numeral!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// One fixed-width field of a packed tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Signed(usize),
    Unsigned(usize),
}

impl Field {
    pub const fn width(self) -> usize {
        match self {
            Field::Signed(w) | Field::Unsigned(w) => w,
        }
    }
}

/// A positional base defined by its ordered digit alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base {
    digits: &'static [u8],
}

impl Base {
    /// Build a base from its digits, lowest first.
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a `const`) if there are fewer
    /// than two digits, a digit is not ASCII, or a digit repeats.
    pub const fn from_digits(digits: &'static str) -> Base {
        let bytes = digits.as_bytes();
        assert!(bytes.len() > 1, "a base needs at least two digits");

        let mut i = 0;
        while i < bytes.len() {
            assert!(bytes[i].is_ascii(), "digits must be ASCII");
            let mut j = i + 1;
            while j < bytes.len() {
                assert!(bytes[i] != bytes[j], "digits must be unique");
                j += 1;
            }
            i += 1;
        }

        Base { digits: bytes }
    }

    /// Number of digits, i.e. the radix.
    #[inline]
    pub const fn radix(&self) -> u32 {
        self.digits.len() as u32
    }

    pub fn is_digit(&self, c: char) -> bool {
        self.digit_value(c).is_some()
    }

    /// Position of `c` in the alphabet.
    pub fn digit_value(&self, c: char) -> Option<u32> {
        if !c.is_ascii() {
            return None;
        }
        self.digits
            .iter()
            .position(|&d| d == c as u8)
            .map(|i| i as u32)
    }

    fn digit(&self, value: u128) -> char {
        self.digits[value as usize] as char
    }

    /// `radix^width`, or `None` if it overflows.
    pub fn capacity(&self, width: usize) -> Option<u128> {
        let exp = u32::try_from(width).ok()?;
        u128::from(self.radix()).checked_pow(exp)
    }

    /// First raw value that decodes as negative for a signed target.
    pub fn rollover(&self, width: usize) -> Option<u128> {
        Some(self.capacity(width)? / 2 + u128::from(self.radix() & 1))
    }

    /// The most digits that always fit an unsigned integer of `bits` bits.
    pub fn max_digit_count(&self, bits: u32) -> usize {
        let max = if bits >= 128 {
            u128::MAX
        } else {
            (1u128 << bits) - 1
        };
        let radix = u128::from(self.radix());

        let mut count = 0;
        let mut capacity = 1u128;
        while let Some(next) = capacity.checked_mul(radix) {
            if next - 1 > max {
                break;
            }
            capacity = next;
            count += 1;
        }
        count
    }

    /// Accumulate `text` most significant digit first.
    fn accumulate(&self, text: &str) -> Result<u128, NumeralError> {
        let radix = u128::from(self.radix());
        let mut result = 0u128;
        for c in text.chars() {
            let value = self
                .digit_value(c)
                .ok_or(NumeralError::ForeignDigit(c))?;
            result = result
                .checked_mul(radix)
                .and_then(|r| r.checked_add(u128::from(value)))
                .ok_or(NumeralError::StringSize(text.chars().count()))?;
        }
        Ok(result)
    }

    /// Decode exactly `width` digits.
    pub fn decode_fixed<T: Numeral>(&self, text: &str, width: usize) -> Result<T, NumeralError> {
        let len = text.chars().count();
        if len != width {
            return Err(NumeralError::StringSize(len));
        }
        self.decode_fixed_lenient(text, width)
    }

    /// Decode at most `width` digits. Signed mapping still uses `width`.
    pub fn decode_fixed_lenient<T: Numeral>(
        &self,
        text: &str,
        width: usize,
    ) -> Result<T, NumeralError> {
        if width > self.max_digit_count(T::BITS) {
            return Err(NumeralError::IntegerSize);
        }
        let len = text.chars().count();
        if len > width {
            return Err(NumeralError::StringSize(len));
        }

        let raw = self.accumulate(text)?;
        let value = if T::SIGNED {
            let capacity = self.capacity(width).ok_or(NumeralError::IntegerSize)?;
            let rollover = self.rollover(width).ok_or(NumeralError::IntegerSize)?;
            if raw >= rollover {
                raw as i128 - capacity as i128
            } else {
                raw as i128
            }
        } else {
            raw as i128
        };

        T::from_i128(value).ok_or(NumeralError::IntegerSize)
    }

    /// Encode `value` as exactly `width` digits.
    ///
    /// Negative values are only accepted for signed `T` and take the upper
    /// half of the digit range. Values outside the range are rejected.
    pub fn encode_fixed<T: Numeral>(&self, value: T, width: usize) -> Result<String, NumeralError> {
        if width > self.max_digit_count(T::BITS) {
            return Err(NumeralError::IntegerSize);
        }
        let capacity = self.capacity(width).ok_or(NumeralError::IntegerSize)? as i128;
        let mut value = value.to_i128();

        if T::SIGNED {
            let rollover = self.rollover(width).ok_or(NumeralError::IntegerSize)? as i128;
            if value < rollover - capacity || value >= rollover {
                return Err(NumeralError::IntegerSize);
            }
            if value < 0 {
                value += capacity;
            }
        } else if value < 0 || value >= capacity {
            return Err(NumeralError::IntegerSize);
        }

        let radix = u128::from(self.radix());
        let mut value = value as u128;
        let mut out = vec![self.digit(0); width];
        for slot in out.iter_mut().rev() {
            *slot = self.digit(value % radix);
            value /= radix;
        }
        Ok(out.into_iter().collect())
    }

    /// Decode a run of any length up to what fits in `T`.
    pub fn decode_variable<T: Numeral>(&self, text: &str) -> Result<T, NumeralError> {
        let len = text.chars().count();
        if len == 0 || len > self.max_digit_count(T::BITS) {
            return Err(NumeralError::StringSize(len));
        }
        let raw = self.accumulate(text)?;
        T::from_i128(raw as i128).ok_or(NumeralError::IntegerSize)
    }

    /// Encode a non-negative value with the fewest digits.
    pub fn encode_variable<T: Numeral>(&self, value: T) -> Result<String, NumeralError> {
        let value = value.to_i128();
        if value < 0 {
            return Err(NumeralError::IntegerSize);
        }

        let radix = u128::from(self.radix());
        let mut value = value as u128;
        let mut out = Vec::new();
        loop {
            out.push(self.digit(value % radix));
            value /= radix;
            if value == 0 {
                break;
            }
        }
        Ok(out.into_iter().rev().collect())
    }

    /// Decode a run of back-to-back fixed-width records.
    ///
    /// `text` must be a whole number of records. Each record is decoded into
    /// `N` values and handed to `build`. Nothing is returned unless every
    /// field decodes.
    pub fn decode_tuples<const N: usize, T>(
        &self,
        text: &str,
        fields: [Field; N],
        mut build: impl FnMut([i64; N]) -> T,
    ) -> Result<Vec<T>, NumeralError> {
        if let Some(c) = text.chars().find(|c| !c.is_ascii()) {
            return Err(NumeralError::ForeignDigit(c));
        }

        let record: usize = fields.iter().map(|f| f.width()).sum();
        if record == 0 || text.len() % record != 0 {
            return Err(NumeralError::StringSize(text.len()));
        }

        let mut out = Vec::with_capacity(text.len() / record);
        for start in (0..text.len()).step_by(record) {
            let mut values = [0i64; N];
            let mut at = start;
            for (slot, field) in values.iter_mut().zip(fields) {
                let digits = &text[at..at + field.width()];
                *slot = match field {
                    Field::Signed(w) => self.decode_fixed::<i64>(digits, w)?,
                    Field::Unsigned(w) => {
                        let v = self.decode_fixed::<u64>(digits, w)?;
                        i64::try_from(v).map_err(|_| NumeralError::IntegerSize)?
                    }
                };
                at += field.width();
            }
            out.push(build(values));
        }
        Ok(out)
    }
}
