#[cfg(not(feature = "std"))]
use core as std;

use crate::{MAX_NODE_CTR, MAX_TIMESTAMP, NODE_CTR_SIZE};
use fstr::FStr;
use std::{error, fmt, str};

/// Digit characters used in the Base36 notation.
const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// An O(1) map from ASCII code points to Base36 digit values.
const DECODE_MAP: [u8; 256] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18,
    0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f, 0x20, 0x21, 0x22, 0x23, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18,
    0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f, 0x20, 0x21, 0x22, 0x23, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// Represents a SCRU64 ID and provides converters and comparison operators.
///
/// # Examples
///
/// ```rust
/// use scru64::Scru64Id;
///
/// let x = "0u375nxqh5cq".parse::<Scru64Id>()?;
/// assert_eq!(x.to_string(), "0u375nxqh5cq");
///
/// let y = Scru64Id::try_from(0x0186_d52b_be2a_635au64)?;
/// assert_eq!(y.to_u64(), 0x0186_d52b_be2a_635au64);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[repr(transparent)]
pub struct Scru64Id(u64);

impl Scru64Id {
    /// Returns the integer representation.
    pub const fn to_u64(self) -> u64 {
        self.0
    }

    /// Creates a value from the `timestamp` and the combined `node_ctr` field value.
    ///
    /// # Panics
    ///
    /// Panics if any argument is out of the value range of the field.
    pub const fn from_parts(timestamp: u64, node_ctr: u32) -> Self {
        if timestamp > MAX_TIMESTAMP || node_ctr > MAX_NODE_CTR {
            panic!("invalid field value");
        } else {
            Self(timestamp << NODE_CTR_SIZE | node_ctr as u64)
        }
    }

    /// Returns the `timestamp` field value.
    pub const fn timestamp(&self) -> u64 {
        self.0 >> NODE_CTR_SIZE
    }

    /// Returns the `node_id` and `counter` field values combined as a single integer.
    pub const fn node_ctr(&self) -> u32 {
        self.0 as u32 & MAX_NODE_CTR
    }

    /// Creates a value from a 12-digit string representation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scru64::Scru64Id;
    ///
    /// let x = Scru64Id::try_from_str("0u375nxqh5cq")?;
    /// let y = "0u375nxqh5cq".parse::<Scru64Id>()?;
    /// assert_eq!(x, y);
    /// # Ok::<(), scru64::ParseError>(())
    /// ```
    pub const fn try_from_str(str_value: &str) -> Result<Self, ParseError> {
        if str_value.len() != 12 {
            return Err(ParseError::invalid_length(str_value.len()));
        }

        let mut int_value = 0u64;
        let mut i = 0;
        while i < 12 {
            let n = DECODE_MAP[str_value.as_bytes()[i] as usize];
            if n == 0xff {
                return Err(ParseError::invalid_digit(str_value, i));
            }
            // cannot overflow because 36^12 - 1 < 2^63
            int_value = int_value * 36 + n as u64;
            i += 1;
        }
        Ok(Self(int_value))
    }

    /// Returns the 12-digit canonical string representation stored in a stack-allocated
    /// string-like type that can be handled like [`String`] through common traits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scru64::Scru64Id;
    ///
    /// let x = "0u375nxqh5cq".parse::<Scru64Id>()?;
    /// let y = x.encode();
    /// assert_eq!(y, "0u375nxqh5cq");
    /// assert_eq!(format!("{}", y), "0u375nxqh5cq");
    /// # Ok::<(), scru64::ParseError>(())
    /// ```
    pub const fn encode(&self) -> FStr<12> {
        let mut dst = [b'0'; 12];
        let mut int_value = self.0;
        let mut i = dst.len();
        while int_value > 0 {
            i -= 1;
            dst[i] = DIGITS[(int_value % 36) as usize];
            int_value /= 36;
        }

        // SAFETY: All bytes in `dst` are valid ASCII characters.
        unsafe { FStr::from_inner_unchecked(dst) }
    }
}

impl TryFrom<u64> for Scru64Id {
    type Error = RangeError;

    /// Creates a value from a 64-bit unsigned integer, reporting an error if the argument is
    /// larger than the maximum valid SCRU64 ID (i.e., `zzzzzzzzzzzz`).
    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > crate::MAX_SCRU64_INT {
            Err(RangeError {})
        } else {
            Ok(Self(value))
        }
    }
}

impl From<Scru64Id> for u64 {
    fn from(value: Scru64Id) -> Self {
        value.to_u64()
    }
}

impl TryFrom<i64> for Scru64Id {
    type Error = RangeError;

    /// Creates a value from a 64-bit signed integer, reporting an error if the argument is
    /// negative or larger than the maximum valid SCRU64 ID.
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u64::try_from(value) {
            Ok(int_value) => Self::try_from(int_value),
            _ => Err(RangeError {}),
        }
    }
}

impl From<Scru64Id> for i64 {
    /// Returns the integer representation, which is always in the `i64` range because a valid
    /// SCRU64 ID fits within 63 bits.
    fn from(value: Scru64Id) -> Self {
        value.to_u64() as i64
    }
}

impl str::FromStr for Scru64Id {
    type Err = ParseError;

    /// Creates a value from a 12-digit string representation.
    fn from_str(str_value: &str) -> Result<Self, Self::Err> {
        Self::try_from_str(str_value)
    }
}

impl fmt::Display for Scru64Id {
    /// Returns the 12-digit canonical string representation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scru64::Scru64Id;
    ///
    /// let x = "0u375ny0glr0".parse::<Scru64Id>()?;
    /// assert_eq!(format!("{}", x), "0u375ny0glr0");
    /// assert_eq!(format!("{:16}", x), "0u375ny0glr0    ");
    /// assert_eq!(format!("{:->16}", x), "----0u375ny0glr0");
    /// assert_eq!(format!("{:.^7.5}", x), ".0u375.");
    /// # Ok::<(), scru64::ParseError>(())
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.encode().as_str(), f)
    }
}

/// An error parsing an invalid string representation of SCRU64 ID.
#[derive(Clone, Debug)]
pub struct ParseError {
    kind: ParseErrorKind,
}

#[derive(Clone, Eq, PartialEq, Debug)]
enum ParseErrorKind {
    InvalidLength {
        n_bytes: usize,
    },
    InvalidDigit {
        /// Holds the invalid character as a UTF-8 byte array to work in the const context.
        utf8_char: [u8; 4],
        position: usize,
    },
}

impl ParseError {
    /// Creates an `InvalidLength` variant from the actual length.
    const fn invalid_length(n_bytes: usize) -> Self {
        Self {
            kind: ParseErrorKind::InvalidLength { n_bytes },
        }
    }

    /// Creates an `InvalidDigit` variant from the entire string and the position of invalid digit.
    const fn invalid_digit(src: &str, position: usize) -> Self {
        const fn is_char_boundary(utf8_bytes: &[u8], index: usize) -> bool {
            match index {
                0 => true,
                i if i < utf8_bytes.len() => (utf8_bytes[i] as i8) >= -64,
                _ => index == utf8_bytes.len(),
            }
        }

        let bs = src.as_bytes();
        assert!(is_char_boundary(bs, position));
        let mut utf8_char = [bs[position], 0, 0, 0];

        let mut i = 1;
        while !is_char_boundary(bs, position + i) {
            utf8_char[i] = bs[position + i];
            i += 1;
        }

        Self {
            kind: ParseErrorKind::InvalidDigit {
                utf8_char,
                position,
            },
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not parse string as SCRU64 ID: ")?;
        match self.kind {
            ParseErrorKind::InvalidLength { n_bytes } => {
                write!(f, "invalid length: {} bytes (expected 12)", n_bytes)
            }
            ParseErrorKind::InvalidDigit {
                utf8_char,
                position,
            } => {
                let chr = str::from_utf8(&utf8_char).unwrap().chars().next().unwrap();
                write!(f, "invalid digit '{}' at {}", chr.escape_debug(), position)
            }
        }
    }
}

impl error::Error for ParseError {}

/// An error converting an integer into a SCRU64 ID.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct RangeError {}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not convert integer to SCRU64 ID: out of valid integer range"
        )
    }
}

impl error::Error for RangeError {}

#[cfg(feature = "std")]
mod with_std {
    use super::{ParseError, Scru64Id};

    impl TryFrom<String> for Scru64Id {
        type Error = ParseError;

        fn try_from(value: String) -> Result<Self, Self::Error> {
            Self::try_from_str(&value)
        }
    }

    impl From<Scru64Id> for String {
        fn from(value: Scru64Id) -> Self {
            value.encode().into()
        }
    }
}

#[cfg(feature = "serde")]
mod with_serde {
    use super::{Scru64Id, fmt, str};
    use serde::{Deserializer, Serializer, de};

    impl serde::Serialize for Scru64Id {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_u64(self.to_u64())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Scru64Id {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_u64(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl de::Visitor<'_> for VisitorImpl {
        type Value = Scru64Id;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a SCRU64 ID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Self::Value::try_from_str(value).map_err(de::Error::custom)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Self::Value::try_from(value).map_err(de::Error::custom)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Self::Value::try_from(value).map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            match <[u8; 8]>::try_from(value) {
                Ok(array_value) => self.visit_u64(u64::from_be_bytes(array_value)),
                Err(err) => match str::from_utf8(value) {
                    Ok(str_value) => self.visit_str(str_value),
                    _ => Err(de::Error::custom(err)),
                },
            }
        }
    }

}

#[cfg(test)]
pub(crate) mod tests {
    use super::Scru64Id;

    /// Prepared cases of `(text, num, timestamp, node_ctr)`.
    pub(crate) const TEST_CASES: &[(&str, u64, u64, u32)] = &[
        ("000000000000", 0x0000000000000000, 0, 0),
        ("00000009zldr", 0x0000000000ffffff, 0, 16777215),
        ("zzzzzzzq0em8", 0x41c21cb8e0000000, 282429536480, 0),
        ("zzzzzzzzzzzz", 0x41c21cb8e0ffffff, 282429536480, 16777215),
        ("0u375nxqh5cq", 0x0186d52bbe2a635a, 6557084606, 2777946),
        ("0u375nxqh5cr", 0x0186d52bbe2a635b, 6557084606, 2777947),
        ("0u375nxqh5cs", 0x0186d52bbe2a635c, 6557084606, 2777948),
        ("0u375nxqh5ct", 0x0186d52bbe2a635d, 6557084606, 2777949),
        ("0u375ny0glr0", 0x0186d52bbf2a4a1c, 6557084607, 2771484),
        ("0u375ny0glr1", 0x0186d52bbf2a4a1d, 6557084607, 2771485),
        ("0u375ny0glr2", 0x0186d52bbf2a4a1e, 6557084607, 2771486),
        ("0u375ny0glr3", 0x0186d52bbf2a4a1f, 6557084607, 2771487),
        ("jdsf1we3ui4f", 0x2367c8dfb2e6d23f, 152065073074, 15127103),
        ("j0afcjyfyi98", 0x22b86eaad6b2f7ec, 149123148502, 11728876),
        ("ckzyfc271xsn", 0x16fc214296b29057, 98719318678, 11702359),
        ("t0vgc4c4b18n", 0x3504295badc14f07, 227703085997, 12668679),
        ("mwcrtcubk7bp", 0x29d3c7553e748515, 179646715198, 7636245),
        ("g9ye86pgplu7", 0x1dbb24363718aecf, 127693764151, 1617615),
        ("qmez19t9oeir", 0x30a122fef7cd6c83, 208861855479, 13462659),
        ("d81r595fq52m", 0x18278838f0660f2e, 103742454000, 6688558),
        ("v0rbps7ay8ks", 0x38a9e683bb4425ec, 243368625083, 4466156),
        ("z0jndjt42op2", 0x3ff596748ea77186, 274703217806, 10973574),
        ("f2bembkd4zrb", 0x1b844eb5d1aebb07, 118183867857, 11451143),
        ("mkg0fd5p76pp", 0x29391373ab449abd, 177051235243, 4496061),
    ];

    /// Encodes and decodes prepared cases correctly
    #[test]
    fn encodes_and_decodes_prepared_cases_correctly() {
        for e in TEST_CASES {
            let (text, num, timestamp, node_ctr) = *e;

            let from_num = Scru64Id::try_from(num).unwrap();
            let from_parts = Scru64Id::from_parts(timestamp, node_ctr);
            let from_string = text.parse::<Scru64Id>().unwrap();

            assert_eq!(from_num, from_parts);
            assert_eq!(from_num, from_string);
            assert_eq!(from_num.to_u64(), num);
            assert_eq!(u64::from(from_num), num);
            assert_eq!(i64::from(from_num), num as i64);
            assert_eq!(Scru64Id::try_from(num as i64).unwrap(), from_num);
            assert_eq!(
                (
                    from_num.timestamp(),
                    from_num.node_ctr(),
                    &from_num.encode() as &str,
                ),
                (timestamp, node_ctr, text),
            );
            #[cfg(feature = "std")]
            assert_eq!(from_num.to_string(), text);

            // parses the uppercase form as well
            let mut upper = [0u8; 12];
            upper.copy_from_slice(text.as_bytes());
            upper.make_ascii_uppercase();
            let upper = core::str::from_utf8(&upper).unwrap();
            assert_eq!(upper.parse::<Scru64Id>().unwrap(), from_num);
        }
    }

    /// Returns error if an integer out of the valid range is supplied
    #[test]
    fn returns_error_if_an_integer_out_of_the_valid_range_is_supplied() {
        assert!(Scru64Id::try_from(36u64.pow(12)).is_err());
        assert!(Scru64Id::try_from(u64::MAX).is_err());

        assert!(Scru64Id::try_from(-1i64).is_err());
        assert!(Scru64Id::try_from(i64::MIN).is_err());
    }

    /// Returns error if an invalid string representation is supplied
    #[test]
    fn returns_error_if_an_invalid_string_representation_is_supplied() {
        let cases = [
            "",
            " 0u3wrp5g81jx",
            "0u3wrp5g81jy ",
            " 0u3wrp5g81jz ",
            "+0u3wrp5g81k0",
            "-0u3wrp5g81k1",
            "+u3wrp5q7ta5",
            "-u3wrp5q7ta6",
            "0u3w_p5q7ta7",
            "0u3wrp5-7ta8",
            "0u3wrp5q7t 9",
        ];

        for e in cases {
            assert!(e.parse::<Scru64Id>().is_err());
        }
    }

    /// Has symmetric converters from/to various values
    #[test]
    fn has_symmetric_converters_from_to_various_values() {
        for e in TEST_CASES {
            let x = Scru64Id::try_from(e.1).unwrap();

            assert_eq!(Scru64Id::try_from_str(&x.encode()).unwrap(), x);
            assert_eq!(x.encode().parse::<Scru64Id>().unwrap(), x);
            #[cfg(feature = "std")]
            assert_eq!(x.to_string().parse::<Scru64Id>().unwrap(), x);
            #[cfg(feature = "std")]
            assert_eq!(Scru64Id::try_from(String::from(x)).unwrap(), x);
            assert_eq!(Scru64Id::try_from(x.to_u64()).unwrap(), x);
            assert_eq!(Scru64Id::try_from(u64::from(x)).unwrap(), x);
            assert_eq!(Scru64Id::try_from(i64::from(x)).unwrap(), x);
            assert_eq!(Scru64Id::from_parts(x.timestamp(), x.node_ctr()), x);
        }
    }

    /// Supports comparison operators
    #[test]
    fn supports_comparison_operators() {
        #[cfg(feature = "std")]
        let hash = {
            use std::hash::BuildHasher as _;
            let s = std::collections::hash_map::RandomState::new();
            move |value: &Scru64Id| s.hash_one(value)
        };

        let mut ordered: [_; 24] = TEST_CASES.try_into().unwrap();
        ordered.sort_unstable_by_key(|e| e.1);

        let mut prev = Scru64Id::try_from(ordered[0].1).unwrap();
        for e in &ordered[1..] {
            let curr = Scru64Id::try_from(e.1).unwrap();

            assert_ne!(curr, prev);
            assert_ne!(prev, curr);
            #[cfg(feature = "std")]
            assert_ne!(hash(&curr), hash(&prev));
            assert!(curr > prev);
            assert!(curr >= prev);
            assert!(prev < curr);
            assert!(prev <= curr);

            let clone = curr.clone();
            assert_eq!(curr, clone);
            assert_eq!(clone, curr);
            #[cfg(feature = "std")]
            assert_eq!(hash(&curr), hash(&clone));
            assert!(curr >= clone);
            assert!(clone >= curr);
            assert!(curr <= clone);
            assert!(clone <= curr);

            prev = curr;
        }
    }

    /// Orders textual representations the same way as integer representations
    #[test]
    fn orders_textual_representations_the_same_way_as_integer_representations() {
        let mut ordered: [_; 24] = TEST_CASES.try_into().unwrap();
        ordered.sort_unstable_by_key(|e| e.1);

        for pair in ordered.windows(2) {
            assert!(pair[0].1 < pair[1].1);
            assert!(pair[0].0 < pair[1].0);
        }
    }
}
