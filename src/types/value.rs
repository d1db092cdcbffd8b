//! Column type tags, scalar values and sort order.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Column types every kernel dispatches on.
///
/// This is a closed set; Arrow types outside it are rejected with
/// [`KernelError::NotImplemented`](crate::KernelError::NotImplemented).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnType {
    /// Boolean.
    Bool,
    /// 8-bit signed integer.
    Int8,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 8-bit unsigned integer.
    UInt8,
    /// 16-bit unsigned integer.
    UInt16,
    /// 32-bit unsigned integer.
    UInt32,
    /// 64-bit unsigned integer.
    UInt64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
}

impl ColumnType {
    /// Returns the display name of the type.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Bool => "BOOL",
            ColumnType::Int8 => "INT8",
            ColumnType::Int16 => "INT16",
            ColumnType::Int32 => "INT32",
            ColumnType::Int64 => "INT64",
            ColumnType::UInt8 => "UINT8",
            ColumnType::UInt16 => "UINT16",
            ColumnType::UInt32 => "UINT32",
            ColumnType::UInt64 => "UINT64",
            ColumnType::Float32 => "FLOAT32",
            ColumnType::Float64 => "FLOAT64",
            ColumnType::String => "STRING",
        }
    }

    /// Returns whether this type is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !matches!(self, ColumnType::Bool | ColumnType::String)
    }

    /// Returns whether this type is a signed or unsigned integer.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.is_numeric() && !self.is_float()
    }

    /// Returns whether this type is a floating point type.
    #[must_use]
    pub fn is_float(&self) -> bool {
        matches!(self, ColumnType::Float32 | ColumnType::Float64)
    }

    /// Converts to an Arrow data type.
    #[must_use]
    pub fn to_arrow(&self) -> arrow::datatypes::DataType {
        use arrow::datatypes::DataType as A;
        match self {
            ColumnType::Bool => A::Boolean,
            ColumnType::Int8 => A::Int8,
            ColumnType::Int16 => A::Int16,
            ColumnType::Int32 => A::Int32,
            ColumnType::Int64 => A::Int64,
            ColumnType::UInt8 => A::UInt8,
            ColumnType::UInt16 => A::UInt16,
            ColumnType::UInt32 => A::UInt32,
            ColumnType::UInt64 => A::UInt64,
            ColumnType::Float32 => A::Float32,
            ColumnType::Float64 => A::Float64,
            ColumnType::String => A::Utf8,
        }
    }

    /// Converts from an Arrow data type.
    ///
    /// Returns None for Arrow types the kernels do not support.
    #[must_use]
    pub fn from_arrow(arrow_type: &arrow::datatypes::DataType) -> Option<Self> {
        use arrow::datatypes::DataType as A;
        match arrow_type {
            A::Boolean => Some(ColumnType::Bool),
            A::Int8 => Some(ColumnType::Int8),
            A::Int16 => Some(ColumnType::Int16),
            A::Int32 => Some(ColumnType::Int32),
            A::Int64 => Some(ColumnType::Int64),
            A::UInt8 => Some(ColumnType::UInt8),
            A::UInt16 => Some(ColumnType::UInt16),
            A::UInt32 => Some(ColumnType::UInt32),
            A::UInt64 => Some(ColumnType::UInt64),
            A::Float32 => Some(ColumnType::Float32),
            A::Float64 => Some(ColumnType::Float64),
            A::Utf8 => Some(ColumnType::String),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordering applied to non-null values. Nulls always sort first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    /// Smallest value first.
    #[default]
    Ascending,
    /// Largest value first.
    Descending,
}

impl SortOrder {
    /// Applies this order to the natural ordering of two non-null values.
    #[must_use]
    pub fn apply(self, natural: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => natural,
            SortOrder::Descending => natural.reverse(),
        }
    }
}

/// A single typed value produced by a kernel, or used as a group key part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Scalar {
    /// Absent value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 8-bit signed integer value.
    Int8(i8),
    /// 16-bit signed integer value.
    Int16(i16),
    /// 32-bit signed integer value.
    Int32(i32),
    /// 64-bit signed integer value.
    Int64(i64),
    /// 8-bit unsigned integer value.
    UInt8(u8),
    /// 16-bit unsigned integer value.
    UInt16(u16),
    /// 32-bit unsigned integer value.
    UInt32(u32),
    /// 64-bit unsigned integer value.
    UInt64(u64),
    /// 32-bit floating point value.
    Float32(f32),
    /// 64-bit floating point value.
    Float64(f64),
    /// String value.
    String(String),
}

impl Scalar {
    /// Returns the column type of the value, or None for [`Scalar::Null`].
    #[must_use]
    pub fn column_type(&self) -> Option<ColumnType> {
        Some(match self {
            Scalar::Null => return None,
            Scalar::Bool(_) => ColumnType::Bool,
            Scalar::Int8(_) => ColumnType::Int8,
            Scalar::Int16(_) => ColumnType::Int16,
            Scalar::Int32(_) => ColumnType::Int32,
            Scalar::Int64(_) => ColumnType::Int64,
            Scalar::UInt8(_) => ColumnType::UInt8,
            Scalar::UInt16(_) => ColumnType::UInt16,
            Scalar::UInt32(_) => ColumnType::UInt32,
            Scalar::UInt64(_) => ColumnType::UInt64,
            Scalar::Float32(_) => ColumnType::Float32,
            Scalar::Float64(_) => ColumnType::Float64,
            Scalar::String(_) => ColumnType::String,
        })
    }

    /// Returns true if this is [`Scalar::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Coerces the value to f64.
    ///
    /// Booleans map to 0/1 and strings are parsed. Returns None for null and
    /// for strings that are not numbers.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Scalar::Int8(v) => Some(f64::from(*v)),
            Scalar::Int16(v) => Some(f64::from(*v)),
            Scalar::Int32(v) => Some(f64::from(*v)),
            Scalar::Int64(v) => Some(*v as f64),
            Scalar::UInt8(v) => Some(f64::from(*v)),
            Scalar::UInt16(v) => Some(f64::from(*v)),
            Scalar::UInt32(v) => Some(f64::from(*v)),
            Scalar::UInt64(v) => Some(*v as f64),
            Scalar::Float32(v) => Some(f64::from(*v)),
            Scalar::Float64(v) => Some(*v),
            Scalar::String(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Attempts to extract an i64 value.
    #[must_use]
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Scalar::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to extract a u64 value.
    #[must_use]
    pub fn as_uint64(&self) -> Option<u64> {
        match self {
            Scalar::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to extract an f64 value.
    #[must_use]
    pub fn as_float64(&self) -> Option<f64> {
        match self {
            Scalar::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to extract a bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract a string slice.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Total ordering used for group keys.
    ///
    /// Null sorts before every value. Values of the same type use their
    /// natural order (floats under IEEE total order). Values of different
    /// types order by their [`ColumnType`].
    #[must_use]
    pub fn total_cmp(&self, other: &Scalar) -> Ordering {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => Ordering::Equal,
            (Scalar::Null, _) => Ordering::Less,
            (_, Scalar::Null) => Ordering::Greater,
            (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
            (Scalar::Int8(a), Scalar::Int8(b)) => a.cmp(b),
            (Scalar::Int16(a), Scalar::Int16(b)) => a.cmp(b),
            (Scalar::Int32(a), Scalar::Int32(b)) => a.cmp(b),
            (Scalar::Int64(a), Scalar::Int64(b)) => a.cmp(b),
            (Scalar::UInt8(a), Scalar::UInt8(b)) => a.cmp(b),
            (Scalar::UInt16(a), Scalar::UInt16(b)) => a.cmp(b),
            (Scalar::UInt32(a), Scalar::UInt32(b)) => a.cmp(b),
            (Scalar::UInt64(a), Scalar::UInt64(b)) => a.cmp(b),
            (Scalar::Float32(a), Scalar::Float32(b)) => a.total_cmp(b),
            (Scalar::Float64(a), Scalar::Float64(b)) => a.total_cmp(b),
            (Scalar::String(a), Scalar::String(b)) => a.cmp(b),
            _ => self.column_type().cmp(&other.column_type()),
        }
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

// Floats hash by bit pattern, which agrees with `total_cmp` equality.
impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Scalar::Null => {}
            Scalar::Bool(v) => v.hash(state),
            Scalar::Int8(v) => v.hash(state),
            Scalar::Int16(v) => v.hash(state),
            Scalar::Int32(v) => v.hash(state),
            Scalar::Int64(v) => v.hash(state),
            Scalar::UInt8(v) => v.hash(state),
            Scalar::UInt16(v) => v.hash(state),
            Scalar::UInt32(v) => v.hash(state),
            Scalar::UInt64(v) => v.hash(state),
            Scalar::Float32(v) => v.to_bits().hash(state),
            Scalar::Float64(v) => v.to_bits().hash(state),
            Scalar::String(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("NULL"),
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Int8(v) => write!(f, "{v}"),
            Scalar::Int16(v) => write!(f, "{v}"),
            Scalar::Int32(v) => write!(f, "{v}"),
            Scalar::Int64(v) => write!(f, "{v}"),
            Scalar::UInt8(v) => write!(f, "{v}"),
            Scalar::UInt16(v) => write!(f, "{v}"),
            Scalar::UInt32(v) => write!(f, "{v}"),
            Scalar::UInt64(v) => write!(f, "{v}"),
            Scalar::Float32(v) => write!(f, "{v}"),
            Scalar::Float64(v) => write!(f, "{v}"),
            Scalar::String(v) => f.write_str(v),
        }
    }
}
