//! Typed cell values.
//!
//! A [`Cell`] is a closed set of five variants. Conversion from Rust values
//! goes through [`IntoCell`], which applies the numeric edge-case policy:
//! NaN becomes `Null`, infinities become the -144/144 sentinels.

use std::time::Duration;

use crate::numbers::{self, duration_to_string};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    String(String),
    Float(f64),
    Integer(i32),
    Long(i64),
    Null,
}

/// Column type recorded for a table, also used to hint the type of a null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    String,
    Float,
    Integer,
    Long,
}

impl CellType {
    /// SQL column type used by the database serializer.
    pub fn sql_type(self) -> &'static str {
        match self {
            CellType::String => "TEXT",
            CellType::Float => "REAL",
            CellType::Integer | CellType::Long => "INTEGER",
        }
    }

    /// Lower-case name written in XML `type` attributes.
    pub fn name(self) -> &'static str {
        match self {
            CellType::String => "string",
            CellType::Float => "float",
            CellType::Integer => "integer",
            CellType::Long => "long",
        }
    }
}

/// A cell plus the type it stands for. Nulls keep the type of the value
/// that was missing.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedCell {
    pub value: Cell,
    pub kind: CellType,
}

impl TypedCell {
    pub fn null(kind: CellType) -> Self {
        Self {
            value: Cell::Null,
            kind,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, Cell::Null)
    }
}

/// Conversion into a typed cell.
pub trait IntoCell {
    /// Type recorded when the value is absent.
    const NULL_KIND: CellType;

    fn into_cell(self) -> TypedCell;
}

impl IntoCell for TypedCell {
    const NULL_KIND: CellType = CellType::String;

    fn into_cell(self) -> TypedCell {
        self
    }
}

impl IntoCell for f64 {
    const NULL_KIND: CellType = CellType::Float;

    fn into_cell(self) -> TypedCell {
        if self.is_nan() {
            return TypedCell::null(CellType::Float);
        }
        TypedCell {
            value: Cell::Float(numbers::clamp_infinity(self)),
            kind: CellType::Float,
        }
    }
}

impl IntoCell for f32 {
    const NULL_KIND: CellType = CellType::Float;

    fn into_cell(self) -> TypedCell {
        f64::from(self).into_cell()
    }
}

impl IntoCell for i32 {
    const NULL_KIND: CellType = CellType::Integer;

    fn into_cell(self) -> TypedCell {
        TypedCell {
            value: Cell::Integer(self),
            kind: CellType::Integer,
        }
    }
}

impl IntoCell for u32 {
    const NULL_KIND: CellType = CellType::Long;

    fn into_cell(self) -> TypedCell {
        i64::from(self).into_cell()
    }
}

impl IntoCell for i64 {
    const NULL_KIND: CellType = CellType::Long;

    fn into_cell(self) -> TypedCell {
        TypedCell {
            value: Cell::Long(self),
            kind: CellType::Long,
        }
    }
}

impl IntoCell for u64 {
    const NULL_KIND: CellType = CellType::Long;

    fn into_cell(self) -> TypedCell {
        i64::try_from(self).unwrap_or(i64::MAX).into_cell()
    }
}

impl IntoCell for usize {
    const NULL_KIND: CellType = CellType::Long;

    fn into_cell(self) -> TypedCell {
        i64::try_from(self).unwrap_or(i64::MAX).into_cell()
    }
}

impl IntoCell for bool {
    const NULL_KIND: CellType = CellType::Integer;

    fn into_cell(self) -> TypedCell {
        i32::from(self).into_cell()
    }
}

impl IntoCell for String {
    const NULL_KIND: CellType = CellType::String;

    fn into_cell(self) -> TypedCell {
        TypedCell {
            value: Cell::String(self),
            kind: CellType::String,
        }
    }
}

impl IntoCell for &str {
    const NULL_KIND: CellType = CellType::String;

    fn into_cell(self) -> TypedCell {
        self.to_string().into_cell()
    }
}

impl IntoCell for &String {
    const NULL_KIND: CellType = CellType::String;

    fn into_cell(self) -> TypedCell {
        self.clone().into_cell()
    }
}

impl IntoCell for Duration {
    const NULL_KIND: CellType = CellType::String;

    fn into_cell(self) -> TypedCell {
        duration_to_string(self).into_cell()
    }
}

impl<T: IntoCell> IntoCell for Option<T> {
    const NULL_KIND: CellType = T::NULL_KIND;

    fn into_cell(self) -> TypedCell {
        match self {
            Some(value) => value.into_cell(),
            None => TypedCell::null(T::NULL_KIND),
        }
    }
}

/// Builds a `Vec<TypedCell>` from heterogeneous values.
#[macro_export]
macro_rules! cells {
    ($($value:expr),* $(,)?) => {
        vec![$($crate::table::IntoCell::into_cell($value)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_becomes_typed_null() {
        let cell = f64::NAN.into_cell();
        assert_eq!(cell, TypedCell::null(CellType::Float));
    }

    #[test]
    fn infinities_become_sentinels() {
        assert_eq!(f64::NEG_INFINITY.into_cell().value, Cell::Float(-144.0));
        assert_eq!(f32::INFINITY.into_cell().value, Cell::Float(144.0));
    }

    #[test]
    fn narrow_variants_are_kept() {
        assert_eq!(3_i32.into_cell().kind, CellType::Integer);
        assert_eq!(3_i64.into_cell().kind, CellType::Long);
        assert_eq!(true.into_cell().value, Cell::Integer(1));
        assert_eq!(
            Duration::from_secs(61).into_cell().value,
            Cell::String("00:01:01".into())
        );
    }

    #[test]
    fn absent_values_keep_their_type() {
        assert_eq!(None::<String>.into_cell(), TypedCell::null(CellType::String));
        assert_eq!(None::<i64>.into_cell(), TypedCell::null(CellType::Long));
        assert_eq!(Some(2.5_f64).into_cell().value, Cell::Float(2.5));
    }

    #[test]
    fn cells_macro_mixes_types() {
        let row = cells!["x", 3.5, 7_i32, None::<f64>];
        assert_eq!(row.len(), 4);
        assert_eq!(row[0].kind, CellType::String);
        assert!(row[3].is_null());
    }
}
