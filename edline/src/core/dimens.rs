// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Terminal cell geometry newtypes.
//!
//! Index types are 0-based positions in a grid of character cells; width/height
//! types are 1-based extents. Keeping them distinct makes the renderer math
//! (`position = index`, `extent = count`) impossible to mix up silently.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// The horizontal index in a grid of character cells, starting at 0, which is
/// the first column. Use [`col()`] to create a new instance.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ColIndex(pub u16);

/// The number of character cells something occupies horizontally. Use
/// [`width()`] to create a new instance.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ColWidth(pub u16);

/// The vertical index in a grid of character cells, starting at 0, which is
/// the first row. Use [`row()`] to create a new instance.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RowIndex(pub u16);

/// The number of rows something occupies vertically. Use [`height()`] to
/// create a new instance.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RowHeight(pub u16);

/// Terminal dimensions: `col_width` (columns) and `row_height` (rows).
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Size {
    pub col_width: ColWidth,
    pub row_height: RowHeight,
}

/// Creates a new [`ColIndex`] from any type that can be converted into it.
pub fn col(arg_col_index: impl Into<ColIndex>) -> ColIndex { arg_col_index.into() }

/// Creates a new [`ColWidth`] from any type that can be converted into it.
pub fn width(arg_col_width: impl Into<ColWidth>) -> ColWidth { arg_col_width.into() }

/// Creates a new [`RowIndex`] from any type that can be converted into it.
pub fn row(arg_row_index: impl Into<RowIndex>) -> RowIndex { arg_row_index.into() }

/// Creates a new [`RowHeight`] from any type that can be converted into it.
pub fn height(arg_row_height: impl Into<RowHeight>) -> RowHeight { arg_row_height.into() }

macro_rules! impl_unit {
    ($name:ident) => {
        impl $name {
            pub fn new(arg: impl Into<$name>) -> Self { arg.into() }

            #[must_use]
            pub fn as_u16(&self) -> u16 { self.0 }

            #[must_use]
            pub fn as_usize(&self) -> usize { usize::from(self.0) }

            #[must_use]
            pub fn is_zero(&self) -> bool { self.0 == 0 }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<u16> for $name {
            fn from(val: u16) -> Self { $name(val) }
        }

        impl From<usize> for $name {
            fn from(val: usize) -> Self { $name(u16::try_from(val).unwrap_or(u16::MAX)) }
        }

        impl From<$name> for u16 {
            fn from(val: $name) -> u16 { val.0 }
        }

        impl From<$name> for usize {
            fn from(val: $name) -> usize { val.as_usize() }
        }

        impl Add for $name {
            type Output = $name;
            fn add(self, rhs: $name) -> $name { $name(self.0.saturating_add(rhs.0)) }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: $name) { *self = *self + rhs; }
        }

        impl Sub for $name {
            type Output = $name;
            fn sub(self, rhs: $name) -> $name { $name(self.0.saturating_sub(rhs.0)) }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: $name) { *self = *self - rhs; }
        }
    };
}

impl_unit!(ColIndex);
impl_unit!(ColWidth);
impl_unit!(RowIndex);
impl_unit!(RowHeight);

impl Size {
    #[must_use]
    pub fn new(arg_cols: impl Into<ColWidth>, arg_rows: impl Into<RowHeight>) -> Self {
        Self {
            col_width: arg_cols.into(),
            row_height: arg_rows.into(),
        }
    }
}

impl From<(u16, u16)> for Size {
    /// `(cols, rows)` ordering, matching `tcgetwinsize` / `COLUMNS`+`LINES`.
    fn from((cols, rows): (u16, u16)) -> Self { Size::new(cols, rows) }
}

impl ColIndex {
    /// Add a width to a position, yielding the position that many cells to the
    /// right.
    #[must_use]
    pub fn add_width(&self, arg_width: ColWidth) -> ColIndex {
        col(self.0.saturating_add(arg_width.0))
    }
}

impl ColWidth {
    /// Convert an extent into the index of the cell just past it.
    #[must_use]
    pub fn convert_to_index(&self) -> ColIndex { col(self.0) }
}
