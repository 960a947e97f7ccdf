//! Translation options.

use crate::{Error, Result};

/// Default bit width of a lookup table element.
pub const DEFAULT_MAX_TABLE_ELEM_WIDTH: u32 = 4;

/// Default minimum number of branches worth a lookup table.
pub const DEFAULT_MIN_TABLE_SIZE: usize = 32;

/// Knobs of the table-lookup optimization.
///
/// Field names follow the camelCase spelling used by parser descriptions, so
/// the options can be read straight from JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrontendOptions {
    /// Table entries index distinct targets, so a table may reference fewer
    /// than `2^max_table_elem_width` of them.
    pub max_table_elem_width: u32,
    /// Branch nodes with fewer children stay `Single`.
    pub min_table_size: usize,
}

impl Default for FrontendOptions {
    fn default() -> Self {
        Self {
            max_table_elem_width: DEFAULT_MAX_TABLE_ELEM_WIDTH,
            min_table_size: DEFAULT_MIN_TABLE_SIZE,
        }
    }
}

impl FrontendOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_table_elem_width == 0 {
            return Err(Error::InvalidMaxTableElemWidth(self.max_table_elem_width));
        }
        Ok(())
    }

    /// Whether `targets` distinct targets fit in one table element.
    pub fn fits_table(&self, targets: usize) -> bool {
        1usize
            .checked_shl(self.max_table_elem_width)
            .is_none_or(|limit| targets < limit)
    }
}
