use hashbrown::HashMap;

use crate::types::RowIndex;

/// Maps a confirmed `(year, row_index)` coordinate to its position in the
/// confirmed partition.
pub type CoordIndex = HashMap<(String, RowIndex), usize>;
