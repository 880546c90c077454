use super::connection::{Column, ConnectionRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: Column,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: Column::Protocol,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortState {
    pub fn new(column: Column, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Same column flips the direction, a new column starts ascending.
    pub fn clicked(self, column: Column) -> Self {
        if self.column == column {
            Self {
                column,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                column,
                direction: SortDirection::Ascending,
            }
        }
    }
}

/// Orders records by the string form of one column. Stable in both
/// directions: equal keys keep their input order.
pub fn sort(records: &mut [ConnectionRecord], state: SortState) {
    records.sort_by(|a, b| {
        let ordering = a.field(state.column).cmp(&b.field(state.column));
        match state.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}
