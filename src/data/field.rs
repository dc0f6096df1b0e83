//! Field model: which columns are plotted, under which names, on which axis.

use std::collections::{BTreeSet, HashMap};

use crate::data::format::FieldFormat;

/// Y axis a field is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Primary,
    Secondary,
}

/// One plotted column.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub axis: Axis,
    pub format: FieldFormat,
}

/// Column layout pinned by configuration. Anything left `None` is inferred
/// from the first data line of a session.
#[derive(Debug, Clone, Default)]
pub struct FieldLayout {
    /// Explicit field names, in selection order.
    pub names: Option<Vec<String>>,
    /// 1-based source columns to plot.
    pub selection: Option<Vec<usize>>,
    /// 1-based source columns routed to the secondary axis.
    pub y2: BTreeSet<usize>,
    /// 1-based column holding the X value. `None` means X is the point index.
    pub x: Option<usize>,
    /// Per-column input formats (1-based column index).
    pub formats: HashMap<usize, FieldFormat>,
}

impl FieldLayout {
    /// Whether names and selection are both fixed by configuration, i.e. nothing
    /// about the field set depends on the data.
    pub fn is_pinned(&self) -> bool {
        self.names.is_some() && self.selection.is_some()
    }

    pub fn has_y2(&self) -> bool {
        !self.y2.is_empty()
    }

    /// Input format of a source column.
    pub fn format_of(&self, column: usize) -> FieldFormat {
        self.formats.get(&column).cloned().unwrap_or_default()
    }

    /// Default selection for a line with `columns` columns: every column, minus
    /// the X column when one is configured, truncated to the number of explicit
    /// names if there are any.
    pub fn default_selection(&self, columns: usize) -> Vec<usize> {
        let mut selection: Vec<usize> = (1..=columns).filter(|&c| Some(c) != self.x).collect();
        if let Some(names) = &self.names {
            selection.truncate(names.len());
        }
        selection
    }

    fn decorate(&self, name: String, axis: Axis) -> String {
        if !self.has_y2() {
            return name;
        }
        match axis {
            Axis::Primary => format!("{name} (Y1)"),
            Axis::Secondary => format!("{name} (Y2)"),
        }
    }
}

/// The established fields of a session and the columns they come from.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSet {
    pub fields: Vec<Field>,
    /// 1-based source column of each field.
    pub selection: Vec<usize>,
    /// Fewest columns a data line must have.
    pub min_columns: usize,
}

impl FieldSet {
    /// Build the field set from the layout and the cells of the first line.
    /// `header` supplies the names when the first line is a header line.
    pub fn establish(layout: &FieldLayout, cells: &[&str], header: bool) -> Self {
        let selection = layout
            .selection
            .clone()
            .unwrap_or_else(|| layout.default_selection(cells.len()));

        let fields = selection
            .iter()
            .enumerate()
            .map(|(i, &column)| {
                let axis = if layout.y2.contains(&column) {
                    Axis::Secondary
                } else {
                    Axis::Primary
                };
                let base = match &layout.names {
                    Some(names) => names.get(i).cloned(),
                    None if header => cells.get(column - 1).map(|s| s.to_string()),
                    None => None,
                }
                .unwrap_or_else(|| format!("Column {}", i + 1));
                Field {
                    name: layout.decorate(base, axis),
                    axis,
                    format: layout.format_of(column),
                }
            })
            .collect();

        let min_columns = selection
            .iter()
            .copied()
            .chain(layout.x)
            .max()
            .unwrap_or(0);

        Self {
            fields,
            selection,
            min_columns,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
