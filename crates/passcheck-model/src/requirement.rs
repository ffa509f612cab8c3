use serde::Serialize;

/// One data row of the requirements table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequirementRow {
    /// Line in the source file, the header being line 1.
    pub line: usize,
    /// Column name to trimmed cell value, in header order.
    pub fields: Vec<(String, String)>,
}

impl RequirementRow {
    pub fn new(line: usize, fields: Vec<(String, String)>) -> Self {
        Self { line, fields }
    }

    /// Raw cell value, `None` when the column does not exist.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Cell value when the column exists and the cell is not empty.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|value| !value.is_empty())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequirementTable {
    pub headers: Vec<String>,
    pub rows: Vec<RequirementRow>,
}

impl RequirementTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|header| header == column)
    }
}
