// ============================================================
// RAW RECORD
// ============================================================
// One input line split into fields, before any interpretation

/// Ordered string fields as read from one logical CSV line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRecord {
    pub fields: Vec<String>,
}

impl RawRecord {
    /// Create a record from already split fields
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// The record a blank input line produces: one empty field
    pub fn blank() -> Self {
        Self {
            fields: vec![String::new()],
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Exactly one field and that field is empty
    pub fn is_blank(&self) -> bool {
        self.fields.len() == 1 && self.fields[0].is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

impl From<Vec<&str>> for RawRecord {
    fn from(fields: Vec<&str>) -> Self {
        Self::new(fields.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_detection() {
        assert!(RawRecord::blank().is_blank());
        assert!(!RawRecord::from(vec![" "]).is_blank());
        assert!(!RawRecord::from(vec!["", ""]).is_blank());
        assert!(!RawRecord::default().is_blank());
    }
}
