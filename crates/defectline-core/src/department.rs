use std::fmt;

use serde::{Deserialize, Serialize};

/// Production-line stage a defect was found in.
///
/// The wire value is the lowercase variant name. Stored reports carry the
/// department as a raw string so that values outside this set still
/// round-trip; see [`department_label`] for display fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Cutting,
    Machining,
    Assembly,
    Painting,
    Embossing,
}

impl Department {
    pub const ALL: &[Department] = &[
        Department::Cutting,
        Department::Machining,
        Department::Assembly,
        Department::Painting,
        Department::Embossing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Cutting => "cutting",
            Department::Machining => "machining",
            Department::Assembly => "assembly",
            Department::Painting => "painting",
            Department::Embossing => "embossing",
        }
    }

    /// Label shown in forms and tables. Carries the plant's floor names.
    pub fn display_name(&self) -> &'static str {
        match self {
            Department::Cutting => "Prikrojevalnica (Cutting)",
            Department::Machining => "Strojna (Machining)",
            Department::Assembly => "Montažni (Assembly)",
            Department::Painting => "Lakirnica (Painting)",
            Department::Embossing => "Emblirnica (Embossing)",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "cutting" => Some(Department::Cutting),
            "machining" => Some(Department::Machining),
            "assembly" => Some(Department::Assembly),
            "painting" => Some(Department::Painting),
            "embossing" => Some(Department::Embossing),
            _ => None,
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Display label for a raw department value. Unknown values are shown
/// as-is rather than erroring.
pub fn department_label(raw: &str) -> &str {
    match Department::from_str(raw) {
        Some(dept) => dept.display_name(),
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_roundtrip() {
        for &dept in Department::ALL {
            assert_eq!(Department::from_str(dept.as_str()), Some(dept));
        }
    }

    #[test]
    fn serde_uses_wire_value() {
        let json = serde_json::to_string(&Department::Cutting).unwrap();
        assert_eq!(json, "\"cutting\"");
        let back: Department = serde_json::from_str("\"embossing\"").unwrap();
        assert_eq!(back, Department::Embossing);
    }

    #[test]
    fn label_falls_back_to_raw_value() {
        assert_eq!(department_label("painting"), "Lakirnica (Painting)");
        assert_eq!(department_label("warehouse"), "warehouse");
        assert_eq!(department_label(""), "");
    }

    #[test]
    fn from_str_is_case_sensitive() {
        assert_eq!(Department::from_str("Cutting"), None);
        assert_eq!(Department::from_str("CUTTING"), None);
    }
}
