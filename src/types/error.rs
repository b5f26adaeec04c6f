use std::path::PathBuf;

use thiserror::Error;

/// Problems found while validating a parsed scenario.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("duplicate scenario name '{name}'")]
    DuplicateScenario { name: String },

    #[error("scenario '{scenario}' has no Then steps; at least one is required")]
    NoThen { scenario: String },

    #[error("unknown file precondition '{field}' in scenario '{scenario}'")]
    UnknownFileField { scenario: String, field: String },

    #[error("unknown relationship keyword '{keyword}' in scenario '{scenario}'")]
    UnknownRelationshipKeyword { scenario: String, keyword: String },

    #[error("step '{step}' in scenario '{scenario}' requires a positive count")]
    ZeroCount { scenario: String, step: String },
}

/// Malformed rule definitions detected while a scenario runs. These abort the
/// scenario; they are never reported as violations.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("edge extraction is not implemented for {type_name}")]
    UnsupportedGeometry { type_name: String },

    #[error("unknown relationship keyword '{keyword}'")]
    UnknownKeyword { keyword: String },

    #[error("unknown file precondition '{field}'")]
    UnknownFileField { field: String },

    #[error("relationship type '{relationship}' is not listed in the relationship tables")]
    UnknownRelationshipType { relationship: String },

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Failures loading lookup tables.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read table {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table {} at line {line}: {message}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("table {} has no header row", path.display())]
    Empty { path: PathBuf },

    #[error("table {} must have {expected} columns, found {found}", path.display())]
    ColumnCount {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_scenario_message() {
        let err = CompileError::DuplicateScenario {
            name: "ALB001".into(),
        };
        assert_eq!(err.to_string(), "duplicate scenario name 'ALB001'");
    }

    #[test]
    fn no_then_message() {
        let err = CompileError::NoThen {
            scenario: "walls".into(),
        };
        assert_eq!(
            err.to_string(),
            "scenario 'walls' has no Then steps; at least one is required"
        );
    }

    #[test]
    fn unknown_file_field_message() {
        let err = CompileError::UnknownFileField {
            scenario: "s".into(),
            field: "Author".into(),
        };
        assert_eq!(err.to_string(), "unknown file precondition 'Author' in scenario 's'");
    }

    #[test]
    fn unsupported_geometry_message() {
        let err = EvalError::UnsupportedGeometry {
            type_name: "IfcAdvancedBrep".into(),
        };
        assert_eq!(
            err.to_string(),
            "edge extraction is not implemented for IfcAdvancedBrep"
        );
    }

    #[test]
    fn table_error_messages() {
        let err = TableError::ColumnCount {
            path: PathBuf::from("resources/agg.csv"),
            expected: 2,
            found: 3,
        };
        assert_eq!(
            err.to_string(),
            "table resources/agg.csv must have 2 columns, found 3"
        );
        let wrapped = EvalError::from(TableError::Empty {
            path: PathBuf::from("x.csv"),
        });
        assert_eq!(wrapped.to_string(), "table x.csv has no header row");
    }
}
