//! Numeric status codes carried by [`crate::TfsError`].
//!
//! Codes are grouped by the layer that raises them: general failures below
//! 1000, tree and attribute failures in 3xxx, hook failures in 4xxx and
//! shell front-end failures in 10xxx.

#[allow(non_camel_case_types)]
pub type status_code_t = u16;

pub mod StatusCode {
    use super::status_code_t;

    pub const NOT_IMPLEMENTED: status_code_t = 1;
    pub const DATA_CORRUPTION: status_code_t = 2;
    pub const INVALID_ARG: status_code_t = 3;
    pub const INVALID_CONFIG: status_code_t = 4;
    pub const IO_ERROR: status_code_t = 69;
}

pub mod TreeCode {
    use super::status_code_t;

    pub const NOT_FOUND: status_code_t = 3000;
    pub const EXISTS: status_code_t = 3007;
    pub const DUPLICATE_NAME: status_code_t = 3008;
    pub const ATTR_NOT_FOUND: status_code_t = 3020;
    pub const ATTR_EXISTS: status_code_t = 3021;
    pub const CURSOR_OVERFLOW: status_code_t = 3030;
    pub const INVALID_OPERATION: status_code_t = 3031;
}

pub mod HookCode {
    use super::status_code_t;

    pub const NOT_BOUND: status_code_t = 4000;
    pub const EXEC_FAILED: status_code_t = 4001;
}

pub mod CliCode {
    use super::status_code_t;

    pub const NO_SUCH_COMMAND: status_code_t = 10000;
}

const NAMES: &[(status_code_t, &str)] = &[
    (StatusCode::NOT_IMPLEMENTED, "NotImplemented"),
    (StatusCode::DATA_CORRUPTION, "DataCorruption"),
    (StatusCode::INVALID_ARG, "InvalidArg"),
    (StatusCode::INVALID_CONFIG, "InvalidConfig"),
    (StatusCode::IO_ERROR, "IOError"),
    (TreeCode::NOT_FOUND, "Tree::NotFound"),
    (TreeCode::EXISTS, "Tree::Exists"),
    (TreeCode::DUPLICATE_NAME, "Tree::DuplicateName"),
    (TreeCode::ATTR_NOT_FOUND, "Tree::AttrNotFound"),
    (TreeCode::ATTR_EXISTS, "Tree::AttrExists"),
    (TreeCode::CURSOR_OVERFLOW, "Tree::CursorOverflow"),
    (TreeCode::INVALID_OPERATION, "Tree::InvalidOperation"),
    (HookCode::NOT_BOUND, "Hook::NotBound"),
    (HookCode::EXEC_FAILED, "Hook::ExecFailed"),
    (CliCode::NO_SUCH_COMMAND, "Cli::NoSuchCommand"),
];

/// Layer a code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCodeType {
    General,
    Tree,
    Hook,
    Cli,
    Invalid,
}

impl StatusCodeType {
    pub fn of(code: status_code_t) -> Self {
        match code / 1000 {
            0 => StatusCodeType::General,
            3 => StatusCodeType::Tree,
            4 => StatusCodeType::Hook,
            10 => StatusCodeType::Cli,
            _ => StatusCodeType::Invalid,
        }
    }
}

/// Registered name of `code`, e.g. `Tree::NotFound`.
pub fn name(code: status_code_t) -> Option<&'static str> {
    NAMES.iter().find(|(c, _)| *c == code).map(|(_, n)| *n)
}
