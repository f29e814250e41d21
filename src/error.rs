use std::{collections::BTreeMap, fmt, io, sync::Arc};

pub type Result<T> = std::result::Result<T, SkelError>;

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkelErrorKind {
    #[error("unexpected {record} type (expected {expected}, actual {actual})")]
    UnexpectedType {
        record: &'static str,
        expected: &'static str,
        actual: u8,
    },
    #[error("varint does not fit in 32 bits")]
    VarintOverflow,
    #[error("invalid file name (expected {expected}, actual {actual})")]
    InvalidFilename {
        expected: &'static str,
        actual: String,
    },
    #[error("input ends in the middle of a record")]
    Truncated,
    #[error("value cannot be encoded: {what}")]
    UnrepresentableValue { what: String },
    #[error("i/o failure")]
    Io,
}

#[derive(Debug, Clone)]
pub struct SkelError {
    pub kind: SkelErrorKind,
    pub args: BTreeMap<&'static str, String>,
    pub causes: Vec<Arc<dyn std::error::Error + Send + Sync>>,
}

impl SkelError {
    pub fn new(kind: SkelErrorKind) -> Self {
        Self {
            kind,
            args: BTreeMap::new(),
            causes: Vec::new(),
        }
    }

    pub fn unexpected_type(record: &'static str, expected: &'static str, actual: u8) -> Self {
        Self::new(SkelErrorKind::UnexpectedType {
            record,
            expected,
            actual,
        })
    }

    pub fn unrepresentable(what: impl Into<String>) -> Self {
        Self::new(SkelErrorKind::UnrepresentableValue { what: what.into() })
    }

    /// Attaches context; an existing value for `k` is kept, so the innermost
    /// record wins over outer ones.
    pub fn with_arg(mut self, k: &'static str, v: impl ToString) -> Self {
        self.args.entry(k).or_insert_with(|| v.to_string());
        self
    }

    pub fn push_std(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.causes.push(Arc::new(cause));
        self
    }

    pub fn arg(&self, k: &str) -> Option<&str> {
        self.args.get(k).map(String::as_str)
    }
}

impl fmt::Display for SkelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.args.is_empty() {
            return Ok(());
        }
        write!(f, " (")?;
        let mut first = true;
        for (k, v) in &self.args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")
    }
}

impl std::error::Error for SkelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes
            .first()
            .map(|c| c.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<SkelErrorKind> for SkelError {
    fn from(kind: SkelErrorKind) -> Self {
        SkelError::new(kind)
    }
}

impl From<io::Error> for SkelError {
    fn from(err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::UnexpectedEof => SkelErrorKind::Truncated,
            _ => SkelErrorKind::Io,
        };
        SkelError::new(kind).push_std(err)
    }
}
