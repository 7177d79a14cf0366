//! Typed interpretation of a chat message.
//!
//! The classification service answers with a function name and a loosely typed
//! argument object. Everything past this module works with [`Intent`] only:
//! names are checked against [`IntentKind`], required arguments must be present
//! and dates are parsed before any store call is attempted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::event::parse_iso_date;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    ListAll,
    Add,
    Update,
    ListBeforeDate,
    FindByName,
}

impl IntentKind {
    pub const ALL: [IntentKind; 5] =
        [Self::ListAll, Self::Add, Self::Update, Self::ListBeforeDate, Self::FindByName];

    pub fn function_name(self) -> &'static str {
        match self {
            Self::ListAll => "get_all_events",
            Self::Add => "add_event",
            Self::Update => "update_event",
            Self::ListBeforeDate => "get_datewise_event",
            Self::FindByName => "get_specific_event",
        }
    }

    pub fn from_function_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.function_name() == name)
    }

    pub fn is_mutating(self) -> bool {
        matches!(self, Self::Add | Self::Update)
    }

    pub fn required_arguments(self) -> &'static [&'static str] {
        match self {
            Self::ListAll => &[],
            Self::Add | Self::Update => &["name", "date"],
            Self::ListBeforeDate => &["date"],
            Self::FindByName => &["name"],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventArgs {
    pub name: String,
    pub date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateArgs {
    pub date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameArgs {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    ListAll,
    Add(EventArgs),
    Update(EventArgs),
    ListBeforeDate(DateArgs),
    FindByName(NameArgs),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    None,
    Intent(Intent),
    /// The service picked a known function but an argument failed validation.
    Invalid { kind: IntentKind, error: DomainError },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IntentError {
    #[error("classification service returned unknown function `{0}`")]
    UnknownFunction(String),
    #[error("function `{function}` is missing required argument `{argument}`")]
    MissingArgument { function: &'static str, argument: &'static str },
    #[error("function `{function}` has an invalid `{argument}` argument: {source}")]
    InvalidArgument {
        function: &'static str,
        argument: &'static str,
        #[source]
        source: DomainError,
    },
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Self::ListAll => IntentKind::ListAll,
            Self::Add(_) => IntentKind::Add,
            Self::Update(_) => IntentKind::Update,
            Self::ListBeforeDate(_) => IntentKind::ListBeforeDate,
            Self::FindByName(_) => IntentKind::FindByName,
        }
    }

    pub fn from_function_call(name: &str, args: &Value) -> Result<Self, IntentError> {
        let kind = IntentKind::from_function_name(name)
            .ok_or_else(|| IntentError::UnknownFunction(name.to_owned()))?;
        let reader = ArgumentReader { function: kind.function_name(), args };

        Ok(match kind {
            IntentKind::ListAll => Self::ListAll,
            IntentKind::Add => {
                Self::Add(EventArgs { name: reader.name()?, date: reader.date()? })
            }
            IntentKind::Update => {
                Self::Update(EventArgs { name: reader.name()?, date: reader.date()? })
            }
            IntentKind::ListBeforeDate => Self::ListBeforeDate(DateArgs { date: reader.date()? }),
            IntentKind::FindByName => Self::FindByName(NameArgs { name: reader.name()? }),
        })
    }
}

impl Classification {
    /// Unknown functions and missing arguments are treated as "no intent";
    /// malformed values keep their kind so authorization still applies.
    pub fn from_function_call(name: &str, args: &Value) -> Self {
        match Intent::from_function_call(name, args) {
            Ok(intent) => Self::Intent(intent),
            Err(IntentError::InvalidArgument { source, function, .. }) => {
                match IntentKind::from_function_name(function) {
                    Some(kind) => Self::Invalid { kind, error: source },
                    None => Self::None,
                }
            }
            Err(IntentError::UnknownFunction(_)) | Err(IntentError::MissingArgument { .. }) => {
                Self::None
            }
        }
    }

    pub fn kind(&self) -> Option<IntentKind> {
        match self {
            Self::None => None,
            Self::Intent(intent) => Some(intent.kind()),
            Self::Invalid { kind, .. } => Some(*kind),
        }
    }
}

struct ArgumentReader<'a> {
    function: &'static str,
    args: &'a Value,
}

impl ArgumentReader<'_> {
    fn raw(&self, argument: &'static str) -> Result<&str, IntentError> {
        self.args
            .get(argument)
            .and_then(Value::as_str)
            .ok_or(IntentError::MissingArgument { function: self.function, argument })
    }

    fn name(&self) -> Result<String, IntentError> {
        let raw = self.raw("name")?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IntentError::InvalidArgument {
                function: self.function,
                argument: "name",
                source: DomainError::EmptyName,
            });
        }
        Ok(trimmed.to_owned())
    }

    fn date(&self) -> Result<NaiveDate, IntentError> {
        let raw = self.raw("date")?;
        parse_iso_date(raw).map_err(|source| IntentError::InvalidArgument {
            function: self.function,
            argument: "date",
            source,
        })
    }
}
